//! TEARDOWN: dismantle a session and reclaim its resources.

use std::sync::Arc;

use tracing::info;

use crate::client::ClientHandler;
use crate::ports::PortRange;
use crate::protocol::Packet;
use crate::session::SessionRegistry;

use super::{resolve_session, Method, MethodError, Verb};

/// Like PAUSE, TEARDOWN passes verification without a registered callback.
pub(crate) struct TeardownMethod {
    registry: SessionRegistry,
    ports: Arc<PortRange>,
    handler: Option<Arc<ClientHandler>>,
}

impl TeardownMethod {
    pub(crate) fn new(registry: SessionRegistry, ports: Arc<PortRange>) -> Self {
        TeardownMethod {
            registry,
            ports,
            handler: None,
        }
    }
}

impl Method for TeardownMethod {
    fn verify(
        &mut self,
        _packet: &Packet,
        handler: &Arc<ClientHandler>,
    ) -> Result<(), MethodError> {
        self.handler = Some(Arc::clone(handler));
        Ok(())
    }

    fn handle(&mut self, packet: &mut Packet) {
        if let Some(handler) = &self.handler {
            handler.notify(Verb::Teardown);
        }

        let session = match resolve_session(&self.registry, packet.request.session_id()) {
            Ok(session) => session,
            Err(code) => {
                packet.response.set_status(code);
                return;
            }
        };

        self.ports.release(session.port());
        session.close();
        self.registry.remove(session.id());

        info!(session = session.id(), "session torn down");
    }
}
