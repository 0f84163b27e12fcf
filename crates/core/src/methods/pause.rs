//! PAUSE: suspend a session's media delivery.

use std::sync::Arc;

use crate::client::ClientHandler;
use crate::protocol::Packet;
use crate::session::SessionRegistry;

use super::{resolve_session, Method, MethodError, Verb};

/// PAUSE passes verification even without a registered callback; the
/// session bookkeeping below runs either way.
pub(crate) struct PauseMethod {
    registry: SessionRegistry,
    handler: Option<Arc<ClientHandler>>,
}

impl PauseMethod {
    pub(crate) fn new(registry: SessionRegistry) -> Self {
        PauseMethod {
            registry,
            handler: None,
        }
    }
}

impl Method for PauseMethod {
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
            handler.notify(Verb::Pause);
        }

        match resolve_session(&self.registry, packet.request.session_id()) {
            Ok(session) => session.pause(),
            Err(code) => packet.response.set_status(code),
        }
    }
}
