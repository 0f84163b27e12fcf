//! OPTIONS: advertise the methods this server and its application support.

use std::sync::Arc;

use crate::client::ClientHandler;
use crate::protocol::Packet;

use super::{Method, MethodError, CAPABILITIES};

/// The methods the server itself always implements.
const BUILTIN: &str = "OPTIONS, DESCRIBE, SETUP";

pub(crate) struct OptionsMethod {
    handler: Option<Arc<ClientHandler>>,
}

impl OptionsMethod {
    pub(crate) fn new() -> Self {
        OptionsMethod { handler: None }
    }
}

impl Method for OptionsMethod {
    fn verify(
        &mut self,
        _packet: &Packet,
        handler: &Arc<ClientHandler>,
    ) -> Result<(), MethodError> {
        self.handler = Some(Arc::clone(handler));
        Ok(())
    }

    fn handle(&mut self, packet: &mut Packet) {
        let mut public = String::from(BUILTIN);

        if let Some(handler) = &self.handler {
            for verb in CAPABILITIES {
                if handler.supports(verb) {
                    public.push_str(", ");
                    public.push_str(verb.as_str());
                }
            }
        }

        packet.response.add_header("Public", &public);
        packet.response.add_header("Content-Length", "0");
    }
}
