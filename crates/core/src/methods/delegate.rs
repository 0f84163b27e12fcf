//! Verbs whose whole behavior is an application callback: PLAY, RECORD,
//! ANNOUNCE, GET_PARAMETER, SET_PARAMETER.

use std::sync::Arc;

use crate::client::ClientHandler;
use crate::protocol::Packet;

use super::{Method, MethodError, Verb};

pub(crate) struct DelegateMethod {
    verb: Verb,
    handler: Option<Arc<ClientHandler>>,
}

impl DelegateMethod {
    pub(crate) fn new(verb: Verb) -> Self {
        DelegateMethod {
            verb,
            handler: None,
        }
    }
}

impl Method for DelegateMethod {
    fn verify(
        &mut self,
        _packet: &Packet,
        handler: &Arc<ClientHandler>,
    ) -> Result<(), MethodError> {
        if !handler.supports(self.verb) {
            return Err(MethodError("client method not implemented"));
        }

        self.handler = Some(Arc::clone(handler));
        Ok(())
    }

    fn handle(&mut self, _packet: &mut Packet) {
        if let Some(handler) = &self.handler {
            handler.notify(self.verb);
        }
    }
}
