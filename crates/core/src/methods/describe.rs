//! DESCRIBE: hand out the precomputed session description.

use std::sync::Arc;

use crate::client::ClientHandler;
use crate::protocol::request::SDP_CONTENT_TYPE;
use crate::protocol::Packet;

use super::{Method, MethodError};

pub(crate) struct DescribeMethod {
    description: Arc<Vec<u8>>,
}

impl DescribeMethod {
    pub(crate) fn new(description: Arc<Vec<u8>>) -> Self {
        DescribeMethod { description }
    }
}

impl Method for DescribeMethod {
    fn verify(
        &mut self,
        _packet: &Packet,
        _handler: &Arc<ClientHandler>,
    ) -> Result<(), MethodError> {
        Ok(())
    }

    fn handle(&mut self, packet: &mut Packet) {
        // An absent Accept header defaults to accepted.
        if let Some(accept) = packet.request.headers.get("Accept") {
            if !accept.split(',').any(|t| t.trim() == SDP_CONTENT_TYPE) {
                packet.response.set_status(406);
                return;
            }
        }

        packet
            .response
            .add_header("Content-Type", SDP_CONTENT_TYPE);
        packet
            .response
            .add_header("Content-Length", &self.description.len().to_string());
        packet.response.set_body(self.description.as_ref().clone());
    }
}
