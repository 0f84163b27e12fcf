//! SETUP: negotiate a transport and establish a media session.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::client::ClientHandler;
use crate::header::{Delivery, Transport};
use crate::ports::PortRange;
use crate::protocol::{Packet, Response};
use crate::session::{
    LookupError, MediaSession, MediaTransportFactory, SessionRegistry, TransportSpec,
};
use crate::status;

use super::{Method, MethodError};

/// Handles one SETUP exchange. The dispatcher reserves a server port pair
/// before constructing this; every failure path in `handle` returns the
/// pair to the allocator.
pub(crate) struct SetupMethod {
    registry: SessionRegistry,
    ports: Arc<PortRange>,
    factory: Arc<dyn MediaTransportFactory>,
    server_port: u16,
    peer: SocketAddr,
}

impl SetupMethod {
    pub(crate) fn new(
        registry: SessionRegistry,
        ports: Arc<PortRange>,
        factory: Arc<dyn MediaTransportFactory>,
        server_port: u16,
        peer: SocketAddr,
    ) -> Self {
        SetupMethod {
            registry,
            ports,
            factory,
            server_port,
            peer,
        }
    }

    /// Fails the exchange and hands the reserved pair back.
    fn reject(&self, response: &mut Response, code: u16) {
        self.ports.release(self.server_port);
        response.set_status(code);
    }

    /// The Transport header granted back to the client: its port pair
    /// echoed, delivery pinned to unicast UDP, plus the server pair.
    fn granted_transport(&self, requested: &Transport) -> Transport {
        let mut granted = Transport::new();
        granted.set_protocol("RTP", "AVP", "UDP");
        granted.set_delivery(Delivery::Unicast);

        match *requested.client_port.as_slice() {
            [rtp, rtcp] => granted.set_port_pair("client_port", rtp, Some(rtcp)),
            [rtp] => granted.set_port_pair("client_port", rtp, None),
            _ => {}
        }

        granted.set_port_pair("server_port", self.server_port, Some(self.server_port + 1));
        granted.set_parameter("mode", "PLAY");
        granted
    }
}

impl Method for SetupMethod {
    fn verify(
        &mut self,
        _packet: &Packet,
        _handler: &Arc<ClientHandler>,
    ) -> Result<(), MethodError> {
        Ok(())
    }

    fn handle(&mut self, packet: &mut Packet) {
        let Packet { request, response } = packet;

        // A Session header on SETUP asks to update an established session;
        // updates are not supported.
        if let Some(id) = request.session_id() {
            let code = match self.registry.resolve(id) {
                Ok(_) | Err(LookupError::NoSessions) => status::AGGREGATE_OPERATION_NOT_ALLOWED,
                Err(LookupError::NotFound) => status::SESSION_NOT_FOUND,
            };
            self.reject(response, code);
            return;
        }

        let Some(value) = request.headers.get("Transport") else {
            self.reject(response, status::UNSUPPORTED_TRANSPORT);
            return;
        };

        let transport = match Transport::parse(value) {
            Ok(transport) => transport,
            Err(err) => {
                warn!(%err, "malformed Transport header");
                self.reject(response, status::UNSUPPORTED_TRANSPORT);
                return;
            }
        };

        if transport.lower_transport.eq_ignore_ascii_case("TCP") {
            self.reject(response, status::UNSUPPORTED_TRANSPORT);
            return;
        }

        if !transport.has_parameter("client_port") {
            self.reject(response, status::UNSUPPORTED_TRANSPORT);
            return;
        }

        let spec = TransportSpec {
            server_port: self.server_port,
            server_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            client_addr: self.peer.ip(),
            client_ports: transport.client_port.clone(),
        };

        let media = match self.factory.create(&spec) {
            Ok(media) => media,
            Err(err) => {
                warn!(%err, "media transport setup failed");
                self.ports.release(self.server_port);
                response.set_status_message(500, "unable to create new session");
                return;
            }
        };

        let id = Uuid::new_v4().to_string();
        let session = self
            .registry
            .insert(MediaSession::new(id, self.server_port, media));

        info!(
            session = session.id(),
            server_port = self.server_port,
            client = %self.peer,
            "session established"
        );

        response.add_header("Session", session.id());
        response.add_header("Transport", &self.granted_transport(&transport).to_string());
    }
}
