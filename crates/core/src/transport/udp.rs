//! Default UDP media transport: one socket per session, addressed at the
//! client's RTP/RTCP port pair.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{Result, RtspError};
use crate::session::{MediaTransport, MediaTransportFactory, TransportSpec};

/// A bound UDP socket plus the client addresses media should flow to.
/// The control plane only ever pauses or closes it; what actually gets
/// sent is up to the embedding application.
#[derive(Debug)]
pub struct UdpMediaTransport {
    socket: UdpSocket,
    client_rtp: SocketAddr,
    client_rtcp: SocketAddr,
    paused: AtomicBool,
    closed: AtomicBool,
}

impl UdpMediaTransport {
    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }

    pub fn client_rtp(&self) -> SocketAddr {
        self.client_rtp
    }

    pub fn client_rtcp(&self) -> SocketAddr {
        self.client_rtcp
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl MediaTransport for UdpMediaTransport {
    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn close(&self) {
        // Idempotent; the socket itself is released on drop.
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(client = %self.client_rtp, "media transport closed");
        }
    }
}

/// Builds [`UdpMediaTransport`]s; the server's default factory.
pub struct UdpTransportFactory;

impl MediaTransportFactory for UdpTransportFactory {
    fn create(&self, spec: &TransportSpec) -> Result<Box<dyn MediaTransport>> {
        let Some(&rtp_port) = spec.client_ports.first() else {
            return Err(RtspError::InvalidHeaderField {
                header: "Transport",
                field: "client_port",
            });
        };

        let rtcp_port = spec
            .client_ports
            .get(1)
            .copied()
            .unwrap_or(rtp_port + 1);

        let socket = UdpSocket::bind((spec.server_addr, spec.server_port))?;
        let client_rtp = SocketAddr::new(spec.client_addr, rtp_port);
        let client_rtcp = SocketAddr::new(spec.client_addr, rtcp_port);

        debug!(server_port = spec.server_port, client = %client_rtp, "media socket bound");

        Ok(Box::new(UdpMediaTransport {
            socket,
            client_rtp,
            client_rtcp,
            paused: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    fn spec(client_ports: Vec<u16>) -> TransportSpec {
        TransportSpec {
            // Port 0 binds an ephemeral port, enough for testing.
            server_port: 0,
            server_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            client_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            client_ports,
        }
    }

    #[test]
    fn derives_rtcp_port_when_not_given() {
        let transport = UdpTransportFactory.create(&spec(vec![8000])).unwrap();
        transport.close();
    }

    #[test]
    fn pause_and_close_are_sticky() {
        let spec = spec(vec![8000, 8001]);
        let transport = UdpTransportFactory.create(&spec).unwrap();

        transport.pause();
        transport.close();
        // Closing twice is allowed.
        transport.close();
    }

    #[test]
    fn addresses_point_at_the_client() {
        let transport = UdpMediaTransport {
            socket: UdpSocket::bind("127.0.0.1:0").unwrap(),
            client_rtp: "127.0.0.1:8000".parse().unwrap(),
            client_rtcp: "127.0.0.1:8005".parse().unwrap(),
            paused: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        };

        assert_eq!(transport.client_rtp().port(), 8000);
        assert_eq!(transport.client_rtcp().port(), 8005);
        assert!(transport.socket().local_addr().is_ok());

        assert!(!transport.is_paused());
        transport.pause();
        assert!(transport.is_paused());

        assert!(!transport.is_closed());
        transport.close();
        assert!(transport.is_closed());
    }

    #[test]
    fn empty_client_ports_are_rejected() {
        let err = UdpTransportFactory.create(&spec(vec![])).unwrap_err();
        assert!(err.to_string().contains("client_port"));
    }
}
