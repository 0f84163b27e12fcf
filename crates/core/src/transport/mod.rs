//! Network plumbing: the TCP control-plane loop and the default UDP media
//! transport.

pub mod tcp;
pub mod udp;

pub use tcp::accept_loop;
pub use udp::{UdpMediaTransport, UdpTransportFactory};
