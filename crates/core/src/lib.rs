//! An embeddable RTSP (RFC 2326) control-plane server.
//!
//! The server speaks the RTSP request/response protocol over TCP, tracks
//! media sessions from SETUP through TEARDOWN, and hands out server-side
//! UDP port pairs for the media plane. The media plane itself is pluggable:
//! SETUP asks a [`session::MediaTransportFactory`] for a transport, and the
//! application reacts to client verbs through [`ClientHandler`] callbacks.
//!
//! ```no_run
//! use rtsp_control::{ClientHandler, Server, ServerConfig};
//!
//! # fn main() -> rtsp_control::Result<()> {
//! let handler = ClientHandler::new()
//!     .on_play(|| println!("play"))
//!     .on_pause(|| println!("pause"));
//!
//! let mut server = Server::new(ServerConfig::default(), handler)?;
//! server.start()?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod header;
pub mod methods;
pub mod ports;
pub mod protocol;
pub mod sdp;
pub mod server;
pub mod session;
pub mod status;
pub mod transport;

pub use client::ClientHandler;
pub use error::{Result, RtspError};
pub use methods::Verb;
pub use ports::PortRange;
pub use server::{MediaConfig, Server, ServerConfig};
