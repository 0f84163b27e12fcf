//! Media sessions and the registry that tracks them.
//!
//! A [`MediaSession`] is created by SETUP and lives until TEARDOWN removes
//! it. The session owns a [`MediaTransport`] built by the server's
//! [`MediaTransportFactory`]; control-plane handlers only ever pause or
//! close it.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

/// A live media-plane leg bound to one session.
///
/// Implementations are expected to make `close` idempotent.
pub trait MediaTransport: std::fmt::Debug + Send + Sync {
    /// Suspends delivery without releasing resources.
    fn pause(&self);
    /// Releases the transport's resources.
    fn close(&self);
}

/// Everything a factory needs to stand up a transport for one session.
#[derive(Debug, Clone)]
pub struct TransportSpec {
    /// Server-side RTP port reserved for this session.
    pub server_port: u16,
    /// Local address to bind the server side to.
    pub server_addr: IpAddr,
    /// Address the client connected from.
    pub client_addr: IpAddr,
    /// Client ports from the `Transport` header, RTP first.
    pub client_ports: Vec<u16>,
}

/// Builds media transports on SETUP. The default implementation binds UDP
/// sockets; embedders substitute their own to splice in a real pipeline.
pub trait MediaTransportFactory: Send + Sync {
    fn create(&self, spec: &TransportSpec) -> Result<Box<dyn MediaTransport>>;
}

/// One established session: its identifier, its reserved server RTP port,
/// and the transport carrying its media.
#[derive(Debug)]
pub struct MediaSession {
    id: String,
    port: u16,
    transport: Box<dyn MediaTransport>,
}

impl MediaSession {
    pub fn new(id: String, port: u16, transport: Box<dyn MediaTransport>) -> Self {
        MediaSession {
            id,
            port,
            transport,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The low half of the server port pair reserved for this session.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pause(&self) {
        self.transport.pause();
    }

    pub fn close(&self) {
        self.transport.close();
    }
}

/// Why a session lookup failed; drives the distinction between
/// `459 Aggregate Operation Not Allowed` and `454 Session Not Found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// The registry holds no sessions at all.
    NoSessions,
    /// Sessions exist, but none with the requested identifier.
    NotFound,
}

/// Shared map of live sessions, keyed by session identifier.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<MediaSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: MediaSession) -> Arc<MediaSession> {
        let session = Arc::new(session);
        self.inner
            .write()
            .insert(session.id().to_string(), Arc::clone(&session));
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<MediaSession>> {
        self.inner.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<MediaSession>> {
        self.inner.write().remove(id)
    }

    /// Looks up `id`, distinguishing an empty registry from a stale or
    /// unknown identifier.
    pub fn resolve(&self, id: &str) -> std::result::Result<Arc<MediaSession>, LookupError> {
        let sessions = self.inner.read();

        if sessions.is_empty() {
            return Err(LookupError::NoSessions);
        }

        sessions.get(id).cloned().ok_or(LookupError::NotFound)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    struct StubTransport {
        paused: AtomicBool,
        closed: AtomicBool,
    }

    impl MediaTransport for Arc<StubTransport> {
        fn pause(&self) {
            self.paused.store(true, Ordering::SeqCst);
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn stub_session(id: &str, port: u16) -> (MediaSession, Arc<StubTransport>) {
        let transport = Arc::new(StubTransport::default());
        let session = MediaSession::new(id.to_string(), port, Box::new(Arc::clone(&transport)));
        (session, transport)
    }

    #[test]
    fn resolve_distinguishes_empty_from_missing() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.resolve("a").unwrap_err(), LookupError::NoSessions);

        let (session, _transport) = stub_session("a", 39000);
        registry.insert(session);

        assert_eq!(registry.resolve("b").unwrap_err(), LookupError::NotFound);
        assert_eq!(registry.resolve("a").unwrap().port(), 39000);
    }

    #[test]
    fn pause_and_close_reach_the_transport() {
        let registry = SessionRegistry::new();
        let (session, transport) = stub_session("s1", 39002);
        registry.insert(session);

        let session = registry.get("s1").unwrap();
        session.pause();
        assert!(transport.paused.load(Ordering::SeqCst));

        session.close();
        assert!(transport.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn remove_forgets_the_session() {
        let registry = SessionRegistry::new();
        let (session, _transport) = stub_session("gone", 40000);
        registry.insert(session);

        assert!(registry.remove("gone").is_some());
        assert!(registry.remove("gone").is_none());
        assert!(registry.is_empty());
    }
}
