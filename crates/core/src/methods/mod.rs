//! RTSP verb dispatch.
//!
//! Every verb maps to a handler implementing [`Method`]: `verify` checks
//! the verb's hard preconditions and `handle` performs its side effects on
//! the exchange. The [`Dispatcher`] resolves the verb token, runs the two
//! phases, and translates failures into the right status codes:
//!
//! - unrecognized verb token: `501 Not Implemented`
//! - recognized verb failing `verify`: `405 Method Not Allowed`
//! - SETUP with no free port pair: `500` with a descriptive message
//!
//! PAUSE and TEARDOWN deliberately pass `verify` without a registered
//! callback so their built-in session bookkeeping still runs; PLAY and the
//! other delegated verbs are strict.

mod delegate;
mod describe;
mod options;
mod pause;
mod setup;
mod teardown;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::ClientHandler;
use crate::ports::PortRange;
use crate::protocol::Packet;
use crate::session::{MediaSession, MediaTransportFactory, SessionRegistry};
use crate::status;

use delegate::DelegateMethod;
use describe::DescribeMethod;
use options::OptionsMethod;
use pause::PauseMethod;
use setup::SetupMethod;
use teardown::TeardownMethod;

/// The RTSP methods this server recognizes (RFC 2326 §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Options,
    Describe,
    Setup,
    Play,
    Pause,
    Teardown,
    Record,
    Announce,
    GetParameter,
    SetParameter,
}

impl Verb {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "OPTIONS" => Some(Verb::Options),
            "DESCRIBE" => Some(Verb::Describe),
            "SETUP" => Some(Verb::Setup),
            "PLAY" => Some(Verb::Play),
            "PAUSE" => Some(Verb::Pause),
            "TEARDOWN" => Some(Verb::Teardown),
            "RECORD" => Some(Verb::Record),
            "ANNOUNCE" => Some(Verb::Announce),
            "GET_PARAMETER" => Some(Verb::GetParameter),
            "SET_PARAMETER" => Some(Verb::SetParameter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Options => "OPTIONS",
            Verb::Describe => "DESCRIBE",
            Verb::Setup => "SETUP",
            Verb::Play => "PLAY",
            Verb::Pause => "PAUSE",
            Verb::Teardown => "TEARDOWN",
            Verb::Record => "RECORD",
            Verb::Announce => "ANNOUNCE",
            Verb::GetParameter => "GET_PARAMETER",
            Verb::SetParameter => "SET_PARAMETER",
        }
    }
}

/// Verbs whose availability is advertised based on registered application
/// callbacks; OPTIONS, DESCRIBE, and SETUP are always available.
pub const CAPABILITIES: [Verb; 7] = [
    Verb::Play,
    Verb::Pause,
    Verb::Teardown,
    Verb::Record,
    Verb::Announce,
    Verb::GetParameter,
    Verb::SetParameter,
];

/// A failed `verify` precondition; the message goes to the log, the client
/// sees `405 Method Not Allowed`.
pub(crate) struct MethodError(pub &'static str);

/// One RTSP verb handler.
pub(crate) trait Method {
    /// Checks the verb's hard preconditions. Handlers that need shared
    /// state in `handle` capture it here.
    fn verify(
        &mut self,
        packet: &Packet,
        handler: &Arc<ClientHandler>,
    ) -> std::result::Result<(), MethodError>;

    /// Performs the verb's side effects and writes the response fields.
    fn handle(&mut self, packet: &mut Packet);
}

/// Resolves the session a request addresses.
///
/// A request carrying no `Session` header addresses no session at all, so
/// it fails with `459 Aggregate Operation Not Allowed`; a named session
/// absent from the registry fails with `454 Session Not Found`.
pub(crate) fn resolve_session(
    registry: &SessionRegistry,
    id: Option<&str>,
) -> std::result::Result<Arc<MediaSession>, u16> {
    match id {
        None => Err(status::AGGREGATE_OPERATION_NOT_ALLOWED),
        Some(id) => registry.get(id).ok_or(status::SESSION_NOT_FOUND),
    }
}

/// Routes parsed requests to their verb handlers.
///
/// Shared by every connection worker; holds the registry, the allocator,
/// the application callbacks, the precomputed session description, and the
/// media-transport factory.
pub struct Dispatcher {
    registry: SessionRegistry,
    ports: Arc<PortRange>,
    handler: Arc<ClientHandler>,
    description: Arc<Vec<u8>>,
    factory: Arc<dyn MediaTransportFactory>,
}

impl Dispatcher {
    pub fn new(
        registry: SessionRegistry,
        ports: Arc<PortRange>,
        handler: Arc<ClientHandler>,
        description: Arc<Vec<u8>>,
        factory: Arc<dyn MediaTransportFactory>,
    ) -> Self {
        Dispatcher {
            registry,
            ports,
            handler,
            description,
            factory,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn ports(&self) -> &Arc<PortRange> {
        &self.ports
    }

    /// Runs one exchange through verify and handle.
    pub fn dispatch(&self, packet: &mut Packet, peer: SocketAddr) {
        let Some(verb) = Verb::from_token(&packet.request.method) else {
            warn!(method = %packet.request.method, "unrecognized method");
            packet.response.set_status(501);
            return;
        };

        let mut method: Box<dyn Method> = match verb {
            Verb::Options => Box::new(OptionsMethod::new()),
            Verb::Describe => Box::new(DescribeMethod::new(Arc::clone(&self.description))),
            Verb::Setup => {
                // The pair is reserved up front; every SETUP failure path
                // hands it back.
                let server_port = match self.ports.request() {
                    Ok(port) => port,
                    Err(err) => {
                        warn!(%err, "port range exhausted");
                        packet.response.set_status_message(
                            500,
                            "server doesn't have available ports to transfer",
                        );
                        return;
                    }
                };

                Box::new(SetupMethod::new(
                    self.registry.clone(),
                    Arc::clone(&self.ports),
                    Arc::clone(&self.factory),
                    server_port,
                    peer,
                ))
            }
            Verb::Pause => Box::new(PauseMethod::new(self.registry.clone())),
            Verb::Teardown => Box::new(TeardownMethod::new(
                self.registry.clone(),
                Arc::clone(&self.ports),
            )),
            delegated => Box::new(DelegateMethod::new(delegated)),
        };

        if let Err(MethodError(reason)) = method.verify(packet, &self.handler) {
            warn!(method = verb.as_str(), reason, "method precondition failed");
            packet.response.set_status(405);
            return;
        }

        debug!(method = verb.as_str(), sequence = packet.request.sequence(), "handling request");
        method.handle(packet);
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::error::{Result, RtspError};
    use crate::protocol::Request;
    use crate::session::{MediaTransport, TransportSpec};

    #[derive(Debug)]
    struct StubTransport;

    impl MediaTransport for StubTransport {
        fn pause(&self) {}
        fn close(&self) {}
    }

    struct StubFactory;

    impl MediaTransportFactory for StubFactory {
        fn create(&self, _spec: &TransportSpec) -> Result<Box<dyn MediaTransport>> {
            Ok(Box::new(StubTransport))
        }
    }

    struct FailingFactory;

    impl MediaTransportFactory for FailingFactory {
        fn create(&self, _spec: &TransportSpec) -> Result<Box<dyn MediaTransport>> {
            Err(RtspError::Io(std::io::Error::other("bind failed")))
        }
    }

    fn peer() -> SocketAddr {
        "192.168.10.95:52000".parse().unwrap()
    }

    fn packet(raw: &str) -> Packet {
        Packet::new(Request::parse(raw.as_bytes()).unwrap())
    }

    fn dispatcher_with(
        handler: ClientHandler,
        factory: Arc<dyn MediaTransportFactory>,
    ) -> Dispatcher {
        Dispatcher::new(
            SessionRegistry::new(),
            Arc::new(PortRange::new(39000, 39003).unwrap()),
            Arc::new(handler),
            Arc::new(b"v=0\r\ns=test\r\n".to_vec()),
            factory,
        )
    }

    fn dispatcher(handler: ClientHandler) -> Dispatcher {
        dispatcher_with(handler, Arc::new(StubFactory))
    }

    fn setup_session(d: &Dispatcher) -> String {
        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 2\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
        );
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 200);
        p.response.headers.get("Session").unwrap().to_string()
    }

    #[test]
    fn unknown_verb_is_not_implemented() {
        let d = dispatcher(ClientHandler::new());
        let mut p = packet("FROBNICATE rtsp://localhost/stream RTSP/1.0\r\nCseq: 1\r\n\r\n");
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 501);
    }

    #[test]
    fn options_lists_registered_capabilities() {
        let d = dispatcher(ClientHandler::new().on_play(|| {}).on_pause(|| {}));
        let mut p = packet("OPTIONS * RTSP/1.0\r\nCseq: 1\r\n\r\n");
        d.dispatch(&mut p, peer());

        assert_eq!(p.response.status_code, 200);
        assert_eq!(
            p.response.headers.get("Public"),
            Some("OPTIONS, DESCRIBE, SETUP, PLAY, PAUSE")
        );
    }

    #[test]
    fn describe_honors_the_accept_header() {
        let d = dispatcher(ClientHandler::new());

        let mut p = packet(
            "DESCRIBE rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 1\r\n\
             Accept: application/sdp\r\n\r\n",
        );
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 200);
        assert_eq!(p.response.headers.get("Content-Length"), Some("13"));
        assert!(p.response.body.is_some());

        let mut p = packet(
            "DESCRIBE rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 2\r\n\
             Accept: text/html\r\n\r\n",
        );
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 406);
    }

    #[test]
    fn setup_without_client_port_is_unsupported_transport() {
        let d = dispatcher(ClientHandler::new());
        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 1\r\n\
             Transport: RTP/AVP;unicast\r\n\r\n",
        );
        d.dispatch(&mut p, peer());

        assert_eq!(p.response.status_code, 461);
        // The pre-reserved pair went back to the allocator.
        assert!(!d.ports().occupied(39000));
    }

    #[test]
    fn setup_rejects_tcp_and_missing_transport() {
        let d = dispatcher(ClientHandler::new());

        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 1\r\n\
             Transport: RTP/AVP/TCP;unicast;interleaved=0-1\r\n\r\n",
        );
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 461);

        let mut p = packet("SETUP rtsp://localhost/stream RTSP/1.0\r\nCseq: 2\r\n\r\n");
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 461);

        assert!(!d.ports().occupied(39000));
    }

    #[test]
    fn setup_creates_a_session() {
        let d = dispatcher(ClientHandler::new());
        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 2\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
        );
        d.dispatch(&mut p, peer());

        assert_eq!(p.response.status_code, 200);

        let id = p.response.headers.get("Session").unwrap();
        assert!(d.registry().get(id).is_some());
        assert!(d.ports().occupied(39000));

        let transport = p.response.headers.get("Transport").unwrap();
        assert_eq!(
            transport,
            "RTP/AVP/UDP;unicast;client_port=8000-8001;server_port=39000-39001;mode=PLAY"
        );
    }

    #[test]
    fn setup_with_session_header_rejects_updates() {
        let d = dispatcher(ClientHandler::new());

        // Nothing established yet.
        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 1\r\n\
             Session: nope\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
        );
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 459);

        let id = setup_session(&d);

        let mut p = packet(&format!(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 3\r\n\
             Session: {}\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
            id
        ));
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 459);

        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 4\r\n\
             Session: some-other-id\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
        );
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 454);

        // Only the one successful SETUP kept its pair.
        assert_eq!(d.registry().len(), 1);
        let port = d.registry().get(&id).unwrap().port();
        assert!(d.ports().occupied(port));
        assert!(d.ports().request().is_ok());
    }

    #[test]
    fn setup_exhaustion_reports_a_descriptive_error() {
        let d = dispatcher(ClientHandler::new());
        setup_session(&d);
        setup_session(&d);

        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 4\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
        );
        d.dispatch(&mut p, peer());

        assert_eq!(p.response.status_code, 500);
        assert_eq!(
            p.response.status_text,
            "server doesn't have available ports to transfer"
        );
    }

    #[test]
    fn failed_transport_creation_releases_the_pair() {
        let d = dispatcher_with(ClientHandler::new(), Arc::new(FailingFactory));
        let mut p = packet(
            "SETUP rtsp://localhost/stream RTSP/1.0\r\n\
             Cseq: 1\r\n\
             Transport: RTP/AVP;unicast;client_port=8000-8001\r\n\r\n",
        );
        d.dispatch(&mut p, peer());

        assert_eq!(p.response.status_code, 500);
        assert_eq!(p.response.status_text, "unable to create new session");
        assert!(!d.ports().occupied(39000));
        assert!(d.registry().is_empty());
    }

    #[test]
    fn teardown_releases_the_session() {
        let d = dispatcher(ClientHandler::new());
        let id = setup_session(&d);

        let mut p = packet(&format!(
            "TEARDOWN rtsp://localhost/stream RTSP/1.0\r\nCseq: 3\r\nSession: {}\r\n\r\n",
            id
        ));
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 200);
        assert!(d.registry().is_empty());
        assert!(!d.ports().occupied(39000));

        // The session is gone, so doing it again names a stale id.
        let mut p = packet(&format!(
            "TEARDOWN rtsp://localhost/stream RTSP/1.0\r\nCseq: 4\r\nSession: {}\r\n\r\n",
            id
        ));
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 454);
    }

    #[test]
    fn play_without_capability_is_method_not_allowed() {
        let d = dispatcher(ClientHandler::new().on_pause(|| {}));

        let mut p = packet("PLAY rtsp://localhost/stream RTSP/1.0\r\nCseq: 1\r\n\r\n");
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 405);
    }

    #[test]
    fn pause_without_capability_still_resolves_sessions() {
        // No pause callback registered; PAUSE proceeds to session lookup
        // instead of failing verification.
        let d = dispatcher(ClientHandler::new());

        let mut p = packet("PAUSE rtsp://localhost/stream RTSP/1.0\r\nCseq: 1\r\n\r\n");
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 459);

        let id = setup_session(&d);
        let mut p = packet(&format!(
            "PAUSE rtsp://localhost/stream RTSP/1.0\r\nCseq: 3\r\nSession: {}\r\n\r\n",
            id
        ));
        d.dispatch(&mut p, peer());
        assert_eq!(p.response.status_code, 200);
    }

    #[test]
    fn delegated_verbs_invoke_their_callbacks() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let records = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&records);
        let d = dispatcher(ClientHandler::new().on_record(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let mut p = packet("RECORD rtsp://localhost/stream RTSP/1.0\r\nCseq: 1\r\n\r\n");
        d.dispatch(&mut p, peer());

        assert_eq!(p.response.status_code, 200);
        assert_eq!(records.load(Ordering::SeqCst), 1);
    }
}
