//! Server assembly and lifecycle.

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::auth::AuthorizationType;
use crate::client::ClientHandler;
use crate::error::{Result, RtspError};
use crate::methods::Dispatcher;
use crate::ports::PortRange;
use crate::sdp;
use crate::session::{MediaTransportFactory, SessionRegistry};
use crate::transport::{accept_loop, UdpTransportFactory};

/// The media stream advertised in the session description.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Port announced for the video stream.
    pub port: u16,
    /// Host announced in the connection line.
    pub client_host: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            port: 8001,
            client_host: "127.0.0.1".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port the control plane listens on.
    pub port: u16,
    /// Inclusive UDP range media port pairs are drawn from.
    pub udp_port_min: u16,
    pub udp_port_max: u16,
    /// Credentials clients may present; carried on requests, not enforced
    /// by the core.
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_type: AuthorizationType,
    /// Per-read deadline on client connections.
    pub client_timeout: Duration,
    pub media: MediaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 8554,
            udp_port_min: 39000,
            udp_port_max: 45001,
            username: None,
            password: None,
            auth_type: AuthorizationType::Unused,
            client_timeout: Duration::from_millis(500),
            media: MediaConfig::default(),
        }
    }
}

/// The RTSP control-plane server.
///
/// Construction binds the listener and precomputes the session description;
/// [`start`](Self::start) spawns the accept loop, [`stop`](Self::stop)
/// signals shutdown. In-flight exchanges finish; only new accepts stop.
pub struct Server {
    listener: Option<TcpListener>,
    dispatcher: Arc<Dispatcher>,
    running: Arc<AtomicBool>,
    client_timeout: Duration,
    local_port: u16,
}

impl Server {
    /// Creates a server with the default UDP media transport.
    pub fn new(config: ServerConfig, handler: ClientHandler) -> Result<Self> {
        Self::with_factory(config, handler, Arc::new(UdpTransportFactory))
    }

    /// Creates a server with a custom media-transport factory.
    pub fn with_factory(
        config: ServerConfig,
        handler: ClientHandler,
        factory: Arc<dyn MediaTransportFactory>,
    ) -> Result<Self> {
        let ports = Arc::new(PortRange::new(config.udp_port_min, config.udp_port_max)?);
        let description = Arc::new(sdp::describe(&config.media)?);

        let dispatcher = Arc::new(Dispatcher::new(
            SessionRegistry::new(),
            ports,
            Arc::new(handler),
            description,
            factory,
        ));

        let listener = TcpListener::bind(("0.0.0.0", config.port))?;
        listener.set_nonblocking(true)?;
        let local_port = listener.local_addr()?.port();

        Ok(Server {
            listener: Some(listener),
            dispatcher,
            running: Arc::new(AtomicBool::new(false)),
            client_timeout: config.client_timeout,
            local_port,
        })
    }

    /// Spawns the accept loop. A server can be started once.
    pub fn start(&mut self) -> Result<()> {
        let Some(listener) = self.listener.take() else {
            return Err(RtspError::AlreadyRunning);
        };

        self.running.store(true, Ordering::SeqCst);

        let dispatcher = Arc::clone(&self.dispatcher);
        let running = Arc::clone(&self.running);
        let timeout = self.client_timeout;

        thread::spawn(move || accept_loop(listener, dispatcher, running, timeout));

        info!(port = self.local_port, "server listening");
        Ok(())
    }

    /// Signals the accept loop and connection workers to wind down.
    pub fn stop(&mut self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(RtspError::NotStarted);
        }

        info!("server stopping");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The port the listener is actually bound to; differs from the
    /// configured port when that was 0.
    pub fn port(&self) -> u16 {
        self.local_port
    }

    /// Live sessions, for inspection.
    pub fn sessions(&self) -> &SessionRegistry {
        self.dispatcher.registry()
    }

    /// The media port allocator, for inspection.
    pub fn ports(&self) -> &Arc<PortRange> {
        self.dispatcher.ports()
    }
}
