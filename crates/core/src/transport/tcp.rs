//! TCP control-plane connection handling.
//!
//! One thread per connection. Each worker accumulates bytes until a full
//! RTSP message is buffered, runs it through the [`Dispatcher`], and writes
//! the serialized response back. Requests on one connection are processed
//! strictly in arrival order.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::methods::Dispatcher;
use crate::protocol::{still_needs_read, Packet, Request, Response};

/// Initial per-connection receive buffer; grows if a message outruns it.
const REQUEST_BUFFER_SIZE: usize = 10240;

/// How often the accept loop rechecks the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Accepts connections until `running` goes false, spawning one worker
/// thread per client. The listener must be in non-blocking mode so the
/// shutdown flag is observed between accepts.
pub fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    running: Arc<AtomicBool>,
    client_timeout: Duration,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let dispatcher = Arc::clone(&dispatcher);
                let running = Arc::clone(&running);

                thread::spawn(move || {
                    Connection::new(stream, dispatcher, peer).handle(&running, client_timeout);
                });
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(err) => {
                warn!(%err, "accept failed");
            }
        }
    }

    info!("listener stopped");
}

struct Connection {
    stream: TcpStream,
    dispatcher: Arc<Dispatcher>,
    peer: SocketAddr,
}

impl Connection {
    fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>, peer: SocketAddr) -> Self {
        Connection {
            stream,
            dispatcher,
            peer,
        }
    }

    fn handle(mut self, running: &AtomicBool, timeout: Duration) {
        info!(peer = %self.peer, "client connected");

        if let Err(err) = self.configure(timeout) {
            warn!(peer = %self.peer, %err, "failed to configure client socket");
            return;
        }

        let reason = self.run(running);
        info!(peer = %self.peer, reason, "client disconnected");
    }

    /// The accepted stream may inherit the listener's non-blocking mode;
    /// workers read blocking with a per-read deadline instead.
    fn configure(&self, timeout: Duration) -> std::io::Result<()> {
        self.stream.set_nonblocking(false)?;
        self.stream.set_read_timeout(Some(timeout))
    }

    fn run(&mut self, running: &AtomicBool) -> &'static str {
        let mut buf = vec![0u8; REQUEST_BUFFER_SIZE];
        let mut len = 0;
        let mut timed_out = false;

        while running.load(Ordering::SeqCst) {
            if len == buf.len() {
                buf.resize(buf.len() * 2, 0);
            }

            match self.stream.read(&mut buf[len..]) {
                Ok(0) => return "connection closed by client",
                Ok(n) => {
                    len += n;
                    timed_out = false;
                }
                Err(err) if is_timeout(&err) => {
                    // Each read gets one retry with no new data.
                    if timed_out {
                        return "idle timeout";
                    }
                    timed_out = true;
                    continue;
                }
                Err(err) => {
                    warn!(peer = %self.peer, %err, "read failed");
                    return "read error";
                }
            }

            if still_needs_read(&buf[..len]) {
                continue;
            }

            if let Err(err) = self.exchange(&buf[..len]) {
                warn!(peer = %self.peer, %err, "write failed");
                return "write error";
            }

            len = 0;
        }

        "server shutting down"
    }

    /// Parses one buffered message, dispatches it, and writes the reply.
    /// Malformed requests get a bare `400 Bad Request` and the connection
    /// keeps reading.
    fn exchange(&mut self, raw: &[u8]) -> std::io::Result<()> {
        let reply = match Request::parse(raw) {
            Ok(request) => {
                debug!(
                    peer = %self.peer,
                    method = %request.method,
                    sequence = request.sequence(),
                    "request received"
                );

                let mut packet = Packet::new(request);
                self.dispatcher.dispatch(&mut packet, self.peer);

                debug!(
                    peer = %self.peer,
                    status = packet.response.status_code,
                    "sending response"
                );

                packet.serialize_response()
            }
            Err(err) => {
                warn!(peer = %self.peer, %err, "malformed request");

                let mut response = Response::new();
                response.set_status(400);
                response.serialize("RTSP/1.0", 0)
            }
        };

        self.stream.write_all(&reply)
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
