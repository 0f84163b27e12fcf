//! Error types for the RTSP control-plane library.

use std::fmt;

/// Errors that can occur across the control plane.
///
/// Variants map to specific failure modes:
///
/// - **Framing**: [`Parse`](Self::Parse), malformed RTSP messages.
/// - **Header codecs**: [`InvalidHeaderField`](Self::InvalidHeaderField),
///   a `Transport`/`Range` parameter that failed to decode, named by field.
/// - **Allocator**: [`PortRangeBounds`](Self::PortRangeBounds),
///   [`PortRangeOddSpan`](Self::PortRangeOddSpan),
///   [`PortRangeExhausted`](Self::PortRangeExhausted).
/// - **Sessions**: [`SessionNotFound`](Self::SessionNotFound).
/// - **Server lifecycle**: [`NotStarted`](Self::NotStarted),
///   [`AlreadyRunning`](Self::AlreadyRunning).
/// - **Transport**: [`Io`](Self::Io), socket/network failures.
#[derive(Debug, thiserror::Error)]
pub enum RtspError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an RTSP request message (RFC 2326 §6).
    #[error("RTSP parse error: {kind}")]
    Parse { kind: ParseErrorKind },

    /// A structured header value carried a parameter that failed to decode.
    #[error("invalid '{header}' {field} field")]
    InvalidHeaderField {
        header: &'static str,
        field: &'static str,
    },

    /// [`PortRange::new`](crate::ports::PortRange::new) called with `min >= max`.
    #[error("port range min must be less than max")]
    PortRangeBounds,

    /// [`PortRange::new`](crate::ports::PortRange::new) called with an interval
    /// that does not divide evenly into pairs.
    #[error("port range span must hold an even number of ports")]
    PortRangeOddSpan,

    /// Every pair in the configured UDP port range is reserved.
    #[error("no port pair is available")]
    PortRangeExhausted,

    /// No session with the given ID exists in the
    /// [`SessionRegistry`](crate::session::SessionRegistry).
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// [`Server::start`](crate::Server::start) has not been called yet.
    #[error("server not started")]
    NotStarted,

    /// [`Server::start`](crate::Server::start) was called while already running.
    #[error("server already running")]
    AlreadyRunning,
}

/// Specific kind of RTSP framing failure.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input was empty (no request line).
    EmptyRequest,
    /// No whitespace delimiter after the method token.
    MissingMethod,
    /// No whitespace delimiter after the request target.
    MissingUrl,
    /// The request target could not be parsed as a URL.
    InvalidUrl,
    /// The request line was not terminated by CRLF.
    MissingVersion,
    /// A header line did not contain a colon separator.
    InvalidHeader,
    /// The `Content-Length` value was not an unsigned integer.
    InvalidContentLength,
    /// A body was declared via `Content-Length` but no `Content-Type` was given.
    MissingContentType,
    /// Fewer body bytes were available than `Content-Length` declared.
    ShortBody,
    /// An `application/sdp` body failed to parse.
    InvalidSdp,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRequest => write!(f, "empty request"),
            Self::MissingMethod => write!(f, "missing method"),
            Self::MissingUrl => write!(f, "missing URL"),
            Self::InvalidUrl => write!(f, "invalid URL"),
            Self::MissingVersion => write!(f, "missing version"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::InvalidContentLength => write!(f, "invalid Content-Length"),
            Self::MissingContentType => write!(f, "header without Content-Type"),
            Self::ShortBody => write!(f, "read less bytes than Content-Length"),
            Self::InvalidSdp => write!(f, "invalid SDP body"),
        }
    }
}

/// Convenience alias for `Result<T, RtspError>`.
pub type Result<T> = std::result::Result<T, RtspError>;
