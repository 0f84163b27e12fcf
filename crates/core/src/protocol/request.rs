//! Request parsing: raw bytes into a structured RTSP request.

use url::Url;

use crate::auth::Credentials;
use crate::error::{ParseErrorKind, Result, RtspError};

use super::HeaderMap;

/// Media type that gets its body decoded into a structured session
/// description; everything else passes through raw.
pub const SDP_CONTENT_TYPE: &str = "application/sdp";

/// Completeness probe for the read loop: a message still needs more bytes
/// until the buffer ends with the `\r\n\r\n` terminator.
///
/// A body whose final bytes happen to be `\r\n\r\n` can satisfy this probe
/// early; a content-length-aware check would close that gap.
pub fn still_needs_read(buf: &[u8]) -> bool {
    buf.len() < 4 || !buf.ends_with(b"\r\n\r\n")
}

/// A parsed RTSP request (RFC 2326 §6).
///
/// Immutable once parsed, for the lifetime of one exchange.
#[derive(Debug)]
pub struct Request {
    /// RTSP method token (OPTIONS, DESCRIBE, SETUP, ...).
    pub method: String,
    /// Raw request target as received.
    pub uri: String,
    /// Parsed form of the target; `None` for the `*` target.
    pub url: Option<Url>,
    /// Protocol version token (expected: `RTSP/1.0`).
    pub version: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw body bytes, present only when `Content-Length` was given.
    pub body: Option<Vec<u8>>,
    /// Decoded session description for `application/sdp` bodies.
    pub sdp: Option<sdp_types::Session>,

    sequence: u64,
}

impl Request {
    /// Parses one complete RTSP request from an accumulated buffer.
    ///
    /// The request line is scanned token by token so the diagnostics name
    /// the first missing delimiter: method, then URL, then version. Header
    /// lines follow as MIME-style `Name: value` pairs up to a blank line.
    /// A body is read only when `Content-Length` is present and must be
    /// fully captured; a short body is a hard failure.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.is_empty() {
            return Err(parse_error(ParseErrorKind::EmptyRequest));
        }

        let (method, mut offset) = scan_token(buf, 0, ParseErrorKind::MissingMethod)?;

        let (uri, next) = scan_token(buf, offset, ParseErrorKind::MissingUrl)?;
        offset = next;

        let url = if uri == "*" {
            None
        } else {
            Some(Url::parse(&uri).map_err(|_| parse_error(ParseErrorKind::InvalidUrl))?)
        };

        let (version, next) = scan_version(buf, offset)?;
        offset = next;

        let mut headers = HeaderMap::new();

        while offset < buf.len() {
            let (line, next) = read_line(buf, offset);
            offset = next;

            if line.is_empty() {
                break;
            }

            let text = String::from_utf8_lossy(line);
            let (name, value) = text
                .split_once(':')
                .ok_or_else(|| parse_error(ParseErrorKind::InvalidHeader))?;

            headers.add(name.trim(), value.trim());
        }

        let mut body = None;
        let mut sdp = None;

        if let Some(declared) = headers.get("Content-Length") {
            let length: usize = declared
                .trim()
                .parse()
                .map_err(|_| parse_error(ParseErrorKind::InvalidContentLength))?;

            // Advance past any blank separator lines before the body.
            while offset < buf.len() && (buf[offset] == b'\r' || buf[offset] == b'\n') {
                offset += 1;
            }

            if buf.len() - offset < length {
                return Err(parse_error(ParseErrorKind::ShortBody));
            }

            let bytes = buf[offset..offset + length].to_vec();

            match headers.get("Content-Type") {
                None => return Err(parse_error(ParseErrorKind::MissingContentType)),
                Some(SDP_CONTENT_TYPE) => {
                    let session = sdp_types::Session::parse(&bytes)
                        .map_err(|_| parse_error(ParseErrorKind::InvalidSdp))?;
                    sdp = Some(session);
                }
                Some(_) => {}
            }

            body = Some(bytes);
        }

        let sequence = headers
            .get("Cseq")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);

        Ok(Request {
            method,
            uri,
            url,
            version,
            headers,
            body,
            sdp,
            sequence,
        })
    }

    /// Sequence number from the `Cseq` header (RFC 2326 §12.17), or 0 when
    /// absent or unparsable.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Session ID from the `Session` header, with any `;timeout=...` suffix
    /// stripped.
    pub fn session_id(&self) -> Option<&str> {
        self.headers
            .get("Session")
            .and_then(|value| value.split(';').next())
            .map(str::trim)
    }

    /// Credentials carried in an `Authorization: Basic` header, if any.
    /// Carried only; no validation happens here.
    pub fn credentials(&self) -> Option<Credentials> {
        self.headers.get("Authorization").and_then(Credentials::from_basic)
    }
}

fn parse_error(kind: ParseErrorKind) -> RtspError {
    RtspError::Parse { kind }
}

/// Extracts the token starting at `offset`, delimited by space or tab.
fn scan_token(buf: &[u8], offset: usize, missing: ParseErrorKind) -> Result<(String, usize)> {
    for i in offset..buf.len() {
        if buf[i] == b' ' || buf[i] == b'\t' {
            let token = String::from_utf8_lossy(&buf[offset..i]).into_owned();
            return Ok((token, i + 1));
        }
    }

    Err(parse_error(missing))
}

/// Extracts the version token, terminated by CRLF (a bare LF is tolerated).
fn scan_version(buf: &[u8], offset: usize) -> Result<(String, usize)> {
    for i in offset..buf.len() {
        match buf[i] {
            b'\r' => {
                if buf.get(i + 1) != Some(&b'\n') {
                    return Err(parse_error(ParseErrorKind::MissingVersion));
                }
                let version = String::from_utf8_lossy(&buf[offset..i]).into_owned();
                return Ok((version, i + 2));
            }
            b'\n' => {
                let version = String::from_utf8_lossy(&buf[offset..i]).into_owned();
                return Ok((version, i + 1));
            }
            _ => {}
        }
    }

    Err(parse_error(ParseErrorKind::MissingVersion))
}

/// Returns the next line (without its terminator) and the offset past it.
fn read_line(buf: &[u8], offset: usize) -> (&[u8], usize) {
    match buf[offset..].iter().position(|&b| b == b'\n') {
        Some(i) => {
            let end = offset + i;
            let trimmed = if end > offset && buf[end - 1] == b'\r' {
                end - 1
            } else {
                end
            };
            (&buf[offset..trimmed], end + 1)
        }
        None => (&buf[offset..], buf.len()),
    }
}
