//! RTSP message framing (RFC 2326 §4, §6, §7).
//!
//! RTSP messages follow HTTP/1.1 syntax with a different method set:
//!
//! ```text
//! SETUP rtsp://server/stream RTSP/1.0\r\n
//! Cseq: 3\r\n
//! Transport: RTP/AVP;unicast;client_port=8000-8001\r\n
//! \r\n
//! ```
//!
//! [`Request::parse`] turns an accumulated byte buffer into a structured
//! request; [`Response::serialize`] writes a response back to the wire.
//! [`Packet`] couples the two for the lifetime of one exchange.

pub mod request;
pub mod response;

pub use request::{still_needs_read, Request};
pub use response::Response;

/// Ordered header collection with case-insensitive name lookup
/// (RFC 2326 §4.2). A name may carry more than one value.
#[derive(Debug, Default, Clone)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, merging into an existing entry when the name is
    /// already present (ignoring case).
    pub fn add(&mut self, name: &str, value: &str) {
        if let Some((_, values)) = self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            values.push(value.to_string());
        } else {
            self.entries
                .push((name.to_string(), vec![value.to_string()]));
        }
    }

    /// First value for `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).and_then(|values| {
            values.first().map(String::as_str)
        })
    }

    /// All values for `name`, case-insensitive.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One request/response exchange in flight on a connection.
pub struct Packet {
    pub request: Request,
    pub response: Response,
}

impl Packet {
    pub fn new(request: Request) -> Self {
        Packet {
            request,
            response: Response::new(),
        }
    }

    /// Serializes the response, echoing the request's version and sequence
    /// number.
    pub fn serialize_response(&self) -> Vec<u8> {
        self.response
            .serialize(&self.request.version, self.request.sequence())
    }
}
