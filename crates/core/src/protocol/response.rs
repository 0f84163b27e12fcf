//! Response construction and serialization.

use std::io::Write;

use crate::status::status_text;

use super::HeaderMap;

/// An RTSP response (RFC 2326 §7), built incrementally by the method
/// handlers and serialized once per exchange.
///
/// Starts out as `200 OK`; handlers overwrite the status on failure paths.
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Response {
    pub fn new() -> Self {
        Response {
            status_code: 200,
            status_text: status_text(200).to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the status code with its fixed status text.
    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
        self.status_text = status_text(code).to_string();
    }

    /// Sets the status code with a custom descriptive message.
    pub fn set_status_message(&mut self, code: u16, message: &str) {
        self.status_code = code;
        self.status_text = message.to_string();
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    /// Serializes to the RTSP wire format: status line, `Cseq` echo of the
    /// originating request, one line per header, a blank line, the body if
    /// present, and a trailing blank line.
    pub fn serialize(&self, version: &str, sequence: u64) -> Vec<u8> {
        let mut out = Vec::new();

        // Writes to a Vec cannot fail.
        let _ = write!(
            out,
            "{} {} {}\r\n",
            version, self.status_code, self.status_text
        );
        let _ = write!(out, "Cseq: {}\r\n", sequence);

        for (name, values) in self.headers.iter() {
            for value in values {
                let _ = write!(out, "{}: {}\r\n", name, value);
            }
        }

        out.extend_from_slice(b"\r\n");

        if let Some(body) = &self.body {
            out.extend_from_slice(body);
            out.extend_from_slice(b"\r\n");
        }

        out.extend_from_slice(b"\r\n");
        out
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_without_body() {
        let mut resp = Response::new();
        resp.add_header("Public", "OPTIONS, DESCRIBE, SETUP");

        let bytes = resp.serialize("RTSP/1.0", 7);
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("RTSP/1.0 200 OK\r\n"));
        assert!(text.contains("Cseq: 7\r\n"));
        assert!(text.contains("Public: OPTIONS, DESCRIBE, SETUP\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn serialize_with_body() {
        let mut resp = Response::new();
        resp.add_header("Content-Length", "5");
        resp.set_body(b"v=0\r\n".to_vec());

        let text = String::from_utf8(resp.serialize("RTSP/1.0", 2)).unwrap();
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.contains("\r\n\r\nv=0\r\n"));
        assert!(text.ends_with("v=0\r\n\r\n\r\n"));
    }

    #[test]
    fn error_status_texts() {
        let mut resp = Response::new();
        resp.set_status(454);
        assert_eq!(resp.status_text, "Session Not Found");

        resp.set_status_message(500, "server doesn't have available ports to transfer");
        let text = String::from_utf8(resp.serialize("RTSP/1.0", 0)).unwrap();
        assert!(text.starts_with(
            "RTSP/1.0 500 server doesn't have available ports to transfer\r\n"
        ));
    }
}
