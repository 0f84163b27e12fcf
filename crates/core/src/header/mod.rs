//! Codecs for structured RTSP header values.
//!
//! RTSP packs small parameter languages into single header values. Two of
//! them matter to the control plane and get typed representations here:
//!
//! - [`Transport`](transport::Transport): transport negotiation during
//!   SETUP (RFC 2326 §12.39).
//! - [`Range`](range::Range): playback positions for PLAY/PAUSE/RECORD
//!   (RFC 2326 §12.29).
//!
//! Both codecs fail on the first malformed token, naming the offending
//! field, and never return a partially decoded value.

pub mod range;
pub mod transport;

pub use range::{NptTime, Range, Smpte, SmpteKind, SmpteTime};
pub use transport::{Delivery, Transport};

use crate::error::{Result, RtspError};

/// Parses a `-`-joined list of one or two port numbers, e.g. `8000-8001`.
pub(crate) fn parse_port_list(value: &str, field: &'static str) -> Result<Vec<u16>> {
    let parts: Vec<&str> = value.split('-').collect();

    if parts.is_empty() || parts.len() > 2 {
        return Err(RtspError::InvalidHeaderField {
            header: "Transport",
            field,
        });
    }

    parts
        .iter()
        .map(|part| {
            part.parse::<u16>().map_err(|_| RtspError::InvalidHeaderField {
                header: "Transport",
                field,
            })
        })
        .collect()
}
