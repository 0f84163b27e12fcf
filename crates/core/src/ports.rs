//! UDP port pair allocator for per-session media transport.
//!
//! Server-side RTP/RTCP ports are drawn from a fixed inclusive range in
//! adjacent pairs: the even-offset low port carries RTP, the odd high port
//! RTCP (RFC 3550 §11). [`PortRange`] tracks occupancy of the range and
//! hands out pairs with a rotating cursor so released pairs are eventually
//! reused without unbounded forward drift.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{Result, RtspError};

/// Allocator for a fixed interval of UDP ports, reserved in adjacent pairs.
///
/// Every reservation occupies two consecutive ports whose low half is
/// reachable from `min` by steps of 2. All operations are safe under
/// concurrent use; reservation and release take the writer lock, membership
/// queries only the reader lock.
pub struct PortRange {
    min: u16,
    max: u16,
    capacity: u32,
    inner: RwLock<Occupancy>,
}

struct Occupancy {
    /// Low port of the most recently reserved pair; `None` before the first
    /// reservation.
    current: Option<u16>,
    /// Bidirectional pair mapping: low -> high and high -> low.
    occupied: HashMap<u16, u16>,
}

impl PortRange {
    /// Creates an allocator over the inclusive interval `[min, max]`.
    ///
    /// Fails when `min >= max` or when the interval does not divide evenly
    /// into pairs.
    pub fn new(min: u16, max: u16) -> Result<Self> {
        if min >= max {
            return Err(RtspError::PortRangeBounds);
        }

        let capacity = u32::from(max) - u32::from(min) + 1;

        if capacity % 2 != 0 {
            return Err(RtspError::PortRangeOddSpan);
        }

        Ok(PortRange {
            min,
            max,
            capacity,
            inner: RwLock::new(Occupancy {
                current: None,
                occupied: HashMap::new(),
            }),
        })
    }

    /// Lowest port of the managed interval.
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Highest port of the managed interval.
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Number of individual ports in the interval (twice the pair count).
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Reserves a fresh pair and returns its low port; the low port and
    /// `low + 1` are both occupied until released.
    ///
    /// Scans forward from the previous reservation in steps of 2, wrapping
    /// from `max` back to `min` and skipping occupied pairs. Fails with
    /// [`RtspError::PortRangeExhausted`] once every pair is live.
    pub fn request(&self) -> Result<u16> {
        let mut inner = self.inner.write();

        let Some(current) = inner.current else {
            inner.reserve(self.min);
            tracing::trace!(port = self.min, "reserved first port pair");
            return Ok(self.min);
        };

        if inner.occupied.len() as u32 == self.capacity {
            return Err(RtspError::PortRangeExhausted);
        }

        let mut next = u32::from(current) + 2;

        loop {
            if next > u32::from(self.max) {
                next = u32::from(self.min);
            }

            let candidate = next as u16;

            if inner.occupied.contains_key(&candidate) {
                next += 2;
                continue;
            }

            inner.reserve(candidate);
            tracing::trace!(port = candidate, "reserved port pair");
            return Ok(candidate);
        }
    }

    /// Releases the pair `port` belongs to, whichever half is given.
    /// No-op for ports that are not currently reserved.
    pub fn release(&self, port: u16) {
        let mut inner = self.inner.write();

        let Some(other) = inner.occupied.remove(&port) else {
            return;
        };

        inner.occupied.remove(&other);
        tracing::trace!(port, "released port pair");
    }

    /// Whether `port` (either half of a pair) is currently reserved.
    pub fn occupied(&self, port: u16) -> bool {
        self.inner.read().occupied.contains_key(&port)
    }
}

impl Occupancy {
    fn reserve(&mut self, low: u16) {
        self.current = Some(low);
        self.occupied.insert(low, low + 1);
        self.occupied.insert(low + 1, low);
    }
}
