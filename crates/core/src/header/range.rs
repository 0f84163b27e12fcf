//! `Range` header codec (RFC 2326 §12.29 and §3.5-3.7).

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{Result, RtspError};

/// UTC clock timestamp format, `YYYYMMDDThhmmssZ` (RFC 2326 §3.7).
const TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";
/// Same with an optional fractional second, used by `clock=` values.
const CLOCK_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";

/// Serialization order for `Range` parameters.
const KEY_ORDER: [&str; 6] = ["npt", "smpte", "smpte-30-drop", "smpte-25", "clock", "time"];

/// A normal play time position (RFC 2326 §3.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NptTime {
    /// The literal `now`.
    Now,
    /// Bare `sec[.frac]`.
    Seconds { seconds: u32, fraction: u32 },
    /// `hh:mm:ss[.frac]`.
    Hms {
        hours: u32,
        minutes: u32,
        seconds: u32,
        fraction: u32,
    },
}

impl NptTime {
    fn parse(value: &str) -> Result<Self> {
        if value == "now" {
            return Ok(NptTime::Now);
        }

        if value.contains(':') {
            let fields: Vec<&str> = value.split(':').collect();

            if fields.len() != 3 {
                return Err(field_error("npt", "time"));
            }

            let hours = fields[0].parse().map_err(|_| field_error("npt", "hours"))?;
            let minutes = fields[1]
                .parse()
                .map_err(|_| field_error("npt", "minutes"))?;
            let (seconds, fraction) = parse_seconds(fields[2])?;

            return Ok(NptTime::Hms {
                hours,
                minutes,
                seconds,
                fraction,
            });
        }

        let (seconds, fraction) = parse_seconds(value)?;
        Ok(NptTime::Seconds { seconds, fraction })
    }
}

/// SMPTE timecode flavor selected by the parameter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmpteKind {
    /// `smpte` - 30 frames/s.
    Simple,
    /// `smpte-30-drop`.
    Drop30,
    /// `smpte-25`.
    Fps25,
}

impl SmpteKind {
    fn key(self) -> &'static str {
        match self {
            SmpteKind::Simple => "smpte",
            SmpteKind::Drop30 => "smpte-30-drop",
            SmpteKind::Fps25 => "smpte-25",
        }
    }
}

/// One `hours:minutes:seconds:frames[.subframes]` timecode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmpteTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    pub subframes: u32,
}

impl SmpteTime {
    fn parse(value: &str) -> Result<Self> {
        let fields: Vec<&str> = value.split(':').collect();

        if fields.is_empty() || fields.len() > 4 {
            return Err(field_error("smpte", "time"));
        }

        let mut time = SmpteTime::default();

        if let Some(hours) = fields.first() {
            time.hours = hours.parse().map_err(|_| field_error("smpte", "hours"))?;
        }

        if let Some(minutes) = fields.get(1) {
            time.minutes = minutes
                .parse()
                .map_err(|_| field_error("smpte", "minutes"))?;
        }

        if let Some(seconds) = fields.get(2) {
            time.seconds = seconds
                .parse()
                .map_err(|_| field_error("smpte", "seconds"))?;
        }

        if let Some(frames) = fields.get(3) {
            if let Some((frames, subframes)) = frames.split_once('.') {
                time.frames = frames.parse().map_err(|_| field_error("smpte", "frames"))?;
                time.subframes = subframes
                    .parse()
                    .map_err(|_| field_error("smpte", "subframes"))?;
            } else {
                time.frames = frames.parse().map_err(|_| field_error("smpte", "frames"))?;
            }
        }

        Ok(time)
    }
}

/// An SMPTE range position: flavor plus its ordered timecodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smpte {
    pub kind: SmpteKind,
    pub times: Vec<SmpteTime>,
}

/// A parsed `Range` header value.
///
/// Parsing splits on `;`, then each parameter on `=`; a value containing
/// `-` is treated as a two-element range. Unrecognized parameters are kept
/// for serialization but not decoded.
#[derive(Debug, Clone, Default)]
pub struct Range {
    /// Decoded `npt=` values.
    pub npt: Vec<NptTime>,
    /// Decoded `smpte`/`smpte-30-drop`/`smpte-25` value, mutually exclusive.
    pub smpte: Option<Smpte>,
    /// Decoded `clock=` pair; always zero or two timestamps.
    pub clock: Vec<NaiveDateTime>,
    /// Decoded `time=` timestamp.
    pub time: Option<NaiveDateTime>,

    parameters: Vec<(String, Vec<String>)>,
}

impl Range {
    /// Parses a `Range` header value.
    pub fn parse(value: &str) -> Result<Self> {
        let mut r = Range::default();

        for segment in value.split(';') {
            if let Some((key, v)) = segment.trim().split_once('=') {
                let values: Vec<String> = if v.contains('-') {
                    v.split('-').map(str::to_string).collect()
                } else {
                    vec![v.to_string()]
                };

                r.parameters.push((key.to_string(), values));
            }
        }

        if let Some(values) = r.values("time") {
            let t = NaiveDateTime::parse_from_str(&values[0], TIME_FORMAT)
                .map_err(|_| field_error("time", "timestamp"))?;
            r.time = Some(t);
        }

        if let Some(values) = r.values("clock") {
            if values.len() != 2 {
                return Err(field_error("clock", "timestamp pair"));
            }

            for v in &values {
                let t = NaiveDateTime::parse_from_str(v, CLOCK_FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(v, TIME_FORMAT))
                    .map_err(|_| field_error("clock", "timestamp"))?;
                r.clock.push(t);
            }
        }

        let mut smpte: Option<(SmpteKind, Vec<String>)> = None;

        for kind in [SmpteKind::Simple, SmpteKind::Drop30, SmpteKind::Fps25] {
            if let Some(values) = r.values(kind.key()) {
                if smpte.is_some() {
                    return Err(field_error("smpte", "flavor"));
                }
                smpte = Some((kind, values));
            }
        }

        if let Some((kind, values)) = smpte {
            let mut times = Vec::with_capacity(values.len());

            for v in &values {
                times.push(SmpteTime::parse(v)?);
            }

            r.smpte = Some(Smpte { kind, times });
        }

        if let Some(values) = r.values("npt") {
            for v in &values {
                let npt = NptTime::parse(v)?;
                r.npt.push(npt);
            }
        }

        Ok(r)
    }

    fn values(&self, key: &str) -> Option<Vec<String>> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn ordered_parameters(&self) -> Vec<&(String, Vec<String>)> {
        let rank = |key: &str| {
            KEY_ORDER
                .iter()
                .position(|k| *k == key)
                .unwrap_or(KEY_ORDER.len())
        };

        let mut params: Vec<&(String, Vec<String>)> = self.parameters.iter().collect();
        params.sort_by_key(|(k, _)| rank(k));
        params
    }
}

impl fmt::Display for Range {
    /// Serializes parameters in [`KEY_ORDER`], unrecognized keys last.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, values)) in self.ordered_parameters().into_iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }

            match values.as_slice() {
                [single] => write!(f, "{}={}", key, single)?,
                [start, end] => write!(f, "{}={}-{}", key, start, end)?,
                _ => write!(f, "{}={}", key, values.join("-"))?,
            }
        }

        Ok(())
    }
}

fn field_error(header: &'static str, field: &'static str) -> RtspError {
    RtspError::InvalidHeaderField { header, field }
}

fn parse_seconds(value: &str) -> Result<(u32, u32)> {
    if let Some((seconds, fraction)) = value.split_once('.') {
        let seconds = seconds
            .parse()
            .map_err(|_| field_error("npt", "seconds"))?;
        let fraction = fraction
            .parse()
            .map_err(|_| field_error("npt", "seconds fraction"))?;
        Ok((seconds, fraction))
    } else {
        let seconds = value
            .parse()
            .map_err(|_| field_error("npt", "seconds"))?;
        Ok((seconds, 0))
    }
}
