//! `Transport` header codec (RFC 2326 §12.39).

use std::fmt;

use crate::error::{Result, RtspError};

use super::parse_port_list;

/// Delivery mode requested or granted in a `Transport` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Unicast,
    Multicast,
}

impl Delivery {
    fn flag(self) -> &'static str {
        match self {
            Delivery::Unicast => "unicast",
            Delivery::Multicast => "multicast",
        }
    }
}

/// Canonical serialization order for keyed parameters. Keys not listed here
/// serialize after these, in insertion order.
const KEY_ORDER: [&str; 9] = [
    "port",
    "client_port",
    "server_port",
    "interleaved",
    "ttl",
    "layers",
    "destination",
    "ssrc",
    "mode",
];

/// A parsed or server-constructed `Transport` header value.
///
/// Parsing splits the value on `;`: the segment containing `/` sets
/// transport/profile/lower-transport positionally (lower-transport defaults
/// to UDP when omitted), `key=value` segments become keyed parameters, and
/// bare segments become flags. Recognized parameters are additionally
/// decoded into the typed fields below.
///
/// Pair-valued parameters (`port`, `client_port`, `server_port`,
/// `interleaved`) always hold exactly one or two integers; a single value
/// serializes without a range separator, two values with one.
#[derive(Debug, Default, Clone)]
pub struct Transport {
    /// Transport protocol name, e.g. `RTP`.
    pub transport: String,
    /// Transport profile, e.g. `AVP`.
    pub profile: String,
    /// Lower transport, `UDP` or `TCP`.
    pub lower_transport: String,
    /// Unicast/multicast delivery, when a flag was present.
    pub delivery: Option<Delivery>,
    /// `destination=` address.
    pub destination: Option<String>,
    /// `layers=` count for layered encodings.
    pub layers: Option<u32>,
    /// `mode=` value, e.g. `PLAY`.
    pub mode: Option<String>,
    /// Whether the `append` flag was present.
    pub append: bool,
    /// `interleaved=` RTP/RTCP channel pair.
    pub interleaved: Vec<u16>,
    /// `ttl=` for multicast delivery.
    pub ttl: Option<u32>,
    /// `port=` multicast port pair.
    pub rtp_port: Vec<u16>,
    /// `client_port=` pair.
    pub client_port: Vec<u16>,
    /// `server_port=` pair.
    pub server_port: Vec<u16>,
    /// `ssrc=` synchronization source identifier.
    pub ssrc: Option<String>,

    parameters: Vec<(String, String)>,
    flags: Vec<String>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Transport` header value into its typed representation.
    pub fn parse(value: &str) -> Result<Self> {
        let mut t = Transport::new();

        for segment in value.split(';') {
            let segment = segment.trim();

            if segment.contains('/') {
                let mut fields = segment.split('/');
                t.transport = fields.next().unwrap_or_default().to_string();

                if let Some(profile) = fields.next() {
                    t.profile = profile.to_string();
                    // Lower transport defaults to UDP when omitted.
                    t.lower_transport = fields.next().unwrap_or("UDP").to_string();
                }
            } else if let Some((key, v)) = segment.split_once('=') {
                t.parameters.push((key.to_string(), v.to_string()));
            } else if !segment.is_empty() {
                t.flags.push(segment.to_string());
            }
        }

        if let Some(v) = t.parameter("port").map(str::to_string) {
            t.rtp_port = parse_port_list(&v, "port")?;
        }

        if let Some(v) = t.parameter("client_port").map(str::to_string) {
            t.client_port = parse_port_list(&v, "client_port")?;
        }

        if let Some(v) = t.parameter("server_port").map(str::to_string) {
            t.server_port = parse_port_list(&v, "server_port")?;
        }

        if let Some(v) = t.parameter("interleaved").map(str::to_string) {
            t.interleaved = parse_port_list(&v, "interleaved")?;
        }

        if let Some(v) = t.parameter("ttl").map(str::to_string) {
            t.ttl = Some(v.parse().map_err(|_| RtspError::InvalidHeaderField {
                header: "Transport",
                field: "ttl",
            })?);
        }

        if let Some(v) = t.parameter("layers").map(str::to_string) {
            t.layers = Some(v.parse().map_err(|_| RtspError::InvalidHeaderField {
                header: "Transport",
                field: "layers",
            })?);
        }

        t.destination = t.parameter("destination").map(str::to_string);
        t.ssrc = t.parameter("ssrc").map(str::to_string);
        t.mode = t.parameter("mode").map(str::to_string);

        for flag in &t.flags {
            match flag.as_str() {
                "append" => t.append = true,
                "unicast" => t.delivery = Some(Delivery::Unicast),
                "multicast" => t.delivery = Some(Delivery::Multicast),
                _ => {}
            }
        }

        Ok(t)
    }

    /// Raw value of a keyed parameter.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a keyed parameter is present.
    pub fn has_parameter(&self, key: &str) -> bool {
        self.parameter(key).is_some()
    }

    /// Sets a keyed parameter, replacing any existing value.
    pub fn set_parameter(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.parameters.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.parameters.push((key.to_string(), value.to_string()));
        }
    }

    /// Sets a one-or-two-valued port parameter, e.g. `server_port=39000-39001`.
    pub fn set_port_pair(&mut self, key: &str, low: u16, high: Option<u16>) {
        let value = match high {
            Some(high) => format!("{}-{}", low, high),
            None => low.to_string(),
        };
        self.set_parameter(key, &value);
    }

    /// Adds a flag-only parameter, e.g. `append`.
    pub fn push_flag(&mut self, flag: &str) {
        if !self.flags.iter().any(|f| f == flag) {
            self.flags.push(flag.to_string());
        }
    }

    /// Sets the delivery mode and its corresponding flag.
    pub fn set_delivery(&mut self, delivery: Delivery) {
        self.delivery = Some(delivery);
        self.push_flag(delivery.flag());
    }

    /// Sets transport protocol, profile, and lower transport at once,
    /// e.g. `RTP`/`AVP`/`UDP`.
    pub fn set_protocol(&mut self, transport: &str, profile: &str, lower: &str) {
        self.transport = transport.to_string();
        self.profile = profile.to_string();
        self.lower_transport = lower.to_string();
    }

    fn ordered_parameters(&self) -> Vec<&(String, String)> {
        let rank = |key: &str| {
            KEY_ORDER
                .iter()
                .position(|k| *k == key)
                .unwrap_or(KEY_ORDER.len())
        };

        let mut params: Vec<&(String, String)> = self.parameters.iter().collect();
        params.sort_by_key(|(k, _)| rank(k));
        params
    }
}

impl fmt::Display for Transport {
    /// Serializes in the canonical order: `proto/profile/lower`, flags in
    /// insertion order, then keyed parameters in [`KEY_ORDER`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transport)?;

        if !self.profile.is_empty() {
            write!(f, "/{}", self.profile)?;
        }

        if !self.lower_transport.is_empty() {
            write!(f, "/{}", self.lower_transport)?;
        }

        for flag in &self.flags {
            write!(f, ";{}", flag)?;
        }

        for (key, value) in self.ordered_parameters() {
            write!(f, ";{}={}", key, value)?;
        }

        Ok(())
    }
}
