//! Session description for the advertised media stream (RFC 2327).

use crate::error::Result;
use crate::server::MediaConfig;

/// Builds the session description DESCRIBE hands out: a single H.263 video
/// stream at the configured media port.
pub fn session_description(config: &MediaConfig) -> sdp_types::Session {
    sdp_types::Session {
        origin: sdp_types::Origin {
            username: None,
            sess_id: "0".into(),
            sess_version: 0,
            nettype: "IN".into(),
            addrtype: "IP4".into(),
            unicast_address: "127.0.0.1".into(),
        },
        session_name: "video forwarding".into(),
        session_description: None,
        uri: None,
        emails: vec![],
        phones: vec![],
        connection: Some(sdp_types::Connection {
            nettype: "IN".into(),
            addrtype: "IP4".into(),
            connection_address: config.client_host.clone(),
        }),
        bandwidths: vec![],
        times: vec![sdp_types::Time {
            start_time: 0,
            stop_time: 0,
            repeats: vec![],
        }],
        time_zones: vec![],
        key: None,
        attributes: vec![],
        medias: vec![sdp_types::Media {
            media: "video".into(),
            port: config.port,
            num_ports: None,
            proto: "RTP/AVP".into(),
            fmt: "99".into(),
            media_title: None,
            connections: vec![],
            bandwidths: vec![],
            key: None,
            attributes: vec![sdp_types::Attribute {
                attribute: "rtpmap".into(),
                value: Some("99 h263-1998/90000".into()),
            }],
        }],
    }
}

/// Serialized form of [`session_description`], ready to use as a
/// DESCRIBE response body.
pub fn describe(config: &MediaConfig) -> Result<Vec<u8>> {
    let session = session_description(config);
    let mut bytes = Vec::new();
    session.write(&mut bytes)?;
    Ok(bytes)
}
