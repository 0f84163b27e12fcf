//! Integration test: full RTSP session lifecycle over a real socket,
//! OPTIONS → DESCRIBE → SETUP → PLAY → PAUSE → TEARDOWN.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use rtsp_control::{ClientHandler, MediaConfig, Server, ServerConfig};

/// Writes one request and reads back status line, headers, and body.
/// Leading blank lines are leftovers of the previous response's terminator
/// and get skipped.
fn rtsp_request(
    stream: &mut TcpStream,
    reader: &mut BufReader<TcpStream>,
    request: &str,
) -> std::io::Result<String> {
    stream.write_all(request.as_bytes())?;
    stream.flush()?;

    let mut response = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if line == "\r\n" || line == "\n" {
            if response.is_empty() {
                continue;
            }
            response.push_str(&line);
            break;
        }
        response.push_str(&line);
    }

    if let Some(len) = response
        .lines()
        .find(|l| l.to_lowercase().starts_with("content-length:"))
        .and_then(|l| l.split(':').nth(1))
        .and_then(|v| v.trim().parse::<usize>().ok())
    {
        if len > 0 {
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body)?;
            response.push_str(&String::from_utf8_lossy(&body));
        }
    }

    Ok(response)
}

fn header_value<'a>(response: &'a str, name: &str) -> &'a str {
    response
        .lines()
        .find(|l| l.to_lowercase().starts_with(&format!("{}:", name.to_lowercase())))
        .and_then(|l| l.split_once(':'))
        .map(|(_, v)| v.trim())
        .unwrap_or("")
}

#[test]
fn full_session_lifecycle() {
    let config = ServerConfig {
        port: 0,
        udp_port_min: 42000,
        udp_port_max: 42003,
        media: MediaConfig {
            port: 8001,
            client_host: "127.0.0.1".to_string(),
        },
        ..ServerConfig::default()
    };

    let handler = ClientHandler::new().on_play(|| {});
    let mut server = Server::new(config, handler).expect("server construction");
    server.start().expect("server start");

    let base_uri = format!("rtsp://127.0.0.1:{}/stream", server.port());

    let mut stream =
        TcpStream::connect(("127.0.0.1", server.port())).expect("connect to server");
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    stream
        .set_write_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    // OPTIONS
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!("OPTIONS {} RTSP/1.0\r\nCSeq: 1\r\n\r\n", base_uri),
    )
    .expect("OPTIONS response");
    assert!(resp.starts_with("RTSP/1.0 200 OK"), "OPTIONS: {}", resp);
    assert_eq!(
        header_value(&resp, "Public"),
        "OPTIONS, DESCRIBE, SETUP, PLAY"
    );

    // DESCRIBE
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!(
            "DESCRIBE {} RTSP/1.0\r\nCSeq: 2\r\nAccept: application/sdp\r\n\r\n",
            base_uri
        ),
    )
    .expect("DESCRIBE response");
    assert!(resp.starts_with("RTSP/1.0 200 OK"), "DESCRIBE: {}", resp);
    assert_eq!(header_value(&resp, "Content-Type"), "application/sdp");
    assert!(resp.contains("v=0"), "DESCRIBE: SDP body missing v=0");
    assert!(
        resp.contains("m=video 8001 RTP/AVP 99"),
        "DESCRIBE: SDP body missing media line"
    );
    assert!(
        resp.contains("a=rtpmap:99 h263-1998/90000"),
        "DESCRIBE: SDP missing rtpmap"
    );

    // SETUP
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!(
            "SETUP {} RTSP/1.0\r\nCSeq: 3\r\nTransport: RTP/AVP;unicast;client_port=5000-5001\r\n\r\n",
            base_uri
        ),
    )
    .expect("SETUP response");
    assert!(resp.starts_with("RTSP/1.0 200 OK"), "SETUP: {}", resp);

    let session_id = header_value(&resp, "Session")
        .split(';')
        .next()
        .unwrap_or("")
        .to_string();
    assert!(!session_id.is_empty(), "SETUP: could not parse Session id");

    let transport = header_value(&resp, "Transport");
    assert!(
        transport.contains("server_port=42000-42001"),
        "SETUP: unexpected Transport grant: {}",
        transport
    );
    assert!(server.ports().occupied(42000));

    // PLAY
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!(
            "PLAY {} RTSP/1.0\r\nCSeq: 4\r\nSession: {}\r\n\r\n",
            base_uri, session_id
        ),
    )
    .expect("PLAY response");
    assert!(resp.starts_with("RTSP/1.0 200 OK"), "PLAY: {}", resp);

    // PAUSE
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!(
            "PAUSE {} RTSP/1.0\r\nCSeq: 5\r\nSession: {}\r\n\r\n",
            base_uri, session_id
        ),
    )
    .expect("PAUSE response");
    assert!(resp.starts_with("RTSP/1.0 200 OK"), "PAUSE: {}", resp);

    // TEARDOWN
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!(
            "TEARDOWN {} RTSP/1.0\r\nCSeq: 6\r\nSession: {}\r\n\r\n",
            base_uri, session_id
        ),
    )
    .expect("TEARDOWN response");
    assert!(resp.starts_with("RTSP/1.0 200 OK"), "TEARDOWN: {}", resp);
    assert!(server.sessions().is_empty());
    assert!(!server.ports().occupied(42000));

    // A second TEARDOWN names a session that no longer exists.
    let resp = rtsp_request(
        &mut stream,
        &mut reader,
        &format!(
            "TEARDOWN {} RTSP/1.0\r\nCSeq: 7\r\nSession: {}\r\n\r\n",
            base_uri, session_id
        ),
    )
    .expect("second TEARDOWN response");
    assert!(
        resp.starts_with("RTSP/1.0 454 Session Not Found"),
        "second TEARDOWN: {}",
        resp
    );

    server.stop().expect("server stop");
}
