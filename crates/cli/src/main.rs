use clap::Parser;
use tracing::info;

use rtsp_control::{ClientHandler, MediaConfig, Server, ServerConfig};

/// Standalone RTSP control-plane server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TCP port to listen on for RTSP requests.
    #[arg(long, default_value_t = 8554)]
    port: u16,

    /// Low end of the UDP range used for media port pairs.
    #[arg(long, default_value_t = 39000)]
    udp_port_min: u16,

    /// High end of the UDP range used for media port pairs.
    #[arg(long, default_value_t = 45001)]
    udp_port_max: u16,

    /// Host advertised in the session description.
    #[arg(long, default_value = "127.0.0.1")]
    media_host: String,

    /// Port advertised in the session description.
    #[arg(long, default_value_t = 8001)]
    media_port: u16,
}

fn main() -> rtsp_control::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = ServerConfig {
        port: args.port,
        udp_port_min: args.udp_port_min,
        udp_port_max: args.udp_port_max,
        media: MediaConfig {
            port: args.media_port,
            client_host: args.media_host,
        },
        ..ServerConfig::default()
    };

    let handler = ClientHandler::new()
        .on_play(|| info!("client requested playback"))
        .on_pause(|| info!("client requested pause"))
        .on_teardown(|| info!("client tore the session down"));

    let mut server = Server::new(config, handler)?;
    server.start()?;

    println!("server running on port {}, press Enter to stop", server.port());
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);

    server.stop()?;
    Ok(())
}
