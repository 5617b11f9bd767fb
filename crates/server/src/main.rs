use std::path::PathBuf;

use clap::Parser;
use rtmpd_context::Handler;
use rtmpd_rtmp::registry::StreamRegistry;
use rtmpd_rtmp::Session;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// A pure Rust RTMP server: handshake, chunking, AMF0 commands, and
/// publisher/subscriber fan-out over a single process-wide stream registry.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to accept RTMP connections on.
    #[arg(long, default_value = "0.0.0.0:1935")]
    bind: String,

    /// Directory to write published streams to as FLV files. Omit to
    /// disable recording.
    #[arg(long)]
    record_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Some(dir) = &args.record_dir {
        if let Err(err) = std::fs::create_dir_all(dir) {
            error!(error = %err, dir = %dir.display(), "failed to create recordings directory");
            std::process::exit(1);
        }
    }

    let listener = match TcpListener::bind(&args.bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, bind = %args.bind, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(bind = %args.bind, "listening for rtmp connections");

    let registry = StreamRegistry::new();
    let handler = Handler::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "failed to accept connection");
                        continue;
                    }
                };

                if let Err(err) = socket.set_nodelay(true) {
                    warn!(error = %err, "failed to set TCP_NODELAY");
                }

                let registry = registry.clone();
                let record_dir = args.record_dir.clone();
                let (ctx, _child_handler) = handler.new_child();

                tokio::spawn(async move {
                    info!(%peer_addr, "connection accepted");
                    let session = Session::new(registry, record_dir, ctx);
                    if let Err(err) = session.run(socket).await {
                        warn!(%peer_addr, error = %err, "session ended with an error");
                    } else {
                        info!(%peer_addr, "session ended");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    handler.shutdown().await;
}
