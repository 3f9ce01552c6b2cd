//! Speicher Relay Binary
//!
//! Runs an echo relay: every byte received is sent back unchanged. Useful
//! for checking framing by hand without a storage server.

use clap::Parser;
use speicher::network::Relay;
use tracing_subscriber::{fmt, EnvFilter};

/// Speicher echo relay
#[derive(Parser, Debug)]
#[command(name = "speicher-relay")]
#[command(about = "Loopback echo relay for the Speicher wire protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:14567")]
    listen: String,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,speicher=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Speicher relay v{}", speicher::VERSION);

    let relay = match Relay::echo_on(&args.listen) {
        Ok(relay) => relay,
        Err(e) => {
            tracing::error!("Failed to start relay: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listen address: {}", relay.local_addr());
    relay.wait();
}
