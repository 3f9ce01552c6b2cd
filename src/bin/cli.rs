//! Speicher CLI Client
//!
//! Command-line interface for issuing one command against the storage service.

use clap::{Parser, Subcommand};
use serde_json::Value;
use speicher::config::{parse_timeout_secs, DEFAULT_HOST, DEFAULT_PORT};
use speicher::{Client, Config, Lookup};
use tracing_subscriber::{fmt, EnvFilter};

/// Speicher CLI
#[derive(Parser, Debug)]
#[command(name = "speicher-cli")]
#[command(about = "CLI for the Speicher key-value store")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Socket timeout in seconds
    #[arg(short, long, default_value = "10.0")]
    timeout: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set (JSON, or a plain string; `null` deletes)
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Delete all keys
    Rst,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> speicher::Result<()> {
    let config = Config::builder()
        .host(args.host)
        .port(args.port)
        .timeout(parse_timeout_secs(&args.timeout)?)
        .build();

    tracing::debug!("Using server {}", config.addr());
    let mut client = Client::new(config);

    match args.command {
        Commands::Get { key } => match client.get(&key)? {
            Lookup::Found(value) => println!("{}", value),
            Lookup::Absent => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            client.set(&key, &parse_value(value))?;
            println!("OK");
        }
        Commands::Del { key } => {
            let deleted = client.delete(&key)?;
            println!("{}", if deleted { "1" } else { "0" });
        }
        Commands::Rst => {
            client.reset()?;
            println!("OK");
        }
    }

    client.close();
    Ok(())
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}
