//! cnclink CLI
//!
//! Command-line interface for querying a controller.

use std::process;

use clap::{Parser, Subcommand};
use cnclink::fallback::FallbackChain;
use cnclink::{Config, Result, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// cnclink CLI
#[derive(Parser, Debug)]
#[command(name = "cnclink-cli")]
#[command(about = "Query a CNC controller over its binary TCP protocol")]
#[command(version)]
struct Args {
    /// Controller host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Controller port
    #[arg(short, long, default_value_t = cnclink::config::DEFAULT_PORT)]
    port: u16,

    /// Connect/read/write timeout in milliseconds (0 disables)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Session-open payload as hex (defaults to 16 zero bytes)
    #[arg(long, value_parser = parse_hex)]
    handshake_hex: Option<HexBytes>,

    /// Accept responses whose request id does not match
    #[arg(long)]
    lenient_ids: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a session and print the handle
    Ping,

    /// Read a spindle load meter
    SpindleLoad {
        /// Spindle index (0 = main spindle)
        #[arg(short, long, default_value = "0")]
        spindle: u16,

        /// Spindle to read instead if the first read fails
        #[arg(long)]
        fallback_spindle: Option<u16>,
    },

    /// Send an arbitrary function code and print the response payload
    Raw {
        /// Function code (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_u16)]
        function: u16,

        /// Request payload as hex
        #[arg(long, value_parser = parse_hex)]
        payload_hex: Option<HexBytes>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cnclink=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("cnclink v{}", cnclink::VERSION);
    tracing::info!("Controller: {}:{}", args.host, args.port);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut builder = Config::builder()
        .host(&args.host)
        .port(args.port)
        .timeout_ms(args.timeout_ms)
        .strict_request_id(!args.lenient_ids);
    if let Some(HexBytes(payload)) = args.handshake_hex {
        builder = builder.handshake_payload(payload);
    }

    let session = Session::open(builder.build())?;

    let outcome = match args.command {
        Commands::Ping => {
            if let Some(handle) = session.handle() {
                println!("Session handle: {}", handle);
            }
            Ok(())
        }
        Commands::SpindleLoad {
            spindle,
            fallback_spindle,
        } => {
            let session = &session;
            let mut chain =
                FallbackChain::new().then("requested spindle", || session.read_spindle_load(spindle));
            if let Some(other) = fallback_spindle {
                chain = chain.then("fallback spindle", move || session.read_spindle_load(other));
            }
            chain.run().map(|load| println!("Spindle Load: {} %", load))
        }
        Commands::Raw {
            function,
            payload_hex,
        } => session
            .request(function, payload_hex.map(|hex| hex.0).unwrap_or_default())
            .map(|payload| println!("{}", to_hex(&payload))),
    };

    session.close();
    outcome
}

fn parse_u16(s: &str) -> std::result::Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid function code '{}': {}", s, e))
}

/// Bytes given on the command line as hex
#[derive(Debug, Clone)]
struct HexBytes(Vec<u8>);

fn parse_hex(s: &str) -> std::result::Result<HexBytes, String> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&digits)
        .map(HexBytes)
        .map_err(|e| format!("invalid hex '{}': {}", s, e))
}

/// Upper-case hex, one space between bytes
fn to_hex(bytes: &[u8]) -> String {
    bytes
        .chunks(1)
        .map(hex::encode_upper)
        .collect::<Vec<_>>()
        .join(" ")
}
