// Duet Replay - Capture replay tool
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Duet Replay
//!
//! Feeds a capture of raw gateway traffic through the decoder and writes one
//! JSON object per accepted frame.
//!
//! ## Usage
//!
//! ```bash
//! # Decode a capture to stdout
//! duet-replay capture.csv
//!
//! # Write to a file and print ingest statistics
//! duet-replay capture.csv --output readings.jsonl --stats
//! ```

mod replay;

use clap::Parser;
use replay::{ReplayConfig, ReplayEngine};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Duet capture replay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture CSV to replay
    input: PathBuf,

    /// Write JSON lines here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Gateway serial stamped on every reading
    #[arg(short, long, default_value = "duet-replay")]
    gateway_serial: String,

    /// Print ingest statistics as JSON to stderr when done
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Duet Replay v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReplayConfig {
        capture_path: args.input.clone(),
        gateway_serial: args.gateway_serial.clone(),
    };
    let mut engine = ReplayEngine::from_csv(config)?;
    info!("Replaying {} rows as {}", engine.row_count(), args.gateway_serial);

    let summary = match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            let summary = engine.run(&mut out)?;
            out.flush()?;
            summary
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            engine.run(&mut out)?
        }
    };

    info!(
        "Replayed {} rows: {} accepted, {} rejected, {} skipped",
        summary.rows, summary.stats.accepted, summary.stats.rejected, summary.skipped
    );

    if args.stats {
        eprintln!("{}", serde_json::to_string_pretty(&summary.stats)?);
    }
    Ok(())
}
