// Duet Replay - Capture replay engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Capture replay engine.
//!
//! A capture is a CSV file with one received frame per row:
//!
//! ```text
//! received_unix,source,payload,snr,rssi,hops,sent_ms
//! 1700000000,serial,"4 6 77 5000 ...",,,,
//! 1700000003,radio,0400034d...,7,-101,1,9500
//! ```
//!
//! Radio payloads are hex, version bytes included. The radio metadata columns
//! stay empty on serial rows.

use duet::{FrameSource, RadioMetadata};
use duet_gateway::{to_json_line, Gateway, GatewayConfig, IngestStats};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration for capture replay.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Path to the capture CSV.
    pub capture_path: PathBuf,
    /// Gateway serial stamped on every reading.
    pub gateway_serial: String,
}

/// One captured frame.
#[derive(Debug, Clone, Deserialize)]
struct CaptureRow {
    received_unix: u32,
    source: String,
    payload: String,
    snr: Option<i32>,
    rssi: Option<i16>,
    hops: Option<u8>,
    sent_ms: Option<u32>,
}

impl CaptureRow {
    fn frame_source(&self) -> Option<FrameSource> {
        match self.source.trim().to_lowercase().as_str() {
            "serial" => Some(FrameSource::SerialAscii),
            "radio" => Some(FrameSource::RadioBinary),
            _ => None,
        }
    }

    fn radio(&self) -> RadioMetadata {
        RadioMetadata::new(
            self.snr.unwrap_or(0),
            self.rssi.unwrap_or(0),
            self.hops.unwrap_or(0),
            self.sent_ms.unwrap_or(0),
        )
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    /// Rows read from the capture.
    pub rows: usize,
    /// Rows that never reached the gateway (unknown source, bad hex).
    pub skipped: usize,
    /// Gateway counters after the pass.
    pub stats: IngestStats,
}

/// Replays a capture through a [`Gateway`].
pub struct ReplayEngine {
    gateway: Gateway,
    rows: Vec<CaptureRow>,
}

impl ReplayEngine {
    /// Load a capture file.
    pub fn from_csv(config: ReplayConfig) -> Result<Self, ReplayError> {
        let path = config.capture_path.as_path();
        if !path.exists() {
            return Err(ReplayError::FileNotFound(path.display().to_string()));
        }

        let rows = Self::parse_csv(path)?;
        if rows.is_empty() {
            return Err(ReplayError::EmptyDataset);
        }

        let gateway = Gateway::with_config(GatewayConfig::with_serial(config.gateway_serial))
            .map_err(|e| ReplayError::InvalidFormat(e.to_string()))?;

        info!("Loaded capture: {} rows from {}", rows.len(), path.display());

        Ok(Self { gateway, rows })
    }

    /// Parse a capture CSV into rows.
    fn parse_csv(path: &Path) -> Result<Vec<CaptureRow>, ReplayError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;

        let headers = reader.headers()?.clone();
        for column in ["received_unix", "source", "payload"] {
            if !headers.iter().any(|h| h == column) {
                return Err(ReplayError::InvalidFormat(format!("missing column '{column}'")));
            }
        }

        let mut rows = Vec::new();
        for result in reader.deserialize() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// Number of rows loaded.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Feed every row through the gateway, writing one JSON line per accepted frame.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<ReplaySummary, ReplayError> {
        let mut skipped = 0;

        for (index, row) in self.rows.iter().enumerate() {
            // Header is line 1
            let line_no = index + 2;

            let result = match row.frame_source() {
                Some(FrameSource::SerialAscii) => {
                    self.gateway.ingest_line(&row.payload, row.received_unix)
                }
                Some(FrameSource::RadioBinary) => match parse_hex(&row.payload) {
                    Ok(frame) => self.gateway.ingest_radio(&frame, row.received_unix, row.radio()),
                    Err(e) => {
                        warn!("Row {}: {}", line_no, e);
                        skipped += 1;
                        continue;
                    }
                },
                None => {
                    warn!("Row {}: unknown source '{}'", line_no, row.source);
                    skipped += 1;
                    continue;
                }
            };

            match result {
                Ok(fields) => writeln!(out, "{}", to_json_line(&fields))?,
                Err(e) => debug!("Row {} rejected: {}", line_no, e),
            }
        }

        Ok(ReplaySummary {
            rows: self.rows.len(),
            skipped,
            stats: self.gateway.stats().clone(),
        })
    }
}

/// Decode a hex payload, optionally `0x`-prefixed.
fn parse_hex(text: &str) -> Result<Vec<u8>, ReplayError> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    Ok(hex::decode(digits)?)
}

/// Replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Bad hex payload: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
