// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! High-level Gateway API
//!
//! The [`Gateway`] struct takes raw frames from the serial and radio links,
//! enforces the link limits, decodes against the current registry and keeps
//! ingest statistics.
//!
//! # Example
//!
//! ```rust
//! use duet_gateway::{Gateway, GatewayConfig};
//!
//! let mut gateway = Gateway::with_config(GatewayConfig::with_serial("gw-7")).unwrap();
//!
//! let line = "4 6 77 5000 21.5 22.5 41 43 998.5 120 700 5 1 3 [0.5,0.1,0,0,0,0,0,0,0]";
//! let fields = gateway.ingest_line(line, 1_700_000_000).unwrap();
//! assert_eq!(fields["gateway_serial"].as_str(), Some("gw-7"));
//! assert_eq!(gateway.stats().accepted, 1);
//! ```

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::registry_handle::RegistryHandle;
use crate::stats::IngestStats;
use duet::{project, DecodedReading, Decoder, FrameSource, Projection, RadioMetadata, Registry};
use std::sync::Arc;

/// Frame ingest front end
pub struct Gateway {
    /// Registry shared with whoever publishes updates
    registry: RegistryHandle,
    /// Gateway configuration
    config: GatewayConfig,
    /// Ingest counters
    stats: IngestStats,
}

impl Gateway {
    /// Create a new gateway with default configuration
    pub fn new() -> Self {
        Self {
            registry: RegistryHandle::default(),
            config: GatewayConfig::default(),
            stats: IngestStats::new(),
        }
    }

    /// Create a new gateway with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn with_config(config: GatewayConfig) -> Result<Self> {
        Self::with_registry(config, RegistryHandle::default())
    }

    /// Create a gateway decoding against an existing registry handle
    pub fn with_registry(config: GatewayConfig, registry: RegistryHandle) -> Result<Self> {
        config.validate()?;
        log::info!(
            "gateway {} ready (serial: {}, radio: {})",
            config.gateway_serial,
            config.accept_serial,
            config.accept_radio
        );
        Ok(Self {
            registry,
            config,
            stats: IngestStats::new(),
        })
    }

    /// Decode a serial line without projecting it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serial input is disabled
    /// - The line exceeds `max_line_len`
    /// - The line fails to decode
    pub fn decode_line(&mut self, line: &str, received_unix: u32) -> Result<DecodedReading> {
        let result = self.check_source(FrameSource::SerialAscii).and_then(|_| {
            if line.len() > self.config.max_line_len {
                return Err(GatewayError::LineTooLong {
                    len: line.len(),
                    max: self.config.max_line_len,
                });
            }
            Ok(self.decoder().decode_from_line(line, received_unix)?)
        });
        self.record(FrameSource::SerialAscii, result)
    }

    /// Decode a radio frame without projecting it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Radio input is disabled
    /// - The frame exceeds `max_frame_size`
    /// - The frame fails to decode
    pub fn decode_radio(
        &mut self,
        frame: &[u8],
        received_unix: u32,
        radio: RadioMetadata,
    ) -> Result<DecodedReading> {
        let result = self.check_source(FrameSource::RadioBinary).and_then(|_| {
            if frame.len() > self.config.max_frame_size {
                return Err(GatewayError::FrameTooLarge {
                    size: frame.len(),
                    max: self.config.max_frame_size,
                });
            }
            Ok(self.decoder().decode_from_bytes(frame, received_unix, radio)?)
        });
        self.record(FrameSource::RadioBinary, result)
    }

    /// Decode and project a serial line
    pub fn ingest_line(&mut self, line: &str, received_unix: u32) -> Result<Projection> {
        let reading = self.decode_line(line, received_unix)?;
        Ok(self.project(&reading))
    }

    /// Decode and project a radio frame
    pub fn ingest_radio(
        &mut self,
        frame: &[u8],
        received_unix: u32,
        radio: RadioMetadata,
    ) -> Result<Projection> {
        let reading = self.decode_radio(frame, received_unix, radio)?;
        Ok(self.project(&reading))
    }

    /// Project a reading with this gateway's serial
    pub fn project(&self, reading: &DecodedReading) -> Projection {
        project(reading, &self.config.gateway_serial)
    }

    /// Get ingest statistics
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Reset ingest statistics, returning the old counters
    pub fn reset_stats(&mut self) -> IngestStats {
        std::mem::take(&mut self.stats)
    }

    /// Replace the registry used by this gateway and every clone of its handle
    pub fn publish_registry(&self, registry: Registry) -> Arc<Registry> {
        self.registry.publish(registry)
    }

    /// Handle for publishing registry updates from elsewhere
    pub fn registry_handle(&self) -> RegistryHandle {
        self.registry.clone()
    }

    /// Get the configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn decoder(&self) -> Decoder {
        Decoder::with_registry(self.registry.snapshot())
    }

    fn check_source(&self, source: FrameSource) -> Result<()> {
        if self.config.accepts(source) {
            Ok(())
        } else {
            Err(GatewayError::SourceDisabled(source))
        }
    }

    fn record(
        &mut self,
        source: FrameSource,
        result: Result<DecodedReading>,
    ) -> Result<DecodedReading> {
        match &result {
            Ok(reading) => {
                self.stats.record_accept(reading.alias);
                log::debug!("accepted {} frame from {}", source, reading.alias);
            }
            Err(e) => {
                self.stats.record_reject(e.kind());
                log::warn!("rejected {} frame: {}", source, e);
            }
        }
        result
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
