// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Configuration types for Duet Gateway

use crate::error::{GatewayError, Result};
use duet::FrameSource;

/// Gateway-level configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Identifier stamped on every projected reading
    pub gateway_serial: String,

    /// Accept frames from the USB serial link
    pub accept_serial: bool,

    /// Accept frames from the radio link
    pub accept_radio: bool,

    /// Maximum serial line length in bytes (default: 1024)
    pub max_line_len: usize,

    /// Maximum radio frame size in bytes (default: 255, LoRa PHY payload)
    pub max_frame_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_serial: "duet-gateway".to_string(),
            accept_serial: true,
            accept_radio: true,
            max_line_len: 1024,
            max_frame_size: 255, // LoRa PHY
        }
    }
}

impl GatewayConfig {
    /// Create a configuration with a specific gateway serial
    pub fn with_serial(gateway_serial: impl Into<String>) -> Self {
        Self {
            gateway_serial: gateway_serial.into(),
            ..Default::default()
        }
    }

    /// Create a configuration accepting radio frames only
    pub fn radio_only(gateway_serial: impl Into<String>) -> Self {
        Self {
            accept_serial: false,
            ..Self::with_serial(gateway_serial)
        }
    }

    /// Create a configuration accepting serial lines only
    pub fn serial_only(gateway_serial: impl Into<String>) -> Self {
        Self {
            accept_radio: false,
            ..Self::with_serial(gateway_serial)
        }
    }

    /// Whether frames from a source are accepted
    pub fn accepts(&self, source: FrameSource) -> bool {
        match source {
            FrameSource::SerialAscii => self.accept_serial,
            FrameSource::RadioBinary => self.accept_radio,
        }
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.gateway_serial.trim().is_empty() {
            return Err(GatewayError::InvalidConfig("gateway_serial is empty".into()));
        }
        if self.max_line_len == 0 {
            return Err(GatewayError::InvalidConfig("max_line_len must be > 0".into()));
        }
        if self.max_frame_size == 0 {
            return Err(GatewayError::InvalidConfig("max_frame_size must be > 0".into()));
        }
        if !self.accept_serial && !self.accept_radio {
            return Err(GatewayError::InvalidConfig("every frame source is disabled".into()));
        }
        Ok(())
    }
}
