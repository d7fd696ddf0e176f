// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for Duet Gateway

use duet::{DuetError, FrameSource};
use thiserror::Error;

/// Main error type for Gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Decoding error from the codec
    #[error("Decode error: {0}")]
    Decode(#[from] DuetError),

    /// Serial line over the configured limit
    #[error("Line too long: {len} bytes (max: {max})")]
    LineTooLong { len: usize, max: usize },

    /// Radio frame over the configured limit
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Frame source switched off in the configuration
    #[error("Frame source disabled: {0}")]
    SourceDisabled(FrameSource),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GatewayError {
    /// Stable snake_case label used as a statistics key
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Decode(DuetError::Decode(e)) => e.kind().as_str(),
            GatewayError::Decode(DuetError::Registry(_)) => "registry",
            GatewayError::LineTooLong { .. } => "line_too_long",
            GatewayError::FrameTooLarge { .. } => "frame_too_large",
            GatewayError::SourceDisabled(_) => "source_disabled",
            GatewayError::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Result type alias for Gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
