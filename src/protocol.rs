//! Protocol definitions for Duet
//!
//! This module defines the frame-level types shared by every variant:
//! - Frame sources (radio bytes or serial tokens)
//! - Variant keys carried in the frame header
//! - Connection types published downstream
//! - Header splitting for both frame sources

use crate::error::DecodeError;
use std::fmt;

/// Number of leading header units (bytes or tokens) before the layout starts
pub const HEADER_LEN: usize = 2;

/// Where a frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameSource {
    /// Space-delimited ASCII line from the local serial port
    SerialAscii,
    /// Fixed-layout little-endian packet relayed over radio
    RadioBinary,
}

impl FrameSource {
    /// Connection type published for frames from this source
    pub fn connection_type(&self) -> ConnectionType {
        match self {
            FrameSource::SerialAscii => ConnectionType::UsbSerial,
            FrameSource::RadioBinary => ConnectionType::LoraGateway,
        }
    }

    /// Unit in which layout widths are counted
    pub fn unit(&self) -> &'static str {
        match self {
            FrameSource::SerialAscii => "tokens",
            FrameSource::RadioBinary => "bytes",
        }
    }
}

impl fmt::Display for FrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSource::SerialAscii => write!(f, "serial"),
            FrameSource::RadioBinary => write!(f, "radio"),
        }
    }
}

/// (hardware revision, sensor variant) pair selecting one schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey {
    /// Hardware revision (the `4` in `Mk4.13`)
    pub hw_version: u8,
    /// Sensor variant (the `13` in `Mk4.13`)
    pub sensor_variant: u8,
}

impl VariantKey {
    /// Create a key
    pub const fn new(hw_version: u8, sensor_variant: u8) -> Self {
        Self {
            hw_version,
            sensor_variant,
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mk{}.{}", self.hw_version, self.sensor_variant)
    }
}

/// How the reading reached the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ConnectionType {
    /// Relayed by a LoRa gateway node
    #[default]
    LoraGateway = 0,
    /// Delivered through a LoRaWAN network server (reserved)
    Lorawan = 1,
    /// Read from a USB serial port
    UsbSerial = 2,
}

impl ConnectionType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ConnectionType::LoraGateway),
            1 => Some(ConnectionType::Lorawan),
            2 => Some(ConnectionType::UsbSerial),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionType::LoraGateway => write!(f, "LORA_GATEWAY"),
            ConnectionType::Lorawan => write!(f, "LORAWAN"),
            ConnectionType::UsbSerial => write!(f, "USB_SERIAL"),
        }
    }
}

/// Split a radio frame into its variant key and layout bytes
pub fn split_radio_frame(frame: &[u8]) -> Result<(VariantKey, &[u8]), DecodeError> {
    match frame {
        [hw, variant, payload @ ..] => Ok((VariantKey::new(*hw, *variant), payload)),
        _ => Err(DecodeError::MalformedHeader {
            reason: format!(
                "radio frame has {} bytes, need at least {}",
                frame.len(),
                HEADER_LEN
            ),
        }),
    }
}

/// Split a serial line into its variant key and layout tokens
///
/// The line is trimmed, then split on single spaces. Runs of spaces produce
/// empty tokens, which later fail conversion like any other bad token.
pub fn split_serial_line(line: &str) -> Result<(VariantKey, Vec<&str>), DecodeError> {
    let mut tokens = line.trim().split(' ');
    let hw = parse_header_token(tokens.next(), "hardware version")?;
    let variant = parse_header_token(tokens.next(), "sensor variant")?;
    Ok((VariantKey::new(hw, variant), tokens.collect()))
}

fn parse_header_token(token: Option<&str>, what: &str) -> Result<u8, DecodeError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| DecodeError::MalformedHeader {
            reason: format!("missing {what}"),
        })?;
    token.parse().map_err(|_| DecodeError::MalformedHeader {
        reason: format!("{what} {token:?} is not a number in 0..=255"),
    })
}
