//! Error types for Duet
//!
//! This module defines all error types used throughout the library. Every
//! decode failure is local to one frame and carries enough context (variant
//! alias, field name, raw value) to diagnose the frame without re-reading it.

use crate::protocol::{FrameSource, VariantKey};
use std::fmt;
use thiserror::Error;

/// Result type alias for Duet operations
pub type Result<T> = std::result::Result<T, DuetError>;

/// Main error type for Duet operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DuetError {
    /// Decoding error
    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// Registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl DuetError {
    /// The decode failure behind this error, if any
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            DuetError::Decode(e) => Some(e),
            DuetError::Registry(_) => None,
        }
    }
}

/// Errors while decoding a single frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// No schema registered for the frame's version pair
    #[error("Unknown variant: {key}")]
    UnknownVariant { key: VariantKey },

    /// The frame is too short or its version tokens are not numeric
    #[error("Malformed header: {reason}")]
    MalformedHeader { reason: String },

    /// Payload size differs from the schema's declared size
    #[error("Length mismatch for {alias} ({frame_source}): expected {expected}, got {actual}")]
    LengthMismatch {
        alias: &'static str,
        frame_source: FrameSource,
        expected: usize,
        actual: usize,
    },

    /// A token or byte range could not be converted
    #[error("Field {field} of {alias} could not be decoded from {raw:?}: {reason}")]
    FieldConversion {
        alias: &'static str,
        field: &'static str,
        raw: String,
        reason: String,
    },

    /// A bracketed sub-list has the wrong number of elements
    #[error("Field {field} of {alias} has {actual} elements, expected {expected}")]
    CompositeArity {
        alias: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Host and device clocks cannot be reconciled
    #[error(
        "Timestamp error for {alias}: {fault} (host {host_receipt_unix_sec}s, \
         sent {device_send_time_ms}ms, sampled {device_sample_time_ms}ms)"
    )]
    Timestamp {
        alias: &'static str,
        fault: ClockFault,
        host_receipt_unix_sec: u32,
        device_send_time_ms: u32,
        device_sample_time_ms: u32,
    },
}

impl DecodeError {
    /// Fieldless classification, used for rejection counters
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::UnknownVariant { .. } => DecodeErrorKind::UnknownVariant,
            DecodeError::MalformedHeader { .. } => DecodeErrorKind::MalformedHeader,
            DecodeError::LengthMismatch { .. } => DecodeErrorKind::LengthMismatch,
            DecodeError::FieldConversion { .. } => DecodeErrorKind::FieldConversion,
            DecodeError::CompositeArity { .. } => DecodeErrorKind::CompositeArity,
            DecodeError::Timestamp { .. } => DecodeErrorKind::Timestamp,
        }
    }
}

/// Classification of [`DecodeError`] without its context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodeErrorKind {
    UnknownVariant,
    MalformedHeader,
    LengthMismatch,
    FieldConversion,
    CompositeArity,
    Timestamp,
}

impl DecodeErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [DecodeErrorKind; 6] = [
        DecodeErrorKind::UnknownVariant,
        DecodeErrorKind::MalformedHeader,
        DecodeErrorKind::LengthMismatch,
        DecodeErrorKind::FieldConversion,
        DecodeErrorKind::CompositeArity,
        DecodeErrorKind::Timestamp,
    ];

    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeErrorKind::UnknownVariant => "unknown_variant",
            DecodeErrorKind::MalformedHeader => "malformed_header",
            DecodeErrorKind::LengthMismatch => "length_mismatch",
            DecodeErrorKind::FieldConversion => "field_conversion",
            DecodeErrorKind::CompositeArity => "composite_arity",
            DecodeErrorKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a radio timestamp could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFault {
    /// One of the three clock inputs is zero
    Unset,
    /// The device reports sending before sampling
    SentBeforeSample,
    /// The transit delay is larger than the host clock
    BeforeEpoch,
}

impl fmt::Display for ClockFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockFault::Unset => write!(f, "clock input is zero"),
            ClockFault::SentBeforeSample => write!(f, "send time precedes sample time"),
            ClockFault::BeforeEpoch => write!(f, "resolved time precedes the epoch"),
        }
    }
}

/// Errors raised while registering variant schemas
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Key already registered
    #[error("Variant {key} is already registered")]
    DuplicateVariant { key: VariantKey },

    /// Slot widths do not add up to the declared size
    #[error("{alias} {frame_source} layout sums to {actual}, declared {declared}")]
    LayoutSizeMismatch {
        alias: &'static str,
        frame_source: FrameSource,
        declared: usize,
        actual: usize,
    },

    /// A slot's codec cannot produce the type its field needs
    #[error("{alias} {frame_source} slot {field} cannot use codec {codec}")]
    IncompatibleCodec {
        alias: &'static str,
        frame_source: FrameSource,
        field: &'static str,
        codec: String,
    },

    /// A derivation step reads a field the layout never fills
    #[error("{alias} {frame_source} derivation {derivation} needs field {field}")]
    MissingDerivationInput {
        alias: &'static str,
        frame_source: FrameSource,
        derivation: &'static str,
        field: &'static str,
    },

    /// A derivation's inputs use codecs it cannot combine
    #[error("{alias} {frame_source} derivation {derivation} has inputs with different codecs")]
    MismatchedDerivationInputs {
        alias: &'static str,
        frame_source: FrameSource,
        derivation: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::LengthMismatch {
            alias: "Mk4.0",
            frame_source: FrameSource::RadioBinary,
            expected: 70,
            actual: 69,
        };
        assert_eq!(
            err.to_string(),
            "Length mismatch for Mk4.0 (radio): expected 70, got 69"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: DuetError = DecodeError::UnknownVariant {
            key: VariantKey::new(9, 9),
        }
        .into();
        assert!(matches!(err, DuetError::Decode(_)));
        assert_eq!(
            err.as_decode().map(DecodeError::kind),
            Some(DecodeErrorKind::UnknownVariant)
        );
    }

    #[test]
    fn test_kind_names_are_unique() {
        let mut names: Vec<_> = DecodeErrorKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DecodeErrorKind::ALL.len());
    }
}
