//! # Duet - telemetry frame decoding
//!
//! Decodes the frames emitted by Duet air-quality sensor nodes, whether they
//! arrive as fixed-layout radio packets or as space-delimited serial lines.
//!
//! ## Key Features
//!
//! - **Schema-driven**: every hardware variant is a data descriptor; one
//!   generic decoder serves them all
//! - **Strict**: a frame is decoded exactly or rejected with a field-level error
//! - **Derived values**: particulate merge, temperature/humidity averaging,
//!   gas bitmask gating and absolute timestamps
//! - **Stable output**: readings flatten into schema-independent keys
//!
//! ## Quick Start
//!
//! ```rust
//! use duet::{project, Decoder, Value};
//!
//! let decoder = Decoder::new();
//!
//! // Mk4.6 serial line: version pair, then 13 payload tokens
//! let line = "4 6 77 5000 21.5 22.5 41 43 998.5 120 700 5 1 3 [0.5,0.1,0,0,0,0,0,0,0]";
//! let reading = decoder.decode_from_line(line, 1_700_000_000).unwrap();
//!
//! let fields = project(&reading, "gateway-01");
//! assert_eq!(fields["serial_number"], Value::Int(77));
//! assert_eq!(fields["temp"], Value::Float(22.0));
//! assert!(fields.contains_key("co"));
//! assert!(!fields.contains_key("nh3"));
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Frame sources, variant keys and header splitting
//! - [`codec`]: Byte and token field codecs
//! - [`schema`]: Variant schema descriptors
//! - [`variants`]: Built-in schemas of the deployed fleet
//! - [`registry`]: Variant key to schema lookup
//! - [`decoder`]: The generic frame decoder
//! - [`derive`]: Derivation algorithms
//! - [`projector`]: Flat key-value output

// Modules
pub mod codec;
pub mod decoder;
pub mod derive;
pub mod error;
pub mod keys;
pub mod projector;
pub mod protocol;
pub mod reading;
pub mod registry;
pub mod schema;
pub mod variants;

// Re-exports for convenient access
pub use codec::{Codec, VECTOR_ARITY};
pub use decoder::{decode, Decoder, Frame};
pub use error::{ClockFault, DecodeError, DecodeErrorKind, DuetError, RegistryError, Result};
pub use projector::{project, Projection, Value};
pub use protocol::{ConnectionType, FrameSource, VariantKey};
pub use reading::{
    DecodedReading, GasChannel, GasVector, Particulate, ParticulateSet, RadioMetadata, TempRh,
    TempRhSensor,
};
pub use registry::Registry;
pub use schema::{Derivation, Field, FieldSlot, Layout, VariantSchema};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_decode_and_project_serial() {
        let decoder = Decoder::new();
        let line = "4 6 77 5000 21.5 22.5 41 43 998.5 120 700 5 1 3 [0.5,0.1,0,0,0,0,0,0,0]";
        let reading = decoder.decode_from_line(line, 1_700_000_000).unwrap();
        let fields = project(&reading, "gw");
        assert_eq!(fields["deviceType"], Value::Float(4.6));
        assert_eq!(fields["connection_type"], Value::Int(2));
        assert_eq!(fields["poe_usb_voltage"], Value::Int(5));
    }
}
