// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Duet Gateway - Frame ingest layer
//!
//! This crate wraps the Duet decoder for gateways that receive sensor
//! frames over USB serial and LoRa at the same time.
//!
//! ## Features
//!
//! - **Link limits**: oversized lines and frames are refused before decoding
//! - **Source filtering**: serial or radio input can be switched off
//! - **Hot registry swap**: publish a new variant registry without stopping ingest
//! - **Statistics**: accepted frames per variant, rejections per error kind
//! - **JSON export** (feature `json`): one JSON object per projected reading
//!
//! ## Quick Start
//!
//! ```rust
//! use duet::RadioMetadata;
//! use duet_gateway::{Gateway, GatewayConfig};
//!
//! let config = GatewayConfig {
//!     max_frame_size: 222,
//!     ..GatewayConfig::with_serial("gateway-01")
//! };
//! let mut gateway = Gateway::with_config(config).unwrap();
//!
//! // A frame from an unregistered variant is rejected and counted
//! let radio = RadioMetadata::new(8, -97, 1, 6000);
//! assert!(gateway.ingest_radio(&[9, 9, 0, 0], 1_700_000_000, radio).is_err());
//! assert_eq!(gateway.stats().by_error["unknown_variant"], 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  Gateway                                         │
//! │   serial line ─┐                                 │
//! │                ├─► limits ─► Decoder ─► project  │
//! │   radio frame ─┘               ▲          │      │
//! │                                │          ▼      │
//! │                     RegistryHandle    IngestStats│
//! └──────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod gateway;
#[cfg(feature = "json")]
pub mod json;
pub mod registry_handle;
pub mod stats;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
#[cfg(feature = "json")]
pub use json::{to_json, to_json_line};
pub use registry_handle::RegistryHandle;
pub use stats::IngestStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
