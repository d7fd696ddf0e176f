//! Type registry
//!
//! Maps a [`VariantKey`] to its [`VariantSchema`]. The registry is built once,
//! validated schema by schema, and read-only afterwards; share it behind an
//! `Arc` and replace it wholesale rather than mutating it in place.

use crate::error::{DecodeError, RegistryError};
use crate::protocol::{FrameSource, VariantKey};
use crate::schema::VariantSchema;
use crate::variants::BUILTIN;
use std::collections::BTreeMap;
use xxhash_rust::xxh64::Xxh64;

/// Seed for [`Registry::fingerprint`]
const FINGERPRINT_SEED: u64 = 0x4475_6574;

/// Immutable lookup table from variant key to schema
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: BTreeMap<VariantKey, VariantSchema>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every deployed variant
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in BUILTIN {
            // Built-in schemas are covered by tests; a failure here is a table bug
            if let Err(e) = registry.register(*schema) {
                log::error!("skipping built-in schema {}: {}", schema.alias, e);
            }
        }
        registry
    }

    /// Validate and add a schema
    pub fn register(&mut self, schema: VariantSchema) -> Result<(), RegistryError> {
        if self.schemas.contains_key(&schema.key) {
            return Err(RegistryError::DuplicateVariant { key: schema.key });
        }
        schema.validate()?;
        log::debug!(
            "registered {} ({} bytes, {} tokens)",
            schema.alias,
            schema.expected_bytes(),
            schema.expected_tokens()
        );
        self.schemas.insert(schema.key, schema);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, schema: VariantSchema) -> Result<Self, RegistryError> {
        self.register(schema)?;
        Ok(self)
    }

    /// Look up the schema for a version pair
    pub fn resolve(
        &self,
        hw_version: u8,
        sensor_variant: u8,
    ) -> Result<&VariantSchema, DecodeError> {
        self.resolve_key(VariantKey::new(hw_version, sensor_variant))
    }

    /// Look up the schema for a key
    pub fn resolve_key(&self, key: VariantKey) -> Result<&VariantSchema, DecodeError> {
        self.schemas
            .get(&key)
            .ok_or(DecodeError::UnknownVariant { key })
    }

    /// Whether a key is registered
    pub fn contains(&self, key: VariantKey) -> bool {
        self.schemas.contains_key(&key)
    }

    /// Registered keys, ascending
    pub fn keys(&self) -> impl Iterator<Item = VariantKey> + '_ {
        self.schemas.keys().copied()
    }

    /// Registered schemas, ascending by key
    pub fn iter(&self) -> impl Iterator<Item = &VariantSchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Stable hash of the registered key space and layout sizes
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh64::new(FINGERPRINT_SEED);
        for schema in self.schemas.values() {
            hasher.update(&[schema.key.hw_version, schema.key.sensor_variant]);
            hasher.update(schema.alias.as_bytes());
            for source in [FrameSource::RadioBinary, FrameSource::SerialAscii] {
                let layout = schema.layout(source);
                hasher.update(&(layout.expected as u32).to_le_bytes());
                hasher.update(&(layout.slots.len() as u32).to_le_bytes());
            }
        }
        hasher.digest()
    }
}
