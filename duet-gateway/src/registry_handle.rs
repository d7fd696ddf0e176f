// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Shared registry handle
//!
//! Decoding works on an `Arc<Registry>` snapshot taken per frame. Publishing a
//! new registry swaps the pointer; in-flight decodes keep the snapshot they
//! started with.

use duet::Registry;
use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle to the current registry
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<Registry>>>,
}

impl RegistryHandle {
    /// Create a handle publishing `registry`
    pub fn new(registry: Registry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Registry in effect right now
    pub fn snapshot(&self) -> Arc<Registry> {
        // The guarded value is a plain pointer, so a poisoned lock still holds a usable one
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the registry for all subsequent decodes, returning the old one
    pub fn publish(&self, registry: Registry) -> Arc<Registry> {
        let fingerprint = registry.fingerprint();
        let count = registry.len();
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, Arc::new(registry));
        log::info!("published registry {fingerprint:016x} with {count} variants");
        previous
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet::variants::MK4_0;

    #[test]
    fn test_snapshot_survives_publish() {
        let handle = RegistryHandle::default();
        let before = handle.snapshot();
        assert_eq!(before.len(), duet::variants::BUILTIN.len());

        let replaced = handle.publish(Registry::new().with(MK4_0).unwrap());
        assert!(Arc::ptr_eq(&before, &replaced));
        assert_eq!(before.len(), duet::variants::BUILTIN.len());
        assert_eq!(handle.snapshot().len(), 1);
    }

    #[test]
    fn test_clones_share_registry() {
        let handle = RegistryHandle::default();
        let other = handle.clone();
        other.publish(Registry::new());
        assert!(handle.snapshot().is_empty());
    }
}
