// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Ingest counters

use std::collections::BTreeMap;

#[cfg(feature = "json")]
use serde::Serialize;

/// Running totals of accepted and rejected frames
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct IngestStats {
    /// Frames decoded successfully
    pub accepted: u64,
    /// Frames rejected for any reason
    pub rejected: u64,
    /// Accepted frames per variant alias
    pub by_variant: BTreeMap<&'static str, u64>,
    /// Rejected frames per error kind
    pub by_error: BTreeMap<&'static str, u64>,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_accept(&mut self, alias: &'static str) {
        self.accepted += 1;
        *self.by_variant.entry(alias).or_insert(0) += 1;
    }

    pub(crate) fn record_reject(&mut self, kind: &'static str) {
        self.rejected += 1;
        *self.by_error.entry(kind).or_insert(0) += 1;
    }

    /// Total frames seen
    pub fn total(&self) -> u64 {
        self.accepted + self.rejected
    }

    /// Share of frames accepted, 1.0 when nothing was seen
    pub fn acceptance_rate(&self) -> f64 {
        match self.total() {
            0 => 1.0,
            total => self.accepted as f64 / total as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts_and_rate() {
        let mut stats = IngestStats::new();
        assert_relative_eq!(stats.acceptance_rate(), 1.0);

        stats.record_accept("Mk4.0");
        stats.record_accept("Mk4.0");
        stats.record_accept("Mk1.3");
        stats.record_reject("length_mismatch");

        assert_eq!(stats.total(), 4);
        assert_eq!(stats.by_variant["Mk4.0"], 2);
        assert_eq!(stats.by_error["length_mismatch"], 1);
        assert_relative_eq!(stats.acceptance_rate(), 0.75);
    }
}
