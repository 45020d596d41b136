//! Per-reason breakdown of a validation run

use crate::validator::{RejectReason, RepairCounts, ValidationOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Counts for one validation run.
///
/// A session rejected for two reasons is counted once under each, so the
/// `by_reason` values may sum to more than `rejected`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub clean: usize,
    pub rejected: usize,
    pub swapped: usize,
    pub recomputed: usize,
    pub by_reason: BTreeMap<String, usize>,
}

impl ValidationSummary {
    pub fn from_outcome(outcome: &ValidationOutcome) -> Self {
        // Every code appears, zero or not, so reports line up across runs
        let mut by_reason: BTreeMap<String, usize> = RejectReason::ALL
            .iter()
            .map(|r| (r.code().to_string(), 0))
            .collect();

        for (reason, count) in &outcome.reason_counts {
            *by_reason.entry(reason.code().to_string()).or_insert(0) += count;
        }

        let RepairCounts {
            swapped,
            recomputed,
            ..
        } = outcome.repairs;

        Self {
            total: outcome.total(),
            clean: outcome.clean.len(),
            rejected: outcome.rejected.len(),
            swapped,
            recomputed,
            by_reason,
        }
    }

    /// Fraction of sessions rejected, 0.0 for an empty batch
    pub fn reject_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.rejected as f64 / self.total as f64
        }
    }

    pub fn reason_count(&self, reason: RejectReason) -> usize {
        self.by_reason.get(reason.code()).copied().unwrap_or(0)
    }

    pub fn log(&self) {
        info!(
            "views: {} -> {} clean, {} rejected ({:.2}%), {} swapped, {} recomputed",
            self.total,
            self.clean,
            self.rejected,
            self.reject_rate() * 100.0,
            self.swapped,
            self.recomputed
        );
        for (code, count) in &self.by_reason {
            if *count > 0 {
                info!("  {}: {}", code, count);
            }
        }
    }
}
