//! Process-wide scan counters.
//!
//! Counters only ever grow. A scan takes a [`MetricsSnapshot`] when it starts
//! and reports its own share with [`Metrics::flush_scan`], so several scans
//! in one process never clobber each other's numbers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counters.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    repos_scanned: AtomicU64,
    trees_built: AtomicU64,
    lookups_failed: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub repos_scanned: u64,
    pub trees_built: u64,
    /// Remote lookups that failed and were absorbed into an empty result.
    pub lookups_failed: u64,
}

impl MetricsSnapshot {
    /// Counts accumulated since `earlier`.
    pub fn since(&self, earlier: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            repos_scanned: self.repos_scanned.saturating_sub(earlier.repos_scanned),
            trees_built: self.trees_built.saturating_sub(earlier.trees_built),
            lookups_failed: self.lookups_failed.saturating_sub(earlier.lookups_failed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            repos_scanned: AtomicU64::new(0),
            trees_built: AtomicU64::new(0),
            lookups_failed: AtomicU64::new(0),
        }
    }

    pub fn inc_repos_scanned(&self) {
        self.repos_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_trees_built(&self) {
        self.trees_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_lookups_failed(&self) {
        self.lookups_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            repos_scanned: self.repos_scanned.load(Ordering::Relaxed),
            trees_built: self.trees_built.load(Ordering::Relaxed),
            lookups_failed: self.lookups_failed.load(Ordering::Relaxed),
        }
    }

    /// Log what one scan of `organization` added since `started`, and return it.
    pub fn flush_scan(&self, organization: &str, started: &MetricsSnapshot) -> MetricsSnapshot {
        let delta = self.snapshot().since(started);
        tracing::info!(
            metric = "scan",
            organization = %organization,
            repos_scanned = delta.repos_scanned,
            trees_built = delta.trees_built,
            lookups_failed = delta.lookups_failed,
        );
        delta
    }
}
