//! The organization report written at the end of a scan.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScopeResult;
use crate::model::BranchNode;

/// Aggregate counts over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Selected repositories, including those whose requests could not be fetched.
    pub total_repos: usize,
    /// Repositories that produced a tree.
    pub repos_with_prs: usize,
    pub total_open_prs: usize,
}

/// Top-level document of a successful scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgReport {
    pub organization: String,
    pub generated_at: DateTime<Utc>,
    /// Wall-clock duration of the scan, rounded to hundredths.
    pub generation_time_seconds: f64,
    pub stats: ScanStats,
    /// Repository name → resolved tree. Only repositories with open requests.
    pub trees: BTreeMap<String, BranchNode>,
    pub stale_minutes: u64,
}

/// Document written instead of an [`OrgReport`] when the scan aborts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: &dyn std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Round to two decimal places.
pub fn round_seconds(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Write `report` as pretty JSON, creating parent directories as needed.
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> ScopeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}
