//! Scan configuration.
//!
//! Loaded from an optional JSON file. Keys missing from the file keep their
//! defaults, and the nested `repo_filters` object merges key by key, so a
//! file only needs the values it wants to change:
//!
//! ```json
//! { "organization": "acme", "repo_filters": { "exclude": ["sandbox"] } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ScopeError, ScopeResult};
use crate::tree::ResolveOptions;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "org_config.json";

/// Which repositories of the organization are scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoFilters {
    /// Repository names to skip.
    pub exclude: Vec<String>,
    pub include_archived: bool,
    /// Repositories not pushed to within this many days are skipped.
    pub min_pushed_days_ago: i64,
}

impl Default for RepoFilters {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            include_archived: false,
            min_pushed_days_ago: 365,
        }
    }
}

/// Full scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub organization: String,
    /// Passed through to the report for consumers that flag stale data.
    pub stale_minutes: u64,
    pub max_repos: usize,
    pub fetch_prs: bool,
    pub fetch_ci: bool,
    pub fetch_commits: bool,
    /// Requests with any of these labels only appear as phantom nodes.
    pub hidden_labels: Vec<String>,
    /// Sort tree children by branch name instead of listing order.
    pub sort_children: bool,
    /// Per-call timeout for the `gh` helper.
    pub command_timeout_secs: u64,
    pub repo_filters: RepoFilters,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            organization: "BreadchainCoop".to_string(),
            stale_minutes: 60,
            max_repos: 50,
            fetch_prs: true,
            fetch_ci: true,
            fetch_commits: true,
            hidden_labels: Vec::new(),
            sort_children: false,
            command_timeout_secs: 30,
            repo_filters: RepoFilters::default(),
        }
    }
}

impl ScopeConfig {
    /// Parse a config document, filling in defaults for missing keys.
    pub fn from_json(raw: &str) -> ScopeResult<Self> {
        serde_json::from_str(raw).map_err(|e| ScopeError::Config(e.to_string()))
    }

    /// Load `path`. Errors if the file is unreadable or malformed.
    pub fn load(path: &Path) -> ScopeResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScopeError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Load `path` if it exists; fall back to defaults with a warning when it
    /// cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            hidden_labels: self.hidden_labels.clone(),
            sort_children: self.sort_children,
        }
    }
}
