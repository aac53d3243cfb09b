//! Branchscope Core Library
//!
//! Scans an organization's repositories, collects open change requests, and
//! resolves each repository's requests into a branch dependency tree rooted
//! at the default branch.

pub mod collector;
pub mod config;
pub mod error;
pub mod fakes;
pub mod metrics;
pub mod model;
pub mod obs;
pub mod report;
pub mod scanner;
pub mod selector;
pub mod source;
pub mod telemetry;
pub mod tree;

pub use collector::{collect_requests, CHECK_STATUS_DELAY};
pub use config::{RepoFilters, ScopeConfig, DEFAULT_CONFIG_FILE};
pub use error::{ScopeError, ScopeResult};
pub use model::{BranchNode, ChangeRequest, CheckStatus, CommitRecord, RepoInfo};
pub use report::{write_report, ErrorReport, OrgReport, ScanStats};
pub use scanner::OrgScanner;
pub use selector::select_repos;
pub use source::{GhCli, RemoteSource};
pub use tree::{build_repo_tree, decorate_commits, resolve_tree, ResolveOptions};

pub use metrics::METRICS;
pub use obs::{emit_report_written, emit_scan_finished, emit_scan_started, scan_span};
pub use telemetry::init_tracing;

/// Branchscope version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
