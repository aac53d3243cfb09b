//! Structured observability hooks for the scan lifecycle.
//!
//! This module provides:
//! - An organization-scoped tracing span via [`scan_span`]
//! - Emission functions for scan start, per-repository progress, skipped
//!   repositories, scan completion, and report output
//!
//! Events are emitted at `info!` level except skips, which are `warn!`.

use std::path::Path;

use tracing::{info, info_span, warn, Span};

use crate::report::ScanStats;

/// Organization-scoped span for one scan. Attach it with `Instrument`.
///
/// # Example
///
/// ```ignore
/// scanner.run().instrument(scan_span("acme")).await
/// ```
pub fn scan_span(organization: &str) -> Span {
    info_span!("branchscope.scan", organization = %organization)
}

/// Emit event: scan started.
pub fn emit_scan_started(organization: &str) {
    info!(event = "scan.started", organization = %organization);
}

/// Emit event: repository `position` of `total` is being processed.
pub fn emit_repo_processing(position: usize, total: usize, repo: &str) {
    info!(event = "repo.processing", position, total, repo = %repo);
}

/// Emit event: a repository's requests could not be fetched; it contributes no tree.
pub fn emit_repo_skipped(repo: &str, error: &dyn std::fmt::Display) {
    warn!(event = "repo.skipped", repo = %repo, error = %error);
}

/// Emit event: scan finished with its aggregate counts.
pub fn emit_scan_finished(organization: &str, elapsed_secs: f64, stats: &ScanStats) {
    info!(
        event = "scan.finished",
        organization = %organization,
        elapsed_secs,
        total_repos = stats.total_repos,
        repos_with_prs = stats.repos_with_prs,
        total_open_prs = stats.total_open_prs,
    );
}

/// Emit event: report document written.
pub fn emit_report_written(path: &Path) {
    info!(event = "report.written", path = %path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_span_create() {
        let _entered = scan_span("test-org").entered();
    }
}
