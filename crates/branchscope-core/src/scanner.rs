//! Organization-wide scan: select repositories, collect their requests,
//! resolve a tree per repository, and aggregate the report.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{warn, Instrument};

use crate::collector::{collect_requests, CHECK_STATUS_DELAY};
use crate::config::ScopeConfig;
use crate::error::{ScopeError, ScopeResult};
use crate::metrics::METRICS;
use crate::obs;
use crate::report::{round_seconds, OrgReport, ScanStats};
use crate::selector::select_repos;
use crate::source::RemoteSource;
use crate::tree::build_repo_tree;

/// Drives one scan of an organization against a [`RemoteSource`].
pub struct OrgScanner {
    source: Arc<dyn RemoteSource>,
    config: ScopeConfig,
    check_delay: Duration,
}

impl OrgScanner {
    pub fn new(source: Arc<dyn RemoteSource>, config: ScopeConfig) -> Self {
        Self {
            source,
            config,
            check_delay: CHECK_STATUS_DELAY,
        }
    }

    /// Override the pause between check-status lookups.
    pub fn with_check_delay(mut self, check_delay: Duration) -> Self {
        self.check_delay = check_delay;
        self
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Run the scan.
    ///
    /// A failed repository listing counts as an empty organization and
    /// yields [`ScopeError::NoRepositories`]. A repository whose requests
    /// cannot be listed still counts toward `total_repos` but contributes no
    /// tree. Repositories are processed one at a time in selection order.
    pub async fn scan(&self) -> ScopeResult<OrgReport> {
        self.run()
            .instrument(obs::scan_span(&self.config.organization))
            .await
    }

    async fn run(&self) -> ScopeResult<OrgReport> {
        let organization = self.config.organization.as_str();
        obs::emit_scan_started(organization);
        let started = Instant::now();
        let counters_at_start = METRICS.snapshot();

        let listed = match self.source.list_repos(organization).await {
            Ok(repos) => repos,
            Err(err) => {
                METRICS.inc_lookups_failed();
                warn!(error = %err, "repository listing failed");
                Vec::new()
            }
        };
        let repos = select_repos(
            listed,
            &self.config.repo_filters,
            self.config.max_repos,
            Utc::now(),
        );
        if repos.is_empty() {
            return Err(ScopeError::NoRepositories {
                organization: organization.to_string(),
            });
        }

        let options = self.config.resolve_options();
        let commit_source = self.config.fetch_commits.then_some(self.source.as_ref());
        let total = repos.len();
        let mut trees = BTreeMap::new();
        let mut total_open_prs = 0;

        for (i, repo) in repos.iter().enumerate() {
            obs::emit_repo_processing(i + 1, total, &repo.name);
            METRICS.inc_repos_scanned();

            let requests = if self.config.fetch_prs {
                match collect_requests(
                    self.source.as_ref(),
                    repo,
                    self.config.fetch_ci,
                    self.check_delay,
                )
                .await
                {
                    Ok(requests) => requests,
                    Err(err) => {
                        METRICS.inc_lookups_failed();
                        obs::emit_repo_skipped(&repo.name, &err);
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            };

            if requests.is_empty() {
                continue;
            }
            total_open_prs += requests.len();

            let tree = build_repo_tree(repo, &requests, &options, commit_source).await;
            METRICS.inc_trees_built();
            trees.insert(repo.name.clone(), tree);
        }

        let stats = ScanStats {
            total_repos: total,
            repos_with_prs: trees.len(),
            total_open_prs,
        };
        let elapsed = started.elapsed().as_secs_f64();
        obs::emit_scan_finished(organization, elapsed, &stats);
        METRICS.flush_scan(organization, &counters_at_start);

        Ok(OrgReport {
            organization: organization.to_string(),
            generated_at: Utc::now(),
            generation_time_seconds: round_seconds(elapsed),
            stats,
            trees,
            stale_minutes: self.config.stale_minutes,
        })
    }
}
