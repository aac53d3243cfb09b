//! Remote source-hosting collaborators.
//!
//! [`RemoteSource`] is the single seam between the scan pipeline and the
//! outside world. [`gh::GhCli`] implements it on top of the `gh` CLI;
//! [`crate::fakes::MemoryRemoteSource`] implements it in memory for tests.

pub mod gh;
pub mod payload;

use async_trait::async_trait;

use crate::error::ScopeResult;
use crate::model::{ChangeRequest, CheckStatus, CommitRecord, RepoInfo};

pub use gh::GhCli;

/// Upper bound on commits requested from a single branch comparison.
pub const COMPARE_FETCH_LIMIT: usize = 10;

/// Injectable data source for repositories, change requests, check status,
/// and commit deltas.
///
/// Every method may fail; callers in this crate absorb failures into empty
/// results rather than aborting a scan.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// All repositories of `organization`, unfiltered.
    async fn list_repos(&self, organization: &str) -> ScopeResult<Vec<RepoInfo>>;

    /// Open change requests of `repo_full_name`, in listing order.
    async fn list_open_requests(&self, repo_full_name: &str) -> ScopeResult<Vec<ChangeRequest>>;

    /// Aggregated check status of change request `number`.
    async fn check_status(&self, repo_full_name: &str, number: u64) -> ScopeResult<CheckStatus>;

    /// Commits on `head` that are not on `base`, most recent first, at most
    /// [`COMPARE_FETCH_LIMIT`].
    async fn compare_commits(
        &self,
        repo_full_name: &str,
        base: &str,
        head: &str,
    ) -> ScopeResult<Vec<CommitRecord>>;
}
