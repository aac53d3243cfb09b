//! Change-request collection for one repository.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ScopeResult;
use crate::metrics::METRICS;
use crate::model::{ChangeRequest, CheckStatus, RepoInfo};
use crate::source::RemoteSource;

/// Pause after every check-status lookup.
pub const CHECK_STATUS_DELAY: Duration = Duration::from_millis(100);

/// List the open change requests of `repo` and, when `fetch_ci` is set,
/// fill in each request's check status.
///
/// A failed listing is returned as an error for the caller to absorb. A
/// failed status lookup only downgrades that request to
/// [`CheckStatus::Unknown`]. Lookups are sequential and each one is followed
/// by `check_delay`, so spacing also holds across repositories.
pub async fn collect_requests(
    source: &dyn RemoteSource,
    repo: &RepoInfo,
    fetch_ci: bool,
    check_delay: Duration,
) -> ScopeResult<Vec<ChangeRequest>> {
    let mut requests = source.list_open_requests(&repo.full_name).await?;
    debug!(repo = %repo.full_name, open = requests.len(), "listed open requests");

    if !fetch_ci {
        return Ok(requests);
    }

    for pr in requests.iter_mut() {
        pr.check_status = match source.check_status(&repo.full_name, pr.number).await {
            Ok(status) => status,
            Err(err) => {
                METRICS.inc_lookups_failed();
                warn!(
                    repo = %repo.full_name,
                    number = pr.number,
                    error = %err,
                    "check status unavailable"
                );
                CheckStatus::Unknown
            }
        };
        if !check_delay.is_zero() {
            tokio::time::sleep(check_delay).await;
        }
    }

    Ok(requests)
}
