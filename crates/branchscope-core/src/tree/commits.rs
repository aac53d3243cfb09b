//! Commit-delta decoration of a resolved tree.

use tracing::{debug, warn};

use crate::metrics::METRICS;
use crate::model::BranchNode;
use crate::source::RemoteSource;

/// Each node keeps at most this many commits from its parent branch.
pub const COMMITS_PER_NODE: usize = 5;

/// Attach the commit delta against `parent_branch_name` to every non-root
/// node of `root`, fetching at most `cap` commits per node.
///
/// Lookups run one at a time in pre-order. A failed lookup leaves that
/// node's list empty and does not stop the remaining nodes.
pub async fn decorate_commits(
    root: &mut BranchNode,
    repo_full_name: &str,
    source: &dyn RemoteSource,
    cap: usize,
) {
    let mut stack: Vec<&mut BranchNode> = root.children.iter_mut().rev().collect();
    while let Some(node) = stack.pop() {
        if let Some(parent) = node.parent_branch_name.clone() {
            match source
                .compare_commits(repo_full_name, &parent, &node.branch)
                .await
            {
                Ok(mut commits) => {
                    commits.truncate(cap);
                    debug!(
                        repo = %repo_full_name,
                        base = %parent,
                        head = %node.branch,
                        commits = commits.len(),
                        "commit delta fetched"
                    );
                    node.commits_from_parent = commits;
                }
                Err(err) => {
                    METRICS.inc_lookups_failed();
                    warn!(
                        repo = %repo_full_name,
                        base = %parent,
                        head = %node.branch,
                        error = %err,
                        "commit delta unavailable"
                    );
                }
            }
        }
        stack.extend(node.children.iter_mut().rev());
    }
}
