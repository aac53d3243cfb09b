//! Per-repository branch trees.
//!
//! - [`resolver::resolve_tree`]: pure resolution of change requests into a rooted tree
//! - [`commits::decorate_commits`]: optional commit-delta decoration of the resolved tree

pub mod commits;
pub mod resolver;

pub use commits::{decorate_commits, COMMITS_PER_NODE};
pub use resolver::{resolve_tree, ResolveOptions};

use crate::model::{BranchNode, ChangeRequest, RepoInfo};
use crate::source::RemoteSource;

/// Resolve `requests` into a tree and, when `commit_source` is given,
/// decorate every non-root node with its commit delta.
///
/// The request list must be complete before this is called; resolution never
/// runs on a partial listing.
pub async fn build_repo_tree(
    repo: &RepoInfo,
    requests: &[ChangeRequest],
    options: &ResolveOptions,
    commit_source: Option<&dyn RemoteSource>,
) -> BranchNode {
    let mut root = resolve_tree(repo, requests, options);
    if let Some(source) = commit_source {
        decorate_commits(&mut root, &repo.full_name, source, COMMITS_PER_NODE).await;
    }
    root
}
