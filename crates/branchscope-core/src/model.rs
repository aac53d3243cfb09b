//! Repository, change-request, commit, and branch-tree records.
//!
//! Everything here is created fresh per scan. [`ChangeRequest`] and
//! [`RepoInfo`] are inputs collected from the remote source, [`BranchNode`]
//! is the resolved output that ends up in the written report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display names of change-request nodes are capped at this many characters.
pub const DISPLAY_TITLE_MAX: usize = 60;

/// Phantom nodes show a shorter, parenthesized title.
pub const PHANTOM_TITLE_MAX: usize = 40;

/// Commit messages keep only their first line, capped at this many characters.
pub const COMMIT_MESSAGE_MAX: usize = 80;

/// Length of the abbreviated commit hash.
pub const SHORT_SHA_LEN: usize = 7;

/// A repository as returned by the organization listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Short name, e.g. `"widgets"`.
    pub name: String,
    /// Qualified name, e.g. `"acme/widgets"`.
    pub full_name: String,
    pub default_branch: String,
    pub html_url: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub archived: bool,
}

impl RepoInfo {
    /// Minimal repository record; remaining fields default to empty.
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        let full_name = full_name.into();
        Self {
            name: name.into(),
            html_url: format!("https://github.com/{full_name}"),
            full_name,
            default_branch: default_branch.into(),
            pushed_at: None,
            updated_at: None,
            description: None,
            archived: false,
        }
    }

    pub fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }
}

/// Aggregated review-check status of a change request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Pending,
    #[default]
    Unknown,
}

impl CheckStatus {
    /// Fold individual check buckets into one status.
    ///
    /// `fail` dominates `pending`, which dominates `pass`. Anything else,
    /// including an empty set, is [`CheckStatus::Unknown`].
    pub fn from_buckets<'a, I>(buckets: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut has_pending = false;
        let mut has_pass = false;
        for bucket in buckets {
            match bucket {
                "fail" => return CheckStatus::Fail,
                "pending" => has_pending = true,
                "pass" => has_pass = true,
                _ => {}
            }
        }
        if has_pending {
            CheckStatus::Pending
        } else if has_pass {
            CheckStatus::Pass
        } else {
            CheckStatus::Unknown
        }
    }
}

/// An open change request (pull request) in one repository.
///
/// `head_branch` is unique within a repository's open-request set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub number: u64,
    pub title: String,
    /// Source branch.
    pub head_branch: String,
    /// Target branch.
    pub base_branch: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub check_status: CheckStatus,
    pub state: String,
    pub labels: Vec<String>,
    pub draft: bool,
    pub mergeable: bool,
}

impl ChangeRequest {
    pub fn new(
        number: u64,
        title: impl Into<String>,
        head_branch: impl Into<String>,
        base_branch: impl Into<String>,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            head_branch: head_branch.into(),
            base_branch: base_branch.into(),
            author: "unknown".to_string(),
            created_at: None,
            updated_at: None,
            html_url: String::new(),
            check_status: CheckStatus::Unknown,
            state: "OPEN".to_string(),
            labels: Vec::new(),
            draft: false,
            mergeable: true,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// One commit of a branch's delta against its parent branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub short_sha: String,
    /// First line of the commit message, capped at [`COMMIT_MESSAGE_MAX`].
    pub message: String,
    pub author: String,
    #[serde(default)]
    pub author_login: Option<String>,
    #[serde(default)]
    pub author_avatar_url: Option<String>,
    pub date: Option<NaiveDate>,
    pub html_url: String,
}

impl CommitRecord {
    /// Build a record from raw commit fields, normalising hash and message.
    pub fn new(
        sha: impl Into<String>,
        message: &str,
        author: impl Into<String>,
        date: Option<NaiveDate>,
        html_url: impl Into<String>,
    ) -> Self {
        let sha = sha.into();
        Self {
            short_sha: truncate_chars(&sha, SHORT_SHA_LEN),
            sha,
            message: first_line(message, COMMIT_MESSAGE_MAX),
            author: author.into(),
            author_login: None,
            author_avatar_url: None,
            date,
            html_url: html_url.into(),
        }
    }
}

/// A branch in a repository's resolved dependency tree.
///
/// The root represents the default branch and carries no change-request
/// identity. Every other node appears as a child of exactly one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    /// Display name: repository name for the root, truncated title otherwise.
    pub name: String,
    pub branch: String,
    pub repo_name: String,
    pub pr_number: Option<u64>,
    /// Full, untruncated title.
    pub pr_title: Option<String>,
    pub pr_url: Option<String>,
    pub pr_author: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub ci_status: CheckStatus,
    pub github_url: String,
    pub is_draft: bool,
    pub labels: Vec<String>,
    pub commits_from_parent: Vec<CommitRecord>,
    pub parent_branch_name: Option<String>,
    pub children: Vec<BranchNode>,
}

impl BranchNode {
    /// Root node for a repository's default branch.
    pub fn root(repo: &RepoInfo) -> Self {
        Self {
            name: repo.name.clone(),
            branch: repo.default_branch.clone(),
            repo_name: repo.name.clone(),
            pr_number: None,
            pr_title: None,
            pr_url: None,
            pr_author: None,
            last_updated: repo.pushed_at,
            ci_status: CheckStatus::Unknown,
            github_url: repo.html_url.clone(),
            is_draft: false,
            labels: Vec::new(),
            commits_from_parent: Vec::new(),
            parent_branch_name: None,
            children: Vec::new(),
        }
    }

    /// Node for a change request that was enumerated directly.
    pub fn from_request(repo: &RepoInfo, pr: &ChangeRequest) -> Self {
        Self {
            name: truncate_chars(&pr.title, DISPLAY_TITLE_MAX),
            branch: pr.head_branch.clone(),
            repo_name: repo.name.clone(),
            pr_number: Some(pr.number),
            pr_title: Some(pr.title.clone()),
            pr_url: Some(pr.html_url.clone()),
            pr_author: Some(pr.author.clone()),
            last_updated: pr.updated_at,
            ci_status: pr.check_status,
            github_url: repo.html_url.clone(),
            is_draft: pr.draft,
            labels: pr.labels.clone(),
            commits_from_parent: Vec::new(),
            parent_branch_name: None,
            children: Vec::new(),
        }
    }

    /// Node for an intermediate request only reached through another
    /// request's target chain. No author, no labels.
    pub fn phantom(repo: &RepoInfo, pr: &ChangeRequest) -> Self {
        Self {
            name: phantom_title(&pr.title),
            branch: pr.head_branch.clone(),
            repo_name: repo.name.clone(),
            pr_number: Some(pr.number),
            pr_title: Some(pr.title.clone()),
            pr_url: Some(pr.html_url.clone()),
            pr_author: None,
            last_updated: None,
            ci_status: pr.check_status,
            github_url: repo.html_url.clone(),
            is_draft: false,
            labels: Vec::new(),
            commits_from_parent: Vec::new(),
            parent_branch_name: None,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.pr_number.is_none() && self.parent_branch_name.is_none()
    }

    /// All nodes in depth-first pre-order, root included.
    pub fn walk(&self) -> Vec<&BranchNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.walk().len()
    }

    /// Find a node by branch name.
    pub fn find(&self, branch: &str) -> Option<&BranchNode> {
        self.walk().into_iter().find(|n| n.branch == branch)
    }

    /// Branch names of the direct children, in order.
    pub fn child_branches(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.branch.as_str()).collect()
    }
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// First line of `s`, capped at `max` characters.
pub fn first_line(s: &str, max: usize) -> String {
    truncate_chars(s.lines().next().unwrap_or(""), max)
}

fn phantom_title(title: &str) -> String {
    if title.chars().count() > PHANTOM_TITLE_MAX {
        format!("({}...)", truncate_chars(title, PHANTOM_TITLE_MAX))
    } else {
        format!("({title})")
    }
}
