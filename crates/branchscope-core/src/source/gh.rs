//! [`RemoteSource`] backed by the GitHub `gh` CLI.
//!
//! Each lookup spawns one `gh` process and waits for it under a bounded
//! timeout. Authentication is whatever `gh auth` has already set up.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::payload::{parse_check_buckets, parse_compare_lines, parse_pr_list, parse_repo_lines};
use super::{RemoteSource, COMPARE_FETCH_LIMIT};
use crate::error::{ScopeError, ScopeResult};
use crate::model::{ChangeRequest, CheckStatus, CommitRecord, RepoInfo};

/// Default per-call timeout.
pub const DEFAULT_GH_TIMEOUT: Duration = Duration::from_secs(30);

const REPO_JQ: &str = "{name, full_name, default_branch, html_url, pushed_at, updated_at, description, archived}";
const PR_FIELDS: &str =
    "number,title,headRefName,baseRefName,author,createdAt,updatedAt,url,state,labels,isDraft,mergeable";
const COMMIT_JQ: &str = "{sha: .sha, message: .commit.message, author: .commit.author.name, date: .commit.author.date, html_url: .html_url, author_login: .author.login, author_avatar_url: .author.avatar_url}";

/// `gh` CLI client.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    timeout: Duration,
}

impl Default for GhCli {
    fn default() -> Self {
        Self {
            program: "gh".to_string(),
            timeout: DEFAULT_GH_TIMEOUT,
        }
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable, e.g. an absolute path or a wrapper script.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `gh` with `args` and return its stdout.
    ///
    /// With `accept_failure_output`, a non-zero exit that still printed
    /// something on stdout is treated as success. `gh pr checks` exits
    /// non-zero whenever a check is failing or pending.
    async fn run(&self, args: &[&str], accept_failure_output: bool) -> ScopeResult<String> {
        let rendered = args.join(" ");
        debug!(program = %self.program, args = %rendered, "spawning");

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScopeError::ToolUnavailable {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ScopeError::Timeout {
                program: self.program.clone(),
                args: rendered.clone(),
                timeout: self.timeout,
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if output.status.success() || (accept_failure_output && !stdout.trim().is_empty()) {
            return Ok(stdout);
        }

        Err(ScopeError::CommandFailed {
            program: self.program.clone(),
            args: rendered,
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl RemoteSource for GhCli {
    async fn list_repos(&self, organization: &str) -> ScopeResult<Vec<RepoInfo>> {
        let endpoint = format!("orgs/{organization}/repos");
        let jq = format!(".[] | {REPO_JQ}");
        let output = self
            .run(&["api", endpoint.as_str(), "--paginate", "--jq", jq.as_str()], false)
            .await?;
        Ok(parse_repo_lines(&output))
    }

    async fn list_open_requests(&self, repo_full_name: &str) -> ScopeResult<Vec<ChangeRequest>> {
        let output = self
            .run(
                &[
                    "pr",
                    "list",
                    "--repo",
                    repo_full_name,
                    "--state",
                    "open",
                    "--json",
                    PR_FIELDS,
                ],
                false,
            )
            .await?;
        parse_pr_list(&output)
    }

    async fn check_status(&self, repo_full_name: &str, number: u64) -> ScopeResult<CheckStatus> {
        let number = number.to_string();
        let output = self
            .run(
                &[
                    "pr",
                    "checks",
                    number.as_str(),
                    "--repo",
                    repo_full_name,
                    "--json",
                    "bucket",
                ],
                true,
            )
            .await?;
        parse_check_buckets(&output)
    }

    async fn compare_commits(
        &self,
        repo_full_name: &str,
        base: &str,
        head: &str,
    ) -> ScopeResult<Vec<CommitRecord>> {
        let endpoint = format!("repos/{repo_full_name}/compare/{base}...{head}");
        // The compare endpoint lists oldest first.
        let jq = format!(".commits | reverse | .[:{COMPARE_FETCH_LIMIT}] | .[] | {COMMIT_JQ}");
        let output = self.run(&["api", endpoint.as_str(), "--jq", jq.as_str()], false).await?;
        let mut commits = parse_compare_lines(&output);
        commits.truncate(COMPARE_FETCH_LIMIT);
        Ok(commits)
    }
}
