//! Parsing of `gh` output into domain records.
//!
//! Kept free of any process handling so every shape can be tested from
//! literal strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ScopeError, ScopeResult};
use crate::model::{ChangeRequest, CheckStatus, CommitRecord, RepoInfo};

#[derive(Debug, Deserialize)]
struct RawRepo {
    name: String,
    full_name: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    archived: bool,
}

impl From<RawRepo> for RepoInfo {
    fn from(raw: RawRepo) -> Self {
        RepoInfo {
            name: raw.name,
            full_name: raw.full_name,
            default_branch: raw.default_branch.unwrap_or_else(|| "main".to_string()),
            html_url: raw.html_url,
            pushed_at: raw.pushed_at,
            updated_at: raw.updated_at,
            description: raw.description,
            archived: raw.archived,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default)]
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPullRequest {
    number: u64,
    title: String,
    head_ref_name: String,
    base_ref_name: String,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    is_draft: bool,
    #[serde(default)]
    mergeable: Option<String>, // "MERGEABLE", "CONFLICTING", "UNKNOWN"
}

impl From<RawPullRequest> for ChangeRequest {
    fn from(raw: RawPullRequest) -> Self {
        ChangeRequest {
            number: raw.number,
            title: raw.title,
            head_branch: raw.head_ref_name,
            base_branch: raw.base_ref_name,
            author: raw
                .author
                .and_then(|a| a.login)
                .unwrap_or_else(|| "unknown".to_string()),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            html_url: raw.url,
            check_status: CheckStatus::Unknown,
            state: raw.state.unwrap_or_else(|| "OPEN".to_string()),
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            draft: raw.is_draft,
            mergeable: raw.mergeable.as_deref() != Some("CONFLICTING"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCheck {
    #[serde(default)]
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    sha: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    author_login: Option<String>,
    #[serde(default)]
    author_avatar_url: Option<String>,
}

impl From<RawCommit> for CommitRecord {
    fn from(raw: RawCommit) -> Self {
        let date = raw.date.as_deref().and_then(parse_commit_date);
        let mut record = CommitRecord::new(
            raw.sha,
            &raw.message,
            raw.author.unwrap_or_default(),
            date,
            raw.html_url,
        );
        record.author_login = raw.author_login.filter(|s| !s.is_empty());
        record.author_avatar_url = raw.author_avatar_url.filter(|s| !s.is_empty());
        record
    }
}

/// Calendar date from an ISO-8601 timestamp such as `2025-03-01T12:00:00Z`.
fn parse_commit_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Newline-delimited repository objects. Lines that do not parse are skipped.
pub fn parse_repo_lines(output: &str) -> Vec<RepoInfo> {
    parse_lines::<RawRepo>(output, "repository")
        .into_iter()
        .map(RepoInfo::from)
        .collect()
}

/// A JSON array as printed by `gh pr list --json ...`.
pub fn parse_pr_list(output: &str) -> ScopeResult<Vec<ChangeRequest>> {
    let raw: Vec<RawPullRequest> =
        serde_json::from_str(output).map_err(|e| ScopeError::MalformedPayload {
            what: "pull request list".to_string(),
            detail: e.to_string(),
        })?;
    Ok(raw.into_iter().map(ChangeRequest::from).collect())
}

/// A JSON array of `{bucket}` objects as printed by `gh pr checks --json bucket`.
///
/// Blank output means no checks are configured.
pub fn parse_check_buckets(output: &str) -> ScopeResult<CheckStatus> {
    if output.trim().is_empty() {
        return Ok(CheckStatus::Unknown);
    }
    let checks: Vec<RawCheck> =
        serde_json::from_str(output).map_err(|e| ScopeError::MalformedPayload {
            what: "check list".to_string(),
            detail: e.to_string(),
        })?;
    Ok(CheckStatus::from_buckets(
        checks.iter().map(|c| c.bucket.as_str()),
    ))
}

/// Newline-delimited commit objects from the compare endpoint.
pub fn parse_compare_lines(output: &str) -> Vec<CommitRecord> {
    parse_lines::<RawCommit>(output, "commit")
        .into_iter()
        .map(CommitRecord::from)
        .collect()
}

fn parse_lines<T: for<'de> Deserialize<'de>>(output: &str, what: &str) -> Vec<T> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<T>(line) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(what, error = %err, "skipping unparseable line");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_lines_skip_garbage_and_default_branch() {
        let output = concat!(
            r#"{"name":"a","full_name":"org/a","default_branch":"develop","html_url":"https://github.com/org/a","pushed_at":"2025-01-02T03:04:05Z","updated_at":"2025-01-02T03:04:05Z","description":null,"archived":false}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"name":"b","full_name":"org/b","default_branch":null,"html_url":"https://github.com/org/b","pushed_at":null,"updated_at":null,"description":"B","archived":true}"#,
            "\n",
        );
        let repos = parse_repo_lines(output);
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].default_branch, "develop");
        assert!(repos[0].pushed_at.is_some());
        assert_eq!(repos[1].default_branch, "main");
        assert!(repos[1].archived);
        assert_eq!(repos[1].description.as_deref(), Some("B"));
    }

    #[test]
    fn test_pr_list_maps_fields() {
        let output = r#"[
            {"number": 12, "title": "Add feature", "headRefName": "feat", "baseRefName": "main",
             "author": {"login": "octocat"}, "createdAt": "2025-01-01T00:00:00Z",
             "updatedAt": "2025-01-03T00:00:00Z", "url": "https://github.com/org/a/pull/12",
             "state": "OPEN", "labels": [{"name": "bug"}, {"name": "stacked"}],
             "isDraft": true, "mergeable": "CONFLICTING"},
            {"number": 13, "title": "Other", "headRefName": "other", "baseRefName": "feat",
             "author": null, "labels": [], "isDraft": false, "mergeable": "UNKNOWN"}
        ]"#;
        let prs = parse_pr_list(output).unwrap();
        assert_eq!(prs.len(), 2);

        let first = &prs[0];
        assert_eq!(first.number, 12);
        assert_eq!(first.head_branch, "feat");
        assert_eq!(first.base_branch, "main");
        assert_eq!(first.author, "octocat");
        assert_eq!(first.labels, vec!["bug", "stacked"]);
        assert!(first.draft);
        assert!(!first.mergeable);

        let second = &prs[1];
        assert_eq!(second.author, "unknown");
        assert!(second.mergeable);
        assert_eq!(second.state, "OPEN");
    }

    #[test]
    fn test_pr_list_rejects_non_array() {
        let err = parse_pr_list("{\"message\": \"Not Found\"}").unwrap_err();
        assert!(matches!(err, ScopeError::MalformedPayload { .. }));
    }

    #[test]
    fn test_check_buckets() {
        assert_eq!(
            parse_check_buckets(r#"[{"bucket":"pass"},{"bucket":"pending"}]"#).unwrap(),
            CheckStatus::Pending
        );
        assert_eq!(
            parse_check_buckets(r#"[{"bucket":"pass"},{"bucket":"fail"}]"#).unwrap(),
            CheckStatus::Fail
        );
        assert_eq!(parse_check_buckets("[]").unwrap(), CheckStatus::Unknown);
        assert_eq!(parse_check_buckets("  \n").unwrap(), CheckStatus::Unknown);
        assert!(parse_check_buckets("no checks reported").is_err());
    }

    #[test]
    fn test_compare_lines_normalise_commit() {
        let output = concat!(
            r#"{"sha":"abcdef0123456789","message":"Fix the thing\n\nLonger body","author":"Ada Lovelace","date":"2025-03-01T12:30:00Z","html_url":"https://github.com/org/a/commit/abcdef0","author_login":"ada","author_avatar_url":"https://avatars.example/ada"}"#,
            "\n",
            r#"{"sha":"1234567890","message":"Second","author":"Bob","date":"2025-03-02T00:00:00Z","html_url":"","author_login":null,"author_avatar_url":null}"#,
            "\n",
        );
        let commits = parse_compare_lines(output);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].short_sha, "abcdef0");
        assert_eq!(commits[0].message, "Fix the thing");
        assert_eq!(commits[0].date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(commits[0].author_login.as_deref(), Some("ada"));
        assert!(commits[1].author_login.is_none());
    }
}
