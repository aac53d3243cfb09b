//! In-memory fake for [`RemoteSource`] (testing only)
//!
//! [`MemoryRemoteSource`] answers from maps filled by the test and records
//! every lookup so call order and count can be asserted.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ScopeError, ScopeResult};
use crate::model::{ChangeRequest, CheckStatus, CommitRecord, RepoInfo};
use crate::source::RemoteSource;

type CompareKey = (String, String, String);

#[derive(Debug, Default)]
struct State {
    repos: Option<Vec<RepoInfo>>,
    requests: HashMap<String, Vec<ChangeRequest>>,
    failing_requests: HashSet<String>,
    statuses: HashMap<(String, u64), CheckStatus>,
    failing_statuses: HashSet<(String, u64)>,
    commits: HashMap<CompareKey, Vec<CommitRecord>>,
    failing_commits: HashSet<CompareKey>,
    check_calls: Vec<(String, u64)>,
    compare_calls: Vec<CompareKey>,
}

/// Remote source backed by in-memory maps.
///
/// Repository listing fails until [`MemoryRemoteSource::set_repos`] is
/// called. Unknown repositories have no open requests, unknown requests have
/// [`CheckStatus::Unknown`], unknown comparisons have no commits.
#[derive(Debug, Default)]
pub struct MemoryRemoteSource {
    state: Mutex<State>,
}

fn compare_key(repo: &str, base: &str, head: &str) -> CompareKey {
    (repo.to_string(), base.to_string(), head.to_string())
}

fn unavailable(what: &str) -> ScopeError {
    ScopeError::CommandFailed {
        program: "memory".to_string(),
        args: what.to_string(),
        status: 1,
        stderr: "injected failure".to_string(),
    }
}

impl MemoryRemoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_repos(&self, repos: Vec<RepoInfo>) {
        self.state.lock().unwrap().repos = Some(repos);
    }

    pub fn set_requests(&self, repo_full_name: &str, requests: Vec<ChangeRequest>) {
        self.state
            .lock()
            .unwrap()
            .requests
            .insert(repo_full_name.to_string(), requests);
    }

    /// Make the request listing of `repo_full_name` fail.
    pub fn fail_requests(&self, repo_full_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_requests
            .insert(repo_full_name.to_string());
    }

    pub fn set_status(&self, repo_full_name: &str, number: u64, status: CheckStatus) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert((repo_full_name.to_string(), number), status);
    }

    /// Make the check-status lookup of request `number` fail.
    pub fn fail_status(&self, repo_full_name: &str, number: u64) {
        self.state
            .lock()
            .unwrap()
            .failing_statuses
            .insert((repo_full_name.to_string(), number));
    }

    pub fn set_commits(&self, repo_full_name: &str, base: &str, head: &str, commits: Vec<CommitRecord>) {
        self.state
            .lock()
            .unwrap()
            .commits
            .insert(compare_key(repo_full_name, base, head), commits);
    }

    /// Make the comparison `base...head` of `repo_full_name` fail.
    pub fn fail_commits(&self, repo_full_name: &str, base: &str, head: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_commits
            .insert(compare_key(repo_full_name, base, head));
    }

    /// Every check-status lookup so far, in call order.
    pub fn check_calls(&self) -> Vec<(String, u64)> {
        self.state.lock().unwrap().check_calls.clone()
    }

    /// Every comparison so far as `(repo, base, head)`, in call order.
    pub fn compare_calls(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().compare_calls.clone()
    }
}

#[async_trait]
impl RemoteSource for MemoryRemoteSource {
    async fn list_repos(&self, _organization: &str) -> ScopeResult<Vec<RepoInfo>> {
        self.state
            .lock()
            .unwrap()
            .repos
            .clone()
            .ok_or_else(|| unavailable("list_repos"))
    }

    async fn list_open_requests(&self, repo_full_name: &str) -> ScopeResult<Vec<ChangeRequest>> {
        let state = self.state.lock().unwrap();
        if state.failing_requests.contains(repo_full_name) {
            return Err(unavailable("list_open_requests"));
        }
        Ok(state.requests.get(repo_full_name).cloned().unwrap_or_default())
    }

    async fn check_status(&self, repo_full_name: &str, number: u64) -> ScopeResult<CheckStatus> {
        let mut state = self.state.lock().unwrap();
        let key = (repo_full_name.to_string(), number);
        state.check_calls.push(key.clone());
        if state.failing_statuses.contains(&key) {
            return Err(unavailable("check_status"));
        }
        Ok(state.statuses.get(&key).copied().unwrap_or_default())
    }

    async fn compare_commits(
        &self,
        repo_full_name: &str,
        base: &str,
        head: &str,
    ) -> ScopeResult<Vec<CommitRecord>> {
        let mut state = self.state.lock().unwrap();
        let key = compare_key(repo_full_name, base, head);
        state.compare_calls.push(key.clone());
        if state.failing_commits.contains(&key) {
            return Err(unavailable("compare_commits"));
        }
        Ok(state.commits.get(&key).cloned().unwrap_or_default())
    }
}
