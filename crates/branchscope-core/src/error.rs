//! Error types for organization scanning and remote lookups.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while talking to the remote source or assembling a report.
///
/// Most variants never reach the caller of [`crate::OrgScanner::scan`]: the
/// collector and scanner absorb per-call failures into empty results. Only
/// [`ScopeError::NoRepositories`] aborts a scan.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The helper binary exited with a non-zero status.
    #[error("`{program} {args}` exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        status: i32,
        stderr: String,
    },

    /// The helper binary did not answer within its time budget.
    #[error("`{program} {args}` timed out after {timeout:?}")]
    Timeout {
        program: String,
        args: String,
        timeout: Duration,
    },

    /// The helper binary could not be spawned at all.
    #[error("{program} is not available: {reason}")]
    ToolUnavailable { program: String, reason: String },

    /// The remote answered with something that is not the expected payload.
    #[error("malformed {what} payload: {detail}")]
    MalformedPayload { what: String, detail: String },

    /// Not a single repository could be listed for the organization.
    #[error("No repositories found for {organization}")]
    NoRepositories { organization: String },

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias.
pub type ScopeResult<T> = std::result::Result<T, ScopeError>;
