//! Unified error type for the timeline pipeline.

use thiserror::Error;

/// All errors that can occur during ingestion, classification and storage.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// Repository URL does not match `https://<host>/<owner>/<repo>`
    #[error("Invalid repository URL '{0}': expected https://<host>/<owner>/<repo>")]
    InvalidUrl(String),

    /// A required input (owner, repo, page token) was missing or empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// `git clone` exited non-zero
    #[error("Clone failed: {0}")]
    CloneFailed(String),

    /// `git log` exited non-zero
    #[error("History extraction failed: {0}")]
    LogFailed(String),

    /// A bounded subprocess stage ran past its deadline
    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: &'static str, seconds: u64 },

    /// Ingestion was cancelled by the caller
    #[error("Ingestion cancelled")]
    Cancelled,

    /// The forge rejected the credential format for this repository
    /// (distinct from a revoked or invalid credential)
    #[error("Token type not accepted for this repository (status {status}): {message}. Use a classic personal access token with repo scope.")]
    TokenRestricted { status: u16, message: String },

    /// Request quota exhausted
    #[error("GitHub rate limit exceeded: {message}. Supply a GITHUB_TOKEN to raise the limit, or retry later.")]
    RateLimitExceeded { message: String },

    /// Any other non-2xx upstream response
    #[error("GitHub API error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level HTTP failure (DNS, TLS, connect)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Log/numstat output or an API payload did not parse
    #[error("Parse error: {0}")]
    Parse(String),

    /// Repository id is not registered
    #[error("Repository not found: {0}")]
    NotFound(String),

    /// Ingestion has not completed for this repository yet
    #[error("Repository is not ready: status is '{status}'")]
    NotReady { status: &'static str },

    /// Illegal repository status transition
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
