//! Error types for shiplog modules using thiserror.

use thiserror::Error;

/// Errors from GitHub commit retrieval.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// GitHub's secondary rate limit, kept distinct from ordinary upstream
    /// failures so callers can back off and retry later.
    #[error("{message}")]
    RateLimited { message: String },

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GitHub API request failed: {0}")]
    Transport(#[source] Box<octocrab::Error>),

    #[error("commit retrieval was cancelled")]
    Cancelled,
}

/// Errors from the completion-model provider.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model configuration missing: {0}")]
    MissingConfig(&'static str),

    #[error("model provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("summary generation was cancelled")]
    Cancelled,
}

/// Boundary error for report generation.
///
/// Every downstream failure is mapped to exactly one of these variants; the
/// `Display` string is the client-facing message and
/// [`status_code`](ReportError::status_code) is the HTTP-style code the
/// framework collaborator should answer with.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("missing or malformed date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("date range spans {days} days, exceeding the {max}-day maximum")]
    WindowTooLarge { days: i64, max: i64 },

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("{message}")]
    RateLimited { message: String },

    #[error("{message}")]
    Upstream { message: String },

    #[error("report generation did not complete within {0} seconds")]
    DeadlineExceeded(u64),

    #[error("report generation was cancelled")]
    Cancelled,
}

impl ReportError {
    /// HTTP-style status code for the outbound error shape.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::InvalidDate(_) | ReportError::InvalidRange { .. } => 400,
            ReportError::WindowTooLarge { .. } => 413,
            ReportError::RateLimited { .. } => 429,
            ReportError::MissingConfig(_) => 500,
            ReportError::Upstream { .. } => 502,
            ReportError::DeadlineExceeded(_) => 504,
            // Caller went away; nginx convention for client-closed-request.
            ReportError::Cancelled => 499,
        }
    }
}

impl From<GitHubError> for ReportError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { message } => ReportError::RateLimited { message },
            GitHubError::Cancelled => ReportError::Cancelled,
            other => ReportError::Upstream {
                message: other.to_string(),
            },
        }
    }
}

impl From<ModelError> for ReportError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingConfig(what) => ReportError::MissingConfig(what),
            ModelError::Cancelled => ReportError::Cancelled,
            other => ReportError::Upstream {
                message: other.to_string(),
            },
        }
    }
}
