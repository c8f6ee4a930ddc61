//! Process-wide configuration, loaded once and passed in explicitly.
//!
//! Nothing in the pipeline reads the environment directly; the binary calls
//! [`Config::from_env`] and hands the result to the orchestrator so tests
//! can swap configuration per call.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ReportError;

/// Default inclusive window maximum in days.
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 30;

/// Default deadline covering commit retrieval plus summary generation.
pub const DEFAULT_DEADLINE_SECS: u64 = 120;

/// Default OpenRouter-compatible API root.
pub const DEFAULT_MODEL_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// A `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parse an `owner/name` pair.
    pub fn parse(raw: &str) -> Result<Self, ReportError> {
        let mut parts = raw.splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ReportError::MissingConfig(
                "repository identifier (expected owner/name)",
            )),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Read-only configuration for one reporter instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub access token.
    pub github_token: String,
    /// Repository the report covers.
    pub repo: RepoId,
    /// Model provider API key.
    pub model_api_key: String,
    /// Full configured model identifier, possibly `provider/model-name`.
    pub model: String,
    /// Model provider API root.
    pub model_base_url: String,
    /// Maximum inclusive window span in days.
    pub max_window_days: i64,
    /// Deadline covering both pipeline stages.
    pub deadline: Duration,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// The GitHub token is resolved with a fallback chain:
    /// 1. `GITHUB_TOKEN`
    /// 2. `GH_TOKEN`
    pub fn from_env() -> Result<Self, ReportError> {
        let github_token = env_var("GITHUB_TOKEN")
            .or_else(|| env_var("GH_TOKEN"))
            .ok_or(ReportError::MissingConfig(
                "GitHub access token (set GITHUB_TOKEN or GH_TOKEN)",
            ))?;

        let repo = RepoId::parse(&env_var("SHIPLOG_REPO").ok_or(ReportError::MissingConfig(
            "target repository (set SHIPLOG_REPO to owner/name)",
        ))?)?;

        let model_api_key = env_var("OPENROUTER_API_KEY").ok_or(ReportError::MissingConfig(
            "model API key (set OPENROUTER_API_KEY)",
        ))?;

        let model = env_var("OPENROUTER_MODEL").ok_or(ReportError::MissingConfig(
            "model identifier (set OPENROUTER_MODEL)",
        ))?;

        let model_base_url =
            env_var("OPENROUTER_BASE_URL").unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string());

        Ok(Self {
            github_token,
            repo,
            model_api_key,
            model,
            model_base_url,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        })
    }

    /// The model identifier with any provider prefix stripped.
    ///
    /// Configuration values like `anthropic/claude-sonnet-4` surface to
    /// clients as just `claude-sonnet-4`.
    pub fn display_model(&self) -> &str {
        self.model.rsplit('/').next().unwrap_or(&self.model)
    }
}

fn env_var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}
