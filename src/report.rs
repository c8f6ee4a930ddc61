//! Report orchestration: validation, the shared deadline, and assembly.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use octocrab::Octocrab;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::error::ReportError;
use crate::github::{fetch_commits_with_client, CommitRecord};
use crate::summary::{compose_summary, CompletionModel, OpenRouterModel, ReportSummary};
use crate::window::DateWindow;

/// Marker distinguishing the live path from any future cached one.
const SOURCE_LIVE: &str = "live";

/// Metadata about how a report was produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub commit_count: usize,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub source: &'static str,
}

/// The complete answer to "what shipped between these dates".
///
/// Constructed exactly once per request, returned, then discarded; no
/// server-side state outlives the request.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub repo: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub commits: Vec<CommitRecord>,
    pub summary_html: String,
    pub meta: ReportMeta,
}

/// Owns the configuration and both downstream clients for one pipeline.
pub struct Reporter {
    config: Config,
    github: Octocrab,
    model: Arc<dyn CompletionModel>,
}

impl Reporter {
    /// Build a reporter and its downstream clients from configuration.
    pub fn new(config: Config) -> Result<Self, ReportError> {
        if config.github_token.is_empty() {
            return Err(ReportError::MissingConfig("GitHub access token"));
        }

        let github = Octocrab::builder()
            .personal_token(config.github_token.clone())
            .build()
            .map_err(|e| ReportError::Upstream {
                message: format!("failed to construct GitHub client: {e}"),
            })?;

        let model = OpenRouterModel::new(&config)?;

        Ok(Self {
            config,
            github,
            model: Arc::new(model),
        })
    }

    /// Construct with injected clients, for tests and embedders.
    pub fn with_parts(config: Config, github: Octocrab, model: Arc<dyn CompletionModel>) -> Self {
        Self {
            config,
            github,
            model,
        }
    }

    /// Generate a report for two raw `YYYY-MM-DD` strings.
    pub async fn generate_report(
        &self,
        raw_start: &str,
        raw_end: &str,
    ) -> Result<Report, ReportError> {
        self.generate_report_with_cancel(raw_start, raw_end, &CancellationToken::new())
            .await
    }

    /// Generate a report, honoring a caller-supplied cancellation token.
    ///
    /// Validation happens before any network call. Both downstream stages
    /// run sequentially under one deadline; when it expires the shared
    /// token is cancelled and the whole operation reports a timeout
    /// regardless of which stage was in flight.
    pub async fn generate_report_with_cancel(
        &self,
        raw_start: &str,
        raw_end: &str,
        caller: &CancellationToken,
    ) -> Result<Report, ReportError> {
        let window = DateWindow::parse(raw_start, raw_end, self.config.max_window_days)?;
        debug!(
            repo = %self.config.repo,
            start = %window.start(),
            end = %window.end(),
            "generating report"
        );

        let cancel = caller.child_token();
        let outcome =
            tokio::time::timeout(self.config.deadline, self.run_pipeline(&window, &cancel)).await;

        let (commits, summary) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                cancel.cancel();
                return Err(ReportError::DeadlineExceeded(
                    self.config.deadline.as_secs(),
                ));
            }
        };

        Ok(Report {
            repo: self.config.repo.to_string(),
            start: window.start(),
            end: window.end(),
            meta: ReportMeta {
                commit_count: commits.len(),
                model: self.config.display_model().to_string(),
                generated_at: Utc::now(),
                source: SOURCE_LIVE,
            },
            commits,
            summary_html: summary.html,
        })
    }

    /// Commit retrieval, then summary composition. The composer skips the
    /// model entirely when the batch is empty.
    async fn run_pipeline(
        &self,
        window: &DateWindow,
        cancel: &CancellationToken,
    ) -> Result<(Vec<CommitRecord>, ReportSummary), ReportError> {
        let commits =
            fetch_commits_with_client(&self.github, &self.config.repo, window, cancel).await?;
        let summary = compose_summary(
            self.model.as_ref(),
            &self.config.repo,
            window,
            &commits,
            cancel,
        )
        .await?;
        Ok((commits, summary))
    }
}
