//! Summary composition: prompt building, model invocation, and the
//! deterministic fallback when the model misbehaves.

pub mod fallback;
pub mod model;
pub mod prompt;

pub use fallback::{empty_window_summary, escape_html, render_fallback};
pub use model::{CompletionModel, OpenRouterModel};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RepoId;
use crate::error::ModelError;
use crate::github::CommitRecord;
use crate::window::DateWindow;

/// The natural-language report fragment for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub html: String,
}

/// Turn a commit batch into an HTML summary.
///
/// An empty batch short-circuits to a fixed sentence without contacting the
/// model. Otherwise the model is invoked with the structural contract from
/// [`prompt`] and its output is validated: whitespace-only responses use the
/// deterministic day-grouped fallback, and plain-text responses are escaped
/// and wrapped rather than trusted as markup.
pub async fn compose_summary(
    model: &dyn CompletionModel,
    repo: &RepoId,
    window: &DateWindow,
    commits: &[CommitRecord],
    cancel: &CancellationToken,
) -> Result<ReportSummary, ModelError> {
    if commits.is_empty() {
        return Ok(empty_window_summary(window));
    }

    let system = prompt::system_instruction();
    let user = prompt::build_commit_digest(repo, window, commits);

    debug!(
        commits = commits.len(),
        model = model.id(),
        "requesting summary from model"
    );
    let raw = model.complete(&system, &user, cancel).await?;

    Ok(validate_output(&raw, window, commits))
}

/// Structural validation of the model's response.
fn validate_output(raw: &str, window: &DateWindow, commits: &[CommitRecord]) -> ReportSummary {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        warn!("model returned an empty summary, using the structural fallback");
        return render_fallback(window, commits);
    }

    if !trimmed.starts_with('<') {
        warn!("model response is not markup, wrapping as escaped text");
        return ReportSummary {
            html: format!("<p>{}</p>", escape_html(trimmed)),
        };
    }

    ReportSummary {
        html: trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    use crate::github::CommitAuthor;

    fn commit(summary: &str) -> CommitRecord {
        CommitRecord {
            sha: "abc123".into(),
            date: Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap(),
            author: CommitAuthor {
                login: Some("alice".into()),
                name: None,
            },
            message: summary.to_string(),
            summary_line: summary.to_string(),
            is_merge: false,
        }
    }

    fn window() -> DateWindow {
        DateWindow::parse("2025-01-01", "2025-01-07", 30).unwrap()
    }

    #[test]
    fn test_whitespace_response_uses_fallback() {
        let summary = validate_output("   \n\t  ", &window(), &[commit("Add thing")]);
        assert!(summary.html.contains("<ul>"));
        assert!(summary.html.contains("Add thing"));
    }

    #[test]
    fn test_plain_text_response_is_escaped_and_wrapped() {
        let summary = validate_output(
            "Week of fixes & <improvements>",
            &window(),
            &[commit("Add thing")],
        );
        assert_eq!(
            summary.html,
            "<p>Week of fixes &amp; &lt;improvements&gt;</p>"
        );
    }

    #[test]
    fn test_markup_response_passes_through_trimmed() {
        let summary = validate_output(
            "\n<section><h2>Changes</h2></section>\n",
            &window(),
            &[commit("Add thing")],
        );
        assert_eq!(summary.html, "<section><h2>Changes</h2></section>");
    }
}
