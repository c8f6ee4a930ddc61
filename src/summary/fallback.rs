//! Deterministic summary rendering for when the model cannot be trusted.
//!
//! Pure functions from a commit batch to markup, unit-testable without any
//! model in the loop.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::github::CommitRecord;
use crate::window::DateWindow;

use super::ReportSummary;

/// Fixed summary for a window with no commits. No model call is made for
/// this case.
pub fn empty_window_summary(window: &DateWindow) -> ReportSummary {
    ReportSummary {
        html: format!(
            "<p>No commits were found between {} and {}.</p>",
            window.start(),
            window.end()
        ),
    }
}

/// Structural fallback when the model returns nothing usable.
///
/// Groups commits by UTC calendar day (day keys ascending) and emits one
/// section per day with a list of escaped summary lines, wrapped with a
/// description of the date span.
pub fn render_fallback(window: &DateWindow, commits: &[CommitRecord]) -> ReportSummary {
    let mut days: BTreeMap<NaiveDate, Vec<&CommitRecord>> = BTreeMap::new();
    for commit in commits {
        days.entry(commit.date.date_naive()).or_default().push(commit);
    }

    let mut html = format!(
        "<section><p>Commits from {} to {}.</p>",
        window.start(),
        window.end()
    );
    for (day, group) in &days {
        html.push_str(&format!("<section><h3>{day}</h3><ul>"));
        for commit in group {
            html.push_str(&format!("<li>{}</li>", escape_html(&commit.summary_line)));
        }
        html.push_str("</ul></section>");
    }
    html.push_str("</section>");

    ReportSummary { html }
}

/// Escape text for embedding in an HTML container.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
