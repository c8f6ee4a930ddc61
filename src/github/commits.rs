//! Paginated commit retrieval and merge filtering.

use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RepoId;
use crate::error::GitHubError;
use crate::window::DateWindow;

/// Host page size for commit listing.
const PAGE_SIZE: usize = 100;

/// Safety limit to prevent infinite pagination loops.
const MAX_PAGES: u32 = 50;

/// Who wrote a commit, as far as the host can tell.
///
/// Both fields may be absent; [`display`](CommitAuthor::display) always
/// derives something printable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub login: Option<String>,
    pub name: Option<String>,
}

impl CommitAuthor {
    pub fn display(&self) -> &str {
        self.login
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// One normalized commit surfaced to the rest of the pipeline.
///
/// Merge commits never cross this boundary, so `is_merge` is always false
/// on records a caller can observe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub date: DateTime<Utc>,
    pub author: CommitAuthor,
    pub message: String,
    pub summary_line: String,
    pub is_merge: bool,
}

/// Raw wire shapes for `GET /repos/{owner}/{repo}/commits`.
///
/// Kept crate-local so parents and both signature dates stay visible;
/// unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RawCommit {
    sha: String,
    commit: RawCommitDetail,
    author: Option<RawAccount>,
    #[serde(default)]
    parents: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawCommitDetail {
    #[serde(default)]
    message: Option<String>,
    author: Option<RawSignature>,
    committer: Option<RawSignature>,
}

#[derive(Debug, Deserialize)]
struct RawSignature {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    login: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommitQuery {
    since: String,
    until: String,
    per_page: usize,
    page: u32,
}

/// Fetch non-merge commits for a window using a token.
///
/// This is the main entry point that constructs the octocrab client.
pub async fn fetch_commits(
    token: &str,
    repo: &RepoId,
    window: &DateWindow,
    cancel: &CancellationToken,
) -> Result<Vec<CommitRecord>, GitHubError> {
    let octocrab = Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| GitHubError::Transport(Box::new(e)))?;

    fetch_commits_with_client(&octocrab, repo, window, cancel).await
}

/// Fetch non-merge commits using a pre-configured octocrab client.
///
/// This allows dependency injection for testing with mock servers.
///
/// Pages of 100 are retrieved sequentially until a short page signals the
/// range is exhausted. Merge commits (more than one parent, or a summary
/// line starting with "merge") are dropped here and never reach the caller.
/// No retries are performed; retry policy belongs to the caller.
pub async fn fetch_commits_with_client(
    octocrab: &Octocrab,
    repo: &RepoId,
    window: &DateWindow,
    cancel: &CancellationToken,
) -> Result<Vec<CommitRecord>, GitHubError> {
    let route = format!("/repos/{}/{}/commits", repo.owner, repo.name);
    let since = window
        .start_instant()
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let until = window
        .end_instant()
        .to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut records = Vec::new();
    let mut page: u32 = 1;

    loop {
        let query = CommitQuery {
            since: since.clone(),
            until: until.clone(),
            per_page: PAGE_SIZE,
            page,
        };

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GitHubError::Cancelled),
            result = octocrab.get::<Vec<RawCommit>, _, _>(&route, Some(&query)) => {
                result.map_err(classify_octocrab_error)?
            }
        };

        let fetched = raw.len();
        for item in raw {
            if let Some(record) = normalize_commit(item) {
                records.push(record);
            }
        }
        debug!(page, fetched, kept = records.len(), "fetched commit page");

        // A short page is the last page.
        if fetched < PAGE_SIZE {
            break;
        }

        page += 1;
        if page > MAX_PAGES {
            warn!(
                "Reached {}-page safety limit while fetching commits for {}",
                MAX_PAGES, repo
            );
            break;
        }
    }

    Ok(records)
}

/// Normalize one raw host record; returns None for merge commits.
fn normalize_commit(raw: RawCommit) -> Option<CommitRecord> {
    let message = raw.commit.message.unwrap_or_default();
    let summary_line = message.lines().next().unwrap_or("").trim().to_string();

    let is_merge =
        raw.parents.len() > 1 || summary_line.to_lowercase().starts_with("merge");
    if is_merge {
        return None;
    }

    // Timestamp fallback: author date, committer date, retrieval time.
    let date = raw
        .commit
        .author
        .as_ref()
        .and_then(|sig| sig.date)
        .or_else(|| raw.commit.committer.as_ref().and_then(|sig| sig.date))
        .unwrap_or_else(Utc::now);

    // Display name fallback: linked login, commit author, committer.
    // Never fabricated past that.
    let login = raw.author.and_then(|account| account.login);
    let name = raw
        .commit
        .author
        .and_then(|sig| sig.name)
        .or_else(|| raw.commit.committer.and_then(|sig| sig.name));

    Some(CommitRecord {
        sha: raw.sha,
        date,
        author: CommitAuthor { login, name },
        message,
        summary_line,
        is_merge: false,
    })
}

/// Map an octocrab error to the component's failure taxonomy.
///
/// A 403/429 whose host message mentions a secondary rate limit is the
/// distinct retry-later condition; everything else from the host is a
/// generic upstream failure carrying its status and message, and transport
/// or body-parse failures fall back to a templated description.
fn classify_octocrab_error(err: octocrab::Error) -> GitHubError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let message = source.message;
            if (status == 403 || status == 429)
                && message.to_lowercase().contains("secondary rate limit")
            {
                GitHubError::RateLimited { message }
            } else {
                GitHubError::Api { status, message }
            }
        }
        other => GitHubError::Transport(Box::new(other)),
    }
}
