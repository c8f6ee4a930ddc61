//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

use shiplog::config::{Config, RepoId};
use shiplog::error::ModelError;
use shiplog::summary::CompletionModel;

/// Configuration pointing at test doubles; tests mutate fields as needed.
pub fn test_config() -> Config {
    Config {
        github_token: "test-token".into(),
        repo: RepoId {
            owner: "acme".into(),
            name: "widgets".into(),
        },
        model_api_key: "test-key".into(),
        model: "anthropic/claude-sonnet-4".into(),
        model_base_url: "http://unused.invalid".into(),
        max_window_days: 30,
        deadline: Duration::from_secs(120),
    }
}

/// Octocrab client pointing at a mock server.
pub fn github_client(server: &MockServer) -> Octocrab {
    Octocrab::builder()
        .base_uri(server.uri())
        .expect("Failed to set base URI")
        .build()
        .expect("Failed to build octocrab")
}

/// One raw commit object as the GitHub commits endpoint returns it.
pub fn commit_json(sha: &str, message: &str, date: &str, parent_count: usize) -> Value {
    let parents: Vec<Value> = (0..parent_count)
        .map(|i| json!({ "sha": format!("parent-{i}") }))
        .collect();
    json!({
        "sha": sha,
        "commit": {
            "message": message,
            "author": { "name": "Alice Example", "date": date },
            "committer": { "name": "GitHub", "date": date }
        },
        "author": { "login": "alice" },
        "parents": parents
    })
}

/// A page of plain single-parent commits.
pub fn commit_page(count: usize, date: &str) -> Vec<Value> {
    (0..count)
        .map(|i| commit_json(&format!("sha-{i}"), &format!("Change number {i}"), date, 1))
        .collect()
}

/// Scripted stand-in for the completion model: fixed response, optional
/// delay, call counting.
pub struct ScriptedModel {
    response: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn replying(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(response: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    fn id(&self) -> &str {
        "test/scripted-model"
    }

    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ModelError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        Ok(self.response.clone())
    }
}
