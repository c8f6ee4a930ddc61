//! The completion-model seam and its OpenRouter-compatible implementation.

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::ModelError;

/// Status reported when the provider does not supply one of its own.
const DEFAULT_UPSTREAM_STATUS: u16 = 502;

/// A text-generation model the composer can call.
///
/// Kept as a trait so tests can substitute a double without any network.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// The full configured model identifier.
    fn id(&self) -> &str;

    /// Run one system+user completion, observing the cancellation token at
    /// the network boundary.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError>;
}

/// Production implementation talking to an OpenRouter-compatible
/// `/chat/completions` endpoint.
#[derive(Debug)]
pub struct OpenRouterModel {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterModel {
    /// Build the client from configuration.
    ///
    /// Missing credentials or model identifier are a fatal configuration
    /// error, reported here without contacting the provider.
    pub fn new(config: &Config) -> Result<Self, ModelError> {
        if config.model_api_key.is_empty() {
            return Err(ModelError::MissingConfig("model access credential"));
        }
        if config.model.is_empty() {
            return Err(ModelError::MissingConfig("model identifier"));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key: config.model_api_key.clone(),
            model: config.model.clone(),
            base_url: config.model_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl CompletionModel for OpenRouterModel {
    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ModelError::Cancelled),
            result = request => result.map_err(|e| ModelError::Api {
                status: DEFAULT_UPSTREAM_STATUS,
                message: format!("model request failed: {e}"),
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = parse_provider_error(&text)
                .unwrap_or_else(|| format!("model provider returned status {}", status.as_u16()));
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ModelError::Api {
            status: DEFAULT_UPSTREAM_STATUS,
            message: format!("model response could not be parsed: {e}"),
        })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// Understands both `{"error": {"message": ...}}` and `{"message": ...}`;
/// anything else yields None and the caller falls back to a templated
/// message naming the status code.
fn parse_provider_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.pointer("/message"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}
