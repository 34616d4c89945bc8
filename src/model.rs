//! Generative model provider abstraction and implementations.
//!
//! Defines the [`ChatModel`] trait and concrete implementations:
//! - **[`DisabledModel`]** — returns errors; used when no provider is configured.
//! - **[`GeminiModel`]** — calls the Google Generative Language API.
//!
//! The model call is the only asynchronous, potentially long-running step
//! in the query pipeline. It carries a request timeout and is attempted
//! exactly once per user query — failures surface to the orchestration
//! layer, which maps them to fixed user-facing messages instead of
//! retrying.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ModelConfig;

/// Model used when the config names the gemini provider without a model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Failure modes of a completion call.
#[derive(Debug)]
pub enum ModelError {
    /// Provider disabled or credential missing.
    NotConfigured(String),
    /// The API rejected the credential (401/403).
    Auth(String),
    /// The API rate-limited the request (429).
    RateLimited(String),
    /// Transport-level failure.
    Network(String),
    /// The request exceeded the configured timeout (seconds).
    Timeout(u64),
    /// Unexpected status or response shape.
    Api(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NotConfigured(msg) => write!(f, "model not configured: {}", msg),
            ModelError::Auth(msg) => write!(f, "authentication failed: {}", msg),
            ModelError::RateLimited(msg) => write!(f, "rate limited: {}", msg),
            ModelError::Network(msg) => write!(f, "network error: {}", msg),
            ModelError::Timeout(secs) => write!(f, "model call timed out after {}s", secs),
            ModelError::Api(msg) => write!(f, "model API error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// A generative model that turns a prompt into an answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-1.5-flash"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`. One attempt, no retries.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

// ============ Disabled Provider ============

/// A no-op model that always fails with [`ModelError::NotConfigured`].
///
/// Used when `model.provider = "disabled"` or the credential is missing,
/// so the service can keep answering with its fixed fallback message.
pub struct DisabledModel;

#[async_trait]
impl ChatModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::NotConfigured(
            "model provider is disabled".to_string(),
        ))
    }
}

// ============ Gemini Provider ============

/// Model provider backed by the Google Generative Language API.
///
/// Calls `POST /v1beta/models/{model}:generateContent`. Requires the
/// `GEMINI_API_KEY` environment variable.
pub struct GeminiModel {
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiModel {
    /// Create a Gemini provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotConfigured`] when `GEMINI_API_KEY` is not
    /// in the environment.
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            ModelError::NotConfigured("GEMINI_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self {
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(self.timeout_secs)
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ModelError::Auth(format!("{}: {}", status, body_text)));
        }
        if status.as_u16() == 429 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ModelError::RateLimited(format!(
                "{}: {}",
                status, body_text
            )));
        }
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{}: {}", status, body_text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ModelError::Api(e.to_string()))?;

        parse_completion(&json)
    }
}

/// Extract the answer text from a `generateContent` response.
///
/// Concatenates all parts of the first candidate's content.
fn parse_completion(json: &serde_json::Value) -> Result<String, ModelError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            ModelError::Api("invalid response: missing candidates[0].content.parts".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(ModelError::Api("empty completion".to_string()));
    }

    Ok(text.trim().to_string())
}

/// Create the [`ChatModel`] named by the configuration.
///
/// | Config value | Provider |
/// |--------------|----------|
/// | `"disabled"` | [`DisabledModel`] |
/// | `"gemini"`   | [`GeminiModel`] |
pub fn create_model(config: &ModelConfig) -> Result<Box<dyn ChatModel>, ModelError> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledModel)),
        "gemini" => Ok(Box::new(GeminiModel::new(config)?)),
        other => Err(ModelError::NotConfigured(format!(
            "unknown model provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_single_part() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  The answer.  " }] }
            }]
        });
        assert_eq!(parse_completion(&json).unwrap(), "The answer.");
    }

    #[test]
    fn test_parse_completion_joins_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Part one. " }, { "text": "Part two." }] }
            }]
        });
        assert_eq!(parse_completion(&json).unwrap(), "Part one. Part two.");
    }

    #[test]
    fn test_parse_completion_missing_candidates() {
        let json = serde_json::json!({ "promptFeedback": {} });
        assert!(matches!(
            parse_completion(&json).unwrap_err(),
            ModelError::Api(_)
        ));
    }

    #[test]
    fn test_parse_completion_empty_text() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        });
        assert!(matches!(
            parse_completion(&json).unwrap_err(),
            ModelError::Api(_)
        ));
    }

    #[tokio::test]
    async fn test_disabled_model_errors() {
        let model = DisabledModel;
        assert_eq!(model.model_name(), "disabled");
        assert!(matches!(
            model.complete("anything").await.unwrap_err(),
            ModelError::NotConfigured(_)
        ));
    }

    #[test]
    fn test_create_model_disabled() {
        let config = ModelConfig::default();
        let model = create_model(&config).unwrap();
        assert_eq!(model.model_name(), "disabled");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ModelError::Timeout(30).to_string(),
            "model call timed out after 30s"
        );
        assert!(ModelError::Auth("401".to_string())
            .to_string()
            .contains("authentication failed"));
    }
}
