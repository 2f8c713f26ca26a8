//! Structured text-completion seam.
//!
//! Components depend only on [`CompletionService`]; whether a remote model
//! or [`DisabledCompletion`] sits behind it never changes their contract,
//! since every error collapses into the component's own fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use radar_core::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompletionError;

const TEMPERATURE: f32 = 0.2;

/// One request-response JSON completion.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send a system instruction plus user context and return the parsed
    /// JSON object the model answered with.
    async fn complete_json(&self, system: &str, user: &str) -> Result<Value, CompletionError>;
}

/// Used when no API key is configured. Every call fails with
/// [`CompletionError::Unconfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCompletion;

#[async_trait]
impl CompletionService for DisabledCompletion {
    async fn complete_json(&self, _system: &str, _user: &str) -> Result<Value, CompletionError> {
        Err(CompletionError::Unconfigured)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat-completions client in JSON-object response mode.
#[derive(Clone)]
pub struct OpenAiCompletion {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiCompletion {
    /// # Errors
    ///
    /// Returns [`CompletionError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete_json(&self, system: &str, user: &str) -> Result<Value, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::Empty)?;

        parse_json_object(&content)
    }
}

/// Parse completion content, accepting only a top-level JSON object.
///
/// # Errors
///
/// Returns [`CompletionError::Json`] for invalid JSON or a non-object value.
pub fn parse_json_object(content: &str) -> Result<Value, CompletionError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| CompletionError::Json(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(CompletionError::Json(format!(
            "expected an object, got {}",
            json_kind(&value)
        )))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pick the remote client when an API key is configured, otherwise the
/// disabled service.
///
/// # Errors
///
/// Returns [`CompletionError::Http`] if the remote client cannot be built.
pub fn completion_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn CompletionService>, CompletionError> {
    match &config.openai_api_key {
        Some(api_key) => {
            tracing::info!(model = %config.openai_model, "completion service enabled");
            Ok(Arc::new(OpenAiCompletion::new(
                api_key,
                &config.openai_model,
                &config.openai_base_url,
                config.completion_timeout_secs,
            )?))
        }
        None => {
            tracing::info!("OPENAI_API_KEY not set; using deterministic fallbacks");
            Ok(Arc::new(DisabledCompletion))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_object_accepts_objects() {
        let value = parse_json_object(r#"{"ideas": []}"#).expect("object should parse");
        assert!(value.get("ideas").is_some());
    }

    #[test]
    fn parse_json_object_rejects_arrays() {
        let err = parse_json_object("[1, 2]").unwrap_err();
        assert!(matches!(err, CompletionError::Json(ref msg) if msg.contains("an array")));
    }

    #[test]
    fn parse_json_object_rejects_invalid_json() {
        assert!(matches!(
            parse_json_object("not json"),
            Err(CompletionError::Json(_))
        ));
    }

    #[tokio::test]
    async fn disabled_completion_is_always_unconfigured() {
        let result = DisabledCompletion.complete_json("system", "user").await;
        assert!(matches!(result, Err(CompletionError::Unconfigured)));
    }
}
