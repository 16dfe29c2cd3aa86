//! Chat-completion client used to rewrite release notes.
//!
//! The prompt, temperature and output ceiling are fixed: the endpoint does
//! one job and its tone/structure contract must not drift per request.

use serde::{Deserialize, Serialize};

use crate::core::config::OpenAiConfig;
use crate::core::error::{AppError, Result};

const SYSTEM_PROMPT: &str = "You are a technical writer specializing in creating engaging release notes. Your task is to rewrite the provided release notes to be more engaging, user-friendly, and exciting while maintaining technical accuracy.

Guidelines:
- Keep the same structure and all technical details
- Make the language more engaging and enthusiastic
- Highlight the benefits to users
- Keep commit links and technical references intact
- Maintain professionalism while being friendly
- If there are breaking changes, make them very clear
- Preserve all markdown formatting and links";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct CompletionClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Fail fast before any quota is spent when the API key is missing.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.config.api_key.is_none() {
            return Err(AppError::Configuration(
                "OPENAI_API_KEY must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Rewrite sanitized markdown release notes. The caller never receives
    /// upstream error bodies; they go to the log stream only.
    pub async fn enhance(&self, markdown: &str) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY must be set".to_string())
        })?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: markdown,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::UpstreamTimeout(format!("Completion request timed out: {}", e))
                } else {
                    AppError::UpstreamService(format!("Completion request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::UpstreamRateLimited(
                "AI service rate limit exceeded. Try again later.".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion API error: HTTP {} - {}", status, body);
            return Err(AppError::UpstreamService(format!(
                "Completion API error: HTTP {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::UpstreamService(format!("Failed to parse completion response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AppError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(api_key: Option<&str>) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.map(|k| k.to_string()),
            base_url: "http://127.0.0.1:1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let client = CompletionClient::new(config(None));
        assert!(matches!(
            client.ensure_configured().unwrap_err(),
            AppError::Configuration(_)
        ));
    }

    #[test]
    fn configured_client_passes_the_check() {
        let client = CompletionClient::new(config(Some("sk-test")));
        assert!(client.ensure_configured().is_ok());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_upstream_error() {
        let client = CompletionClient::new(config(Some("sk-test")));
        let error = client.enhance("## Release Notes").await.unwrap_err();
        assert!(matches!(
            error,
            AppError::UpstreamService(_) | AppError::UpstreamTimeout(_)
        ));
    }

    #[test]
    fn empty_choices_parse_to_no_content() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());

        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
