//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI and any endpoint exposing a compatible
//! `/v1/chat/completions` surface. Non-streaming chat completions only;
//! the support flow is a single request/response per user message.

use async_trait::async_trait;
use homie_core::error::ProviderError;
use homie_core::message::{Message, Role};
use homie_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible completion provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Convert our Message types to the wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                },
                content: m.content.clone(),
            })
            .collect()
    }

    /// Map a non-200 status (plus its body) to a `ProviderError`.
    ///
    /// Quota exhaustion is the one retryable condition and is kept distinct
    /// from auth failures: OpenAI signals it with 429 or an
    /// `insufficient_quota` error code.
    fn triage_error(status: u16, body: &str) -> ProviderError {
        if status == 429 || body.contains("insufficient_quota") {
            return ProviderError::CapacityExhausted { retry_after_secs: 5 };
        }
        if status == 401 || status == 403 || body.contains("invalid_api_key") {
            return ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            );
        }
        ProviderError::ApiError {
            status_code: status,
            message: body.to_string(),
        }
    }

    fn map_transport_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl homie_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(Self::triage_error(status, &error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        Ok(response.status().is_success())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    model: String,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_constructor() {
        let provider = OpenAiCompatProvider::openai("sk-test");
        assert_eq!(provider.name(), "openai");
        assert!(provider.base_url.contains("api.openai.com"));
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:8000/v1/", "k");
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn message_conversion_keeps_channel_roles() {
        let messages = vec![
            Message::system("You are Homie."),
            Message::user("What does a repair cost?"),
        ];
        let api_messages = OpenAiCompatProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
    }

    #[test]
    fn quota_exhaustion_is_capacity_error() {
        let err = OpenAiCompatProvider::triage_error(429, "rate limited");
        assert!(matches!(err, ProviderError::CapacityExhausted { .. }));

        let err = OpenAiCompatProvider::triage_error(
            400,
            r#"{"error":{"code":"insufficient_quota"}}"#,
        );
        assert!(matches!(err, ProviderError::CapacityExhausted { .. }));
    }

    #[test]
    fn bad_credentials_are_auth_errors() {
        let err = OpenAiCompatProvider::triage_error(401, "unauthorized");
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));

        let err =
            OpenAiCompatProvider::triage_error(400, r#"{"error":{"code":"invalid_api_key"}}"#);
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[test]
    fn other_statuses_are_api_errors() {
        let err = OpenAiCompatProvider::triage_error(500, "server error");
        assert!(matches!(
            err,
            ProviderError::ApiError { status_code: 500, .. }
        ));
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Here is an estimate."}}],
            "model": "gpt-4",
            "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "gpt-4");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Here is an estimate.")
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 160);
    }
}
