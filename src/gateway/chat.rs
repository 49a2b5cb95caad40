//! Chat-completions envelope adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ErrorContext, ProviderError};
use super::types::{Prompt, ProviderDescriptor};
use super::{extract_request_id, transport_error, EnvelopeAdapter, GatewayConfig};

/// Adapter for providers speaking the chat-completions envelope.
///
/// The prompt becomes a system+user message array; the credential travels as
/// a bearer header.
#[derive(Debug, Clone)]
pub struct ChatCompletionsAdapter {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl ChatCompletionsAdapter {
    pub(super) fn new(client: reqwest::Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
    code: Option<String>,
}

// =============================================================================
// ADAPTER IMPL
// =============================================================================

#[async_trait]
impl EnvelopeAdapter for ChatCompletionsAdapter {
    async fn invoke(
        &self,
        provider: &ProviderDescriptor,
        prompt: &Prompt,
    ) -> Result<String, ProviderError> {
        let api_req = ChatApiRequest {
            model: &provider.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ApiMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&provider.endpoint)
            .bearer_auth(&provider.api_key)
            .json(&api_req)
            .send()
            .await
            .map_err(|e| transport_error(provider, e, self.config.request_timeout))?;

        let status = response.status();
        let request_id = extract_request_id(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(provider, e, self.config.request_timeout))?;

        if !status.is_success() {
            let mut context = ErrorContext::new().with_status(status.as_u16());
            if let Some(id) = request_id {
                context = context.with_request_id(id);
            }

            let mut message = format!("HTTP {}", status.as_u16());
            if let Ok(parsed) = serde_json::from_str::<ChatApiResponse>(&body) {
                if let Some(error) = parsed.error {
                    if let Some(m) = error.message {
                        message = m;
                    }
                    if let Some(code) = error.code {
                        context = context.with_code(code);
                    }
                }
            }

            return Err(ProviderError::Status {
                provider: provider.name.clone(),
                status: status.as_u16(),
                message,
                context,
            });
        }

        let parsed: ChatApiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::envelope(&provider.name, format!("invalid JSON: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::envelope(
                &provider.name,
                format!("API error: {}", error.message.unwrap_or_default()),
            ));
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::envelope(&provider.name, "no message content in response"))
    }
}
