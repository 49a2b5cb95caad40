//! Generate-content envelope adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ErrorContext, ProviderError};
use super::types::{Prompt, ProviderDescriptor};
use super::{extract_request_id, transport_error, EnvelopeAdapter, GatewayConfig};

/// Hard cap on generation for this envelope kind.
const MAX_OUTPUT_TOKENS: u32 = 4_096;

/// Adapter for providers speaking the generate-content envelope.
///
/// The prompt travels as a single-prompt content array (user part only; this
/// kind has no system slot); the credential travels as a `key` query
/// parameter.
#[derive(Debug, Clone)]
pub struct GenerateContentAdapter {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GenerateContentAdapter {
    pub(super) fn new(client: reqwest::Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct GenerateApiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateApiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
    code: Option<i64>,
}

// =============================================================================
// ADAPTER IMPL
// =============================================================================

#[async_trait]
impl EnvelopeAdapter for GenerateContentAdapter {
    async fn invoke(
        &self,
        provider: &ProviderDescriptor,
        prompt: &Prompt,
    ) -> Result<String, ProviderError> {
        let api_req = GenerateApiRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt.user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(&provider.endpoint)
            .query(&[("key", provider.api_key.as_str())])
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
            if let Ok(parsed) = serde_json::from_str::<GenerateApiResponse>(&body) {
                if let Some(error) = parsed.error {
                    if let Some(m) = error.message {
                        message = m;
                    }
                    if let Some(code) = error.code {
                        context = context.with_code(code.to_string());
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

        let parsed: GenerateApiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::envelope(&provider.name, format!("invalid JSON: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::envelope(
                &provider.name,
                format!("API error: {}", error.message.unwrap_or_default()),
            ));
        }

        parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                ProviderError::envelope(&provider.name, "no candidate text in response")
            })
    }
}
