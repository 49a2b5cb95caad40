//! Provider gateway: ordered registry, envelope adapters, failover controller.
//!
//! One prompt goes in, raw response text comes out. The gateway selects the
//! provider the failover cursor points at, speaks that provider's envelope
//! through its adapter, and on failure advances the cursor to the next
//! provider in the registry until one answers or all are exhausted.

pub mod chat;
pub mod error;
pub mod generate;
pub mod types;
pub mod usage;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use chat::ChatCompletionsAdapter;
use generate::GenerateContentAdapter;
use usage::ProviderCallRecord;

pub use error::{AllProvidersExhausted, ErrorContext, ProviderError};
pub use types::*;
pub use usage::{CallStatus, NoopUsageSink, StderrUsageSink, UsageSink};

/// Fixed per-call request timeout. A call that exceeds this fails and
/// triggers failover; it is never left pending.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature for every analysis prompt.
pub const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub request_timeout: Duration,
    pub temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
            temperature: TEMPERATURE,
        }
    }
}

/// One envelope adapter per provider kind.
///
/// Adding a provider kind means adding an adapter; the failover controller
/// stays untouched.
#[async_trait::async_trait]
pub trait EnvelopeAdapter: Send + Sync {
    async fn invoke(
        &self,
        provider: &ProviderDescriptor,
        prompt: &Prompt,
    ) -> Result<String, ProviderError>;
}

pub struct ProviderGateway<U: UsageSink> {
    registry: ProviderRegistry,
    chat: ChatCompletionsAdapter,
    generate: GenerateContentAdapter,
    usage_sink: Arc<U>,
}

impl<U: UsageSink> ProviderGateway<U> {
    pub fn new(registry: ProviderRegistry, usage_sink: Arc<U>) -> Result<Self, ProviderError> {
        Self::with_config(registry, usage_sink, GatewayConfig::default())
    }

    pub fn with_config(
        registry: ProviderRegistry,
        usage_sink: Arc<U>,
        config: GatewayConfig,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            chat: ChatCompletionsAdapter::new(client.clone(), config.clone()),
            generate: GenerateContentAdapter::new(client, config),
            registry,
            usage_sink,
        })
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn adapter_for(&self, kind: ProviderKind) -> &dyn EnvelopeAdapter {
        match kind {
            ProviderKind::ChatCompletions => &self.chat,
            ProviderKind::GenerateContent => &self.generate,
        }
    }

    /// Send one prompt to one provider and return the raw response text.
    pub async fn invoke(
        &self,
        provider: &ProviderDescriptor,
        prompt: &Prompt,
        attribution: Attribution,
    ) -> Result<String, ProviderError> {
        let start = Instant::now();
        let result = self.adapter_for(provider.kind).invoke(provider, prompt).await;
        let latency_ms = start.elapsed().as_millis() as i32;

        let record = ProviderCallRecord::new(
            &provider.name,
            provider.kind.endpoint_label(),
            &provider.model,
            attribution.caller,
        )
        .job(attribution.job_id)
        .latency(latency_ms);

        let record = match &result {
            Ok(_) => record,
            Err(err) => record.error(err.code()),
        };
        self.usage_sink.record(record).await;

        result
    }

    /// Send one prompt, failing over across the registry in order.
    ///
    /// Starts from the cursor in `state`; each failure advances the cursor
    /// to the next provider, wrapping at the registry end. Every provider is
    /// tried at most once per call. The cursor keeps its final position
    /// after the call returns, so later calls resume from the last provider
    /// that answered.
    pub async fn invoke_with_failover(
        &self,
        state: &FailoverState,
        prompt: &Prompt,
        attribution: Attribution,
    ) -> Result<String, AllProvidersExhausted> {
        let count = self.registry.len();
        let mut last: Option<(String, ProviderError)> = None;

        for attempt in 0..count {
            let provider = self.registry.get(state.cursor());
            match self.invoke(provider, prompt, attribution).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!(provider = %provider.name, error = %err, "provider call failed");
                    if attempt + 1 < count {
                        let next = state.advance(count);
                        warn!(provider = %self.registry.get(next).name, "switching provider");
                    }
                    last = Some((provider.name.clone(), err));
                }
            }
        }

        let (last_provider, source) = last.unwrap_or_else(|| {
            (
                "unknown".to_string(),
                ProviderError::config("empty provider registry"),
            )
        });
        Err(AllProvidersExhausted {
            attempts: count,
            last_provider,
            source,
        })
    }
}

/// Map a transport failure, distinguishing the fixed-timeout case.
fn transport_error(
    provider: &ProviderDescriptor,
    err: reqwest::Error,
    timeout: Duration,
) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider: provider.name.clone(),
            after: timeout,
        }
    } else {
        ProviderError::Http {
            provider: provider.name.clone(),
            source: err,
        }
    }
}

/// Extract request ID from response headers.
fn extract_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
