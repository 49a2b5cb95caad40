//! Error types for the provider gateway.

use std::time::Duration;

use thiserror::Error;

/// Additional context from provider errors for debugging.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// HTTP status code from the provider.
    pub http_status: Option<u16>,
    /// Provider-specific error code (e.g. "rate_limit_exceeded").
    pub provider_code: Option<String>,
    /// Request ID from provider (x-request-id header).
    pub request_id: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// One provider call failed. Recovered by the failover controller, which
/// advances to the next provider in the registry.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request exceeded the fixed per-call timeout.
    #[error("{provider}: timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    /// Transport-level failure (connect, TLS, body read).
    #[error("{provider}: http error: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status from the provider.
    #[error("{provider}: HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
        context: ErrorContext,
    },

    /// Response arrived but its envelope was not the expected shape.
    #[error("{provider}: unexpected envelope: {message}")]
    Envelope { provider: String, message: String },

    /// Configuration error (missing credential, bad endpoint).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an envelope error.
    pub fn envelope(provider: &str, message: impl Into<String>) -> Self {
        Self::Envelope {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Name of the provider that failed, if the error is tied to one.
    pub fn provider_name(&self) -> Option<&str> {
        match self {
            Self::Timeout { provider, .. }
            | Self::Http { provider, .. }
            | Self::Status { provider, .. }
            | Self::Envelope { provider, .. } => Some(provider),
            Self::Config(_) => None,
        }
    }

    /// Get a short error code for usage records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http_error",
            Self::Status { .. } => "bad_status",
            Self::Envelope { .. } => "bad_envelope",
            Self::Config(_) => "config_error",
        }
    }

    /// Get the error context if available.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Status { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Every provider in the registry failed within a single failover call.
///
/// Terminal: the pipeline aborts the run when it sees this.
#[derive(Debug, Error)]
#[error("all providers exhausted after {attempts} attempts; last failure from {last_provider}: {source}")]
pub struct AllProvidersExhausted {
    /// Total invocation attempts made (one per registered provider).
    pub attempts: usize,
    /// Provider that produced the final failure.
    pub last_provider: String,
    #[source]
    pub source: ProviderError,
}
