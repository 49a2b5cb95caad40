//! Core types for the provider gateway.

use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use super::error::ProviderError;

// =============================================================================
// ATTRIBUTION
// =============================================================================

/// Attribution for usage tracking and debugging.
///
/// Every request through the gateway carries attribution so we know:
/// - Which analysis run it belongs to (job_id)
/// - Which code path triggered it (caller)
#[derive(Debug, Clone, Copy, Default)]
pub struct Attribution {
    /// Analysis run this request is part of.
    pub job_id: Option<Uuid>,
    /// Which code path made this call, for debugging.
    /// Use a static string like "analysis::jurisdiction".
    pub caller: &'static str,
}

impl Attribution {
    pub fn new(caller: &'static str) -> Self {
        Self {
            caller,
            ..Default::default()
        }
    }

    pub fn with_job(mut self, job_id: Uuid) -> Self {
        self.job_id = Some(job_id);
        self
    }
}

// =============================================================================
// PROVIDERS
// =============================================================================

/// Request/response envelope family a provider speaks.
///
/// Each kind has its own adapter; the failover controller never inspects
/// envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Chat-completions envelope: system+user message array, bearer credential.
    ChatCompletions,
    /// Generate-content envelope: single-prompt content array, credential as
    /// a query parameter.
    GenerateContent,
}

impl ProviderKind {
    /// Endpoint label for usage records.
    pub fn endpoint_label(&self) -> &'static str {
        match self {
            ProviderKind::ChatCompletions => "chat/completions",
            ProviderKind::GenerateContent => "generateContent",
        }
    }
}

/// Immutable description of one analysis provider.
///
/// Constructed once at startup; the failover cursor indexes into the
/// registry's ordered list of these.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub kind: ProviderKind,
}

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-flash:generateContent";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Ordered, non-empty list of providers to try.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self, ProviderError> {
        if providers.is_empty() {
            return Err(ProviderError::config("provider registry is empty"));
        }
        Ok(Self { providers })
    }

    /// Build the registry from environment variables.
    ///
    /// A provider joins the registry when its key is set: `OPENAI_API_KEY`
    /// (chat-completions kind) and/or `GEMINI_API_KEY` (generate-content
    /// kind), in that order. `OPENAI_ENDPOINT` / `OPENAI_MODEL` /
    /// `GEMINI_ENDPOINT` / `GEMINI_MODEL` override the defaults.
    pub fn from_env() -> Result<Self, ProviderError> {
        let mut providers = Vec::new();

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            providers.push(ProviderDescriptor {
                name: "OpenAI".to_string(),
                endpoint: std::env::var("OPENAI_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_ENDPOINT.to_string()),
                model: std::env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
                api_key,
                kind: ProviderKind::ChatCompletions,
            });
        }

        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            providers.push(ProviderDescriptor {
                name: "Gemini".to_string(),
                endpoint: std::env::var("GEMINI_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_ENDPOINT.to_string()),
                model: std::env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
                api_key,
                kind: ProviderKind::GenerateContent,
            });
        }

        if providers.is_empty() {
            return Err(ProviderError::config(
                "no provider credentials configured (set OPENAI_API_KEY and/or GEMINI_API_KEY)",
            ));
        }

        Self::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider at `index`, wrapping at the registry length.
    pub fn get(&self, index: usize) -> &ProviderDescriptor {
        &self.providers[index % self.providers.len()]
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }
}

// =============================================================================
// FAILOVER STATE
// =============================================================================

/// The failover cursor: which provider the next call starts from.
///
/// Owned by the caller and scoped explicitly. One state per analysis run
/// keeps concurrent runs independent; sharing one state across runs
/// reproduces the sticky process-wide selection of single-user deployments
/// (interleaved advances from concurrent sharers are accepted). The cursor
/// advances only on invocation failure and is never reset mid-run.
#[derive(Debug, Default)]
pub struct FailoverState {
    cursor: AtomicUsize,
}

impl FailoverState {
    /// Start from the first provider in the registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a specific provider index.
    pub fn starting_at(index: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(index),
        }
    }

    /// Current provider index.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Advance to the next provider in order, wrapping at `len`.
    pub(crate) fn advance(&self, len: usize) -> usize {
        let next = (self.cursor.load(Ordering::SeqCst) + 1) % len;
        self.cursor.store(next, Ordering::SeqCst);
        next
    }
}

// =============================================================================
// PROMPT
// =============================================================================

/// A rendered prompt, ready for any provider kind.
///
/// Chat-completions providers receive both parts as a message array; the
/// generate-content kind receives only the user part.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> ProviderDescriptor {
        ProviderDescriptor {
            name: name.to_string(),
            endpoint: "http://localhost/api".to_string(),
            model: "test-model".to_string(),
            api_key: "key".to_string(),
            kind: ProviderKind::ChatCompletions,
        }
    }

    #[test]
    fn registry_rejects_empty_list() {
        let err = ProviderRegistry::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn registry_get_wraps() {
        let registry =
            ProviderRegistry::new(vec![descriptor("a"), descriptor("b")]).unwrap();
        assert_eq!(registry.get(0).name, "a");
        assert_eq!(registry.get(3).name, "b");
    }

    #[test]
    fn failover_state_advances_and_wraps() {
        let state = FailoverState::new();
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.advance(3), 1);
        assert_eq!(state.advance(3), 2);
        assert_eq!(state.advance(3), 0);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn failover_state_starting_at() {
        let state = FailoverState::starting_at(2);
        assert_eq!(state.cursor(), 2);
    }
}
