#![forbid(unsafe_code)]

//! # tenderlens
//!
//! Staged LLM analysis of tender documents with automatic provider failover.
//!
//! A document's extracted text runs through five ordered stages —
//! jurisdiction detection, legal-risk extraction, commercial-term
//! extraction, synthesis, chart derivation — where each remote stage makes
//! one call through a failover controller that walks an ordered provider
//! registry. Stage responses are parsed strictly into typed results; a run
//! either produces a complete [`analysis::AnalysisResult`] or fails with one
//! error, never a partial report.

pub mod analysis;
pub mod charts;
pub mod document;
pub mod gateway;
pub mod prompts;

pub use analysis::{AnalysisError, AnalysisResult, StageParseError, TenderAnalyzer};
pub use document::{DocumentMetadata, ExtractedDocument, TextExtractor, UnsupportedFormatError};
pub use gateway::{
    AllProvidersExhausted, FailoverState, NoopUsageSink, ProviderDescriptor, ProviderError,
    ProviderGateway, ProviderKind, ProviderRegistry, StderrUsageSink,
};
