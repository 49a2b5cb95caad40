//! The staged analysis pipeline.
//!
//! Five ordered stages: jurisdiction detection, legal-risk extraction,
//! commercial-term extraction, synthesis, chart derivation. Stages 1-4 each
//! make exactly one provider call through the failover controller and parse
//! the response into a typed result; stage 5 is local. Any stage failure
//! aborts the whole run — the caller never sees a partial report.

pub mod error;
mod parse;
pub mod types;

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::charts;
use crate::document::DocumentMetadata;
use crate::gateway::{Attribution, FailoverState, ProviderGateway, UsageSink};
use crate::prompts;

pub use error::{AnalysisError, StageParseError};
pub use types::{
    AnalysisResult, CommercialTerm, JurisdictionInfo, RiskItem, Severity, Synthesis, TermFlag,
};

/// Characters of document text shown to the jurisdiction stage.
pub const JURISDICTION_EXCERPT_CHARS: usize = 2_000;

/// The five pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Jurisdiction,
    LegalRisk,
    CommercialTerms,
    Synthesis,
    Charts,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Jurisdiction => "jurisdiction",
            Stage::LegalRisk => "legal-risk",
            Stage::CommercialTerms => "commercial-terms",
            Stage::Synthesis => "synthesis",
            Stage::Charts => "charts",
        }
    }

    /// Cumulative progress reported when this stage begins.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Stage::Jurisdiction => 20,
            Stage::LegalRisk => 40,
            Stage::CommercialTerms => 60,
            Stage::Synthesis => 80,
            Stage::Charts => 100,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback, invoked synchronously at each stage boundary with the
/// cumulative percentage.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u8) + Send);

fn report(on_progress: &mut Option<ProgressFn<'_>>, stage: Stage) {
    if let Some(cb) = on_progress.as_mut() {
        cb(stage.progress_percent());
    }
}

/// The analysis orchestrator.
///
/// Owns a gateway; each run owns its context and, by default, its failover
/// cursor.
pub struct TenderAnalyzer<U: UsageSink> {
    gateway: ProviderGateway<U>,
}

impl<U: UsageSink> TenderAnalyzer<U> {
    pub fn new(gateway: ProviderGateway<U>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ProviderGateway<U> {
        &self.gateway
    }

    /// Run the full pipeline with a failover cursor scoped to this run.
    ///
    /// Independent runs never affect each other's provider selection. Use
    /// [`TenderAnalyzer::analyze_with_state`] to share a cursor across runs.
    pub async fn analyze(
        &self,
        document_text: &str,
        metadata: &DocumentMetadata,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let state = FailoverState::new();
        self.analyze_with_state(&state, document_text, metadata, on_progress)
            .await
    }

    /// Run the full pipeline against a caller-owned failover cursor.
    ///
    /// Within the run the cursor is sticky: after a failover in one stage,
    /// the next stage starts from the provider that answered, not from the
    /// front of the registry. Sharing one state across runs extends that
    /// stickiness to a session.
    pub async fn analyze_with_state(
        &self,
        state: &FailoverState,
        document_text: &str,
        metadata: &DocumentMetadata,
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let run_id = Uuid::new_v4();
        debug!(run_id = %run_id, file = %metadata.file_name, "starting analysis run");

        report(&mut on_progress, Stage::Jurisdiction);
        let excerpt: String = document_text
            .chars()
            .take(JURISDICTION_EXCERPT_CHARS)
            .collect();
        let raw = self
            .gateway
            .invoke_with_failover(
                state,
                &prompts::jurisdiction(&excerpt),
                Attribution::new("analysis::jurisdiction").with_job(run_id),
            )
            .await?;
        let jurisdiction = parse::jurisdiction(&raw)?;
        debug!(country = %jurisdiction.country, "jurisdiction detected");

        report(&mut on_progress, Stage::LegalRisk);
        let raw = self
            .gateway
            .invoke_with_failover(
                state,
                &prompts::legal_risks(document_text, &jurisdiction.country),
                Attribution::new("analysis::legal_risk").with_job(run_id),
            )
            .await?;
        let legal_risks = parse::legal_risks(&raw)?;
        debug!(risks = legal_risks.len(), "legal risks extracted");

        report(&mut on_progress, Stage::CommercialTerms);
        let raw = self
            .gateway
            .invoke_with_failover(
                state,
                &prompts::commercial_terms(document_text),
                Attribution::new("analysis::commercial_terms").with_job(run_id),
            )
            .await?;
        let commercial_terms = parse::commercial_terms(&raw)?;
        debug!(terms = commercial_terms.len(), "commercial terms extracted");

        report(&mut on_progress, Stage::Synthesis);
        let raw = self
            .gateway
            .invoke_with_failover(
                state,
                &prompts::synthesis(
                    &jurisdiction.country,
                    legal_risks.len(),
                    commercial_terms.len(),
                ),
                Attribution::new("analysis::synthesis").with_job(run_id),
            )
            .await?;
        let synthesis = parse::synthesis(&raw)?;

        report(&mut on_progress, Stage::Charts);
        let charts = charts::derive_charts(&legal_risks, &commercial_terms);

        Ok(AnalysisResult {
            summary: synthesis.summary,
            legal_risks,
            commercial_terms,
            recommendations: synthesis.recommendations,
            compliance_score: synthesis.compliance_score,
            detected_country: jurisdiction.country,
            charts,
        })
    }
}
