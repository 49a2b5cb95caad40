//! Parsing of stage responses into typed results.
//!
//! Providers return free text that should contain one JSON object. Parsing
//! is strict: malformed JSON, missing required fields, and values outside
//! their enumerated sets fail the stage, never coerce.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::StageParseError;
use super::types::{CommercialTerm, JurisdictionInfo, RiskItem, Synthesis};
use super::Stage;

// =============================================================================
// Stage payloads
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JurisdictionJson {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    legal_system: Option<String>,
    #[serde(default)]
    regulations: Option<Vec<String>>,
}

pub(super) fn jurisdiction(raw: &str) -> Result<JurisdictionInfo, StageParseError> {
    let parsed: JurisdictionJson = from_stage_json(Stage::Jurisdiction, raw)?;
    let country = parsed
        .country
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| StageParseError::new(Stage::Jurisdiction, "missing 'country'"))?;
    Ok(JurisdictionInfo {
        country,
        legal_system: parsed.legal_system.unwrap_or_default(),
        regulations: parsed.regulations.unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
struct RisksJson {
    #[serde(default)]
    risks: Option<Vec<RiskItem>>,
}

pub(super) fn legal_risks(raw: &str) -> Result<Vec<RiskItem>, StageParseError> {
    let parsed: RisksJson = from_stage_json(Stage::LegalRisk, raw)?;
    parsed
        .risks
        .ok_or_else(|| StageParseError::new(Stage::LegalRisk, "missing 'risks'"))
}

#[derive(Debug, Deserialize)]
struct TermsJson {
    #[serde(default)]
    terms: Option<Vec<CommercialTerm>>,
}

pub(super) fn commercial_terms(raw: &str) -> Result<Vec<CommercialTerm>, StageParseError> {
    let parsed: TermsJson = from_stage_json(Stage::CommercialTerms, raw)?;
    parsed
        .terms
        .ok_or_else(|| StageParseError::new(Stage::CommercialTerms, "missing 'terms'"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisJson {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    compliance_score: Option<i64>,
    #[serde(default)]
    recommendations: Option<Vec<String>>,
}

pub(super) fn synthesis(raw: &str) -> Result<Synthesis, StageParseError> {
    let parsed: SynthesisJson = from_stage_json(Stage::Synthesis, raw)?;
    let summary = parsed
        .summary
        .ok_or_else(|| StageParseError::new(Stage::Synthesis, "missing 'summary'"))?;
    let score = parsed
        .compliance_score
        .ok_or_else(|| StageParseError::new(Stage::Synthesis, "missing 'complianceScore'"))?;
    if !(0..=100).contains(&score) {
        return Err(StageParseError::new(
            Stage::Synthesis,
            format!("complianceScore out of range [0,100]: {score}"),
        ));
    }
    let recommendations = parsed
        .recommendations
        .ok_or_else(|| StageParseError::new(Stage::Synthesis, "missing 'recommendations'"))?;
    Ok(Synthesis {
        summary,
        compliance_score: score as u8,
        recommendations,
    })
}

// =============================================================================
// JSON extraction
// =============================================================================

fn from_stage_json<T: DeserializeOwned>(stage: Stage, raw: &str) -> Result<T, StageParseError> {
    let json = extract_json(raw);
    serde_json::from_str(json).map_err(|e| StageParseError::new(stage, e.to_string()))
}

/// Extract JSON object from response (handles models that add surrounding
/// text or code fences).
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    // If it starts with {, assume it's already JSON
    if trimmed.starts_with('{') {
        // Find matching closing brace
        let mut depth = 0;
        let mut end_idx = 0;
        for (i, c) in trimmed.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end_idx = i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if end_idx > 0 {
            return &trimmed[..end_idx];
        }
    }

    // Try to find JSON anywhere in the response
    if let Some(start) = trimmed.find('{') {
        let remainder = &trimmed[start..];
        let mut depth = 0;
        for (i, c) in remainder.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return &remainder[..=i];
                    }
                }
                _ => {}
            }
        }
    }

    trimmed
}

// =============================================================================
// TESTS
// =============================================================================
