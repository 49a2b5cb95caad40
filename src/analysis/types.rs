//! Typed results for each analysis stage and the terminal report.

use serde::{Deserialize, Serialize};

use crate::charts::ChartDatum;

/// Risk severity. Any other wire value is a parse error, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// One legal risk extracted in the legal-risk stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    pub category: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
}

/// Advisory flag on a commercial term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermFlag {
    Warning,
    Info,
}

/// One commercial term extracted in the commercial-terms stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialTerm {
    pub term: String,
    pub value: String,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<TermFlag>,
}

/// Jurisdiction stage output: where the tender is from and what law applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionInfo {
    pub country: String,
    pub legal_system: String,
    #[serde(default)]
    pub regulations: Vec<String>,
}

/// Synthesis stage output: executive view over the earlier stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub summary: String,
    /// Overall compliance score, validated to 0-100 at parse time.
    pub compliance_score: u8,
    pub recommendations: Vec<String>,
}

/// Terminal artifact of one analysis run. Immutable once produced; either
/// fully populated or never returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub legal_risks: Vec<RiskItem>,
    pub commercial_terms: Vec<CommercialTerm>,
    pub recommendations: Vec<String>,
    pub compliance_score: u8,
    pub detected_country: String,
    pub charts: Vec<ChartDatum>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trips_lowercase() {
        for severity in Severity::ALL {
            let json = serde_json::to_string(&severity).unwrap();
            assert_eq!(json, format!("\"{}\"", severity.as_str()));
        }
    }

    #[test]
    fn severity_rejects_unknown_literal() {
        let err = serde_json::from_str::<Severity>("\"critical\"").unwrap_err();
        assert!(err.to_string().contains("critical"));
    }

    #[test]
    fn term_flag_defaults_to_none() {
        let term: CommercialTerm = serde_json::from_str(
            r#"{"term": "Warranty", "value": "24 months", "analysis": "standard"}"#,
        )
        .unwrap();
        assert_eq!(term.flag, None);

        let term: CommercialTerm = serde_json::from_str(
            r#"{"term": "Warranty", "value": "24 months", "analysis": "standard", "flag": null}"#,
        )
        .unwrap();
        assert_eq!(term.flag, None);
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = AnalysisResult {
            summary: "ok".into(),
            legal_risks: Vec::new(),
            commercial_terms: Vec::new(),
            recommendations: Vec::new(),
            compliance_score: 70,
            detected_country: "Spain".into(),
            charts: Vec::new(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"legalRisks\""));
        assert!(json.contains("\"complianceScore\":70"));
        assert!(json.contains("\"detectedCountry\":\"Spain\""));
    }
}
