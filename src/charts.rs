//! Chart derivation over analysis results.
//!
//! Pure aggregation: the same risks and terms always produce identical
//! series, and empty input yields zero-valued series rather than an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::types::{CommercialTerm, RiskItem, Severity};

/// Radar indicators: fixed presentation axes, each out of 100.
pub const RADAR_INDICATORS: [&str; 5] = [
    "Legal compliance",
    "Commercial terms",
    "Risk control",
    "Execution feasibility",
    "Cost reasonableness",
];

pub const RADAR_AXIS_MAX: u32 = 100;

/// Placeholder radar values. Not derived from the analysis: the synthesis
/// stage does not supply per-axis sub-scores.
// TODO: extend the synthesis prompt to return per-axis sub-scores and drop these.
pub const RADAR_PLACEHOLDER_VALUES: [u32; 5] = [85, 90, 75, 88, 92];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Radar,
}

/// One named count in a pie or bar series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarIndicator {
    pub name: String,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarSeries {
    pub indicators: Vec<RadarIndicator>,
    pub values: Vec<u32>,
}

/// Series payload, shaped per chart kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartSeries {
    Counts(Vec<NamedValue>),
    Radar(RadarSeries),
}

/// One presentation-ready chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDatum {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    #[serde(rename = "data")]
    pub series: ChartSeries,
}

/// Derive the three report charts from extracted risks and terms.
///
/// Terms are accepted for the radar axes, which currently carry the fixed
/// placeholder values above.
pub fn derive_charts(risks: &[RiskItem], _terms: &[CommercialTerm]) -> Vec<ChartDatum> {
    vec![severity_pie(risks), category_bar(risks), compliance_radar()]
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "High risk",
        Severity::Medium => "Medium risk",
        Severity::Low => "Low risk",
    }
}

/// Risk counts by severity, zero-filled so all three slices always appear.
fn severity_pie(risks: &[RiskItem]) -> ChartDatum {
    let series = Severity::ALL
        .iter()
        .map(|&severity| NamedValue {
            name: severity_label(severity).to_string(),
            value: risks.iter().filter(|r| r.severity == severity).count() as u64,
        })
        .collect();
    ChartDatum {
        kind: ChartKind::Pie,
        title: "Risk severity distribution".to_string(),
        series: ChartSeries::Counts(series),
    }
}

/// One bar per distinct risk category.
fn category_bar(risks: &[RiskItem]) -> ChartDatum {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for risk in risks {
        *counts.entry(risk.category.as_str()).or_insert(0) += 1;
    }
    let series = counts
        .into_iter()
        .map(|(name, value)| NamedValue {
            name: name.to_string(),
            value,
        })
        .collect();
    ChartDatum {
        kind: ChartKind::Bar,
        title: "Risk category breakdown".to_string(),
        series: ChartSeries::Counts(series),
    }
}

fn compliance_radar() -> ChartDatum {
    ChartDatum {
        kind: ChartKind::Radar,
        title: "Compliance assessment".to_string(),
        series: ChartSeries::Radar(RadarSeries {
            indicators: RADAR_INDICATORS
                .iter()
                .map(|name| RadarIndicator {
                    name: name.to_string(),
                    max: RADAR_AXIS_MAX,
                })
                .collect(),
            values: RADAR_PLACEHOLDER_VALUES.to_vec(),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
