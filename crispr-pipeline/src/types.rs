//! Domain types shared by the agents and the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Experiment plan extracted from the user's prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanObject {
    pub gene: String,
    pub region: String,
    pub edit_type: String,
    pub cell_line: String,
    pub nuclease: String,
    /// Always within [0, 1]
    pub confidence: f64,
    #[serde(
        default,
        alias = "scientificRationale",
        skip_serializing_if = "Option::is_none"
    )]
    pub rationale: Option<String>,
}

/// Heuristic classification of unintended cutting likelihood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfftargetRisk {
    Low,
    Medium,
    High,
}

impl OfftargetRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfftargetRisk::Low => "low",
            OfftargetRisk::Medium => "medium",
            OfftargetRisk::High => "high",
        }
    }
}

impl fmt::Display for OfftargetRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate guide RNA
///
/// The designer fills the sequence, coordinates and initial scores; the risk
/// analyst adds `risk_score`, `predicted_offtargets` and `risk_factors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: String,
    #[serde(alias = "seq")]
    pub sequence: String,
    pub start: u64,
    pub end: u64,
    pub efficiency: f64,
    pub offtarget_risk: OfftargetRisk,
    /// Percentage, 0-100
    pub gc_content: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pam_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_offtargets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<Vec<String>>,
}

impl Guide {
    /// Stand-in reported as the best guide when none were designed
    pub fn placeholder() -> Self {
        Self {
            id: "none".to_string(),
            sequence: "No guides generated".to_string(),
            start: 0,
            end: 0,
            efficiency: 0.0,
            offtarget_risk: OfftargetRisk::High,
            gc_content: 0.0,
            pam_site: None,
            strand: None,
            risk_score: None,
            predicted_offtargets: None,
            risk_factors: None,
        }
    }
}

/// Terminal artifact of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSummary {
    pub plan: PlanObject,
    pub total_guides: usize,
    pub recommended_guides: Vec<Guide>,
    pub high_risk_guides: Vec<Guide>,
    pub best_guide: Guide,
    pub protocol: String,
    pub risk_summary: String,
    pub next_steps: Vec<String>,
}
