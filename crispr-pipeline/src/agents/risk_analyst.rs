//! Off-target risk scoring from sequence composition and cutting efficiency.

use crispr_pipeline_sdk::Notifier;

use crate::error::AgentError;
use crate::pipeline_utils::task::execute_step;
use crate::types::{Guide, OfftargetRisk};

pub const AGENT_NAME: &str = "RiskAnalyst";

/// Heuristic scoring outcome for one guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub level: OfftargetRisk,
    pub score: f64,
    pub predicted_offtargets: u32,
}

/// Classify a guide by GC percentage and efficiency
///
/// Thresholds are strict: GC of exactly 60 is medium, exactly 55 is low.
pub fn classify(gc_content: f64, efficiency: f64) -> RiskAssessment {
    if gc_content > 60.0 {
        RiskAssessment {
            level: OfftargetRisk::High,
            score: 0.85,
            predicted_offtargets: 3,
        }
    } else if gc_content > 55.0 || efficiency > 0.85 {
        RiskAssessment {
            level: OfftargetRisk::Medium,
            score: 0.45,
            predicted_offtargets: 1,
        }
    } else {
        RiskAssessment {
            level: OfftargetRisk::Low,
            score: 0.15,
            predicted_offtargets: 0,
        }
    }
}

/// Human-readable reasons behind a classification
pub fn risk_factors(guide: &Guide, level: OfftargetRisk) -> Vec<String> {
    let mut factors = Vec::new();
    if guide.gc_content > 60.0 {
        factors.push("High GC content".to_string());
    }
    if guide.efficiency > 0.85 {
        factors.push("High cutting efficiency".to_string());
    }
    if level == OfftargetRisk::High {
        factors.push("Multiple predicted off-targets".to_string());
    }
    if guide.sequence.to_ascii_uppercase().contains("GGGG") {
        factors.push("Poly-G tract".to_string());
    }
    factors
}

/// Copy of `guide` with its risk fields recomputed
pub fn assess(guide: &Guide) -> Guide {
    let assessment = classify(guide.gc_content, guide.efficiency);
    let mut analyzed = guide.clone();
    analyzed.offtarget_risk = assessment.level;
    analyzed.risk_score = Some(assessment.score);
    analyzed.predicted_offtargets = Some(assessment.predicted_offtargets);
    analyzed.risk_factors = Some(risk_factors(guide, assessment.level));
    analyzed
}

pub struct RiskAnalyst {
    notifier: Notifier,
}

impl RiskAnalyst {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    /// Re-score every guide
    ///
    /// Output has the same length and order as the input. An empty input is
    /// an error.
    pub async fn analyze_risk(&self, guides: &[Guide]) -> Result<Vec<Guide>, AgentError> {
        execute_step(
            &self.notifier,
            AGENT_NAME,
            "Scanning genome for potential off-target sites using mismatch tolerance algorithms...",
            || async {
                if guides.is_empty() {
                    return Err(AgentError::MissingData(
                        "No guides available for risk analysis".to_string(),
                    ));
                }
                let analyzed: Vec<Guide> = guides.iter().map(assess).collect();
                let summary = describe_flags(&analyzed);
                Ok((analyzed, summary))
            },
        )
        .await
    }
}

fn describe_flags(analyzed: &[Guide]) -> String {
    let flagged: Vec<String> = analyzed
        .iter()
        .filter(|g| g.offtarget_risk != OfftargetRisk::Low)
        .map(|g| format!("{} ({} risk)", g.id, g.offtarget_risk))
        .collect();

    if flagged.is_empty() {
        format!(
            "Risk analysis complete. All {} guides show low off-target risk.",
            analyzed.len()
        )
    } else {
        format!(
            "Risk analysis complete. Flagged {} of {} guides: {}.",
            flagged.len(),
            analyzed.len(),
            flagged.join(", ")
        )
    }
}
