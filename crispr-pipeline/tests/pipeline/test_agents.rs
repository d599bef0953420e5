//! Tests for agent behavior through the public API

use crispr_pipeline::agents::designer::design_for_gene;
use crispr_pipeline::agents::planner::keyword_plan;
use crispr_pipeline::agents::risk_analyst::{assess, classify};
use crispr_pipeline::agents::summarizer::build_summary;
use crispr_pipeline::agents::{GuideDesigner, RiskAnalyst};
use crispr_pipeline::types::{Guide, OfftargetRisk};
use crispr_pipeline::AgentError;
use crispr_pipeline_sdk::{AgentStatus, CollectingObserver, Notifier};
use std::sync::Arc;

fn guide(id: &str, gc_content: f64, efficiency: f64) -> Guide {
    Guide {
        id: id.to_string(),
        sequence: "ACGTACGTACGTACGTACGT".to_string(),
        start: 100,
        end: 120,
        efficiency,
        offtarget_risk: OfftargetRisk::Low,
        gc_content,
        pam_site: Some("AGG".to_string()),
        strand: Some("+".to_string()),
        risk_score: None,
        predicted_offtargets: None,
        risk_factors: None,
    }
}

// ============================================================================
// Risk Analysis
// ============================================================================

#[test]
fn test_gc_thresholds() {
    let cases = [
        (55.0, OfftargetRisk::Low),
        (56.0, OfftargetRisk::Medium),
        (60.0, OfftargetRisk::Medium),
        (61.0, OfftargetRisk::High),
    ];
    for (gc, expected) in cases {
        assert_eq!(classify(gc, 0.5).level, expected, "gc {}", gc);
    }
}

#[test]
fn test_high_efficiency_alone_is_medium() {
    let analyzed = assess(&guide("g", 40.0, 0.9));
    assert_eq!(analyzed.offtarget_risk, OfftargetRisk::Medium);
    assert_eq!(analyzed.risk_factors.unwrap(), vec!["High cutting efficiency"]);
}

#[tokio::test]
async fn test_risk_analyst_rescoring_overrides_designer_estimate() {
    let analyst = RiskAnalyst::new(Notifier::silent());
    let mut input = guide("g", 70.0, 0.5);
    input.offtarget_risk = OfftargetRisk::Low;

    let analyzed = analyst.analyze_risk(&[input]).await.unwrap();
    assert_eq!(analyzed[0].offtarget_risk, OfftargetRisk::High);
    assert_eq!(analyzed[0].predicted_offtargets, Some(3));
}

#[tokio::test]
async fn test_risk_analyst_empty_input_fails() {
    let analyst = RiskAnalyst::new(Notifier::silent());
    assert!(matches!(
        analyst.analyze_risk(&[]).await,
        Err(AgentError::MissingData(_))
    ));
}

// ============================================================================
// Guide Design
// ============================================================================

#[tokio::test]
async fn test_designer_unknown_gene_notifies_failure() {
    let observer = Arc::new(CollectingObserver::new());
    let designer = GuideDesigner::new(Notifier::new(observer.clone()));
    let mut plan = keyword_plan("knock out tp53");
    plan.gene = "KRAS".to_string();

    let err = designer.design_guides(&plan).await.unwrap_err();
    assert!(matches!(err, AgentError::UnknownGene(ref g) if g == "KRAS"));

    let messages = observer.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].status, AgentStatus::Thinking);
    assert!(messages[1].message.contains("Gene KRAS not found in reference"));
}

#[test]
fn test_every_known_gene_yields_five_guides() {
    for gene in ["TP53", "BRCA1", "CFTR", "HEXA"] {
        let guides = design_for_gene(gene).unwrap();
        assert_eq!(guides.len(), 5, "{}", gene);
        assert!(guides.iter().all(|g| g.start < g.end));
    }
}

// ============================================================================
// Summary
// ============================================================================

#[test]
fn test_summary_prefers_low_risk_tier() {
    let guides: Vec<Guide> = vec![
        guide("high", 70.0, 0.95),
        guide("low_a", 45.0, 0.6),
        guide("low_b", 50.0, 0.8),
    ]
    .iter()
    .map(assess)
    .collect();

    let summary = build_summary(&keyword_plan("tp53"), &guides);
    assert_eq!(summary.recommended_guides.len(), 2);
    assert_eq!(summary.best_guide.id, "low_b");
    assert_eq!(summary.high_risk_guides[0].id, "high");
}

#[test]
fn test_summary_all_high_risk_still_recommends() {
    let guides: Vec<Guide> = vec![guide("a", 70.0, 0.7), guide("b", 65.0, 0.9)]
        .iter()
        .map(assess)
        .collect();

    let summary = build_summary(&keyword_plan("tp53"), &guides);
    assert_eq!(summary.recommended_guides.len(), 2);
    assert_eq!(summary.best_guide.id, "b");
}
