//! End-to-end runs through `Orchestrator::process_prompt`

use super::common::*;
use crispr_pipeline::completion::OfflineCompletion;
use crispr_pipeline::config::ExecutorConfig;
use crispr_pipeline::orchestrator::{GraphSource, StopReason, TaskStatus, ORCHESTRATOR};
use crispr_pipeline::types::OfftargetRisk;
use crispr_pipeline::PipelineError;
use crispr_pipeline_sdk::{AgentStatus, ChannelObserver};
use std::sync::Arc;

#[tokio::test]
async fn test_tp53_offline_run() {
    let (orchestrator, observer) =
        orchestrator(Arc::new(OfflineCompletion), ExecutorConfig::default());

    let outcome = orchestrator.process_prompt(TP53_PROMPT).await.unwrap();

    assert_eq!(outcome.plan.gene, "TP53");
    assert_eq!(outcome.plan.region, "Exon 4");
    assert_eq!(outcome.guides.len(), 5);
    assert!(outcome.guides.iter().all(|g| g.risk_score.is_some()));

    let summary = &outcome.summary;
    assert_eq!(summary.best_guide.id, "tp53_g1");
    assert!(summary
        .recommended_guides
        .iter()
        .all(|g| g.offtarget_risk == OfftargetRisk::Low));
    assert_eq!(summary.high_risk_guides.len(), 1);

    assert_eq!(outcome.stats.stop_reason, StopReason::EssentialsComplete);
    assert!(matches!(outcome.stats.graph, GraphSource::Default { .. }));

    let messages = observer.messages();
    assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(messages[0].agent, ORCHESTRATOR);
    assert_eq!(messages[0].status, AgentStatus::Thinking);
}

#[tokio::test]
async fn test_generated_graph_run() {
    let llm = Arc::new(
        ScriptedCompletion::new()
            .with_graph(
                r#"{"tasks": [
                    {"id": 1, "type": "parse_prompt", "assignee": "PlannerAgent", "priority": 5, "dependencies": []},
                    {"id": 2, "type": "design_guides", "assignee": "GuideDesigner", "priority": 4, "dependencies": [1]},
                    {"id": 3, "type": "risk_assessment", "assignee": "RiskAnalyst", "priority": 4, "dependencies": [2]},
                    {"id": 4, "type": "generate_summary", "assignee": "UndergradAgent", "priority": 3, "dependencies": [3]},
                    {"id": 5, "type": "collaboration_decision", "assignee": "RiskAnalyst", "priority": 1, "dependencies": [2]}
                ]}"#,
            )
            .with_plan(
                r#"{"gene": "CFTR", "region": "F508del", "editType": "Prime Editing",
                    "cellLine": "HEK293", "nuclease": "PE2", "confidence": 0.92,
                    "scientificRationale": "F508del is the most common CFTR mutation."}"#,
            ),
    );
    let (orchestrator, _) = orchestrator(llm.clone(), ExecutorConfig::default());

    let outcome = orchestrator
        .process_prompt("Correct CFTR F508del with prime editing")
        .await
        .unwrap();

    assert_eq!(outcome.stats.graph, GraphSource::Generated);
    assert_eq!(outcome.plan.gene, "CFTR");
    assert_eq!(outcome.plan.confidence, 0.92);
    assert_eq!(outcome.guides.len(), 5);
    assert_eq!(outcome.guides[0].id, "g1");
    assert_eq!(outcome.summary.plan.nuclease, "PE2");

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].json_mode);
    assert_eq!(requests[0].max_tokens, 500);
    assert!(!requests[1].json_mode);
    assert_eq!(requests[1].max_tokens, 300);
}

#[tokio::test]
async fn test_unknown_gene_degrades_gracefully() {
    let llm = Arc::new(ScriptedCompletion::new().with_plan(KRAS_PLAN));
    let (orchestrator, observer) = orchestrator(llm, ExecutorConfig::default());

    let outcome = orchestrator.process_prompt("Knock out KRAS in A549").await.unwrap();

    assert_eq!(outcome.plan.gene, "KRAS");
    assert!(outcome.guides.is_empty());
    assert_eq!(outcome.summary.best_guide.id, "none");
    assert_eq!(outcome.stats.stop_reason, StopReason::Stalled);

    let design = outcome
        .stats
        .tasks
        .iter()
        .find(|t| t.id == "design_guides")
        .unwrap();
    assert_eq!(design.status, TaskStatus::Failed);
    assert_eq!(
        design.error.as_deref(),
        Some("Gene KRAS not found in reference")
    );
    assert!(observer
        .messages()
        .iter()
        .any(|m| m.message == "Failed design_guides: Gene KRAS not found in reference"));
}

#[tokio::test]
async fn test_empty_graph_uses_default() {
    let llm = Arc::new(ScriptedCompletion::new().with_graph(r#"{"tasks": []}"#));
    let (orchestrator, _) = orchestrator(llm, ExecutorConfig::default());

    let outcome = orchestrator.process_prompt(TP53_PROMPT).await.unwrap();

    assert_eq!(outcome.stats.tasks.len(), 4);
    assert!(matches!(outcome.stats.graph, GraphSource::Default { .. }));
}

#[tokio::test]
async fn test_empty_prompt() {
    let (orchestrator, observer) =
        orchestrator(Arc::new(OfflineCompletion), ExecutorConfig::default());

    let result = orchestrator.process_prompt("").await;

    assert_eq!(result.unwrap_err(), PipelineError::EmptyPrompt);
    assert!(observer.messages().is_empty());
}

#[tokio::test]
async fn test_channel_observer_sees_every_message_in_order() {
    let (observer, mut rx) = ChannelObserver::new();
    let orchestrator = crispr_pipeline::Orchestrator::new(
        Arc::new(OfflineCompletion),
        Arc::new(observer),
        ExecutorConfig::default(),
    );

    orchestrator.process_prompt(TP53_PROMPT).await.unwrap();
    drop(orchestrator);

    let mut ids = Vec::new();
    while let Some(message) = rx.recv().await {
        ids.push(message.id);
    }
    assert!(!ids.is_empty());
    assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let (orchestrator, _) = orchestrator(Arc::new(OfflineCompletion), ExecutorConfig::default());

    let (tp53, brca1) = tokio::join!(
        orchestrator.process_prompt(TP53_PROMPT),
        orchestrator.process_prompt("Knock out BRCA1 in HeLa cells")
    );

    let (tp53, brca1) = (tp53.unwrap(), brca1.unwrap());
    assert_ne!(tp53.run_id, brca1.run_id);
    assert_eq!(tp53.plan.gene, "TP53");
    assert_eq!(brca1.plan.gene, "BRCA1");
    assert_eq!(brca1.plan.cell_line, "HeLa");
    assert_eq!(brca1.guides[0].id, "g1");
}

#[tokio::test]
async fn test_outcome_serializes() {
    let (orchestrator, _) = orchestrator(Arc::new(OfflineCompletion), ExecutorConfig::default());

    let outcome = orchestrator.process_prompt(TP53_PROMPT).await.unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["plan"]["gene"], "TP53");
    assert_eq!(value["summary"]["bestGuide"]["id"], "tp53_g1");
    assert_eq!(value["stats"]["stop_reason"], "essentials_complete");
    assert_eq!(value["stats"]["graph"]["source"], "default");
}
