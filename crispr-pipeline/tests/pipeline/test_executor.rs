//! Tests for task graph execution
//!
//! Covers termination, the data precondition gate, forced progression,
//! bounded dispatch and failure isolation.

use super::common::*;
use crispr_pipeline::config::ExecutorConfig;
use crispr_pipeline::orchestrator::task_graph::default_task_graph;
use crispr_pipeline::orchestrator::{StopReason, Task, TaskOutput, TaskStatus, ORCHESTRATOR};

// ============================================================================
// Termination
// ============================================================================

#[tokio::test]
async fn test_cyclic_auxiliary_graph_stalls() {
    let tasks = vec![
        Task::new("a", "review", "PlannerAgent", 3, deps(&["b"])),
        Task::new("b", "review", "RiskAnalyst", 3, deps(&["a"])),
    ];

    let (ctx, stop, observer) = run_graph(tasks, ExecutorConfig::default()).await;

    assert_eq!(stop, StopReason::Stalled);
    assert_eq!(ctx.iterations, 1);
    assert!(ctx.tasks.iter().all(|t| t.status == TaskStatus::Pending));
    assert_eq!(observer.messages_from(ORCHESTRATOR).len(), 1);
}

#[tokio::test]
async fn test_iteration_limit() {
    let config = ExecutorConfig {
        max_iterations: 2,
        ..Default::default()
    };

    let (ctx, stop, observer) = run_graph(default_task_graph(), config).await;

    assert_eq!(stop, StopReason::IterationLimit);
    assert_eq!(ctx.iterations, 2);
    assert!(ctx.results.guides.is_some());
    assert!(ctx.results.analyzed_guides.is_none());

    let last = observer.messages().pop().unwrap();
    assert_eq!(
        last.message,
        "Execution terminated after 2 iterations to prevent infinite loop"
    );
}

#[tokio::test]
async fn test_all_settled_message() {
    let tasks = vec![Task::new("aux", "literature_check", "Summarizer", 2, vec![])];

    let (_, stop, observer) = run_graph(tasks, ExecutorConfig::default()).await;

    assert_eq!(stop, StopReason::AllTasksSettled);
    let last = observer.messages().pop().unwrap();
    assert_eq!(last.agent, ORCHESTRATOR);
    assert_eq!(last.message, "All workflow tasks completed.");
}

#[tokio::test]
async fn test_essentials_complete_skips_protocol() {
    let (ctx, stop, observer) = run_graph(default_task_graph(), ExecutorConfig::default()).await;

    assert_eq!(stop, StopReason::EssentialsComplete);
    assert!(ctx.results.summary.is_none());
    let last = observer.messages().pop().unwrap();
    assert_eq!(
        last.message,
        "CRISPR guide design workflow completed successfully. All essential tasks finished."
    );
}

// ============================================================================
// Precondition Gate and Forced Progression
// ============================================================================

#[tokio::test]
async fn test_design_without_dependencies_waits_for_plan() {
    let tasks = vec![
        Task::new("design", "design_guides", "GuideDesigner", 5, vec![]),
        Task::new("plan", "parse_prompt", "PlannerAgent", 1, vec![]),
    ];

    let (ctx, _, observer) = run_graph(tasks, ExecutorConfig::default()).await;

    assert_eq!(ctx.tasks[0].status, TaskStatus::Completed);
    let executing: Vec<String> = observer
        .messages()
        .into_iter()
        .filter(|m| m.message.starts_with("Executing"))
        .inspect(|m| assert_eq!(m.agent, ORCHESTRATOR))
        .map(|m| m.message)
        .collect();
    assert_eq!(
        executing,
        vec![
            "Executing parse_prompt with PlannerAgent",
            "Executing design_guides with GuideDesigner"
        ]
    );
}

#[tokio::test]
async fn test_missing_dependency_is_forced_forward() {
    let tasks = vec![
        Task::new("plan", "parse_prompt", "PlannerAgent", 3, vec![]),
        Task::new("design", "design_guides", "GuideDesigner", 3, deps(&["ghost"])),
        Task::new("risk", "analyze_risk", "RiskAnalyst", 3, deps(&["phantom"])),
    ];

    let (ctx, stop, _) = run_graph(tasks, ExecutorConfig::default()).await;

    assert_eq!(stop, StopReason::AllTasksSettled);
    assert!(ctx.results.has_essentials());
    assert!(ctx.tasks.iter().all(|t| t.status == TaskStatus::Completed));
}

#[tokio::test]
async fn test_task_without_dependencies_forced_and_fails_on_missing_data() {
    let tasks = vec![
        Task::new("plan", "parse_prompt", "PlannerAgent", 3, deps(&["ghost"])),
        Task::new("risk", "analyze_risk", "RiskAnalyst", 3, vec![]),
    ];

    let (ctx, stop, observer) = run_graph(tasks, ExecutorConfig::default()).await;

    // Iteration one forces the risk task, iteration two forces planning
    assert_eq!(stop, StopReason::AllTasksSettled);
    assert_eq!(ctx.iterations, 2);
    assert!(ctx.results.plan.is_some());

    let risk = ctx.task("risk").unwrap();
    assert_eq!(risk.status, TaskStatus::Failed);
    match &risk.result {
        Some(TaskOutput::Failed { error }) => {
            assert_eq!(error, "No guides available for risk analysis")
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(observer
        .messages()
        .iter()
        .any(|m| m.message == "Failed analyze_risk: No guides available for risk analysis"));
}

#[tokio::test]
async fn test_no_forcing_outside_window() {
    let tasks = vec![Task::new("plan", "parse_prompt", "PlannerAgent", 3, deps(&["ghost"]))];
    let config = ExecutorConfig {
        force_progression_window: 0,
        ..Default::default()
    };

    let (ctx, stop, _) = run_graph(tasks, config).await;

    assert_eq!(stop, StopReason::Stalled);
    assert!(ctx.results.plan.is_none());
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_at_most_three_tasks_per_iteration() {
    let tasks: Vec<Task> = (1..=5)
        .map(|i| Task::new(format!("aux{}", i), "note", "Summarizer", i as u8, vec![]))
        .collect();

    let (ctx, stop, observer) = run_graph(tasks, ExecutorConfig::default()).await;

    assert_eq!(stop, StopReason::AllTasksSettled);
    assert_eq!(ctx.iterations, 2);

    let messages = observer.messages();
    let executing: Vec<&str> = messages
        .iter()
        .filter(|m| m.message.starts_with("Executing"))
        .map(|m| m.message.as_str())
        .collect();
    assert_eq!(executing.len(), 5);

    // Highest priority tasks go first: aux5, aux4, aux3 in iteration one
    let first_completed = messages
        .iter()
        .position(|m| m.message.starts_with("Completed"))
        .unwrap();
    let executing_before_first_completion = messages[..first_completed]
        .iter()
        .filter(|m| m.message.starts_with("Executing"))
        .count();
    assert_eq!(executing_before_first_completion, 3);
}

#[tokio::test]
async fn test_unknown_agent_does_not_stop_the_chain() {
    let mut tasks = default_task_graph();
    tasks.push(Task::new("mystery", "notes", "ChemistAgent", 5, vec![]));

    let (ctx, stop, observer) = run_graph(tasks, ExecutorConfig::default()).await;

    assert_eq!(stop, StopReason::EssentialsComplete);
    let mystery = ctx.tasks.iter().find(|t| t.id == "mystery").unwrap();
    assert_eq!(mystery.status, TaskStatus::Failed);
    assert!(observer
        .messages()
        .iter()
        .any(|m| m.message == "Failed notes: unknown agent: ChemistAgent"));
}

#[tokio::test]
async fn test_risk_task_waits_for_guides() {
    let tasks = vec![
        Task::new("plan", "parse_prompt", "PlannerAgent", 3, vec![]),
        Task::new("risk", "analyze_risk", "RiskAnalyst", 3, deps(&["plan"])),
        Task::new("design", "design_guides", "GuideDesigner", 3, deps(&["plan"])),
    ];

    let (ctx, _, _) = run_graph(tasks, ExecutorConfig::default()).await;

    // Risk analysis is gated on guides, so it runs only after design
    let risk = ctx.task("risk").unwrap();
    assert_eq!(risk.status, TaskStatus::Completed);
    assert!(matches!(risk.result, Some(TaskOutput::AnalyzedGuides(_))));
}
