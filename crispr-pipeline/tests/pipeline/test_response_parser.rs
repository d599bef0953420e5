//! Tests for parsing language-model completions
//!
//! Covers fence stripping, strict failure on malformed text, and task graph
//! extraction.

use crispr_pipeline::orchestrator::task_graph::{parse_task_graph, TaskKind};
use crispr_pipeline::pipeline_utils::json::{parse_json_value, strip_code_fence, ParseError};

#[test]
fn test_fenced_object_parses() {
    let value = parse_json_value("```json\n{\"tasks\": []}\n```").unwrap();
    assert!(value["tasks"].as_array().unwrap().is_empty());
}

#[test]
fn test_bare_fence_parses() {
    let value = parse_json_value("```\n[1, 2, 3]\n```").unwrap();
    assert_eq!(value.as_array().unwrap().len(), 3);
}

#[test]
fn test_inner_whitespace_preserved() {
    assert_eq!(
        strip_code_fence("```json\n{\"a\": \"x  y\"}\n```"),
        "{\"a\": \"x  y\"}"
    );
}

#[test]
fn test_prose_around_json_is_an_error() {
    let err = parse_json_value("Here you go: {\"gene\": \"TP53\"}").unwrap_err();
    assert!(matches!(err, ParseError::InvalidJson { .. }));
    assert_eq!(err.snippet(), Some("Here you go: {\"gene\": \"TP53\"}"));
}

#[test]
fn test_snippet_is_truncated() {
    let long = "x".repeat(500);
    let err = parse_json_value(&long).unwrap_err();
    assert_eq!(err.snippet().unwrap().len(), 100);
}

#[test]
fn test_empty_completion() {
    assert!(matches!(parse_json_value(""), Err(ParseError::Empty)));
}

#[test]
fn test_task_graph_from_fenced_completion() {
    let text = r#"```json
{
  "tasks": [
    {"id": "t1", "type": "parse_prompt", "assignee": "PlannerAgent", "priority": 5, "dependencies": []},
    {"id": "t2", "type": "design_guides", "assignee": "GuideDesigner", "priority": 4, "dependencies": ["t1"]},
    {"id": "t3", "type": "off_target_analysis", "assignee": "RiskAnalyst", "priority": 4, "dependencies": ["t2"]},
    {"id": "t4", "type": "final_protocol_review", "assignee": "UndergradAgent", "priority": 2, "dependencies": ["t3"]},
    {"id": "t5", "type": "team_sync", "assignee": "PlannerAgent", "priority": 1, "dependencies": []}
  ]
}
```"#;

    let tasks = parse_task_graph(text).unwrap();
    let kinds: Vec<TaskKind> = tasks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TaskKind::Planning,
            TaskKind::GuideDesign,
            TaskKind::RiskAssessment,
            TaskKind::ProtocolGeneration,
            TaskKind::Auxiliary
        ]
    );
    assert_eq!(tasks[3].task_type, "final_protocol_review");
}
