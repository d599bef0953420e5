//! Task graph construction.
//!
//! This module provides:
//! - The closed set of task kinds and the alias table that maps declared
//!   task types onto them
//! - Parsing of a language-model task list into [`Task`]s
//! - The standard four-step graph used when no usable list is produced

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::agents::AgentRole;
use crate::error::AgentError;
use crate::pipeline_utils::json::{parse_json_value, ParseError};
use crate::types::{FinalSummary, Guide, PlanObject};

pub const DEFAULT_PRIORITY: u8 = 3;

/// What a task does, decided once when the graph is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Planning,
    GuideDesign,
    RiskAssessment,
    ProtocolGeneration,
    Auxiliary,
}

impl TaskKind {
    /// Kinds whose completion matters for an early finish
    pub fn is_essential(&self) -> bool {
        matches!(
            self,
            TaskKind::Planning | TaskKind::GuideDesign | TaskKind::RiskAssessment
        )
    }

    /// Role allowed to produce this kind's semantic result
    pub fn owner(&self) -> Option<AgentRole> {
        match self {
            TaskKind::Planning => Some(AgentRole::Planner),
            TaskKind::GuideDesign => Some(AgentRole::Designer),
            TaskKind::RiskAssessment => Some(AgentRole::RiskAnalyst),
            TaskKind::ProtocolGeneration => Some(AgentRole::Summarizer),
            TaskKind::Auxiliary => None,
        }
    }

    /// Map a declared task type onto a kind
    ///
    /// Matching is exact after normalization (lowercase, separators
    /// collapsed to `_`). Unlisted types are `None`.
    pub fn from_alias(declared: &str) -> Option<TaskKind> {
        let key = normalize_type(declared);
        let kind = match key.as_str() {
            "planning" | "plan" | "parse_prompt" | "prompt_parsing" | "plan_experiment"
            | "experiment_planning" | "experiment_design" | "intent_parsing" => TaskKind::Planning,

            "guide_design" | "design_guides" | "design_guide_rnas" | "guide_rna_design"
            | "sgrna_design" | "grna_design" | "guide_generation" => TaskKind::GuideDesign,

            "risk_assessment" | "analyze_risk" | "risk_analysis" | "off_target_analysis"
            | "offtarget_analysis" | "off_target_prediction" | "safety_assessment" => {
                TaskKind::RiskAssessment
            }

            "protocol_generation" | "generate_protocol" | "generate_summary" | "final_summary"
            | "summary" | "execution_plan" | "execution_preparation" | "final_protocol_review"
            | "protocol_review" => TaskKind::ProtocolGeneration,

            _ => return None,
        };
        Some(kind)
    }

    /// Kind for a declared type, [`TaskKind::Auxiliary`] when unlisted
    pub fn classify(declared: &str) -> TaskKind {
        TaskKind::from_alias(declared).unwrap_or_else(|| {
            tracing::warn!(task_type = declared, "unrecognized task type, treating as auxiliary");
            TaskKind::Auxiliary
        })
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Planning => "planning",
            TaskKind::GuideDesign => "guide_design",
            TaskKind::RiskAssessment => "risk_assessment",
            TaskKind::ProtocolGeneration => "protocol_generation",
            TaskKind::Auxiliary => "auxiliary",
        };
        f.write_str(name)
    }
}

fn normalize_type(declared: &str) -> String {
    let mut key = String::with_capacity(declared.len());
    for c in declared.trim().chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_matches('_').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Result recorded on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskOutput {
    Plan(PlanObject),
    Guides(Vec<Guide>),
    AnalyzedGuides(Vec<Guide>),
    Summary(FinalSummary),
    /// Completion with no semantic result
    Placeholder(Value),
    Failed { error: String },
}

impl TaskOutput {
    pub fn failed(error: &AgentError) -> Self {
        TaskOutput::Failed {
            error: error.to_string(),
        }
    }
}

/// Unit of scheduled work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Type string as declared by the graph's author
    pub task_type: String,
    pub kind: TaskKind,
    pub assignee: String,
    /// 1-5, higher runs first
    pub priority: u8,
    pub dependencies: Vec<String>,
    pub status: TaskStatus,
    pub result: Option<TaskOutput>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        task_type: impl Into<String>,
        assignee: impl Into<String>,
        priority: u8,
        dependencies: Vec<String>,
    ) -> Self {
        let task_type = task_type.into();
        Self {
            id: id.into(),
            kind: TaskKind::classify(&task_type),
            task_type,
            assignee: assignee.into(),
            priority: priority.clamp(1, 5),
            dependencies,
            status: TaskStatus::Pending,
            result: None,
        }
    }
}

/// The standard plan, design, risk, protocol chain
pub fn default_task_graph() -> Vec<Task> {
    vec![
        Task::new("plan_experiment", "plan_experiment", AgentRole::Planner.name(), 5, vec![]),
        Task::new(
            "design_guides",
            "design_guides",
            AgentRole::Designer.name(),
            4,
            vec!["plan_experiment".to_string()],
        ),
        Task::new(
            "analyze_risk",
            "analyze_risk",
            AgentRole::RiskAnalyst.name(),
            4,
            vec!["design_guides".to_string()],
        ),
        Task::new(
            "generate_protocol",
            "protocol_generation",
            AgentRole::Summarizer.name(),
            3,
            vec!["analyze_risk".to_string()],
        ),
    ]
}

/// Id-like JSON value as a string
///
/// Models emit ids as strings or numbers interchangeably.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a task list from completion text shaped `{"tasks": [...]}`
///
/// Entries without a usable id or type are skipped with a warning, as are
/// duplicate ids after the first. A bare array is accepted too.
pub fn parse_task_graph(text: &str) -> Result<Vec<Task>, AgentError> {
    let value = parse_json_value(text)?;

    let entries = value
        .get("tasks")
        .and_then(|t| t.as_array())
        .or_else(|| value.as_array())
        .ok_or_else(|| ParseError::unexpected_shape(text, "task list has no `tasks` array"))?;

    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        let Some(id) = entry.get("id").and_then(id_string) else {
            tracing::warn!(index = idx, "skipping task without id");
            continue;
        };
        let Some(task_type) = entry.get("type").and_then(|t| t.as_str()) else {
            tracing::warn!(task_id = %id, "skipping task without type");
            continue;
        };
        if !seen.insert(id.clone()) {
            tracing::warn!(task_id = %id, "skipping duplicate task id");
            continue;
        }

        let assignee = entry
            .get("assignee")
            .and_then(|a| a.as_str())
            .unwrap_or_default();
        let priority = entry
            .get("priority")
            .and_then(|p| p.as_u64())
            .map(|p| p.min(5) as u8)
            .unwrap_or(DEFAULT_PRIORITY);
        let dependencies = entry
            .get("dependencies")
            .and_then(|d| d.as_array())
            .map(|deps| deps.iter().filter_map(id_string).collect())
            .unwrap_or_default();

        tasks.push(Task::new(id, task_type, assignee, priority, dependencies));
    }

    Ok(tasks)
}
