//! Prompt-to-report orchestration.
//!
//! [`Orchestrator::process_prompt`] asks the language model for a task
//! graph (falling back to the standard chain), executes it with
//! [`TaskGraphExecutor`], and consolidates whatever was produced.

pub mod consolidate;
pub mod context;
pub mod executor;
pub mod readiness;
pub mod task_graph;

use crispr_pipeline_sdk::{Notifier, ProgressObserver};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::agents::{AgentRole, AgentTeam};
use crate::completion::{CompletionRequest, CompletionService};
use crate::config::ExecutorConfig;
use crate::error::{AgentError, PipelineError};
use crate::types::{FinalSummary, Guide, PlanObject};

pub use context::{RunContext, RunResults};
pub use executor::{StopReason, TaskGraphExecutor, ORCHESTRATOR};
pub use readiness::{ForceReason, Selection};
pub use task_graph::{Task, TaskKind, TaskOutput, TaskStatus};

const GRAPH_SYSTEM_PROMPT: &str = "You are an AI orchestration expert. Return valid JSON only.";
const GRAPH_TEMPERATURE: f32 = 0.7;
const GRAPH_MAX_TOKENS: u32 = 500;

fn graph_prompt(prompt: &str) -> String {
    format!(
        r#"You are orchestrating a team of specialized agents for CRISPR experiment design:
- {planner}: natural language understanding and experiment planning
- {designer}: CRISPR guide RNA design
- {risk}: off-target prediction and safety assessment
- {summarizer}: protocol generation and experimental guidance

User request: "{prompt}"

Create a task execution plan that runs independent work in parallel.
Use these task types: parse_prompt, design_guides, analyze_risk, protocol_generation.

Return a JSON object with a "tasks" array. Each task has:
- id: unique identifier
- type: task type
- assignee: agent name
- priority: 1-5 (5 highest)
- dependencies: array of task ids that must complete first

Format: {{"tasks": [...]}}"#,
        planner = AgentRole::Planner.name(),
        designer = AgentRole::Designer.name(),
        risk = AgentRole::RiskAnalyst.name(),
        summarizer = AgentRole::Summarizer.name(),
        prompt = prompt,
    )
}

/// Where a run's task graph came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GraphSource {
    Generated,
    Default { reason: String },
}

/// Final state of one task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub id: String,
    pub task_type: String,
    pub kind: TaskKind,
    pub assignee: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Task> for TaskReport {
    fn from(task: &Task) -> Self {
        let error = match &task.result {
            Some(TaskOutput::Failed { error }) => Some(error.clone()),
            _ => None,
        };
        Self {
            id: task.id.clone(),
            task_type: task.task_type.clone(),
            kind: task.kind,
            assignee: task.assignee.clone(),
            status: task.status,
            error,
        }
    }
}

/// How a run went
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub graph: GraphSource,
    pub tasks: Vec<TaskReport>,
}

/// Everything `process_prompt` returns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub plan: PlanObject,
    pub guides: Vec<Guide>,
    pub summary: FinalSummary,
    pub stats: RunStats,
}

pub struct Orchestrator {
    llm: Arc<dyn CompletionService>,
    notifier: Notifier,
    agents: AgentTeam,
    config: ExecutorConfig,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        observer: Arc<dyn ProgressObserver>,
        config: ExecutorConfig,
    ) -> Self {
        let notifier = Notifier::new(observer);
        Self {
            agents: AgentTeam::new(llm.clone(), notifier.clone()),
            llm,
            notifier,
            config,
        }
    }

    /// Turn a free-text request into a plan, guides and a final summary
    ///
    /// Only an empty prompt is an error. Agent and model failures degrade
    /// the result instead.
    pub async fn process_prompt(&self, prompt: &str) -> Result<PipelineOutcome, PipelineError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(PipelineError::EmptyPrompt);
        }

        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, "starting run");
        self.notifier.run_started(run_id, prompt);

        let (tasks, graph) = self.plan_tasks(prompt).await;
        self.notifier.complete(
            ORCHESTRATOR,
            format!(
                "Created execution plan with {} tasks. Agents will work autonomously.",
                tasks.len()
            ),
        );

        let mut ctx = RunContext::new(prompt, tasks);
        let executor = TaskGraphExecutor::new(&self.agents, self.notifier.clone(), self.config.clone());
        let stop_reason = executor.run(&mut ctx).await;

        let consolidated = consolidate::consolidate(&ctx.results, prompt, &self.agents).await;

        tracing::info!(%run_id, iterations = ctx.iterations, %stop_reason, "run finished");
        self.notifier
            .run_finished(run_id, stop_reason.as_str(), ctx.iterations);

        Ok(PipelineOutcome {
            run_id,
            plan: consolidated.plan,
            guides: consolidated.guides,
            summary: consolidated.summary,
            stats: RunStats {
                iterations: ctx.iterations,
                stop_reason,
                graph,
                tasks: ctx.tasks.iter().map(TaskReport::from).collect(),
            },
        })
    }

    /// Task graph for `prompt`, from the model when possible
    async fn plan_tasks(&self, prompt: &str) -> (Vec<Task>, GraphSource) {
        self.notifier
            .thinking(ORCHESTRATOR, "Planning task execution across agents...");

        match self.generate_task_graph(prompt).await {
            Ok(tasks) if !tasks.is_empty() => (tasks, GraphSource::Generated),
            Ok(_) => self.default_graph("model returned no tasks".to_string()),
            Err(e) => self.default_graph(e.to_string()),
        }
    }

    async fn generate_task_graph(&self, prompt: &str) -> Result<Vec<Task>, AgentError> {
        let request = CompletionRequest::new(
            GRAPH_SYSTEM_PROMPT,
            graph_prompt(prompt),
            GRAPH_TEMPERATURE,
            GRAPH_MAX_TOKENS,
        )
        .json();
        let content = self.llm.complete(request).await?;
        task_graph::parse_task_graph(&content)
    }

    fn default_graph(&self, reason: String) -> (Vec<Task>, GraphSource) {
        tracing::warn!(reason = %reason, "task graph generation failed, using default graph");
        self.notifier.complete(
            ORCHESTRATOR,
            format!("Task planning unavailable ({}); using the standard four-step plan.", reason),
        );
        (task_graph::default_task_graph(), GraphSource::Default { reason })
    }
}
