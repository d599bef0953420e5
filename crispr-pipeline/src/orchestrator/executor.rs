//! Iterative task graph execution.
//!
//! Each iteration selects a batch (see [`super::readiness`]), runs it
//! concurrently against snapshots of the current results, then applies every
//! outcome once the whole batch has settled. A failing task is recorded as
//! failed and never aborts the run.

use crispr_pipeline_sdk::Notifier;
use serde::Serialize;
use serde_json::json;
use std::fmt;

use super::context::RunContext;
use super::readiness::{select, Selection};
use super::task_graph::{TaskKind, TaskOutput, TaskStatus};
use crate::agents::{AgentRole, AgentTeam};
use crate::config::ExecutorConfig;
use crate::error::AgentError;
use crate::pipeline_utils::batch::{execute_settled, BatchContext};
use crate::types::{Guide, PlanObject};

pub const ORCHESTRATOR: &str = "Orchestrator";

/// Why the executor stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every task completed or failed
    AllTasksSettled,
    /// Plan, guides and risk analysis exist and only non-essential work remains
    EssentialsComplete,
    /// No task was ready and no fallback rule applied
    Stalled,
    /// The iteration cap was reached
    IterationLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::AllTasksSettled => "all_tasks_settled",
            StopReason::EssentialsComplete => "essentials_complete",
            StopReason::Stalled => "stalled",
            StopReason::IterationLimit => "iteration_limit",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs one dispatched task may read
///
/// Cloned from the run results before the batch starts.
struct DispatchInput {
    index: usize,
    kind: TaskKind,
    task_type: String,
    assignee: String,
    plan: Option<PlanObject>,
    guides: Option<Vec<Guide>>,
    analyzed_guides: Option<Vec<Guide>>,
}

pub struct TaskGraphExecutor<'a> {
    agents: &'a AgentTeam,
    notifier: Notifier,
    config: ExecutorConfig,
}

impl<'a> TaskGraphExecutor<'a> {
    pub fn new(agents: &'a AgentTeam, notifier: Notifier, config: ExecutorConfig) -> Self {
        Self {
            agents,
            notifier,
            config,
        }
    }

    /// Run the graph in `ctx` until a stop condition holds
    pub async fn run(&self, ctx: &mut RunContext) -> StopReason {
        loop {
            if ctx.all_settled() {
                self.notifier
                    .complete(ORCHESTRATOR, "All workflow tasks completed.");
                return StopReason::AllTasksSettled;
            }

            if ctx.iterations >= self.config.max_iterations {
                tracing::warn!(iterations = ctx.iterations, "iteration limit reached");
                self.notifier.complete(
                    ORCHESTRATOR,
                    format!(
                        "Execution terminated after {} iterations to prevent infinite loop",
                        ctx.iterations
                    ),
                );
                return StopReason::IterationLimit;
            }

            ctx.iterations += 1;
            tracing::debug!(iteration = ctx.iterations, "scheduling iteration");

            if ctx.essentials_complete() {
                self.notifier.complete(
                    ORCHESTRATOR,
                    "CRISPR guide design workflow completed successfully. All essential tasks finished.",
                );
                return StopReason::EssentialsComplete;
            }

            let batch = match select(ctx, &self.config) {
                Selection::Ready(batch) => batch,
                Selection::Forced { index, reason } => {
                    tracing::warn!(
                        task_id = %ctx.tasks[index].id,
                        reason = %reason,
                        "no task ready, forcing progression"
                    );
                    vec![index]
                }
                Selection::Stalled => {
                    tracing::warn!(iteration = ctx.iterations, "no runnable tasks remain");
                    self.notifier.complete(
                        ORCHESTRATOR,
                        "No runnable tasks remain. Returning partial results.",
                    );
                    return StopReason::Stalled;
                }
            };

            self.run_batch(ctx, batch).await;
        }
    }

    async fn run_batch(&self, ctx: &mut RunContext, batch: Vec<usize>) {
        let mut inputs = Vec::with_capacity(batch.len());
        for index in batch {
            let task = &mut ctx.tasks[index];
            task.status = TaskStatus::InProgress;
            self.notifier.thinking(
                ORCHESTRATOR,
                format!("Executing {} with {}", task.task_type, task.assignee),
            );
            inputs.push(DispatchInput {
                index,
                kind: task.kind,
                task_type: task.task_type.clone(),
                assignee: task.assignee.clone(),
                plan: ctx.results.plan.clone(),
                guides: ctx.results.guides.clone(),
                analyzed_guides: ctx.results.analyzed_guides.clone(),
            });
        }

        let prompt = ctx.prompt.as_str();
        let outcomes = execute_settled(
            ctx.iterations,
            inputs,
            self.config.max_concurrent_tasks,
            |input, batch_ctx| self.dispatch(prompt, input, batch_ctx),
        )
        .await;

        for (index, outcome) in outcomes {
            let task = &ctx.tasks[index];
            let (assignee, task_type) = (task.assignee.clone(), task.task_type.clone());
            match outcome {
                Ok(output) => {
                    self.notifier
                        .complete(&assignee, format!("Completed {}", task_type));
                    ctx.settle(index, output);
                }
                Err(e) => {
                    tracing::warn!(task_id = %task.id, error = %e, "task failed");
                    self.notifier
                        .complete(&assignee, format!("Failed {}: {}", task_type, e));
                    ctx.settle(index, TaskOutput::failed(&e));
                }
            }
        }
    }

    async fn dispatch(
        &self,
        prompt: &str,
        input: DispatchInput,
        batch_ctx: BatchContext,
    ) -> (usize, Result<TaskOutput, AgentError>) {
        tracing::debug!(
            iteration = batch_ctx.iteration,
            task = batch_ctx.item_number,
            of = batch_ctx.total_items,
            task_type = %input.task_type,
            "dispatching task"
        );
        let index = input.index;
        (index, self.execute(prompt, input).await)
    }

    async fn execute(&self, prompt: &str, input: DispatchInput) -> Result<TaskOutput, AgentError> {
        let role = AgentRole::from_assignee(&input.assignee)
            .ok_or_else(|| AgentError::UnknownAgent(input.assignee.clone()))?;

        if input.kind.owner() != Some(role) {
            return Ok(placeholder_output(&input, role));
        }

        match input.kind {
            TaskKind::Planning => Ok(TaskOutput::Plan(
                self.agents.planner.parse_prompt(prompt).await,
            )),
            TaskKind::GuideDesign => {
                let plan = input.plan.ok_or_else(|| {
                    AgentError::MissingData("No plan available for guide design".to_string())
                })?;
                let guides = self.agents.designer.design_guides(&plan).await?;
                Ok(TaskOutput::Guides(guides))
            }
            TaskKind::RiskAssessment => {
                let guides = input.guides.ok_or_else(|| {
                    AgentError::MissingData("No guides available for risk analysis".to_string())
                })?;
                let analyzed = self.agents.risk_analyst.analyze_risk(&guides).await?;
                Ok(TaskOutput::AnalyzedGuides(analyzed))
            }
            TaskKind::ProtocolGeneration => {
                let plan = input.plan.ok_or_else(|| {
                    AgentError::MissingData("No plan available for protocol generation".to_string())
                })?;
                let guides = input.analyzed_guides.ok_or_else(|| {
                    AgentError::MissingData(
                        "No analyzed guides available for protocol generation".to_string(),
                    )
                })?;
                let summary = self.agents.summarizer.finalize_summary(&plan, &guides).await;
                Ok(TaskOutput::Summary(summary))
            }
            // Auxiliary kinds have no owner, so they return above
            TaskKind::Auxiliary => Ok(placeholder_output(&input, role)),
        }
    }
}

/// Completion value for work that produces no semantic result
fn placeholder_output(input: &DispatchInput, role: AgentRole) -> TaskOutput {
    let value = match input.kind {
        TaskKind::Auxiliary => json!({
            "taskType": input.task_type,
            "assignee": role.name(),
            "completed": true,
            "message": format!("Completed {} task", input.task_type),
        }),
        kind => json!({
            "taskType": input.task_type,
            "assignee": role.name(),
            "completed": true,
            "message": format!(
                "{} does not handle {} tasks; recorded without a result",
                role.name(),
                kind
            ),
        }),
    };
    TaskOutput::Placeholder(value)
}
