//! Per-run state: the task graph and the results produced so far.

use serde::Serialize;
use std::collections::BTreeMap;

use super::task_graph::{Task, TaskKind, TaskOutput, TaskStatus};
use crate::types::{FinalSummary, Guide, PlanObject};

/// Results accumulated during a run
///
/// Semantic slots are filled only by a task of the matching kind run by its
/// owning agent. Every settled task also lands in `by_task`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResults {
    pub plan: Option<PlanObject>,
    pub guides: Option<Vec<Guide>>,
    pub analyzed_guides: Option<Vec<Guide>>,
    pub summary: Option<FinalSummary>,
    pub by_task: BTreeMap<String, TaskOutput>,
}

impl RunResults {
    /// Record `output` for `task_id`, filling a semantic slot when it has one
    pub fn record(&mut self, task_id: &str, output: TaskOutput) {
        match &output {
            TaskOutput::Plan(plan) => self.plan = Some(plan.clone()),
            TaskOutput::Guides(guides) => self.guides = Some(guides.clone()),
            TaskOutput::AnalyzedGuides(guides) => self.analyzed_guides = Some(guides.clone()),
            TaskOutput::Summary(summary) => self.summary = Some(summary.clone()),
            TaskOutput::Placeholder(_) | TaskOutput::Failed { .. } => {}
        }
        self.by_task.insert(task_id.to_string(), output);
    }

    /// Plan, guides and analyzed guides are all present
    pub fn has_essentials(&self) -> bool {
        self.plan.is_some() && self.guides.is_some() && self.analyzed_guides.is_some()
    }

    /// Data a task of `kind` needs before it may be dispatched
    pub fn prerequisites_met(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::GuideDesign => self.plan.is_some(),
            TaskKind::RiskAssessment => self.guides.is_some(),
            TaskKind::ProtocolGeneration => self.analyzed_guides.is_some(),
            TaskKind::Planning | TaskKind::Auxiliary => true,
        }
    }
}

/// Everything one `process_prompt` call owns
///
/// Created fresh per call, so concurrent runs never share state.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub prompt: String,
    pub tasks: Vec<Task>,
    pub results: RunResults,
    pub iterations: usize,
}

impl RunContext {
    pub fn new(prompt: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            prompt: prompt.into(),
            tasks,
            results: RunResults::default(),
            iterations: 0,
        }
    }

    pub fn all_settled(&self) -> bool {
        self.tasks.iter().all(|t| t.status.is_settled())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Status of the task with `id`; unknown ids are never completed
    pub fn dependency_completed(&self, id: &str) -> bool {
        self.task(id)
            .map(|t| t.status == TaskStatus::Completed)
            .unwrap_or(false)
    }

    /// An essential task has failed
    pub fn essential_failed(&self) -> bool {
        self.tasks
            .iter()
            .any(|t| t.kind.is_essential() && t.status == TaskStatus::Failed)
    }

    /// Essentials are done and nothing essential is left or broken
    pub fn essentials_complete(&self) -> bool {
        self.results.has_essentials()
            && !self.essential_failed()
            && self
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .all(|t| !t.kind.is_essential())
    }

    /// Mark a task settled with `output`
    pub fn settle(&mut self, index: usize, output: TaskOutput) {
        let Some(task) = self.tasks.get_mut(index) else {
            return;
        };
        task.status = match output {
            TaskOutput::Failed { .. } => TaskStatus::Failed,
            _ => TaskStatus::Completed,
        };
        task.result = Some(output.clone());
        let id = task.id.clone();
        self.results.record(&id, output);
    }
}
