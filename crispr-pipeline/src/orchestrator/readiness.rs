//! Which tasks run next.
//!
//! A task is ready when every dependency completed and the data its kind
//! consumes exists. When nothing is ready, a small set of fallback rules may
//! force one task forward past its dependency edges. A task with no declared
//! dependencies is forced even without its input data and fails on dispatch.

use serde::Serialize;
use std::fmt;

use super::context::RunContext;
use super::task_graph::{TaskKind, TaskStatus};
use crate::config::ExecutorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceReason {
    /// A pending task declares no dependencies but its input data is missing
    NoDependencies,
    /// No plan exists yet and a planning task is blocked by its dependencies
    MissingPlan,
    /// A plan exists but no guides
    PlanWithoutGuides,
    /// Guides exist but no risk analysis
    GuidesWithoutRisk,
}

impl fmt::Display for ForceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ForceReason::NoDependencies => "task has no dependencies",
            ForceReason::MissingPlan => "no plan exists yet",
            ForceReason::PlanWithoutGuides => "plan exists but no guides",
            ForceReason::GuidesWithoutRisk => "guides exist but no risk analysis",
        };
        f.write_str(text)
    }
}

/// Outcome of one scheduling decision, as task indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Ready tasks, highest priority first, capped at the concurrency limit
    Ready(Vec<usize>),
    /// No task was ready; this one is pushed forward
    Forced { index: usize, reason: ForceReason },
    /// Nothing can make progress
    Stalled,
}

/// Pending task whose dependencies completed and whose inputs exist
pub fn is_ready(ctx: &RunContext, index: usize) -> bool {
    let Some(task) = ctx.tasks.get(index) else {
        return false;
    };
    task.status == TaskStatus::Pending
        && task.dependencies.iter().all(|dep| ctx.dependency_completed(dep))
        && ctx.results.prerequisites_met(task.kind)
}

/// Ready task indices, highest priority first, ties in graph order
pub fn ready_tasks(ctx: &RunContext) -> Vec<usize> {
    let mut ready: Vec<usize> = (0..ctx.tasks.len()).filter(|&i| is_ready(ctx, i)).collect();
    ready.sort_by_key(|&i| std::cmp::Reverse(ctx.tasks[i].priority));
    ready
}

fn first_pending(ctx: &RunContext, predicate: impl Fn(usize) -> bool) -> Option<usize> {
    (0..ctx.tasks.len()).find(|&i| ctx.tasks[i].status == TaskStatus::Pending && predicate(i))
}

/// Decide what to dispatch this iteration
///
/// `ctx.iterations` is the 1-based number of the current iteration. Forcing
/// is only allowed while it is below `force_progression_window`.
pub fn select(ctx: &RunContext, config: &ExecutorConfig) -> Selection {
    let mut ready = ready_tasks(ctx);
    if !ready.is_empty() {
        ready.truncate(config.max_concurrent_tasks.max(1));
        return Selection::Ready(ready);
    }

    if ctx.iterations >= config.force_progression_window {
        return Selection::Stalled;
    }

    let results = &ctx.results;
    let kind_of = |i: usize| ctx.tasks[i].kind;

    if let Some(index) = first_pending(ctx, |i| ctx.tasks[i].dependencies.is_empty()) {
        return Selection::Forced {
            index,
            reason: ForceReason::NoDependencies,
        };
    }

    if results.plan.is_none() {
        if let Some(index) = first_pending(ctx, |i| kind_of(i) == TaskKind::Planning) {
            return Selection::Forced {
                index,
                reason: ForceReason::MissingPlan,
            };
        }
    }

    if results.plan.is_some() && results.guides.is_none() {
        if let Some(index) = first_pending(ctx, |i| kind_of(i) == TaskKind::GuideDesign) {
            return Selection::Forced {
                index,
                reason: ForceReason::PlanWithoutGuides,
            };
        }
    }

    if results.guides.is_some() && results.analyzed_guides.is_none() {
        if let Some(index) = first_pending(ctx, |i| kind_of(i) == TaskKind::RiskAssessment) {
            return Selection::Forced {
                index,
                reason: ForceReason::GuidesWithoutRisk,
            };
        }
    }

    Selection::Stalled
}
