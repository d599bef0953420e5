//! Final result assembly from whatever a run produced.

use crate::agents::planner::keyword_plan;
use crate::agents::AgentTeam;
use crate::types::{FinalSummary, Guide, PlanObject};

use super::context::RunResults;

/// The three artifacts returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    pub plan: PlanObject,
    pub guides: Vec<Guide>,
    pub summary: FinalSummary,
}

/// Build the final plan, guides and summary
///
/// - plan: the run's plan, else a keyword plan from `prompt`
/// - guides: analyzed guides, else raw guides, else empty
/// - summary: the run's summary, else one compiled now from the above
pub async fn consolidate(results: &RunResults, prompt: &str, agents: &AgentTeam) -> Consolidated {
    let plan = match &results.plan {
        Some(plan) => plan.clone(),
        None => {
            tracing::warn!("run produced no plan, using keyword extraction");
            keyword_plan(prompt)
        }
    };

    let guides = results
        .analyzed_guides
        .clone()
        .or_else(|| results.guides.clone())
        .unwrap_or_default();

    let summary = match &results.summary {
        Some(summary) => summary.clone(),
        None => agents.summarizer.finalize_summary(&plan, &guides).await,
    };

    Consolidated {
        plan,
        guides,
        summary,
    }
}
