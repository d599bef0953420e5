//! The four specialist agents and the roles tasks are assigned to.
//!
//! Each agent owns one step of guide design. Agents report progress through
//! a shared [`Notifier`] and never touch the task graph; the executor hands
//! them exactly the inputs they need.

pub mod designer;
pub mod planner;
pub mod reference;
pub mod risk_analyst;
pub mod summarizer;

use crispr_pipeline_sdk::Notifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::completion::CompletionService;

pub use designer::GuideDesigner;
pub use planner::PlannerAgent;
pub use risk_analyst::RiskAnalyst;
pub use summarizer::Summarizer;

/// Agent a task can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Planner,
    Designer,
    RiskAnalyst,
    Summarizer,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Planner,
        AgentRole::Designer,
        AgentRole::RiskAnalyst,
        AgentRole::Summarizer,
    ];

    /// Name used for assignment and progress messages
    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::Planner => planner::AGENT_NAME,
            AgentRole::Designer => designer::AGENT_NAME,
            AgentRole::RiskAnalyst => risk_analyst::AGENT_NAME,
            AgentRole::Summarizer => summarizer::AGENT_NAME,
        }
    }

    /// Resolve an assignee string
    ///
    /// Matching ignores case and punctuation, and accepts a fixed set of
    /// aliases per role. Anything else is unknown.
    pub fn from_assignee(assignee: &str) -> Option<AgentRole> {
        let key: String = assignee
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "planneragent" | "planner" | "planningagent" => Some(AgentRole::Planner),
            "guidedesigner" | "designer" | "designeragent" => Some(AgentRole::Designer),
            "riskanalyst" | "riskagent" | "riskanalystagent" => Some(AgentRole::RiskAnalyst),
            "summarizer" | "summarizeragent" | "undergradagent" | "protocolwriter" => {
                Some(AgentRole::Summarizer)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One instance of every agent, sharing a notifier
pub struct AgentTeam {
    pub planner: PlannerAgent,
    pub designer: GuideDesigner,
    pub risk_analyst: RiskAnalyst,
    pub summarizer: Summarizer,
}

impl AgentTeam {
    pub fn new(llm: Arc<dyn CompletionService>, notifier: Notifier) -> Self {
        Self {
            planner: PlannerAgent::new(llm, notifier.clone()),
            designer: GuideDesigner::new(notifier.clone()),
            risk_analyst: RiskAnalyst::new(notifier.clone()),
            summarizer: Summarizer::new(notifier),
        }
    }
}
