//! Multi-agent CRISPR guide RNA design.
//!
//! A free-text request flows through four agents (planner, guide designer,
//! risk analyst, summarizer) scheduled as a task graph by the
//! [`orchestrator`]. The result is an experiment plan, scored guides and a
//! final report with a protocol.

pub mod agents;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pipeline_utils;
pub mod render;
pub mod types;

pub use error::{AgentError, PipelineError};
pub use orchestrator::{Orchestrator, PipelineOutcome};
