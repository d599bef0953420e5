//! Error types for agents and pipeline runs.

use thiserror::Error;

use crate::completion::CompletionError;
use crate::pipeline_utils::json::ParseError;

/// Failure of a single agent step
///
/// Confined to the task that produced it: the executor records it on the
/// task and keeps scheduling.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0}")]
    MissingData(String),

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Gene {0} not found in reference")]
    UnknownGene(String),

    #[error("language model call failed: {0}")]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}

/// Failure of a whole run
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("prompt is empty")]
    EmptyPrompt,
}
