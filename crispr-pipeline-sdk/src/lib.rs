//! Progress reporting for the CRISPR guide design pipeline.
//!
//! Agents and the orchestrator describe what they are doing through
//! [`AgentMessage`]s handed to a [`ProgressObserver`]. Observers decide where
//! the messages go: a terminal, a channel feeding another task, or a buffer
//! inspected by tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Phase of an agent step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Thinking,
    Complete,
}

/// One progress notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: u64,
    pub agent: String,
    pub status: AgentStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured events emitted on stderr for machine consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineLog {
    /// A run was accepted
    RunStarted { run_id: Uuid, prompt: String },
    /// An agent or the orchestrator reported progress
    Progress {
        run_id: Uuid,
        #[serde(flatten)]
        message: AgentMessage,
    },
    /// A run stopped
    RunFinished {
        run_id: Uuid,
        stop_reason: String,
        iterations: usize,
    },
}

impl PipelineLog {
    /// Emit this log event to stderr as a single prefixed JSON line
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("__CRISPR_EVENT__:{}", json);
            let _ = std::io::stderr().flush();
        }
    }

    /// Parse a line produced by [`PipelineLog::emit`]
    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.strip_prefix("__CRISPR_EVENT__:")?;
        serde_json::from_str(json).ok()
    }
}

/// Receives progress notifications in the order they are produced
pub trait ProgressObserver: Send + Sync {
    fn notify(&self, message: AgentMessage);

    /// Called once when a run begins
    fn run_started(&self, _run_id: Uuid, _prompt: &str) {}

    /// Called once when a run stops
    fn run_finished(&self, _run_id: Uuid, _stop_reason: &str, _iterations: usize) {}
}

/// Hands out message ids and timestamps, then forwards to an observer
///
/// Cloning is cheap; clones share the id counter so ids stay unique and
/// increasing across every agent of a run.
#[derive(Clone)]
pub struct Notifier {
    observer: Arc<dyn ProgressObserver>,
    next_id: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            observer,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Notifier that drops every message
    pub fn silent() -> Self {
        Self::new(Arc::new(NullObserver))
    }

    pub fn send(&self, agent: &str, status: AgentStatus, message: impl Into<String>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.observer.notify(AgentMessage {
            id,
            agent: agent.to_string(),
            status,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn thinking(&self, agent: &str, message: impl Into<String>) {
        self.send(agent, AgentStatus::Thinking, message);
    }

    pub fn complete(&self, agent: &str, message: impl Into<String>) {
        self.send(agent, AgentStatus::Complete, message);
    }

    pub fn run_started(&self, run_id: Uuid, prompt: &str) {
        self.observer.run_started(run_id, prompt);
    }

    pub fn run_finished(&self, run_id: Uuid, stop_reason: &str, iterations: usize) {
        self.observer.run_finished(run_id, stop_reason, iterations);
    }
}

/// Observer that ignores everything
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn notify(&self, _message: AgentMessage) {}
}

/// Buffers messages in memory
#[derive(Default)]
pub struct CollectingObserver {
    messages: Mutex<Vec<AgentMessage>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far
    pub fn messages(&self) -> Vec<AgentMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn messages_from(&self, agent: &str) -> Vec<AgentMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.agent == agent)
            .collect()
    }
}

impl ProgressObserver for CollectingObserver {
    fn notify(&self, message: AgentMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}

/// Forwards messages into an unbounded tokio channel
///
/// Messages sent after the receiver is dropped are discarded.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<AgentMessage>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AgentMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressObserver for ChannelObserver {
    fn notify(&self, message: AgentMessage) {
        let _ = self.tx.send(message);
    }
}

/// Emits every message as a [`PipelineLog`] line on stderr
pub struct EventObserver {
    run_id: Mutex<Uuid>,
}

impl EventObserver {
    pub fn new() -> Self {
        Self {
            run_id: Mutex::new(Uuid::nil()),
        }
    }

    fn current_run(&self) -> Uuid {
        self.run_id.lock().map(|id| *id).unwrap_or_else(|_| Uuid::nil())
    }
}

impl Default for EventObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for EventObserver {
    fn notify(&self, message: AgentMessage) {
        PipelineLog::Progress {
            run_id: self.current_run(),
            message,
        }
        .emit();
    }

    fn run_started(&self, run_id: Uuid, prompt: &str) {
        if let Ok(mut current) = self.run_id.lock() {
            *current = run_id;
        }
        PipelineLog::RunStarted {
            run_id,
            prompt: prompt.to_string(),
        }
        .emit();
    }

    fn run_finished(&self, run_id: Uuid, stop_reason: &str, iterations: usize) {
        PipelineLog::RunFinished {
            run_id,
            stop_reason: stop_reason.to_string(),
            iterations,
        }
        .emit();
    }
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Human-readable output for the CLI, complementing the structured
// PipelineLog events.
// ============================================================================

/// Logs the start of a pipeline stage with a header and description.
///
/// # Example
/// ```
/// use crispr_pipeline_sdk::log_stage_start_console;
/// log_stage_start_console!("Pipeline", "Knock out TP53 exon 4");
/// ```
///
/// Outputs:
/// ```text
/// ═══ Pipeline ═══
/// Knock out TP53 exon 4
/// ```
#[macro_export]
macro_rules! log_stage_start_console {
    ($title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ {} ═══\x1b[0m", $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs an agent that started working.
///
/// # Example
/// ```
/// use crispr_pipeline_sdk::log_agent_thinking;
/// log_agent_thinking!("RiskAnalyst", "Scanning genome for off-target sites...");
/// ```
#[macro_export]
macro_rules! log_agent_thinking {
    ($agent:expr, $message:expr) => {
        println!("\x1b[36m… [{}] {}\x1b[0m", $agent, $message);
    };
}

/// Logs an agent that finished a step.
///
/// # Example
/// ```
/// use crispr_pipeline_sdk::log_agent_complete;
/// log_agent_complete!("RiskAnalyst", "Risk analysis complete.");
/// ```
#[macro_export]
macro_rules! log_agent_complete {
    ($agent:expr, $message:expr) => {
        println!("\x1b[32m✓ [{}] {}\x1b[0m", $agent, $message);
    };
}

/// Logs the number of items found.
///
/// # Example
/// ```
/// use crispr_pipeline_sdk::log_found;
/// log_found!(5, "guides");
/// ```
///
/// Outputs:
/// ```text
/// Found 5 guides
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
///
/// # Example
/// ```
/// use crispr_pipeline_sdk::log_info;
/// log_info!("Loading configuration...");
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use crispr_pipeline_sdk::log_warning;
/// log_warning!("Running offline, LLM calls will fall back");
/// ```
///
/// Outputs:
/// ```text
/// ⚠ Warning: Running offline, LLM calls will fall back
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Prints messages as colored console lines
pub struct ConsoleObserver;

impl ProgressObserver for ConsoleObserver {
    fn notify(&self, message: AgentMessage) {
        match message.status {
            AgentStatus::Thinking => {
                log_agent_thinking!(message.agent, message.message);
            }
            AgentStatus::Complete => {
                log_agent_complete!(message.agent, message.message);
            }
        }
    }

    fn run_started(&self, _run_id: Uuid, prompt: &str) {
        log_stage_start_console!("Pipeline", prompt);
    }

    fn run_finished(&self, _run_id: Uuid, stop_reason: &str, iterations: usize) {
        log_info!("Run finished after {} iterations ({})", iterations, stop_reason);
    }
}
