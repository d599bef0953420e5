//! Common test utilities for pipeline tests

use async_trait::async_trait;
use crispr_pipeline::completion::{CompletionError, CompletionRequest, CompletionService};
use crispr_pipeline::config::ExecutorConfig;
use crispr_pipeline::orchestrator::{RunContext, Task, TaskGraphExecutor};
use crispr_pipeline::agents::AgentTeam;
use crispr_pipeline::Orchestrator;
use crispr_pipeline_sdk::{CollectingObserver, Notifier};
use std::sync::{Arc, Mutex};

/// Completion service with canned answers
///
/// JSON-mode requests (task planning) get the graph answer; all others
/// (plan parsing) get the plan answer. A missing answer fails the call.
#[derive(Default)]
pub struct ScriptedCompletion {
    graph: Option<String>,
    plan: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(mut self, graph: &str) -> Self {
        self.graph = Some(graph.to_string());
        self
    }

    pub fn with_plan(mut self, plan: &str) -> Self {
        self.plan = Some(plan.to_string());
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let answer = if request.json_mode {
            self.graph.clone()
        } else {
            self.plan.clone()
        };
        self.requests.lock().unwrap().push(request);
        answer.ok_or_else(|| CompletionError::Unavailable("no scripted answer".to_string()))
    }
}

pub const TP53_PROMPT: &str = "Knock out TP53 exon 4 in HEK293 cells using SpCas9";

pub const KRAS_PLAN: &str = r#"{"gene": "KRAS", "region": "Exon 2", "editType": "Knockout",
  "cellLine": "A549", "nuclease": "SpCas9", "confidence": 0.9}"#;

/// Orchestrator wired to a collecting observer
pub fn orchestrator(
    llm: Arc<dyn CompletionService>,
    config: ExecutorConfig,
) -> (Orchestrator, Arc<CollectingObserver>) {
    let observer = Arc::new(CollectingObserver::new());
    (Orchestrator::new(llm, observer.clone(), config), observer)
}

/// Agents that never reach a language model
pub fn offline_team(notifier: Notifier) -> AgentTeam {
    AgentTeam::new(Arc::new(ScriptedCompletion::new()), notifier)
}

/// Run `tasks` directly through the executor
pub async fn run_graph(
    tasks: Vec<Task>,
    config: ExecutorConfig,
) -> (RunContext, crispr_pipeline::orchestrator::StopReason, Arc<CollectingObserver>) {
    let observer = Arc::new(CollectingObserver::new());
    let notifier = Notifier::new(observer.clone());
    let agents = offline_team(notifier.clone());
    let executor = TaskGraphExecutor::new(&agents, notifier, config);

    let mut ctx = RunContext::new(TP53_PROMPT, tasks);
    let stop = executor.run(&mut ctx).await;
    (ctx, stop, observer)
}

pub fn deps(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
