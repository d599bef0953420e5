//! Command-line interface for the guide design pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use crispr_pipeline_sdk::{ConsoleObserver, EventObserver, NullObserver, ProgressObserver};
use std::path::PathBuf;
use std::sync::Arc;

use crate::completion::{CompletionService, OfflineCompletion, OpenAiClient};
use crate::config::PipelineConfig;
use crate::orchestrator::Orchestrator;
use crate::render;

/// Multi-agent CRISPR guide RNA design
///
/// Parses a free-text experiment request, designs candidate guides for the
/// target, scores their off-target risk and prints a report with an
/// experimental protocol.
#[derive(Parser, Debug, Clone)]
#[command(name = "crispr-pipeline")]
#[command(about = "Multi-agent CRISPR guide RNA design")]
#[command(version)]
pub struct Args {
    /// Experiment request, e.g. "Knock out TP53 exon 4 in HEK293 cells"
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Read the request from a file instead
    #[arg(long, value_name = "PATH", conflicts_with = "prompt")]
    pub prompt_file: Option<PathBuf>,

    /// Path to a YAML config file
    ///
    /// Defaults to the platform config directory when that file exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip the language model; every agent uses its deterministic fallback
    #[arg(long)]
    pub offline: bool,

    /// Model name, overriding config and CRISPR_MODEL
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Iteration cap for the task graph executor
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Emit structured progress events on stderr
    #[arg(long)]
    pub events: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<()> {
        if self.prompt.is_none() && self.prompt_file.is_none() {
            anyhow::bail!("A prompt is required: pass it as an argument or with --prompt-file");
        }
        if self.max_iterations == Some(0) {
            anyhow::bail!("--max-iterations must be at least 1");
        }
        Ok(())
    }

    /// The request text, read from `--prompt-file` when given
    pub fn resolve_prompt(&self) -> Result<String> {
        match (&self.prompt, &self.prompt_file) {
            (Some(prompt), _) => Ok(prompt.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt file: {}", path.display())),
            (None, None) => anyhow::bail!("No prompt given"),
        }
    }

    /// Apply CLI overrides on top of loaded configuration
    pub fn apply_to(&self, config: &mut PipelineConfig) {
        if let Some(model) = &self.model {
            config.completion.model = model.clone();
        }
        if let Some(max) = self.max_iterations {
            config.executor.max_iterations = max;
        }
    }

    fn observer(&self) -> Arc<dyn ProgressObserver> {
        if self.events {
            Arc::new(EventObserver::new())
        } else if self.json {
            Arc::new(NullObserver)
        } else {
            Arc::new(ConsoleObserver)
        }
    }
}

fn completion_service(args: &Args, config: &PipelineConfig) -> Result<Arc<dyn CompletionService>> {
    if args.offline {
        tracing::info!("running offline");
        return Ok(Arc::new(OfflineCompletion));
    }

    let api_key = config.require_api_key()?;
    let client = OpenAiClient::new(&config.completion, api_key)
        .context("Failed to build completion client")?;
    tracing::debug!(endpoint = client.endpoint(), model = %config.completion.model, "using completion service");
    Ok(Arc::new(client))
}

/// Run one request end to end
pub async fn run(args: Args) -> Result<()> {
    args.validate()?;
    let prompt = args.resolve_prompt()?;

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    let llm = completion_service(&args, &config)?;
    let orchestrator = Orchestrator::new(llm, args.observer(), config.executor.clone());

    let outcome = orchestrator.process_prompt(&prompt).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render::print_outcome(&outcome);
    }
    Ok(())
}
