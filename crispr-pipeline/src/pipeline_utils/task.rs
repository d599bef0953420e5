//! Agent step execution with automatic progress notifications

use crispr_pipeline_sdk::Notifier;
use std::fmt::Display;
use std::future::Future;

/// Execute one agent step with automatic notifications
///
/// Wraps the step with:
/// - a `thinking` notification carrying `description` before execution
/// - a `complete` notification carrying the step's summary on success
/// - a `complete` notification carrying the error on failure
///
/// # Example
/// ```ignore
/// let guides = execute_step(&notifier, "GuideDesigner", "Scanning for PAM sites...", || async {
///     let guides = design(&plan)?;
///     Ok((guides, format!("Designed {} guides", guides.len())))
/// })
/// .await?;
/// ```
pub async fn execute_step<F, Fut, R, E>(
    notifier: &Notifier,
    agent: &str,
    description: impl Into<String>,
    executor: F,
) -> Result<R, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(R, String), E>>,
    E: Display,
{
    notifier.thinking(agent, description);

    match executor().await {
        Ok((result, summary)) => {
            notifier.complete(agent, summary);
            Ok(result)
        }
        Err(e) => {
            notifier.complete(agent, format!("Step failed: {}", e));
            Err(e)
        }
    }
}
