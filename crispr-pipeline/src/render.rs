//! Human-readable report for the terminal.

use chrono::Local;
use crispr_pipeline_sdk::{log_found, log_info, log_stage_start_console, log_warning};

use crate::orchestrator::{PipelineOutcome, StopReason, TaskStatus};
use crate::types::Guide;

fn guide_row(guide: &Guide) -> String {
    format!(
        "{:<8} {:<24} {:>5.2} {:>5.0}% {:<6} {}..{} {}",
        guide.id,
        guide.sequence,
        guide.efficiency,
        guide.gc_content,
        guide.offtarget_risk.as_str(),
        guide.start,
        guide.end,
        guide.pam_site.as_deref().unwrap_or("-"),
    )
}

/// Guide table with a header line
pub fn guide_table(guides: &[Guide]) -> String {
    let mut lines = vec![format!(
        "{:<8} {:<24} {:>5} {:>6} {:<6} {}",
        "id", "sequence", "eff", "gc", "risk", "position pam"
    )];
    lines.extend(guides.iter().map(guide_row));
    lines.join("\n")
}

pub fn print_outcome(outcome: &PipelineOutcome) {
    let plan = &outcome.plan;
    let summary = &outcome.summary;

    println!();
    log_stage_start_console!(
        "Experiment Plan",
        format!(
            "{} of {} {} in {} using {} (confidence {:.0}%)",
            plan.edit_type,
            plan.gene,
            plan.region,
            plan.cell_line,
            plan.nuclease,
            plan.confidence * 100.0
        )
    );
    if let Some(rationale) = &plan.rationale {
        println!("{}", rationale);
    }

    println!();
    log_stage_start_console!("Guide RNAs", summary.risk_summary.clone());
    log_found!(outcome.guides.len(), "guides");
    if !outcome.guides.is_empty() {
        println!("{}", guide_table(&outcome.guides));
    }

    println!();
    log_stage_start_console!(
        "Recommendation",
        format!(
            "Best guide: {} ({}) efficiency {:.2}",
            summary.best_guide.id, summary.best_guide.sequence, summary.best_guide.efficiency
        )
    );
    for guide in &summary.high_risk_guides {
        log_warning!("{} is high risk: {}", guide.id, guide_factors(guide));
    }

    println!();
    log_stage_start_console!("Protocol", "");
    println!("{}", summary.protocol);

    println!();
    log_stage_start_console!("Next Steps", "");
    for (i, step) in summary.next_steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }

    println!();
    let stats = &outcome.stats;
    let failed = stats
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Failed)
        .count();
    if stats.stop_reason != StopReason::EssentialsComplete
        && stats.stop_reason != StopReason::AllTasksSettled
    {
        log_warning!("Run stopped early ({}); results may be partial", stats.stop_reason);
    }
    log_info!(
        "Run {} finished at {}: {} iterations, {} tasks, {} failed",
        outcome.run_id,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        stats.iterations,
        stats.tasks.len(),
        failed
    );
}

fn guide_factors(guide: &Guide) -> String {
    match &guide.risk_factors {
        Some(factors) if !factors.is_empty() => factors.join(", "),
        _ => "no factors recorded".to_string(),
    }
}
