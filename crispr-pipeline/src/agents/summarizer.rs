//! Summarizer: final report, protocol text and next steps.

use crispr_pipeline_sdk::Notifier;
use std::convert::Infallible;

use crate::pipeline_utils::task::execute_step;
use crate::types::{FinalSummary, Guide, OfftargetRisk, PlanObject};

pub const AGENT_NAME: &str = "Summarizer";

/// Guides at the lowest risk tier present, in input order
///
/// Low-risk guides when any exist, else medium, else high.
pub fn recommended_guides(guides: &[Guide]) -> Vec<Guide> {
    [OfftargetRisk::Low, OfftargetRisk::Medium, OfftargetRisk::High]
        .into_iter()
        .map(|tier| {
            guides
                .iter()
                .filter(|g| g.offtarget_risk == tier)
                .cloned()
                .collect::<Vec<_>>()
        })
        .find(|tier| !tier.is_empty())
        .unwrap_or_default()
}

/// Highest-efficiency guide, first one on ties
pub fn best_guide(guides: &[Guide]) -> Option<&Guide> {
    guides.iter().fold(None, |best: Option<&Guide>, g| match best {
        Some(b) if b.efficiency >= g.efficiency => Some(b),
        _ => Some(g),
    })
}

/// Assemble the final summary for `plan` from analyzed guides
pub fn build_summary(plan: &PlanObject, guides: &[Guide]) -> FinalSummary {
    let recommended = recommended_guides(guides);
    let best = best_guide(&recommended)
        .cloned()
        .unwrap_or_else(Guide::placeholder);

    FinalSummary {
        plan: plan.clone(),
        total_guides: guides.len(),
        high_risk_guides: guides
            .iter()
            .filter(|g| g.offtarget_risk == OfftargetRisk::High)
            .cloned()
            .collect(),
        best_guide: best,
        protocol: protocol_text(plan, recommended.len()),
        risk_summary: risk_summary(guides),
        next_steps: next_steps(plan),
        recommended_guides: recommended,
    }
}

fn protocol_text(plan: &PlanObject, recommended: usize) -> String {
    format!(
        "CRISPR {edit} Protocol for {gene} in {cells}

1. Guide RNA Preparation:
   - Synthesize top {count} recommended guides
   - Clone into px458 vector with {nuclease}
   - Sequence verify all constructs

2. Cell Culture & Transfection:
   - Culture {cells} cells to 70% confluence
   - Transfect using Lipofectamine 3000
   - Select GFP+ cells by FACS after 48h

3. Analysis:
   - Extract genomic DNA after 72h
   - PCR amplify target region
   - Analyze by Sanger sequencing or NGS
   - Quantify editing efficiency using TIDE/ICE

4. Validation:
   - Confirm on-target editing by sequencing
   - Screen for off-target effects at predicted sites
   - Validate phenotype if applicable",
        edit = plan.edit_type,
        gene = plan.gene,
        cells = plan.cell_line,
        count = recommended.min(3),
        nuclease = plan.nuclease,
    )
}

fn risk_summary(guides: &[Guide]) -> String {
    let count = |tier: OfftargetRisk| guides.iter().filter(|g| g.offtarget_risk == tier).count();
    let (low, medium, high) = (
        count(OfftargetRisk::Low),
        count(OfftargetRisk::Medium),
        count(OfftargetRisk::High),
    );
    let verdict = if high > 0 {
        "Recommend experimental validation of off-target predictions."
    } else {
        "All guides show acceptable safety profiles."
    };
    format!(
        "Risk Assessment: {} low-risk, {} medium-risk, {} high-risk guides identified. {}",
        low, medium, high, verdict
    )
}

fn next_steps(plan: &PlanObject) -> Vec<String> {
    vec![
        "Order synthetic guide RNAs or cloning primers".to_string(),
        format!("Prepare {} cell culture", plan.cell_line),
        "Set up transfection optimization experiments".to_string(),
        "Design PCR primers for target amplification".to_string(),
        "Plan off-target validation experiments".to_string(),
    ]
}

pub struct Summarizer {
    notifier: Notifier,
}

impl Summarizer {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    /// Compile the final report
    ///
    /// Never fails; with no guides the best guide is [`Guide::placeholder`].
    pub async fn finalize_summary(&self, plan: &PlanObject, guides: &[Guide]) -> FinalSummary {
        let result: Result<FinalSummary, Infallible> = execute_step(
            &self.notifier,
            AGENT_NAME,
            "Compiling final report and generating experimental protocol...",
            || async {
                let summary = build_summary(plan, guides);
                let message = format!(
                    "Final report compiled. {} guides recommended for experimental validation. Protocol includes cloning primers, transfection conditions, and analysis methods.",
                    summary.recommended_guides.len()
                );
                Ok((summary, message))
            },
        )
        .await;

        match result {
            Ok(summary) => summary,
            Err(never) => match never {},
        }
    }
}
