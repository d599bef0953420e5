//! Planner agent: turns a free-text request into a [`PlanObject`].
//!
//! The language model is asked first. Any failure there (transport, bad
//! JSON, missing fields) falls back to keyword extraction, so planning
//! itself never fails.

use crispr_pipeline_sdk::Notifier;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

use crate::completion::{CompletionRequest, CompletionService};
use crate::error::AgentError;
use crate::pipeline_utils::json::parse_json;
use crate::pipeline_utils::task::execute_step;
use crate::types::PlanObject;

pub const AGENT_NAME: &str = "PlannerAgent";

/// Confidence reported when the model omits one, and for keyword plans
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

const PLANNER_TEMPERATURE: f32 = 0.1;
const PLANNER_MAX_TOKENS: u32 = 300;

const PLANNER_SYSTEM_PROMPT: &str = r#"You are a PhD-level molecular biologist specializing in CRISPR genome editing. You have deep expertise in:
- Cas protein engineering and PAM requirements
- Off-target prediction (CFD, MIT and CRISPOR scoring)
- Cell-type specific editing efficiency

Parse the user's request for a CRISPR experiment.

Guidelines:
1. Gene: use the HGNC symbol (p53 -> TP53, BRCA -> BRCA1).
2. Region: name the exon, domain or regulatory element targeted.
3. Cell line: match the cell line to the experimental goal.
4. Nuclease: consider PAM availability and specificity.

Defaults when the request is silent:
- gene: TP53
- region: Exon 4
- editType: Knockout
- cellLine: HEK293
- nuclease: SpCas9

Output format:
{
  "gene": "GENE_SYMBOL",
  "region": "Target Region",
  "editType": "Edit Type",
  "cellLine": "Cell Line",
  "nuclease": "Nuclease",
  "confidence": 0.95,
  "scientificRationale": "Brief scientific justification"
}

Return ONLY the JSON object. No markdown, no explanations."#;

/// Plan as returned by the model, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    gene: Option<String>,
    region: Option<String>,
    edit_type: Option<String>,
    cell_line: Option<String>,
    nuclease: Option<String>,
    confidence: Option<f64>,
    #[serde(alias = "rationale")]
    scientific_rationale: Option<String>,
}

impl RawPlan {
    fn validate(self) -> Result<PlanObject, AgentError> {
        fn required(field: &str, value: Option<String>) -> Result<String, AgentError> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AgentError::InvalidPlan(format!("missing field `{}`", field)))
        }

        let confidence = self
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        Ok(PlanObject {
            gene: required("gene", self.gene)?,
            region: required("region", self.region)?,
            edit_type: required("editType", self.edit_type)?,
            cell_line: required("cellLine", self.cell_line)?,
            nuclease: required("nuclease", self.nuclease)?,
            confidence,
            rationale: self.scientific_rationale.filter(|r| !r.trim().is_empty()),
        })
    }
}

pub struct PlannerAgent {
    llm: Arc<dyn CompletionService>,
    notifier: Notifier,
}

impl PlannerAgent {
    pub fn new(llm: Arc<dyn CompletionService>, notifier: Notifier) -> Self {
        Self { llm, notifier }
    }

    /// Produce a plan for `prompt`
    pub async fn parse_prompt(&self, prompt: &str) -> PlanObject {
        let result: Result<PlanObject, Infallible> = execute_step(
            &self.notifier,
            AGENT_NAME,
            "Parsing experiment request: identifying target gene, region, edit type and delivery context...",
            || async {
                let (plan, note) = match self.parse_with_llm(prompt).await {
                    Ok(plan) => (plan, String::new()),
                    Err(e) => {
                        tracing::warn!(error = %e, "plan parsing via language model failed, using keyword extraction");
                        (
                            keyword_plan(prompt),
                            format!("Language model parsing unavailable ({}); used keyword extraction. ", e),
                        )
                    }
                };
                let summary = format!("{}{}", note, describe_plan(&plan));
                Ok((plan, summary))
            },
        )
        .await;

        match result {
            Ok(plan) => plan,
            Err(never) => match never {},
        }
    }

    async fn parse_with_llm(&self, prompt: &str) -> Result<PlanObject, AgentError> {
        let request = CompletionRequest::new(
            PLANNER_SYSTEM_PROMPT,
            prompt,
            PLANNER_TEMPERATURE,
            PLANNER_MAX_TOKENS,
        );
        let content = self.llm.complete(request).await?;
        let raw: RawPlan = parse_json(&content)?;
        raw.validate()
    }
}

/// Human-readable summary of a plan
pub fn describe_plan(plan: &PlanObject) -> String {
    let rationale = plan
        .rationale
        .as_deref()
        .map(|r| format!("{} ", r))
        .unwrap_or_default();
    format!(
        "Parsed intent: {} of {} {}. {}Confidence: {:.0}%.",
        plan.edit_type,
        plan.gene,
        plan.region,
        rationale,
        plan.confidence * 100.0
    )
}

/// Deterministic plan from keyword matching on the lowercased prompt
pub fn keyword_plan(prompt: &str) -> PlanObject {
    let text = prompt.to_lowercase();

    PlanObject {
        gene: extract_gene(&text).to_string(),
        region: extract_region(&text).to_string(),
        edit_type: extract_edit_type(&text).to_string(),
        cell_line: extract_cell_line(&text).to_string(),
        nuclease: extract_nuclease(&text).to_string(),
        confidence: DEFAULT_CONFIDENCE,
        rationale: None,
    }
}

fn extract_gene(text: &str) -> &'static str {
    if text.contains("tp53") {
        "TP53"
    } else if text.contains("brca1") {
        "BRCA1"
    } else if text.contains("cftr") {
        "CFTR"
    } else if text.contains("hexa") {
        "HEXA"
    } else {
        "TP53"
    }
}

fn extract_region(text: &str) -> &'static str {
    if text.contains("exon 3") {
        "Exon 3"
    } else if text.contains("exon 4") {
        "Exon 4"
    } else if text.contains("promoter") {
        "Promoter"
    } else if text.contains("f508del") {
        "F508del"
    } else {
        "Exon 3"
    }
}

fn extract_edit_type(text: &str) -> &'static str {
    if text.contains("knock out") || text.contains("knockout") {
        "Knockout"
    } else if text.contains("crispri") {
        "CRISPRi"
    } else if text.contains("base edit") {
        "Base Editing"
    } else if text.contains("prime edit") {
        "Prime Editing"
    } else {
        "Knockout"
    }
}

fn extract_cell_line(text: &str) -> &'static str {
    if text.contains("hek293") {
        "HEK293"
    } else if text.contains("hela") {
        "HeLa"
    } else if text.contains("k562") {
        "K562"
    } else {
        "HEK293"
    }
}

fn extract_nuclease(text: &str) -> &'static str {
    if text.contains("spcas9") || text.contains("cas9") {
        "SpCas9"
    } else if text.contains("cas12") {
        "Cas12a"
    } else if text.contains("base editor") {
        "BE4max"
    } else {
        "SpCas9"
    }
}
