//! Built-in gene reference used by the guide designer.
//!
//! Coordinates are demonstration values relative to each record's
//! accession, not a genome assembly.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exon {
    pub name: &'static str,
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneRecord {
    pub symbol: &'static str,
    pub accession: &'static str,
    pub exons: &'static [Exon],
}

impl GeneRecord {
    pub fn exon(&self, name: &str) -> Option<&'static Exon> {
        self.exons.iter().find(|exon| exon.name == name)
    }

    /// Exon guides are designed against
    ///
    /// TP53 uses exon 4, where real guide sequences are known. Other genes
    /// use exon 3 when present, else their first exon.
    pub fn design_exon(&self) -> &'static Exon {
        let preferred = if self.symbol == "TP53" { "exon4" } else { "exon3" };
        // Every record in GENES has at least one exon
        self.exon(preferred).unwrap_or(&self.exons[0])
    }
}

const TP53_EXONS: &[Exon] = &[
    Exon { name: "exon2", start: 11_689, end: 11_790 },
    Exon { name: "exon3", start: 11_951, end: 11_972 },
    Exon { name: "exon4", start: 12_024, end: 12_302 },
    Exon { name: "exon5", start: 13_040, end: 13_223 },
];

const BRCA1_EXONS: &[Exon] = &[
    Exon { name: "exon2", start: 1_018, end: 1_096 },
    Exon { name: "exon3", start: 1_530, end: 1_583 },
    Exon { name: "exon5", start: 2_190, end: 2_268 },
];

const CFTR_EXONS: &[Exon] = &[
    Exon { name: "exon10", start: 88_790, end: 88_982 },
    Exon { name: "exon11", start: 98_850, end: 98_944 },
];

const HEXA_EXONS: &[Exon] = &[
    Exon { name: "exon1", start: 5_040, end: 5_200 },
    Exon { name: "exon11", start: 31_680, end: 31_804 },
];

pub const GENES: &[GeneRecord] = &[
    GeneRecord { symbol: "TP53", accession: "M13114.1", exons: TP53_EXONS },
    GeneRecord { symbol: "BRCA1", accession: "NG_005905.2", exons: BRCA1_EXONS },
    GeneRecord { symbol: "CFTR", accession: "NG_016465.4", exons: CFTR_EXONS },
    GeneRecord { symbol: "HEXA", accession: "NG_009017.1", exons: HEXA_EXONS },
];

/// Look up a gene by symbol, case-insensitively
pub fn lookup(symbol: &str) -> Option<&'static GeneRecord> {
    let symbol = symbol.trim();
    GENES.iter().find(|gene| gene.symbol.eq_ignore_ascii_case(symbol))
}
