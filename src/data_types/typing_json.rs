
use serde::Serialize;
use std::collections::BTreeMap;

use crate::data_types::diplotype::Diplotype;
use crate::kir::combined::{CombinedAnalysis, DiscriminantPosition};
use crate::reference::panel::ReferencePanel;
use crate::typer::{AccumulationSummary, TypingOutcome};

/// Intended to be serialized to JSON as the final result
#[derive(Debug, Serialize)]
pub struct KirTyperJson {
    /// Version of the tool that generated the calls
    kirtyper_version: String,
    /// Summary of the reference panel that was typed against
    reference_summary: ReferenceSummary,
    /// What happened to each alignment record
    read_summary: AccumulationSummary,
    /// Number of exon positions without any evidence
    undefined_positions: usize,
    /// Output of the per-position allele elimination
    progressive_analysis: ProgressiveDetails,
    /// Output of the genotype combination matching
    combined_analysis: CombinedDetails
}

impl KirTyperJson {
    /// Bundles a typing outcome for serialization
    /// # Arguments
    /// * `panel` - the panel used for typing
    /// * `outcome` - the full typing result
    pub fn new(panel: &ReferencePanel, outcome: &TypingOutcome) -> Self {
        let progressive = outcome.progressive();
        Self {
            kirtyper_version: crate::cli::core::FULL_VERSION.to_string(),
            reference_summary: ReferenceSummary::new(panel),
            read_summary: outcome.summary().clone(),
            undefined_positions: outcome.proportions().num_undefined(),
            progressive_analysis: ProgressiveDetails {
                proportion_threshold: progressive.proportion_threshold(),
                result_alleles: progressive.result_alleles().clone(),
                exon_identical_alleles: progressive.exon_identical_alleles().clone(),
                eliminated_alleles: progressive.eliminated_alleles().clone()
            },
            combined_analysis: CombinedDetails::new(outcome.combined())
        }
    }

    pub fn progressive_analysis(&self) -> &ProgressiveDetails {
        &self.progressive_analysis
    }

    pub fn combined_analysis(&self) -> &CombinedDetails {
        &self.combined_analysis
    }
}

/// High level shape of the reference panel
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceSummary {
    /// number of alleles in the panel
    num_alleles: usize,
    /// locus -> number of alleles
    locus_alleles: BTreeMap<String, usize>,
    /// length of the shared coordinate space
    reference_length: usize,
    /// number of exon positions examined
    exon_positions: usize
}

impl ReferenceSummary {
    pub fn new(panel: &ReferencePanel) -> Self {
        Self {
            num_alleles: panel.len(),
            locus_alleles: panel.loci().into_iter()
                .map(|(locus, alleles)| (locus, alleles.len()))
                .collect(),
            reference_length: panel.layout().reference_len(),
            exon_positions: panel.layout().exon_len()
        }
    }
}

/// Serialized view of the progressive analysis
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressiveDetails {
    proportion_threshold: f64,
    result_alleles: BTreeMap<String, Vec<String>>,
    exon_identical_alleles: BTreeMap<String, BTreeMap<String, String>>,
    eliminated_alleles: BTreeMap<String, usize>
}

impl ProgressiveDetails {
    pub fn result_alleles(&self) -> &BTreeMap<String, Vec<String>> {
        &self.result_alleles
    }
}

/// Serialized view of the combined analysis; a single combination is a list of per-locus diplotypes
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinedDetails {
    /// False when no discriminant position had observed symbols
    applicable: bool,
    /// The loci in combination order
    loci: Vec<String>,
    /// Total combinations considered
    universe_size: usize,
    /// Combinations consistent with every discriminant position
    typing_result: Option<Vec<Vec<Diplotype>>>,
    /// Fraction of the universe that was typed
    typed_ratio: Option<f64>,
    /// Locus -> alleles appearing in any typed combination
    result_alleles: Option<BTreeMap<String, Vec<String>>>,
    /// Every discriminant position with its match count
    discriminant_positions: Vec<DiscriminantPosition>,
    /// Discriminant positions skipped for lack of observed symbols
    uninformative_positions: Vec<usize>
}

impl CombinedDetails {
    pub fn new(combined: &CombinedAnalysis) -> Self {
        let typing_result: Option<Vec<Vec<Diplotype>>> = combined.typing_result()
            .map(|combinations| {
                combinations.iter()
                    .map(|c| c.diplotypes().to_vec())
                    .collect()
            });
        let typed_ratio = match typing_result.as_ref() {
            Some(tr) if combined.universe_size() > 0 => Some(tr.len() as f64 / combined.universe_size() as f64),
            _ => None
        };
        Self {
            applicable: combined.is_applicable(),
            loci: combined.loci().to_vec(),
            universe_size: combined.universe_size(),
            typing_result,
            typed_ratio,
            result_alleles: combined.result_alleles().cloned(),
            discriminant_positions: combined.discriminant_positions().to_vec(),
            uninformative_positions: combined.uninformative_positions().to_vec()
        }
    }

    pub fn applicable(&self) -> bool {
        self.applicable
    }

    pub fn typing_result(&self) -> Option<&[Vec<Diplotype>]> {
        self.typing_result.as_deref()
    }

    pub fn typed_ratio(&self) -> Option<f64> {
        self.typed_ratio
    }
}
