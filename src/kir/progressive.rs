
use log::{debug, info, warn};
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::data_types::symbol::SymbolSet;
use crate::evidence::proportions::ProportionTable;
use crate::reference::loci::{allele_code, exon_signature};
use crate::reference::panel::ReferencePanel;
use crate::reference::typing_config::TypingOptions;

/// Default percentage a symbol must exceed to be considered present
pub const DEFAULT_PROPORTION_THRESHOLD: f64 = 5.0;

/// Result of eliminating reference alleles that disagree with the observed exon evidence
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressiveAnalysis {
    /// the percentage a symbol had to exceed to be present
    proportion_threshold: f64,
    /// locus -> surviving alleles after collapsing exon-identical ones, in panel order
    result_alleles: BTreeMap<String, Vec<String>>,
    /// locus -> collapsed allele -> the surviving allele that represents it
    exon_identical_alleles: BTreeMap<String, BTreeMap<String, String>>,
    /// eliminated allele -> first exon position where it disagreed with the evidence
    eliminated_alleles: BTreeMap<String, usize>
}

impl ProgressiveAnalysis {
    /// Runs the progressive filter over every examined exon position in ascending order.
    /// An allele is eliminated at the first position where its symbol is not present; eliminations are permanent.
    /// Positions without any present symbol (including those with no evidence) do not eliminate anything.
    /// # Arguments
    /// * `proportions` - the per-position symbol percentages
    /// * `panel` - the reference panel, all alleles start as candidates
    /// * `options` - allele naming rules for locus grouping and exon signatures
    /// * `proportion_threshold` - percentage a symbol must exceed to be present
    pub fn run(proportions: &ProportionTable, panel: &ReferencePanel, options: &TypingOptions, proportion_threshold: f64) -> ProgressiveAnalysis {
        let present_symbols = proportions.present_symbols(proportion_threshold);
        let initial: Vec<&str> = panel.alleles().iter()
            .map(|a| a.allele_id())
            .collect();

        let mut eliminated_alleles: BTreeMap<String, usize> = Default::default();
        let mut candidates = initial;
        for &(position, present) in present_symbols.iter() {
            let (kept, removed) = eliminate_at_position(&candidates, position, present, panel);
            for allele_id in removed.into_iter() {
                debug!("Eliminated {allele_id} at position {position}, present symbols: [{present}]");
                eliminated_alleles.insert(allele_id.to_string(), position);
            }
            candidates = kept;
        }
        info!("Progressive analysis retained {} of {} reference alleles", candidates.len(), panel.len());

        // partition the survivors by locus, panel order is preserved within each locus
        let mut by_locus: BTreeMap<String, Vec<String>> = Default::default();
        for allele_id in candidates.into_iter() {
            // candidates always come from the panel
            if let Some(allele) = panel.get(allele_id) {
                by_locus.entry(allele.locus().to_string()).or_default().push(allele_id.to_string());
            }
        }
        for locus in panel.loci().keys() {
            if !by_locus.contains_key(locus) {
                warn!("Every allele of {locus} was eliminated");
            }
        }

        let mut result_alleles: BTreeMap<String, Vec<String>> = Default::default();
        let mut exon_identical_alleles: BTreeMap<String, BTreeMap<String, String>> = Default::default();
        for (locus, alleles) in by_locus.into_iter() {
            let (representatives, collapsed) = collapse_exon_identical(alleles, options);
            for (allele_id, representative) in collapsed.iter() {
                debug!("{allele_id} is exon-identical to {representative}");
            }
            result_alleles.insert(locus.clone(), representatives);
            exon_identical_alleles.insert(locus, collapsed);
        }

        ProgressiveAnalysis {
            proportion_threshold,
            result_alleles,
            exon_identical_alleles,
            eliminated_alleles
        }
    }

    // getters
    pub fn proportion_threshold(&self) -> f64 {
        self.proportion_threshold
    }

    pub fn result_alleles(&self) -> &BTreeMap<String, Vec<String>> {
        &self.result_alleles
    }

    pub fn exon_identical_alleles(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.exon_identical_alleles
    }

    pub fn eliminated_alleles(&self) -> &BTreeMap<String, usize> {
        &self.eliminated_alleles
    }

    /// Loci with at least one surviving allele, in typing order
    pub fn detected_loci(&self) -> impl Iterator<Item = &str> {
        self.result_alleles.keys().map(|k| k.as_str())
    }
}

/// Splits candidates into those consistent with the present symbols at one position and those that are not.
/// A position without any present symbol keeps every candidate.
/// # Arguments
/// * `candidates` - the current candidate allele IDs
/// * `position` - the exon position being checked
/// * `present` - the symbols observed above threshold at this position
/// * `panel` - source of each allele's symbol at the position
pub fn eliminate_at_position<'a>(candidates: &[&'a str], position: usize, present: SymbolSet, panel: &ReferencePanel) -> (Vec<&'a str>, Vec<&'a str>) {
    if present.is_empty() {
        return (candidates.to_vec(), vec![]);
    }
    candidates.iter()
        .copied()
        .partition(|allele_id| {
            panel.nucleotide(allele_id, position)
                .map(|b| present.contains_byte(b))
                .unwrap_or(false)
        })
}

/// Collapses alleles that share an exon signature, keeping the first one seen.
/// Returns the representatives and a map of each collapsed allele to its representative.
/// # Arguments
/// * `alleles` - allele IDs of a single locus, in panel order
/// * `options` - exon signature rules
pub fn collapse_exon_identical(alleles: Vec<String>, options: &TypingOptions) -> (Vec<String>, BTreeMap<String, String>) {
    let mut signatures: HashMap<String, String> = Default::default();
    let mut representatives = vec![];
    let mut collapsed: BTreeMap<String, String> = Default::default();
    for allele_id in alleles.into_iter() {
        let signature = allele_code(&allele_id)
            .and_then(|code| exon_signature(code, options.signature_min_code_len, options.signature_len))
            .map(String::from);
        match signature {
            Some(sig) => {
                if let Some(representative) = signatures.get(&sig) {
                    collapsed.insert(allele_id, representative.clone());
                } else {
                    signatures.insert(sig, allele_id.clone());
                    representatives.push(allele_id);
                }
            },
            None => representatives.push(allele_id)
        };
    }
    (representatives, collapsed)
}
