
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use simple_error::{bail, SimpleError};
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::diplotype::Diplotype;
use crate::data_types::symbol::SymbolSet;
use crate::evidence::proportions::ProportionTable;
use crate::kir::progressive::ProgressiveAnalysis;
use crate::reference::panel::ReferencePanel;

/// One candidate diploid assignment: an allele pair for every detected locus, in locus order
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct GenotypeCombination {
    diplotypes: Vec<Diplotype>
}

impl GenotypeCombination {
    pub fn diplotypes(&self) -> &[Diplotype] {
        &self.diplotypes
    }

    /// Iterates every allele in the combination, repeats included
    pub fn alleles(&self) -> impl Iterator<Item = &str> {
        self.diplotypes.iter().flat_map(|d| d.alleles())
    }
}

impl std::fmt::Display for GenotypeCombination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diplotypes.iter().map(|d| d.diplotype()).join("+"))
    }
}

/// The universe of genotype combinations: per locus, every 2-combination-with-repetition of its alleles,
/// crossed over all loci. Combinations are addressed by index with the first locus as the most significant digit,
/// so the universe is never materialized.
#[derive(Clone, Debug)]
pub struct CombinationUniverse {
    /// locus names in typing order
    loci: Vec<String>,
    /// per locus, the candidate allele IDs
    alleles: Vec<Vec<String>>,
    /// per locus, every unordered allele index pair, self-pairs included
    pairs: Vec<Vec<(usize, usize)>>,
    /// total number of combinations; 0 if any locus is empty or there are no loci
    size: usize
}

impl CombinationUniverse {
    /// Builds the universe from the surviving alleles of each locus.
    /// # Arguments
    /// * `result_alleles` - locus -> candidate allele IDs
    /// # Errors
    /// * if the number of combinations does not fit in memory addressing
    pub fn new(result_alleles: &BTreeMap<String, Vec<String>>) -> Result<CombinationUniverse, SimpleError> {
        let mut loci = vec![];
        let mut alleles = vec![];
        let mut pairs = vec![];
        let mut size: usize = if result_alleles.is_empty() { 0 } else { 1 };
        for (locus, locus_alleles) in result_alleles.iter() {
            let locus_pairs: Vec<(usize, usize)> = (0..locus_alleles.len())
                .combinations_with_replacement(2)
                .map(|p| (p[0], p[1]))
                .collect();
            debug!("{locus}: {} alleles, {} allele pairs", locus_alleles.len(), locus_pairs.len());
            size = match size.checked_mul(locus_pairs.len()) {
                Some(s) => s,
                None => bail!("Genotype combination universe is too large to enumerate")
            };
            loci.push(locus.clone());
            alleles.push(locus_alleles.clone());
            pairs.push(locus_pairs);
        }

        Ok(CombinationUniverse {
            loci,
            alleles,
            pairs,
            size
        })
    }

    pub fn loci(&self) -> &[String] {
        &self.loci
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Decodes a combination index into one pair index per locus
    fn pair_indices(&self, mut index: usize) -> Vec<usize> {
        let mut ret = vec![0; self.pairs.len()];
        for (locus_index, locus_pairs) in self.pairs.iter().enumerate().rev() {
            ret[locus_index] = index % locus_pairs.len();
            index /= locus_pairs.len();
        }
        ret
    }

    /// Converts a combination index into named allele pairs
    pub fn combination(&self, index: usize) -> GenotypeCombination {
        let diplotypes = self.pair_indices(index).into_iter()
            .enumerate()
            .map(|(locus_index, pair_index)| {
                let (a1, a2) = self.pairs[locus_index][pair_index];
                let locus_alleles = &self.alleles[locus_index];
                Diplotype::new(&locus_alleles[a1], &locus_alleles[a2])
            })
            .collect();
        GenotypeCombination { diplotypes }
    }

    /// Returns the indices of every combination whose alleles jointly carry all of the present symbols at one position.
    /// # Arguments
    /// * `locus_symbols` - per locus, per allele, the symbol at this position
    /// * `present` - observed symbols at this position, gaps excluded
    fn matching_combinations(&self, locus_symbols: &[Vec<u8>], present: SymbolSet) -> Vec<usize> {
        // the symbols covered by each allele pair only depend on the locus
        let pair_covers: Vec<Vec<SymbolSet>> = self.pairs.iter()
            .zip(locus_symbols.iter())
            .map(|(locus_pairs, symbols)| {
                locus_pairs.iter()
                    .map(|&(a1, a2)| {
                        let mut covered = SymbolSet::new();
                        covered.insert_byte(symbols[a1]);
                        covered.insert_byte(symbols[a2]);
                        covered
                    })
                    .collect()
            })
            .collect();

        (0..self.size)
            .filter(|&index| present.is_subset(&covered_symbols(index, &pair_covers)))
            .collect()
    }
}

/// Unions the pair covers of every locus while decoding a combination index, last locus least significant
fn covered_symbols(mut index: usize, pair_covers: &[Vec<SymbolSet>]) -> SymbolSet {
    let mut covered = SymbolSet::new();
    for locus_covers in pair_covers.iter().rev() {
        covered = covered.union(&locus_covers[index % locus_covers.len()]);
        index /= locus_covers.len();
    }
    covered
}

/// Matching details for a single discriminant position
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiscriminantPosition {
    /// the exon position
    position: usize,
    /// the observed non-gap symbols
    present_symbols: SymbolSet,
    /// the number of combinations explaining every observed symbol
    num_matching: usize
}

impl DiscriminantPosition {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn present_symbols(&self) -> SymbolSet {
        self.present_symbols
    }

    pub fn num_matching(&self) -> usize {
        self.num_matching
    }
}

/// Result of intersecting genotype combinations that explain every discriminant position
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinedAnalysis {
    /// the loci that were combined, in order
    loci: Vec<String>,
    /// total number of genotype combinations considered
    universe_size: usize,
    /// every discriminant position with observed symbols, with its match count
    discriminant_positions: Vec<DiscriminantPosition>,
    /// discriminant positions skipped because no non-gap symbol was observed there
    uninformative_positions: Vec<usize>,
    /// combinations matching every informative discriminant position; None if there was none
    typing_result: Option<Vec<GenotypeCombination>>,
    /// locus -> every allele appearing in the typing result; None if not applicable
    result_alleles: Option<BTreeMap<String, Vec<String>>>
}

impl CombinedAnalysis {
    /// Runs the combined analysis over the alleles that survived the progressive filter.
    /// # Arguments
    /// * `progressive` - the progressive analysis result, also provides the present-symbol threshold
    /// * `proportions` - the per-position symbol percentages
    /// * `panel` - the reference panel for allele sequences
    /// # Errors
    /// * if a surviving allele is not in the panel
    /// * if the combination universe cannot be addressed
    pub fn run(progressive: &ProgressiveAnalysis, proportions: &ProportionTable, panel: &ReferencePanel) -> Result<CombinedAnalysis, SimpleError> {
        let universe = CombinationUniverse::new(progressive.result_alleles())?;
        info!("Genotype combination universe: {} combinations over {} loci", universe.len(), universe.loci().len());
        if universe.is_empty() {
            warn!("No genotype combinations can be formed from the progressive analysis results");
        }

        // coding sequences: locus -> allele -> symbol at each examined position
        let positions: Vec<usize> = proportions.positions().collect();
        let mut coding_sequences: Vec<Vec<Vec<u8>>> = Vec::with_capacity(universe.alleles.len());
        for locus_alleles in universe.alleles.iter() {
            let mut locus_sequences = Vec::with_capacity(locus_alleles.len());
            for allele_id in locus_alleles.iter() {
                let allele = match panel.get(allele_id) {
                    Some(a) => a,
                    None => bail!("Allele {allele_id} is not in the reference panel")
                };
                let coding: Vec<u8> = positions.iter()
                    .map(|&p| allele.nucleotide(p).unwrap_or(b'N'))
                    .collect();
                locus_sequences.push(coding);
            }
            coding_sequences.push(locus_sequences);
        }

        // a position is discriminant if the candidates of any locus disagree there
        let discriminant: Vec<usize> = (0..positions.len())
            .filter(|&i| is_discriminant(&coding_sequences, i))
            .collect();
        info!("Found {} discriminant positions out of {} examined", discriminant.len(), positions.len());

        // positions without an observed non-gap symbol constrain nothing
        let threshold = progressive.proportion_threshold();
        let (informative, uninformative): (Vec<(usize, SymbolSet)>, Vec<(usize, SymbolSet)>) = discriminant.iter()
            .map(|&i| {
                let present = proportions.get(positions[i])
                    .map(|pp| pp.present_symbols(threshold).without_gap())
                    .unwrap_or_default();
                (i, present)
            })
            .partition(|(_i, present)| !present.is_empty());
        let uninformative_positions: Vec<usize> = uninformative.into_iter()
            .map(|(i, _present)| positions[i])
            .collect();
        if !uninformative_positions.is_empty() {
            warn!("Skipping {} discriminant positions without observed symbols", uninformative_positions.len());
        }

        // each worker folds its positions into one running intersection
        let (mut discriminant_positions, typed_indices): (Vec<DiscriminantPosition>, Option<Vec<usize>>) = informative.par_iter()
            .map(|&(i, present)| {
                let locus_symbols: Vec<Vec<u8>> = coding_sequences.iter()
                    .map(|locus_sequences| locus_sequences.iter().map(|s| s[i]).collect())
                    .collect();
                let matching = universe.matching_combinations(&locus_symbols, present);
                let details = DiscriminantPosition {
                    position: positions[i],
                    present_symbols: present,
                    num_matching: matching.len()
                };
                (details, matching)
            })
            .fold(
                || (Vec::new(), None),
                |(mut all_details, running), (details, matching)| {
                    all_details.push(details);
                    (all_details, Some(intersect_matches(running, matching)))
                }
            )
            .reduce(
                || (Vec::new(), None),
                |(mut details1, running1), (details2, running2)| {
                    details1.extend(details2);
                    let running = match (running1, running2) {
                        (Some(r1), Some(r2)) => Some(intersect_matches(Some(r1), r2)),
                        (r1, None) => r1,
                        (None, r2) => r2
                    };
                    (details1, running)
                }
            );
        discriminant_positions.sort_by_key(|d: &DiscriminantPosition| d.position);
        for details in discriminant_positions.iter() {
            debug!("Position {}: [{}] matched by {} combinations", details.position, details.present_symbols, details.num_matching);
        }

        let (typing_result, result_alleles) = match typed_indices {
            Some(indices) => {
                info!("{} genotype combinations match the alignment data, out of {}", indices.len(), universe.len());
                let combinations: Vec<GenotypeCombination> = indices.into_iter()
                    .map(|index| universe.combination(index))
                    .collect();
                let alleles = regroup_alleles(&universe, &combinations);
                (Some(combinations), Some(alleles))
            },
            None => {
                warn!("Combined analysis not applicable, no informative discriminant positions");
                (None, None)
            }
        };

        Ok(CombinedAnalysis {
            loci: universe.loci().to_vec(),
            universe_size: universe.len(),
            discriminant_positions,
            uninformative_positions,
            typing_result,
            result_alleles
        })
    }

    // getters
    pub fn loci(&self) -> &[String] {
        &self.loci
    }

    pub fn universe_size(&self) -> usize {
        self.universe_size
    }

    pub fn discriminant_positions(&self) -> &[DiscriminantPosition] {
        &self.discriminant_positions
    }

    pub fn uninformative_positions(&self) -> &[usize] {
        &self.uninformative_positions
    }

    pub fn typing_result(&self) -> Option<&[GenotypeCombination]> {
        self.typing_result.as_deref()
    }

    pub fn result_alleles(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.result_alleles.as_ref()
    }

    pub fn is_applicable(&self) -> bool {
        self.typing_result.is_some()
    }
}

/// Checks whether any locus has more than one distinct symbol among its candidates at a position index
/// # Arguments
/// * `coding_sequences` - locus -> allele -> symbol per examined position
/// * `index` - the index into the examined positions
fn is_discriminant(coding_sequences: &[Vec<Vec<u8>>], index: usize) -> bool {
    coding_sequences.iter()
        .any(|locus_sequences| {
            !locus_sequences.iter()
                .map(|s| s[index])
                .all_equal()
        })
}

/// Narrows a running intersection of matching combination indices with one more position's matches.
/// Both lists are sorted ascending; a running value of None means no position has been applied yet.
pub fn intersect_matches(running: Option<Vec<usize>>, matching: Vec<usize>) -> Vec<usize> {
    match running {
        None => matching,
        Some(mut result) => {
            result.retain(|index| matching.binary_search(index).is_ok());
            result
        }
    }
}

/// Collects every allele named in the typed combinations, grouped by locus and sorted
fn regroup_alleles(universe: &CombinationUniverse, combinations: &[GenotypeCombination]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, BTreeSet<String>> = Default::default();
    for combination in combinations.iter() {
        for (locus, diplotype) in universe.loci().iter().zip(combination.diplotypes().iter()) {
            let entry = grouped.entry(locus.clone()).or_default();
            for allele in diplotype.alleles() {
                entry.insert(allele.to_string());
            }
        }
    }
    grouped.into_iter()
        .map(|(locus, alleles)| (locus, alleles.into_iter().collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::evidence::proportions::PositionProportions;
    use crate::kir::progressive::DEFAULT_PROPORTION_THRESHOLD;
    use crate::reference::regions::RegionLayout;
    use crate::reference::typing_config::TypingOptions;

    /// Builds a panel where position 0 is intronic and every later position is one exon
    fn build_panel(alleles: &[(&str, &str)]) -> ReferencePanel {
        let length = alleles[0].1.len();
        let layout = RegionLayout::from_region_lengths(&[1, length - 1]).unwrap();
        let allele_vec = alleles.iter()
            .map(|(id, seq)| (id.to_string(), seq.as_bytes().to_vec()))
            .collect();
        ReferencePanel::new(allele_vec, layout, &TypingOptions::default().locus_aliases).unwrap()
    }

    fn table(entries: &[(usize, [u64; 5])]) -> ProportionTable {
        entries.iter()
            .map(|(p, counts)| (*p, PositionProportions::from_counts(counts)))
            .collect()
    }

    fn run_both(panel: &ReferencePanel, proportions: &ProportionTable) -> (ProgressiveAnalysis, CombinedAnalysis) {
        let progressive = ProgressiveAnalysis::run(proportions, panel, &TypingOptions::default(), DEFAULT_PROPORTION_THRESHOLD);
        let combined = CombinedAnalysis::run(&progressive, proportions, panel).unwrap();
        (progressive, combined)
    }

    fn labels(combined: &CombinedAnalysis) -> Vec<String> {
        combined.typing_result().unwrap().iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_universe() {
        let mut result_alleles: BTreeMap<String, Vec<String>> = BTreeMap::new();
        result_alleles.insert("G1".to_string(), vec!["G1*001".to_string(), "G1*002".to_string(), "G1*003".to_string()]);
        result_alleles.insert("G2".to_string(), vec!["G2*001".to_string(), "G2*002".to_string()]);
        let universe = CombinationUniverse::new(&result_alleles).unwrap();
        // 6 pairs * 3 pairs
        assert_eq!(universe.len(), 18);
        assert_eq!(universe.combination(0).to_string(), "G1*001/G1*001+G2*001/G2*001");
        assert_eq!(universe.combination(1).to_string(), "G1*001/G1*001+G2*001/G2*002");
        assert_eq!(universe.combination(17).to_string(), "G1*003/G1*003+G2*002/G2*002");

        // every combination is unique
        let unique: BTreeSet<GenotypeCombination> = (0..universe.len()).map(|i| universe.combination(i)).collect();
        assert_eq!(unique.len(), 18);
    }

    #[test]
    fn test_empty_universe() {
        let universe = CombinationUniverse::new(&BTreeMap::new()).unwrap();
        assert!(universe.is_empty());

        let mut result_alleles: BTreeMap<String, Vec<String>> = BTreeMap::new();
        result_alleles.insert("G1".to_string(), vec!["G1*001".to_string()]);
        result_alleles.insert("G2".to_string(), vec![]);
        let universe = CombinationUniverse::new(&result_alleles).unwrap();
        assert!(universe.is_empty());
    }

    #[test]
    fn test_two_allele_scenario() {
        let panel = build_panel(&[("G1*001", "AC"), ("G1*002", "AG")]);
        let proportions = table(&[(1, [0, 0, 10, 90, 0])]);
        let (progressive, combined) = run_both(&panel, &proportions);
        assert_eq!(progressive.result_alleles()["G1"].len(), 2);
        assert_eq!(combined.universe_size(), 3);
        assert_eq!(combined.discriminant_positions().len(), 1);
        assert_eq!(combined.discriminant_positions()[0].num_matching(), 1);
        assert_eq!(labels(&combined), vec!["G1*001/G1*002".to_string()]);
        assert_eq!(combined.result_alleles().unwrap()["G1"], vec!["G1*001".to_string(), "G1*002".to_string()]);
    }

    #[test]
    fn test_homozygous_call() {
        // only C observed, G1*002 is eliminated and nothing is discriminant
        let panel = build_panel(&[("G1*001", "ACA"), ("G1*002", "AGA"), ("G1*003", "ACT")]);
        let proportions = table(&[(1, [0, 0, 0, 100, 0]), (2, [100, 0, 0, 0, 0])]);
        let (progressive, combined) = run_both(&panel, &proportions);
        assert_eq!(progressive.result_alleles()["G1"], vec!["G1*001".to_string()]);
        assert_eq!(combined.universe_size(), 1);
        assert!(!combined.is_applicable());
        assert!(combined.typing_result().is_none());
        assert!(combined.result_alleles().is_none());
    }

    #[test]
    fn test_multiple_loci() {
        let panel = build_panel(&[
            ("G1*001", "ACT"), ("G1*002", "AGT"),
            ("G2*001", "ACA"), ("G2*002", "ACT")
        ]);
        // position 1: C and G; position 2: A and T
        let proportions = table(&[(1, [0, 0, 50, 50, 0]), (2, [40, 60, 0, 0, 0])]);
        let (_progressive, combined) = run_both(&panel, &proportions);
        assert_eq!(combined.loci(), &["G1".to_string(), "G2".to_string()]);
        assert_eq!(combined.universe_size(), 9);
        assert_eq!(combined.discriminant_positions().len(), 2);

        // position 1 needs G1*002 (only G carrier); C is covered by G2 or G1*001
        // position 2 needs G2*001 (only A carrier); T is covered by G1 or G2*002
        let typed = labels(&combined);
        assert_eq!(typed, vec![
            "G1*001/G1*002+G2*001/G2*001".to_string(),
            "G1*001/G1*002+G2*001/G2*002".to_string(),
            "G1*002/G1*002+G2*001/G2*001".to_string(),
            "G1*002/G1*002+G2*001/G2*002".to_string()
        ]);
        let alleles = combined.result_alleles().unwrap();
        assert_eq!(alleles["G1"], vec!["G1*001".to_string(), "G1*002".to_string()]);
        assert_eq!(alleles["G2"], vec!["G2*001".to_string(), "G2*002".to_string()]);
    }

    #[test]
    fn test_gap_not_required() {
        // observed gaps are not symbols a combination must explain
        let panel = build_panel(&[("G1*001", "AC"), ("G1*002", "A.")]);
        let proportions = table(&[(1, [0, 0, 0, 50, 50])]);
        let (_progressive, combined) = run_both(&panel, &proportions);
        assert_eq!(combined.universe_size(), 3);
        assert_eq!(combined.discriminant_positions()[0].present_symbols().to_string(), "C");
        assert_eq!(labels(&combined), vec![
            "G1*001/G1*001".to_string(),
            "G1*001/G1*002".to_string()
        ]);
    }

    #[test]
    fn test_no_match() {
        // an allele set that cannot explain an observation gives an empty, but applicable, result
        let panel = build_panel(&[("G1*001", "ACC"), ("G1*002", "AGC"), ("G1*003", "AGT")]);
        let progressive = ProgressiveAnalysis::run(
            &table(&[(1, [0, 0, 50, 50, 0])]), &panel, &TypingOptions::default(), DEFAULT_PROPORTION_THRESHOLD
        );
        // evidence handed to the combined analysis demands A at position 2, which no allele carries
        let proportions = table(&[(1, [0, 0, 50, 50, 0]), (2, [50, 0, 0, 50, 0])]);
        let combined = CombinedAnalysis::run(&progressive, &proportions, &panel).unwrap();
        assert!(combined.is_applicable());
        assert!(combined.typing_result().unwrap().is_empty());
        assert!(combined.result_alleles().unwrap().is_empty());
    }

    #[test]
    fn test_retained_alleles_carry_present_symbols() {
        let panel = build_panel(&[
            ("G1*001", "ACTA"), ("G1*002", "AGTC"), ("G1*003", "AGAC"), ("G1*004", "AC.A")
        ]);
        let proportions = table(&[(1, [0, 0, 30, 70, 0]), (2, [0, 80, 0, 0, 20]), (3, [45, 0, 0, 55, 0])]);
        let (progressive, combined) = run_both(&panel, &proportions);
        assert!(combined.is_applicable());
        for alleles in progressive.result_alleles().values() {
            for allele_id in alleles.iter() {
                for details in combined.discriminant_positions() {
                    let position = details.position();
                    let present = proportions.get(position).unwrap().present_symbols(DEFAULT_PROPORTION_THRESHOLD);
                    let symbol = panel.nucleotide(allele_id, position).unwrap();
                    assert!(present.contains_byte(symbol), "{allele_id} at {position}");
                }
            }
        }
    }

    /// Folds every list, in order, into one intersection
    fn intersect_all(sets: &[Vec<usize>]) -> Option<Vec<usize>> {
        sets.iter().cloned().fold(None, |running, next| Some(intersect_matches(running, next)))
    }

    #[test]
    fn test_intersection_monotone() {
        let sets = vec![
            vec![0, 1, 2, 3, 5, 8],
            vec![1, 2, 3, 8, 9],
            vec![2, 3, 4, 8],
            vec![3, 8]
        ];
        assert_eq!(intersect_all(&[]), None);
        let mut previous: Option<Vec<usize>> = None;
        for count in 1..=sets.len() {
            let current = intersect_all(&sets[..count]).unwrap();
            if let Some(prev) = previous.as_ref() {
                assert!(current.iter().all(|i| prev.contains(i)));
                assert!(current.len() <= prev.len());
            }
            previous = Some(current);
        }
        assert_eq!(previous.unwrap(), vec![3, 8]);
    }

    #[test]
    fn test_position_order_irrelevant() {
        let sets = vec![
            vec![0, 2, 4, 6],
            vec![2, 3, 4],
            vec![1, 2, 4, 7]
        ];
        let reversed: Vec<Vec<usize>> = sets.iter().rev().cloned().collect();
        assert_eq!(intersect_all(&sets), intersect_all(&reversed));
        assert_eq!(intersect_all(&sets), Some(vec![2, 4]));

        // partial intersections can be merged in any grouping
        let left = intersect_all(&sets[..1]);
        let right = intersect_all(&sets[1..]).unwrap();
        assert_eq!(Some(intersect_matches(left, right)), intersect_all(&sets));
    }

    #[test]
    fn test_zero_evidence_not_applicable() {
        // the alleles differ at position 1, but nothing was observed there
        let panel = build_panel(&[("G1*001", "AC"), ("G1*002", "AG")]);
        let proportions = table(&[(1, [0, 0, 0, 0, 0])]);
        let (progressive, combined) = run_both(&panel, &proportions);
        assert_eq!(progressive.result_alleles()["G1"].len(), 2);
        assert_eq!(combined.universe_size(), 3);
        assert!(combined.discriminant_positions().is_empty());
        assert_eq!(combined.uninformative_positions(), &[1]);
        assert!(!combined.is_applicable());
        assert!(combined.result_alleles().is_none());

        // only gaps observed is just as uninformative
        let proportions = table(&[(1, [0, 0, 0, 0, 12])]);
        let combined = CombinedAnalysis::run(&progressive, &proportions, &panel).unwrap();
        assert_eq!(combined.uninformative_positions(), &[1]);
        assert!(!combined.is_applicable());
    }

    #[test]
    fn test_uninformative_position_ignored() {
        // position 2 has no evidence and must not widen or narrow the call from position 1
        let panel = build_panel(&[("G1*001", "ACT"), ("G1*002", "AGA")]);
        let proportions = table(&[(1, [0, 0, 10, 90, 0]), (2, [0, 0, 0, 0, 0])]);
        let (_progressive, combined) = run_both(&panel, &proportions);
        assert_eq!(combined.discriminant_positions().len(), 1);
        assert_eq!(combined.uninformative_positions(), &[2]);
        assert_eq!(labels(&combined), vec!["G1*001/G1*002".to_string()]);
    }

    #[test]
    fn test_matches_exhaustive_check() {
        // three loci of three alleles each, 216 combinations
        let panel = build_panel(&[
            ("G1*001", "AACGTAC"), ("G1*002", "AGCGTTC"), ("G1*003", "AACTTAG"),
            ("G2*001", "AACGAAC"), ("G2*002", "AACGCAC"), ("G2*003", "ATCGAAC"),
            ("G3*001", "AACGTAC"), ("G3*002", "AACGTAA"), ("G3*003", "AACCTAC")
        ]);
        // nothing is eliminated up front so every allele enters the universe
        let progressive = ProgressiveAnalysis::run(&table(&[]), &panel, &TypingOptions::default(), DEFAULT_PROPORTION_THRESHOLD);
        let proportions = table(&[
            (1, [50, 20, 30, 0, 0]),
            (2, [0, 0, 0, 100, 0]),
            (3, [0, 0, 70, 30, 0]),
            (4, [80, 0, 0, 20, 0]),
            (5, [0, 0, 0, 0, 0]),
            (6, [10, 0, 0, 90, 0])
        ]);
        let combined = CombinedAnalysis::run(&progressive, &proportions, &panel).unwrap();
        assert_eq!(combined.universe_size(), 216);
        let checked: Vec<usize> = combined.discriminant_positions().iter().map(|d| d.position()).collect();
        assert_eq!(checked, vec![1, 3, 4, 6]);
        assert_eq!(combined.uninformative_positions(), &[5]);

        // every combination checked directly against the allele sequences
        let universe = CombinationUniverse::new(progressive.result_alleles()).unwrap();
        let expected: Vec<GenotypeCombination> = (0..universe.len())
            .map(|index| universe.combination(index))
            .filter(|combination| {
                checked.iter().all(|&position| {
                    let present = proportions.get(position).unwrap()
                        .present_symbols(DEFAULT_PROPORTION_THRESHOLD)
                        .without_gap();
                    let mut covered = SymbolSet::new();
                    for allele_id in combination.alleles() {
                        covered.insert_byte(panel.nucleotide(allele_id, position).unwrap());
                    }
                    present.is_subset(&covered)
                })
            })
            .collect();
        assert_eq!(combined.typing_result().unwrap(), expected.as_slice());

        // G at 1 needs G1*002, T at 1 and A at 4 need G2*003, C at 4 needs G2*002, C at 3 and A at 6 need G3*002/G3*003
        assert_eq!(labels(&combined), vec![
            "G1*001/G1*002+G2*002/G2*003+G3*002/G3*003".to_string(),
            "G1*002/G1*002+G2*002/G2*003+G3*002/G3*003".to_string(),
            "G1*002/G1*003+G2*002/G2*003+G3*002/G3*003".to_string()
        ]);
    }
}
