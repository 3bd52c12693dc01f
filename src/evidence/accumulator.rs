
use log::trace;
use rustc_hash::FxHashMap as HashMap;
use simple_error::{bail, SimpleError};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::data_types::alignment_record::{AlignedRead, AlignmentRecord};
use crate::data_types::symbol::{Symbol, NUM_SYMBOLS, UNKNOWN_BYTE};
use crate::evidence::proportions::{PositionProportions, ProportionTable};
use crate::reference::regions::RegionLayout;

/// Tally of each symbol at one position, indexed by `Symbol::index()`
pub type SymbolCounts = [u64; NUM_SYMBOLS];

/// Per-exon-position symbol tallies across all recorded reads.
/// Mates of a pair never contribute twice to the same position.
#[derive(Clone, Debug, Default)]
pub struct EvidenceAccumulator {
    /// exon position -> symbol tallies; only exon positions are keys
    counts: BTreeMap<usize, SymbolCounts>,
    /// pairing ID -> the reference range recorded for the first-processed mate
    processed_pairs: HashMap<String, Range<usize>>
}

impl EvidenceAccumulator {
    /// Creates an empty table with a zero tally for every exon position in the layout
    pub fn new(layout: &RegionLayout) -> EvidenceAccumulator {
        let counts = layout.exon_positions()
            .map(|p| (p, [0; NUM_SYMBOLS]))
            .collect();
        EvidenceAccumulator {
            counts,
            processed_pairs: Default::default()
        }
    }

    /// Adds one reconstructed read to the tallies and returns the number of positions it contributed to.
    /// If the mate was already recorded, positions inside the mate's range are skipped.
    /// Unknown bases and positions outside the exons are also skipped.
    /// # Arguments
    /// * `record` - the raw record, used for the pairing ID
    /// * `aligned` - the read reconstructed onto reference coordinates
    pub fn record(&mut self, record: &AlignmentRecord, aligned: &AlignedRead) -> usize {
        let read_range = aligned.range();
        let excluded: Range<usize> = match self.processed_pairs.get(record.read_name()) {
            Some(mate_range) => {
                // only the shared part of the two ranges was already counted
                let start = read_range.start.max(mate_range.start);
                let end = read_range.end.min(mate_range.end);
                start..end.max(start)
            },
            None => {
                self.processed_pairs.insert(record.read_name().to_string(), read_range.clone());
                0..0
            }
        };
        trace!("Recording {} over {read_range:?}, mate overlap {excluded:?}", record.read_name());

        let mut contributions = 0;
        for (position, &base) in read_range.zip(aligned.sequence().iter()) {
            if base == UNKNOWN_BYTE || excluded.contains(&position) {
                continue;
            }
            let Some(tally) = self.counts.get_mut(&position) else {
                // not an exon position
                continue;
            };
            if let Some(symbol) = Symbol::from_byte(base) {
                tally[symbol.index()] += 1;
                contributions += 1;
            } else {
                trace!("Ignoring unexpected base {:?} in {} at {position}", base as char, record.read_name());
            }
        }
        contributions
    }

    /// Folds another accumulator built over the same layout into this one.
    /// Counts are summed; the pairing memo keeps whichever range was recorded here first.
    /// Both mates of a pair must have been given to the same accumulator for de-duplication to hold.
    /// # Errors
    /// * if the two accumulators do not cover the same exon positions
    pub fn merge(&mut self, other: EvidenceAccumulator) -> Result<(), SimpleError> {
        if self.counts.len() != other.counts.len() || !self.counts.keys().eq(other.counts.keys()) {
            bail!("Cannot merge evidence accumulators with different exon positions");
        }
        for (position, other_tally) in other.counts.into_iter() {
            // keys are verified above
            if let Some(tally) = self.counts.get_mut(&position) {
                for (count, other_count) in tally.iter_mut().zip(other_tally.iter()) {
                    *count += other_count;
                }
            }
        }
        for (read_name, range) in other.processed_pairs.into_iter() {
            self.processed_pairs.entry(read_name).or_insert(range);
        }
        Ok(())
    }

    /// Converts the tallies into per-position percentages.
    /// Positions without evidence are marked undefined.
    pub fn derive_proportions(&self) -> ProportionTable {
        self.counts.iter()
            .map(|(&position, tally)| (position, PositionProportions::from_counts(tally)))
            .collect()
    }

    // getters
    pub fn counts(&self) -> &BTreeMap<usize, SymbolCounts> {
        &self.counts
    }

    pub fn count(&self, position: usize) -> Option<&SymbolCounts> {
        self.counts.get(&position)
    }

    /// Number of distinct pairing IDs recorded so far
    pub fn num_pairs(&self) -> usize {
        self.processed_pairs.len()
    }
}
