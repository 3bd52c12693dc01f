
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use crate::data_types::symbol::{Symbol, SymbolSet, NUM_SYMBOLS};
use crate::evidence::accumulator::SymbolCounts;

/// Symbol percentages at a single position
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionProportions {
    /// percentages indexed by `Symbol::index()`, rounded to two decimals
    Defined([f64; NUM_SYMBOLS]),
    /// no evidence was tallied at this position
    Undefined
}

impl PositionProportions {
    /// Converts raw tallies into percentages rounded to two decimal places, exact ties go to the even digit
    pub fn from_counts(counts: &SymbolCounts) -> PositionProportions {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return PositionProportions::Undefined;
        }
        let mut percentages = [0.0; NUM_SYMBOLS];
        for (pct, &count) in percentages.iter_mut().zip(counts.iter()) {
            let raw = count as f64 / total as f64 * 100.0;
            *pct = (raw * 100.0).round_ties_even() / 100.0;
        }
        PositionProportions::Defined(percentages)
    }

    /// Returns the percentage for a symbol, None when the position is undefined
    pub fn proportion(&self, symbol: Symbol) -> Option<f64> {
        match self {
            PositionProportions::Defined(percentages) => Some(percentages[symbol.index()]),
            PositionProportions::Undefined => None
        }
    }

    /// The symbols whose percentage strictly exceeds the threshold.
    /// Undefined positions have no present symbols.
    /// # Arguments
    /// * `threshold` - percentage cutoff, e.g. 5.0
    pub fn present_symbols(&self, threshold: f64) -> SymbolSet {
        match self {
            PositionProportions::Defined(percentages) => {
                Symbol::iter()
                    .filter(|s| percentages[s.index()] > threshold)
                    .collect()
            },
            PositionProportions::Undefined => SymbolSet::new()
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, PositionProportions::Defined(_))
    }
}

/// Per-exon-position symbol percentages; read-only once derived
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProportionTable {
    /// exon position -> percentages, ascending by position
    proportions: BTreeMap<usize, PositionProportions>
}

impl ProportionTable {
    pub fn get(&self, position: usize) -> Option<&PositionProportions> {
        self.proportions.get(&position)
    }

    /// Iterates positions in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PositionProportions)> {
        self.proportions.iter().map(|(&p, pp)| (p, pp))
    }

    /// All examined positions in ascending order
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.proportions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.proportions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proportions.is_empty()
    }

    /// Number of positions that received no evidence at all
    pub fn num_undefined(&self) -> usize {
        self.proportions.values().filter(|pp| !pp.is_defined()).count()
    }

    /// Derives the present symbols for every position, in ascending position order
    /// # Arguments
    /// * `threshold` - percentage cutoff, e.g. 5.0
    pub fn present_symbols(&self, threshold: f64) -> Vec<(usize, SymbolSet)> {
        self.iter()
            .map(|(p, pp)| (p, pp.present_symbols(threshold)))
            .collect()
    }
}

impl FromIterator<(usize, PositionProportions)> for ProportionTable {
    fn from_iter<I: IntoIterator<Item = (usize, PositionProportions)>>(iter: I) -> Self {
        ProportionTable {
            proportions: iter.into_iter().collect()
        }
    }
}
