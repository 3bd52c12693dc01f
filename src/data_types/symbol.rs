
use serde::{Serialize, Serializer};
use strum::{EnumCount, IntoEnumIterator};

/// The byte used for a gap, both in reconstructed reads and in the reference panel
pub const GAP_BYTE: u8 = b'.';
/// The byte used by sequencers for an unknown base
pub const UNKNOWN_BYTE: u8 = b'N';

/// The alphabet we tally evidence over.
/// Order matches the column order of the evidence tables.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
    strum_macros::Display, strum_macros::EnumCount, strum_macros::EnumIter)]
pub enum Symbol {
    A,
    T,
    G,
    C,
    #[strum(to_string = ".")]
    #[serde(rename = ".")]
    Gap
}

impl Symbol {
    /// Converts a sequence byte into a symbol.
    /// Returns None for anything outside the alphabet, including `N`.
    pub fn from_byte(b: u8) -> Option<Symbol> {
        match b.to_ascii_uppercase() {
            b'A' => Some(Symbol::A),
            b'T' => Some(Symbol::T),
            b'G' => Some(Symbol::G),
            b'C' => Some(Symbol::C),
            GAP_BYTE => Some(Symbol::Gap),
            _ => None
        }
    }

    /// The index of this symbol into fixed-size tallies
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Number of tallied symbols, used to size count arrays
pub const NUM_SYMBOLS: usize = Symbol::COUNT;

/// A small set of symbols stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SymbolSet {
    bits: u8
}

impl SymbolSet {
    pub fn new() -> SymbolSet {
        Default::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.bits |= 1 << symbol.index();
    }

    /// Inserts the symbol for a raw byte; bytes outside the alphabet cover nothing
    pub fn insert_byte(&mut self, b: u8) {
        if let Some(symbol) = Symbol::from_byte(b) {
            self.insert(symbol);
        }
    }

    pub fn remove(&mut self, symbol: Symbol) {
        self.bits &= !(1 << symbol.index());
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.bits & (1 << symbol.index()) != 0
    }

    /// Checks a raw byte for membership; bytes outside the alphabet are never members
    pub fn contains_byte(&self, b: u8) -> bool {
        Symbol::from_byte(b).map(|s| self.contains(s)).unwrap_or(false)
    }

    pub fn union(&self, other: &SymbolSet) -> SymbolSet {
        SymbolSet { bits: self.bits | other.bits }
    }

    pub fn is_subset(&self, other: &SymbolSet) -> bool {
        self.bits & !other.bits == 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns a copy of this set with the gap symbol removed
    pub fn without_gap(&self) -> SymbolSet {
        let mut ret = *self;
        ret.remove(Symbol::Gap);
        ret
    }

    /// Iterates the members in alphabet order
    pub fn iter(&self) -> impl Iterator<Item = Symbol> {
        let members = *self;
        Symbol::iter().filter(move |s| members.contains(*s))
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut ret = SymbolSet::new();
        for symbol in iter {
            ret.insert(symbol);
        }
        ret
    }
}

impl std::fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", members.join(","))
    }
}

impl Serialize for SymbolSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
