
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::reference::loci::DEFAULT_LOCUS_ALIASES;

/// Options that describe the reference panel layout and the allele naming rules.
/// These rarely change between runs, so they live in an optional JSON file instead of the CLI.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TypingOptions {
    /// Number of lines in the panel file before the first allele row
    pub header_lines: usize,
    /// Reported gene name to typed locus
    pub locus_aliases: BTreeMap<String, String>,
    /// Allele codes must be longer than this to carry an exon signature
    pub signature_min_code_len: usize,
    /// Number of leading code characters that form the exon signature
    pub signature_len: usize
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            header_lines: 12,
            locus_aliases: DEFAULT_LOCUS_ALIASES.clone(),
            signature_min_code_len: 4,
            signature_len: 5
        }
    }
}
