
use lazy_static::lazy_static;
use std::collections::BTreeMap;

/// Separates the gene name from the allele code in an allele ID; e.g. "KIR2DL1*0010101"
pub const GENE_SEPARATOR: char = '*';

lazy_static! {
    /// Gene names that are reported separately in the panel but typed as a single locus.
    /// (alias, locus)
    pub static ref DEFAULT_LOCUS_ALIASES: BTreeMap<String, String> = {
        let alias_keys = [
            // 2DL5A and 2DL5B share a locus
            ("KIR2DL5A", "KIR2DL5"),
            ("KIR2DL5B", "KIR2DL5")
        ];
        alias_keys.iter()
            .map(|(alias, locus)| (alias.to_string(), locus.to_string()))
            .collect()
    };
}

/// Returns the gene prefix of an allele ID, or the full ID if there is no separator
/// # Arguments
/// * `allele_id` - the allele identifier, e.g. "KIR2DL5A*0010101"
pub fn gene_name(allele_id: &str) -> &str {
    match allele_id.split_once(GENE_SEPARATOR) {
        Some((gene, _code)) => gene,
        None => allele_id
    }
}

/// Returns the allele code after the gene separator, if present
pub fn allele_code(allele_id: &str) -> Option<&str> {
    allele_id.split_once(GENE_SEPARATOR).map(|(_gene, code)| code)
}

/// Returns the typed locus for an allele ID, applying the alias rules.
/// # Arguments
/// * `allele_id` - the allele identifier
/// * `aliases` - map from reported gene name to typed locus
pub fn locus_name(allele_id: &str, aliases: &BTreeMap<String, String>) -> String {
    let gene = gene_name(allele_id);
    match aliases.get(gene) {
        Some(locus) => locus.clone(),
        None => gene.to_string()
    }
}

/// Returns the exon signature of an allele code.
/// Codes longer than `min_code_len` characters carry trailing non-coding fields, so their leading `signature_len`
/// characters identify the coding sequence. Shorter codes have no signature and are never collapsed.
/// # Arguments
/// * `code` - the allele code, e.g. "0010101"
/// * `min_code_len` - codes must be strictly longer than this to have a signature
/// * `signature_len` - the number of leading characters in the signature
pub fn exon_signature(code: &str, min_code_len: usize, signature_len: usize) -> Option<&str> {
    if code.chars().count() <= min_code_len {
        return None;
    }
    let end = code.char_indices()
        .nth(signature_len)
        .map(|(i, _c)| i)
        .unwrap_or(code.len());
    Some(&code[..end])
}
