
/// Genotype combination matching across loci
pub mod combined;
/// Typed errors for reconstruction and reference loading
pub mod errors;
/// Per-position elimination of reference alleles
pub mod progressive;
