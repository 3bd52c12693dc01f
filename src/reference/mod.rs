
/// Allele naming, locus aliasing, and exon signatures
pub mod loci;
/// The multi-allele reference panel and its loader
pub mod panel;
/// Intron/exon layout of the shared coordinate space
pub mod regions;
/// JSON-loadable options for panel parsing and allele naming
pub mod typing_config;
