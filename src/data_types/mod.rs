
/// Contains the raw alignment record and its reconstruction on reference coordinates
pub mod alignment_record;
/// Contains the unordered allele pair for a single locus
pub mod diplotype;
/// Contains the nucleotide/gap alphabet and small symbol sets
pub mod symbol;
/// Contains the serializable final result
pub mod typing_json;
