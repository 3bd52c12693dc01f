
/// Errors from reconstructing a single alignment record; these skip the record, not the batch
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum CigarError {
    #[error("alignment record has no operator description")]
    EmptyOperators,
    #[error("unsupported alignment operator '{operator}'")]
    UnsupportedOperator { operator: char },
    #[error("operator '{operator}' has no length")]
    MissingLength { operator: char },
    #[error("operator description ends with a dangling length \"{digits}\"")]
    TrailingLength { digits: String },
    #[error("operators consume {required} bases, but the read only has {available}")]
    SequenceTooShort { required: usize, available: usize }
}

/// Errors in the reference panel, these must stop the pipeline before it starts
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ReferenceError {
    #[error("reference panel does not contain any alleles")]
    NoAlleles,
    #[error("found {num_regions} region(s) in the first allele, but no exon regions")]
    MissingExons { num_regions: usize },
    #[error("allele {allele_id} has length {length}, expected {expected}")]
    InconsistentLength { allele_id: String, length: usize, expected: usize },
    #[error("allele {allele_id} is defined more than once")]
    DuplicateAllele { allele_id: String },
    #[error("line {line_number} is not a valid allele row: {reason}")]
    MalformedRow { line_number: usize, reason: String }
}
