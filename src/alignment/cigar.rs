
use log::trace;

use crate::data_types::alignment_record::AlignedRead;
use crate::data_types::symbol::GAP_BYTE;
use crate::kir::errors::CigarError;

/// Placeholder SAM uses for a missing operator description
const MISSING_CIGAR: &str = "*";

/// The alignment operators we can place on reference coordinates
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CigarOp {
    /// consumes read bases and emits them
    Match,
    /// emits gaps without consuming read bases
    Deletion,
    /// consumes read bases without emitting anything
    Insertion
}

impl CigarOp {
    fn from_char(c: char) -> Result<CigarOp, CigarError> {
        match c {
            'M' => Ok(CigarOp::Match),
            'D' => Ok(CigarOp::Deletion),
            'I' => Ok(CigarOp::Insertion),
            operator => Err(CigarError::UnsupportedOperator { operator })
        }
    }

    fn consumes_read(self) -> bool {
        matches!(self, CigarOp::Match | CigarOp::Insertion)
    }

    fn consumes_reference(self) -> bool {
        matches!(self, CigarOp::Match | CigarOp::Deletion)
    }
}

/// A single operator with its run length
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CigarElement {
    pub op: CigarOp,
    pub length: usize
}

/// Splits an operator description like "10M2D5M1I3M" into its elements.
/// # Arguments
/// * `description` - alternating digit runs and single-letter operators
/// # Errors
/// * if the description is empty or "*"
/// * if an operator is not one of M, D, or I
/// * if an operator has no preceding digits, or digits have no following operator
pub fn parse_cigar(description: &str) -> Result<Vec<CigarElement>, CigarError> {
    if description.is_empty() || description == MISSING_CIGAR {
        return Err(CigarError::EmptyOperators);
    }

    let mut elements = vec![];
    let mut digits = String::new();
    for c in description.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let op = CigarOp::from_char(c)?;
        if digits.is_empty() {
            return Err(CigarError::MissingLength { operator: c });
        }
        // digit-only strings only fail on overflow, report that as a dangling length
        let length: usize = digits.parse()
            .map_err(|_| CigarError::TrailingLength { digits: digits.clone() })?;
        elements.push(CigarElement { op, length });
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(CigarError::TrailingLength { digits });
    }
    Ok(elements)
}

/// Rebuilds a read onto reference coordinates.
/// Matches copy read bases, deletions emit gaps, and insertions are dropped since they have no reference coordinate.
/// # Arguments
/// * `leftmost` - 0-based reference position of the first aligned base
/// * `description` - the operator description, e.g. "20M1D30M"
/// * `raw_sequence` - the read bases as sequenced
/// # Errors
/// * if the operator description is malformed
/// * if the operators consume more bases than the read has
pub fn reconstruct_alignment(leftmost: usize, description: &str, raw_sequence: &[u8]) -> Result<AlignedRead, CigarError> {
    let elements = parse_cigar(description)?;

    let required: usize = elements.iter()
        .filter(|e| e.op.consumes_read())
        .map(|e| e.length)
        .sum();
    if required > raw_sequence.len() {
        return Err(CigarError::SequenceTooShort { required, available: raw_sequence.len() });
    }

    let emitted: usize = elements.iter()
        .filter(|e| e.op.consumes_reference())
        .map(|e| e.length)
        .sum();
    let mut sequence: Vec<u8> = Vec::with_capacity(emitted);
    let mut read_offset = 0;
    for element in elements.iter() {
        match element.op {
            CigarOp::Match => {
                sequence.extend_from_slice(&raw_sequence[read_offset..(read_offset + element.length)]);
                read_offset += element.length;
            },
            CigarOp::Deletion => {
                sequence.extend(std::iter::repeat(GAP_BYTE).take(element.length));
            },
            CigarOp::Insertion => {
                read_offset += element.length;
            }
        };
    }
    trace!("Reconstructed {description} at {leftmost} into {} reference positions", sequence.len());

    Ok(AlignedRead::new(leftmost, sequence))
}
