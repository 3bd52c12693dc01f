
use std::ops::Range;

use crate::alignment::cigar::reconstruct_alignment;
use crate::kir::errors::CigarError;

/// SAM flag bit for an unmapped read
pub const FLAG_UNMAPPED: u16 = 0x4;

/// One raw sequencing read as reported by the alignment source
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlignmentRecord {
    /// the pairing identifier, shared by both mates of a pair
    read_name: String,
    /// SAM alignment flag
    flag: u16,
    /// 0-based leftmost reference position
    leftmost: usize,
    /// mapping quality
    mapq: u8,
    /// the compact operator description, e.g. "100M2D50M"
    cigar: String,
    /// the raw read bases
    sequence: Vec<u8>
}

impl AlignmentRecord {
    pub fn new(read_name: String, flag: u16, leftmost: usize, mapq: u8, cigar: String, sequence: Vec<u8>) -> AlignmentRecord {
        AlignmentRecord {
            read_name, flag, leftmost, mapq, cigar, sequence
        }
    }

    /// Rebuilds this record onto reference coordinates
    /// # Errors
    /// * if the operator description is empty, malformed, or inconsistent with the sequence
    pub fn reconstruct(&self) -> Result<AlignedRead, CigarError> {
        reconstruct_alignment(self.leftmost, &self.cigar, &self.sequence)
    }

    pub fn is_mapped(&self) -> bool {
        self.flag & FLAG_UNMAPPED == 0
    }

    // getters
    pub fn read_name(&self) -> &str {
        &self.read_name
    }

    pub fn flag(&self) -> u16 {
        self.flag
    }

    pub fn leftmost(&self) -> usize {
        self.leftmost
    }

    pub fn mapq(&self) -> u8 {
        self.mapq
    }

    pub fn cigar(&self) -> &str {
        &self.cigar
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }
}

/// A read rebuilt onto reference coordinates, gaps included
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlignedRead {
    /// 0-based leftmost reference position
    leftmost: usize,
    /// one symbol per reference position starting at `leftmost`
    sequence: Vec<u8>
}

impl AlignedRead {
    pub fn new(leftmost: usize, sequence: Vec<u8>) -> AlignedRead {
        AlignedRead { leftmost, sequence }
    }

    pub fn leftmost(&self) -> usize {
        self.leftmost
    }

    /// 0-based exclusive end on the reference
    pub fn rightmost(&self) -> usize {
        self.leftmost + self.sequence.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.leftmost..self.rightmost()
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reconstruct() {
        let record = AlignmentRecord::new("read1".to_string(), 0, 4, 255, "2M1D2M".to_string(), b"ACGT".to_vec());
        assert!(record.is_mapped());
        let aligned = record.reconstruct().unwrap();
        assert_eq!(aligned.sequence(), b"AC.GT");
        assert_eq!(aligned.range(), 4..9);

        let unmapped = AlignmentRecord::new("read2".to_string(), 4, 0, 0, "*".to_string(), b"ACGT".to_vec());
        assert!(!unmapped.is_mapped());
        assert_eq!(unmapped.reconstruct(), Err(CigarError::EmptyOperators));
    }
}
