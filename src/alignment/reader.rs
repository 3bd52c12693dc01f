
use log::trace;
use rust_htslib::bam;
use rust_htslib::bam::Read;
use std::path::Path;

use crate::data_types::alignment_record::{AlignedRead, AlignmentRecord};
use crate::kir::errors::CigarError;
use crate::reference::regions::RegionLayout;

/// Streams alignment records from a SAM, gzipped SAM, or BAM file.
/// Records are yielded in file order and no index is required.
pub struct AlignmentFileReader {
    /// the htslib reader
    reader: bam::Reader,
    /// re-used record buffer
    record: bam::Record
}

impl AlignmentFileReader {
    /// Opens an alignment file
    /// # Arguments
    /// * `filename` - path to the SAM/BAM file
    /// * `threads` - number of decompression threads, only used when > 1
    /// # Errors
    /// * if the file cannot be opened or the header is invalid
    pub fn from_path(filename: &Path, threads: usize) -> Result<AlignmentFileReader, Box<dyn std::error::Error>> {
        let mut reader = bam::Reader::from_path(filename)?;
        if threads > 1 {
            reader.set_threads(threads)?;
        }
        Ok(AlignmentFileReader {
            reader,
            record: bam::Record::new()
        })
    }
}

impl Iterator for AlignmentFileReader {
    type Item = Result<AlignmentRecord, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read(&mut self.record) {
            None => None,
            Some(Ok(())) => Some(convert_record(&self.record)),
            Some(Err(e)) => Some(Err(e.into()))
        }
    }
}

/// Converts an htslib record into our raw record
/// # Errors
/// * if the read name is not valid UTF-8
fn convert_record(record: &bam::Record) -> Result<AlignmentRecord, Box<dyn std::error::Error>> {
    let read_name: String = std::str::from_utf8(record.qname())?.to_string();
    // unplaced reads report -1
    let leftmost: usize = usize::try_from(record.pos()).unwrap_or(0);
    let cigar: String = record.cigar().to_string();
    trace!("Loaded {read_name}: flag={}, pos={leftmost}, mapq={}, cigar={cigar}", record.flags(), record.mapq());
    Ok(AlignmentRecord::new(
        read_name,
        record.flags(),
        leftmost,
        record.mapq(),
        cigar,
        record.seq().as_bytes()
    ))
}

/// Why a record was or was not admitted as evidence
#[derive(Clone, Debug, PartialEq)]
pub enum ReadAdmission {
    /// the reconstructed read should be recorded
    Admitted(AlignedRead),
    /// the unmapped flag is set
    Unmapped,
    /// the mapping quality differs from the required value
    LowQuality,
    /// the operator description could not be applied
    Malformed(CigarError),
    /// the read does not touch any exon
    NonExon
}

/// The admission predicate for alignment records
#[derive(Clone, Copy, Debug)]
pub struct ReadFilter {
    /// the exact mapping quality a record must carry
    required_mapq: u8
}

impl ReadFilter {
    pub fn new(required_mapq: u8) -> ReadFilter {
        ReadFilter { required_mapq }
    }

    pub fn required_mapq(&self) -> u8 {
        self.required_mapq
    }

    /// Decides whether a record is evidence; admitted records come back reconstructed.
    /// Checks run in order: mapped, mapping quality, reconstruction, exon overlap.
    /// # Arguments
    /// * `record` - the raw record
    /// * `layout` - the region layout to test exon overlap against
    pub fn classify(&self, record: &AlignmentRecord, layout: &RegionLayout) -> ReadAdmission {
        if !record.is_mapped() {
            return ReadAdmission::Unmapped;
        }
        if record.mapq() != self.required_mapq {
            return ReadAdmission::LowQuality;
        }
        let aligned = match record.reconstruct() {
            Ok(a) => a,
            Err(e) => return ReadAdmission::Malformed(e)
        };
        if !layout.overlaps_exon(&aligned.range()) {
            return ReadAdmission::NonExon;
        }
        ReadAdmission::Admitted(aligned)
    }
}
