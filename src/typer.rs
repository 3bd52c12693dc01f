
use log::{info, warn};
use serde::Serialize;

use crate::alignment::reader::{AlignmentFileReader, ReadAdmission, ReadFilter};
use crate::cli::typing::TypingSettings;
use crate::data_types::alignment_record::AlignmentRecord;
use crate::evidence::accumulator::EvidenceAccumulator;
use crate::evidence::proportions::ProportionTable;
use crate::kir::combined::CombinedAnalysis;
use crate::kir::progressive::ProgressiveAnalysis;
use crate::reference::panel::ReferencePanel;
use crate::reference::regions::RegionLayout;
use crate::reference::typing_config::TypingOptions;

/// Number of malformed records reported individually before only the total is logged
const MAX_MALFORMED_WARNINGS: usize = 5;

/// Counts of what happened to each alignment record
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AccumulationSummary {
    /// every record read from the input
    pub total_records: u64,
    /// records with the unmapped flag
    pub unmapped: u64,
    /// records without the required mapping quality
    pub low_quality: u64,
    /// records whose operator description could not be applied
    pub malformed: u64,
    /// records that do not touch any exon
    pub non_exon: u64,
    /// records that were added to the evidence
    pub recorded: u64
}

/// Everything produced by one typing run
#[derive(Clone, Debug)]
pub struct TypingOutcome {
    /// what happened to the input records
    summary: AccumulationSummary,
    /// the raw tallies
    accumulator: EvidenceAccumulator,
    /// the per-position percentages
    proportions: ProportionTable,
    /// the progressive filter result
    progressive: ProgressiveAnalysis,
    /// the combinatorial matcher result
    combined: CombinedAnalysis
}

impl TypingOutcome {
    pub fn summary(&self) -> &AccumulationSummary {
        &self.summary
    }

    pub fn accumulator(&self) -> &EvidenceAccumulator {
        &self.accumulator
    }

    pub fn proportions(&self) -> &ProportionTable {
        &self.proportions
    }

    pub fn progressive(&self) -> &ProgressiveAnalysis {
        &self.progressive
    }

    pub fn combined(&self) -> &CombinedAnalysis {
        &self.combined
    }
}

/// Filters and reconstructs alignment records, adding every admitted one to a fresh accumulator.
/// Malformed records are counted and skipped.
/// # Arguments
/// * `records` - the raw records, any read error stops accumulation
/// * `layout` - the panel region layout
/// * `filter` - the admission predicate
/// # Errors
/// * if the record source returns an error
pub fn accumulate_records<I>(records: I, layout: &RegionLayout, filter: &ReadFilter) -> Result<(EvidenceAccumulator, AccumulationSummary), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = Result<AlignmentRecord, Box<dyn std::error::Error>>>
{
    let mut accumulator = EvidenceAccumulator::new(layout);
    let mut summary = AccumulationSummary::default();
    for record_result in records {
        let record = record_result?;
        summary.total_records += 1;
        match filter.classify(&record, layout) {
            ReadAdmission::Admitted(aligned) => {
                accumulator.record(&record, &aligned);
                summary.recorded += 1;
            },
            ReadAdmission::Unmapped => summary.unmapped += 1,
            ReadAdmission::LowQuality => summary.low_quality += 1,
            ReadAdmission::NonExon => summary.non_exon += 1,
            ReadAdmission::Malformed(e) => {
                summary.malformed += 1;
                if summary.malformed as usize <= MAX_MALFORMED_WARNINGS {
                    warn!("Skipping malformed record {}: {e}", record.read_name());
                }
            }
        };
    }

    if summary.malformed as usize > MAX_MALFORMED_WARNINGS {
        warn!("Skipped {} malformed records in total", summary.malformed);
    }
    info!(
        "Processed {} records: {} recorded, {} unmapped, {} low quality, {} malformed, {} outside exons",
        summary.total_records, summary.recorded, summary.unmapped, summary.low_quality, summary.malformed, summary.non_exon
    );
    Ok((accumulator, summary))
}

/// Runs the full typing pipeline over a stream of records.
/// # Arguments
/// * `records` - the raw records
/// * `panel` - the loaded reference panel
/// * `options` - allele naming rules
/// * `filter` - the admission predicate
/// * `proportion_threshold` - percentage a symbol must exceed to be present
/// * `pool` - the thread pool used for combination matching
/// # Errors
/// * if the record source returns an error
/// * if the combined analysis cannot be formed
pub fn type_records<I>(
    records: I, panel: &ReferencePanel, options: &TypingOptions, filter: &ReadFilter, proportion_threshold: f64,
    pool: &rayon::ThreadPool
) -> Result<TypingOutcome, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = Result<AlignmentRecord, Box<dyn std::error::Error>>>
{
    let (accumulator, summary) = accumulate_records(records, panel.layout(), filter)?;
    if summary.recorded == 0 {
        warn!("No alignment records were admitted as evidence");
    }

    let proportions = accumulator.derive_proportions();
    let num_undefined = proportions.num_undefined();
    if num_undefined > 0 {
        warn!("{num_undefined} of {} exon positions have no evidence", proportions.len());
    }

    info!("Running progressive analysis...");
    let progressive = ProgressiveAnalysis::run(&proportions, panel, options, proportion_threshold);
    for (locus, alleles) in progressive.result_alleles().iter() {
        info!("\t{locus}: {} result alleles", alleles.len());
    }

    info!("Running combined analysis...");
    let combined = pool.install(|| CombinedAnalysis::run(&progressive, &proportions, panel))?;

    Ok(TypingOutcome {
        summary,
        accumulator,
        proportions,
        progressive,
        combined
    })
}

/// Main entry point for typing a sample from files.
/// # Arguments
/// * `panel` - the loaded reference panel
/// * `options` - allele naming rules
/// * `cli_settings` - the full settings for typing
/// # Errors
/// * if the alignment file cannot be opened or read
/// * if the thread pool cannot be created
/// * if either analysis fails
pub fn call_genotypes(panel: &ReferencePanel, options: &TypingOptions, cli_settings: &TypingSettings) -> Result<TypingOutcome, Box<dyn std::error::Error>> {
    info!("Loading alignments from {:?}...", cli_settings.alignment_filename);
    let reader = AlignmentFileReader::from_path(&cli_settings.alignment_filename, cli_settings.threads)?;
    let filter = ReadFilter::new(cli_settings.required_mapq);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli_settings.threads)
        .build()?;
    type_records(reader, panel, options, &filter, cli_settings.proportion_threshold, &pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::data_types::symbol::Symbol;
    use crate::kir::progressive::DEFAULT_PROPORTION_THRESHOLD;

    fn load_tiny_panel() -> ReferencePanel {
        ReferencePanel::from_ipd_file(&PathBuf::from("test_data/tiny_panel.ipd"), &TypingOptions::default()).unwrap()
    }

    fn ok_records(records: Vec<AlignmentRecord>) -> impl Iterator<Item = Result<AlignmentRecord, Box<dyn std::error::Error>>> {
        records.into_iter().map(Ok)
    }

    fn record(name: &str, flag: u16, leftmost: usize, mapq: u8, cigar: &str, sequence: &[u8]) -> AlignmentRecord {
        AlignmentRecord::new(name.to_string(), flag, leftmost, mapq, cigar.to_string(), sequence.to_vec())
    }

    #[test]
    fn test_accumulate_summary() {
        let layout = RegionLayout::from_region_lengths(&[2, 4, 2]).unwrap();
        let records = vec![
            record("good", 0, 2, 255, "4M", b"ACGT"),
            record("unmapped", 4, 0, 0, "*", b"ACGT"),
            record("lowq", 0, 2, 30, "4M", b"ACGT"),
            record("bad", 0, 2, 255, "4X", b"ACGT"),
            record("short", 0, 2, 255, "6M", b"ACGT"),
            record("intron", 0, 6, 255, "2M", b"AC")
        ];
        let (accumulator, summary) = accumulate_records(ok_records(records), &layout, &ReadFilter::new(255)).unwrap();
        assert_eq!(summary, AccumulationSummary {
            total_records: 6,
            unmapped: 1,
            low_quality: 1,
            malformed: 2,
            non_exon: 1,
            recorded: 1
        });
        assert_eq!(accumulator.count(2).unwrap()[Symbol::A.index()], 1);
    }

    #[test]
    fn test_read_error_stops() {
        let layout = RegionLayout::from_region_lengths(&[2, 4, 2]).unwrap();
        let records: Vec<Result<AlignmentRecord, Box<dyn std::error::Error>>> = vec![
            Ok(record("good", 0, 2, 255, "4M", b"ACGT")),
            Err("truncated input".into())
        ];
        assert!(accumulate_records(records, &layout, &ReadFilter::new(255)).is_err());
    }

    #[test]
    fn test_tiny_sample() {
        let panel = load_tiny_panel();
        assert_eq!(panel.len(), 7);
        let reader = AlignmentFileReader::from_path(&PathBuf::from("test_data/tiny_reads.sam"), 1).unwrap();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let outcome = type_records(
            reader, &panel, &TypingOptions::default(), &ReadFilter::new(255), DEFAULT_PROPORTION_THRESHOLD, &pool
        ).unwrap();

        assert_eq!(outcome.summary(), &AccumulationSummary {
            total_records: 17,
            unmapped: 1,
            low_quality: 1,
            malformed: 1,
            non_exon: 1,
            recorded: 13
        });

        // the mate overlap is only counted once: 12 reads cover every exon position
        let tally = outcome.accumulator().count(8).unwrap();
        assert_eq!(tally[Symbol::A.index()], 4);
        assert_eq!(tally[Symbol::T.index()], 4);
        assert_eq!(tally[Symbol::C.index()], 4);
        assert_eq!(outcome.accumulator().count(20).unwrap()[Symbol::A.index()], 12);
        assert_eq!(outcome.proportions().len(), 16);
        assert_eq!(outcome.proportions().num_undefined(), 0);

        let progressive = outcome.progressive();
        assert_eq!(progressive.detected_loci().collect::<Vec<&str>>(), vec!["KIR2DL1", "KIR3DL2"]);
        assert_eq!(progressive.result_alleles()["KIR2DL1"], vec!["KIR2DL1*0010101".to_string(), "KIR2DL1*00201".to_string()]);
        assert_eq!(progressive.result_alleles()["KIR3DL2"], vec!["KIR3DL2*001".to_string()]);
        assert_eq!(progressive.exon_identical_alleles()["KIR2DL1"]["KIR2DL1*0010102"], "KIR2DL1*0010101");
        assert_eq!(progressive.eliminated_alleles()["KIR2DL5A*001"], 4);
        assert_eq!(progressive.eliminated_alleles()["KIR2DL1*00301"], 20);
        assert_eq!(progressive.eliminated_alleles()["KIR3DL2*002"], 23);

        let combined = outcome.combined();
        assert_eq!(combined.universe_size(), 3);
        assert_eq!(combined.discriminant_positions().len(), 1);
        assert_eq!(combined.discriminant_positions()[0].position(), 8);
        let typed: Vec<String> = combined.typing_result().unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(typed, vec!["KIR2DL1*0010101/KIR2DL1*00201+KIR3DL2*001/KIR3DL2*001".to_string()]);
    }
}
