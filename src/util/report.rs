
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data_types::symbol::Symbol;
use crate::evidence::accumulator::EvidenceAccumulator;
use crate::evidence::proportions::{PositionProportions, ProportionTable};
use crate::typer::TypingOutcome;
use crate::util::file_io::save_tsv;

/// Writes the plain text report for one sample.
/// The layout matches the long-standing KIR typing report so downstream parsers keep working.
/// # Arguments
/// * `writer` - the destination
/// * `alignment_label` - the alignment file name that heads the section
/// * `outcome` - the full typing result
/// # Errors
/// * if writing fails
pub fn write_text_report<W: Write>(writer: &mut W, alignment_label: &str, outcome: &TypingOutcome) -> std::io::Result<()> {
    let progressive = outcome.progressive();
    let combined = outcome.combined();
    let loci: Vec<&str> = progressive.detected_loci().collect();

    writeln!(writer, "{alignment_label} ")?;
    writeln!(writer, "Progressive Analysis Results:")?;
    write!(writer, "{} genes/s detected: {}", loci.len(), loci.join(", "))?;
    for (locus, alleles) in progressive.result_alleles().iter() {
        write!(writer, "\nResult {} allele/s from {locus}: {}", alleles.len(), alleles.join(", "))?;
    }

    match combined.typing_result() {
        None => {
            writeln!(writer, "\nCombined analysis not applicable")?;
        },
        Some(typed) => {
            writeln!(writer, "\nCombined analysis results:")?;
            if typed.is_empty() {
                writeln!(writer, "No genotype combination matches alignment information, out of {} primary combinations", combined.universe_size())?;
            } else {
                writeln!(writer, "{} Genotype combinations matching alignment data, out of {} primary combinations", typed.len(), combined.universe_size())?;
                for combination in typed.iter() {
                    write!(writer, "{combination}-")?;
                }
                writeln!(writer, "\nUpdated list of result alleles per detected gene:")?;
                for (locus, alleles) in combined.result_alleles().into_iter().flatten() {
                    writeln!(writer, "Result {} allele/s from {locus}: {}", alleles.len(), alleles.join(", "))?;
                }
            }
        }
    };
    Ok(())
}

/// Appends the plain text report to a file, creating it if needed
/// # Arguments
/// * `filename` - the report path
/// * `alignment_filename` - the alignment file that was typed
/// * `outcome` - the full typing result
/// # Errors
/// * if the file cannot be opened or written
pub fn append_text_report(filename: &Path, alignment_filename: &Path, outcome: &TypingOutcome) -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)?;
    let mut writer = BufWriter::new(file);
    write_text_report(&mut writer, &alignment_filename.to_string_lossy(), outcome)?;
    writer.flush()?;
    Ok(())
}

/// One row of the evidence table
#[derive(Debug, PartialEq, Serialize)]
pub struct EvidenceRow {
    #[serde(rename = "#position")]
    position: usize,
    count_a: u64,
    count_t: u64,
    count_g: u64,
    count_c: u64,
    count_gap: u64,
    total: u64,
    pct_a: String,
    pct_t: String,
    pct_g: String,
    pct_c: String,
    pct_gap: String,
    present_symbols: String
}

/// Builds the per-exon-position evidence rows, in position order
/// # Arguments
/// * `accumulator` - the raw tallies
/// * `proportions` - the derived percentages
/// * `threshold` - the present-symbol threshold
pub fn evidence_rows(accumulator: &EvidenceAccumulator, proportions: &ProportionTable, threshold: f64) -> Vec<EvidenceRow> {
    accumulator.counts().iter()
        .map(|(&position, tally)| {
            let pp = proportions.get(position).copied().unwrap_or(PositionProportions::Undefined);
            let pct = |symbol: Symbol| match pp.proportion(symbol) {
                Some(p) => format!("{p:.2}"),
                None => "NA".to_string()
            };
            EvidenceRow {
                position,
                count_a: tally[Symbol::A.index()],
                count_t: tally[Symbol::T.index()],
                count_g: tally[Symbol::G.index()],
                count_c: tally[Symbol::C.index()],
                count_gap: tally[Symbol::Gap.index()],
                total: tally.iter().sum(),
                pct_a: pct(Symbol::A),
                pct_t: pct(Symbol::T),
                pct_g: pct(Symbol::G),
                pct_c: pct(Symbol::C),
                pct_gap: pct(Symbol::Gap),
                present_symbols: pp.present_symbols(threshold).to_string()
            }
        })
        .collect()
}

/// Saves the evidence table as a TSV file
/// # Errors
/// * if we have any errors opening or writing to the file
pub fn save_evidence_tsv(outcome: &TypingOutcome, filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rows = evidence_rows(outcome.accumulator(), outcome.proportions(), outcome.progressive().proportion_threshold());
    save_tsv(&rows, filename)
}
