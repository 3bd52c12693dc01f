

use clap::Args;
use log::{info, warn};
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{AFTER_HELP, check_optional_filename, check_required_filename};
use crate::kir::progressive::DEFAULT_PROPORTION_THRESHOLD;

#[derive(Args, Clone)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct TypingSettings {
    /// Input reference panel of aligned KIR alleles (IPD format)
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "IPD")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_filename: PathBuf,

    /// Input alignment file against the panel coordinates (SAM or BAM)
    #[clap(required = true)]
    #[clap(short = 'a')]
    #[clap(long = "alignments")]
    #[clap(value_name = "SAM|BAM")]
    #[clap(help_heading = Some("Input/Output"))]
    pub alignment_filename: PathBuf,

    /// Output genotype call file (JSON)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-calls")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_calls: PathBuf,

    /// Optional plain text report; results are appended if the file exists
    #[clap(long = "output-report")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_report: Option<PathBuf>,

    /// Optional per-position evidence table
    #[clap(long = "output-evidence")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_evidence: Option<PathBuf>,

    /// Optional typing options describing the panel layout and allele naming (JSON)
    #[clap(long = "options")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub typing_options: Option<PathBuf>,

    /// Percentage a symbol must exceed at a position to be considered present
    #[clap(long = "proportion-threshold")]
    #[clap(value_name = "FLOAT")]
    #[clap(default_value_t = DEFAULT_PROPORTION_THRESHOLD)]
    #[clap(help_heading = Some("Typing"))]
    pub proportion_threshold: f64,

    /// Exact mapping quality a read must carry to be used as evidence
    #[clap(long = "required-mapq")]
    #[clap(value_name = "MAPQ")]
    #[clap(default_value = "255")]
    #[clap(help_heading = Some("Typing"))]
    pub required_mapq: u8,

    /// Number of threads to use for decompression and combination matching
    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_typing_settings(mut settings: TypingSettings) -> Result<TypingSettings, Box<dyn std::error::Error>> {
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.reference_filename, "Reference panel");
    check_required_filename(&settings.alignment_filename, "Alignment file");
    check_optional_filename(settings.typing_options.as_deref(), "Typing options");

    info!("\tReference panel: {:?}", settings.reference_filename);
    info!("\tAlignments: {:?}", settings.alignment_filename);
    if let Some(options_fn) = settings.typing_options.as_ref() {
        info!("\tTyping options: {options_fn:?}");
    }

    // outputs
    info!("Outputs:");
    info!("\tGenotype calls: {:?}", settings.output_calls);
    if let Some(filename) = settings.output_report.as_ref() {
        info!("\tText report: {filename:?}");
    }
    if let Some(filename) = settings.output_evidence.as_ref() {
        info!("\tEvidence TSV: {filename:?}");
    }

    info!("Typing settings:");
    if !(0.0..100.0).contains(&settings.proportion_threshold) {
        bail!("--proportion-threshold must be in the range [0, 100)");
    }
    info!("\tProportion threshold: {}", settings.proportion_threshold);
    info!("\tRequired MAPQ: {}", settings.required_mapq);

    if settings.threads == 0 {
        settings.threads = 1;
        warn!("\tThreads: 0 is not valid, using 1");
    }
    info!("\tThreads: {}", settings.threads);

    Ok(settings)
}
