
use clap::Args;
use log::info;
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, check_required_filename, AFTER_HELP};

#[derive(Clone, Args)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct RefStatSettings {
    /// Input reference panel of aligned KIR alleles (IPD format)
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "IPD")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_filename: PathBuf,

    /// Optional typing options describing the panel layout and allele naming (JSON)
    #[clap(long = "options")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub typing_options: Option<PathBuf>,

    /// Print a slice of the first allele reported for this gene
    #[clap(long = "gene")]
    #[clap(value_name = "GENE")]
    #[clap(requires_all = ["start", "end"])]
    #[clap(help_heading = Some("Sequence slice"))]
    pub gene: Option<String>,

    /// 0-based inclusive start of the slice
    #[clap(long = "start")]
    #[clap(value_name = "POS")]
    #[clap(requires = "gene")]
    #[clap(help_heading = Some("Sequence slice"))]
    pub start: Option<usize>,

    /// 0-based exclusive end of the slice
    #[clap(long = "end")]
    #[clap(value_name = "POS")]
    #[clap(requires = "gene")]
    #[clap(help_heading = Some("Sequence slice"))]
    pub end: Option<usize>,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_ref_stat_settings(settings: RefStatSettings) -> Result<RefStatSettings, Box<dyn std::error::Error>> {
    // dump stuff to the logger
    check_required_filename(&settings.reference_filename, "Reference panel");
    check_optional_filename(settings.typing_options.as_deref(), "Typing options");

    info!("Reference panel: {:?}", &settings.reference_filename);
    if let Some(options_fn) = settings.typing_options.as_ref() {
        info!("Typing options: {options_fn:?}");
    }

    if let (Some(gene), Some(start), Some(end)) = (settings.gene.as_ref(), settings.start, settings.end) {
        if start >= end {
            bail!("--start must be less than --end");
        }
        info!("Sequence slice: {gene} [{start}, {end})");
    }

    Ok(settings)
}
