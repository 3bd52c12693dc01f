
use log::{LevelFilter, error, info};

use kirtyper::cli::core::{Commands, get_cli};
use kirtyper::cli::ref_stat::{RefStatSettings, check_ref_stat_settings};
use kirtyper::cli::typing::{TypingSettings, check_typing_settings};
use kirtyper::data_types::typing_json::KirTyperJson;
use kirtyper::reference::panel::ReferencePanel;
use kirtyper::reference::typing_config::TypingOptions;
use kirtyper::typer::TypingOutcome;
use kirtyper::util::file_io::{load_json, save_json};
use kirtyper::util::report::{append_text_report, save_evidence_tsv};

/// Sets up the logger from the verbosity count, must be called first
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Loads the typing options if provided, otherwise uses the defaults; exits on failure
fn load_typing_options(opt_filename: Option<&std::path::Path>) -> TypingOptions {
    let typing_options: TypingOptions = if let Some(filename) = opt_filename {
        match load_json(filename) {
            Ok(to) => to,
            Err(e) => {
                error!("Error while loading typing options: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    } else {
        TypingOptions::default()
    };
    info!("Typing options: {typing_options:#?}");
    typing_options
}

/// Loads the reference panel; exits on failure
fn load_panel(filename: &std::path::Path, typing_options: &TypingOptions) -> ReferencePanel {
    info!("Loading reference panel from {filename:?}...");
    let panel = match ReferencePanel::from_ipd_file(filename, typing_options) {
        Ok(p) => p,
        Err(e) => {
            error!("Error while loading reference panel: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!(
        "Reference panel loaded: {} alleles across {} loci, {} exon positions",
        panel.len(), panel.loci().len(), panel.layout().exon_len()
    );
    panel
}

/// This will run the "type" mode of the tool
/// # Arguments
/// * `settings` - the TypingSettings object
fn run_type(settings: TypingSettings) {
    // immediately setup logging first
    init_logging(settings.verbosity);

    // okay, now we can check all the other settings
    let cli_settings: TypingSettings = match check_typing_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    let typing_options = load_typing_options(cli_settings.typing_options.as_deref());
    let panel = load_panel(&cli_settings.reference_filename, &typing_options);

    // all the work
    let outcome: TypingOutcome = match kirtyper::typer::call_genotypes(&panel, &typing_options, &cli_settings) {
        Ok(o) => o,
        Err(e) => {
            error!("Error while calling genotypes: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    let typing_json = KirTyperJson::new(&panel, &outcome);
    info!("Saving genotype calls to {:?}", cli_settings.output_calls);
    match save_json(&typing_json, &cli_settings.output_calls) {
        Ok(()) => {},
        Err(e) => {
            error!("Error while writing genotype calls to file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    if let Some(filename) = cli_settings.output_report.as_ref() {
        info!("Appending text report to {filename:?}");
        match append_text_report(filename, &cli_settings.alignment_filename, &outcome) {
            Ok(()) => {},
            Err(e) => {
                error!("Error while writing text report to file: {e}");
                std::process::exit(exitcode::IOERR);
            }
        };
    }

    if let Some(filename) = cli_settings.output_evidence.as_ref() {
        info!("Saving evidence table to {filename:?}");
        match save_evidence_tsv(&outcome, filename) {
            Ok(()) => {},
            Err(e) => {
                error!("Error while writing evidence table to file: {e}");
                std::process::exit(exitcode::IOERR);
            }
        };
    }
}

/// This will run the "ref-stat" mode of the tool
/// # Arguments
/// * `settings` - the RefStatSettings object
fn run_ref_stat(settings: RefStatSettings) {
    // immediately setup logging first
    init_logging(settings.verbosity);

    // okay, now we can check all the other settings
    let cli_settings: RefStatSettings = match check_ref_stat_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    let typing_options = load_typing_options(cli_settings.typing_options.as_deref());
    let panel = load_panel(&cli_settings.reference_filename, &typing_options);

    // display the panel statistics
    kirtyper::ref_stat::print_stats(&panel);

    if let (Some(gene), Some(start), Some(end)) = (cli_settings.gene.as_ref(), cli_settings.start, cli_settings.end) {
        if let Err(e) = kirtyper::ref_stat::print_sequence_slice(&panel, gene, start, end) {
            error!("Error while printing sequence slice: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    }
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::RefStat(settings) => {
            run_ref_stat(*settings);
        },
        Commands::Type(settings) => {
            run_type(*settings);
        }
    }

    info!("Process finished successfully.");
}
