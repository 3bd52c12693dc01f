
/// Contains functionality for loading and reconstructing alignments
pub mod alignment;
/// Contains all the CLI related functionality
pub mod cli;
/// Contains any specialized data types that are shared across the tooling
pub mod data_types;
/// Contains the per-position evidence tables
pub mod evidence;
/// Contains the KIR allele elimination and combination analyses
pub mod kir;
/// Contains functionality for displaying reference panel statistics
pub mod ref_stat;
/// Contains the reference panel and its layout
pub mod reference;
/// Contains the main typing pipeline
pub mod typer;
/// Contains generic utilities that are handy wrappers
pub mod util;
