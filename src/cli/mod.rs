
/// the main CLI module
pub mod core;
/// the ref-stat CLI subcommand for summarizing a reference panel
pub mod ref_stat;
/// the type CLI subcommand for genotyping a sample
pub mod typing;
