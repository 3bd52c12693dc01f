
/// Generic functionality for reading/writing serializable object to file
pub mod file_io;
/// Plain text report and evidence table output
pub mod report;
