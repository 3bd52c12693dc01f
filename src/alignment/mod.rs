
/// Parses operator descriptions and places reads on reference coordinates
pub mod cigar;
/// Loads SAM/BAM records and decides which are evidence
pub mod reader;
