
/// Per-position symbol tallies with mate de-duplication
pub mod accumulator;
/// Per-position symbol percentages
pub mod proportions;
