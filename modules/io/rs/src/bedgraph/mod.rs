// Format specification: https://genome.ucsc.edu/goldenPath/help/bedgraph.html

// Optional header lines:
// - track type=bedGraph [key=value ...]
// - browser ...
// - # comment

// Data lines, tab-separated:
// 1. seqid: non-whitespace, 1-255 characters
// 2. start: u64, 0-based, inclusive
// 3. end: u64, exclusive
// 4. value: f64

// Records of the same seqid must not overlap. Whole values are written without a decimal point.

mod reader;
mod record;
pub mod validate;
mod writer;

pub use reader::Reader;
pub use record::BedGraph;
pub use writer::{format_value, Writer, TRACK_LINE_MARKER};
