pub mod bam;
pub mod bedgraph;
mod traits;

pub use traits::{ReadRecord, WriteRecord};
