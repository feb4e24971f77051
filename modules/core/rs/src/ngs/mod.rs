pub use read::{AlignedRead, Mate};
pub use strandedness::Strandedness;

mod read;
mod strandedness;
