use strandcov_core_rs::loc::{PerStrand, Strand};
use strandcov_core_rs::ngs::Strandedness;

use crate::error::{Error, Result};

/// How the aligned strand of a read maps onto the strand of the transcript it came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StrandAssignment {
    /// Reads align to the transcribed strand.
    Identity,
    /// Reads align to the strand opposite to the transcribed one (dUTP, Illumina TruSeq).
    Inverted,
}

impl StrandAssignment {
    pub fn apply(&self, strand: Strand) -> Strand {
        match self {
            Self::Identity => strand,
            Self::Inverted => strand.opposite(),
        }
    }
}

impl From<Strandedness> for StrandAssignment {
    fn from(value: Strandedness) -> Self {
        match value {
            Strandedness::Forward => Self::Identity,
            Strandedness::Reverse => Self::Inverted,
        }
    }
}

pub fn resolve(label: &str) -> Result<StrandAssignment> {
    label
        .parse::<Strandedness>()
        .map(StrandAssignment::from)
        .map_err(|_| Error::InvalidProtocolLabel {
            label: label.to_owned(),
            expected: Strandedness::LABELS.join(", "),
        })
}

/// Output name prefix for reads aligned to each strand, e.g. `sample.plus` for reads that
/// were transcribed from the forward strand.
pub fn name_prefixes(base: &str, assignment: StrandAssignment) -> PerStrand<String> {
    PerStrand::from_fn(|aligned| format!("{base}.{}", assignment.apply(aligned).word()))
}
