use std::fmt::Display;
use std::str::FromStr;

use eyre::{eyre, Report};

/// Strandedness of a stranded RNA-seq library: how the aligned strand of the first sequenced
/// read relates to the strand the RNA was transcribed from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Strandedness {
    /// FR / fr-secondstrand, e.g. ligation-based protocols.
    Forward,
    /// RF / fr-firststrand, e.g. dUTP protocols.
    Reverse,
}

impl Strandedness {
    /// Accepted labels, matched case-insensitively.
    pub const LABELS: [&'static str; 2] = ["forward", "reverse"];

    pub fn label(&self) -> &'static str {
        match self {
            Strandedness::Forward => Self::LABELS[0],
            Strandedness::Reverse => Self::LABELS[1],
        }
    }
}

impl Display for Strandedness {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strandedness {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Strandedness::Forward, Strandedness::Reverse]
            .into_iter()
            .find(|x| x.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| eyre!("Unknown library strandedness: {s:?}"))
    }
}
