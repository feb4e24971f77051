use std::fmt::Display;
use std::str::FromStr;

use eyre::{bail, Report};

/// Genomic strand of an alignment or a coverage profile.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Both strands, forward first.
    pub const BOTH: [Strand; 2] = [Strand::Forward, Strand::Reverse];

    /// Strand of a SAM record given its reverse-complemented flag (0x10 or 0x20).
    pub fn from_reverse_flag(reverse: bool) -> Self {
        if reverse {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }

    /// Word used in file names, `plus` or `minus`.
    pub fn word(self) -> &'static str {
        match self {
            Self::Forward => "plus",
            Self::Reverse => "minus",
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Strand {
    type Err = Report;

    /// Only the bare `+` and `-` symbols are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Forward),
            "-" => Ok(Self::Reverse),
            _ => bail!("Unknown strand symbol: {s:?} (expected '+' or '-')"),
        }
    }
}
