use super::validate;
use derive_getters::{Dissolve, Getters};
use eyre::Result;
use strandcov_core_rs::loc::Interval;

/// A single bedGraph data line: a constant value over a half-open interval.
#[derive(Debug, Clone, PartialEq, PartialOrd, Dissolve, Getters)]
pub struct BedGraph {
    seqid: String,
    interval: Interval<u64>,
    value: f64,
}

impl BedGraph {
    pub fn new(seqid: String, interval: Interval<u64>, value: f64) -> Result<Self> {
        validate::seqid(&seqid)?;
        validate::value(value)?;
        Ok(Self {
            seqid,
            interval,
            value,
        })
    }

    /// Overwrite the record in place, reusing the seqid allocation.
    pub fn set(&mut self, seqid: &str, interval: Interval<u64>, value: f64) -> Result<&mut Self> {
        validate::seqid(seqid)?;
        validate::value(value)?;

        self.seqid.clear();
        self.seqid.push_str(seqid);
        self.interval = interval;
        self.value = value;
        Ok(self)
    }
}

impl Default for BedGraph {
    fn default() -> Self {
        Self {
            seqid: String::new(),
            interval: Interval::single(0),
            value: 0.0,
        }
    }
}
