use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};
use strandcov_core_rs::loc::{Interval, Strand};

/// Contiguous stranded piece of the genome that contributes `weight` to the coverage.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve, Getters)]
pub struct GenomicSpan {
    contig: String,
    interval: Interval<u64>,
    strand: Strand,
    weight: u32,
}

impl GenomicSpan {
    pub fn new(contig: impl Into<String>, interval: Interval<u64>, strand: Strand) -> Result<Self> {
        Self::weighted(contig, interval, strand, 1)
    }

    pub fn weighted(
        contig: impl Into<String>,
        interval: Interval<u64>,
        strand: Strand,
        weight: u32,
    ) -> Result<Self> {
        let contig = contig.into();
        ensure!(!contig.is_empty(), "Contig name of a genomic span can't be empty");
        ensure!(weight > 0, "Weight of a genomic span must be positive");
        Ok(Self {
            contig,
            interval,
            strand,
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() -> Result<()> {
        let span = GenomicSpan::new("chr1", Interval::new(10, 20)?, Strand::Reverse)?;
        assert_eq!(span.contig(), "chr1");
        assert_eq!(span.weight(), &1);

        assert!(GenomicSpan::new("", Interval::new(10, 20)?, Strand::Reverse).is_err());
        assert!(GenomicSpan::weighted("chr1", Interval::new(10, 20)?, Strand::Forward, 0).is_err());
        Ok(())
    }
}
