use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::{ensure, eyre, Result};

use crate::loc::{Interval, IntervalOp, Strand};

/// Link between a read and its mate in a paired-end library.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Dissolve, Getters, Constructor)]
pub struct Mate {
    /// Identifier shared by both mates of the fragment (e.g. the read name).
    id: String,
    /// Whether this read is the first segment of the template.
    first: bool,
    /// Aligned strand of the other mate, if it is known.
    strand: Option<Strand>,
}

/// An aligned read reduced to the information needed to derive genomic coverage.
///
/// Blocks are the aligned pieces of the read on the reference, i.e. what remains after
/// removing deletions and skipped regions (introns). Deletions are kept separately so that
/// consumers can decide whether to treat them as covered.
#[derive(Clone, PartialEq, Eq, Debug, Dissolve, Getters)]
pub struct AlignedRead {
    contig: String,
    interval: Interval<u64>,
    strand: Strand,
    blocks: Vec<Interval<u64>>,
    deletions: Vec<Interval<u64>>,
    mate: Option<Mate>,
    fragment_length: Option<u64>,
}

impl AlignedRead {
    /// Contiguous read covering the whole interval.
    pub fn new(contig: impl Into<String>, interval: Interval<u64>, strand: Strand) -> Result<Self> {
        let contig = contig.into();
        ensure!(!contig.is_empty(), "Contig name of an aligned read can't be empty");

        Ok(Self {
            contig,
            interval,
            strand,
            blocks: vec![interval],
            deletions: Vec::new(),
            mate: None,
            fragment_length: None,
        })
    }

    /// Read assembled from its aligned blocks. The read interval spans from the start of the
    /// first block to the end of the last one.
    pub fn from_blocks(
        contig: impl Into<String>,
        strand: Strand,
        blocks: Vec<Interval<u64>>,
    ) -> Result<Self> {
        let (first, last) = match (blocks.first(), blocks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(eyre!("Aligned read must have at least one block")),
        };
        let interval = Interval::new(first.start(), last.end())?;
        Self::new(contig, interval, strand)?.with_blocks(blocks)
    }

    /// Replace the aligned blocks. Blocks must be sorted, non-overlapping and lie inside the read.
    pub fn with_blocks(mut self, blocks: Vec<Interval<u64>>) -> Result<Self> {
        ensure!(!blocks.is_empty(), "Aligned read must have at least one block");
        for window in blocks.windows(2) {
            ensure!(
                window[0].end() <= window[1].start(),
                "Blocks of an aligned read must be sorted and non-overlapping, got {} and {}",
                window[0],
                window[1]
            );
        }
        for block in &blocks {
            ensure!(
                self.interval.envelops(block),
                "Block {} lies outside of the aligned read {}",
                block,
                self.interval
            );
        }

        self.blocks = blocks;
        Ok(self)
    }

    /// Set deletions (reference positions skipped by the read without a splice junction).
    pub fn with_deletions(mut self, deletions: Vec<Interval<u64>>) -> Result<Self> {
        for deletion in &deletions {
            ensure!(
                self.interval.envelops(deletion),
                "Deletion {} lies outside of the aligned read {}",
                deletion,
                self.interval
            );
        }

        self.deletions = deletions;
        Ok(self)
    }

    pub fn with_mate(mut self, mate: Mate) -> Self {
        self.mate = Some(mate);
        self
    }

    /// Set the observed fragment length. Zero means unknown.
    pub fn with_fragment_length(mut self, length: u64) -> Self {
        self.fragment_length = (length > 0).then_some(length);
        self
    }

    /// Whether this read is the second mate of a paired-end fragment.
    pub fn is_second_mate(&self) -> bool {
        matches!(&self.mate, Some(mate) if !mate.first)
    }
}
