use ahash::{AHashMap, AHashSet};
use derive_getters::Getters;
use strandcov_core_rs::loc::{Interval, IntervalOp, Strand};
use strandcov_core_rs::ngs::AlignedRead;

use crate::error::{Error, Result};
use crate::span::GenomicSpan;

/// Which part of an alignment unit contributes to the coverage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Endpoint {
    /// The whole unit.
    #[default]
    Full,
    /// Only the first transcribed base: `start` on `+`, `end - 1` on `-`.
    FivePrime,
    /// Only the last transcribed base: `end - 1` on `+`, `start` on `-`.
    ThreePrime,
}

impl Endpoint {
    fn select(&self, extent: Interval<u64>, strand: Strand) -> Interval<u64> {
        let (five, three) = match strand {
            Strand::Forward => (extent.start(), extent.end() - 1),
            Strand::Reverse => (extent.end() - 1, extent.start()),
        };
        match self {
            Endpoint::Full => extent,
            Endpoint::FivePrime => Interval::single(five),
            Endpoint::ThreePrime => Interval::single(three),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Getters)]
pub struct NormalizeOptions {
    /// Report each aligned block separately instead of the whole aligned extent.
    split_on_gaps: bool,
    /// Merge mates into a single fragment spanning both of them.
    paired_fragments: bool,
    /// Replace the read extent with the observed fragment length.
    force_fragment_size: bool,
    /// Report second mates on the strand of their first mate.
    rescue_mate_strand: bool,
    /// Treat deletions as covered when splitting reads into blocks.
    ignore_deletions: bool,
    endpoint: Endpoint,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            split_on_gaps: true,
            paired_fragments: false,
            force_fragment_size: false,
            rescue_mate_strand: true,
            ignore_deletions: false,
            endpoint: Endpoint::Full,
        }
    }
}

impl NormalizeOptions {
    pub fn with_split_on_gaps(mut self, value: bool) -> Self {
        self.split_on_gaps = value;
        self
    }

    pub fn with_paired_fragments(mut self, value: bool) -> Self {
        self.paired_fragments = value;
        self
    }

    pub fn with_force_fragment_size(mut self, value: bool) -> Self {
        self.force_fragment_size = value;
        self
    }

    pub fn with_rescue_mate_strand(mut self, value: bool) -> Self {
        self.rescue_mate_strand = value;
        self
    }

    pub fn with_ignore_deletions(mut self, value: bool) -> Self {
        self.ignore_deletions = value;
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Turns a stream of aligned reads into genomic spans.
///
/// Spans of a read are available right after [`Normalizer::push`] unless the read waits for
/// its mate (paired mode). Reads whose mate never shows up are released by
/// [`Normalizer::finish`] as if they were unpaired.
pub struct Normalizer {
    options: NormalizeOptions,
    pending: AHashMap<String, AlignedRead>,
    completed: AHashSet<String>,
    spans: Vec<GenomicSpan>,
    warned_split_pairs: bool,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            pending: AHashMap::new(),
            completed: AHashSet::new(),
            spans: Vec::new(),
            warned_split_pairs: false,
        }
    }

    pub fn push(&mut self, read: AlignedRead) -> Result<()> {
        if self.options.paired_fragments {
            if let Some(mate) = read.mate() {
                if self.completed.contains(mate.id()) {
                    return Err(Error::MalformedRecord {
                        record: mate.id().clone(),
                        reason: "more than two reads share the same mate id".to_string(),
                    });
                }
                return match self.pending.remove(mate.id()) {
                    Some(other) => {
                        self.completed.insert(mate.id().clone());
                        self.push_pair(other, read)
                    }
                    None => {
                        self.pending.insert(mate.id().clone(), read);
                        Ok(())
                    }
                };
            }
        }
        self.push_single(read)
    }

    /// Spans produced so far. Draining them keeps the internal buffer small.
    pub fn drain(&mut self) -> std::vec::Drain<'_, GenomicSpan> {
        self.spans.drain(..)
    }

    /// Release reads that are still waiting for their mates and return all remaining spans.
    pub fn finish(mut self) -> Result<Vec<GenomicSpan>> {
        if !self.pending.is_empty() {
            log::debug!(
                "{} reads without a mate in the stream are reported as single reads",
                self.pending.len()
            );
        }
        for (_, read) in std::mem::take(&mut self.pending) {
            self.push_single(read)?;
        }
        Ok(self.spans)
    }

    fn output_strand(&self, read: &AlignedRead) -> Strand {
        let rescued = match read.mate() {
            Some(mate) if self.options.rescue_mate_strand && read.is_second_mate() => {
                *mate.strand()
            }
            _ => None,
        };
        rescued.unwrap_or(*read.strand())
    }

    fn emit(
        &mut self,
        contig: &str,
        extent: Interval<u64>,
        geometry: Strand,
        output: Strand,
    ) -> Result<()> {
        let interval = self.options.endpoint.select(extent, geometry);
        self.spans.push(GenomicSpan::new(contig, interval, output)?);
        Ok(())
    }

    fn push_single(&mut self, read: AlignedRead) -> Result<()> {
        let output = self.output_strand(&read);
        let strand = *read.strand();

        if let (true, Some(length)) = (self.options.force_fragment_size, *read.fragment_length()) {
            let extent = match strand {
                Strand::Forward => Interval::downstream(read.interval().start(), length)?,
                Strand::Reverse => Interval::upstream(read.interval().end(), length)?,
            };
            return self.emit(read.contig(), extent, strand, output);
        }

        if !self.options.split_on_gaps || self.options.endpoint != Endpoint::Full {
            return self.emit(read.contig(), *read.interval(), strand, output);
        }

        for block in fuse_blocks(&read, self.options.ignore_deletions)? {
            self.spans.push(GenomicSpan::new(read.contig().as_str(), block, output)?);
        }
        Ok(())
    }

    fn push_pair(&mut self, a: AlignedRead, b: AlignedRead) -> Result<()> {
        let slots = (
            a.mate().as_ref().map(|x| *x.first()),
            b.mate().as_ref().map(|x| *x.first()),
        );
        let (first, second) = match slots {
            (Some(true), Some(false)) => (a, b),
            (Some(false), Some(true)) => (b, a),
            _ => {
                return Err(Error::MalformedRecord {
                    record: mate_id(&a),
                    reason: "more than two reads share the same mate id".to_string(),
                })
            }
        };
        if first.contig() != second.contig() {
            return Err(Error::MalformedRecord {
                record: mate_id(&first),
                reason: format!(
                    "mates are aligned to different contigs ({} and {})",
                    first.contig(),
                    second.contig()
                ),
            });
        }

        if self.options.split_on_gaps
            && !self.warned_split_pairs
            && (first.blocks().len() > 1 || second.blocks().len() > 1)
        {
            log::warn!(
                "Fragments with gapped mates are reported as a single block, splitting is \
                 ignored for paired fragments"
            );
            self.warned_split_pairs = true;
        }

        let strand = self.output_strand(&first);
        let extent = first.interval().hull(second.interval());
        self.emit(first.contig(), extent, strand, strand)
    }
}

fn mate_id(read: &AlignedRead) -> String {
    read.mate().as_ref().map(|x| x.id().clone()).unwrap_or_default()
}

/// Blocks of the read, optionally fusing neighbours separated by nothing but a deletion.
fn fuse_blocks(read: &AlignedRead, ignore_deletions: bool) -> Result<Vec<Interval<u64>>> {
    let mut blocks: Vec<Interval<u64>> = Vec::with_capacity(read.blocks().len());
    let mut deletions = read.deletions().iter().peekable();

    for block in read.blocks() {
        if let (true, Some(last)) = (ignore_deletions, blocks.last_mut()) {
            while deletions.next_if(|x| x.end() <= last.end()).is_some() {}
            if let Some(deletion) = deletions.peek() {
                if deletion.start() == last.end() && deletion.end() == block.start() {
                    last.extend_to(block.end())?;
                    continue;
                }
            }
        }
        blocks.push(*block);
    }
    Ok(blocks)
}

/// Normalize a complete stream of reads.
pub fn normalize(
    reads: impl IntoIterator<Item = eyre::Result<AlignedRead>>,
    options: NormalizeOptions,
) -> Result<Vec<GenomicSpan>> {
    let mut normalizer = Normalizer::new(options);
    for read in reads {
        normalizer.push(read?)?;
    }
    normalizer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strandcov_core_rs::ngs::Mate;
    use strandcov_io_rs::bam::RecordError;

    fn iv(start: u64, end: u64) -> Interval<u64> {
        Interval::new(start, end).unwrap()
    }

    fn read(strand: Strand, blocks: &[(u64, u64)]) -> AlignedRead {
        let blocks = blocks.iter().map(|(s, e)| iv(*s, *e)).collect();
        AlignedRead::from_blocks("chr1", strand, blocks).unwrap()
    }

    fn mate(read: AlignedRead, id: &str, first: bool, strand: Option<Strand>) -> AlignedRead {
        read.with_mate(Mate::new(id.to_string(), first, strand))
    }

    fn run(reads: Vec<AlignedRead>, options: NormalizeOptions) -> Result<Vec<(u64, u64, Strand)>> {
        let mut spans: Vec<_> = normalize(reads.into_iter().map(Ok), options)?
            .into_iter()
            .map(|x| (x.interval().start(), x.interval().end(), *x.strand()))
            .collect();
        spans.sort();
        Ok(spans)
    }

    #[test]
    fn test_split_and_full_extent() -> Result<()> {
        let spliced = read(Strand::Forward, &[(10, 20), (100, 110)]);

        let split = run(vec![spliced.clone()], NormalizeOptions::default())?;
        assert_eq!(split, vec![(10, 20, Strand::Forward), (100, 110, Strand::Forward)]);

        let full = run(vec![spliced], NormalizeOptions::default().with_split_on_gaps(false))?;
        assert_eq!(full, vec![(10, 110, Strand::Forward)]);
        Ok(())
    }

    #[test]
    fn test_ignore_deletions() -> Result<()> {
        // 10M2D10M100N10M
        let gapped = read(Strand::Reverse, &[(0, 10), (12, 22), (122, 132)])
            .with_deletions(vec![iv(10, 12)])
            .unwrap();

        let kept = run(vec![gapped.clone()], NormalizeOptions::default())?;
        assert_eq!(kept.len(), 3);

        let fused = run(vec![gapped], NormalizeOptions::default().with_ignore_deletions(true))?;
        assert_eq!(fused, vec![(0, 22, Strand::Reverse), (122, 132, Strand::Reverse)]);
        Ok(())
    }

    #[test]
    fn test_endpoints_once_per_read() -> Result<()> {
        let reads = vec![
            read(Strand::Forward, &[(10, 20), (100, 110)]),
            read(Strand::Reverse, &[(50, 60)]),
        ];

        let options = NormalizeOptions::default().with_endpoint(Endpoint::FivePrime);
        let five = run(reads.clone(), options)?;
        assert_eq!(five, vec![(10, 11, Strand::Forward), (59, 60, Strand::Reverse)]);

        let three = run(reads, NormalizeOptions::default().with_endpoint(Endpoint::ThreePrime))?;
        assert_eq!(three, vec![(50, 51, Strand::Reverse), (109, 110, Strand::Forward)]);
        Ok(())
    }

    #[test]
    fn test_rescue_mate_strand() -> Result<()> {
        let second = mate(read(Strand::Reverse, &[(10, 20)]), "r1", false, Some(Strand::Forward));
        let first = mate(read(Strand::Forward, &[(30, 40)]), "r2", true, Some(Strand::Reverse));
        let orphan = mate(read(Strand::Reverse, &[(50, 60)]), "r3", false, None);

        let reads = vec![second.clone(), first, orphan];
        let rescued = run(reads, NormalizeOptions::default())?;
        assert_eq!(
            rescued,
            vec![(10, 20, Strand::Forward), (30, 40, Strand::Forward), (50, 60, Strand::Reverse)]
        );

        let raw = run(vec![second], NormalizeOptions::default().with_rescue_mate_strand(false))?;
        assert_eq!(raw, vec![(10, 20, Strand::Reverse)]);
        Ok(())
    }

    #[test]
    fn test_paired_fragments() -> Result<()> {
        let options = NormalizeOptions::default().with_paired_fragments(true);
        let reads = vec![
            mate(read(Strand::Reverse, &[(150, 200)]), "frag", false, Some(Strand::Forward)),
            read(Strand::Reverse, &[(5, 8)]),
            mate(
                read(Strand::Forward, &[(100, 120), (130, 140)]),
                "frag",
                true,
                Some(Strand::Reverse),
            ),
            mate(read(Strand::Forward, &[(300, 310)]), "lonely", true, Some(Strand::Reverse)),
        ];

        let spans = run(reads, options)?;
        assert_eq!(
            spans,
            vec![(5, 8, Strand::Reverse), (100, 200, Strand::Forward), (300, 310, Strand::Forward)]
        );
        Ok(())
    }

    #[test]
    fn test_paired_fragments_five_prime() -> Result<()> {
        let options = NormalizeOptions::default()
            .with_paired_fragments(true)
            .with_endpoint(Endpoint::FivePrime);
        let reads = vec![
            mate(read(Strand::Reverse, &[(100, 120)]), "frag", true, Some(Strand::Forward)),
            mate(read(Strand::Forward, &[(50, 70)]), "frag", false, Some(Strand::Reverse)),
        ];
        assert_eq!(run(reads, options)?, vec![(119, 120, Strand::Reverse)]);
        Ok(())
    }

    #[test]
    fn test_malformed_pairs() {
        let options = NormalizeOptions::default().with_paired_fragments(true);

        let same_slot = vec![
            mate(read(Strand::Forward, &[(0, 10)]), "dup", true, None),
            mate(read(Strand::Forward, &[(20, 30)]), "dup", true, None),
        ];
        assert!(matches!(
            run(same_slot, options.clone()),
            Err(Error::MalformedRecord { record, .. }) if record == "dup"
        ));

        let other_contig = AlignedRead::new("chr2", iv(0, 10), Strand::Reverse)
            .unwrap()
            .with_mate(Mate::new("x".to_string(), false, None));
        let reads = vec![mate(read(Strand::Forward, &[(0, 10)]), "x", true, None), other_contig];
        assert!(matches!(run(reads, options), Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn test_forced_fragment_size() -> Result<()> {
        let options = NormalizeOptions::default().with_force_fragment_size(true);
        let reads = vec![
            read(Strand::Forward, &[(100, 150)]).with_fragment_length(300),
            read(Strand::Reverse, &[(100, 150)]).with_fragment_length(300),
            read(Strand::Forward, &[(10, 20), (40, 50)]),
        ];
        assert_eq!(
            run(reads, options)?,
            vec![
                (0, 150, Strand::Reverse),
                (10, 20, Strand::Forward),
                (40, 50, Strand::Forward),
                (100, 400, Strand::Forward),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_mate_id_reused_after_pairing() {
        let options = NormalizeOptions::default().with_paired_fragments(true);
        let reads = vec![
            mate(read(Strand::Forward, &[(0, 10)]), "x", true, Some(Strand::Reverse)),
            mate(read(Strand::Reverse, &[(50, 60)]), "x", false, Some(Strand::Forward)),
            mate(read(Strand::Forward, &[(100, 110)]), "x", true, Some(Strand::Reverse)),
        ];
        assert!(matches!(
            run(reads, options),
            Err(Error::MalformedRecord { record, .. }) if record == "x"
        ));
    }

    #[test]
    fn test_stream_errors_are_propagated() {
        let truncated = eyre::eyre!("unexpected EOF").wrap_err("Failed to read BAM record #2");
        let reads = vec![Ok(read(Strand::Forward, &[(0, 10)])), Err(truncated)];
        assert!(matches!(
            normalize(reads, NormalizeOptions::default()),
            Err(Error::Source(_))
        ));

        let malformed =
            RecordError::new("#2 (r2)".into(), "Failed to decode CIGAR operation".into());
        let reads = vec![Ok(read(Strand::Forward, &[(0, 10)])), Err(malformed.into())];
        assert!(matches!(
            normalize(reads, NormalizeOptions::default()),
            Err(Error::MalformedRecord { record, .. }) if record == "#2 (r2)"
        ));
    }
}
