use std::cell::Cell;
use std::path::PathBuf;

use derive_getters::Dissolve;
use strandcov_core_rs::ngs::AlignedRead;
use strandcov_io_rs::bam::{ReaderBuilder, DEFAULT_EXFLAGS};

use crate::accumulate::{accumulate, ContigExtents};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::request::CoverageRequest;
use crate::track;

/// A freshly opened, forward-only stream of reads plus the contig lengths if known.
#[derive(Dissolve)]
pub struct OpenedSource<R> {
    pub reads: R,
    pub extents: Option<ContigExtents>,
}

/// Anything that can be read from the start once per strand pass.
pub trait AlignmentSource {
    type Reads: Iterator<Item = eyre::Result<AlignedRead>>;

    fn open(&self) -> Result<OpenedSource<Self::Reads>>;
}

/// Alignments stored in a BAM file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BamSource {
    path: PathBuf,
    inflags: u16,
    exflags: u16,
    minmapq: u8,
}

impl BamSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inflags: 0,
            exflags: DEFAULT_EXFLAGS,
            minmapq: 0,
        }
    }

    pub fn with_inflags(mut self, inflags: u16) -> Self {
        self.inflags = inflags;
        self
    }

    pub fn with_exflags(mut self, exflags: u16) -> Self {
        self.exflags = exflags;
        self
    }

    pub fn with_minmapq(mut self, minmapq: u8) -> Self {
        self.minmapq = minmapq;
        self
    }
}

impl AlignmentSource for BamSource {
    type Reads = strandcov_io_rs::bam::Reader;

    fn open(&self) -> Result<OpenedSource<Self::Reads>> {
        let reader = ReaderBuilder::new(&self.path)
            .with_inflags(self.inflags)
            .with_exflags(self.exflags)
            .with_minmapq(self.minmapq)
            .build()
            .map_err(|source| Error::SourceNotFound {
                path: self.path.clone(),
                source,
            })?;
        let extents = reader.extents().into_iter().collect();
        Ok(OpenedSource {
            reads: reader,
            extents: Some(extents),
        })
    }
}

type ReadOk = fn(AlignedRead) -> eyre::Result<AlignedRead>;

/// Reads kept in memory, handy for embedding and tests.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct InMemorySource {
    reads: Vec<AlignedRead>,
    extents: Option<ContigExtents>,
    opened: Cell<usize>,
}

impl InMemorySource {
    pub fn new(reads: Vec<AlignedRead>) -> Self {
        Self {
            reads,
            extents: None,
            opened: Cell::new(0),
        }
    }

    pub fn with_extents(mut self, extents: ContigExtents) -> Self {
        self.extents = Some(extents);
        self
    }

    /// How many times the source was opened.
    pub fn opened(&self) -> usize {
        self.opened.get()
    }
}

impl AlignmentSource for InMemorySource {
    type Reads = std::iter::Map<std::vec::IntoIter<AlignedRead>, ReadOk>;

    fn open(&self) -> Result<OpenedSource<Self::Reads>> {
        self.opened.set(self.opened.get() + 1);
        Ok(OpenedSource {
            reads: self.reads.clone().into_iter().map(Ok::<_, eyre::Report> as ReadOk),
            extents: self.extents.clone(),
        })
    }
}

/// Produce the coverage track described by a single request.
pub fn run(source: &impl AlignmentSource, request: CoverageRequest) -> Result<PathBuf> {
    let (strand, normalize, options, track, output) = request.dissolve();
    log::info!("Collecting coverage of reads aligned to the {strand} strand");

    let (reads, extents) = source.open()?.dissolve();
    let mut normalizer = Normalizer::new(normalize);
    let mut spans = Vec::new();
    for read in reads {
        normalizer.push(read?)?;
        spans.extend(normalizer.drain().filter(|x| x.strand() == &strand));
    }
    spans.extend(normalizer.finish()?.into_iter().filter(|x| x.strand() == &strand));

    let total = spans.len();
    let coverage = accumulate(spans, &options, extents.as_ref());
    log::info!(
        "{} spans over {} contigs -> {}",
        total,
        coverage.len(),
        output.display()
    );
    track::write(&coverage, &output, &track)
}

/// Validate the configuration and write one coverage track per requested strand.
///
/// Strands are processed in the requested order and the first failure aborts the run.
/// Tracks written before the failure are left on disk.
pub fn route(source: &impl AlignmentSource, config: &Config) -> Result<Vec<PathBuf>> {
    let requests = config.requests()?;

    let mut produced = Vec::with_capacity(requests.len());
    for request in requests {
        produced.push(run(source, request)?);
    }
    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strandcov_core_rs::loc::{Interval, Strand};
    use strandcov_core_rs::ngs::Mate;

    fn read(contig: &str, start: u64, end: u64, strand: Strand) -> AlignedRead {
        AlignedRead::new(contig, Interval::new(start, end).unwrap(), strand).unwrap()
    }

    fn reads() -> Vec<AlignedRead> {
        vec![
            read("chr1", 100, 200, Strand::Forward),
            read("chr1", 150, 250, Strand::Forward),
            read("chr1", 300, 400, Strand::Forward),
            read("chr2", 0, 10, Strand::Reverse),
        ]
    }

    #[test]
    fn test_route_reverse_library() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("sample");
        let source = InMemorySource::new(reads());
        let config = Config::new("unused.bam", "reverse", prefix.to_string_lossy());

        let produced = route(&source, &config)?;
        assert_eq!(
            produced,
            vec![
                dir.path().join("sample.minus.bedgraph"),
                dir.path().join("sample.plus.bedgraph"),
            ]
        );
        assert_eq!(source.opened(), 2);

        assert_eq!(
            std::fs::read_to_string(&produced[0])?,
            "chr1\t100\t150\t1\nchr1\t150\t200\t2\nchr1\t200\t250\t1\nchr1\t300\t400\t1\n"
        );
        assert_eq!(std::fs::read_to_string(&produced[1])?, "chr2\t0\t10\t1\n");
        Ok(())
    }

    #[test]
    fn test_route_single_strand_with_extents() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("sample");
        let extents =
            ContigExtents::from_iter([("chr2".to_string(), 20), ("chr1".to_string(), 500)]);
        let source = InMemorySource::new(reads()).with_extents(extents);
        let config = Config::new("unused.bam", "forward", prefix.to_string_lossy())
            .with_strands(["-"])
            .with_output_mode(false, true)
            .with_trackline(true);

        let produced = route(&source, &config)?;
        assert_eq!(produced, vec![dir.path().join("sample.minus.bedgraph")]);
        assert_eq!(
            std::fs::read_to_string(&produced[0])?,
            "track type=bedGraph\nchr2\t0\t10\t1\nchr2\t10\t20\t0\nchr1\t0\t500\t0\n"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_config_touches_nothing() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let source = InMemorySource::new(reads());
        let config = Config::new("unused.bam", "forward", dir.path().join("x").to_string_lossy())
            .with_endpoints(true, true);

        assert!(matches!(route(&source, &config), Err(Error::MutuallyExclusiveOptions { .. })));
        assert_eq!(source.opened(), 0);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_fail_fast_on_malformed_records() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut reads = reads();
        for first in [true, true] {
            reads.push(
                read("chr1", 0, 10, Strand::Forward)
                    .with_mate(Mate::new("broken".to_string(), first, Some(Strand::Reverse))),
            );
        }
        let source = InMemorySource::new(reads);
        let config = Config::new("unused.bam", "forward", dir.path().join("x").to_string_lossy())
            .with_paired(true);

        assert!(matches!(route(&source, &config), Err(Error::MalformedRecord { .. })));
        assert_eq!(source.opened(), 1);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_bam() {
        let source = BamSource::new("/nonexistent/strandcov/input.bam").with_minmapq(5);
        assert!(matches!(source.open(), Err(Error::SourceNotFound { .. })));
    }
}
