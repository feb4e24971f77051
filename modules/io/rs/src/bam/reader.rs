use std::fs::File;
use std::io;
use std::path::PathBuf;

use derive_getters::{Dissolve, Getters};
use eyre::{eyre, Context, Result};
use noodles::sam::alignment::record::Flags;
use noodles::{bam, bgzf, sam};

use strandcov_core_rs::loc::{Interval, Strand};
use strandcov_core_rs::ngs::{AlignedRead, Mate};

use super::cigar;

/// A record that was read successfully but can't be turned into an [`AlignedRead`].
#[derive(Debug, Clone, PartialEq, Eq, Dissolve, Getters, thiserror::Error)]
#[error("Malformed BAM record {record}: {reason}")]
pub struct RecordError {
    record: String,
    reason: String,
}

impl RecordError {
    pub fn new(record: String, reason: String) -> Self {
        Self { record, reason }
    }
}

/// Sequential BAM reader that decodes alignments into [`AlignedRead`]s.
///
/// Records are filtered by flags and mapping quality before decoding. Records without a
/// reference sequence, a position, or any aligned base are skipped as well.
#[derive(Getters)]
pub struct Reader {
    filename: PathBuf,
    #[getter(skip)]
    inner: bam::io::Reader<bgzf::io::Reader<File>>,
    header: sam::header::Header,
    contigs: Vec<String>,
    #[getter(skip)]
    record: bam::Record,
    inflags: u16,
    exflags: u16,
    minmapq: u8,
    /// Number of BAM records consumed so far, including the filtered ones.
    processed: u64,
    /// Number of records rejected by the filters.
    skipped: u64,
}

impl Reader {
    pub(super) fn open(
        filename: PathBuf,
        inflags: u16,
        exflags: u16,
        minmapq: u8,
    ) -> io::Result<Self> {
        let file = File::open(&filename)?;
        let mut inner = bam::io::Reader::new(file);
        let header = inner.read_header()?;

        let contigs = header
            .reference_sequences()
            .keys()
            .map(|name| name.to_string())
            .collect();

        Ok(Self {
            filename,
            inner,
            header,
            contigs,
            record: bam::Record::default(),
            inflags,
            exflags,
            minmapq,
            processed: 0,
            skipped: 0,
        })
    }

    /// Reference sequences and their lengths in header order.
    pub fn extents(&self) -> Vec<(String, u64)> {
        self.header
            .reference_sequences()
            .iter()
            .map(|(name, map)| (name.to_string(), map.length().get() as u64))
            .collect()
    }

    fn is_record_ok(&self, flags: u16) -> bool {
        let mapq = self.record.mapping_quality().map(|x| x.get()).unwrap_or(255);
        flags & self.inflags == self.inflags && flags & self.exflags == 0 && mapq >= self.minmapq
    }

    fn decode(&mut self) -> Result<Option<AlignedRead>> {
        let flags = self.record.flags();
        if flags.is_unmapped() || !self.is_record_ok(u16::from(flags)) {
            return Ok(None);
        }

        let (contig, start) = match (
            self.record.reference_sequence_id().transpose()?,
            self.record.alignment_start().transpose()?,
        ) {
            (Some(contig), Some(start)) => (contig, start.get() as u64 - 1),
            _ => return Ok(None),
        };
        let contig = self
            .contigs
            .get(contig)
            .ok_or_else(|| eyre!("Reference sequence #{contig} is not listed in the header"))?;

        let mut blocks = Vec::new();
        let mut deletions = Vec::new();
        let end = cigar::parse(start, self.record.cigar().iter(), &mut blocks, &mut deletions)?;
        if blocks.is_empty() {
            log::debug!("Skipping a record without aligned bases at {contig}:{start}");
            return Ok(None);
        }

        // Leading and trailing deletions are part of the alignment span
        let strand = Strand::from_reverse_flag(flags.is_reverse_complemented());
        let mut read = AlignedRead::new(contig.as_str(), Interval::new(start, end)?, strand)?
            .with_blocks(blocks)?
            .with_deletions(deletions)?
            .with_fragment_length(self.record.template_length().unsigned_abs() as u64);

        if let Some(mate) = self.mate(flags) {
            read = read.with_mate(mate);
        }
        Ok(Some(read))
    }

    fn mate(&self, flags: Flags) -> Option<Mate> {
        if !flags.is_segmented() {
            return None;
        }
        let id = self.record.name()?.to_string();
        let strand = (!flags.is_mate_unmapped())
            .then(|| Strand::from_reverse_flag(flags.is_mate_reverse_complemented()));
        Some(Mate::new(id, flags.is_first_segment(), strand))
    }

    fn describe(&self) -> String {
        match self.record.name() {
            Some(name) => format!("#{} ({})", self.processed, name),
            None => format!("#{}", self.processed),
        }
    }
}

impl Iterator for Reader {
    type Item = Result<AlignedRead>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.read_record(&mut self.record) {
                Ok(0) => {
                    log::info!(
                        "{}: {} records read, {} filtered out",
                        self.filename.display(),
                        self.processed,
                        self.skipped
                    );
                    return None;
                }
                Ok(_) => self.processed += 1,
                Err(err) => {
                    return Some(Err(err).wrap_err_with(|| {
                        format!(
                            "Failed to read BAM record #{} from {}",
                            self.processed + 1,
                            self.filename.display()
                        )
                    }))
                }
            }

            match self.decode() {
                Ok(Some(read)) => return Some(Ok(read)),
                Ok(None) => self.skipped += 1,
                Err(err) => {
                    let malformed = RecordError {
                        record: self.describe(),
                        reason: format!("{err:#}"),
                    };
                    return Some(Err(malformed.into()));
                }
            }
        }
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("filename", &self.filename)
            .field("contigs", &self.contigs.len())
            .field("processed", &self.processed)
            .finish()
    }
}
