use std::io;
use std::path::PathBuf;

use super::Reader;

/// Exclude unmapped (0x4), secondary (0x100), QC-failed (0x200) and supplementary (0x800) records.
pub const DEFAULT_EXFLAGS: u16 = 0x4 | 0x100 | 0x200 | 0x800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderBuilder {
    filename: PathBuf,
    inflags: Option<u16>,
    exflags: Option<u16>,
    minmapq: Option<u8>,
}

impl ReaderBuilder {
    pub fn new<T: Into<PathBuf>>(filename: T) -> Self {
        Self {
            filename: filename.into(),
            inflags: None,
            exflags: None,
            minmapq: None,
        }
    }

    /// Flags that must all be set for a record to be decoded.
    pub fn with_inflags(mut self, inflags: u16) -> Self {
        self.inflags = Some(inflags);
        self
    }

    /// Flags that must all be unset for a record to be decoded.
    pub fn with_exflags(mut self, exflags: u16) -> Self {
        self.exflags = Some(exflags);
        self
    }

    pub fn with_minmapq(mut self, minmapq: u8) -> Self {
        self.minmapq = Some(minmapq);
        self
    }

    /// Open the file and read its header. Fails with the underlying I/O error if the file
    /// can't be opened or doesn't start with a valid BAM header.
    pub fn build(self) -> io::Result<Reader> {
        Reader::open(
            self.filename,
            self.inflags.unwrap_or(0),
            self.exflags.unwrap_or(DEFAULT_EXFLAGS),
            self.minmapq.unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exflags() {
        assert_eq!(DEFAULT_EXFLAGS, 2820);
    }

    #[test]
    fn test_missing_file() {
        let err = ReaderBuilder::new("/nonexistent/strandcov/input.bam")
            .with_minmapq(10)
            .build()
            .err()
            .map(|e| e.kind());
        assert_eq!(err, Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn test_not_a_bam() -> eyre::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        std::fs::write(file.path(), b"chr1\t0\t10\t1\n")?;
        assert!(ReaderBuilder::new(file.path()).build().is_err());
        Ok(())
    }
}
