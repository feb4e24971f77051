use std::path::{Path, PathBuf};

use derive_getters::Getters;
use strandcov_io_rs::bedgraph::Writer;
use strandcov_io_rs::WriteRecord;

use crate::accumulate::ContigCoverage;
use crate::error::{Error, Result};

/// Formats a coverage track can be written in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum FileType {
    #[default]
    BedGraph,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::BedGraph => "bedgraph",
        }
    }

    /// `<prefix>.<extension>`. The prefix may contain dots and directories.
    pub fn path_for(&self, prefix: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", prefix, self.extension()))
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Getters)]
pub struct TrackOptions {
    /// Emit the `track type=bedGraph` definition line.
    header: bool,
    /// Free-form attributes appended to the definition line.
    attributes: Option<String>,
}

impl TrackOptions {
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_attributes(mut self, attributes: Option<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Write coverage runs to a bedGraph file, replacing the file if it exists.
/// Nothing is removed if writing fails midway.
pub fn write(coverage: &[ContigCoverage], path: &Path, options: &TrackOptions) -> Result<PathBuf> {
    let wrap = |err| Error::write_error(path, err);

    let mut writer = Writer::from_path(path).map_err(wrap)?;
    if options.header {
        writer.write_track_line(options.attributes.as_deref()).map_err(wrap)?;
    }

    let mut lines = 0;
    for (contig, run) in coverage.iter().flat_map(|x| x.iter_runs()) {
        writer
            .write_interval(contig, run.interval(), *run.depth())
            .map_err(wrap)?;
        lines += 1;
    }
    writer.flush().map_err(wrap)?;

    log::debug!("{} runs written to {}", lines, path.display());
    Ok(path.to_path_buf())
}
