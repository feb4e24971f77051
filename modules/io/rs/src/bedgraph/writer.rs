use super::BedGraph;
use crate::WriteRecord;
use eyre::{Context, Result};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use strandcov_core_rs::loc::{Interval, IntervalOp};

/// Leading token of the UCSC track definition line.
pub const TRACK_LINE_MARKER: &str = "track type=bedGraph";

struct FormattedValue(f64);

impl Display for FormattedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Integers beyond 2^53 are not exactly representable anyway
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Format a bedGraph value: whole numbers without a decimal point, everything else as the
/// shortest decimal representation that parses back to the same number.
pub fn format_value(value: f64) -> impl Display {
    FormattedValue(value)
}

pub struct Writer<W> {
    writer: W,
}

impl Writer<()> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Writer<BufWriter<File>>> {
        let path = path.as_ref();
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create bedGraph file: {}", path.display()))?;
        Ok(Writer::new(BufWriter::new(file)))
    }
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the track definition line. Attributes are appended verbatim after the marker.
    pub fn write_track_line(&mut self, attributes: Option<&str>) -> Result<()> {
        match attributes.map(str::trim).filter(|x| !x.is_empty()) {
            Some(attributes) => writeln!(self.writer, "{} {}", TRACK_LINE_MARKER, attributes)?,
            None => writeln!(self.writer, "{}", TRACK_LINE_MARKER)?,
        }
        Ok(())
    }

    /// Write a single data line without materializing a [`BedGraph`] record.
    pub fn write_interval(
        &mut self,
        seqid: &str,
        interval: &Interval<u64>,
        value: f64,
    ) -> Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}",
            seqid,
            interval.start(),
            interval.end(),
            format_value(value)
        )?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> WriteRecord for Writer<W> {
    type Record = BedGraph;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        self.write_interval(record.seqid(), record.interval(), *record.value())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
