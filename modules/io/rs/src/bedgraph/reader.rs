use super::record::BedGraph;
use crate::ReadRecord;
use eyre::{ensure, Context, OptionExt, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use strandcov_core_rs::loc::Interval;

pub mod parse {
    use super::*;

    pub fn interval<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Interval<u64>> {
        let start = parts.next().ok_or_eyre("Missing bedGraph start")?;
        let start = start.parse::<u64>().wrap_err("Invalid bedGraph start")?;

        let end = parts.next().ok_or_eyre("Missing bedGraph end")?;
        let end = end.parse::<u64>().wrap_err("Invalid bedGraph end")?;

        Interval::new(start, end).wrap_err("Invalid bedGraph interval")
    }

    pub fn value<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<f64> {
        let value = parts.next().ok_or_eyre("Missing bedGraph value")?;
        value.parse::<f64>().wrap_err("Invalid bedGraph value")
    }

    pub fn bedgraph<'a>(
        parts: &mut impl Iterator<Item = &'a str>,
        into: &mut BedGraph,
    ) -> Result<()> {
        let seqid = parts.next().ok_or_eyre("Missing bedGraph seqid")?;
        let interval = interval(parts)?;
        let value = value(parts)?;
        into.set(seqid, interval, value)?;
        Ok(())
    }

    /// Header lines carry no data and are skipped by the reader.
    pub fn is_header(line: &str) -> bool {
        line.is_empty()
            || line.starts_with('#')
            || line.starts_with("browser")
            || line.starts_with("track")
    }
}

pub struct Reader<R> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }
}

impl Reader<()> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Reader<BufReader<File>>> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open bedGraph file: {}", path.display()))?;
        Ok(Reader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = BedGraph;

    fn read_record(&mut self, into: &mut BedGraph) -> Result<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if parse::is_header(line) {
                continue;
            }

            let mut parts = line.split('\t');
            parse::bedgraph(&mut parts, into).wrap_err_with(|| {
                format!("Failed to parse bedGraph line {}: {}", self.line, line)
            })?;
            ensure!(
                parts.next().is_none(),
                "bedGraph line {} has too many fields: {}",
                self.line,
                line
            );
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(content: &str) -> Result<Vec<BedGraph>> {
        let mut records = Vec::new();
        Reader::new(Cursor::new(content)).read_to_end(&mut records)?;
        Ok(records)
    }

    #[test]
    fn test_empty_bedgraph() -> Result<()> {
        assert!(read_all("")?.is_empty());
        let headers = "track type=bedGraph name=x\n# comment\nbrowser position chr1\n";
        assert!(read_all(headers)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_valid_bedgraph() -> Result<()> {
        let content = "track type=bedGraph\n\
                       chr1\t0\t10\t2\n\
                       \n\
                       chr1\t10\t25\t0.5\r\n\
                       chr2\t5\t6\t-1.25";
        let expected = vec![
            BedGraph::new("chr1".into(), Interval::new(0, 10)?, 2.0)?,
            BedGraph::new("chr1".into(), Interval::new(10, 25)?, 0.5)?,
            BedGraph::new("chr2".into(), Interval::new(5, 6)?, -1.25)?,
        ];
        assert_eq!(read_all(content)?, expected);
        Ok(())
    }

    #[test]
    fn test_record_by_record() -> Result<()> {
        let mut reader = Reader::new(Cursor::new("chr1\t0\t1\t1\nchr1\t1\t2\t3\n"));
        let mut record = BedGraph::default();

        assert!(reader.read_record(&mut record)?);
        assert_eq!(record.interval(), &Interval::new(0, 1)?);
        assert!(reader.read_record(&mut record)?);
        assert_eq!(record.value(), &3.0);
        assert!(!reader.read_record(&mut record)?);
        Ok(())
    }

    #[test]
    fn test_invalid_bedgraph() {
        for content in [
            "chr1\t0\t10\n",
            "chr1\t10\t0\t1\n",
            "chr1\tx\t10\t1\n",
            "chr1\t0\t10\tone\n",
            "chr1\t0\t10\tNaN\n",
            "chr1\t0\t10\t1\textra\n",
        ] {
            assert!(read_all(content).is_err(), "{content:?}");
        }
    }

    #[test]
    fn test_error_mentions_line() {
        let err = read_all("track type=bedGraph\nchr1\t0\t10\t1\nchr1\t0\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }
}
