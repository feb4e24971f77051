use eyre::Result;

/// Record-oriented counterpart of `std::io::Read`.
pub trait ReadRecord {
    type Record: Default;

    /// Parse the next record into `into`. Returns `false` once the input is exhausted, in which
    /// case `into` is left in an unspecified state.
    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool>;

    /// Append all remaining records to `into` and return how many were read.
    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize> {
        let mut total = 0;
        let mut record = Self::Record::default();
        while self.read_record(&mut record)? {
            into.push(std::mem::take(&mut record));
            total += 1;
        }
        Ok(total)
    }
}

/// Record-oriented counterpart of `std::io::Write`.
pub trait WriteRecord {
    type Record;

    fn write_record(&mut self, record: &Self::Record) -> Result<()>;

    /// Write records until the first failure. Returns the number of records written.
    fn write_records<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a Self::Record>,
    ) -> Result<usize>
    where
        Self::Record: 'a,
    {
        let mut written = 0;
        for record in records {
            self.write_record(record)?;
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<()>;
}
