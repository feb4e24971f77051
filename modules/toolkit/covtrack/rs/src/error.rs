use std::path::PathBuf;

use strandcov_io_rs::bam::RecordError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid library type '{label}', expected one of: {expected}")]
    InvalidProtocolLabel { label: String, expected: String },

    #[error("Strand must be '+' or '-', got '{selector}'")]
    InvalidStrandSelector { selector: String },

    #[error("{first} and {second} are mutually exclusive")]
    MutuallyExclusiveOptions {
        first: &'static str,
        second: &'static str,
    },

    #[error("Either bg or bga output mode must be selected")]
    MissingOutputMode,

    #[error("Invalid value '{value}' for {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Alignment source {} can't be opened", path.display())]
    SourceNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },

    #[error("Failed to write coverage track {}", path.display())]
    WriteError {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Failure reported by the alignment decoder or another library crate.
    #[error("{0:#}")]
    Source(eyre::Report),
}

impl From<eyre::Report> for Error {
    fn from(report: eyre::Report) -> Self {
        match report.downcast::<RecordError>() {
            Ok(malformed) => {
                let (record, reason) = malformed.dissolve();
                Error::MalformedRecord { record, reason }
            }
            Err(report) => Error::Source(report),
        }
    }
}

impl Error {
    pub(crate) fn write_error(path: impl Into<PathBuf>, report: eyre::Report) -> Self {
        Error::WriteError {
            path: path.into(),
            source: report.into(),
        }
    }
}
