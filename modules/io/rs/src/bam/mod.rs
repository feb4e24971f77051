pub use builder::{ReaderBuilder, DEFAULT_EXFLAGS};
pub use reader::{Reader, RecordError};

mod builder;
pub mod cigar;
mod reader;
