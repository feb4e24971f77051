pub use accumulate::{accumulate, AccumulateOptions, ContigCoverage, ContigExtents, CoverageRun};
pub use config::Config;
pub use error::{Error, Result};
pub use normalize::{normalize, Endpoint, NormalizeOptions, Normalizer};
pub use policy::StrandAssignment;
pub use request::CoverageRequest;
pub use router::{route, AlignmentSource, BamSource, InMemorySource, OpenedSource};
pub use span::GenomicSpan;
pub use track::{FileType, TrackOptions};

pub mod accumulate;
mod config;
mod error;
pub mod normalize;
pub mod policy;
mod request;
pub mod router;
mod span;
pub mod track;
