use std::path::PathBuf;

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use strandcov_core_rs::loc::Strand;

use crate::accumulate::AccumulateOptions;
use crate::normalize::NormalizeOptions;
use crate::track::TrackOptions;

/// Everything needed to produce the coverage track for reads aligned to one strand.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters, Constructor)]
pub struct CoverageRequest {
    strand: Strand,
    normalize: NormalizeOptions,
    accumulate: AccumulateOptions,
    track: TrackOptions,
    output: PathBuf,
}
