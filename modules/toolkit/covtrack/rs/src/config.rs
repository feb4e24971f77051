use std::num::NonZeroU32;
use std::path::PathBuf;

use derive_getters::Getters;
use itertools::Itertools;
use strandcov_core_rs::loc::Strand;

use crate::accumulate::AccumulateOptions;
use crate::error::{Error, Result};
use crate::normalize::{Endpoint, NormalizeOptions};
use crate::policy;
use crate::request::CoverageRequest;
use crate::track::{FileType, TrackOptions};

/// User-facing settings of a coverage run. Nothing is checked until [`Config::requests`].
#[derive(Clone, PartialEq, Debug, Getters)]
pub struct Config {
    input: PathBuf,
    libtype: String,
    output_prefix: String,
    strands: Vec<String>,
    split: bool,
    paired: bool,
    fragment_size: bool,
    rescue_mate_strand: bool,
    ignore_deletions: bool,
    scale: f64,
    bg: bool,
    bga: bool,
    max_depth: Option<u32>,
    five_prime: bool,
    three_prime: bool,
    trackline: bool,
    trackopts: Option<String>,
}

impl Config {
    pub fn new(
        input: impl Into<PathBuf>,
        libtype: impl Into<String>,
        output_prefix: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            libtype: libtype.into(),
            output_prefix: output_prefix.into(),
            strands: vec!["+".to_string(), "-".to_string()],
            split: true,
            paired: false,
            fragment_size: false,
            rescue_mate_strand: true,
            ignore_deletions: false,
            scale: 1.0,
            bg: true,
            bga: false,
            max_depth: None,
            five_prime: false,
            three_prime: false,
            trackline: false,
            trackopts: None,
        }
    }

    pub fn with_strands<S: Into<String>>(mut self, strands: impl IntoIterator<Item = S>) -> Self {
        self.strands = strands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn with_paired(mut self, paired: bool) -> Self {
        self.paired = paired;
        self
    }

    pub fn with_fragment_size(mut self, fragment_size: bool) -> Self {
        self.fragment_size = fragment_size;
        self
    }

    pub fn with_rescue_mate_strand(mut self, rescue: bool) -> Self {
        self.rescue_mate_strand = rescue;
        self
    }

    pub fn with_ignore_deletions(mut self, ignore: bool) -> Self {
        self.ignore_deletions = ignore;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Report only covered intervals (`bg`) or include zero-depth intervals (`bga`).
    pub fn with_output_mode(mut self, bg: bool, bga: bool) -> Self {
        self.bg = bg;
        self.bga = bga;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_endpoints(mut self, five_prime: bool, three_prime: bool) -> Self {
        self.five_prime = five_prime;
        self.three_prime = three_prime;
        self
    }

    pub fn with_trackline(mut self, trackline: bool) -> Self {
        self.trackline = trackline;
        self
    }

    pub fn with_trackopts(mut self, trackopts: Option<String>) -> Self {
        self.trackopts = trackopts;
        self
    }

    fn strand_selectors(&self) -> Result<Vec<Strand>> {
        let strands: Vec<Strand> = self
            .strands
            .iter()
            .map(|selector| {
                selector.parse::<Strand>().map_err(|_| Error::InvalidStrandSelector {
                    selector: selector.clone(),
                })
            })
            .collect::<Result<_>>()?;
        Ok(strands.into_iter().unique().collect())
    }

    fn endpoint(&self) -> Result<Endpoint> {
        match (self.five_prime, self.three_prime) {
            (true, true) => Err(Error::MutuallyExclusiveOptions {
                first: "five_prime",
                second: "three_prime",
            }),
            (true, false) => Ok(Endpoint::FivePrime),
            (false, true) => Ok(Endpoint::ThreePrime),
            (false, false) => Ok(Endpoint::Full),
        }
    }

    fn include_zero(&self) -> Result<bool> {
        match (self.bg, self.bga) {
            (true, true) => Err(Error::MutuallyExclusiveOptions {
                first: "bg",
                second: "bga",
            }),
            (false, false) => Err(Error::MissingOutputMode),
            (_, bga) => Ok(bga),
        }
    }

    fn depth_ceiling(&self) -> Result<Option<NonZeroU32>> {
        match self.max_depth {
            None => Ok(None),
            Some(depth) => NonZeroU32::new(depth)
                .map(Some)
                .ok_or_else(|| Error::InvalidOption {
                    option: "max_depth",
                    value: depth.to_string(),
                    reason: "must be a positive integer",
                }),
        }
    }

    fn accumulate_options(&self) -> Result<AccumulateOptions> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidOption {
                option: "scale",
                value: self.scale.to_string(),
                reason: "must be a finite positive number",
            });
        }
        Ok(AccumulateOptions::default()
            .with_include_zero(self.include_zero()?)
            .with_depth_ceiling(self.depth_ceiling()?)
            .with_scale(self.scale))
    }

    fn normalize_options(&self) -> Result<NormalizeOptions> {
        let options = NormalizeOptions::default()
            .with_split_on_gaps(self.split)
            .with_paired_fragments(self.paired)
            .with_force_fragment_size(self.fragment_size)
            .with_rescue_mate_strand(self.rescue_mate_strand)
            .with_ignore_deletions(self.ignore_deletions)
            .with_endpoint(self.endpoint()?);

        if self.ignore_deletions && !self.split {
            log::warn!("Deletions are always covered without splitting, ignoreD has no effect");
        }
        if self.paired && self.fragment_size {
            log::warn!(
                "Paired fragments take precedence over the forced fragment size for properly \
                 paired reads"
            );
        }
        Ok(options)
    }

    fn track_options(&self) -> TrackOptions {
        let attributes = self
            .trackopts
            .as_ref()
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty());
        TrackOptions::default()
            .with_header(self.trackline || attributes.is_some())
            .with_attributes(attributes)
    }

    /// Validate every option and build one request per selected strand, in selection order.
    /// Fails on the first invalid option without touching the input or the outputs.
    pub fn requests(&self) -> Result<Vec<CoverageRequest>> {
        let assignment = policy::resolve(&self.libtype)?;
        let strands = self.strand_selectors()?;
        let accumulate = self.accumulate_options()?;
        let normalize = self.normalize_options()?;
        let track = self.track_options();

        if self.output_prefix.trim().is_empty() {
            return Err(Error::InvalidOption {
                option: "output_prefix",
                value: self.output_prefix.clone(),
                reason: "must not be empty",
            });
        }
        let prefixes = policy::name_prefixes(&self.output_prefix, assignment);

        Ok(strands
            .into_iter()
            .map(|strand| {
                let output = FileType::BedGraph.path_for(prefixes.get(strand));
                CoverageRequest::new(
                    strand,
                    normalize.clone(),
                    accumulate.clone(),
                    track.clone(),
                    output,
                )
            })
            .collect())
    }
}
