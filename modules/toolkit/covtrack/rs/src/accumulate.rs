use std::num::NonZeroU32;

use ahash::AHashMap;
use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use itertools::Itertools;
use strandcov_core_rs::loc::{Interval, IntervalOp};

use crate::span::GenomicSpan;

#[derive(Clone, PartialEq, Debug, Getters)]
pub struct AccumulateOptions {
    /// Maximal reported depth. Positions covered deeper are reported at the ceiling.
    depth_ceiling: Option<NonZeroU32>,
    /// Report zero-depth runs instead of leaving gaps.
    include_zero: bool,
    /// Factor applied to the (ceiled) depth of every run.
    scale: f64,
}

impl Default for AccumulateOptions {
    fn default() -> Self {
        Self {
            depth_ceiling: None,
            include_zero: false,
            scale: 1.0,
        }
    }
}

impl AccumulateOptions {
    pub fn with_depth_ceiling(mut self, ceiling: Option<NonZeroU32>) -> Self {
        self.depth_ceiling = ceiling;
        self
    }

    pub fn with_include_zero(mut self, include_zero: bool) -> Self {
        self.include_zero = include_zero;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Known contig lengths, in the order contigs should be reported.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ContigExtents {
    contigs: Vec<(String, u64)>,
}

impl ContigExtents {
    pub fn new(contigs: Vec<(String, u64)>) -> Self {
        Self { contigs }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.contigs.iter().map(|(name, length)| (name.as_str(), *length))
    }
}

impl FromIterator<(String, u64)> for ContigExtents {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Maximal interval of constant depth.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Dissolve, Getters, Constructor)]
pub struct CoverageRun {
    interval: Interval<u64>,
    depth: f64,
}

/// Coverage runs of a single contig, sorted and non-overlapping.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters, Constructor)]
pub struct ContigCoverage {
    contig: String,
    runs: Vec<CoverageRun>,
}

impl ContigCoverage {
    /// Flat `(contig, run)` view of the coverage.
    pub fn iter_runs(&self) -> impl Iterator<Item = (&str, &CoverageRun)> {
        self.runs.iter().map(move |run| (self.contig.as_str(), run))
    }
}

/// Run-length encoded depth built by a single sweep over the breakpoints of a contig.
struct Sweep {
    ceiling: u64,
    include_zero: bool,
    runs: Vec<(u64, u64, u64)>,
}

impl Sweep {
    fn new(options: &AccumulateOptions) -> Self {
        Self {
            ceiling: options.depth_ceiling.map_or(u64::MAX, |x| x.get() as u64),
            include_zero: options.include_zero,
            runs: Vec::new(),
        }
    }

    fn emit(&mut self, start: u64, end: u64, depth: u64) {
        let depth = depth.min(self.ceiling);
        if depth == 0 && !self.include_zero {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.1 == start && last.2 == depth => last.1 = end,
            _ => self.runs.push((start, end, depth)),
        }
    }

    /// Breakpoints are `(position, delta)` pairs. Sorting them by position and then by delta
    /// applies closing events before opening ones at the same coordinate.
    fn run(
        mut self,
        mut breakpoints: Vec<(u64, i64)>,
        length: Option<u64>,
    ) -> Vec<(u64, u64, u64)> {
        breakpoints.sort_unstable();

        let bounded = self.include_zero && length.is_some();
        let mut prev = bounded.then_some(0);
        let mut depth: i64 = 0;
        for (pos, delta) in breakpoints {
            if let Some(prev) = prev {
                if pos > prev {
                    self.emit(prev, pos, depth as u64);
                }
            }
            depth += delta;
            debug_assert!(depth >= 0, "Coverage depth went negative at {pos}");
            prev = Some(pos);
        }
        debug_assert_eq!(depth, 0);

        if let (true, Some(length), Some(prev)) = (bounded, length, prev) {
            if length > prev {
                self.emit(prev, length, 0);
            }
        }
        self.runs
    }
}

/// Accumulate spans into per-contig coverage runs.
///
/// Contigs listed in `extents` come first in their listed order, all others follow sorted by
/// name. With `include_zero`, zero-depth runs are reported between spans and, for contigs
/// with a known extent, before the first span, after the last one, and over contigs that
/// have no spans at all.
pub fn accumulate(
    spans: impl IntoIterator<Item = GenomicSpan>,
    options: &AccumulateOptions,
    extents: Option<&ContigExtents>,
) -> Vec<ContigCoverage> {
    let mut breakpoints: AHashMap<String, Vec<(u64, i64)>> = AHashMap::new();
    for span in spans {
        let (contig, interval, _, weight) = span.dissolve();
        let bps = breakpoints.entry(contig).or_default();
        bps.push((interval.start(), weight as i64));
        bps.push((interval.end(), -(weight as i64)));
    }

    let mut result = Vec::with_capacity(breakpoints.len());
    let mut process = |contig: String, bps: Vec<(u64, i64)>, length: Option<u64>| {
        let runs = Sweep::new(options).run(bps, length);
        if runs.is_empty() {
            return;
        }
        log::debug!("{}: {} coverage runs", contig, runs.len());

        let runs = runs
            .into_iter()
            .filter_map(|(start, end, depth)| {
                Interval::new(start, end)
                    .ok()
                    .map(|interval| CoverageRun::new(interval, depth as f64 * options.scale))
            })
            .collect();
        result.push(ContigCoverage::new(contig, runs));
    };

    for (contig, length) in extents.into_iter().flat_map(|x| x.iter()) {
        let bps = breakpoints.remove(contig).unwrap_or_default();
        process(contig.to_owned(), bps, Some(length));
    }
    for (contig, bps) in breakpoints.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
        process(contig, bps, None);
    }
    result
}
