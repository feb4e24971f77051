use std::fmt::{Debug, Display};
use std::rc::Rc;
use std::sync::Arc;

use crate::num::PrimInt;
use derive_getters::Dissolve;
use eyre::{ensure, Result};
use impl_tools::autoimpl;

/// Half-open genomic region `[start, end)` covering at least one position.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve)]
pub struct Interval<Idx: PrimInt> {
    start: Idx,
    end: Idx,
}

#[autoimpl(for <T: trait + ?Sized> &T, Box<T>, Rc<T>, Arc<T>)]
pub trait IntervalOp {
    type Idx: PrimInt;

    fn start(&self) -> Self::Idx;

    fn end(&self) -> Self::Idx;

    fn envelops(&self, other: &Self) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }
}

impl<T: PrimInt> IntervalOp for Interval<T> {
    type Idx = T;

    #[inline(always)]
    fn start(&self) -> T {
        self.start
    }

    #[inline(always)]
    fn end(&self) -> T {
        self.end
    }
}

impl<Idx: PrimInt> Interval<Idx> {
    pub fn new(start: Idx, end: Idx) -> Result<Self> {
        ensure!(start < end, "Invalid interval: start ({start:?}) >= end ({end:?})");
        Ok(Self { start, end })
    }

    pub fn single(pos: Idx) -> Self {
        Self {
            start: pos,
            end: pos + Idx::one(),
        }
    }

    /// `length` positions downstream of `start`, including it.
    pub fn downstream(start: Idx, length: Idx) -> Result<Self> {
        let end = start
            .checked_add(&length)
            .ok_or_else(|| eyre::eyre!("Interval end overflows: {start:?} + {length:?}"))?;
        Self::new(start, end)
    }

    /// `length` positions upstream of `end`, excluding it. Clipped at zero.
    pub fn upstream(end: Idx, length: Idx) -> Result<Self> {
        let start = end.checked_sub(&length).unwrap_or_else(Idx::zero);
        Self::new(start, end)
    }

    /// Smallest interval covering both, gaps included.
    pub fn hull(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extend the interval up to `end`. Fails if that would shrink it.
    pub fn extend_to(&mut self, end: Idx) -> Result<()> {
        ensure!(end >= self.end, "Can't extend {:?} backwards to {:?}", self, end);
        self.end = end;
        Ok(())
    }
}

impl<Idx: PrimInt + Display> Display for Interval<Idx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl<Idx: PrimInt> PartialEq<(Idx, Idx)> for Interval<Idx> {
    fn eq(&self, other: &(Idx, Idx)) -> bool {
        self.start == other.0 && self.end == other.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert_eq!(Interval::new(0, 10).unwrap(), (0, 10));
        assert!(Interval::new(1, 0).is_err());
        assert!(Interval::new(5u64, 5).is_err());
        assert_eq!(Interval::single(7u64), (7, 8));
        assert_eq!(Interval::new(3u64, 9).unwrap().to_string(), "[3, 9)");
    }

    #[test]
    fn test_downstream_upstream() {
        assert_eq!(Interval::downstream(100u64, 300).unwrap(), (100, 400));
        assert!(Interval::downstream(u64::MAX - 1, 5).is_err());
        assert!(Interval::downstream(10u64, 0).is_err());

        assert_eq!(Interval::upstream(150u64, 100).unwrap(), (50, 150));
        assert_eq!(Interval::upstream(150u64, 300).unwrap(), (0, 150));
    }

    #[test]
    fn test_envelops() {
        let interval = Interval::new(1, 10).unwrap();
        let touching = Interval::new(10, 12).unwrap();
        let inside = Interval::new(2, 5).unwrap();

        assert!(interval.envelops(&inside));
        assert!(interval.envelops(&interval));
        assert!(!inside.envelops(&interval));
        assert!(!interval.envelops(&touching));
    }

    #[test]
    fn test_hull_and_extend() {
        let mut interval = Interval::new(1u64, 10).unwrap();
        assert_eq!(interval.hull(&Interval::new(20, 30).unwrap()), (1, 30));
        assert_eq!(interval.hull(&Interval::new(0, 2).unwrap()), (0, 10));

        interval.extend_to(15).unwrap();
        assert_eq!(interval, (1, 15));
        assert!(interval.extend_to(12).is_err());
    }
}
