use derive_getters::Dissolve;
use derive_more::Constructor;

use super::strand::Strand;

/// Data kept separately for each genomic strand.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Dissolve, Constructor,
)]
pub struct PerStrand<T> {
    pub forward: T,
    pub reverse: T,
}

impl<T> PerStrand<T> {
    pub fn get(&self, strand: Strand) -> &T {
        match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => &self.reverse,
        }
    }

    /// Build the pair by evaluating `func` once per strand.
    pub fn from_fn(mut func: impl FnMut(Strand) -> T) -> Self {
        Self {
            forward: func(Strand::Forward),
            reverse: func(Strand::Reverse),
        }
    }
}
