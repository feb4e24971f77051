use std::fmt::Debug;

/// Primitive integers usable as genomic coordinates.
pub trait PrimInt: ::num::PrimInt + Debug + Default {}

impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}
