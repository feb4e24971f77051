use eyre::{Context, Result};
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::cigar::Op;
use std::io;
use strandcov_core_rs::loc::{Interval, IntervalOp};

fn push_fused(saveto: &mut Vec<Interval<u64>>, start: u64, end: u64) -> Result<()> {
    match saveto.last_mut() {
        Some(last) if last.end() == start => last.extend_to(end)?,
        _ => saveto.push(Interval::new(start, end)?),
    }
    Ok(())
}

/// Walk the CIGAR starting at the 0-based reference position `start`.
///
/// Aligned pieces (`M`, `=`, `X`) are appended to `blocks`, deletions (`D`) to `deletions`.
/// Touching pieces of the same kind are fused, e.g. `10M2I10M` yields a single block.
/// Skips (`N`) advance the position without producing anything, as do zero-length operations.
/// Returns the exclusive end of the alignment on the reference.
pub fn parse(
    mut start: u64,
    cigar: impl Iterator<Item = io::Result<Op>>,
    blocks: &mut Vec<Interval<u64>>,
    deletions: &mut Vec<Interval<u64>>,
) -> Result<u64> {
    for op in cigar {
        let op = op.wrap_err("Failed to decode CIGAR operation")?;
        let len = op.len() as u64;
        if len == 0 {
            continue;
        }

        match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                push_fused(blocks, start, start + len)?;
                start += len;
            }
            Kind::Deletion => {
                push_fused(deletions, start, start + len)?;
                start += len;
            }
            Kind::Skip => {
                start += len;
            }
            Kind::Insertion | Kind::SoftClip | Kind::HardClip | Kind::Pad => {}
        }
    }
    Ok(start)
}
