//! Contiguous partitioning of an index space across workers.

use std::ops::Range;
use tracing::trace;

/// A half-open index interval `[from, to)` handed to one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionRange {
    pub from: usize,
    pub to: usize,
}

impl PartitionRange {
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.to - self.from
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// The indices covered by this range, in order.
    #[must_use]
    pub const fn indices(&self) -> Range<usize> {
        self.from..self.to
    }
}

/// Split `[0, size)` into at most `workers` contiguous ranges.
///
/// Ranges are returned in index order, never empty, and differ in length by
/// at most one (the first `size % parts` ranges carry the extra element).
/// `size == 0` yields no ranges; `workers == 0` is treated as one worker.
///
/// ```
/// use ironstream::split::{split, PartitionRange};
///
/// let ranges = split(10, 3);
/// assert_eq!(ranges, vec![
///     PartitionRange::new(0, 4),
///     PartitionRange::new(4, 7),
///     PartitionRange::new(7, 10),
/// ]);
/// ```
#[must_use]
pub fn split(size: usize, workers: usize) -> Vec<PartitionRange> {
    if size == 0 {
        return Vec::new();
    }
    let parts = workers.clamp(1, size);
    let base = size / parts;
    let extra = size % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut from = 0;
    for i in 0..parts {
        let len = if i < extra { base + 1 } else { base };
        ranges.push(PartitionRange::new(from, from + len));
        from += len;
    }
    trace!(size, workers, parts, "split index space");
    ranges
}
