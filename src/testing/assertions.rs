//! Assertions over stream output.
//!
//! Failures panic with both collections in the message, so a failing test
//! shows what the stream actually produced.

use crate::split::PartitionRange;
use crate::topk::CountVal;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or at any index.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    if let Some(i) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        panic!(
            "Collection mismatch at index {i}:\n  Expected: {:?}\n  Actual: {:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}",
            expected[i], actual[i]
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
///
/// Panics if any element occurs a different number of times in each.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 2, 1], &[1, 1, 2, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    fn tally<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
        let mut counts = HashMap::new();
        for item in items {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }

    let (have, want) = (tally(actual), tally(expected));
    if have != want {
        let missing: Vec<_> = want
            .iter()
            .filter(|&(k, n)| have.get(k) != Some(n))
            .collect();
        panic!(
            "Collection content mismatch:\n  Expected (value, count) not matched: {missing:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

/// Assert that a top-K result is ranked: counts never increase and no value
/// appears twice.
///
/// # Panics
///
/// Panics on an increasing count or a repeated value.
///
/// # Example
///
/// ```
/// use ironstream::CountVal;
/// use ironstream::testing::assert_counts_descending;
///
/// assert_counts_descending(&[CountVal::new(3, 'a'), CountVal::new(3, 'b'), CountVal::new(1, 'c')]);
/// ```
pub fn assert_counts_descending<T: Debug + PartialEq>(ranked: &[CountVal<T>]) {
    for (i, pair) in ranked.windows(2).enumerate() {
        assert!(
            pair[0].count >= pair[1].count,
            "Count increases at index {}:\n  {:?} then {:?}\n  Ranking: {ranked:?}",
            i + 1,
            pair[0],
            pair[1]
        );
    }
    for (i, entry) in ranked.iter().enumerate() {
        assert!(
            !ranked[..i].iter().any(|earlier| earlier.value == entry.value),
            "Value {:?} ranked twice\n  Ranking: {ranked:?}",
            entry.value
        );
    }
}

/// Assert that `actual` is an in-order prefix of `full`, as a deadline
/// truncated result must be.
///
/// # Panics
///
/// Panics if `actual` is longer than `full` or diverges from it.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_prefix_of;
///
/// assert_prefix_of(&[1, 2], &[1, 2, 3]);
/// ```
pub fn assert_prefix_of<T: Debug + PartialEq>(actual: &[T], full: &[T]) {
    assert!(
        actual.len() <= full.len(),
        "Result longer than the full output:\n  Actual length: {}\n  Full length: {}",
        actual.len(),
        full.len()
    );
    assert_collections_equal(actual, &full[..actual.len()]);
}

/// Assert that `ranges` tile `[0, size)`: contiguous, in order, non-empty, and
/// with lengths differing by at most one.
///
/// # Panics
///
/// Panics if any of those properties fails.
///
/// # Example
///
/// ```
/// use ironstream::split::split;
/// use ironstream::testing::assert_partition_covers;
///
/// assert_partition_covers(&split(10, 3), 10);
/// ```
pub fn assert_partition_covers(ranges: &[PartitionRange], size: usize) {
    if size == 0 {
        assert!(ranges.is_empty(), "Expected no ranges for an empty source, got {ranges:?}");
        return;
    }

    let mut next = 0;
    for (i, range) in ranges.iter().enumerate() {
        assert_eq!(
            range.from, next,
            "Range {i} does not start where the previous one ended:\n  Ranges: {ranges:?}"
        );
        assert!(!range.is_empty(), "Range {i} is empty:\n  Ranges: {ranges:?}");
        next = range.to;
    }
    assert_eq!(next, size, "Ranges do not reach {size}:\n  Ranges: {ranges:?}");

    let longest = ranges.iter().map(PartitionRange::len).max().unwrap_or(0);
    let shortest = ranges.iter().map(PartitionRange::len).min().unwrap_or(0);
    assert!(
        longest - shortest <= 1,
        "Range lengths differ by more than one ({shortest}..={longest}):\n  Ranges: {ranges:?}"
    );
}
