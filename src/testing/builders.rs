//! Test data builders for sources.

use crate::options::{ParallelOptions, StreamOptions};
use crate::source::Element;
use crate::{ParallelStream, Stream};
use anyhow::Result;
use std::ops::RangeInclusive;

/// A fluent builder for test sources.
///
/// # Example
///
/// ```
/// use ironstream::testing::TestDataBuilder;
///
/// let data = TestDataBuilder::new()
///     .add_range(1..=10)
///     .add_value(100)
///     .add_repeated(42, 5)
///     .build();
///
/// assert_eq!(data.len(), 16); // 10 + 1 + 5
/// ```
#[derive(Clone, Debug, Default)]
pub struct TestDataBuilder<T> {
    data: Vec<T>,
}

impl<T> TestDataBuilder<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn add_value(mut self, value: T) -> Self {
        self.data.push(value);
        self
    }

    #[must_use]
    pub fn add_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.data.extend(values);
        self
    }

    /// Append `count` copies of `value`.
    ///
    /// ```
    /// use ironstream::testing::TestDataBuilder;
    ///
    /// let data = TestDataBuilder::new().add_repeated("x", 3).build();
    /// assert_eq!(data, vec!["x", "x", "x"]);
    /// ```
    #[must_use]
    pub fn add_repeated(mut self, value: T, count: usize) -> Self
    where
        T: Clone,
    {
        self.data.extend(std::iter::repeat_n(value, count));
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: From<i32>> TestDataBuilder<T> {
    /// Append every integer of `range`, converted to `T`.
    #[must_use]
    pub fn add_range(mut self, range: RangeInclusive<i32>) -> Self {
        self.data.extend(range.map(T::from));
        self
    }
}

impl<T: Element> TestDataBuilder<T> {
    /// A sequential stream over the data, with default options.
    #[must_use]
    pub fn stream(self) -> Stream<T> {
        Stream::new(self.data)
    }

    #[must_use]
    pub fn stream_with(self, options: StreamOptions) -> Stream<T> {
        Stream::with_options(self.data, options)
    }

    /// A parallel stream over the data with exactly `workers` workers.
    ///
    /// # Errors
    /// Fails if the worker pool cannot be built.
    pub fn parallel(self, workers: usize) -> Result<ParallelStream<T>> {
        ParallelStream::with_options(self.data, ParallelOptions::new().with_workers(workers))
    }
}

/// Whitespace-separated words of `text`, owned.
///
/// ```
/// use ironstream::testing::words;
///
/// assert_eq!(words("to be  or"), vec!["to", "be", "or"]);
/// ```
#[must_use]
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Values with a known frequency ranking: value `k` (for `k` in `1..=distinct`)
/// occurs `distinct + 1 - k` times, interleaved round-robin so that equal
/// values are spread across the whole index space.
///
/// ```
/// use ironstream::testing::ranked_values;
///
/// assert_eq!(ranked_values(3), vec![1, 2, 3, 1, 2, 1]);
/// ```
#[must_use]
pub fn ranked_values(distinct: u32) -> Vec<u32> {
    let mut data = Vec::new();
    for round in 0..distinct {
        data.extend(1..=distinct - round);
    }
    data
}
