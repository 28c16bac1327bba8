//! Distinct stages: drop repeated values, keeping first occurrences in
//! encounter order.
//!
//! - [`Stream::distinct`] compares elements by their own `Eq + Hash`.
//! - [`Stream::distinct_by`] compares elements by a caller-supplied key, for
//!   payloads whose structural equality is not the one you want.
//!
//! The stage keeps every key seen so far, so memory grows with the number of
//! distinct values.

use crate::Stream;
use crate::source::Element;
use std::collections::HashSet;
use std::hash::Hash;

impl<T: Element + Eq + Hash> Stream<T> {
    /// First occurrence of each distinct element, in original order.
    ///
    /// ```
    /// use ironstream::Stream;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let v = Stream::new(vec![1, 2, 2, 3, 1]).distinct().collect()?;
    /// assert_eq!(v, vec![1, 2, 3]);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn distinct(self) -> Self {
        self.chain("distinct", move |input, ctx| {
            let mut seen: HashSet<T> = HashSet::new();
            for item in ctx.inputs(&input) {
                if seen.insert(item.clone()) && !ctx.emit(item) {
                    break;
                }
            }
        })
    }
}

impl<T: Element> Stream<T> {
    /// Like [`distinct`](Self::distinct), with equality decided by `key`.
    #[must_use]
    pub fn distinct_by<K, F>(self, mut key: F) -> Self
    where
        K: Eq + Hash + Send + 'static,
        F: FnMut(&T) -> K + Send + 'static,
    {
        self.chain("distinct_by", move |input, ctx| {
            let mut seen: HashSet<K> = HashSet::new();
            for item in ctx.inputs(&input) {
                if seen.insert(key(&item)) && !ctx.emit(item) {
                    break;
                }
            }
        })
    }
}
