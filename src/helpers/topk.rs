//! Top-K stage: the `n` most frequent values of the stream.
//!
//! Unlike the element-wise stages, Top is a barrier: it drains its whole
//! input into a [`FrequencyCounter`] before emitting anything. Output is
//! [`CountVal`]s, highest count first; ties go to the value that arrived first.
//!
//! ## Example
//! ```
//! use ironstream::{CountVal, Stream};
//!
//! # fn main() -> anyhow::Result<()> {
//! let top = Stream::new(vec![1, 1, 1, 2, 2, 3]).top(2).collect()?;
//! assert_eq!(top, vec![CountVal::new(3, 1), CountVal::new(2, 2)]);
//! # Ok(())
//! # }
//! ```

use crate::Stream;
use crate::source::Element;
use crate::topk::{CountVal, FrequencyCounter};
use std::hash::Hash;

impl<T: Element + Eq + Hash> Stream<T> {
    /// The `n` most frequent elements with their counts.
    ///
    /// Yields `min(n, distinct)` entries; `n == 0` yields none.
    #[must_use]
    pub fn top(self, n: usize) -> Stream<CountVal<T>> {
        self.top_by(n, T::clone)
    }
}

impl<T: Element> Stream<T> {
    /// Like [`top`](Self::top), counting elements by `key`. Each entry reports
    /// the first element seen for its key.
    #[must_use]
    pub fn top_by<K, F>(self, n: usize, mut key: F) -> Stream<CountVal<T>>
    where
        K: Eq + Hash + Send + 'static,
        F: FnMut(&T) -> K + Send + 'static,
    {
        self.chain("top", move |input, ctx| {
            let mut counter: FrequencyCounter<K, T> = FrequencyCounter::new();
            for (position, item) in ctx.inputs(&input).enumerate() {
                counter.record(key(&item), item, position);
            }
            for entry in counter.into_top(n) {
                if ctx.expired() || !ctx.emit(entry) {
                    break;
                }
            }
        })
    }
}
