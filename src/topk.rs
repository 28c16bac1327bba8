//! Frequency ranking: the `n` most frequent distinct values.
//!
//! [`FrequencyCounter`] builds the full value → count map, then
//! [`into_top`](FrequencyCounter::into_top) heapifies every distinct value and
//! pops `n` of them. Memory is proportional to the number of distinct values,
//! not to `n`.
//!
//! Among equal counts, the value first seen at the lower position wins. Each
//! engine records positions as source indices (parallel) or arrival order
//! (sequential), so the ranking is deterministic for a given input.
//!
//! ```
//! use ironstream::topk::{top_k, CountVal};
//!
//! let source = vec![1, 1, 1, 2, 2, 3];
//! assert_eq!(top_k(&source, 2), vec![CountVal::new(3, 1), CountVal::new(2, 2)]);
//! ```

use crate::source::{Element, IndexedSource};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// An occurrence count paired with the value it counts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountVal<T> {
    pub count: usize,
    pub value: T,
}

impl<T> CountVal<T> {
    #[must_use]
    pub const fn new(count: usize, value: T) -> Self {
        Self { count, value }
    }
}

struct Tally<V> {
    count: usize,
    first: usize,
    value: V,
}

/// Heap entry: ordered by count, then by earliest first occurrence.
struct Ranked<V>(Tally<V>);

impl<V> PartialEq for Ranked<V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V> Eq for Ranked<V> {}

impl<V> PartialOrd for Ranked<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for Ranked<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .count
            .cmp(&other.0.count)
            .then_with(|| other.0.first.cmp(&self.0.first))
    }
}

/// Counts occurrences of keys, remembering the value and position of each
/// key's first occurrence.
///
/// `K` is the equality strategy and `V` the value reported for it; the plain
/// case counts values by themselves (`K == V`).
pub struct FrequencyCounter<K, V = K> {
    tallies: HashMap<K, Tally<V>>,
    observed: usize,
}

impl<K: Eq + Hash, V> Default for FrequencyCounter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> FrequencyCounter<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tallies: HashMap::new(),
            observed: 0,
        }
    }

    /// Count one occurrence of `key`, observed at `position`.
    pub fn record(&mut self, key: K, value: V, position: usize) {
        self.record_many(key, value, position, 1);
    }

    fn record_many(&mut self, key: K, value: V, position: usize, count: usize) {
        self.observed += count;
        match self.tallies.entry(key) {
            Entry::Occupied(mut e) => {
                let tally = e.get_mut();
                tally.count += count;
                if position < tally.first {
                    tally.first = position;
                    tally.value = value;
                }
            }
            Entry::Vacant(e) => {
                e.insert(Tally {
                    count,
                    first: position,
                    value,
                });
            }
        }
    }

    /// Fold another counter into this one. Positions must come from the same
    /// index space for the tie-break to stay meaningful.
    pub fn merge(&mut self, other: Self) {
        for (key, tally) in other.tallies {
            self.record_many(key, tally.value, tally.first, tally.count);
        }
    }

    /// Number of distinct keys seen so far.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        self.tallies.len()
    }

    /// Total number of occurrences recorded.
    #[must_use]
    pub const fn observed(&self) -> usize {
        self.observed
    }

    /// The `n` most frequent keys' values, highest count first.
    #[must_use]
    pub fn into_top(self, n: usize) -> Vec<CountVal<V>> {
        if n == 0 {
            return Vec::new();
        }
        let mut heap: BinaryHeap<Ranked<V>> = self.tallies.into_values().map(Ranked).collect();
        let mut out = Vec::with_capacity(n.min(heap.len()));
        while out.len() < n {
            let Some(Ranked(tally)) = heap.pop() else {
                break;
            };
            out.push(CountVal::new(tally.count, tally.value));
        }
        out
    }
}

impl<T: Eq + Hash + Clone> FrequencyCounter<T> {
    /// Count `value` by its own equality.
    pub fn add(&mut self, value: T, position: usize) {
        self.record(value.clone(), value, position);
    }
}

/// Top-`n` values of a whole source, by frequency.
#[must_use]
pub fn top_k<T, S>(source: &S, n: usize) -> Vec<CountVal<T>>
where
    T: Element + Eq + Hash,
    S: IndexedSource<T> + ?Sized,
{
    let mut counter: FrequencyCounter<T> = FrequencyCounter::new();
    for i in 0..source.len() {
        counter.add(source.get(i), i);
    }
    counter.into_top(n)
}
