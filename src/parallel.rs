//! Fixed-partition parallel execution.
//!
//! A [`ParallelStream`] owns its source outright and splits `[0, len)` into
//! one contiguous [`PartitionRange`] per worker. Every operation fans out one
//! task per range onto the stream's worker pool and blocks until all of them
//! have finished:
//!
//! 1. each worker computes a partial result over its own indices, touching no
//!    index another worker touches;
//! 2. partials are handed to a merge step guarded by a single mutex;
//! 3. the rayon scope joining the tasks is the completion barrier.
//!
//! Order-preserving operations (`map`, `filter`, `flat_map`, `distinct`)
//! concatenate partials in range order, so their output matches the
//! sequential engine element for element.
//!
//! There is no deadline here: once started, a call runs to completion. A
//! panic in a caller closure is re-raised on the calling thread after the
//! remaining workers finish.
//!
//! ```
//! use ironstream::{ParallelOptions, ParallelStream};
//!
//! # fn main() -> anyhow::Result<()> {
//! let par = ParallelStream::with_options((0i64..1000).collect::<Vec<_>>(), ParallelOptions::new().with_workers(4))?;
//! assert_eq!(par.ranges().len(), 4);
//! assert_eq!(par.sum(|x| *x as f64), 499_500.0);
//! assert_eq!(par.filter(|x| x % 2 == 0).count(), 500);
//! # Ok(())
//! # }
//! ```

use crate::Stream;
use crate::error::StreamError;
use crate::options::{ParallelOptions, StreamOptions};
use crate::pipeline::{Pipeline, StageConfig};
use crate::source::{Element, IndexedSource, sort_source};
use crate::split::{PartitionRange, split};
use crate::topk::{CountVal, FrequencyCounter};
use anyhow::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub struct ParallelStream<T: Element> {
    source: Box<dyn IndexedSource<T>>,
    ranges: Vec<PartitionRange>,
    workers: usize,
    pool: Arc<ThreadPool>,
    /// Carried so [`into_stream`](Self::into_stream) restores the original
    /// sequential settings.
    stage_config: StageConfig,
}

fn build_pool(workers: usize) -> Result<Arc<ThreadPool>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("ironstream-worker-{i}"))
        .build()
        .map_err(|e| StreamError::ThreadPool(e.to_string()))?;
    Ok(Arc::new(pool))
}

fn default_stage_config() -> StageConfig {
    let opts = StreamOptions::default();
    StageConfig {
        buffer_size: opts.buffer_size,
        deadline: None,
    }
}

impl<T: Element> ParallelStream<T> {
    /// Wrap `source` with one worker per available CPU.
    ///
    /// # Errors
    /// Fails if the worker pool cannot be built.
    pub fn new<S>(source: S) -> Result<Self>
    where
        S: IndexedSource<T> + 'static,
    {
        Self::with_options(source, ParallelOptions::default())
    }

    /// # Errors
    /// Fails if the worker pool cannot be built.
    pub fn with_options<S>(source: S, options: ParallelOptions) -> Result<Self>
    where
        S: IndexedSource<T> + 'static,
    {
        Self::assemble(Box::new(source), options, default_stage_config())
    }

    /// Take over a sequential stream. Any stages it is running are drained
    /// first.
    ///
    /// # Errors
    /// Fails if one of the stream's stages failed, or if the worker pool
    /// cannot be built.
    pub fn from_stream(stream: Stream<T>, options: ParallelOptions) -> Result<Self> {
        let (source, pipeline) = stream.into_source()?;
        Self::assemble(source, options, pipeline.config())
    }

    fn assemble(
        source: Box<dyn IndexedSource<T>>,
        options: ParallelOptions,
        stage_config: StageConfig,
    ) -> Result<Self> {
        let workers = options.normalized().workers;
        let pool = build_pool(workers)?;
        let ranges = split(source.len(), workers);
        Ok(Self {
            source,
            ranges,
            workers,
            pool,
            stage_config,
        })
    }

    /// A new stream over `items` sharing this stream's pool and settings.
    fn derive<O: Element>(&self, items: Vec<O>) -> ParallelStream<O> {
        ParallelStream {
            ranges: split(items.len(), self.workers),
            source: Box::new(items),
            workers: self.workers,
            pool: Arc::clone(&self.pool),
            stage_config: self.stage_config,
        }
    }

    /// Run `work` once per range on the pool and feed each partial result,
    /// tagged with its range's position, to `merge` under the shared lock.
    /// Returns after every worker has finished.
    fn fan_out<R, W, M>(&self, op: &'static str, work: W, merge: M)
    where
        R: Send,
        W: Fn(PartitionRange) -> R + Sync,
        M: FnMut(usize, R) + Send,
    {
        if self.ranges.is_empty() {
            return;
        }
        debug!(op, workers = self.ranges.len(), len = self.source.len(), "fan-out");
        let merge = Mutex::new(merge);
        self.pool.scope(|scope| {
            for (slot, &range) in self.ranges.iter().enumerate() {
                let (work, merge) = (&work, &merge);
                scope.spawn(move |_| {
                    let partial = work(range);
                    let mut merge_fn = merge.lock().unwrap_or_else(PoisonError::into_inner);
                    (*merge_fn)(slot, partial);
                });
            }
        });
    }

    /// Per-range partial sequences concatenated in range order.
    fn concat<O, W>(&self, op: &'static str, work: W) -> Vec<O>
    where
        O: Send,
        W: Fn(PartitionRange) -> Vec<O> + Sync,
    {
        let mut partials: Vec<Vec<O>> = (0..self.ranges.len()).map(|_| Vec::new()).collect();
        self.fan_out(op, work, |slot, part| partials[slot] = part);
        partials.into_iter().flatten().collect()
    }

    /// The current partition ranges, in index order.
    #[must_use]
    pub fn ranges(&self) -> &[PartitionRange] {
        &self.ranges
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `action` to every element, concurrently and in no particular
    /// order across ranges.
    pub fn for_each<F>(&self, action: F)
    where
        F: Fn(T) + Sync,
    {
        self.fan_out(
            "for_each",
            |range| {
                for i in range.indices() {
                    action(self.source.get(i));
                }
            },
            |_, ()| {},
        );
    }

    /// Apply `action` to every element in index order on the calling thread.
    pub fn for_each_ordered<F>(&self, mut action: F)
    where
        F: FnMut(T),
    {
        for i in 0..self.source.len() {
            action(self.source.get(i));
        }
    }

    #[must_use]
    pub fn map<O, F>(&self, f: F) -> ParallelStream<O>
    where
        O: Element,
        F: Fn(&T) -> O + Sync,
    {
        let items = self.concat("map", |range| {
            range.indices().map(|i| f(&self.source.get(i))).collect()
        });
        self.derive(items)
    }

    #[must_use]
    pub fn flat_map<O, I, F>(&self, f: F) -> ParallelStream<O>
    where
        O: Element,
        I: IntoIterator<Item = O>,
        F: Fn(&T) -> I + Sync,
    {
        let items = self.concat("flat_map", |range| {
            range.indices().flat_map(|i| f(&self.source.get(i))).collect()
        });
        self.derive(items)
    }

    #[must_use]
    pub fn filter<F>(&self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + Sync,
    {
        let items = self.concat("filter", |range| {
            range
                .indices()
                .map(|i| self.source.get(i))
                .filter(|item| pred(item))
                .collect()
        });
        self.derive(items)
    }

    /// Replace every element by `f(element)` in place.
    ///
    /// Contiguous sources are split into disjoint mutable chunks, one per
    /// worker. Other writable sources have replacements computed in parallel
    /// and written back through [`IndexedSource::set`].
    ///
    /// # Errors
    /// [`StreamError::Unsupported`] if the source is read-only; the source is
    /// left unchanged in that case.
    pub fn map_same<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(&T) -> T + Sync,
    {
        if self.ranges.is_empty() {
            return Ok(());
        }
        let (ranges, pool) = (&self.ranges, &self.pool);
        if let Some(slice) = self.source.as_mut_slice() {
            let mut rest = slice;
            let mut chunks = Vec::with_capacity(ranges.len());
            for range in ranges {
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                chunks.push(head);
                rest = tail;
            }
            debug!(op = "map_same", workers = chunks.len(), "fan-out over slices");
            let f = &f;
            pool.scope(|scope| {
                for chunk in chunks {
                    scope.spawn(move |_| {
                        for value in chunk.iter_mut() {
                            *value = f(value);
                        }
                    });
                }
            });
            return Ok(());
        }

        let replaced = self.concat("map_same", |range| {
            range.indices().map(|i| f(&self.source.get(i))).collect()
        });
        for (index, value) in replaced.into_iter().enumerate() {
            self.source.set(index, value)?;
        }
        Ok(())
    }

    /// Parallel fold to the "best" element (see [`Stream::reduce`]): each
    /// worker finds its range's winner, then winners are reduced in range
    /// order. `None` if the stream is empty.
    #[must_use]
    pub fn reduce<F>(&self, is_better: F) -> Option<T>
    where
        F: Fn(&T, &T) -> bool + Sync,
    {
        let mut winners: Vec<Option<T>> = (0..self.ranges.len()).map(|_| None).collect();
        self.fan_out(
            "reduce",
            |range| {
                let mut best = self.source.get(range.from);
                for i in range.from + 1..range.to {
                    let candidate = self.source.get(i);
                    if is_better(&candidate, &best) {
                        best = candidate;
                    }
                }
                best
            },
            |slot, best| winners[slot] = Some(best),
        );
        winners
            .into_iter()
            .flatten()
            .reduce(|winner, candidate| if is_better(&candidate, &winner) { candidate } else { winner })
    }

    /// Sum of `f(element)`; `0.0` when empty.
    #[must_use]
    pub fn sum<F>(&self, f: F) -> f64
    where
        F: Fn(&T) -> f64 + Sync,
    {
        let mut total = 0.0;
        self.fan_out(
            "sum",
            |range| range.indices().map(|i| f(&self.source.get(i))).sum::<f64>(),
            |_, partial| total += partial,
        );
        total
    }

    /// A new parallel stream over a full copy of the elements.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.derive(self.source.to_vec())
    }

    /// Sort the owned source by `compare` and recompute the ranges.
    pub fn sorted_by<F>(&mut self, compare: F) -> &mut Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let source = std::mem::replace(&mut self.source, Box::new(Vec::<T>::new()));
        self.source = sort_source(source, compare);
        self.ranges = split(self.source.len(), self.workers);
        self
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.source.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    #[must_use]
    pub fn collect(&self) -> Vec<T> {
        self.source.to_vec()
    }

    #[must_use]
    pub fn find_first(&self) -> Option<T> {
        self.element(0)
    }

    /// Element at `index`, or `None` when out of range.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<T> {
        (index < self.source.len()).then(|| self.source.get(index))
    }

    /// Hand the elements back to the sequential engine, with the buffer size
    /// and deadline the stream was created with.
    #[must_use]
    pub fn into_stream(self) -> Stream<T> {
        Stream::from_parts(self.source, Pipeline::new(self.stage_config))
    }
}

impl<T: Element + Ord> ParallelStream<T> {
    pub fn sorted(&mut self) -> &mut Self {
        self.sorted_by(T::cmp)
    }
}

impl<T: Element + Eq + Hash> ParallelStream<T> {
    /// First occurrence of each distinct element, in index order.
    ///
    /// Workers dedupe their own ranges; the partials are then merged in range
    /// order, which keeps the earliest occurrence of every value.
    #[must_use]
    pub fn distinct(&self) -> Self {
        let candidates = self.concat("distinct", |range| {
            let mut seen = HashSet::new();
            range
                .indices()
                .map(|i| self.source.get(i))
                .filter(|item| seen.insert(item.clone()))
                .collect()
        });
        let mut seen = HashSet::with_capacity(candidates.len());
        let items = candidates
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();
        self.derive(items)
    }

    /// The `n` most frequent elements. Workers count their ranges, counters are
    /// merged under the lock, then ranked once.
    #[must_use]
    pub fn top(&self, n: usize) -> ParallelStream<CountVal<T>> {
        let mut total: FrequencyCounter<T> = FrequencyCounter::new();
        self.fan_out(
            "top",
            |range| {
                let mut counter: FrequencyCounter<T> = FrequencyCounter::new();
                for i in range.indices() {
                    counter.add(self.source.get(i), i);
                }
                counter
            },
            |_, partial| total.merge(partial),
        );
        self.derive(total.into_top(n))
    }
}

impl<T: Element> Stream<T> {
    /// Switch to the parallel engine with one worker per available CPU.
    ///
    /// # Errors
    /// See [`ParallelStream::from_stream`].
    pub fn parallel(self) -> Result<ParallelStream<T>> {
        ParallelStream::from_stream(self, ParallelOptions::default())
    }

    /// # Errors
    /// See [`ParallelStream::from_stream`].
    pub fn parallel_with(self, options: ParallelOptions) -> Result<ParallelStream<T>> {
        ParallelStream::from_stream(self, options)
    }
}
