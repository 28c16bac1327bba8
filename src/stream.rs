//! The sequential, staged stream.
//!
//! A [`Stream<T>`] starts out holding its source directly. The first
//! intermediate operation starts a feeder stage that writes every source
//! element, in order, into a bounded queue; that operation's own stage then
//! reads the feeder's queue. Each later operation appends exactly one more
//! stage reading the previous one, so a chain such as
//!
//! ```text
//! source ─▶ [feeder] ─q─▶ [flat_map] ─q─▶ [filter] ─q─▶ [top] ─q─▶ terminal
//! ```
//!
//! runs as concurrently executing threads connected by bounded queues. Terminal
//! operations (see [`helpers::terminal`](crate::helpers)) drain the last queue
//! on the calling thread.
//!
//! Operations take the stream by value, so a consumed stream cannot be used
//! again:
//!
//! ```compile_fail
//! use ironstream::Stream;
//!
//! let s = Stream::new(vec![1, 2, 3]);
//! let n = s.count();
//! let again = s.count(); // error[E0382]: use of moved value: `s`
//! ```
//!
//! # Deadlines
//! With a timeout configured, every stage checks the deadline before each
//! element and stops once it has passed. The result is shorter than it should
//! be but otherwise well-formed; query [`Stream::is_correct`] (or a
//! [`Correctness`] handle taken before the terminal) to detect it.

use crate::options::StreamOptions;
use crate::pipeline::{Pipeline, StageConfig, StageContext};
use crate::source::{Element, IndexedSource, map_source, sort_source};
use anyhow::Result;
use crossbeam_channel::Receiver;
use std::cmp::Ordering;

pub use crate::pipeline::Correctness;

enum Head<T> {
    /// No stage yet: the source itself.
    Source(Box<dyn IndexedSource<T>>),
    /// Output queue of the most recently appended stage.
    Queue(Receiver<T>),
}

/// A lazily staged stream over an [`IndexedSource`].
pub struct Stream<T: Element> {
    head: Head<T>,
    pipeline: Pipeline,
}

impl<T: Element> Stream<T> {
    /// Wrap `source` with default options (no deadline).
    pub fn new<S>(source: S) -> Self
    where
        S: IndexedSource<T> + 'static,
    {
        Self::with_options(source, StreamOptions::default())
    }

    /// Wrap `source`. A zero buffer size falls back to the default; the
    /// deadline, if any, starts counting now.
    pub fn with_options<S>(source: S, options: StreamOptions) -> Self
    where
        S: IndexedSource<T> + 'static,
    {
        Self::from_boxed(Box::new(source), options)
    }

    pub fn from_boxed(source: Box<dyn IndexedSource<T>>, options: StreamOptions) -> Self {
        let options = options.normalized();
        let config = StageConfig {
            buffer_size: options.buffer_size,
            deadline: options.deadline(),
        };
        Self::from_parts(source, Pipeline::new(config))
    }

    pub(crate) fn from_parts(source: Box<dyn IndexedSource<T>>, pipeline: Pipeline) -> Self {
        Self {
            head: Head::Source(source),
            pipeline,
        }
    }

    /// `false` once any stage has stopped early because the deadline passed.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.pipeline.correctness().is_correct()
    }

    /// Handle on the correctness flag that outlives this stream.
    #[must_use]
    pub fn correctness(&self) -> Correctness {
        self.pipeline.correctness()
    }

    /// Number of stages currently running behind this stream, feeder included.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.pipeline.depth()
    }

    /// Resolve the previous stage: the tail queue, or a new feeder stage if
    /// nothing has been staged yet.
    pub(crate) fn into_tail(self) -> (Receiver<T>, Pipeline) {
        let Self { head, mut pipeline } = self;
        let rx = match head {
            Head::Source(source) => pipeline.feed(source),
            Head::Queue(rx) => rx,
        };
        (rx, pipeline)
    }

    /// Append one stage reading this stream's tail.
    pub(crate) fn chain<O, F>(self, name: &'static str, body: F) -> Stream<O>
    where
        O: Element,
        F: FnOnce(Receiver<T>, &mut StageContext<O>) + Send + 'static,
    {
        let (input, mut pipeline) = self.into_tail();
        let rx = pipeline.spawn_stage(name, move |ctx| body(input, ctx));
        Stream {
            head: Head::Queue(rx),
            pipeline,
        }
    }

    /// Drain any running stages back into an owned source.
    pub(crate) fn settle(&mut self) -> &mut Box<dyn IndexedSource<T>> {
        if let Head::Queue(rx) = &self.head {
            let items: Vec<T> = rx.iter().collect();
            self.pipeline.settle();
            self.head = Head::Source(Box::new(items));
        }
        match &mut self.head {
            Head::Source(source) => source,
            Head::Queue(_) => unreachable!("queue head was just settled"),
        }
    }

    pub(crate) fn into_source(mut self) -> Result<(Box<dyn IndexedSource<T>>, Pipeline)> {
        self.settle();
        let Self { head, pipeline } = self;
        let Head::Source(source) = head else {
            unreachable!("settled stream holds a source")
        };
        let config = pipeline.config();
        pipeline.finish()?;
        Ok((source, Pipeline::new(config)))
    }

    /// Invoke `action` on each element as it passes, then forward it.
    #[must_use]
    pub fn peek<F>(self, mut action: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.chain("peek", move |input, ctx| {
            for item in ctx.inputs(&input) {
                action(&item);
                if !ctx.emit(item) {
                    break;
                }
            }
        })
    }

    /// At most the first `n` elements.
    ///
    /// Applied directly to a source that supports sub-views, no stage is
    /// started.
    #[must_use]
    pub fn limit(self, n: usize) -> Self {
        if let Head::Source(source) = &self.head {
            let to = n.min(source.len());
            if let Some(view) = source.subrange(0, to) {
                return Self::from_parts(view, self.pipeline);
            }
        }
        self.chain("limit", move |input, ctx| {
            if n == 0 {
                return;
            }
            for item in ctx.inputs(&input) {
                if !ctx.emit(item) || ctx.forwarded() >= n {
                    break;
                }
            }
        })
    }

    /// Everything after the first `n` elements.
    #[must_use]
    pub fn skip(self, n: usize) -> Self {
        if let Head::Source(source) = &self.head {
            let len = source.len();
            if let Some(view) = source.subrange(n.min(len), len) {
                return Self::from_parts(view, self.pipeline);
            }
        }
        self.chain("skip", move |input, ctx| {
            for item in ctx.inputs(&input).skip(n) {
                if !ctx.emit(item) {
                    break;
                }
            }
        })
    }

    #[must_use]
    pub fn map<O, F>(self, mut f: F) -> Stream<O>
    where
        O: Element,
        F: FnMut(&T) -> O + Send + 'static,
    {
        self.chain("map", move |input, ctx| {
            for item in ctx.inputs(&input) {
                if !ctx.emit(f(&item)) {
                    break;
                }
            }
        })
    }

    /// Replace each element by the items of `f(element)`, flattened in order.
    /// Returning `None` or an empty collection contributes nothing.
    #[must_use]
    pub fn flat_map<O, I, F>(self, mut f: F) -> Stream<O>
    where
        O: Element,
        I: IntoIterator<Item = O>,
        F: FnMut(&T) -> I + Send + 'static,
    {
        self.chain("flat_map", move |input, ctx| {
            'outer: for item in ctx.inputs(&input) {
                for out in f(&item) {
                    if !ctx.emit(out) {
                        break 'outer;
                    }
                }
            }
        })
    }

    #[must_use]
    pub fn filter<F>(self, mut pred: F) -> Self
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.chain("filter", move |input, ctx| {
            for item in ctx.inputs(&input) {
                if pred(&item) && !ctx.emit(item) {
                    break;
                }
            }
        })
    }

    /// Reorder the source by `compare`.
    ///
    /// Sorting happens on the owned source, in place when the adapter is
    /// writable. If stages are already running, their output is first drained
    /// into a new source, so everything upstream runs to completion here.
    /// Use [`copy`](Self::copy) first to keep the original order elsewhere.
    #[must_use]
    pub fn sorted_by<F>(mut self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let slot = self.settle();
        let source = std::mem::replace(slot, Box::new(Vec::<T>::new()));
        *slot = sort_source(source, compare);
        self
    }

    /// Replace every element by `f(element)` on the owned source, without
    /// starting a stage.
    ///
    /// Writable sources are updated in place; read-only ones are replaced by
    /// the mapped values. Running stages are drained first, as for
    /// [`sorted_by`](Self::sorted_by).
    #[must_use]
    pub fn map_same<F>(mut self, f: F) -> Self
    where
        F: FnMut(&T) -> T,
    {
        let slot = self.settle();
        let source = std::mem::replace(slot, Box::new(Vec::<T>::new()));
        *slot = map_source(source, f);
        self
    }

    /// A new stream over a deep copy of the current elements, with the same
    /// buffer size and deadline and its own correctness flag.
    ///
    /// Like [`sorted_by`](Self::sorted_by), running stages are drained first;
    /// `self` then continues from the drained elements.
    #[must_use]
    pub fn copy(&mut self) -> Self {
        let items = self.settle().to_vec();
        Self::from_parts(Box::new(items), self.pipeline.fork())
    }
}

impl<T: Element + Ord> Stream<T> {
    /// [`sorted_by`](Self::sorted_by) with the natural order.
    #[must_use]
    pub fn sorted(self) -> Self {
        self.sorted_by(T::cmp)
    }
}
