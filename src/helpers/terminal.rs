//! Terminal operations.
//!
//! Each terminal drains the stream's last stage on the calling thread (starting
//! the feeder first if nothing was staged), then joins every stage worker. A
//! short-circuiting terminal drops the tail queue as soon as it has its answer;
//! upstream stages notice the closed queue on their next send and stop.
//!
//! All terminals return `anyhow::Result`. The error case is a
//! [`StreamError`](crate::StreamError): a stage worker that panicked (typically
//! a caller closure bug) or one that could not be started.

use crate::Stream;
use crate::source::Element;
use anyhow::Result;
use crossbeam_channel::IntoIter;

impl<T: Element> Stream<T> {
    fn drain<R>(self, consume: impl FnOnce(IntoIter<T>) -> R) -> Result<R> {
        let (tail, pipeline) = self.into_tail();
        // `consume` owns the tail and drops it before the stages are joined.
        let out = consume(tail.into_iter());
        pipeline.finish()?;
        Ok(out)
    }

    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn for_each<F>(self, mut action: F) -> Result<()>
    where
        F: FnMut(T),
    {
        self.drain(|items| items.for_each(&mut action))
    }

    /// Fold to the "best" element: `candidate` replaces the current winner
    /// whenever `is_better(candidate, winner)` holds. `None` on an empty
    /// stream.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn reduce<F>(self, mut is_better: F) -> Result<Option<T>>
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.drain(|items| {
            items.reduce(|winner, candidate| {
                if is_better(&candidate, &winner) {
                    candidate
                } else {
                    winner
                }
            })
        })
    }

    /// Number of elements satisfying `pred`.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn filter_count<F>(self, mut pred: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.drain(|items| items.filter(|item| pred(item)).count())
    }

    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn collect(self) -> Result<Vec<T>> {
        self.drain(Iterator::collect)
    }

    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn count(self) -> Result<usize> {
        self.drain(Iterator::count)
    }

    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn is_empty(self) -> Result<bool> {
        self.drain(|mut items| items.next().is_none())
    }

    /// Sum of `f(element)` over the stream; `0.0` when empty.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn sum<F>(self, mut f: F) -> Result<f64>
    where
        F: FnMut(&T) -> f64,
    {
        self.drain(|items| items.map(|item| f(&item)).sum())
    }

    /// `true` as soon as one element satisfies `pred`; `false` when empty.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn any_match<F>(self, mut pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        self.drain(|mut items| items.any(|item| pred(&item)))
    }

    /// `false` as soon as one element fails `pred`; `true` when empty.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn all_match<F>(self, mut pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        self.drain(|mut items| items.all(|item| pred(&item)))
    }

    /// `true` if no element satisfies `pred`; stops at the first match.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn none_match<F>(self, mut pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        self.drain(|mut items| !items.any(|item| pred(&item)))
    }

    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn find_first(self) -> Result<Option<T>> {
        self.drain(|mut items| items.next())
    }

    /// The `index`-th element the stream produces, or `None` past the end.
    ///
    /// # Errors
    /// Fails if a stage worker panicked or could not be started.
    pub fn element(self, index: usize) -> Result<Option<T>> {
        self.drain(|mut items| items.nth(index))
    }
}
