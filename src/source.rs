//! Indexable sources and the built-in adapters.
//!
//! An [`IndexedSource`] is the random-access collection a [`Stream`](crate::Stream)
//! or [`ParallelStream`](crate::ParallelStream) is built over. The engine only
//! ever asks for `get(i)` with `0 <= i < len()`; the remaining capabilities are
//! optional and probed at runtime:
//!
//! - [`set`](IndexedSource::set): in-place replacement, used by
//!   [`ParallelStream::map_same`](crate::ParallelStream::map_same) and by sorting.
//! - [`subrange`](IndexedSource::subrange): a view over `[from, to)`, used by
//!   `limit`/`skip` before any stage has been started.
//! - [`as_mut_slice`](IndexedSource::as_mut_slice): contiguous mutable storage,
//!   which lets sorting and `map_same` skip the element-wise `set` path.
//!
//! Adapters provided here:
//! - `Vec<T>` and `Box<[T]>` for any element type (integers, text, records, ...)
//! - [`SharedSlice<T>`] for cheap, storage-sharing sub-views
//! - [`Floats`] so `f64` data can be counted and deduplicated
//! - integer `Range`s, which never allocate

use crate::error::StreamError;
use anyhow::Result;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

/// Bound every element flowing through a stream must satisfy.
///
/// Stages run on their own threads, so elements must be `Send`; parallel
/// workers share the source, so they must also be `Sync`.
pub trait Element: 'static + Send + Sync + Clone {}
impl<T> Element for T where T: 'static + Send + Sync + Clone {}

/// A fixed-length, random-access sequence of elements.
pub trait IndexedSource<T: Element>: Send + Sync {
    /// Element at `index`.
    ///
    /// # Panics
    /// Implementations may panic when `index >= len()`. The engine never asks
    /// for an index outside `[0, len())`.
    fn get(&self, index: usize) -> T;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the element at `index`.
    ///
    /// # Errors
    /// Returns [`StreamError::Unsupported`] unless the source is writable.
    fn set(&mut self, _index: usize, _value: T) -> Result<()> {
        Err(StreamError::Unsupported { capability: "set" }.into())
    }

    /// A source over `[from, to)`, sharing storage where the adapter can.
    ///
    /// `None` if the adapter has no views, or if the bounds are inverted or
    /// past `len()`.
    fn subrange(&self, _from: usize, _to: usize) -> Option<Box<dyn IndexedSource<T>>> {
        None
    }

    /// Direct mutable access to contiguous storage, if the adapter has it.
    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        None
    }

    /// Element-wise deep copy into a new `Vec`.
    fn to_vec(&self) -> Vec<T> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

impl<T: Element> IndexedSource<T> for Vec<T> {
    fn get(&self, index: usize) -> T {
        self[index].clone()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn set(&mut self, index: usize, value: T) -> Result<()> {
        self[index] = value;
        Ok(())
    }

    fn subrange(&self, from: usize, to: usize) -> Option<Box<dyn IndexedSource<T>>> {
        let view = <[T]>::get(self, from..to)?;
        Some(Box::new(view.to_vec()))
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        Some(Vec::as_mut_slice(self))
    }

    fn to_vec(&self) -> Vec<T> {
        self.clone()
    }
}

impl<T: Element> IndexedSource<T> for Box<[T]> {
    fn get(&self, index: usize) -> T {
        self[index].clone()
    }

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn set(&mut self, index: usize, value: T) -> Result<()> {
        self[index] = value;
        Ok(())
    }

    fn subrange(&self, from: usize, to: usize) -> Option<Box<dyn IndexedSource<T>>> {
        let view = <[T]>::get(self, from..to)?;
        Some(Box::new(view.to_vec().into_boxed_slice()))
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        Some(&mut self[..])
    }
}

/// Read-only view over reference-counted storage.
///
/// [`subrange`](IndexedSource::subrange) narrows the view without copying, so
/// `limit`/`skip` on a `SharedSlice` are O(1).
///
/// ```
/// use ironstream::{IndexedSource, SharedSlice};
///
/// let all = SharedSlice::from(vec![10, 20, 30, 40]);
/// let middle = all.subrange(1, 3).unwrap();
/// assert_eq!(middle.to_vec(), vec![20, 30]);
/// ```
#[derive(Clone, Debug)]
pub struct SharedSlice<T> {
    data: Arc<[T]>,
    from: usize,
    to: usize,
}

impl<T> SharedSlice<T> {
    #[must_use]
    pub fn new(data: Arc<[T]>) -> Self {
        let to = data.len();
        Self { data, from: 0, to }
    }

    /// Number of views (including this one) sharing the backing storage.
    #[must_use]
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}

impl<T> From<Vec<T>> for SharedSlice<T> {
    fn from(v: Vec<T>) -> Self {
        Self::new(Arc::from(v))
    }
}

impl<T: Element> IndexedSource<T> for SharedSlice<T> {
    fn get(&self, index: usize) -> T {
        self.data[self.from + index].clone()
    }

    fn len(&self) -> usize {
        self.to - self.from
    }

    fn subrange(&self, from: usize, to: usize) -> Option<Box<dyn IndexedSource<T>>> {
        if !in_bounds(from, to, self.len()) {
            return None;
        }
        Some(Box::new(Self {
            data: Arc::clone(&self.data),
            from: self.from + from,
            to: self.from + to,
        }))
    }
}

/// Floating-point adapter.
///
/// Elements are exposed as [`OrderedFloat<f64>`] so they are `Eq + Hash + Ord`
/// and can go through `distinct`, `top` and `sorted` like any other value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Floats(pub Vec<f64>);

impl From<Vec<f64>> for Floats {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl IndexedSource<OrderedFloat<f64>> for Floats {
    fn get(&self, index: usize) -> OrderedFloat<f64> {
        OrderedFloat(self.0[index])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn set(&mut self, index: usize, value: OrderedFloat<f64>) -> Result<()> {
        self.0[index] = value.into_inner();
        Ok(())
    }

    fn subrange(&self, from: usize, to: usize) -> Option<Box<dyn IndexedSource<OrderedFloat<f64>>>> {
        let view = <[f64]>::get(&self.0, from..to)?;
        Some(Box::new(Self(view.to_vec())))
    }
}

const fn in_bounds(from: usize, to: usize, len: usize) -> bool {
    from <= to && to <= len
}

// Integer ranges are their own storage: views are just narrower ranges.
macro_rules! impl_range_source {
    ($($t:ty),* $(,)?) => {$(
        impl IndexedSource<$t> for Range<$t> {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            fn get(&self, index: usize) -> $t {
                self.start.wrapping_add(index as $t)
            }

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn len(&self) -> usize {
                (i128::from(self.end) - i128::from(self.start)).max(0) as usize
            }

            fn subrange(&self, from: usize, to: usize) -> Option<Box<dyn IndexedSource<$t>>> {
                if !in_bounds(from, to, IndexedSource::len(self)) {
                    return None;
                }
                Some(Box::new(IndexedSource::get(self, from)..IndexedSource::get(self, to)))
            }
        }
    )*};
}

impl_range_source!(i32, i64, u32, u64);

/// Sort `source` by `compare`, in place when the adapter allows it.
///
/// Contiguous storage is sorted directly; otherwise the elements are sorted in
/// a scratch buffer and written back with `set`. Read-only sources are
/// replaced by the sorted buffer.
pub(crate) fn sort_source<T, F>(
    mut source: Box<dyn IndexedSource<T>>,
    compare: F,
) -> Box<dyn IndexedSource<T>>
where
    T: Element,
    F: FnMut(&T, &T) -> Ordering,
{
    if let Some(slice) = source.as_mut_slice() {
        slice.sort_by(compare);
        return source;
    }

    let mut items = source.to_vec();
    items.sort_by(compare);
    for (index, value) in items.iter().enumerate() {
        if source.set(index, value.clone()).is_err() {
            return Box::new(items);
        }
    }
    source
}

/// Replace every element of `source` by `f(element)`, in place when the
/// adapter allows it. Read-only sources are replaced by a `Vec` of the results.
pub(crate) fn map_source<T, F>(
    mut source: Box<dyn IndexedSource<T>>,
    mut f: F,
) -> Box<dyn IndexedSource<T>>
where
    T: Element,
    F: FnMut(&T) -> T,
{
    if let Some(slice) = source.as_mut_slice() {
        for value in slice.iter_mut() {
            *value = f(value);
        }
        return source;
    }

    let mapped: Vec<T> = (0..source.len()).map(|i| f(&source.get(i))).collect();
    for (index, value) in mapped.iter().enumerate() {
        if source.set(index, value.clone()).is_err() {
            return Box::new(mapped);
        }
    }
    source
}
