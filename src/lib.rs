//! # Ironstream
//!
//! A **stream processing engine** for finite, randomly indexable, in-memory
//! collections. Ironstream offers two execution modes over the same kind of
//! source:
//!
//! - **Staged sequential streams** ([`Stream`]): every intermediate operation
//!   becomes its own concurrently running stage, connected to its neighbours by
//!   bounded queues, with optional deadline-based early termination.
//! - **Fixed-partition parallel streams** ([`ParallelStream`]): the index range
//!   is split across a fixed number of workers, each operation fans out per
//!   range and merges partial results under a lock.
//!
//! Both modes share the same frequency-ranking ("top-K") selector.
//!
//! ## Quick Start
//!
//! ```
//! use ironstream::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let lines = vec!["to be or".to_string(), "not to be".to_string()];
//!
//! let top = Stream::new(lines)
//!     .flat_map(|line: &String| {
//!         line.split(' ').map(str::to_string).collect::<Vec<_>>()
//!     })
//!     .filter(|w: &String| matches!(w.as_str(), "be" | "or" | "not" | "to"))
//!     .top(2)
//!     .collect()?;
//!
//! assert_eq!(top, vec![
//!     CountVal::new(2, "to".to_string()),
//!     CountVal::new(2, "be".to_string()),
//! ]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Sources
//!
//! An [`IndexedSource<T>`] is anything with `get(i)` and `len()`. `Vec<T>`,
//! `Box<[T]>`, integer ranges, [`SharedSlice<T>`] and [`Floats`] implement it
//! out of the box; implement it for your own types to stream records addressed
//! by index. Element types must satisfy [`Element`]
//! (`'static + Send + Sync + Clone`).
//!
//! ### Staged streams
//!
//! [`Stream`] operations come in two groups:
//!
//! #### Intermediate (each starts one stage)
//! - [`peek`](Stream::peek), [`limit`](Stream::limit), [`skip`](Stream::skip)
//! - [`map`](Stream::map), [`flat_map`](Stream::flat_map), [`filter`](Stream::filter)
//! - [`distinct`](Stream::distinct), [`distinct_by`](Stream::distinct_by)
//! - [`top`](Stream::top), [`top_by`](Stream::top_by): barrier stages
//! - [`sorted_by`](Stream::sorted_by) and [`copy`](Stream::copy) work on the
//!   owned source instead of adding a stage
//!
//! #### Terminal (drain the last stage)
//! - [`for_each`](Stream::for_each), [`reduce`](Stream::reduce),
//!   [`collect`](Stream::collect), [`count`](Stream::count),
//!   [`filter_count`](Stream::filter_count), [`sum`](Stream::sum),
//!   [`is_empty`](Stream::is_empty)
//! - [`any_match`](Stream::any_match), [`all_match`](Stream::all_match),
//!   [`none_match`](Stream::none_match), [`find_first`](Stream::find_first),
//!   [`element`](Stream::element): these stop early
//!
//! ### Deadlines
//!
//! Configure a timeout with [`StreamOptions`]. Stages that observe the deadline
//! stop forwarding and the result is silently truncated; check
//! [`Stream::is_correct`] or a [`Correctness`] handle.
//!
//! ### Parallel streams
//!
//! [`ParallelStream`] runs each call as split → fan out → merge. The worker
//! count comes from [`ParallelOptions`] and defaults to the number of CPUs.
//!
//! ## Errors
//!
//! Failures are reported as [`anyhow::Error`]s wrapping a [`StreamError`].
//! Using a stream after a terminal operation is rejected at compile time,
//! because every operation takes the stream by value.
//!
//! ## Logging
//!
//! Ironstream emits [`tracing`] events (stage start/finish at `debug`, deadline
//! truncation and option fallbacks at `warn`). Install any subscriber to see
//! them.
//!
//! ## Module Overview
//!
//! - [`source`] - Indexable sources and adapters
//! - [`stream`] - Staged sequential streams
//! - [`helpers`] - Distinct, Top and terminal operations on [`Stream`]
//! - [`parallel`] - Fixed-partition parallel streams
//! - [`topk`] - Frequency counting and top-K selection
//! - [`split`] - Partitioning of an index range across workers
//! - [`options`] - Engine configuration
//! - [`testing`] - Assertions and data builders for tests

pub mod error;
pub mod helpers;
pub mod options;
pub mod parallel;
mod pipeline;
pub mod source;
pub mod split;
pub mod stream;
pub mod testing;
pub mod topk;

// General re-exports
pub use error::StreamError;
pub use options::{DEFAULT_BUFFER_SIZE, ParallelOptions, StreamOptions};
pub use parallel::ParallelStream;
pub use source::{Element, Floats, IndexedSource, SharedSlice};
pub use split::PartitionRange;
pub use stream::{Correctness, Stream};
pub use topk::{CountVal, FrequencyCounter, top_k};
