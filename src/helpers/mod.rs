//! Operation families attached to [`Stream`](crate::Stream) as `impl` blocks.
//!
//! - [`distinct`]: `distinct`, `distinct_by`
//! - [`topk`]: `top`, `top_by`
//! - [`terminal`]: `for_each`, `reduce`, `collect`, `count`, matches, ...

pub mod distinct;
pub mod terminal;
pub mod topk;
