//! Testing utilities for Ironstream streams.
//!
//! Helpers for writing tests against both engines:
//!
//! - **Assertions**: compare stream output with expected results, check
//!   frequency rankings and partition layouts
//! - **Test data builders**: assemble sources fluently and hand them straight
//!   to a [`Stream`](crate::Stream) or [`ParallelStream`](crate::ParallelStream)
//!
//! # Quick Start
//!
//! ```no_run
//! use ironstream::testing::*;
//!
//! #[test]
//! fn doubles_everything() -> anyhow::Result<()> {
//!     let result = TestDataBuilder::<i32>::new()
//!         .add_range(1..=3)
//!         .stream()
//!         .map(|x: &i32| x * 2)
//!         .collect()?;
//!
//!     assert_collections_equal(&result, &[2, 4, 6]);
//!     Ok(())
//! }
//! ```
//!
//! # Assertion Functions
//!
//! - [`assert_collections_equal`]: exact, order-dependent comparison
//! - [`assert_collections_unordered_equal`]: order-independent comparison
//! - [`assert_counts_descending`]: a top-K result is ranked correctly
//! - [`assert_prefix_of`]: a truncated result is an in-order prefix
//! - [`assert_partition_covers`]: ranges tile `[0, size)` evenly
//!
//! # Test Data Builders
//!
//! ```
//! use ironstream::testing::*;
//!
//! let data = TestDataBuilder::<i32>::new()
//!     .add_range(1..=10)
//!     .add_repeated(7, 3)
//!     .build();
//! assert_eq!(data.len(), 13);
//! ```

pub mod assertions;
pub mod builders;

pub use assertions::*;
pub use builders::*;
