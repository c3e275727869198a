//! Unique pseudo-random integers from a bounded range, written in pure Rust.
//! No `unsafe`, one bit of bookkeeping per value.
//!
//! [`UniqueRand`] is the main struct in this library. It hands out values from
//! `[0, range)` in random order and never returns a value twice until it has
//! been released again.
//!
//! # Examples
//! ```
//! use unique_rand::UniqueRand;
//!
//! let mut uniq = UniqueRand::new(100);
//! let a = uniq.get().unwrap();
//! let b = uniq.get().unwrap();
//! assert_ne!(a, b);
//! assert!(uniq.used(a));
//! assert_eq!(uniq.count(), 2);
//!
//! assert!(uniq.put(a));
//! assert!(!uniq.used(a));
//! assert_eq!(uniq.count(), 1);
//! ```
//!
//! # How it works
//!
//! Every call to [`get`] draws one candidate from a [`RandomSource`]. A free
//! candidate is taken as is. A candidate that is already taken falls back to
//! the lowest free value, so progress is guaranteed even with a poor or
//! constant source. Once all values are taken, [`get`] returns `None`.
//!
//! Allocation state lives in a [`BlockMap`]: the first 32 values are tracked
//! in an inline word, larger ranges add heap-allocated 32-bit blocks.
//!
//! # Features
//!
//! - Injectable randomness: any `FnMut(usize) -> usize` or any
//!   [`rand::Rng`] via [`RngSource`]
//! - Ready-to-use default with a range of [`DEFAULT_RANGE`]
//! - `reset`, `configure` with a [`Config`]
//! - `get`, `put`, `release` with a typed [`ReleaseError`]
//! - Queries: `range`, `count`, `remaining`, `used`, `is_full`, `is_empty`
//! - Iteration over allocated values in ascending order
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade. Resets and exhaustion are
//! logged at `debug`, the fallback path at `trace`.
//!
//! [`get`]: UniqueRand::get

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod bitmap;
mod source;
mod unique;

pub use bitmap::{BLOCK_BITS, Block, BlockMap, IterOnes, block_count};
pub use source::{RandomSource, RngSource};
pub use unique::{Config, DEFAULT_RANGE, Iter, ReleaseError, UniqueRand};
