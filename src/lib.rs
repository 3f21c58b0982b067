//! Settle keyed bags of futures concurrently.
//!
//! A [`Bag`][bag::Bag] is an insertion-ordered mapping from string keys to
//! values. This library resolves bags whose values are asynchronous
//! computations: every entry is started before any is awaited, the operation
//! waits until each one has settled, and the result is a bag with the same
//! keys in the same order where every value has been replaced by its outcome:
//! `Ok` for entries that produced a value, `Err` for entries that failed. One
//! entry's failure never aborts its siblings, and the operation as a whole
//! never fails; callers inspect outcomes per key.
//!
//! The mechanism comes in two forms which share a single algorithm:
//!
//! - [`future::Settle`]: settle a bag in one call.
//! - [`future::OnceBag`]: wrap a bag, settle it once through an explicit
//!   [`initialize`][future::OnceBag::initialize] step, then read the cached
//!   outcomes synchronously.
//!
//! # Examples
//!
//! Settle a mixed bag of immediate values and fallible futures:
//! ```rust
//! use futures_settle::bag::{Bag, Entry};
//! use futures_settle::prelude::*;
//! use futures_lite::future::block_on;
//! use std::future;
//! use std::io::{Error, ErrorKind};
//!
//! block_on(async {
//!     let bag = Bag::from([
//!         ("cached", Entry::Value(1)),
//!         ("loaded", Entry::Task(future::ready(Ok(2)))),
//!         ("failed", Entry::Task(future::ready(Err(Error::new(ErrorKind::Other, "boom"))))),
//!     ]);
//!
//!     let outcomes = bag.settle().await;
//!     assert!(matches!(outcomes.get("cached"), Some(Ok(1))));
//!     assert!(matches!(outcomes.get("loaded"), Some(Ok(2))));
//!     assert!(matches!(outcomes.get("failed"), Some(Err(_))));
//! })
//! ```
//!
//! # Limitations
//!
//! Settling takes as long as the slowest entry. There is no built-in timeout,
//! retry, or cancellation: an entry that never settles keeps the whole
//! operation pending. Callers who need deadlines should wrap individual
//! entries before putting them in the bag.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod utils;

/// The futures settle prelude.
pub mod prelude {
    pub use super::future::Settle as _;
}

pub mod bag;
pub mod future;
