//! Asynchronous operations on keyed bags.
//!
//! # Settle semantics
//!
//! Settling is the "wait for all" operation that is aware of failure but
//! refuses to be interrupted by it. Every entry of a bag runs to completion,
//! and each key ends up holding its own `Result`. This differs from a
//! short-circuiting try-join, which drops all sibling futures as soon as one
//! of them errors, and from a race, which keeps only the first output:
//!
//! | Name       | Return signature    | When does it return?     |
//! | ---        | ---                 | ---                      |
//! | [`Settle`] | `Bag<Result<T, E>>` | Wait for all to settle   |
//!
//! The operation as a whole never fails. A caller who never inspects the
//! per-key outcomes will not notice that one of them is an `Err`; checking is
//! the caller's contract.
//!
//! # One-shot containers
//!
//! [`OnceBag`] wraps a bag and defers settling to an explicit
//! [`initialize`][OnceBag::initialize] step. Once initialized, outcomes are
//! cached and can be read synchronously any number of times.

pub use once_bag::{OnceBag, Slot, Slots};
pub use settle::bag::SettleBag;
pub use settle::{settle, Settle};

mod once_bag;
mod settle;
