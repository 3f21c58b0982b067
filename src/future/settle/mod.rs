use futures_core::Future;

pub(crate) mod bag;

/// Wait for every entry of a keyed bag to settle.
///
/// Starts all entries concurrently and waits until each one has either
/// produced a value or failed. Failures are captured in their own key's slot
/// and never abort sibling entries.
pub trait Settle {
    /// The resulting output type.
    type Output;

    /// Which kind of future are we turning this into?
    type Future: Future<Output = Self::Output>;

    /// Waits for every entry to settle, successfully or not.
    ///
    /// This function returns a new future which polls all entries
    /// concurrently. The output preserves the input's keys and key order,
    /// with each value replaced by that entry's outcome.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures_settle::bag::Bag;
    /// use futures_settle::prelude::*;
    /// use futures_lite::future::block_on;
    /// use std::future;
    /// use std::io;
    ///
    /// block_on(async {
    ///     let bag: Bag<_> = [
    ///         ("one", future::ready(Ok::<_, io::Error>(1))),
    ///         ("two", future::ready(Ok(2))),
    ///     ]
    ///     .into_iter()
    ///     .collect();
    ///
    ///     let outcomes = bag.settle().await;
    ///     assert_eq!(outcomes.keys().collect::<Vec<_>>(), ["one", "two"]);
    ///     assert!(matches!(outcomes.get("two"), Some(Ok(2))));
    /// })
    /// ```
    fn settle(self) -> Self::Future;
}

/// Settle every entry of a keyed bag, waiting for all of them.
///
/// Free-function form of [`Settle::settle`].
///
/// # Example
///
/// ```rust
/// use futures_settle::bag::{Bag, Entry};
/// use futures_settle::future::settle;
/// use futures_lite::future::block_on;
/// use std::future;
/// use std::io;
///
/// block_on(async {
///     let bag = Bag::from([
///         ("ready", Entry::Value("cached")),
///         ("fetched", Entry::Task(future::ready(Ok::<_, io::Error>("fresh")))),
///     ]);
///
///     let outcomes = settle(bag).await;
///     assert!(matches!(outcomes.get("ready"), Some(Ok("cached"))));
/// })
/// ```
pub fn settle<B: Settle>(bag: B) -> B::Future {
    bag.settle()
}
