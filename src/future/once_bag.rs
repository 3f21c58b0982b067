use core::fmt;
use core::future::IntoFuture;
use core::mem;

use super::settle::Settle;
use crate::bag::{self, Bag};

/// A keyed bag of computations which is settled once and read many times.
///
/// A `OnceBag` wraps a bag at construction time without starting anything.
/// Calling [`initialize`][OnceBag::initialize] settles every entry
/// concurrently, with the same algorithm as [`Settle`][crate::future::Settle],
/// and caches the outcomes inside the container. From then on outcomes can be
/// read synchronously, any number of times, without re-running any
/// computation.
///
/// # Example
///
/// ```rust
/// use futures_settle::bag::{Bag, Entry};
/// use futures_settle::future::OnceBag;
/// use std::future;
/// use std::io;
///
/// # futures_lite::future::block_on(async {
/// let bag = Bag::from([
///     ("greeting", Entry::Value("hello")),
///     ("subject", Entry::Task(future::ready(Ok::<_, io::Error>("world")))),
/// ]);
/// let mut once = OnceBag::new(bag);
/// assert!(!once.is_initialized());
///
/// once.initialize().await;
/// assert!(once.is_initialized());
/// assert!(matches!(once.outcome("greeting"), Some(Ok("hello"))));
/// assert!(matches!(once.outcome("subject"), Some(Ok("world"))));
/// # });
/// ```
pub struct OnceBag<V: IntoFuture> {
    state: State<V>,
}

enum State<V: IntoFuture> {
    /// Entries as handed in at construction; nothing has run yet.
    Raw(Bag<V>),
    /// Every entry has settled into its outcome.
    Settled(Bag<V::Output>),
}

impl<V: IntoFuture> OnceBag<V> {
    /// Create a new instance of `OnceBag` wrapping the given entries.
    ///
    /// No entry is started until [`initialize`][OnceBag::initialize] is
    /// called.
    pub fn new(bag: Bag<V>) -> Self {
        Self {
            state: State::Raw(bag),
        }
    }

    /// Returns `true` once [`initialize`][OnceBag::initialize] has completed.
    ///
    /// The flag never reverts to `false`.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Settled(_))
    }

    /// Return the number of entries in the bag.
    pub fn len(&self) -> usize {
        match &self.state {
            State::Raw(bag) => bag.len(),
            State::Settled(bag) => bag.len(),
        }
    }

    /// Returns `true` if the bag holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the current state of the slot stored under `key`.
    ///
    /// Before initialization this is the entry as constructed; afterwards it
    /// is the settled outcome. Callers who only care about final outcomes
    /// should use [`outcome`][OnceBag::outcome] instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures_settle::bag::{Bag, Entry};
    /// use futures_settle::future::{OnceBag, Slot};
    /// use std::future;
    /// use std::io;
    ///
    /// # futures_lite::future::block_on(async {
    /// let bag = Bag::from([("port", Entry::Task(future::ready(Ok::<_, io::Error>(8080))))]);
    /// let mut once = OnceBag::new(bag);
    ///
    /// assert!(matches!(once.get("port"), Some(Slot::Raw(_))));
    ///
    /// once.initialize().await;
    /// assert!(matches!(once.get("port"), Some(Slot::Settled(Ok(8080)))));
    /// # });
    /// ```
    pub fn get(&self, key: &str) -> Option<Slot<'_, V>> {
        match &self.state {
            State::Raw(bag) => bag.get(key).map(Slot::Raw),
            State::Settled(bag) => bag.get(key).map(Slot::Settled),
        }
    }

    /// Return the settled outcome stored under `key`.
    ///
    /// Returns `None` until [`initialize`][OnceBag::initialize] has
    /// completed, and for keys that are not present.
    pub fn outcome(&self, key: &str) -> Option<&V::Output> {
        match &self.state {
            State::Raw(_) => None,
            State::Settled(bag) => bag.get(key),
        }
    }

    /// Return the whole settled bag, if the container has been initialized.
    pub fn outcomes(&self) -> Option<&Bag<V::Output>> {
        match &self.state {
            State::Raw(_) => None,
            State::Settled(bag) => Some(bag),
        }
    }

    /// Iterate over the current slots of the container, in key order.
    pub fn iter(&self) -> Slots<'_, V> {
        Slots {
            inner: match &self.state {
                State::Raw(bag) => SlotsInner::Raw(bag.iter()),
                State::Settled(bag) => SlotsInner::Settled(bag.iter()),
            },
        }
    }
}

impl<V, T, E> OnceBag<V>
where
    V: IntoFuture<Output = Result<T, E>>,
{
    /// Settle every entry and cache the outcomes.
    ///
    /// All entries are started before any is awaited, and the call waits
    /// until each of them has settled. Failures are captured in their own
    /// key's slot; the call itself never fails. The returned reference points
    /// at the cached outcomes, the same data later reads observe.
    ///
    /// Calling `initialize` again after it has completed is a no-op which
    /// returns the cached outcomes without re-running anything.
    ///
    /// Dropping the returned future before it completes drops the in-flight
    /// computations: the container is left empty and uninitialized.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures_settle::bag::{Bag, Entry};
    /// use futures_settle::future::OnceBag;
    /// use std::future;
    /// use std::io::{Error, ErrorKind};
    ///
    /// # futures_lite::future::block_on(async {
    /// let bag = Bag::from([
    ///     ("ok", Entry::Task(future::ready(Ok(1)))),
    ///     ("failed", Entry::Task(future::ready(Err(Error::new(ErrorKind::Other, "boom"))))),
    /// ]);
    /// let mut once = OnceBag::new(bag);
    ///
    /// let outcomes = once.initialize().await;
    /// assert!(matches!(outcomes.get("ok"), Some(Ok(1))));
    /// assert!(matches!(outcomes.get("failed"), Some(Err(_))));
    /// # });
    /// ```
    pub async fn initialize<'a>(&'a mut self) -> &'a Bag<Result<T, E>>
    where
        T: 'a,
        E: 'a,
    {
        if let State::Raw(bag) = &mut self.state {
            let outcomes = mem::take(bag).settle().await;
            self.state = State::Settled(outcomes);
        }
        match &self.state {
            State::Settled(outcomes) => outcomes,
            State::Raw(_) => unreachable!("state was settled above"),
        }
    }
}

impl<V: IntoFuture> fmt::Debug for OnceBag<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceBag")
            .field("initialized", &self.is_initialized())
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, V: IntoFuture> IntoIterator for &'a OnceBag<V> {
    type Item = (&'a str, Slot<'a, V>);
    type IntoIter = Slots<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A synchronous view into one slot of an [`OnceBag`].
pub enum Slot<'a, V: IntoFuture> {
    /// The container has not been initialized yet; the entry as constructed.
    Raw(&'a V),
    /// The container has been initialized; the settled outcome.
    Settled(&'a V::Output),
}

impl<'a, V: IntoFuture> Slot<'a, V> {
    /// Return the settled outcome, if the container has been initialized.
    pub fn settled(self) -> Option<&'a V::Output> {
        match self {
            Slot::Raw(_) => None,
            Slot::Settled(outcome) => Some(outcome),
        }
    }
}

impl<V> fmt::Debug for Slot<'_, V>
where
    V: IntoFuture + fmt::Debug,
    V::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(entry) => f.debug_tuple("Raw").field(entry).finish(),
            Self::Settled(outcome) => f.debug_tuple("Settled").field(outcome).finish(),
        }
    }
}

/// An iterator over the slots of an [`OnceBag`], in key order.
pub struct Slots<'a, V: IntoFuture> {
    inner: SlotsInner<'a, V>,
}

enum SlotsInner<'a, V: IntoFuture> {
    Raw(bag::Iter<'a, V>),
    Settled(bag::Iter<'a, V::Output>),
}

impl<'a, V: IntoFuture> Iterator for Slots<'a, V> {
    type Item = (&'a str, Slot<'a, V>);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            SlotsInner::Raw(iter) => iter.next().map(|(key, entry)| (key, Slot::Raw(entry))),
            SlotsInner::Settled(iter) => iter
                .next()
                .map(|(key, outcome)| (key, Slot::Settled(outcome))),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            SlotsInner::Raw(iter) => iter.size_hint(),
            SlotsInner::Settled(iter) => iter.size_hint(),
        }
    }
}

impl<V: IntoFuture> fmt::Debug for Slots<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots").finish_non_exhaustive()
    }
}
