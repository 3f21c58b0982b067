use super::Settle as SettleTrait;
use crate::bag::Bag;
use crate::utils::{iter_pin_mut_vec, PollVec, WakerVec};

use core::fmt;
use core::future::{Future, IntoFuture};
use core::pin::Pin;
use core::task::{Context, Poll};
use std::mem::{self, MaybeUninit};

use pin_project::{pin_project, pinned_drop};

/// Waits for every entry of a keyed bag to settle.
///
/// This `struct` is created by the [`settle`] method on the [`Settle`] trait.
/// See its documentation for more.
///
/// [`settle`]: crate::future::Settle::settle
/// [`Settle`]: crate::future::Settle
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[pin_project(PinnedDrop)]
pub struct SettleBag<T, Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    /// A boolean which holds whether the future has completed.
    consumed: bool,
    /// The number of tasks which are currently still in-flight.
    pending: usize,
    /// The keys of the bag, in the order the outcomes are assembled in.
    keys: Vec<String>,
    /// The output data, to be returned after the future completes.
    items: Vec<MaybeUninit<Result<T, E>>>,
    /// A structure holding the waker passed to the future, and the various
    /// sub-wakers passed to the contained tasks.
    wakers: WakerVec,
    /// The individual poll state of each task.
    state: PollVec,
    #[pin]
    /// The tasks, one per key.
    tasks: Vec<Fut>,
}

impl<T, Fut, E> SettleBag<T, Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    pub(crate) fn new(keys: Vec<String>, tasks: Vec<Fut>) -> Self {
        let len = tasks.len();
        debug_assert_eq!(keys.len(), len);
        Self {
            consumed: false,
            pending: len,
            keys,
            items: std::iter::repeat_with(MaybeUninit::uninit)
                .take(len)
                .collect(),
            wakers: WakerVec::new(len),
            state: PollVec::new(len),
            tasks,
        }
    }
}

impl<V, T, E> SettleTrait for Bag<V>
where
    V: IntoFuture<Output = Result<T, E>>,
{
    type Output = Bag<Result<T, E>>;
    type Future = SettleBag<T, V::IntoFuture, E>;

    fn settle(self) -> Self::Future {
        let (keys, tasks) = self
            .into_iter()
            .map(|(key, value)| (key, value.into_future()))
            .unzip();
        SettleBag::new(keys, tasks)
    }
}

impl<T, Fut, E> fmt::Debug for SettleBag<T, Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.keys.iter().zip(self.state.iter()))
            .finish()
    }
}

impl<T, Fut, E> Future for SettleBag<T, Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    type Output = Bag<Result<T, E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        assert!(
            !*this.consumed,
            "Futures must not be polled after completing"
        );

        let mut readiness = this.wakers.readiness().lock().unwrap();
        readiness.set_waker(cx.waker());
        if *this.pending > 0 && !readiness.any_ready() {
            // Nothing woke us; nothing new to poll.
            return Poll::Pending;
        }

        // Poll every slot that has been woken since the last pass.
        let tasks = this.tasks.as_mut();
        for (i, task) in iter_pin_mut_vec(tasks).enumerate() {
            if this.state[i].is_pending() && readiness.clear_ready(i) {
                // unlock readiness so we don't deadlock when polling
                drop(readiness);

                // Obtain the intermediate waker.
                let mut cx = Context::from_waker(this.wakers.get(i).unwrap());

                if let Poll::Ready(outcome) = task.poll(&mut cx) {
                    this.items[i] = MaybeUninit::new(outcome);
                    this.state[i].set_ready();
                    *this.pending -= 1;
                }

                // Lock readiness so we can use it again.
                readiness = this.wakers.readiness().lock().unwrap();
            }
        }

        // Check whether we're all done now or need to keep going.
        if *this.pending == 0 {
            // Mark all data as "consumed" before we take it.
            *this.consumed = true;
            for state in this.state.iter_mut() {
                debug_assert!(
                    state.is_ready(),
                    "Task should have reached a `Ready` state"
                );
                state.set_consumed();
            }

            // SAFETY: `pending` reached zero, so every outcome slot has been
            // written and it is sound to treat the buffer as initialized.
            let outcomes = unsafe {
                let items = mem::take(this.items);
                mem::transmute::<_, Vec<Result<T, E>>>(items)
            };
            let keys = mem::take(this.keys);
            Poll::Ready(Bag::from_entries_unchecked(
                keys.into_iter().zip(outcomes).collect(),
            ))
        } else {
            Poll::Pending
        }
    }
}

/// Drop the already initialized outcomes on cancellation.
#[pinned_drop]
impl<T, Fut, E> PinnedDrop for SettleBag<T, Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();

        // Get the indexes of the initialized outcomes.
        let indexes: Vec<_> = this.state.ready_indexes().collect();

        // Drop each outcome at the index.
        for i in indexes {
            // SAFETY: we've just filtered down to *only* the initialized
            // outcomes. We can assume they're initialized, and this is where
            // we drop them.
            unsafe { this.items[i].assume_init_drop() };
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bag::Entry;
    use crate::utils::DummyWaker;

    use std::cell::RefCell;
    use std::future;
    use std::io::{self, Error, ErrorKind};
    use std::rc::Rc;
    use std::sync::Arc;
    use std::task::Waker;

    #[test]
    fn smoke() {
        futures_lite::future::block_on(async {
            let bag: Bag<_> = [
                ("hello", future::ready(Ok::<_, io::Error>("hello"))),
                ("world", future::ready(Ok("world"))),
            ]
            .into_iter()
            .collect();

            let outcomes = bag.settle().await;
            assert!(matches!(outcomes.get("hello"), Some(Ok("hello"))));
            assert!(matches!(outcomes.get("world"), Some(Ok("world"))));
        });
    }

    #[test]
    fn empty() {
        futures_lite::future::block_on(async {
            let bag: Bag<future::Ready<io::Result<()>>> = Bag::new();
            let outcomes = bag.settle().await;
            assert!(outcomes.is_empty());
        });
    }

    #[test]
    fn value_passthrough() {
        futures_lite::future::block_on(async {
            let bag: Bag<Entry<&str, future::Ready<io::Result<&str>>>> =
                Bag::from([("a", Entry::Value("kept")), ("b", Entry::Value("as-is"))]);

            let outcomes = bag.settle().await;
            assert!(matches!(outcomes.get("a"), Some(Ok("kept"))));
            assert!(matches!(outcomes.get("b"), Some(Ok("as-is"))));
        });
    }

    #[test]
    fn one_err() {
        futures_lite::future::block_on(async {
            let err = Error::new(ErrorKind::Other, "oh no");
            let bag: Bag<_> = [
                ("ok", future::ready(Ok("hello"))),
                ("err", future::ready(Err(err))),
            ]
            .into_iter()
            .collect();

            let outcomes = bag.settle().await;
            assert!(matches!(outcomes.get("ok"), Some(Ok("hello"))));
            let failure = outcomes.get("err").unwrap().as_ref().unwrap_err();
            assert_eq!(failure.to_string(), "oh no");
        });
    }

    #[test]
    fn key_order_survives_completion_order() {
        futures_lite::future::block_on(async {
            // "slow" needs three polls, "fast" completes on its first one.
            let bag: Bag<_> = [
                ("slow", Countdown::new(2, 1)),
                ("fast", Countdown::new(0, 2)),
            ]
            .into_iter()
            .collect();

            let outcomes = bag.settle().await;
            assert_eq!(outcomes.keys().collect::<Vec<_>>(), ["slow", "fast"]);
            assert!(matches!(outcomes.get("slow"), Some(Ok(1))));
            assert!(matches!(outcomes.get("fast"), Some(Ok(2))));
        });
    }

    #[test]
    fn starts_every_task_before_waiting() {
        futures_lite::future::block_on(async {
            let shared = Rc::new(RefCell::new(LatchState {
                started: 0,
                total: 3,
                wakers: Vec::new(),
            }));

            let bag: Bag<_> = (0..3u8)
                .map(|n| (format!("task-{n}"), Latch::new(n, shared.clone())))
                .collect();

            // A latch only settles once every latch in the batch has been
            // polled, so this hangs unless all tasks are started up front.
            let outcomes = bag.settle().await;
            for n in 0..3 {
                assert!(matches!(outcomes.get(&format!("task-{n}")), Some(Ok(_))));
            }
        });
    }

    #[test]
    fn debug() {
        let bag: Bag<_> = [
            ("a", future::ready(Ok::<_, io::Error>(1))),
            ("b", future::ready(Ok(2))),
        ]
        .into_iter()
        .collect();

        let mut fut = bag.settle();
        assert_eq!(format!("{fut:?}"), r#"{"a": Pending, "b": Pending}"#);

        let waker: Waker = Arc::new(DummyWaker()).into();
        let mut cx = Context::from_waker(&waker);
        let _ = Pin::new(&mut fut).poll(&mut cx);
        assert_eq!(format!("{fut:?}"), "{}");
    }

    /// A future which needs to be polled `remaining + 1` times before it is
    /// ready.
    struct Countdown {
        remaining: usize,
        value: u8,
    }

    impl Countdown {
        fn new(remaining: usize, value: u8) -> Self {
            Self { remaining, value }
        }
    }

    impl Future for Countdown {
        type Output = io::Result<u8>;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            if self.remaining == 0 {
                Poll::Ready(Ok(self.value))
            } else {
                self.remaining -= 1;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    struct LatchState {
        started: usize,
        total: usize,
        wakers: Vec<Waker>,
    }

    /// A future which stays pending until every future in its batch has been
    /// polled at least once.
    struct Latch {
        registered: bool,
        value: u8,
        shared: Rc<RefCell<LatchState>>,
    }

    impl Latch {
        fn new(value: u8, shared: Rc<RefCell<LatchState>>) -> Self {
            Self {
                registered: false,
                value,
                shared,
            }
        }
    }

    impl Future for Latch {
        type Output = io::Result<u8>;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            let this = &mut *self;
            let mut shared = this.shared.borrow_mut();
            if !this.registered {
                this.registered = true;
                shared.started += 1;
                if shared.started == shared.total {
                    // The whole batch is in flight; release the others.
                    for waker in shared.wakers.drain(..) {
                        waker.wake();
                    }
                    return Poll::Ready(Ok(this.value));
                }
            } else if shared.started == shared.total {
                return Poll::Ready(Ok(this.value));
            }
            shared.wakers.push(cx.waker().clone());
            Poll::Pending
        }
    }
}
