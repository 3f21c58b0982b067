use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures_lite::future::block_on;
use futures_settle::bag::Bag;
use futures_settle::prelude::*;

use std::cell::RefCell;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("settle 10", |b| b.iter(|| settle_test(black_box(10))));
    c.bench_function("settle 100", |b| b.iter(|| settle_test(black_box(100))));
    c.bench_function("settle 1000", |b| b.iter(|| settle_test(black_box(1000))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn settle_test(max: usize) {
    block_on(async {
        let shared = Rc::new(RefCell::new(LatchState {
            started: 0,
            total: max,
            wakers: Vec::new(),
        }));
        let bag: Bag<_> = (0..max)
            .map(|n| (format!("task-{n}"), Latch::new(n, shared.clone())))
            .collect();

        let outcomes = bag.settle().await;
        assert_eq!(outcomes.len(), max);
    })
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
    value: usize,
    shared: Rc<RefCell<LatchState>>,
}

impl Latch {
    fn new(value: usize, shared: Rc<RefCell<LatchState>>) -> Self {
        Self {
            registered: false,
            value,
            shared,
        }
    }
}

impl Future for Latch {
    type Output = io::Result<usize>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let mut shared = this.shared.borrow_mut();
        if !this.registered {
            this.registered = true;
            shared.started += 1;
            if shared.started == shared.total {
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
