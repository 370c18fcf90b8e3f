use criterion::async_executor::FuturesExecutor;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures_lite::future::block_on;
use futures_lite::prelude::*;
use futures_wye::engine::merge_all;
use futures_wye::prelude::*;
use futures_wye::primitive::Queue;
use futures_wye::{process, Cause};

use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("merge_all 10", |b| b.iter(|| merge_all_test(black_box(10))));
    c.bench_function("merge_all 100", |b| b.iter(|| merge_all_test(black_box(100))));
    c.bench_function("merge_all 1000", |b| b.iter(|| merge_all_test(black_box(1000))));
    c.bench_function("queue 1000", |b| b.iter(|| queue_test(black_box(1000))));
}

fn compare_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare merge");
    for i in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("futures-wye", i), i, |b, i| {
            b.to_async(FuturesExecutor).iter(|| async {
                let (items, _) = process::iter(0..*i)
                    .merge(process::iter(0..*i))
                    .run_log()
                    .await;
                assert_eq!(items.len(), *i * 2);
            })
        });
        group.bench_with_input(BenchmarkId::new("futures-rs", i), i, |b, i| {
            b.to_async(FuturesExecutor).iter(|| async {
                let merged = futures::stream::select(
                    futures::stream::iter(0..*i),
                    futures::stream::iter(0..*i),
                );
                let items: Vec<_> = merged.collect().await;
                assert_eq!(items.len(), *i * 2);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark, compare_merge);
criterion_main!(benches);

fn merge_all_test(max: usize) {
    block_on(async {
        let polls = Rc::new(RefCell::new(0));
        let processes: Vec<_> = (0..max)
            .map(|n| Countdown::new(n % 4, polls.clone()))
            .collect();
        let (items, cause) = merge_all(processes).run_log().await;
        assert_eq!(items.len(), max);
        assert_eq!(cause, Cause::Clean);
    })
}

fn queue_test(max: usize) {
    block_on(async {
        let queue = Queue::unbounded();
        let consumer = queue.dequeue();
        queue.enqueue_all(process::iter(0..max)).await.unwrap();
        queue.close();
        let (items, _) = consumer.run_log().await;
        assert_eq!(items.len(), max);
    })
}

/// A process which emits once, after asking to be polled again `count`
/// times.
struct Countdown {
    count: usize,
    done: bool,
    polls: Rc<RefCell<usize>>,
}

impl Countdown {
    fn new(count: usize, polls: Rc<RefCell<usize>>) -> Self {
        Self {
            count,
            done: false,
            polls,
        }
    }
}

impl Process for Countdown {
    type Item = usize;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<usize>> {
        let this = &mut *self;
        *this.polls.borrow_mut() += 1;
        if this.done {
            return Poll::Ready(Step::Halt(Cause::Clean));
        }
        if this.count > 0 {
            this.count -= 1;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        this.done = true;
        Poll::Ready(Step::Emit(*this.polls.borrow()))
    }
}
