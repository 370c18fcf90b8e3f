use std::num::NonZeroUsize;

use futures_lite::future::{block_on, poll_once, zip};
use futures_wye::prelude::*;
use futures_wye::primitive::Queue;
use futures_wye::{process, Cause, Failure};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn values_arrive_in_order() {
    init_tracing();
    block_on(async {
        let queue = Queue::unbounded();
        queue.enqueue_all(process::iter(0..50)).await.unwrap();
        queue.close();
        let (items, cause) = queue.dequeue().run_log().await;
        assert_eq!(items, (0..50).collect::<Vec<_>>());
        assert!(cause.is_clean());
    })
}

#[test]
fn bounded_queue_applies_backpressure() {
    init_tracing();
    block_on(async {
        let queue = Queue::bounded(NonZeroUsize::new(2).unwrap());
        let mut producer = Box::pin(queue.enqueue_all(process::iter(0..5)));

        // Two values fit; the third offer waits for room.
        assert!(poll_once(&mut producer).await.is_none());
        assert_eq!(queue.size().cell().get_now(), Some(2));

        let mut consumer = queue.dequeue();
        let consume = async {
            let mut seen = Vec::new();
            for _ in 0..5 {
                if let Step::Emit(value) = consumer.next().await {
                    seen.push(value);
                }
            }
            seen
        };
        let (sent, seen) = zip(producer, consume).await;
        sent.unwrap();
        assert_eq!(seen, [0, 1, 2, 3, 4]);
        consumer.kill().await.unwrap();
    })
}

#[test]
fn each_value_goes_to_one_consumer() {
    init_tracing();
    block_on(async {
        let queue = Queue::unbounded();
        let first = queue.dequeue();
        let second = queue.dequeue();
        queue.enqueue_all(process::iter(0..10)).await.unwrap();
        queue.close();

        let ((a, _), (b, _)) = zip(first.run_log(), second.run_log()).await;
        let mut all: Vec<_> = a.into_iter().chain(b).collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    })
}

#[test]
fn departed_consumer_hands_values_back() {
    init_tracing();
    block_on(async {
        let queue = Queue::unbounded();
        let mut early = queue.dequeue();
        let mut pull = Box::pin(early.next());
        assert!(poll_once(&mut pull).await.is_none());
        drop(pull);

        // The value is delivered to `early`, which leaves before pulling it.
        queue.enqueue_one('x').await.unwrap();
        early.kill().await.unwrap();
        assert_eq!(queue.dequeue_one().await, Ok('x'));
    })
}

#[test]
fn cancel_discards_and_rejects() {
    init_tracing();
    block_on(async {
        let queue = Queue::unbounded();
        queue.enqueue_one(1).await.unwrap();
        queue.cancel();
        assert_eq!(queue.dequeue_one().await, Err(Cause::Killed));
        assert_eq!(queue.enqueue_one(2).await, Err(Cause::Killed));
    })
}

#[test]
fn fail_reaches_waiting_consumers() {
    init_tracing();
    block_on(async {
        let queue = Queue::<u8>::unbounded();
        let failure = Failure::msg("gone");
        let waiter = queue.dequeue_one();
        let failer = async {
            futures_lite::future::yield_now().await;
            queue.fail(failure.clone());
        };
        let (result, ()) = zip(waiter, failer).await;
        assert_eq!(result, Err(Cause::Error(failure.clone())));

        let size = queue.size();
        assert_eq!(size.get().await, Err(Cause::Error(failure)));
    })
}

#[test]
fn close_drains_before_halting() {
    init_tracing();
    block_on(async {
        let queue = Queue::unbounded();
        queue.enqueue_one("a").await.unwrap();
        queue.enqueue_one("b").await.unwrap();
        queue.close();
        assert_eq!(queue.enqueue_one("c").await, Err(Cause::Clean));
        assert_eq!(queue.dequeue_one().await, Ok("a"));
        assert_eq!(queue.dequeue_one().await, Ok("b"));
        assert_eq!(queue.dequeue_one().await, Err(Cause::Clean));
    })
}
