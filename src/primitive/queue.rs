use core::fmt;
use std::num::NonZeroUsize;

use super::Signal;
use crate::junction::{BoundedQueue, Downstream, Junction, Pipe};
use crate::process::{Process, ProcessExt, Step};
use crate::utils::swallow_cleanup;
use crate::{Cause, Failure};

/// A consumer of a [`Queue`].
pub type Dequeue<T> = Downstream<BoundedQueue<T>>;

/// An asynchronous FIFO queue.
///
/// Each value goes to exactly one consumer. Cloning the queue yields another
/// handle to the same queue.
///
/// # Examples
///
/// ```
/// use futures_wye::prelude::*;
/// use futures_wye::primitive::Queue;
/// use futures_lite::future::block_on;
///
/// block_on(async {
///     let queue = Queue::unbounded();
///     queue.enqueue_one(1).await.unwrap();
///     queue.enqueue_one(2).await.unwrap();
///     queue.close();
///
///     let (items, cause) = queue.dequeue().run_log().await;
///     assert_eq!(items, [1, 2]);
///     assert!(cause.is_clean());
/// })
/// ```
pub struct Queue<T> {
    junction: Junction<BoundedQueue<T>>,
    size: Signal<usize>,
}

impl<T> Queue<T> {
    /// Create a queue with no bound.
    pub fn unbounded() -> Self {
        Self::with_bound(None)
    }

    /// Create a queue holding at most `bound` values; enqueuing beyond that
    /// waits until a consumer makes room.
    pub fn bounded(bound: NonZeroUsize) -> Self {
        Self::with_bound(Some(bound))
    }

    fn with_bound(bound: Option<NonZeroUsize>) -> Self {
        let strategy = BoundedQueue::new(bound);
        let size = Signal::from_ref(strategy.size());
        Self {
            junction: Junction::new(strategy),
            size,
        }
    }

    /// Enqueue one value, waiting for room if the queue is full.
    pub async fn enqueue_one(&self, value: T) -> Result<(), Cause> {
        self.junction.upstream().offer(value).await
    }

    /// Enqueue every value of `process`.
    ///
    /// See [`Upstream::pipe`][crate::junction::Upstream::pipe].
    pub fn enqueue_all<P>(&self, process: P) -> Pipe<BoundedQueue<T>, P>
    where
        P: Process<Item = T>,
    {
        self.junction.upstream().pipe(process)
    }

    /// Attach a consumer.
    pub fn dequeue(&self) -> Dequeue<T> {
        self.junction.downstream()
    }

    /// Take one value, waiting for it if the queue is empty.
    pub async fn dequeue_one(&self) -> Result<T, Cause> {
        let mut consumer = self.dequeue();
        let step = consumer.next().await;
        swallow_cleanup(consumer.kill().await);
        match step {
            Step::Emit(value) => Ok(value),
            Step::Halt(cause) => Err(cause),
        }
    }

    /// The number of values waiting in the queue.
    pub fn size(&self) -> Signal<usize> {
        self.size.clone()
    }

    /// Stop accepting values; consumers drain what's left, then halt cleanly.
    pub fn close(&self) {
        self.junction.close(Cause::Clean);
    }

    /// Discard everything and halt consumers as killed.
    pub fn cancel(&self) {
        self.junction.close(Cause::Killed);
    }

    /// Discard everything and halt consumers with `failure`.
    pub fn fail(&self, failure: Failure) {
        self.junction.close(Cause::Error(failure));
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            junction: self.junction.clone(),
            size: self.size.clone(),
        }
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("junction", &self.junction)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::{block_on, poll_once};

    #[test]
    fn dequeue_one_returns_values_in_order() {
        block_on(async {
            let queue = Queue::unbounded();
            queue.enqueue_one('a').await.unwrap();
            queue.enqueue_one('b').await.unwrap();
            assert_eq!(queue.dequeue_one().await, Ok('a'));
            assert_eq!(queue.dequeue_one().await, Ok('b'));
        })
    }

    #[test]
    fn full_queue_holds_offers() {
        block_on(async {
            let queue = Queue::bounded(NonZeroUsize::new(1).unwrap());
            queue.enqueue_one(1).await.unwrap();
            let mut second = Box::pin(queue.enqueue_one(2));
            assert!(poll_once(&mut second).await.is_none());
            assert_eq!(queue.dequeue_one().await, Ok(1));
            assert_eq!(second.await, Ok(()));
            assert_eq!(queue.size().cell().get_now(), Some(1));
        })
    }

    #[test]
    fn failing_discards_values() {
        block_on(async {
            let queue = Queue::unbounded();
            queue.enqueue_one(1).await.unwrap();
            let failure = Failure::msg("boom");
            queue.fail(failure.clone());
            assert_eq!(queue.dequeue_one().await, Err(Cause::Error(failure)));
        })
    }
}
