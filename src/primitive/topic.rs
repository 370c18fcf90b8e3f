use core::fmt;

use crate::junction::{Downstream, Junction, Pipe, PubSub};
use crate::process::Process;
use crate::{Cause, Failure};

/// A subscriber of a [`Topic`].
pub type Subscription<T> = Downstream<PubSub<T>>;

/// A broadcast channel.
///
/// Each published value goes to every subscriber present when it was
/// published. Late subscribers see nothing from before they subscribed.
///
/// # Examples
///
/// ```
/// use futures_wye::prelude::*;
/// use futures_wye::primitive::Topic;
/// use futures_lite::future::block_on;
///
/// block_on(async {
///     let topic = Topic::new();
///     topic.publish_one("missed").await.unwrap();
///
///     let first = topic.subscribe();
///     let second = topic.subscribe();
///     topic.publish_one("hello").await.unwrap();
///     topic.close();
///
///     assert_eq!(first.run_log().await.0, ["hello"]);
///     assert_eq!(second.run_log().await.0, ["hello"]);
/// })
/// ```
pub struct Topic<T: Clone> {
    junction: Junction<PubSub<T>>,
}

impl<T: Clone> Topic<T> {
    /// Create a topic with no subscribers.
    pub fn new() -> Self {
        Self {
            junction: Junction::new(PubSub::new()),
        }
    }

    /// Publish one value.
    pub async fn publish_one(&self, value: T) -> Result<(), Cause> {
        self.junction.upstream().offer(value).await
    }

    /// Publish every value of `process`.
    pub fn publish_all<P>(&self, process: P) -> Pipe<PubSub<T>, P>
    where
        P: Process<Item = T>,
    {
        self.junction.upstream().pipe(process)
    }

    /// Subscribe to values published from now on.
    pub fn subscribe(&self) -> Subscription<T> {
        self.junction.downstream()
    }

    /// Stop publishing; subscribers halt cleanly after what they've received.
    pub fn close(&self) {
        self.junction.close(Cause::Clean);
    }

    /// Halt every subscriber with `failure`.
    pub fn fail(&self, failure: Failure) {
        self.junction.close(Cause::Error(failure));
    }
}

impl<T: Clone> Default for Topic<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            junction: self.junction.clone(),
        }
    }
}

impl<T: Clone> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("junction", &self.junction)
            .finish()
    }
}
