use core::fmt;
use core::marker::PhantomData;

use super::{Actions, DownstreamId, Event, Strategy};
use crate::Failure;

/// A publish/subscribe strategy.
///
/// Every published value goes to each consumer subscribed at that moment, and
/// only to those. Offers are accepted immediately; consumers that fall behind
/// buffer in their own inbox.
pub struct PubSub<T> {
    subscribers: Vec<DownstreamId>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> PubSub<T> {
    /// Create a strategy with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for PubSub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PubSub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PubSub")
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl<T: Clone> Strategy for PubSub<T> {
    type In = T;
    type Out = T;

    fn step(&mut self, event: Event<T>, actions: &mut Actions<T>) -> Result<(), Failure> {
        match event {
            Event::UpstreamReady(publisher, value) => {
                if let Some((last, rest)) = self.subscribers.split_last() {
                    for subscriber in rest {
                        actions.deliver_to(*subscriber, value.clone());
                    }
                    actions.deliver_to(*last, value);
                }
                actions.request_more(publisher);
            }
            Event::DownstreamOpened(subscriber) => self.subscribers.push(subscriber),
            Event::DownstreamGone(subscriber) => self.subscribers.retain(|id| *id != subscriber),
            Event::Close(cause) => actions.close_all(cause),
            Event::UpstreamClosed(..) | Event::OfferWithdrawn(_) | Event::DownstreamWants(..) => {}
        }
        Ok(())
    }
}
