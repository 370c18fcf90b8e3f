//! A many-producer, many-consumer engine driven by a pluggable [`Strategy`].
//!
//! Producers attach as [`Upstream`]s and offer values one at a time; consumers
//! attach as [`Downstream`]s, which are [`Process`]es. Every state transition
//! is serialized and handed to the strategy as an [`Event`]; the strategy
//! answers with [`Action`]s which the junction carries out.
//!
//! [`Process`]: crate::process::Process
//!
//! # Examples
//!
//! ```
//! use futures_wye::junction::{BoundedQueue, Junction};
//! use futures_wye::prelude::*;
//! use futures_wye::Cause;
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     let junction = Junction::new(BoundedQueue::new(None));
//!     let mut consumer = junction.downstream();
//!     let mut producer = junction.upstream();
//!
//!     producer.offer("hello").await.unwrap();
//!     junction.close(Cause::Clean);
//!
//!     assert_eq!(consumer.next().await, Step::Emit("hello"));
//!     assert_eq!(consumer.next().await, Step::Halt(Cause::Clean));
//! })
//! ```

mod bounded_queue;
mod downstream;
mod pub_sub;
mod state;
mod upstream;

use std::fmt;

use smallvec::SmallVec;

use crate::utils::Mailbox;
use crate::{Cause, Failure};

use self::state::Core;

pub use bounded_queue::BoundedQueue;
pub use downstream::Downstream;
pub use pub_sub::PubSub;
pub use upstream::{Offer, Pipe, Upstream};

/// Identifies a producer attached to a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpstreamId(usize);

/// Identifies a consumer attached to a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownstreamId(usize);

/// Something that happened at a junction.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<I> {
    /// A producer offers a value. Its offer stays pending until the strategy
    /// answers with [`Action::RequestMore`] for it, or the producer withdraws
    /// it.
    UpstreamReady(UpstreamId, I),
    /// A producer gave up on its pending offer. The value it offered must not
    /// be accepted any more.
    OfferWithdrawn(UpstreamId),
    /// A producer detached.
    ///
    /// The cause is `Killed` if it detached with an offer still pending.
    UpstreamClosed(UpstreamId, Cause),
    /// A consumer attached.
    DownstreamOpened(DownstreamId),
    /// A consumer wants `n` more values.
    DownstreamWants(DownstreamId, usize),
    /// A consumer detached.
    DownstreamGone(DownstreamId),
    /// Someone asked the junction to close.
    Close(Cause),
}

/// Something a strategy wants the junction to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<O> {
    /// Put a value in a consumer's inbox.
    DeliverTo(DownstreamId, O),
    /// Complete a producer's pending offer.
    RequestMore(UpstreamId),
    /// Reject a producer's current and future offers.
    CloseUpstream(UpstreamId),
    /// Terminate the junction.
    CloseAll(Cause),
}

/// The actions a strategy requests during one step.
#[derive(Debug)]
pub struct Actions<O> {
    actions: SmallVec<[Action<O>; 4]>,
}

impl<O> Actions<O> {
    pub(crate) fn new() -> Self {
        Self {
            actions: SmallVec::new(),
        }
    }

    /// Request an action.
    pub fn push(&mut self, action: Action<O>) {
        self.actions.push(action);
    }

    /// Shorthand for [`Action::DeliverTo`].
    pub fn deliver_to(&mut self, downstream: DownstreamId, value: O) {
        self.push(Action::DeliverTo(downstream, value));
    }

    /// Shorthand for [`Action::RequestMore`].
    pub fn request_more(&mut self, upstream: UpstreamId) {
        self.push(Action::RequestMore(upstream));
    }

    /// Shorthand for [`Action::CloseUpstream`].
    pub fn close_upstream(&mut self, upstream: UpstreamId) {
        self.push(Action::CloseUpstream(upstream));
    }

    /// Shorthand for [`Action::CloseAll`].
    pub fn close_all(&mut self, cause: Cause) {
        self.push(Action::CloseAll(cause));
    }

    /// Returns `true` if no actions were requested.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<O> IntoIterator for Actions<O> {
    type Item = Action<O>;
    type IntoIter = smallvec::IntoIter<[Action<O>; 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

/// The decision logic of a [`Junction`].
pub trait Strategy {
    /// The values producers offer.
    type In;
    /// The values consumers receive.
    type Out;

    /// React to an event.
    ///
    /// An error closes the junction with that error.
    fn step(&mut self, event: Event<Self::In>, actions: &mut Actions<Self::Out>)
        -> Result<(), Failure>;

    /// Take back a value which was delivered to a consumer that left before
    /// pulling it.
    ///
    /// Values are handed back newest first, after the consumer's
    /// [`Event::DownstreamGone`]. By default they are dropped.
    fn reclaim(
        &mut self,
        value: Self::Out,
        actions: &mut Actions<Self::Out>,
    ) -> Result<(), Failure> {
        let _ = (value, actions);
        Ok(())
    }
}

/// A handle to a running junction.
///
/// Cloning the handle does not clone the junction.
pub struct Junction<S: Strategy> {
    core: Mailbox<Core<S>>,
}

impl<S: Strategy> Junction<S> {
    /// Create a junction driven by `strategy`.
    pub fn new(strategy: S) -> Self {
        Self {
            core: Mailbox::new(Core::new(strategy)),
        }
    }

    /// Attach a new producer.
    pub fn upstream(&self) -> Upstream<S> {
        let id = self.core.post(|core, _| core.open_upstream());
        Upstream::new(self.core.clone(), id)
    }

    /// Attach a new consumer.
    ///
    /// The consumer is announced to the strategy right away, before it pulls.
    pub fn downstream(&self) -> Downstream<S> {
        let id = self.core.post(|core, wakeups| core.open_downstream(wakeups));
        Downstream::new(self.core.clone(), id)
    }

    /// Close the junction.
    ///
    /// Further offers are rejected with `cause` immediately, and so are
    /// pending ones the strategy hasn't accepted yet. With [`Cause::Clean`] the
    /// strategy decides when consumers see the end; any other cause ends
    /// everything now and discards undelivered values. Only the first close
    /// has an effect.
    pub fn close(&self, cause: Cause) {
        self.core.post(|core, wakeups| core.close(cause, wakeups));
    }

    /// The cause the junction terminated with, if it has.
    pub fn terminal(&self) -> Option<Cause> {
        self.core.post(|core, _| core.terminal().cloned())
    }
}

impl<S: Strategy> Clone for Junction<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<S: Strategy> fmt::Debug for Junction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Junction").field("core", &self.core).finish()
    }
}
