use std::collections::VecDeque;
use std::task::{Poll, Waker};

use slab::Slab;

use super::{Action, Actions, DownstreamId, Event, Strategy, UpstreamId};
use crate::process::Step;
use crate::utils::Wakeups;
use crate::{Cause, Failure};

#[derive(Debug, Default)]
struct UpstreamSlot {
    /// A value was offered and the strategy hasn't accepted it yet.
    pending: bool,
    /// The strategy accepted the pending value.
    granted: bool,
    rejected: Option<Cause>,
    waker: Option<Waker>,
}

#[derive(Debug)]
struct DownstreamSlot<T> {
    inbox: VecDeque<T>,
    demand: usize,
    waker: Option<Waker>,
}

/// The state of a junction. Only ever touched through its mailbox.
pub(crate) struct Core<S: Strategy> {
    strategy: S,
    upstreams: Slab<UpstreamSlot>,
    downstreams: Slab<DownstreamSlot<S::Out>>,
    /// Set by the first close request; producers are rejected from then on.
    closing: Option<Cause>,
    /// Set once the junction terminated; consumers halt once their inbox is
    /// empty.
    closed: Option<Cause>,
}

fn park(slot: &mut Option<Waker>, waker: &Waker) {
    match slot {
        Some(prev) => prev.clone_from(waker),
        None => *slot = Some(waker.clone()),
    }
}

impl<S: Strategy> Core<S> {
    pub(crate) fn new(strategy: S) -> Self {
        Self {
            strategy,
            upstreams: Slab::new(),
            downstreams: Slab::new(),
            closing: None,
            closed: None,
        }
    }

    pub(crate) fn terminal(&self) -> Option<&Cause> {
        self.closed.as_ref()
    }

    pub(crate) fn open_upstream(&mut self) -> UpstreamId {
        UpstreamId(self.upstreams.insert(UpstreamSlot::default()))
    }

    /// Detach a producer. `cause` is how it finished, if it knows.
    pub(crate) fn close_upstream(
        &mut self,
        id: UpstreamId,
        cause: Option<Cause>,
        wakeups: &mut Wakeups,
    ) {
        if !self.upstreams.contains(id.0) {
            return;
        }
        let slot = self.upstreams.remove(id.0);
        let cause = if slot.pending {
            Cause::Killed
        } else {
            cause.unwrap_or(Cause::Clean)
        };
        self.dispatch(Event::UpstreamClosed(id, cause), wakeups);
    }

    pub(crate) fn open_downstream(&mut self, wakeups: &mut Wakeups) -> DownstreamId {
        let id = DownstreamId(self.downstreams.insert(DownstreamSlot {
            inbox: VecDeque::new(),
            demand: 0,
            waker: None,
        }));
        tracing::debug!(downstream = id.0, "consumer joined");
        self.dispatch(Event::DownstreamOpened(id), wakeups);
        id
    }

    /// Detach a consumer, handing its undelivered values back to the strategy.
    pub(crate) fn close_downstream(&mut self, id: DownstreamId, wakeups: &mut Wakeups) {
        if !self.downstreams.contains(id.0) {
            return;
        }
        let slot = self.downstreams.remove(id.0);
        tracing::debug!(downstream = id.0, "consumer left");
        self.dispatch(Event::DownstreamGone(id), wakeups);

        for value in slot.inbox.into_iter().rev() {
            if self.closed.is_some() {
                break;
            }
            let mut actions = Actions::new();
            let result = self.strategy.reclaim(value, &mut actions);
            self.settle(result, actions, wakeups);
        }
    }

    pub(crate) fn close(&mut self, cause: Cause, wakeups: &mut Wakeups) {
        if self.closing.is_some() || self.closed.is_some() {
            return;
        }
        tracing::debug!(%cause, "junction closing");
        self.closing = Some(cause.clone());
        for (_, slot) in self.upstreams.iter_mut() {
            wakeups.push(slot.waker.take());
        }
        self.dispatch(Event::Close(cause.clone()), wakeups);
        if !cause.is_clean() {
            self.close_all(cause, wakeups);
        }
    }

    /// Offer `value` on behalf of upstream `id` (if given), then report
    /// whether its offer completed.
    pub(crate) fn poll_offer(
        &mut self,
        id: UpstreamId,
        value: Option<S::In>,
        waker: &Waker,
        wakeups: &mut Wakeups,
    ) -> Poll<Result<(), Cause>> {
        if let Some(value) = value {
            if let Some(cause) = self.rejection(id) {
                return Poll::Ready(Err(cause));
            }
            if let Some(slot) = self.upstreams.get_mut(id.0) {
                slot.pending = true;
                slot.granted = false;
            }
            self.dispatch(Event::UpstreamReady(id, value), wakeups);
        }

        let rejection = self.rejection(id);
        let Some(slot) = self.upstreams.get_mut(id.0) else {
            return Poll::Ready(Err(Cause::Killed));
        };
        if slot.granted {
            slot.granted = false;
            slot.pending = false;
            return Poll::Ready(Ok(()));
        }
        if let Some(cause) = rejection {
            slot.pending = false;
            return Poll::Ready(Err(cause));
        }
        park(&mut slot.waker, waker);
        Poll::Pending
    }

    /// Take back upstream `id`'s pending offer unless the strategy already
    /// accepted it.
    pub(crate) fn withdraw_offer(&mut self, id: UpstreamId, wakeups: &mut Wakeups) {
        let Some(slot) = self.upstreams.get_mut(id.0) else {
            return;
        };
        let withdrawn = slot.pending && !slot.granted;
        slot.pending = false;
        slot.granted = false;
        slot.waker = None;
        if withdrawn {
            tracing::trace!(upstream = id.0, "offer withdrawn");
            self.dispatch(Event::OfferWithdrawn(id), wakeups);
        }
    }

    /// Resolve once offers from upstream `id` would be rejected.
    pub(crate) fn poll_rejected(&mut self, id: UpstreamId, waker: &Waker) -> Poll<Cause> {
        if let Some(cause) = self.rejection(id) {
            return Poll::Ready(cause);
        }
        if let Some(slot) = self.upstreams.get_mut(id.0) {
            park(&mut slot.waker, waker);
        }
        Poll::Pending
    }

    /// Pull on behalf of downstream `id`, registering demand if it has none
    /// outstanding.
    pub(crate) fn poll_pull(
        &mut self,
        id: DownstreamId,
        waker: &Waker,
        wakeups: &mut Wakeups,
    ) -> Poll<Step<S::Out>> {
        if let Some(step) = self.try_pull(id) {
            return Poll::Ready(step);
        }
        let Some(slot) = self.downstreams.get_mut(id.0) else {
            return Poll::Ready(Step::Halt(Cause::Killed));
        };
        park(&mut slot.waker, waker);
        if slot.demand == 0 {
            slot.demand = 1;
            self.dispatch(Event::DownstreamWants(id, 1), wakeups);
            if let Some(step) = self.try_pull(id) {
                return Poll::Ready(step);
            }
        }
        Poll::Pending
    }

    fn try_pull(&mut self, id: DownstreamId) -> Option<Step<S::Out>> {
        let Some(slot) = self.downstreams.get_mut(id.0) else {
            return Some(Step::Halt(self.closed.clone().unwrap_or(Cause::Killed)));
        };
        if let Some(value) = slot.inbox.pop_front() {
            return Some(Step::Emit(value));
        }
        self.closed.clone().map(Step::Halt)
    }

    fn rejection(&self, id: UpstreamId) -> Option<Cause> {
        let rejected = self.upstreams.get(id.0).and_then(|slot| slot.rejected.as_ref());
        rejected
            .or(self.closing.as_ref())
            .or(self.closed.as_ref())
            .cloned()
    }

    fn dispatch(&mut self, event: Event<S::In>, wakeups: &mut Wakeups) {
        if self.closed.is_some() {
            tracing::trace!("junction closed; event dropped");
            return;
        }
        let mut actions = Actions::new();
        let result = self.strategy.step(event, &mut actions);
        self.settle(result, actions, wakeups);
    }

    /// Carry out a strategy's actions, closing the junction if it failed.
    fn settle(
        &mut self,
        result: Result<(), Failure>,
        actions: Actions<S::Out>,
        wakeups: &mut Wakeups,
    ) {
        for action in actions {
            self.apply(action, wakeups);
        }
        if let Err(failure) = result {
            self.close_all(Cause::Error(failure), wakeups);
        }
    }

    fn apply(&mut self, action: Action<S::Out>, wakeups: &mut Wakeups) {
        match action {
            Action::DeliverTo(id, value) => match self.downstreams.get_mut(id.0) {
                Some(slot) => {
                    slot.inbox.push_back(value);
                    slot.demand = slot.demand.saturating_sub(1);
                    wakeups.push(slot.waker.take());
                }
                None => tracing::trace!(downstream = id.0, "delivery to departed consumer dropped"),
            },
            Action::RequestMore(id) => {
                if let Some(slot) = self.upstreams.get_mut(id.0) {
                    slot.granted = slot.pending;
                    wakeups.push(slot.waker.take());
                }
            }
            Action::CloseUpstream(id) => {
                if let Some(slot) = self.upstreams.get_mut(id.0) {
                    slot.rejected.get_or_insert(Cause::Killed);
                    wakeups.push(slot.waker.take());
                }
            }
            Action::CloseAll(cause) => self.close_all(cause, wakeups),
        }
    }

    fn close_all(&mut self, cause: Cause, wakeups: &mut Wakeups) {
        if self.closed.is_some() {
            return;
        }
        tracing::debug!(%cause, "junction closed");
        for (_, slot) in self.downstreams.iter_mut() {
            if !cause.is_clean() {
                slot.inbox.clear();
            }
            wakeups.push(slot.waker.take());
        }
        for (_, slot) in self.upstreams.iter_mut() {
            wakeups.push(slot.waker.take());
        }
        self.closing.get_or_insert_with(|| cause.clone());
        self.closed = Some(cause);
    }
}
