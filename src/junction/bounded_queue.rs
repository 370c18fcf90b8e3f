use std::collections::VecDeque;
use std::num::NonZeroUsize;

use super::{Actions, DownstreamId, Event, Strategy, UpstreamId};
use crate::primitive::Ref;
use crate::{Cause, Failure};

/// A FIFO queue strategy with an optional bound.
///
/// Offers are accepted while fewer than `bound` values are buffered; beyond
/// that they stay pending until a delivery makes room. Consumers are served in
/// the order they asked. A clean close drops offers that weren't accepted,
/// then lets the buffer drain before consumers see the end.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    bound: Option<NonZeroUsize>,
    buffer: VecDeque<T>,
    deferred: VecDeque<(UpstreamId, T)>,
    waiting: VecDeque<DownstreamId>,
    draining: bool,
    closed: bool,
    size: Ref<usize>,
    reported: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue strategy; `None` means unbounded.
    pub fn new(bound: Option<NonZeroUsize>) -> Self {
        Self {
            bound,
            buffer: VecDeque::new(),
            deferred: VecDeque::new(),
            waiting: VecDeque::new(),
            draining: false,
            closed: false,
            size: Ref::with_value(0),
            reported: 0,
        }
    }

    /// A live view of the number of buffered values.
    pub fn size(&self) -> Ref<usize> {
        self.size.clone()
    }

    fn has_room(&self) -> bool {
        self.bound
            .map_or(true, |bound| self.buffer.len() < bound.get())
    }

    /// Hand buffered values to waiting consumers and accept deferred offers
    /// as room frees up.
    fn serve(&mut self, actions: &mut Actions<T>) {
        loop {
            while !self.waiting.is_empty() && !self.buffer.is_empty() {
                if let (Some(consumer), Some(value)) =
                    (self.waiting.pop_front(), self.buffer.pop_front())
                {
                    actions.deliver_to(consumer, value);
                }
            }
            if !self.has_room() || self.deferred.is_empty() {
                break;
            }
            while self.has_room() {
                let Some((producer, value)) = self.deferred.pop_front() else {
                    break;
                };
                self.buffer.push_back(value);
                actions.request_more(producer);
            }
            if self.waiting.is_empty() {
                break;
            }
        }

        if self.draining && self.buffer.is_empty() && !self.closed {
            self.finish(Cause::Clean, actions);
        }
        if !self.closed && self.reported != self.buffer.len() {
            self.reported = self.buffer.len();
            // The size cell is only closed by `finish`.
            let _ = self.size.set_value(self.reported);
        }
    }

    fn finish(&mut self, cause: Cause, actions: &mut Actions<T>) {
        self.closed = true;
        self.buffer.clear();
        self.deferred.clear();
        self.waiting.clear();
        match &cause {
            Cause::Error(failure) => self.size.fail(failure.clone()),
            Cause::Clean | Cause::Killed => {
                let _ = self.size.set_value(0);
                self.size.close();
            }
        }
        actions.close_all(cause);
    }
}

impl<T> Strategy for BoundedQueue<T> {
    type In = T;
    type Out = T;

    fn step(&mut self, event: Event<T>, actions: &mut Actions<T>) -> Result<(), Failure> {
        match event {
            Event::UpstreamReady(producer, value) => {
                if self.has_room() {
                    self.buffer.push_back(value);
                    actions.request_more(producer);
                } else {
                    self.deferred.push_back((producer, value));
                }
            }
            Event::UpstreamClosed(producer, _) | Event::OfferWithdrawn(producer) => {
                self.deferred.retain(|(id, _)| *id != producer);
            }
            Event::DownstreamOpened(_) => {}
            Event::DownstreamWants(consumer, n) => {
                self.waiting.extend(std::iter::repeat(consumer).take(n));
            }
            Event::DownstreamGone(consumer) => self.waiting.retain(|id| *id != consumer),
            Event::Close(Cause::Clean) => {
                self.draining = true;
                self.deferred.clear();
            }
            Event::Close(cause) => {
                self.finish(cause, actions);
                return Ok(());
            }
        }
        self.serve(actions);
        Ok(())
    }

    fn reclaim(&mut self, value: T, actions: &mut Actions<T>) -> Result<(), Failure> {
        if !self.closed {
            self.buffer.push_front(value);
            self.serve(actions);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junction::Action;

    fn up(n: usize) -> UpstreamId {
        UpstreamId(n)
    }

    fn down(n: usize) -> DownstreamId {
        DownstreamId(n)
    }

    fn step(q: &mut BoundedQueue<u8>, event: Event<u8>) -> Vec<Action<u8>> {
        let mut actions = Actions::new();
        q.step(event, &mut actions).unwrap();
        actions.into_iter().collect()
    }

    #[test]
    fn defers_beyond_bound() {
        let mut q = BoundedQueue::new(NonZeroUsize::new(1));
        assert_eq!(
            step(&mut q, Event::UpstreamReady(up(0), 1)),
            [Action::RequestMore(up(0))]
        );
        assert!(step(&mut q, Event::UpstreamReady(up(1), 2)).is_empty());
        assert_eq!(q.size().get_now(), Some(1));

        assert_eq!(
            step(&mut q, Event::DownstreamWants(down(0), 1)),
            [Action::DeliverTo(down(0), 1), Action::RequestMore(up(1))]
        );
        assert_eq!(q.size().get_now(), Some(1));
    }

    #[test]
    fn serves_consumers_in_order() {
        let mut q = BoundedQueue::new(None);
        step(&mut q, Event::DownstreamWants(down(1), 1));
        step(&mut q, Event::DownstreamWants(down(0), 1));
        assert_eq!(
            step(&mut q, Event::UpstreamReady(up(0), 7)),
            [Action::RequestMore(up(0)), Action::DeliverTo(down(1), 7)]
        );
    }

    #[test]
    fn withdrawn_offer_is_never_accepted() {
        let mut q = BoundedQueue::new(NonZeroUsize::new(1));
        step(&mut q, Event::UpstreamReady(up(0), 1));
        step(&mut q, Event::UpstreamReady(up(1), 2));
        assert!(step(&mut q, Event::OfferWithdrawn(up(1))).is_empty());
        assert_eq!(
            step(&mut q, Event::DownstreamWants(down(0), 1)),
            [Action::DeliverTo(down(0), 1)]
        );
        assert_eq!(q.size().get_now(), Some(0));
    }

    #[test]
    fn clean_close_drains_first() {
        let mut q = BoundedQueue::new(NonZeroUsize::new(1));
        step(&mut q, Event::UpstreamReady(up(0), 1));
        step(&mut q, Event::UpstreamReady(up(1), 2));
        assert!(step(&mut q, Event::Close(Cause::Clean)).is_empty());
        assert_eq!(
            step(&mut q, Event::DownstreamWants(down(0), 1)),
            [
                Action::DeliverTo(down(0), 1),
                Action::CloseAll(Cause::Clean)
            ]
        );
    }

    #[test]
    fn reclaimed_values_go_first() {
        let mut q = BoundedQueue::new(None);
        step(&mut q, Event::UpstreamReady(up(0), 2));
        let mut actions = Actions::new();
        q.reclaim(1, &mut actions).unwrap();
        assert_eq!(
            step(&mut q, Event::DownstreamWants(down(0), 1)),
            [Action::DeliverTo(down(0), 1)]
        );
    }
}
