//! Decision logic for combining two processes.
//!
//! A [`Wye`] is a pure state machine. The engine driving it ([`Combine`])
//! repeatedly asks it for a [`Directive`]: emit a value, halt, or await a
//! value from the left side, the right side, or whichever is ready first. The
//! answer to an `Await` comes back through [`Wye::feed`] as a tagged
//! [`Event`].
//!
//! [`Combine`]: crate::engine::Combine
//!
//! # Examples
//!
//! ```
//! use futures_wye::prelude::*;
//! use futures_wye::{process, wye};
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     // Prime the left side with two buffered values before live traffic.
//!     let w = wye::feed_left([10, 20], wye::merge());
//!     let (items, _) = process::iter(0..2)
//!         .wye(process::empty(), w)
//!         .run_log()
//!         .await;
//!     assert_eq!(items, [10, 20, 0, 1]);
//! })
//! ```

mod echo;
mod either;
mod feed;
mod interrupt;
mod merge;
mod yip;

use crate::{Cause, Failure};

pub use echo::EchoLeft;
pub use either::{Either, EitherWye};
pub use feed::{FeedLeft, FeedRight};
pub use interrupt::Interrupt;
pub use merge::{DrainLeft, DrainRight, Merge};
pub use yip::Yip;

/// An event from one of the two sides.
///
/// Once a side's `*Halted` event has been delivered, no further events from
/// that side follow.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<L, R> {
    /// The left side emitted a value.
    Left(L),
    /// The right side emitted a value.
    Right(R),
    /// The left side halted.
    LeftHalted(Cause),
    /// The right side halted.
    RightHalted(Cause),
}

/// Which side a wye wants to hear from next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Only the left side.
    Left,
    /// Only the right side.
    Right,
    /// Whichever side is ready first.
    Either,
}

impl Request {
    pub(crate) fn includes_left(self) -> bool {
        matches!(self, Request::Left | Request::Either)
    }

    pub(crate) fn includes_right(self) -> bool {
        matches!(self, Request::Right | Request::Either)
    }
}

/// What a wye wants to happen next.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<O> {
    /// Emit a value downstream without consuming input.
    Emit(O),
    /// Feed one event from the requested side(s).
    Await(Request),
    /// Stop; both sides get killed.
    Halt(Cause),
}

/// A two-input state machine deciding how to combine two processes.
///
/// After [`next`][Wye::next] returns [`Directive::Await`], exactly one event
/// from a requested side is fed before `next` is called again.
pub trait Wye<L, R> {
    /// The values this wye emits.
    type Output;

    /// Decide what happens next.
    fn next(&mut self) -> Directive<Self::Output>;

    /// Receive an event from one of the sides.
    ///
    /// An error halts the combination as if a side had failed.
    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure>;
}

impl<L, R, W> Wye<L, R> for Box<W>
where
    W: Wye<L, R> + ?Sized,
{
    type Output = W::Output;

    fn next(&mut self) -> Directive<Self::Output> {
        (**self).next()
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        (**self).feed(event)
    }
}

/// Interleave both sides; a side's clean halt drains the other, any other
/// halt stops everything.
pub fn merge<T>() -> Merge<T> {
    Merge::new(Halting::Both)
}

/// Like [`merge`], but stop as soon as either side halts.
pub fn merge_halt_both<T>() -> Merge<T> {
    Merge::new(Halting::Either)
}

/// Like [`merge`], but stop as soon as the left side halts.
pub fn merge_halt_left<T>() -> Merge<T> {
    Merge::new(Halting::Left)
}

/// Like [`merge`], but stop as soon as the right side halts.
pub fn merge_halt_right<T>() -> Merge<T> {
    Merge::new(Halting::Right)
}

/// Interleave both sides, tagging each value with its origin.
pub fn either<L, R>() -> EitherWye<L, R> {
    EitherWye::new()
}

/// Forward the right side until the left side emits `true`.
pub fn interrupt<T>() -> Interrupt<T> {
    Interrupt::new()
}

/// Replay `buffer` into `wye` as left values before awaiting the live left
/// side.
pub fn feed_left<L, W>(buffer: impl IntoIterator<Item = L>, wye: W) -> FeedLeft<W, L> {
    FeedLeft::new(buffer.into_iter().collect(), wye)
}

/// Replay `buffer` into `wye` as right values before awaiting the live right
/// side.
pub fn feed_right<R, W>(buffer: impl IntoIterator<Item = R>, wye: W) -> FeedRight<W, R> {
    FeedRight::new(buffer.into_iter().collect(), wye)
}

/// Emit every left value, and repeat the latest one whenever the right side
/// emits.
pub fn echo_left<T: Clone, R>() -> EchoLeft<T, R> {
    EchoLeft::new()
}

/// Pair up left and right values, one each.
pub fn yip<L, R>() -> Yip<L, R> {
    Yip::new()
}

/// Run the left side only for its effects; emit the right side's values.
pub fn drain_left<L, R>() -> DrainLeft<L, R> {
    DrainLeft::new()
}

/// Run the right side only for its effects; emit the left side's values.
pub fn drain_right<L, R>() -> DrainRight<L, R> {
    DrainRight::new()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Which clean halts end the whole combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Halting {
    /// Only once both sides halted.
    Both,
    /// As soon as either side halted.
    Either,
    /// As soon as the left side halted.
    Left,
    /// As soon as the right side halted.
    Right,
    /// Only once both sides halted, whatever their causes. The first
    /// non-clean cause is held back until then.
    Exhausted,
}

/// Liveness bookkeeping shared by the merge-like wyes.
#[derive(Debug)]
pub(crate) struct Sides {
    left: bool,
    right: bool,
    halting: Halting,
    halted: Option<Cause>,
    deferred: Option<Cause>,
}

impl Sides {
    pub(crate) fn new(halting: Halting) -> Self {
        Self {
            left: true,
            right: true,
            halting,
            halted: None,
            deferred: None,
        }
    }

    /// Record that `side` halted, latching the combination's cause if this
    /// ends it.
    pub(crate) fn on_halt(&mut self, side: Side, cause: Cause) {
        match side {
            Side::Left => self.left = false,
            Side::Right => self.right = false,
        }
        if self.halted.is_some() {
            return;
        }
        let ends = match self.halting {
            Halting::Exhausted => {
                if !cause.is_clean() && self.deferred.is_none() {
                    self.deferred = Some(cause);
                }
                if !self.left && !self.right {
                    self.halted = Some(self.deferred.take().unwrap_or(Cause::Clean));
                }
                return;
            }
            _ if !cause.is_clean() => true,
            Halting::Both => !self.left && !self.right,
            Halting::Either => true,
            Halting::Left => side == Side::Left,
            Halting::Right => side == Side::Right,
        };
        if ends {
            self.halted = Some(cause);
        }
    }

    /// Halt if the combination ended, else await whichever sides are live.
    pub(crate) fn directive<O>(&self) -> Directive<O> {
        if let Some(cause) = &self.halted {
            return Directive::Halt(cause.clone());
        }
        match (self.left, self.right) {
            (true, true) => Directive::Await(Request::Either),
            (true, false) => Directive::Await(Request::Left),
            (false, true) => Directive::Await(Request::Right),
            (false, false) => Directive::Halt(Cause::Clean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_drain_then_halt() {
        let mut sides = Sides::new(Halting::Both);
        assert_eq!(sides.directive::<()>(), Directive::Await(Request::Either));
        sides.on_halt(Side::Left, Cause::Clean);
        assert_eq!(sides.directive::<()>(), Directive::Await(Request::Right));
        sides.on_halt(Side::Right, Cause::Clean);
        assert_eq!(sides.directive::<()>(), Directive::Halt(Cause::Clean));
    }

    #[test]
    fn first_cause_wins() {
        let failure = Failure::msg("boom");
        let mut sides = Sides::new(Halting::Both);
        sides.on_halt(Side::Right, Cause::Error(failure.clone()));
        sides.on_halt(Side::Left, Cause::Killed);
        assert_eq!(sides.directive::<()>(), Directive::Halt(Cause::Error(failure)));
    }

    #[test]
    fn exhausted_holds_the_first_failure() {
        let failure = Failure::msg("boom");
        let mut sides = Sides::new(Halting::Exhausted);
        sides.on_halt(Side::Left, Cause::Error(failure.clone()));
        assert_eq!(sides.directive::<()>(), Directive::Await(Request::Right));
        sides.on_halt(Side::Right, Cause::Killed);
        assert_eq!(sides.directive::<()>(), Directive::Halt(Cause::Error(failure)));
    }

    #[test]
    fn halt_left_policy() {
        let mut sides = Sides::new(Halting::Left);
        sides.on_halt(Side::Right, Cause::Clean);
        assert_eq!(sides.directive::<()>(), Directive::Await(Request::Left));
        sides.on_halt(Side::Left, Cause::Clean);
        assert_eq!(sides.directive::<()>(), Directive::Halt(Cause::Clean));
    }
}
