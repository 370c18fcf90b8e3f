use core::fmt;
use core::marker::PhantomData;

use super::{Directive, Event, Halting, Side, Sides, Wye};
use crate::Failure;

/// Interleave two processes of the same item type.
///
/// This `struct` is created by [`merge`][super::merge] and its `merge_halt_*`
/// siblings. See their documentation for more.
#[derive(Debug)]
pub struct Merge<T> {
    pending: Option<T>,
    sides: Sides,
}

impl<T> Merge<T> {
    pub(crate) fn new(halting: Halting) -> Self {
        Self {
            pending: None,
            sides: Sides::new(halting),
        }
    }
}

impl<T> Wye<T, T> for Merge<T> {
    type Output = T;

    fn next(&mut self) -> Directive<T> {
        match self.pending.take() {
            Some(item) => Directive::Emit(item),
            None => self.sides.directive(),
        }
    }

    fn feed(&mut self, event: Event<T, T>) -> Result<(), Failure> {
        match event {
            Event::Left(item) | Event::Right(item) => self.pending = Some(item),
            Event::LeftHalted(cause) => self.sides.on_halt(Side::Left, cause),
            Event::RightHalted(cause) => self.sides.on_halt(Side::Right, cause),
        }
        Ok(())
    }
}

/// Run the left side for its effects only, emitting the right side's values.
///
/// The combination ends once the right side halts. The left side halting
/// cleanly leaves the right side running.
///
/// This `struct` is created by [`drain_left`][super::drain_left].
pub struct DrainLeft<L, R> {
    pending: Option<R>,
    sides: Sides,
    _marker: PhantomData<fn(L)>,
}

impl<L, R> DrainLeft<L, R> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            sides: Sides::new(Halting::Right),
            _marker: PhantomData,
        }
    }
}

impl<L, R> fmt::Debug for DrainLeft<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrainLeft")
            .field("sides", &self.sides)
            .finish()
    }
}

impl<L, R> Wye<L, R> for DrainLeft<L, R> {
    type Output = R;

    fn next(&mut self) -> Directive<R> {
        match self.pending.take() {
            Some(item) => Directive::Emit(item),
            None => self.sides.directive(),
        }
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        match event {
            Event::Left(_) => {}
            Event::Right(item) => self.pending = Some(item),
            Event::LeftHalted(cause) => self.sides.on_halt(Side::Left, cause),
            Event::RightHalted(cause) => self.sides.on_halt(Side::Right, cause),
        }
        Ok(())
    }
}

/// The mirror image of [`DrainLeft`].
///
/// This `struct` is created by [`drain_right`][super::drain_right].
pub struct DrainRight<L, R> {
    pending: Option<L>,
    sides: Sides,
    _marker: PhantomData<fn(R)>,
}

impl<L, R> DrainRight<L, R> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            sides: Sides::new(Halting::Left),
            _marker: PhantomData,
        }
    }
}

impl<L, R> fmt::Debug for DrainRight<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrainRight")
            .field("sides", &self.sides)
            .finish()
    }
}

impl<L, R> Wye<L, R> for DrainRight<L, R> {
    type Output = L;

    fn next(&mut self) -> Directive<L> {
        match self.pending.take() {
            Some(item) => Directive::Emit(item),
            None => self.sides.directive(),
        }
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        match event {
            Event::Left(item) => self.pending = Some(item),
            Event::Right(_) => {}
            Event::LeftHalted(cause) => self.sides.on_halt(Side::Left, cause),
            Event::RightHalted(cause) => self.sides.on_halt(Side::Right, cause),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{drain_left, merge, merge_halt_both, Request};
    use super::*;
    use crate::Cause;

    #[test]
    fn merge_emits_fed_values() {
        let mut w = merge();
        assert_eq!(w.next(), Directive::Await(Request::Either));
        w.feed(Event::Left(1)).unwrap();
        assert_eq!(w.next(), Directive::Emit(1));
        w.feed(Event::RightHalted(Cause::Clean)).unwrap();
        assert_eq!(w.next(), Directive::Await(Request::Left));
        w.feed(Event::Left(2)).unwrap();
        assert_eq!(w.next(), Directive::Emit(2));
        w.feed(Event::LeftHalted(Cause::Clean)).unwrap();
        assert_eq!(w.next(), Directive::Halt(Cause::Clean));
    }

    #[test]
    fn merge_halts_on_failure() {
        let failure = Failure::msg("boom");
        let mut w = merge::<u8>();
        w.feed(Event::LeftHalted(Cause::Error(failure.clone())))
            .unwrap();
        assert_eq!(w.next(), Directive::Halt(Cause::Error(failure)));
    }

    #[test]
    fn halt_both_stops_at_first_halt() {
        let mut w = merge_halt_both::<u8>();
        w.feed(Event::LeftHalted(Cause::Clean)).unwrap();
        assert_eq!(w.next(), Directive::Halt(Cause::Clean));
    }

    #[test]
    fn drain_discards_left() {
        let mut w = drain_left::<&str, u8>();
        w.feed(Event::Left("effect")).unwrap();
        assert_eq!(w.next(), Directive::Await(Request::Either));
        w.feed(Event::Right(2)).unwrap();
        assert_eq!(w.next(), Directive::Emit(2));
        w.feed(Event::LeftHalted(Cause::Clean)).unwrap();
        assert_eq!(w.next(), Directive::Await(Request::Right));
        w.feed(Event::RightHalted(Cause::Clean)).unwrap();
        assert_eq!(w.next(), Directive::Halt(Cause::Clean));
    }
}
