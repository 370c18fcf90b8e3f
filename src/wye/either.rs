use super::{Directive, Event, Halting, Side, Sides, Wye};
use crate::Failure;

/// A value tagged with the side it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// A value from the left side.
    Left(L),
    /// A value from the right side.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns the left value, if this is one.
    pub fn left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// Returns the right value, if this is one.
    pub fn right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }
}

/// Interleave two processes, tagging each value with its origin.
///
/// Halts once both sides have halted. If a side fails or is killed, the
/// other side is still drained, and the first such cause becomes the
/// combination's cause.
///
/// This `struct` is created by the [`either`][super::either] function.
#[derive(Debug)]
pub struct EitherWye<L, R> {
    pending: Option<Either<L, R>>,
    sides: Sides,
}

impl<L, R> EitherWye<L, R> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            sides: Sides::new(Halting::Exhausted),
        }
    }
}

impl<L, R> Wye<L, R> for EitherWye<L, R> {
    type Output = Either<L, R>;

    fn next(&mut self) -> Directive<Self::Output> {
        match self.pending.take() {
            Some(item) => Directive::Emit(item),
            None => self.sides.directive(),
        }
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        match event {
            Event::Left(l) => self.pending = Some(Either::Left(l)),
            Event::Right(r) => self.pending = Some(Either::Right(r)),
            Event::LeftHalted(cause) => self.sides.on_halt(Side::Left, cause),
            Event::RightHalted(cause) => self.sides.on_halt(Side::Right, cause),
        }
        Ok(())
    }
}
