use super::{Directive, Event, Request, Wye};
use crate::{Cause, Failure};

/// Pairs left and right values in lockstep: one left, then one right.
///
/// Either side halting halts the combination with that side's cause.
///
/// This `struct` is created by the [`yip`][super::yip] function.
#[derive(Debug)]
pub struct Yip<L, R> {
    left: Option<L>,
    pending: Option<(L, R)>,
    halted: Option<Cause>,
}

impl<L, R> Yip<L, R> {
    pub(crate) fn new() -> Self {
        Self {
            left: None,
            pending: None,
            halted: None,
        }
    }
}

impl<L, R> Wye<L, R> for Yip<L, R> {
    type Output = (L, R);

    fn next(&mut self) -> Directive<(L, R)> {
        if let Some(pair) = self.pending.take() {
            return Directive::Emit(pair);
        }
        match (&self.halted, &self.left) {
            (Some(cause), _) => Directive::Halt(cause.clone()),
            (None, None) => Directive::Await(Request::Left),
            (None, Some(_)) => Directive::Await(Request::Right),
        }
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        match event {
            Event::Left(l) => self.left = Some(l),
            Event::Right(r) => match self.left.take() {
                Some(l) => self.pending = Some((l, r)),
                None => return Err(Failure::msg("yip: right value without a left value")),
            },
            Event::LeftHalted(cause) | Event::RightHalted(cause) => {
                self.halted.get_or_insert(cause);
            }
        }
        Ok(())
    }
}
