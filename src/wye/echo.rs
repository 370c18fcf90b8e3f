use core::fmt;
use core::marker::PhantomData;

use super::{Directive, Event, Request, Wye};
use crate::{Cause, Failure};

/// Emits every left value, and repeats the most recent one each time the
/// right side emits.
///
/// Until the first left value arrives only the left side is awaited. Either
/// side halting halts the combination with that side's cause.
///
/// This `struct` is created by the [`echo_left`][super::echo_left] function.
pub struct EchoLeft<T, R = ()> {
    last: Option<T>,
    pending: Option<T>,
    halted: Option<Cause>,
    _marker: PhantomData<fn(R)>,
}

impl<T, R> EchoLeft<T, R> {
    pub(crate) fn new() -> Self {
        Self {
            last: None,
            pending: None,
            halted: None,
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug, R> fmt::Debug for EchoLeft<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EchoLeft")
            .field("last", &self.last)
            .field("halted", &self.halted)
            .finish()
    }
}

impl<T: Clone, R> Wye<T, R> for EchoLeft<T, R> {
    type Output = T;

    fn next(&mut self) -> Directive<T> {
        if let Some(item) = self.pending.take() {
            return Directive::Emit(item);
        }
        match (&self.halted, &self.last) {
            (Some(cause), _) => Directive::Halt(cause.clone()),
            (None, None) => Directive::Await(Request::Left),
            (None, Some(_)) => Directive::Await(Request::Either),
        }
    }

    fn feed(&mut self, event: Event<T, R>) -> Result<(), Failure> {
        match event {
            Event::Left(item) => {
                self.last = Some(item.clone());
                self.pending = Some(item);
            }
            Event::Right(_) => self.pending = self.last.clone(),
            Event::LeftHalted(cause) | Event::RightHalted(cause) => {
                self.halted.get_or_insert(cause);
            }
        }
        Ok(())
    }
}
