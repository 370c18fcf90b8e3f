use super::{Directive, Event, Request, Wye};
use crate::{Cause, Failure};

/// Forward the right side until the left side emits `true`.
///
/// A `true` on the left halts the combination cleanly. If the left side halts
/// for any reason before that, the right side keeps running uninterrupted.
///
/// This `struct` is created by the [`interrupt`][super::interrupt] function.
#[derive(Debug)]
pub struct Interrupt<T> {
    pending: Option<T>,
    signal_live: bool,
    halted: Option<Cause>,
}

impl<T> Interrupt<T> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            signal_live: true,
            halted: None,
        }
    }
}

impl<T> Wye<bool, T> for Interrupt<T> {
    type Output = T;

    fn next(&mut self) -> Directive<T> {
        if let Some(item) = self.pending.take() {
            return Directive::Emit(item);
        }
        match &self.halted {
            Some(cause) => Directive::Halt(cause.clone()),
            None if self.signal_live => Directive::Await(Request::Either),
            None => Directive::Await(Request::Right),
        }
    }

    fn feed(&mut self, event: Event<bool, T>) -> Result<(), Failure> {
        match event {
            Event::Left(true) => {
                tracing::trace!("interrupted");
                self.halted.get_or_insert(Cause::Clean);
            }
            Event::Left(false) => {}
            Event::LeftHalted(_) => self.signal_live = false,
            Event::Right(item) => self.pending = Some(item),
            Event::RightHalted(cause) => {
                self.halted.get_or_insert(cause);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::interrupt;
    use super::*;

    #[test]
    fn true_interrupts() {
        let mut w = interrupt();
        w.feed(Event::Right(1)).unwrap();
        assert_eq!(w.next(), Directive::Emit(1));
        w.feed(Event::Left(false)).unwrap();
        assert_eq!(w.next(), Directive::Await(Request::Either));
        w.feed(Event::Left(true)).unwrap();
        assert_eq!(w.next(), Directive::Halt(Cause::Clean));
    }

    #[test]
    fn failed_signal_does_not_interrupt() {
        let mut w = interrupt::<u8>();
        w.feed(Event::LeftHalted(Cause::Error(Failure::msg("boom"))))
            .unwrap();
        assert_eq!(w.next(), Directive::Await(Request::Right));
        w.feed(Event::Right(7)).unwrap();
        assert_eq!(w.next(), Directive::Emit(7));
        w.feed(Event::RightHalted(Cause::Clean)).unwrap();
        assert_eq!(w.next(), Directive::Halt(Cause::Clean));
    }
}
