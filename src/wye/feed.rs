use std::collections::VecDeque;

use super::{Directive, Event, Wye};
use crate::{Cause, Failure};

/// Replays buffered left values into an inner wye before live left input.
///
/// This `struct` is created by the [`feed_left`][super::feed_left] function.
#[derive(Debug)]
pub struct FeedLeft<W, L> {
    buffer: VecDeque<L>,
    wye: W,
    failed: Option<Cause>,
}

impl<W, L> FeedLeft<W, L> {
    pub(crate) fn new(buffer: VecDeque<L>, wye: W) -> Self {
        Self {
            buffer,
            wye,
            failed: None,
        }
    }
}

impl<L, R, W> Wye<L, R> for FeedLeft<W, L>
where
    W: Wye<L, R>,
{
    type Output = W::Output;

    fn next(&mut self) -> Directive<W::Output> {
        loop {
            if let Some(cause) = &self.failed {
                return Directive::Halt(cause.clone());
            }
            match self.wye.next() {
                Directive::Await(request) if request.includes_left() => {
                    let Some(item) = self.buffer.pop_front() else {
                        return Directive::Await(request);
                    };
                    if let Err(failure) = self.wye.feed(Event::Left(item)) {
                        self.failed = Some(Cause::Error(failure));
                    }
                }
                directive => return directive,
            }
        }
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        self.wye.feed(event)
    }
}

/// Replays buffered right values into an inner wye before live right input.
///
/// This `struct` is created by the [`feed_right`][super::feed_right] function.
#[derive(Debug)]
pub struct FeedRight<W, R> {
    buffer: VecDeque<R>,
    wye: W,
    failed: Option<Cause>,
}

impl<W, R> FeedRight<W, R> {
    pub(crate) fn new(buffer: VecDeque<R>, wye: W) -> Self {
        Self {
            buffer,
            wye,
            failed: None,
        }
    }
}

impl<L, R, W> Wye<L, R> for FeedRight<W, R>
where
    W: Wye<L, R>,
{
    type Output = W::Output;

    fn next(&mut self) -> Directive<W::Output> {
        loop {
            if let Some(cause) = &self.failed {
                return Directive::Halt(cause.clone());
            }
            match self.wye.next() {
                Directive::Await(request) if request.includes_right() => {
                    let Some(item) = self.buffer.pop_front() else {
                        return Directive::Await(request);
                    };
                    if let Err(failure) = self.wye.feed(Event::Right(item)) {
                        self.failed = Some(Cause::Error(failure));
                    }
                }
                directive => return directive,
            }
        }
    }

    fn feed(&mut self, event: Event<L, R>) -> Result<(), Failure> {
        self.wye.feed(event)
    }
}
