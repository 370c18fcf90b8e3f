use core::fmt;
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::error::Error as StdError;

use futures_core::Stream;
use pin_project::pin_project;

use super::{Process, Step};
use crate::{Cause, Failure};

/// A process that emits the items of an iterator.
///
/// This `struct` is created by the [`iter`] function. See its documentation
/// for more.
#[derive(Debug, Clone)]
pub struct Iter<I> {
    iter: Option<I>,
}

/// Emit every item of an iterator, then halt cleanly.
pub fn iter<I: IntoIterator>(iter: I) -> Iter<I::IntoIter> {
    Iter {
        iter: Some(iter.into_iter()),
    }
}

/// Emit a single value, then halt cleanly.
pub fn emit<T>(value: T) -> Iter<core::option::IntoIter<T>> {
    iter(Some(value))
}

impl<I: Iterator> Process for Iter<I> {
    type Item = I::Item;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        match self.iter.as_mut().and_then(Iterator::next) {
            Some(item) => Poll::Ready(Step::Emit(item)),
            None => {
                self.iter = None;
                Poll::Ready(Step::Halt(Cause::Clean))
            }
        }
    }
}

impl<I> Unpin for Iter<I> {}

/// A process that halts immediately.
///
/// This `struct` is created by the [`empty`] function.
pub struct Empty<T> {
    _marker: PhantomData<fn() -> T>,
}

/// A process which emits nothing and halts cleanly.
pub fn empty<T>() -> Empty<T> {
    Empty {
        _marker: PhantomData,
    }
}

impl<T> fmt::Debug for Empty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Empty").finish()
    }
}

impl<T> Process for Empty<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Step<T>> {
        Poll::Ready(Step::Halt(Cause::Clean))
    }
}

/// A process that fails immediately.
///
/// This `struct` is created by the [`fail`] function.
pub struct Fail<T> {
    failure: Failure,
    _marker: PhantomData<fn() -> T>,
}

/// A process which emits nothing and halts with `failure`.
pub fn fail<T>(failure: Failure) -> Fail<T> {
    Fail {
        failure,
        _marker: PhantomData,
    }
}

impl<T> fmt::Debug for Fail<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fail").field(&self.failure).finish()
    }
}

impl<T> Process for Fail<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Step<T>> {
        Poll::Ready(Step::Halt(Cause::Error(self.failure.clone())))
    }
}

/// A process that emits the same value forever.
///
/// This `struct` is created by the [`repeat`] function.
#[derive(Debug, Clone)]
pub struct Repeat<T> {
    value: T,
}

/// Emit clones of `value` forever.
pub fn repeat<T: Clone>(value: T) -> Repeat<T> {
    Repeat { value }
}

impl<T> Unpin for Repeat<T> {}

impl<T: Clone> Process for Repeat<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Step<T>> {
        Poll::Ready(Step::Emit(self.value.clone()))
    }
}

/// A process over the items of a `Stream`.
///
/// This `struct` is created by the [`from_stream`] function.
#[pin_project]
#[derive(Debug)]
pub struct FromStream<S> {
    #[pin]
    stream: S,
    done: bool,
}

/// Adapt a `Stream`; the process halts cleanly when the stream ends.
pub fn from_stream<S: Stream>(stream: S) -> FromStream<S> {
    FromStream {
        stream,
        done: false,
    }
}

impl<S: Stream> Process for FromStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(Step::Halt(Cause::Clean));
        }
        match this.stream.poll_next(cx) {
            Poll::Ready(Some(item)) => Poll::Ready(Step::Emit(item)),
            Poll::Ready(None) => {
                *this.done = true;
                Poll::Ready(Step::Halt(Cause::Clean))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A process over a `Stream` of `Result`s.
///
/// This `struct` is created by the [`from_try_stream`] function.
#[pin_project]
#[derive(Debug)]
pub struct FromTryStream<S> {
    #[pin]
    stream: S,
    halted: Option<Cause>,
}

/// Adapt a `Stream` of `Result`s; the first `Err` halts the process with that
/// error.
pub fn from_try_stream<S, T, E>(stream: S) -> FromTryStream<S>
where
    S: Stream<Item = Result<T, E>>,
    E: StdError + Send + Sync + 'static,
{
    FromTryStream {
        stream,
        halted: None,
    }
}

impl<S, T, E> Process for FromTryStream<S>
where
    S: Stream<Item = Result<T, E>>,
    E: StdError + Send + Sync + 'static,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<T>> {
        let this = self.project();
        if let Some(cause) = this.halted {
            return Poll::Ready(Step::Halt(cause.clone()));
        }
        let cause = match this.stream.poll_next(cx) {
            Poll::Ready(Some(Ok(item))) => return Poll::Ready(Step::Emit(item)),
            Poll::Ready(Some(Err(error))) => Cause::Error(Failure::new(error)),
            Poll::Ready(None) => Cause::Clean,
            Poll::Pending => return Poll::Pending,
        };
        *this.halted = Some(cause.clone());
        Poll::Ready(Step::Halt(cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use futures_lite::future::block_on;
    use futures_lite::stream;

    #[test]
    fn iter_halts_repeatedly() {
        block_on(async {
            let mut p = iter(0..1);
            assert_eq!(p.next().await, Step::Emit(0));
            assert_eq!(p.next().await, Step::Halt(Cause::Clean));
            assert_eq!(p.next().await, Step::Halt(Cause::Clean));
        })
    }

    #[test]
    fn fail_is_idempotent() {
        block_on(async {
            let failure = Failure::msg("boom");
            let mut p = fail::<u8>(failure.clone());
            assert_eq!(p.next().await, Step::Halt(Cause::Error(failure.clone())));
            assert_eq!(p.next().await, Step::Halt(Cause::Error(failure)));
        })
    }

    #[test]
    fn try_stream_stops_at_first_error() {
        block_on(async {
            let items = vec![Ok(1), Err(std::fmt::Error), Ok(2)];
            let (items, cause) = from_try_stream(stream::iter(items)).run_log().await;
            assert_eq!(items, [1]);
            assert!(cause.failure().is_some());
        })
    }

    #[test]
    fn stream_adapter() {
        block_on(async {
            let (items, cause) = from_stream(stream::iter(0..4)).run_log().await;
            assert_eq!(items, [0, 1, 2, 3]);
            assert!(cause.is_clean());
        })
    }
}
