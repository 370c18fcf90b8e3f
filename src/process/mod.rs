//! Lazily pulled sequences with an explicit termination cause.
//!
//! A [`Process`] is pulled one [`Step`] at a time: either it emits a value, or
//! it halts with a [`Cause`]. Unlike a plain stream, a process also owns an
//! asynchronous cleanup action which its consumer runs exactly once through
//! [`Process::poll_kill`], whether the process finished on its own or is being
//! cancelled.
//!
//! # Examples
//!
//! ```
//! use futures_wye::prelude::*;
//! use futures_wye::process;
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     let (items, cause) = process::iter(0..3).map(|n| n * 2).run_log().await;
//!     assert_eq!(items, [0, 2, 4]);
//!     assert!(cause.is_clean());
//! })
//! ```

mod attempt;
mod into_stream;
mod map;
mod next;
mod on_cleanup;
mod run_log;
mod source;
mod take;

use core::future::Future;
use core::ops::DerefMut;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::engine::Combine;
use crate::wye::{self, EitherWye, Interrupt, Merge, Wye, Yip};
use crate::{Cause, Failure};

pub use attempt::Attempt;
pub use into_stream::IntoStream;
pub use map::Map;
pub use next::{Kill, Next};
pub use on_cleanup::OnCleanup;
pub use run_log::RunLog;
pub use source::{
    empty, emit, fail, from_stream, from_try_stream, iter, repeat, Empty, Fail, FromStream,
    FromTryStream, Iter, Repeat,
};
pub use take::Take;

/// One pull's worth of a [`Process`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// The process produced a value and can be pulled again.
    Emit(T),
    /// The process terminated.
    Halt(Cause),
}

impl<T> Step<T> {
    /// Transform the emitted value, if any.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Emit(item) => Step::Emit(f(item)),
            Step::Halt(cause) => Step::Halt(cause),
        }
    }

    /// Returns `true` if this is a [`Step::Halt`].
    #[must_use]
    pub fn is_halt(&self) -> bool {
        matches!(self, Step::Halt(_))
    }
}

/// A lazily pulled, possibly infinite sequence which terminates with a
/// [`Cause`] and owns a cleanup action.
pub trait Process {
    /// The values this process emits.
    type Item;

    /// Pull the next step.
    ///
    /// Once a process has returned [`Step::Halt`], it keeps returning the same
    /// cause on every subsequent call.
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>>;

    /// Run the process's cleanup.
    ///
    /// The consumer calls this to completion exactly once, either after the
    /// process halted or to cancel it. Afterwards the process is not pulled
    /// again. A cleanup failure is reported here; it never replaces the cause
    /// the process halted with.
    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        let _ = cx;
        Poll::Ready(Ok(()))
    }
}

impl<P> Process for &mut P
where
    P: Process + Unpin + ?Sized,
{
    type Item = P::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        P::poll_next(Pin::new(&mut **self), cx)
    }

    fn poll_kill(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        P::poll_kill(Pin::new(&mut **self), cx)
    }
}

impl<P> Process for Box<P>
where
    P: Process + Unpin + ?Sized,
{
    type Item = P::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        Pin::new(&mut **self).poll_next(cx)
    }

    fn poll_kill(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        Pin::new(&mut **self).poll_kill(cx)
    }
}

impl<P> Process for Pin<P>
where
    P: DerefMut + Unpin,
    P::Target: Process,
{
    type Item = <P::Target as Process>::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        self.get_mut().as_mut().poll_next(cx)
    }

    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        self.get_mut().as_mut().poll_kill(cx)
    }
}

/// An owned, dynamically typed [`Process`].
pub type BoxProcess<'a, T> = Pin<Box<dyn Process<Item = T> + Send + 'a>>;

/// Extend [`Process`] with driving, adapting and combining methods.
pub trait ProcessExt: Process {
    /// Pull the next step.
    fn next(&mut self) -> Next<'_, Self>
    where
        Self: Unpin,
    {
        Next::new(self)
    }

    /// Run the process's cleanup. See [`Process::poll_kill`].
    fn kill(&mut self) -> Kill<'_, Self>
    where
        Self: Unpin,
    {
        Kill::new(self)
    }

    /// Transform each emitted value.
    fn map<F, B>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> B,
    {
        Map::new(self, f)
    }

    /// Emit at most `n` values, then kill this process and halt cleanly.
    fn take(self, n: usize) -> Take<Self>
    where
        Self: Sized,
    {
        Take::new(self, n)
    }

    /// Surface a failure as a final `Err` value followed by a clean halt.
    fn attempt(self) -> Attempt<Self>
    where
        Self: Sized,
    {
        Attempt::new(self)
    }

    /// Run `cleanup` once when this process halts or is killed.
    fn on_cleanup<Fut>(self, cleanup: Fut) -> OnCleanup<Self, Fut>
    where
        Self: Sized,
        Fut: Future<Output = Result<(), Failure>>,
    {
        OnCleanup::new(self, cleanup)
    }

    /// Erase the type of this process.
    fn boxed<'a>(self) -> BoxProcess<'a, Self::Item>
    where
        Self: Sized + Send + 'a,
    {
        Box::pin(self)
    }

    /// Drive the process to completion, collecting every value along with the
    /// cause it halted with. The process is killed before this resolves.
    fn run_log(self) -> RunLog<Self>
    where
        Self: Sized,
    {
        RunLog::new(self)
    }

    /// Convert into a `Stream` of `Result`s which ends after the process halts
    /// and has been killed.
    fn into_stream(self) -> IntoStream<Self>
    where
        Self: Sized,
    {
        IntoStream::new(self)
    }

    /// Combine with `other`, letting `wye` decide how.
    fn wye<P, W>(self, other: P, wye: W) -> Combine<Self, P, W>
    where
        Self: Sized,
        P: Process,
        W: Wye<Self::Item, P::Item>,
    {
        Combine::new(self, other, wye)
    }

    /// Interleave the values of both processes as they become ready.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures_wye::prelude::*;
    /// use futures_wye::process;
    /// use futures_lite::future::block_on;
    ///
    /// block_on(async {
    ///     let (mut items, cause) = process::iter(0..3)
    ///         .merge(process::iter(3..6))
    ///         .run_log()
    ///         .await;
    ///     items.sort_unstable();
    ///     assert_eq!(items, [0, 1, 2, 3, 4, 5]);
    ///     assert!(cause.is_clean());
    /// })
    /// ```
    fn merge<P>(self, other: P) -> Combine<Self, P, Merge<Self::Item>>
    where
        Self: Sized,
        P: Process<Item = Self::Item>,
    {
        Combine::new(self, other, wye::merge())
    }

    /// Interleave both processes, tagging each value with its origin.
    fn either<P>(self, other: P) -> Combine<Self, P, EitherWye<Self::Item, P::Item>>
    where
        Self: Sized,
        P: Process,
    {
        Combine::new(self, other, wye::either())
    }

    /// Forward this process until `signal` emits `true`.
    fn interrupt_when<P>(self, signal: P) -> Combine<P, Self, Interrupt<Self::Item>>
    where
        Self: Sized,
        P: Process<Item = bool>,
    {
        Combine::new(signal, self, wye::interrupt())
    }

    /// Pair up the values of both processes.
    fn yip<P>(self, other: P) -> Combine<Self, P, Yip<Self::Item, P::Item>>
    where
        Self: Sized,
        P: Process,
    {
        Combine::new(self, other, wye::yip())
    }
}

impl<P> ProcessExt for P where P: Process + ?Sized {}
