use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::{Process, Step};
use crate::Failure;

/// Future for the [`next`][super::ProcessExt::next] method.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Next<'a, P: ?Sized> {
    process: &'a mut P,
}

impl<'a, P: ?Sized> Next<'a, P> {
    pub(crate) fn new(process: &'a mut P) -> Self {
        Self { process }
    }
}

impl<P: Process + Unpin + ?Sized> Future for Next<'_, P> {
    type Output = Step<P::Item>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut *self.process).poll_next(cx)
    }
}

/// Future for the [`kill`][super::ProcessExt::kill] method.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Kill<'a, P: ?Sized> {
    process: &'a mut P,
}

impl<'a, P: ?Sized> Kill<'a, P> {
    pub(crate) fn new(process: &'a mut P) -> Self {
        Self { process }
    }
}

impl<P: Process + Unpin + ?Sized> Future for Kill<'_, P> {
    type Output = Result<(), Failure>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut *self.process).poll_kill(cx)
    }
}
