use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};

use pin_project::pin_project;

use super::{Process, Step};
use crate::Failure;

/// Transforms each value of a process.
///
/// This `struct` is created by the [`map`] method on [`ProcessExt`]. See its
/// documentation for more.
///
/// [`map`]: super::ProcessExt::map
/// [`ProcessExt`]: super::ProcessExt
#[pin_project]
pub struct Map<P, F> {
    #[pin]
    inner: P,
    f: F,
}

impl<P, F> Map<P, F> {
    pub(crate) fn new(inner: P, f: F) -> Self {
        Self { inner, f }
    }
}

impl<P: fmt::Debug, F> fmt::Debug for Map<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("inner", &self.inner).finish()
    }
}

impl<P, F, B> Process for Map<P, F>
where
    P: Process,
    F: FnMut(P::Item) -> B,
{
    type Item = B;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<B>> {
        let this = self.project();
        this.inner.poll_next(cx).map(|step| step.map(this.f))
    }

    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        self.project().inner.poll_kill(cx)
    }
}
