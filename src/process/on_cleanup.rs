use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{Process, Step};
use crate::utils::swallow_cleanup;
use crate::{Cause, Failure};

/// A process with an attached cleanup action.
///
/// The cleanup runs exactly once: right after the inner process halts, or when
/// the process is killed before that.
///
/// This `struct` is created by the [`on_cleanup`] method on [`ProcessExt`].
/// See its documentation for more.
///
/// [`on_cleanup`]: super::ProcessExt::on_cleanup
/// [`ProcessExt`]: super::ProcessExt
#[pin_project]
#[derive(Debug)]
pub struct OnCleanup<P, Fut> {
    #[pin]
    inner: P,
    #[pin]
    cleanup: Option<Fut>,
    halted: Option<Cause>,
    inner_killed: Option<Result<(), Failure>>,
}

impl<P, Fut> OnCleanup<P, Fut> {
    pub(crate) fn new(inner: P, cleanup: Fut) -> Self {
        Self {
            inner,
            cleanup: Some(cleanup),
            halted: None,
            inner_killed: None,
        }
    }
}

fn poll_cleanup<Fut>(
    mut cleanup: Pin<&mut Option<Fut>>,
    cx: &mut Context<'_>,
) -> Poll<Result<(), Failure>>
where
    Fut: Future<Output = Result<(), Failure>>,
{
    match cleanup.as_mut().as_pin_mut() {
        Some(fut) => {
            let result = ready!(fut.poll(cx));
            cleanup.set(None);
            Poll::Ready(result)
        }
        None => Poll::Ready(Ok(())),
    }
}

impl<P, Fut> Process for OnCleanup<P, Fut>
where
    P: Process,
    Fut: Future<Output = Result<(), Failure>>,
{
    type Item = P::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<P::Item>> {
        let mut this = self.project();
        loop {
            if let Some(cause) = this.halted {
                swallow_cleanup(ready!(poll_cleanup(this.cleanup.as_mut(), cx)));
                return Poll::Ready(Step::Halt(cause.clone()));
            }
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Step::Emit(item) => return Poll::Ready(Step::Emit(item)),
                Step::Halt(cause) => *this.halted = Some(cause),
            }
        }
    }

    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        let mut this = self.project();
        if this.inner_killed.is_none() {
            *this.inner_killed = Some(ready!(this.inner.as_mut().poll_kill(cx)));
        }
        let cleanup = ready!(poll_cleanup(this.cleanup.as_mut(), cx));
        this.halted.get_or_insert(Cause::Killed);
        let inner = this.inner_killed.replace(Ok(())).unwrap_or(Ok(()));
        Poll::Ready(inner.and(cleanup))
    }
}
