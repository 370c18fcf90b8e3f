use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{Process, Step};
use crate::{Cause, Failure};

/// A process that turns its inner process's failure into a value.
///
/// This `struct` is created by the [`attempt`] method on [`ProcessExt`]. See
/// its documentation for more.
///
/// [`attempt`]: super::ProcessExt::attempt
/// [`ProcessExt`]: super::ProcessExt
#[pin_project]
#[derive(Debug)]
pub struct Attempt<P> {
    #[pin]
    inner: P,
    halted: Option<Cause>,
}

impl<P> Attempt<P> {
    pub(crate) fn new(inner: P) -> Self {
        Self {
            inner,
            halted: None,
        }
    }
}

impl<P: Process> Process for Attempt<P> {
    type Item = Result<P::Item, Failure>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        let this = self.project();
        if let Some(cause) = this.halted {
            return Poll::Ready(Step::Halt(cause.clone()));
        }
        match ready!(this.inner.poll_next(cx)) {
            Step::Emit(item) => Poll::Ready(Step::Emit(Ok(item))),
            Step::Halt(Cause::Error(failure)) => {
                *this.halted = Some(Cause::Clean);
                Poll::Ready(Step::Emit(Err(failure)))
            }
            Step::Halt(cause) => {
                *this.halted = Some(cause.clone());
                Poll::Ready(Step::Halt(cause))
            }
        }
    }

    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        self.project().inner.poll_kill(cx)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::{process, Failure};
    use futures_lite::future::block_on;

    #[test]
    fn failure_becomes_last_value() {
        block_on(async {
            let failure = Failure::msg("boom");
            let (items, cause) = process::fail::<u8>(failure.clone())
                .attempt()
                .run_log()
                .await;
            assert!(cause.is_clean());
            assert_eq!(items, [Err(failure)]);
        })
    }

    #[test]
    fn clean_values_pass_through() {
        block_on(async {
            let (items, cause) = process::iter(0..2).attempt().run_log().await;
            assert!(cause.is_clean());
            assert_eq!(items, [Ok(0), Ok(1)]);
        })
    }
}
