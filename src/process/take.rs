use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{Process, Step};
use crate::utils::swallow_cleanup;
use crate::{Cause, Failure};

/// A process that emits the first `n` values of another, then kills it.
///
/// This `struct` is created by the [`take`] method on [`ProcessExt`]. See its
/// documentation for more.
///
/// [`take`]: super::ProcessExt::take
/// [`ProcessExt`]: super::ProcessExt
#[pin_project]
#[derive(Debug)]
pub struct Take<P> {
    #[pin]
    inner: P,
    remaining: usize,
    killed: bool,
    halted: Option<Cause>,
}

impl<P> Take<P> {
    pub(crate) fn new(inner: P, n: usize) -> Self {
        Self {
            inner,
            remaining: n,
            killed: false,
            halted: None,
        }
    }
}

impl<P: Process> Process for Take<P> {
    type Item = P::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<P::Item>> {
        let this = self.project();
        if let Some(cause) = this.halted {
            return Poll::Ready(Step::Halt(cause.clone()));
        }

        if *this.remaining == 0 {
            // Enough values were delivered: stop the inner process without
            // pulling it again.
            if !*this.killed {
                let result = ready!(this.inner.poll_kill(cx));
                *this.killed = true;
                swallow_cleanup(result);
            }
            *this.halted = Some(Cause::Clean);
            return Poll::Ready(Step::Halt(Cause::Clean));
        }

        match ready!(this.inner.poll_next(cx)) {
            Step::Emit(item) => {
                *this.remaining -= 1;
                Poll::Ready(Step::Emit(item))
            }
            Step::Halt(cause) => {
                *this.halted = Some(cause.clone());
                Poll::Ready(Step::Halt(cause))
            }
        }
    }

    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        let this = self.project();
        if *this.killed {
            return Poll::Ready(Ok(()));
        }
        let result = ready!(this.inner.poll_kill(cx));
        *this.killed = true;
        this.halted.get_or_insert(Cause::Killed);
        Poll::Ready(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::process;
    use futures_lite::future::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn kills_after_limit() {
        block_on(async {
            let cleanups = Arc::new(AtomicUsize::new(0));
            let counter = cleanups.clone();
            let p = process::repeat(7).on_cleanup(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let (items, cause) = p.take(3).run_log().await;
            assert_eq!(items, [7, 7, 7]);
            assert!(cause.is_clean());
            assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        })
    }

    #[test]
    fn take_zero_never_pulls() {
        block_on(async {
            let (items, cause) = process::fail::<u8>(crate::Failure::msg("pulled"))
                .take(0)
                .run_log()
                .await;
            assert!(items.is_empty());
            assert!(cause.is_clean());
        })
    }

    #[test]
    fn shorter_inner() {
        block_on(async {
            let (items, cause) = process::iter(0..2).take(5).run_log().await;
            assert_eq!(items, [0, 1]);
            assert!(cause.is_clean());
        })
    }
}
