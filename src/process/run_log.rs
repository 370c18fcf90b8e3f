use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::{Process, Step};
use crate::utils::swallow_cleanup;
use crate::Cause;

/// Future for the [`run_log`][super::ProcessExt::run_log] method.
#[pin_project]
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct RunLog<P: Process> {
    #[pin]
    process: P,
    items: Vec<P::Item>,
    halted: Option<Cause>,
    done: bool,
}

impl<P: Process> RunLog<P> {
    pub(crate) fn new(process: P) -> Self {
        Self {
            process,
            items: Vec::new(),
            halted: None,
            done: false,
        }
    }
}

impl<P: Process> Future for RunLog<P> {
    type Output = (Vec<P::Item>, Cause);

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        assert!(!*this.done, "`RunLog` polled after completion");

        loop {
            if let Some(cause) = this.halted {
                swallow_cleanup(ready!(this.process.as_mut().poll_kill(cx)));
                *this.done = true;
                return Poll::Ready((mem::take(this.items), cause.clone()));
            }
            match ready!(this.process.as_mut().poll_next(cx)) {
                Step::Emit(item) => this.items.push(item),
                Step::Halt(cause) => *this.halted = Some(cause),
            }
        }
    }
}
