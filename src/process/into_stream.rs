use core::pin::Pin;
use core::task::{ready, Context, Poll};

use futures_core::Stream;
use pin_project::pin_project;

use super::{Process, Step};
use crate::utils::swallow_cleanup;
use crate::{Cause, Failure};

/// A `Stream` over the values of a process.
///
/// This `struct` is created by the [`into_stream`] method on [`ProcessExt`].
/// See its documentation for more.
///
/// [`into_stream`]: super::ProcessExt::into_stream
/// [`ProcessExt`]: super::ProcessExt
#[pin_project]
#[derive(Debug)]
pub struct IntoStream<P> {
    #[pin]
    process: P,
    state: State,
}

#[derive(Debug)]
enum State {
    Running,
    Killing(Cause),
    Done,
}

impl<P> IntoStream<P> {
    pub(crate) fn new(process: P) -> Self {
        Self {
            process,
            state: State::Running,
        }
    }
}

impl<P: Process> Stream for IntoStream<P> {
    type Item = Result<P::Item, Failure>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match this.state {
                State::Done => return Poll::Ready(None),
                State::Killing(cause) => {
                    swallow_cleanup(ready!(this.process.as_mut().poll_kill(cx)));
                    let failure = cause.failure().cloned();
                    *this.state = State::Done;
                    return Poll::Ready(failure.map(Err));
                }
                State::Running => match ready!(this.process.as_mut().poll_next(cx)) {
                    Step::Emit(item) => return Poll::Ready(Some(Ok(item))),
                    Step::Halt(cause) => *this.state = State::Killing(cause),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::{process, Failure};
    use futures_lite::future::block_on;
    use futures_lite::StreamExt;

    #[test]
    fn failure_is_last_item() {
        block_on(async {
            let failure = Failure::msg("boom");
            let items: Vec<_> = process::fail::<u8>(failure.clone())
                .into_stream()
                .collect()
                .await;
            assert_eq!(items, [Err(failure)]);
        })
    }

    #[test]
    fn clean_end() {
        block_on(async {
            let items: Vec<_> = process::iter(0..3).into_stream().collect().await;
            assert_eq!(items, [Ok(0), Ok(1), Ok(2)]);
        })
    }
}
