use core::fmt;
use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use super::state::Core;
use super::{Strategy, UpstreamId};
use crate::process::{Process, Step};
use crate::utils::{swallow_cleanup, Mailbox};
use crate::Cause;

/// A producer attached to a [`Junction`][super::Junction].
///
/// Dropping the handle detaches the producer. If an offer is still pending at
/// that point, the strategy is told the producer was killed.
pub struct Upstream<S: Strategy> {
    core: Mailbox<Core<S>>,
    id: UpstreamId,
    /// How the producer finished, reported when it detaches.
    cause: Option<Cause>,
}

impl<S: Strategy> Upstream<S> {
    pub(crate) fn new(core: Mailbox<Core<S>>, id: UpstreamId) -> Self {
        Self {
            core,
            id,
            cause: None,
        }
    }

    /// This producer's id, as the strategy sees it.
    pub fn id(&self) -> UpstreamId {
        self.id
    }

    /// Offer one value.
    ///
    /// Completes once the strategy accepted the value, or fails with the
    /// cause the junction is closing with.
    pub fn offer(&mut self, value: S::In) -> Offer<'_, S> {
        Offer {
            upstream: self,
            value: Some(value),
            done: false,
        }
    }

    /// Offer every value of `process`, one at a time.
    ///
    /// The process is killed once it halts, or as soon as the junction stops
    /// accepting values. Resolves to `Ok` if the process halted cleanly and
    /// all of its values were accepted.
    pub fn pipe<P>(self, process: P) -> Pipe<S, P>
    where
        P: Process<Item = S::In>,
    {
        Pipe {
            upstream: self,
            process,
            state: PipeState::Pulling,
        }
    }

    fn poll_offer(&self, value: Option<S::In>, cx: &mut Context<'_>) -> Poll<Result<(), Cause>> {
        self.core
            .post(|core, wakeups| core.poll_offer(self.id, value, cx.waker(), wakeups))
    }

    fn withdraw(&self) {
        let id = self.id;
        self.core
            .post(|core, wakeups| core.withdraw_offer(id, wakeups));
    }

    fn poll_rejected(&self, cx: &mut Context<'_>) -> Poll<Cause> {
        self.core
            .post(|core, _| core.poll_rejected(self.id, cx.waker()))
    }
}

impl<S: Strategy> Drop for Upstream<S> {
    fn drop(&mut self) {
        let id = self.id;
        let cause = self.cause.take();
        self.core
            .post(|core, wakeups| core.close_upstream(id, cause, wakeups));
    }
}

impl<S: Strategy> fmt::Debug for Upstream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upstream").field("id", &self.id).finish()
    }
}

/// Future for the [`offer`][Upstream::offer] method.
///
/// Dropping it before it completes withdraws the value, unless the strategy
/// accepted it already.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Offer<'a, S: Strategy> {
    upstream: &'a mut Upstream<S>,
    value: Option<S::In>,
    done: bool,
}

impl<S: Strategy> Unpin for Offer<'_, S> {}

impl<S: Strategy> Future for Offer<'_, S> {
    type Output = Result<(), Cause>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let value = self.value.take();
        let poll = self.upstream.poll_offer(value, cx);
        self.done = poll.is_ready();
        poll
    }
}

impl<S: Strategy> Drop for Offer<'_, S> {
    fn drop(&mut self) {
        // A value still held here was never sent.
        if self.value.is_none() && !self.done {
            self.upstream.withdraw();
        }
    }
}

impl<S: Strategy> fmt::Debug for Offer<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Offer")
            .field("upstream", &self.upstream)
            .field("sent", &self.value.is_none())
            .finish()
    }
}

/// Future for the [`pipe`][Upstream::pipe] method.
#[pin_project]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Pipe<S: Strategy, P> {
    upstream: Upstream<S>,
    #[pin]
    process: P,
    state: PipeState<S::In>,
}

enum PipeState<T> {
    Pulling,
    Offering(Option<T>),
    Killing(Result<(), Cause>),
    Done,
}

impl<S, P> Future for Pipe<S, P>
where
    S: Strategy,
    P: Process<Item = S::In>,
{
    type Output = Result<(), Cause>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            match this.state {
                PipeState::Pulling => {
                    if let Poll::Ready(cause) = this.upstream.poll_rejected(cx) {
                        *this.state = PipeState::Killing(Err(cause));
                        continue;
                    }
                    *this.state = match ready!(this.process.as_mut().poll_next(cx)) {
                        Step::Emit(value) => PipeState::Offering(Some(value)),
                        Step::Halt(Cause::Clean) => PipeState::Killing(Ok(())),
                        Step::Halt(cause) => PipeState::Killing(Err(cause)),
                    };
                }
                PipeState::Offering(value) => {
                    let value = value.take();
                    *this.state = match ready!(this.upstream.poll_offer(value, cx)) {
                        Ok(()) => PipeState::Pulling,
                        Err(cause) => PipeState::Killing(Err(cause)),
                    };
                }
                PipeState::Killing(_) => {
                    swallow_cleanup(ready!(this.process.as_mut().poll_kill(cx)));
                    if let PipeState::Killing(result) = mem::replace(this.state, PipeState::Done)
                    {
                        if let Err(cause) = &result {
                            this.upstream.cause = Some(cause.clone());
                        }
                        return Poll::Ready(result);
                    }
                }
                PipeState::Done => panic!("Futures must not be polled after completing"),
            }
        }
    }
}

impl<S, P> fmt::Debug for Pipe<S, P>
where
    S: Strategy,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("upstream", &self.upstream)
            .field("process", &self.process)
            .finish()
    }
}
