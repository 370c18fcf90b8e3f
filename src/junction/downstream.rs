use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::state::Core;
use super::{DownstreamId, Strategy};
use crate::process::{Process, Step};
use crate::utils::Mailbox;
use crate::Failure;

/// A consumer attached to a [`Junction`][super::Junction].
///
/// Each pull asks the strategy for one more value. Killing or dropping the
/// consumer detaches it and hands any values it hasn't pulled back to the
/// strategy.
pub struct Downstream<S: Strategy> {
    core: Mailbox<Core<S>>,
    id: DownstreamId,
    detached: bool,
}

impl<S: Strategy> Downstream<S> {
    pub(crate) fn new(core: Mailbox<Core<S>>, id: DownstreamId) -> Self {
        Self {
            core,
            id,
            detached: false,
        }
    }

    /// This consumer's id, as the strategy sees it.
    pub fn id(&self) -> DownstreamId {
        self.id
    }

    fn detach(&mut self) {
        if !self.detached {
            self.detached = true;
            let id = self.id;
            self.core
                .post(|core, wakeups| core.close_downstream(id, wakeups));
        }
    }
}

impl<S: Strategy> Unpin for Downstream<S> {}

impl<S: Strategy> Process for Downstream<S> {
    type Item = S::Out;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<S::Out>> {
        let id = self.id;
        self.core
            .post(|core, wakeups| core.poll_pull(id, cx.waker(), wakeups))
    }

    fn poll_kill(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        self.get_mut().detach();
        Poll::Ready(Ok(()))
    }
}

impl<S: Strategy> Drop for Downstream<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<S: Strategy> fmt::Debug for Downstream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downstream")
            .field("id", &self.id)
            .field("detached", &self.detached)
            .finish()
    }
}
