use core::fmt;
use core::mem;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use pin_project::pin_project;

use crate::process::{Process, Step};
use crate::utils::{self, Rotation, WakerSet};
use crate::wye::{Directive, Event, Wye};
use crate::{Cause, Failure};

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// A process combining two processes under the control of a [`Wye`].
///
/// This `struct` is created by the [`wye`] method on [`ProcessExt`], and by
/// the shorthands next to it. See its documentation for more.
///
/// [`wye`]: crate::process::ProcessExt::wye
/// [`ProcessExt`]: crate::process::ProcessExt
#[pin_project]
pub struct Combine<L, R, W>
where
    L: Process,
    R: Process,
    W: Wye<L::Item, R::Item>,
{
    #[pin]
    left: L,
    #[pin]
    right: R,
    wye: W,
    wakers: WakerSet,
    rotation: Rotation,
    halted: [bool; 2],
    killed: [bool; 2],
    state: State,
}

#[derive(Debug)]
enum State {
    Running,
    /// The terminal cause is latched; waiting for both sides' cleanup.
    Cleanup(Cause),
    Done(Cause),
}

impl<L, R, W> Combine<L, R, W>
where
    L: Process,
    R: Process,
    W: Wye<L::Item, R::Item>,
{
    pub(crate) fn new(left: L, right: R, wye: W) -> Self {
        Self {
            left,
            right,
            wye,
            wakers: WakerSet::new(2),
            rotation: Rotation::new(2),
            halted: [false; 2],
            killed: [false; 2],
            state: State::Running,
        }
    }
}

impl<L, R, W> fmt::Debug for Combine<L, R, W>
where
    L: Process + fmt::Debug,
    R: Process + fmt::Debug,
    W: Wye<L::Item, R::Item> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combine")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("wye", &self.wye)
            .field("state", &self.state)
            .finish()
    }
}

/// Latch the terminal cause unless one is already latched.
fn latch(state: &mut State, cause: Cause) {
    if let State::Running = state {
        tracing::debug!(%cause, "combination halting");
        *state = State::Cleanup(cause);
    }
}

/// Move from cleanup to done once both sides have been killed.
fn finish(state: &mut State) {
    if let State::Cleanup(cause) = mem::replace(state, State::Running) {
        *state = State::Done(cause);
    }
}

impl<L, R, W> Process for Combine<L, R, W>
where
    L: Process,
    R: Process,
    W: Wye<L::Item, R::Item>,
{
    type Item = W::Output;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        let mut this = self.project();
        this.wakers.readiness().set_waker(cx.waker());

        loop {
            match this.state {
                State::Done(cause) => return Poll::Ready(Step::Halt(cause.clone())),
                State::Cleanup(_) => {
                    ready!(poll_cleanup(
                        this.left.as_mut(),
                        this.right.as_mut(),
                        this.killed,
                        cx
                    ));
                    finish(this.state);
                    continue;
                }
                State::Running => {}
            }

            let request = match this.wye.next() {
                Directive::Emit(item) => return Poll::Ready(Step::Emit(item)),
                Directive::Halt(cause) => {
                    latch(this.state, cause);
                    continue;
                }
                Directive::Await(request) => request,
            };

            let wants_left = request.includes_left() && !this.halted[LEFT];
            let wants_right = request.includes_right() && !this.halted[RIGHT];
            if !wants_left && !wants_right {
                let failure = Failure::msg(format!("wye awaited {request:?} after it halted"));
                latch(this.state, Cause::Error(failure));
                continue;
            }

            // Poll each requested side that was woken, in rotating order,
            // until one of them produces an event.
            let event = 'poll: {
                for index in this.rotation.iter() {
                    let wanted = match index {
                        LEFT => wants_left,
                        _ => wants_right,
                    };
                    if !wanted || !this.wakers.readiness().clear_ready(index) {
                        continue;
                    }

                    let mut cx = Context::from_waker(this.wakers.waker(index));
                    if index == LEFT {
                        match this.left.as_mut().poll_next(&mut cx) {
                            Poll::Ready(Step::Emit(item)) => {
                                this.wakers.readiness().set_ready(index);
                                break 'poll Event::Left(item);
                            }
                            Poll::Ready(Step::Halt(cause)) => {
                                this.halted[LEFT] = true;
                                break 'poll Event::LeftHalted(cause);
                            }
                            Poll::Pending => {}
                        }
                    } else {
                        match this.right.as_mut().poll_next(&mut cx) {
                            Poll::Ready(Step::Emit(item)) => {
                                this.wakers.readiness().set_ready(index);
                                break 'poll Event::Right(item);
                            }
                            Poll::Ready(Step::Halt(cause)) => {
                                this.halted[RIGHT] = true;
                                break 'poll Event::RightHalted(cause);
                            }
                            Poll::Pending => {}
                        }
                    }
                }
                return Poll::Pending;
            };

            trace_event(&event);
            if let Err(failure) = this.wye.feed(event) {
                latch(this.state, Cause::Error(failure));
            }
        }
    }

    fn poll_kill(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        let this = self.project();
        match this.state {
            State::Done(_) => return Poll::Ready(Ok(())),
            State::Running => latch(this.state, Cause::Killed),
            State::Cleanup(_) => {}
        }
        ready!(poll_cleanup(this.left, this.right, this.killed, cx));
        finish(this.state);
        Poll::Ready(Ok(()))
    }
}

/// Kill both sides exactly once, concurrently.
fn poll_cleanup<L: Process, R: Process>(
    left: Pin<&mut L>,
    right: Pin<&mut R>,
    killed: &mut [bool; 2],
    cx: &mut Context<'_>,
) -> Poll<()> {
    if !killed[LEFT] {
        if let Poll::Ready(result) = left.poll_kill(cx) {
            utils::swallow_cleanup(result);
            killed[LEFT] = true;
        }
    }
    if !killed[RIGHT] {
        if let Poll::Ready(result) = right.poll_kill(cx) {
            utils::swallow_cleanup(result);
            killed[RIGHT] = true;
        }
    }
    if killed[LEFT] && killed[RIGHT] {
        Poll::Ready(())
    } else {
        Poll::Pending
    }
}

fn trace_event<L, R>(event: &Event<L, R>) {
    match event {
        Event::Left(_) => tracing::trace!(side = "left", "value"),
        Event::Right(_) => tracing::trace!(side = "right", "value"),
        Event::LeftHalted(cause) => tracing::trace!(side = "left", %cause, "halted"),
        Event::RightHalted(cause) => tracing::trace!(side = "right", %cause, "halted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::process;
    use crate::wye::{self, Request};
    use futures_lite::future::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted<P: Process>(p: P, kills: &Arc<AtomicUsize>) -> impl Process<Item = P::Item> {
        let kills = kills.clone();
        p.on_cleanup(async move {
            kills.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn merge_drains_both() {
        block_on(async {
            let (mut items, cause) = process::iter(0..3)
                .merge(process::iter(10..13))
                .run_log()
                .await;
            items.sort_unstable();
            assert_eq!(items, [0, 1, 2, 10, 11, 12]);
            assert!(cause.is_clean());
        })
    }

    #[test]
    fn either_alternates_when_both_ready() {
        block_on(async {
            let (items, _) = process::iter(0..2)
                .either(process::iter(0..2))
                .run_log()
                .await;
            assert_eq!(
                items,
                [
                    wye::Either::Left(0),
                    wye::Either::Right(0),
                    wye::Either::Left(1),
                    wye::Either::Right(1),
                ]
            );
        })
    }

    #[test]
    fn both_sides_killed_once() {
        block_on(async {
            let kills = Arc::new(AtomicUsize::new(0));
            let left = counted(process::iter(0..5), &kills);
            let right = counted(process::repeat(1), &kills);
            let (items, cause) = left
                .wye(right, wye::merge_halt_left())
                .run_log()
                .await;
            assert_eq!(items.len(), 10);
            assert!(cause.is_clean());
            assert_eq!(kills.load(Ordering::SeqCst), 2);
        })
    }

    #[test]
    fn kill_before_first_pull() {
        block_on(async {
            let kills = Arc::new(AtomicUsize::new(0));
            let left = counted(process::iter(0..5), &kills);
            let right = counted(process::iter(0..5), &kills);
            let mut p = Box::pin(left.merge(right));
            p.kill().await.unwrap();
            assert_eq!(kills.load(Ordering::SeqCst), 2);
            assert_eq!(p.next().await, Step::Halt(Cause::Killed));
        })
    }

    #[test]
    fn error_wins_and_repeats() {
        block_on(async {
            let failure = Failure::msg("boom");
            let mut p = Box::pin(process::iter(0..2).merge(process::fail(failure.clone())));
            let halted = loop {
                if let Step::Halt(cause) = p.next().await {
                    break cause;
                }
            };
            assert_eq!(halted, Cause::Error(failure.clone()));
            assert_eq!(p.next().await, Step::Halt(Cause::Error(failure)));
            p.kill().await.unwrap();
        })
    }

    #[test]
    fn awaiting_a_halted_side_fails() {
        struct Stubborn;

        impl Wye<u8, u8> for Stubborn {
            type Output = u8;

            fn next(&mut self) -> Directive<u8> {
                Directive::Await(Request::Left)
            }

            fn feed(&mut self, _: Event<u8, u8>) -> Result<(), Failure> {
                Ok(())
            }
        }

        block_on(async {
            let (items, cause) = process::empty()
                .wye(process::empty(), Stubborn)
                .run_log()
                .await;
            assert!(items.is_empty());
            assert!(cause.failure().is_some());
        })
    }
}
