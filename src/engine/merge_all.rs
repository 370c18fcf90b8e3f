use core::fmt;
use core::pin::Pin;
use core::task::{ready, Context, Poll};

use fixedbitset::FixedBitSet;
use pin_project::pin_project;

use crate::process::{Process, Step};
use crate::utils::{self, get_pin_mut_from_vec, Rotation, WakerSet};
use crate::{Cause, Failure};

/// A process that merges any number of processes.
///
/// A clean halt of one source keeps the others running; the first non-clean
/// halt stops the merge with that cause. Every source is killed exactly once
/// before the merge reports its own halt.
///
/// This `struct` is created by the [`merge_all`] function. See its
/// documentation for more.
#[pin_project]
pub struct MergeAll<P>
where
    P: Process,
{
    #[pin]
    processes: Vec<P>,
    wakers: WakerSet,
    rotation: Rotation,
    halted: FixedBitSet,
    killed: FixedBitSet,
    terminal: Option<Cause>,
    done: bool,
}

/// Merge every process of an iterator into one.
///
/// # Examples
///
/// ```
/// use futures_wye::prelude::*;
/// use futures_wye::{engine, process};
/// use futures_lite::future::block_on;
///
/// block_on(async {
///     let sources = (0..4).map(|n| process::iter(n * 10..n * 10 + 2));
///     let (mut items, cause) = engine::merge_all(sources).run_log().await;
///     items.sort_unstable();
///     assert_eq!(items, [0, 1, 10, 11, 20, 21, 30, 31]);
///     assert!(cause.is_clean());
/// })
/// ```
pub fn merge_all<I>(processes: I) -> MergeAll<I::Item>
where
    I: IntoIterator,
    I::Item: Process,
{
    let processes: Vec<_> = processes.into_iter().collect();
    let len = processes.len();
    MergeAll {
        processes,
        wakers: WakerSet::new(len),
        rotation: Rotation::new(len),
        halted: FixedBitSet::with_capacity(len),
        killed: FixedBitSet::with_capacity(len),
        terminal: None,
        done: false,
    }
}

impl<P> fmt::Debug for MergeAll<P>
where
    P: Process + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.processes.iter()).finish()
    }
}

impl<P> MergeAll<P>
where
    P: Process,
{
    /// Kill every source that hasn't been killed yet.
    fn poll_cleanup(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut this = self.project();
        for index in 0..this.processes.len() {
            if this.killed[index] {
                continue;
            }
            let Some(process) = get_pin_mut_from_vec(this.processes.as_mut(), index) else {
                continue;
            };
            if let Poll::Ready(result) = process.poll_kill(cx) {
                utils::swallow_cleanup(result);
                this.killed.insert(index);
            }
        }
        if this.killed.count_ones(..) == this.processes.len() {
            *this.done = true;
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl<P> Process for MergeAll<P>
where
    P: Process,
{
    type Item = P::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<Self::Item>> {
        loop {
            if self.terminal.is_some() {
                if !self.done {
                    ready!(self.as_mut().poll_cleanup(cx));
                }
                if let Some(cause) = &self.terminal {
                    return Poll::Ready(Step::Halt(cause.clone()));
                }
            }

            let mut this = self.as_mut().project();
            if this.halted.count_ones(..) == this.processes.len() {
                *this.terminal = Some(Cause::Clean);
                continue;
            }

            this.wakers.readiness().set_waker(cx.waker());
            let mut halted_one = false;
            for index in this.rotation.iter() {
                if this.halted[index] || !this.wakers.readiness().clear_ready(index) {
                    continue;
                }

                let mut cx = Context::from_waker(this.wakers.waker(index));
                let Some(process) = get_pin_mut_from_vec(this.processes.as_mut(), index) else {
                    continue;
                };
                match process.poll_next(&mut cx) {
                    Poll::Ready(Step::Emit(item)) => {
                        this.wakers.readiness().set_ready(index);
                        return Poll::Ready(Step::Emit(item));
                    }
                    Poll::Ready(Step::Halt(cause)) => {
                        tracing::trace!(index, %cause, "source halted");
                        this.halted.insert(index);
                        halted_one = true;
                        if !cause.is_clean() {
                            tracing::debug!(%cause, "merge halting");
                            *this.terminal = Some(cause);
                        }
                        break;
                    }
                    Poll::Pending => {}
                }
            }

            // Sources woken during the pass have already woken us again.
            if !halted_one {
                return Poll::Pending;
            }
        }
    }

    fn poll_kill(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        let this = self.as_mut().project();
        if *this.done {
            return Poll::Ready(Ok(()));
        }
        this.terminal.get_or_insert(Cause::Killed);
        ready!(self.poll_cleanup(cx));
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::process;
    use futures_lite::future::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn empty_halts_cleanly() {
        block_on(async {
            let (items, cause) = merge_all(Vec::<process::Iter<std::ops::Range<u8>>>::new())
                .run_log()
                .await;
            assert!(items.is_empty());
            assert!(cause.is_clean());
        })
    }

    #[test]
    fn first_failure_stops_everything() {
        block_on(async {
            let kills = Arc::new(AtomicUsize::new(0));
            let failure = Failure::msg("boom");
            let sources = vec![
                process::repeat(1).boxed(),
                process::fail(failure.clone()).boxed(),
                process::repeat(2).boxed(),
            ]
            .into_iter()
            .map(|p| {
                let kills = kills.clone();
                p.on_cleanup(async move {
                    kills.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            });
            let (_, cause) = merge_all(sources).run_log().await;
            assert_eq!(cause, Cause::Error(failure));
            assert_eq!(kills.load(Ordering::SeqCst), 3);
        })
    }

    #[test]
    fn take_stops_early() {
        block_on(async {
            let sources = (0..3).map(|_| process::repeat(0u8));
            let (items, cause) = merge_all(sources).take(7).run_log().await;
            assert_eq!(items.len(), 7);
            assert!(cause.is_clean());
        })
    }
}
