use core::fmt;
use core::task::Waker;
use std::sync::{Arc, Mutex, PoisonError};

use smallvec::SmallVec;

/// Shared state whose transitions run one at a time, to completion, in the
/// order callers arrive.
///
/// Wakers registered with [`Wakeups`] during a transition are woken once the
/// transition has finished and the state is unlocked again, so a woken task
/// never contends with the transition that woke it.
pub(crate) struct Mailbox<T> {
    state: Arc<Mutex<T>>,
}

impl<T> Mailbox<T> {
    pub(crate) fn new(state: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Run a single transition against the state.
    ///
    /// A transition that panicked leaves the state as it was at that point;
    /// later transitions still run, so handles can detach while unwinding.
    pub(crate) fn post<R>(&self, transition: impl FnOnce(&mut T, &mut Wakeups) -> R) -> R {
        let mut wakeups = Wakeups::default();
        let output = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            transition(&mut state, &mut wakeups)
        };
        wakeups.wake_all();
        output
    }
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("handles", &Arc::strong_count(&self.state))
            .finish()
    }
}

/// Wakers collected during a transition.
#[derive(Default)]
pub(crate) struct Wakeups {
    wakers: SmallVec<[Waker; 4]>,
}

impl Wakeups {
    /// Schedule a parked waker, if there is one.
    pub(crate) fn push(&mut self, waker: Option<Waker>) {
        if let Some(waker) = waker {
            self.wakers.push(waker);
        }
    }

    fn wake_all(self) {
        for waker in self.wakers {
            waker.wake();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::Wake;

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn transitions_are_serialized() {
        let mailbox = Mailbox::new(Vec::new());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let mailbox = mailbox.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        mailbox.post(|log: &mut Vec<usize>, _| log.push(n * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let len = mailbox.post(|log, _| log.len());
        assert_eq!(len, 400);
    }

    #[test]
    fn wakes_after_unlock() {
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(counter.clone());
        let mailbox = Mailbox::new(());
        mailbox.post(|_, wakeups| {
            wakeups.push(Some(waker.clone()));
            wakeups.push(None);
            assert_eq!(counter.0.load(Ordering::SeqCst), 0);
        });
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn survives_a_panicking_transition() {
        let mailbox = Mailbox::new(0);
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            mailbox.post(|n: &mut i32, _| {
                *n = 1;
                panic!("transition failed");
            })
        }));
        assert!(result.is_err());
        assert_eq!(mailbox.post(|n, _| *n), 1);
    }
}
