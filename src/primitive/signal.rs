use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::Ref;
use crate::engine::Combine;
use crate::process::{self, Process, ProcessExt, Repeat, Step};
use crate::wye::{self, EchoLeft};
use crate::{Cause, Failure};

/// A value that changes over time, observable as a process.
///
/// A signal is a thin view over a [`Ref`]; cloning it yields another handle
/// to the same value.
///
/// # Examples
///
/// ```
/// use futures_wye::prelude::*;
/// use futures_wye::primitive::Signal;
/// use futures_lite::future::block_on;
///
/// block_on(async {
///     let signal = Signal::with_value(1);
///     let mut updates = signal.discrete();
///     assert_eq!(updates.next().await, Step::Emit(1));
///
///     signal.set(2).unwrap();
///     assert_eq!(updates.next().await, Step::Emit(2));
///
///     signal.close();
///     assert!(updates.next().await.is_halt());
/// })
/// ```
pub struct Signal<T> {
    cell: Ref<T>,
}

impl<T> Signal<T> {
    /// Create a signal with no value yet.
    pub fn new() -> Self {
        Self::from_ref(Ref::new())
    }

    /// Create a signal holding `value`.
    pub fn with_value(value: T) -> Self {
        Self::from_ref(Ref::with_value(value))
    }

    /// View an existing cell as a signal.
    pub fn from_ref(cell: Ref<T>) -> Self {
        Self { cell }
    }

    /// The cell underneath.
    pub fn cell(&self) -> &Ref<T> {
        &self.cell
    }

    /// Replace the value.
    pub fn set(&self, value: T) -> Result<(), Cause> {
        self.cell.set_value(value)
    }

    /// Update the value in place. Does nothing while the signal has no value.
    pub fn modify(&self, f: impl FnOnce(&T) -> T) -> Result<(), Cause> {
        self.cell.set(|value| value.map(f)).map(drop)
    }

    /// Wait for the signal to hold a value, and return it.
    pub async fn get(&self) -> Result<T, Cause>
    where
        T: Clone,
    {
        self.cell.get(false, 0).await.map(|(_, value)| value)
    }

    /// Halt every observer cleanly.
    pub fn close(&self) {
        self.cell.close();
    }

    /// Halt every observer with `failure`.
    pub fn fail(&self, failure: Failure) {
        self.cell.fail(failure);
    }

    /// Emit the current value, then each value set afterwards.
    ///
    /// Sets that happen between two pulls are coalesced: the observer only
    /// sees the latest of them.
    pub fn discrete(&self) -> Discrete<T> {
        Discrete {
            cell: self.cell.clone(),
            last_seen: None,
            key: None,
            halted: None,
        }
    }

    /// Emit the latest value on every pull, once there is one.
    pub fn continuous(&self) -> Continuous<T>
    where
        T: Clone,
    {
        self.discrete()
            .wye(process::repeat(()), wye::echo_left())
    }

    /// Emit, on every pull, whether the signal was set since the previous
    /// pull. The first pull compares against the version at creation.
    pub fn changed(&self) -> Changed<T> {
        Changed {
            last_seen: self.cell.version(),
            cell: self.cell.clone(),
            halted: None,
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("cell", &self.cell).finish()
    }
}

/// The process returned by [`Signal::continuous`].
pub type Continuous<T> = Combine<Discrete<T>, Repeat<()>, EchoLeft<T, ()>>;

/// Process for the [`discrete`][Signal::discrete] method.
pub struct Discrete<T> {
    cell: Ref<T>,
    last_seen: Option<u64>,
    key: Option<usize>,
    halted: Option<Cause>,
}

impl<T> Unpin for Discrete<T> {}

impl<T: Clone> Process for Discrete<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Step<T>> {
        let this = self.get_mut();
        if let Some(cause) = &this.halted {
            return Poll::Ready(Step::Halt(cause.clone()));
        }
        let (only_changed, last_seen) = match this.last_seen {
            Some(version) => (true, version),
            None => (false, 0),
        };
        let key = &mut this.key;
        let result = this
            .cell
            .core()
            .post(|state, _| state.poll_get(only_changed, last_seen, key, cx.waker()));
        match result {
            Poll::Ready(Ok((version, value))) => {
                this.last_seen = Some(version);
                Poll::Ready(Step::Emit(value))
            }
            Poll::Ready(Err(cause)) => {
                this.halted = Some(cause.clone());
                Poll::Ready(Step::Halt(cause))
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn poll_kill(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Failure>> {
        let this = self.get_mut();
        let key = &mut this.key;
        this.cell.core().post(|state, _| state.forget(key));
        this.halted.get_or_insert(Cause::Killed);
        Poll::Ready(Ok(()))
    }
}

impl<T> Drop for Discrete<T> {
    fn drop(&mut self) {
        if self.key.is_some() {
            let key = &mut self.key;
            self.cell.core().post(|state, _| state.forget(key));
        }
    }
}

impl<T> fmt::Debug for Discrete<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discrete")
            .field("last_seen", &self.last_seen)
            .field("halted", &self.halted)
            .finish()
    }
}

/// Process for the [`changed`][Signal::changed] method.
pub struct Changed<T> {
    cell: Ref<T>,
    last_seen: u64,
    halted: Option<Cause>,
}

impl<T> Unpin for Changed<T> {}

impl<T> Process for Changed<T> {
    type Item = bool;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Step<bool>> {
        let this = self.get_mut();
        if let Some(cause) = &this.halted {
            return Poll::Ready(Step::Halt(cause.clone()));
        }
        let (version, halted) = this
            .cell
            .core()
            .post(|state, _| (state.version(), state.halted().cloned()));
        if let Some(cause) = halted {
            this.halted = Some(cause.clone());
            return Poll::Ready(Step::Halt(cause));
        }
        let changed = version != this.last_seen;
        this.last_seen = version;
        Poll::Ready(Step::Emit(changed))
    }
}

impl<T> fmt::Debug for Changed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Changed")
            .field("last_seen", &self.last_seen)
            .field("halted", &self.halted)
            .finish()
    }
}
