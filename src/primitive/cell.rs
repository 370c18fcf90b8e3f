use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use slab::Slab;

use crate::utils::{Mailbox, Wakeups};
use crate::{Cause, Failure};

/// A settable cell with change notification.
///
/// Every successful [`set`][Ref::set] bumps the cell's version, which lets
/// readers wait for a value newer than one they have already seen. Cloning a
/// `Ref` yields another handle to the same cell.
///
/// # Examples
///
/// ```
/// use futures_wye::primitive::Ref;
/// use futures_lite::future::block_on;
///
/// block_on(async {
///     let cell = Ref::new();
///     cell.set_value("first").unwrap();
///     let (version, value) = cell.get(false, 0).await.unwrap();
///     assert_eq!((version, value), (1, "first"));
///
///     cell.set(|prev| prev.map(|_| "second")).unwrap();
///     assert_eq!(cell.get(true, version).await.unwrap(), (2, "second"));
/// })
/// ```
pub struct Ref<T> {
    core: Mailbox<State<T>>,
}

pub(crate) struct State<T> {
    value: Option<T>,
    version: u64,
    halted: Option<Cause>,
    waiters: Slab<Waker>,
}

impl<T> State<T> {
    fn wake_all(&self, wakeups: &mut Wakeups) {
        for (_, waker) in &self.waiters {
            wakeups.push(Some(waker.clone()));
        }
    }

    fn halt(&mut self, cause: Cause, wakeups: &mut Wakeups) {
        if self.halted.is_none() {
            tracing::debug!(%cause, "cell halted");
            self.halted = Some(cause);
            self.wake_all(wakeups);
        }
    }

    /// Complete a read, or park `waker` under `key` until the cell changes.
    pub(crate) fn poll_get(
        &mut self,
        only_changed: bool,
        last_seen: u64,
        key: &mut Option<usize>,
        waker: &Waker,
    ) -> Poll<Result<(u64, T), Cause>>
    where
        T: Clone,
    {
        let ready = match (&self.halted, &self.value) {
            (Some(cause), _) => Some(Err(cause.clone())),
            (None, Some(value)) if !only_changed || self.version > last_seen => {
                Some(Ok((self.version, value.clone())))
            }
            (None, _) => None,
        };
        match ready {
            Some(result) => {
                self.forget(key);
                Poll::Ready(result)
            }
            None => {
                match *key {
                    Some(key) => self.waiters[key].clone_from(waker),
                    None => *key = Some(self.waiters.insert(waker.clone())),
                }
                Poll::Pending
            }
        }
    }

    /// Drop a parked waker.
    pub(crate) fn forget(&mut self, key: &mut Option<usize>) {
        if let Some(key) = key.take() {
            self.waiters.try_remove(key);
        }
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn halted(&self) -> Option<&Cause> {
        self.halted.as_ref()
    }
}

impl<T> Ref<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::from_state(None)
    }

    /// Create a cell holding `value` at version 0.
    pub fn with_value(value: T) -> Self {
        Self::from_state(Some(value))
    }

    fn from_state(value: Option<T>) -> Self {
        Self {
            core: Mailbox::new(State {
                value,
                version: 0,
                halted: None,
                waiters: Slab::new(),
            }),
        }
    }

    pub(crate) fn core(&self) -> &Mailbox<State<T>> {
        &self.core
    }

    /// Read the cell.
    ///
    /// With `only_changed`, waits until the version is newer than `last_seen`;
    /// otherwise waits only until the cell holds a value. Fails with the
    /// cause the cell halted with.
    pub fn get(&self, only_changed: bool, last_seen: u64) -> Get<'_, T> {
        Get {
            cell: self,
            only_changed,
            last_seen,
            key: None,
        }
    }

    /// Read the current value without waiting.
    pub fn get_now(&self) -> Option<T>
    where
        T: Clone,
    {
        self.core.post(|state, _| state.value.clone())
    }

    /// Update the cell from its current value.
    ///
    /// `update` returning `None` leaves the cell, and its version, unchanged.
    /// Returns whether the cell changed.
    pub fn set(&self, update: impl FnOnce(Option<&T>) -> Option<T>) -> Result<bool, Cause> {
        self.core.post(|state, wakeups| {
            if let Some(cause) = &state.halted {
                return Err(cause.clone());
            }
            let Some(next) = update(state.value.as_ref()) else {
                return Ok(false);
            };
            state.value = Some(next);
            state.version += 1;
            state.wake_all(wakeups);
            Ok(true)
        })
    }

    /// Replace the value.
    pub fn set_value(&self, value: T) -> Result<(), Cause> {
        self.set(|_| Some(value)).map(drop)
    }

    /// Halt the cell with `failure`; every current and future read fails.
    pub fn fail(&self, failure: Failure) {
        self.core
            .post(|state, wakeups| state.halt(Cause::Error(failure), wakeups));
    }

    /// Halt the cell cleanly; every current and future read ends.
    pub fn close(&self) {
        self.core
            .post(|state, wakeups| state.halt(Cause::Clean, wakeups));
    }

    /// The number of successful sets so far.
    pub fn version(&self) -> u64 {
        self.core.post(|state, _| state.version)
    }
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (version, halted) = self
            .core
            .post(|state, _| (state.version, state.halted.clone()));
        f.debug_struct("Ref")
            .field("version", &version)
            .field("halted", &halted)
            .finish()
    }
}

/// Future for the [`get`][Ref::get] method.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Get<'a, T> {
    cell: &'a Ref<T>,
    only_changed: bool,
    last_seen: u64,
    key: Option<usize>,
}

impl<T: Clone> Future for Get<'_, T> {
    type Output = Result<(u64, T), Cause>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let (only_changed, last_seen) = (this.only_changed, this.last_seen);
        let key = &mut this.key;
        this.cell
            .core
            .post(|state, _| state.poll_get(only_changed, last_seen, key, cx.waker()))
    }
}

impl<T> Drop for Get<'_, T> {
    fn drop(&mut self) {
        if self.key.is_some() {
            let key = &mut self.key;
            self.cell.core.post(|state, _| state.forget(key));
        }
    }
}

impl<T> fmt::Debug for Get<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Get")
            .field("only_changed", &self.only_changed)
            .field("last_seen", &self.last_seen)
            .finish()
    }
}
