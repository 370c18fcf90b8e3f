//! Why a process stopped.

use core::fmt;
use std::error::Error as StdError;
use std::sync::Arc;

/// The reason a [`Process`][crate::process::Process] or engine stopped.
///
/// A halted process reports its cause exactly once as its terminal step, and
/// keeps reporting the same cause on every subsequent pull.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Cause {
    /// Normal exhaustion.
    #[error("process halted")]
    Clean,
    /// Deliberate cancellation, either from downstream or from a sibling's
    /// failure.
    #[error("process was killed")]
    Killed,
    /// An upstream or a strategy computation failed.
    #[error(transparent)]
    Error(#[from] Failure),
}

impl Cause {
    /// Returns `true` if this is [`Cause::Clean`].
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Returns `true` if this is [`Cause::Killed`].
    #[must_use]
    pub fn is_killed(&self) -> bool {
        matches!(self, Self::Killed)
    }

    /// Access the failure, if the process failed.
    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Error(failure) => Some(failure),
            _ => None,
        }
    }

    /// Convert into a `Result`, treating both `Clean` and `Killed` as success.
    pub fn into_result(self) -> Result<(), Failure> {
        match self {
            Self::Error(failure) => Err(failure),
            Self::Clean | Self::Killed => Ok(()),
        }
    }
}

/// A type-erased, cheaply cloneable error.
///
/// Two failures compare equal only if they are clones of the same failure.
#[derive(Clone)]
pub struct Failure {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Failure {
    /// Wrap an error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Create a failure from a message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures_wye::Failure;
    ///
    /// let failure = Failure::msg("boom");
    /// assert_eq!(failure.to_string(), "boom");
    /// ```
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Returns a reference to the inner error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct OnFire;

    #[test]
    fn failure_identity() {
        let a = Failure::msg("boom");
        let b = Failure::msg("boom");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn downcast() {
        let failure = Failure::new(OnFire);
        assert!(failure.downcast_ref::<OnFire>().is_some());
        assert_eq!(Cause::from(failure).to_string(), "disk on fire");
    }

    #[test]
    fn into_result() {
        assert!(Cause::Clean.into_result().is_ok());
        assert!(Cause::Killed.into_result().is_ok());
        let failure = Failure::msg("boom");
        assert_eq!(Cause::Error(failure.clone()).into_result(), Err(failure));
    }
}
