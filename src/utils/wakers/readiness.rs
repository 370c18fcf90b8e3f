use core::task::Waker;
use fixedbitset::FixedBitSet;

/// Tracks which sources have been woken since they last returned `Pending`.
#[derive(Debug)]
pub(crate) struct Readiness {
    ready: FixedBitSet,
    parent_waker: Option<Waker>,
}

impl Readiness {
    /// Create a new instance with every source marked ready, so that each
    /// source gets polled at least once.
    pub(crate) fn new(len: usize) -> Self {
        let mut ready = FixedBitSet::with_capacity(len);
        ready.insert_range(..);
        Self {
            ready,
            parent_waker: None,
        }
    }

    /// Mark a source as ready.
    ///
    /// Returns the previous ready state of the source.
    pub(crate) fn set_ready(&mut self, index: usize) -> bool {
        if self.ready[index] {
            true
        } else {
            self.ready.insert(index);
            false
        }
    }

    /// Clear the ready state of a source before polling it.
    ///
    /// Returns whether the source was ready.
    pub(crate) fn clear_ready(&mut self, index: usize) -> bool {
        if self.ready[index] {
            self.ready.set(index, false);
            true
        } else {
            false
        }
    }

    /// Access the parent waker.
    #[inline]
    pub(crate) fn parent_waker(&self) -> Option<&Waker> {
        self.parent_waker.as_ref()
    }

    /// Set the parent `Waker`. This needs to be called at the start of every
    /// `poll` function.
    pub(crate) fn set_waker(&mut self, parent_waker: &Waker) {
        match &mut self.parent_waker {
            Some(prev) => prev.clone_from(parent_waker),
            None => self.parent_waker = Some(parent_waker.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_ready() {
        let mut readiness = Readiness::new(3);
        assert!(readiness.clear_ready(0));
        assert!(readiness.clear_ready(1));
        assert!(readiness.clear_ready(2));
        assert!(!readiness.clear_ready(1));
    }

    #[test]
    fn set_ready_reports_previous_state() {
        let mut readiness = Readiness::new(2);
        assert!(readiness.set_ready(0));
        readiness.clear_ready(0);
        assert!(!readiness.set_ready(0));
        assert!(readiness.clear_ready(0));
    }
}
