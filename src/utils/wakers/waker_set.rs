use std::sync::{Arc, Mutex, MutexGuard};
use std::task::Waker;

use super::{Readiness, SourceWaker};

/// One waker per source, all sharing a single [`Readiness`].
pub(crate) struct WakerSet {
    wakers: Vec<Waker>,
    readiness: Arc<Mutex<Readiness>>,
}

impl WakerSet {
    pub(crate) fn new(len: usize) -> Self {
        let readiness = Arc::new(Mutex::new(Readiness::new(len)));
        let wakers = (0..len)
            .map(|index| Arc::new(SourceWaker::new(index, readiness.clone())).into())
            .collect();
        Self { wakers, readiness }
    }

    /// The waker to poll source `index` with.
    pub(crate) fn waker(&self, index: usize) -> &Waker {
        &self.wakers[index]
    }

    /// Lock the readiness. The guard must be dropped before polling a source.
    pub(crate) fn readiness(&self) -> MutexGuard<'_, Readiness> {
        self.readiness.lock().unwrap()
    }
}

impl core::fmt::Debug for WakerSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WakerSet")
            .field("len", &self.wakers.len())
            .finish()
    }
}
