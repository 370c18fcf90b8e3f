use std::sync::{Arc, Mutex};
use std::task::Wake;

use super::Readiness;

/// A waker handed to one source; marks that source ready and forwards the
/// wakeup to the parent task.
#[derive(Debug, Clone)]
pub(crate) struct SourceWaker {
    pub(crate) index: usize,
    pub(crate) readiness: Arc<Mutex<Readiness>>,
}

impl SourceWaker {
    pub(crate) fn new(index: usize, readiness: Arc<Mutex<Readiness>>) -> Self {
        Self { index, readiness }
    }
}

impl Wake for SourceWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let mut readiness = self.readiness.lock().unwrap();
        if !readiness.set_ready(self.index) {
            // Nothing to forward to if the parent never polled us.
            if let Some(parent) = readiness.parent_waker() {
                parent.wake_by_ref();
            }
        }
    }
}
