//! Utilities to implement the different combinators with.

mod mailbox;
mod pin;
mod rotation;
mod wakers;

pub(crate) use mailbox::{Mailbox, Wakeups};
pub(crate) use pin::get_pin_mut_from_vec;
pub(crate) use rotation::Rotation;
pub(crate) use wakers::WakerSet;

use crate::Failure;

/// Log and discard a failed cleanup. The cause a process halted with always
/// wins over a failure while cleaning up after it.
pub(crate) fn swallow_cleanup(result: Result<(), Failure>) {
    if let Err(error) = result {
        tracing::warn!(%error, "cleanup failed; keeping the original cause");
    }
}
