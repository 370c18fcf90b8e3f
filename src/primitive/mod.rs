//! Coordination primitives built on the engines.
//!
//! - [`Queue`]: each value goes to one consumer, FIFO, optionally bounded.
//! - [`Topic`]: each value goes to every current subscriber.
//! - [`Ref`]: a versioned cell readers can wait on.
//! - [`Signal`]: a [`Ref`] observed as a process.

mod cell;
mod queue;
mod signal;
mod topic;

pub use cell::{Get, Ref};
pub use queue::{Dequeue, Queue};
pub use signal::{Changed, Continuous, Discrete, Signal};
pub use topic::{Subscription, Topic};
