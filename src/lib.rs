//! Non-deterministic combination of asynchronous processes.
//!
//! A [`Process`] is a lazily pulled sequence which halts with a [`Cause`] and
//! owns a cleanup action. This crate combines processes:
//!
//! - [`wye`]: pure state machines deciding how two processes are combined,
//!   such as [`merge`][wye::merge], [`either`][wye::either] and
//!   [`interrupt`][wye::interrupt].
//! - [`engine`]: the engines which drive those state machines
//!   ([`Combine`][engine::Combine]) or merge any number of processes
//!   ([`MergeAll`][engine::MergeAll]).
//! - [`junction`]: an engine connecting many producers to many consumers,
//!   with a pluggable [`Strategy`][junction::Strategy].
//! - [`primitive`]: queues, topics, cells and signals built on top.
//!
//! Combinators pull their sources only on demand, preserve the order of each
//! source, and guarantee that every source's cleanup runs exactly once,
//! whether the combination ended on its own, failed, or was cancelled.
//!
//! # Examples
//!
//! Tag the values of two processes with their origin:
//! ```rust
//! use futures_wye::prelude::*;
//! use futures_wye::process;
//! use futures_wye::wye::Either;
//! use futures_lite::future::block_on;
//!
//! block_on(async {
//!     let (items, cause) = process::iter(["a", "b"])
//!         .either(process::iter([1, 2]))
//!         .run_log()
//!         .await;
//!     assert!(cause.is_clean());
//!     let lefts: Vec<_> = items.into_iter().filter_map(Either::left).collect();
//!     assert_eq!(lefts, ["a", "b"]);
//! })
//! ```
//!
//! # Logging
//!
//! Lifecycle events are reported through [`tracing`](https://docs.rs/tracing).
//! The crate never installs a subscriber.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod cause;
mod utils;

pub mod engine;
pub mod junction;
pub mod primitive;
pub mod process;
pub mod wye;

pub use cause::{Cause, Failure};
pub use process::{Process, ProcessExt, Step};

/// The process prelude.
pub mod prelude {
    pub use super::process::Process;
    pub use super::process::ProcessExt as _;
    pub use super::process::Step;
}
