//! Engines which drive several processes as one.
//!
//! [`Combine`] interprets a [`Wye`][crate::wye::Wye] over two processes;
//! [`MergeAll`] merges any number of processes of the same type. Both are
//! themselves processes, so engines nest freely.

mod combine;
mod merge_all;

pub use combine::Combine;
pub use merge_all::{merge_all, MergeAll};
