//! # blocking-core
//!
//! Turns a callback-based asynchronous operation into a blocking call.
//!
//! The native client never blocks its I/O threads: every operation takes a
//! completion callback and returns immediately. Callers on the embedding
//! side expect an ordinary call that returns a value or fails. This crate
//! is the single place where the two models meet.
//!
//! ## Design
//!
//! - One [`PendingOperation`] (mutex + condvar + result slot) per call,
//!   never reused, shared only by the waiting thread and the callback
//! - The caller parks on the condvar; no polling, no lock held while parked
//! - A callback that fires before the caller starts waiting is not lost
//! - Extra callback invocations are ignored
//! - No timeout: an operation whose callback never fires blocks forever
//!
//! ```ignore
//! let partitions = wait_for_async_value(|callback| {
//!     client.get_partitions_for_topic_async("orders", callback)
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pending;
pub mod wait;

pub use pending::PendingOperation;
pub use wait::{wait_for_async_result, wait_for_async_value};
