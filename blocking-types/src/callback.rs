//! Completion callback shapes.

use std::sync::Arc;

use crate::Status;

/// Completion callback for an asynchronous operation producing a `T`.
///
/// Collaborators promise to invoke it exactly once. It is `Fn`, not
/// `FnOnce`: a misbehaving native library may invoke it again, and
/// receivers must tolerate that.
pub type Callback<T> = Arc<dyn Fn(Result<T, Status>) + Send + Sync>;

/// Completion callback for an operation that reports only a status.
pub type ResultCallback = Callback<()>;
