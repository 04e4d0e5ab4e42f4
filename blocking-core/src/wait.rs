//! Blocking wrappers over callback-based operations.

use std::sync::Arc;

use blocking_types::{Callback, ResultCallback, Status};

use crate::PendingOperation;

/// Run `async_op` and block until its callback delivers a value.
///
/// `async_op` receives the completion callback and must arrange for it to
/// be invoked, from any thread and at any time, including before
/// `async_op` returns. The calling thread parks until then; no other
/// thread is blocked.
///
/// On failure the delivered [`Status`] is returned unchanged and no value
/// is produced. Only the first callback invocation counts.
///
/// There is no timeout. If the callback is never invoked, this never
/// returns; callers that need bounded latency must arrange it around the
/// collaborator.
pub fn wait_for_async_value<T, F>(async_op: F) -> Result<T, Status>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>),
{
    let pending = Arc::new(PendingOperation::new());
    let completer = Arc::clone(&pending);

    let callback: Callback<T> = Arc::new(move |result: Result<T, Status>| {
        if !completer.complete(result) {
            tracing::warn!("completion callback invoked more than once; extra result dropped");
        }
    });

    async_op(callback);
    pending.wait()
}

/// Run a status-only `async_op` (such as close) and block until it
/// completes.
///
/// Same contract as [`wait_for_async_value`], with no payload.
pub fn wait_for_async_result<F>(async_op: F) -> Result<(), Status>
where
    F: FnOnce(ResultCallback),
{
    wait_for_async_value(async_op)
}
