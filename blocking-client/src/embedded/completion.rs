//! Exactly-once callback delivery for spawned operations.

use blocking_types::{Callback, Status};

/// Owns a callback until it is invoked.
///
/// A spawned task that is dropped before running (runtime shut down)
/// still invokes the callback, with `AlreadyClosed`.
pub(crate) struct Completion<T> {
    callback: Option<Callback<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn new(callback: Callback<T>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Invoke the callback with `result`.
    pub(crate) fn deliver(mut self, result: Result<T, Status>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            tracing::debug!("operation dropped before completion");
            callback(Err(Status::already_closed("client")));
        }
    }
}
