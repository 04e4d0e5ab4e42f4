//! Per-call monitor holding one outstanding result.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use blocking_types::{ResultCode, Status};

/// Lifecycle of the result slot.
#[derive(Debug)]
enum Slot<T> {
    /// No completion yet.
    Waiting,
    /// Completed; the result has not been read.
    Ready(Result<T, Status>),
    /// Completed and read.
    Taken,
}

/// One outstanding asynchronous call.
///
/// The slot leaves `Waiting` exactly once. [`complete`](Self::complete)
/// is the only writer; [`wait`](Self::wait) reads only after completion.
#[derive(Debug)]
pub struct PendingOperation<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> PendingOperation<T> {
    /// Create an operation with nothing delivered yet.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Waiting),
            ready: Condvar::new(),
        }
    }

    /// Deliver the result and wake the waiter.
    ///
    /// Returns `false`, leaving the slot untouched, if a result was already
    /// delivered.
    pub fn complete(&self, result: Result<T, Status>) -> bool {
        let mut slot = self.lock();
        if !matches!(*slot, Slot::Waiting) {
            return false;
        }
        *slot = Slot::Ready(result);
        drop(slot);
        self.ready.notify_one();
        true
    }

    /// Whether a result has been delivered.
    pub fn is_complete(&self) -> bool {
        !matches!(*self.lock(), Slot::Waiting)
    }

    /// Block until a result is delivered, then take it.
    ///
    /// The completion check and the park happen under the same lock, so a
    /// result delivered before this call returns immediately. A second
    /// `wait` on the same operation fails with `UnknownError`.
    pub fn wait(&self) -> Result<T, Status> {
        let guard = self.lock();
        let mut slot = self
            .ready
            .wait_while(guard, |slot| matches!(slot, Slot::Waiting))
            .unwrap_or_else(PoisonError::into_inner);

        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(result) => result,
            Slot::Taken | Slot::Waiting => Err(Status::new(
                ResultCode::UnknownError,
                "operation result already consumed",
            )),
        }
    }

    // The slot is always left in a valid state, so a panic elsewhere while
    // holding the lock does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for PendingOperation<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn completion_before_wait_returns_immediately() {
        let op = PendingOperation::new();
        assert!(op.complete(Ok(5u32)));
        assert!(op.is_complete());
        assert_eq!(op.wait(), Ok(5));
    }

    #[test]
    fn second_completion_is_rejected() {
        let op = PendingOperation::new();
        assert!(op.complete(Ok("first")));
        assert!(!op.complete(Ok("second")));
        assert_eq!(op.wait(), Ok("first"));
    }

    #[test]
    fn completion_after_read_is_rejected() {
        let op = PendingOperation::new();
        op.complete(Ok(1u8));
        op.wait().unwrap();
        assert!(!op.complete(Ok(2u8)));
    }

    #[test]
    fn second_wait_reports_consumed() {
        let op = PendingOperation::new();
        op.complete(Ok(1u8));
        op.wait().unwrap();
        let err = op.wait().unwrap_err();
        assert_eq!(err.code(), ResultCode::UnknownError);
    }

    #[test]
    fn waiter_wakes_on_completion_from_another_thread() {
        let op = Arc::new(PendingOperation::new());
        let completer = Arc::clone(&op);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            completer.complete(Ok(vec![1, 2, 3]))
        });

        assert_eq!(op.wait(), Ok(vec![1, 2, 3]));
        assert!(handle.join().unwrap());
    }

    #[test]
    fn failure_is_delivered_unchanged() {
        let op: PendingOperation<u32> = PendingOperation::new();
        op.complete(Err(Status::new(ResultCode::Timeout, "slow broker")));
        let err = op.wait().unwrap_err();
        assert_eq!(err.code(), ResultCode::Timeout);
        assert_eq!(err.message(), "slow broker");
    }

    #[test]
    fn waiter_stays_parked_without_completion() {
        let op: Arc<PendingOperation<u32>> = Arc::new(PendingOperation::new());
        let waiter = Arc::clone(&op);
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(waiter.wait());
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(!op.is_complete());

        op.complete(Ok(9));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(9));
    }
}
