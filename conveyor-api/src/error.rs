use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A blocking enqueue was rejected because the queue no longer accepts
/// work (it is draining or closed).
///
/// The rejected task rides back inside the error so the caller keeps
/// ownership and may retry elsewhere, drop it or escalate.
#[derive(Error, PartialEq, Eq)]
#[error("queue is closed")]
pub struct EnqueueError<T>(pub T);

impl<T> EnqueueError<T> {
    /// Recovers the task that was not enqueued.
    pub fn into_task(self) -> T {
        self.0
    }
}

// Hand-written so the error is Debug regardless of the task type; task
// bodies are usually closures with no useful Debug output anyway.
impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnqueueError(..)")
    }
}

/// A non-blocking enqueue was rejected.
///
/// Like [`EnqueueError`], the task is returned to the caller in either
/// variant.
#[derive(Error, PartialEq, Eq)]
pub enum TryEnqueueError<T> {
    /// The queue is at capacity right now; retrying later may succeed.
    #[error("queue is full (capacity: {capacity})")]
    Full {
        /// The rejected task.
        task: T,
        /// The queue's configured bound.
        capacity: usize,
    },

    /// The queue is draining or closed; no retry will ever succeed.
    #[error("queue is closed")]
    Closed(T),
}

impl<T> TryEnqueueError<T> {
    /// Recovers the task that was not enqueued.
    pub fn into_task(self) -> T {
        match self {
            TryEnqueueError::Full { task, .. } => task,
            TryEnqueueError::Closed(task) => task,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, TryEnqueueError::Full { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TryEnqueueError::Closed(_))
    }
}

impl<T> fmt::Debug for TryEnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryEnqueueError::Full { capacity, .. } => {
                write!(f, "TryEnqueueError::Full {{ capacity: {}, .. }}", capacity)
            }
            TryEnqueueError::Closed(_) => f.write_str("TryEnqueueError::Closed(..)"),
        }
    }
}

/// The queue is empty and will never deliver again.
///
/// This is the sanctioned worker-exit signal, not an application error: a
/// consumer that receives it stops its loop and lets its thread terminate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("queue is drained")]
pub struct Drained;

/// Errors related to worker pool lifecycle operations.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("worker pool requires at least one thread (got {0})")]
    InvalidPoolSize(usize),

    #[error("worker pool has already been started")]
    AlreadyStarted,

    #[error("thread setup error: {0}")]
    ThreadSetup(String),

    /// `await_termination` gave up waiting. The pool may still be running;
    /// the caller decides whether to wait again or abandon it. No thread is
    /// ever force-killed.
    #[error("timed out after {0:?} waiting for workers to terminate")]
    Timeout(Duration),

    #[error("internal pool error: {0}")]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_error_returns_task_ownership() {
        let err = EnqueueError(42usize);
        assert_eq!(err.to_string(), "queue is closed");
        assert_eq!(err.into_task(), 42);
    }

    #[test]
    fn try_enqueue_error_distinguishes_full_from_closed() {
        let full: TryEnqueueError<&str> = TryEnqueueError::Full {
            task: "a",
            capacity: 8,
        };
        assert!(full.is_full());
        assert!(!full.is_closed());
        assert_eq!(full.to_string(), "queue is full (capacity: 8)");
        assert_eq!(full.into_task(), "a");

        let closed: TryEnqueueError<&str> = TryEnqueueError::Closed("b");
        assert!(closed.is_closed());
        assert_eq!(closed.into_task(), "b");
    }

    #[test]
    fn drained_is_copyable_and_displays() {
        let d = Drained;
        let copy = d;
        assert_eq!(d, copy);
        assert_eq!(d.to_string(), "queue is drained");
    }

    #[test]
    fn pool_error_displays() {
        assert_eq!(
            PoolError::InvalidPoolSize(0).to_string(),
            "worker pool requires at least one thread (got 0)"
        );
        assert_eq!(
            PoolError::AlreadyStarted.to_string(),
            "worker pool has already been started"
        );
    }
}
