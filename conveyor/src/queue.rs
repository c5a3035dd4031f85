use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use tracing::debug;

use conveyor_api::error::{Drained, EnqueueError, TryEnqueueError};
use conveyor_api::types::{QueueState, ShutdownMode};

/// A bounded, multi-producer / multi-consumer FIFO queue with cooperative
/// shutdown.
///
/// The queue is the only piece of shared mutable state between producers
/// and workers. Everything lives behind one internal mutex; there is no
/// process-wide state, so every test or host constructs its own instance.
///
/// # Thread Safety
/// - One mutex guards the buffer and the lifecycle state together
/// - Two condition variables (`not_full`, `not_empty`) block producers and
///   consumers; every wait re-checks its predicate in a loop, so spurious
///   wakeups are harmless
/// - Normal progress wakes one waiter; shutdown broadcasts to all of them
///   so no thread is ever left blocked on a dead queue
/// - No lock is ever held while a task body executes; the mutex covers
///   only the brief buffer/state mutation
///
/// # Shutdown Protocol
/// The lifecycle is monotonic: `Open → Draining → Closed`. A graceful
/// shutdown moves to `Draining` (buffered tasks still deliverable); an
/// immediate shutdown moves to `Closed` and discards the backlog. Repeated
/// shutdown calls are no-ops apart from a later `Immediate` escalating
/// `Draining` to `Closed`.
///
/// A poisoned lock means a panic occurred inside the critical section,
/// which only the queue's own code can do; that is a fatal invariant
/// violation, so lock acquisitions unwrap.
pub struct BoundedQueue<T> {
    /// Buffer and lifecycle state, guarded together.
    inner: Mutex<QueueInner<T>>,

    /// Signaled when a slot frees up, broadcast on shutdown.
    not_full: Condvar,

    /// Signaled when a task arrives, broadcast on shutdown.
    not_empty: Condvar,

    /// Maximum number of buffered tasks. Immutable after construction.
    capacity: usize,
}

struct QueueInner<T> {
    buffer: VecDeque<T>,
    state: QueueState,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue in the `Open` state.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; a zero-capacity queue could never
    /// deliver anything, so that is a programming error rather than a
    /// runtime condition.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "queue capacity must be at least 1");
        Self {
            inner: Mutex::new(QueueInner {
                buffer: VecDeque::with_capacity(capacity),
                state: QueueState::Open,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Inserts `task` at the tail, blocking while the queue is full.
    ///
    /// Returns the task inside [`EnqueueError`] if the queue is draining
    /// or closed at the time of the call or becomes so while waiting for a
    /// slot; the caller keeps ownership. A shutdown from any thread wakes
    /// blocked producers, so this never blocks forever on a dead queue.
    pub fn enqueue(&self, task: T) -> Result<(), EnqueueError<T>> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if inner.state != QueueState::Open {
                return Err(EnqueueError(task));
            }
            if inner.buffer.len() < self.capacity {
                inner.buffer.push_back(task);
                self.not_empty.notify_one();
                return Ok(());
            }
            // Full and open: wait for a slot or a shutdown, then re-check.
            inner = self.not_full.wait(inner).unwrap();
        }
    }

    /// Non-blocking enqueue: fails immediately when full or not open.
    pub fn try_enqueue(&self, task: T) -> Result<(), TryEnqueueError<T>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != QueueState::Open {
            return Err(TryEnqueueError::Closed(task));
        }
        if inner.buffer.len() >= self.capacity {
            return Err(TryEnqueueError::Full {
                task,
                capacity: self.capacity,
            });
        }
        inner.buffer.push_back(task);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes and returns the head task, blocking while the queue is
    /// empty and open.
    ///
    /// Under `Draining` the backlog is still delivered; [`Drained`] is
    /// returned only once the queue is empty and no longer open, which is
    /// the consumer's signal to stop its loop. Under `Closed` the backlog
    /// was discarded at the transition, so the drain signal is immediate.
    pub fn dequeue(&self) -> Result<T, Drained> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            debug_assert!(
                inner.state != QueueState::Closed || inner.buffer.is_empty(),
                "closed queue must not hold tasks"
            );
            if let Some(task) = inner.buffer.pop_front() {
                self.not_full.notify_one();
                return Ok(task);
            }
            if inner.state != QueueState::Open {
                return Err(Drained);
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    /// Transitions the queue out of the `Open` state.
    ///
    /// Idempotent: the state only ever moves forward, so repeating a
    /// shutdown (or downgrading `Closed` to `Draining`) is a no-op. Either
    /// effective transition broadcasts to every blocked producer and
    /// consumer so they re-check the state and return.
    ///
    /// This only flips state and wakes waiters; it never waits for
    /// drainage itself, so calling it from a worker thread cannot
    /// deadlock.
    pub fn shutdown(&self, mode: ShutdownMode) {
        let target = match mode {
            ShutdownMode::Graceful => QueueState::Draining,
            ShutdownMode::Immediate => QueueState::Closed,
        };
        let discarded;
        {
            let mut inner = self.inner.lock().unwrap();
            if target <= inner.state {
                return;
            }
            inner.state = target;
            discarded = if target == QueueState::Closed {
                let backlog = inner.buffer.len();
                inner.buffer.clear();
                backlog
            } else {
                0
            };
        }
        self.not_full.notify_all();
        self.not_empty.notify_all();
        debug!(?mode, discarded, "queue shutdown");
    }

    /// Number of buffered tasks. Observational only: the value may be
    /// stale by the time it is used, so callers must not base control
    /// decisions on it without re-checking through enqueue/dequeue.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current lifecycle state. Observational only, like [`len`](Self::len).
    pub fn state(&self) -> QueueState {
        self.inner.lock().unwrap().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == QueueState::Open
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("BoundedQueue")
            .field("len", &inner.buffer.len())
            .field("capacity", &self.capacity)
            .field("state", &inner.state)
            .finish()
    }
}
