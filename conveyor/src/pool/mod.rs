//! Worker pool and shutdown protocol.
//!
//! A [`WorkerPool`] owns a fixed set of OS threads, each repeatedly
//! pulling tasks from a shared [`BoundedQueue`] and executing them until
//! the queue reports itself drained. Shutdown is cooperative: the pool
//! never force-kills a thread; it closes the queue, the queue wakes every
//! blocked thread, and each worker exits once it observes the drain
//! signal. `await_termination` then joins the threads, so none ever
//! outlives observability.

mod ledger;
mod worker;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info};

use conveyor_api::error::PoolError;
use conveyor_api::task::{noop_error_handler, BoxedTask, TaskErrorHandler, TaskFailure};
use conveyor_api::types::{PoolState, QueueState, ShutdownMode, WorkerState};

use crate::config::WorkerPoolConfig;
use crate::logging;
use crate::queue::BoundedQueue;
use ledger::WorkerLedger;
use worker::Worker;

/// The queue type a [`WorkerPool`] consumes from.
pub type TaskQueue = BoundedQueue<BoxedTask>;

/// Snapshot of pool and queue state.
///
/// Observational only; every field may be stale by the time it is read.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Configured number of worker threads.
    pub pool_size: usize,

    /// Tasks currently buffered in the queue.
    pub queue_len: usize,

    /// Queue lifecycle state.
    pub queue_state: QueueState,

    /// Pool lifecycle state.
    pub pool_state: PoolState,

    /// Worker threads that have not yet exited.
    pub live_workers: usize,
}

/// A fixed-size pool of consumer threads draining one shared queue.
///
/// ## Lifecycle
/// Construction is side-effect-free regarding concurrency; threads are
/// spawned by an explicit [`start`](Self::start). The pool is single-use:
/// once the queue that feeds it is shut down and the workers have
/// terminated, a new pool (and queue) is constructed rather than the old
/// one restarted.
///
/// ## Relationship to the queue
/// The pool holds a non-owning (shared) reference: producers keep their
/// own `Arc` to the same queue, and several pools could in principle
/// drain one queue together.
pub struct WorkerPool {
    /// Shared task source.
    queue: Arc<TaskQueue>,

    config: WorkerPoolConfig,

    /// Pool state, encoded as in [`PoolState`].
    state: Arc<AtomicUsize>,

    /// Join handles of spawned workers, drained by `await_termination`.
    handles: Mutex<Vec<JoinHandle<()>>>,

    /// Per-worker state handles, in worker-id order.
    worker_states: Mutex<Vec<Arc<AtomicUsize>>>,

    /// Live-worker count for termination waits.
    ledger: Arc<WorkerLedger>,

    /// Host-supplied failure observer, shared by all workers.
    on_task_error: TaskErrorHandler,
}

impl WorkerPool {
    /// Creates a pool bound to `queue`. Does not spawn any threads.
    ///
    /// Fails with [`PoolError::InvalidPoolSize`] when the configured
    /// thread count is zero.
    pub fn new(queue: Arc<TaskQueue>, config: WorkerPoolConfig) -> Result<Self, PoolError> {
        if config.pool_size == 0 {
            return Err(PoolError::InvalidPoolSize(0));
        }
        Ok(Self {
            queue,
            config,
            state: Arc::new(AtomicUsize::new(PoolState::Created as usize)),
            handles: Mutex::new(Vec::new()),
            worker_states: Mutex::new(Vec::new()),
            ledger: Arc::new(WorkerLedger::new()),
            on_task_error: noop_error_handler(),
        })
    }

    /// Injects the failure callback invoked when a task body panics.
    /// Defaults to a no-op.
    pub fn with_task_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(TaskFailure) + Send + Sync + 'static,
    {
        self.on_task_error = Arc::new(handler);
        self
    }

    /// Spawns the configured number of worker threads.
    ///
    /// One-shot: a second call fails with [`PoolError::AlreadyStarted`]
    /// and corrupts nothing. If a thread fails to spawn partway through,
    /// the workers already running stay up and can still be stopped
    /// through `shutdown` / `await_termination`.
    pub fn start(&self) -> Result<(), PoolError> {
        self.state
            .compare_exchange(
                PoolState::Created as usize,
                PoolState::Running as usize,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|_| PoolError::AlreadyStarted)?;

        let dispatcher = logging::current_subscriber();
        let mut handles = self.handles.lock().unwrap();
        let mut states = self.worker_states.lock().unwrap();

        for id in 0..self.config.pool_size {
            let worker = Worker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.on_task_error),
                Arc::clone(&self.ledger),
            );
            states.push(worker.state_handle());

            // Check in before spawning so a worker that exits immediately
            // is still accounted for.
            self.ledger.check_in();
            let name = format!("{}{}", self.config.thread_name_prefix, id);
            match worker.spawn(name, dispatcher.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    self.ledger.check_out();
                    states.pop();
                    return Err(e);
                }
            }
        }

        info!(pool_size = self.config.pool_size, "worker pool started");
        Ok(())
    }

    /// Requests shutdown by forwarding `mode` to the queue.
    ///
    /// Does not block: the queue transition wakes every blocked producer
    /// and worker, and the workers drain (graceful) or exit (immediate)
    /// on their own. Idempotent.
    pub fn shutdown(&self, mode: ShutdownMode) {
        let _ = self.state.compare_exchange(
            PoolState::Running as usize,
            PoolState::ShuttingDown as usize,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        debug!(?mode, "pool shutdown requested");
        self.queue.shutdown(mode);
    }

    /// Blocks until every worker thread has exited, then joins them.
    ///
    /// With a timeout, returns [`PoolError::Timeout`] if workers are
    /// still live when it elapses; the pool keeps running and the call
    /// may be repeated. Without one, waits indefinitely. This design
    /// never force-kills a thread.
    pub fn await_termination(&self, timeout: Option<Duration>) -> Result<(), PoolError> {
        match timeout {
            Some(limit) => {
                if !self.ledger.wait_all_stopped(Some(limit)) {
                    return Err(PoolError::Timeout(limit));
                }
            }
            None => {
                self.ledger.wait_all_stopped(None);
            }
        }

        // Every worker has checked out; joining is now a formality that
        // reclaims the threads.
        for handle in self.handles.lock().unwrap().drain(..) {
            let _ = handle.join();
        }

        if self.state.load(Ordering::SeqCst) != PoolState::Created as usize {
            self.state
                .store(PoolState::Terminated as usize, Ordering::SeqCst);
            info!("worker pool terminated");
        }
        Ok(())
    }

    /// `shutdown` followed by `await_termination` with the configured
    /// timeout.
    pub fn shutdown_and_wait(&self, mode: ShutdownMode) -> Result<(), PoolError> {
        self.shutdown(mode);
        self.await_termination(Some(self.config.shutdown_timeout))
    }

    pub fn state(&self) -> PoolState {
        PoolState::from_usize(self.state.load(Ordering::SeqCst))
    }

    pub fn pool_size(&self) -> usize {
        self.config.pool_size
    }

    /// The queue this pool drains; producers enqueue through this.
    pub fn queue(&self) -> Arc<TaskQueue> {
        Arc::clone(&self.queue)
    }

    /// Per-worker states, in worker-id order. Empty before `start`.
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.worker_states
            .lock()
            .unwrap()
            .iter()
            .map(|state| WorkerState::from_usize(state.load(Ordering::SeqCst)))
            .collect()
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            pool_size: self.config.pool_size,
            queue_len: self.queue.len(),
            queue_state: self.queue.state(),
            pool_state: self.state(),
            live_workers: self.ledger.live_count(),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("pool_size", &self.config.pool_size)
            .field("state", &self.state())
            .field("live_workers", &self.ledger.live_count())
            .finish()
    }
}
