use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use conveyor_api::error::PoolError;
use conveyor_api::task::{BoxedTask, Task, TaskErrorHandler, TaskFailure};
use conveyor_api::types::WorkerState;

use super::ledger::WorkerLedger;
use crate::queue::BoundedQueue;

/// A single consumer thread of a worker pool.
///
/// ## Core Algorithm
/// 1. Dequeue from the shared queue (blocking while empty and open)
/// 2. Execute the task outside any lock, with panic isolation
/// 3. Repeat until the dequeue reports the queue drained
///
/// A failing task body is caught at the loop boundary, logged and handed
/// to the failure callback; it never kills the worker. The drain signal is
/// the only sanctioned exit path.
pub(crate) struct Worker {
    /// Index of this worker within its pool.
    id: usize,

    /// Shared task source.
    queue: Arc<BoundedQueue<BoxedTask>>,

    /// Host-supplied failure observer.
    on_task_error: TaskErrorHandler,

    /// Current state, readable by the pool (`Created → Running →
    /// Stopping → Stopped`, never backward).
    state: Arc<AtomicUsize>,

    /// Check-out point for `await_termination`.
    ledger: Arc<WorkerLedger>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        queue: Arc<BoundedQueue<BoxedTask>>,
        on_task_error: TaskErrorHandler,
        ledger: Arc<WorkerLedger>,
    ) -> Self {
        Self {
            id,
            queue,
            on_task_error,
            state: Arc::new(AtomicUsize::new(WorkerState::Created as usize)),
            ledger,
        }
    }

    /// Shared handle the pool keeps for state inspection.
    pub(crate) fn state_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.state)
    }

    /// Spawns the worker's thread.
    ///
    /// The dispatcher keeps tracing output wired to the subscriber that
    /// was active when the pool started.
    pub(crate) fn spawn(
        self,
        name: String,
        dispatcher: tracing::Dispatch,
    ) -> Result<JoinHandle<()>, PoolError> {
        let id = self.id;
        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let _dispatch_guard = tracing::dispatcher::set_default(&dispatcher);
                self.run();
            })
            .map_err(|e| PoolError::ThreadSetup(format!("failed to spawn worker {}: {}", id, e)))
    }

    /// Main worker loop. Consumes the worker; runs on its own thread.
    fn run(self) {
        let span = crate::worker_span!(self.id);
        let _span_guard = span.enter();

        self.state
            .store(WorkerState::Running as usize, Ordering::SeqCst);
        debug!(worker = self.id, "worker started");

        loop {
            match self.queue.dequeue() {
                Ok(task) => self.execute(task),
                Err(_) => {
                    // Drained: no more work will ever arrive.
                    self.state
                        .store(WorkerState::Stopping as usize, Ordering::SeqCst);
                    break;
                }
            }
        }

        debug!(worker = self.id, "worker stopped");
        self.state
            .store(WorkerState::Stopped as usize, Ordering::SeqCst);
        // Last action on this thread: let terminators observe the exit.
        self.ledger.check_out();
    }

    /// Runs one task with the queue lock long released, isolating panics
    /// from the worker loop.
    fn execute(&self, task: BoxedTask) {
        let label = task.label().map(str::to_string);
        let result = panic::catch_unwind(AssertUnwindSafe(|| task.run()));

        if let Err(payload) = result {
            let message = match payload.downcast::<String>() {
                Ok(text) => *text,
                Err(payload) => match payload.downcast::<&str>() {
                    Ok(text) => (*text).to_string(),
                    Err(_) => "unknown panic".to_string(),
                },
            };
            error!(
                worker = self.id,
                label = label.as_deref().unwrap_or("-"),
                %message,
                "task panicked"
            );
            (self.on_task_error)(TaskFailure {
                worker_id: self.id,
                label,
                message,
            });
        }
    }
}
