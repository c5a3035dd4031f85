use std::fmt;
use std::sync::Arc;

/// A single unit of deferred work.
///
/// Tasks are fire-and-forget: they take no arguments and return nothing
/// visible to the queue. A host that needs result propagation should layer
/// a promise or channel inside the task body rather than expect the queue
/// to track results.
///
/// Once enqueued, the queue owns the task until exactly one worker
/// dequeues it; the worker then owns it for the duration of `run`, after
/// which it is dropped. A task is never executed twice.
pub trait Task: Send + 'static {
    /// Consumes the task and executes its body.
    fn run(self: Box<Self>);

    /// Optional opaque identifier used in diagnostics and failure reports.
    fn label(&self) -> Option<&str> {
        None
    }
}

/// Every sendable closure is a task.
impl<F> Task for F
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (*self)()
    }
}

/// The boxed form queues store and workers execute.
pub type BoxedTask = Box<dyn Task>;

/// Wraps a closure into a [`BoxedTask`].
pub fn boxed<F>(body: F) -> BoxedTask
where
    F: FnOnce() + Send + 'static,
{
    Box::new(body)
}

/// A task carrying a diagnostic label.
///
/// The label travels with the task and shows up in worker logs and in
/// [`TaskFailure`] reports when the body panics.
pub struct Labeled<F> {
    label: String,
    body: F,
}

impl<F> Labeled<F>
where
    F: FnOnce() + Send + 'static,
{
    pub fn new(label: impl Into<String>, body: F) -> Self {
        Self {
            label: label.into(),
            body,
        }
    }
}

impl<F> Task for Labeled<F>
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) {
        (self.body)()
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }
}

/// Wraps a closure and a label into a [`BoxedTask`].
pub fn labeled<F>(label: impl Into<String>, body: F) -> BoxedTask
where
    F: FnOnce() + Send + 'static,
{
    Box::new(Labeled::new(label, body))
}

/// Report handed to the failure callback when a task body panics.
///
/// Task failures are isolated at the worker loop boundary: the worker
/// records the failure through the callback and moves on to the next
/// dequeue. They are never propagated to the queue, the pool or other
/// tasks.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    /// Index of the worker that ran the task.
    pub worker_id: usize,

    /// The task's diagnostic label, if it carried one.
    pub label: Option<String>,

    /// The panic payload rendered to a string.
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(
                f,
                "task '{}' panicked on worker {}: {}",
                label, self.worker_id, self.message
            ),
            None => write!(f, "task panicked on worker {}: {}", self.worker_id, self.message),
        }
    }
}

/// Callback invoked by a worker when a task body fails.
///
/// Supplied by the host; the default ignores failures beyond the log line
/// the worker emits itself.
pub type TaskErrorHandler = Arc<dyn Fn(TaskFailure) + Send + Sync>;

/// The default handler: do nothing.
pub fn noop_error_handler() -> TaskErrorHandler {
    Arc::new(|_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closure_runs_as_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let task = boxed(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(task.label().is_none());
        task.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn labeled_task_exposes_label() {
        let task = labeled("reindex", || {});
        assert_eq!(task.label(), Some("reindex"));
        task.run();
    }

    #[test]
    fn failure_report_formats_with_and_without_label() {
        let with_label = TaskFailure {
            worker_id: 2,
            label: Some("reindex".to_string()),
            message: "boom".to_string(),
        };
        assert_eq!(
            with_label.to_string(),
            "task 'reindex' panicked on worker 2: boom"
        );

        let anonymous = TaskFailure {
            worker_id: 0,
            label: None,
            message: "boom".to_string(),
        };
        assert_eq!(anonymous.to_string(), "task panicked on worker 0: boom");
    }
}
