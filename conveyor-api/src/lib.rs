//! # Conveyor Work Queue API
//!
//! Conveyor is a bounded, multi-producer / multi-consumer work queue with a
//! joinable worker pool and a cooperative shutdown protocol. This crate is
//! the abstract surface of that system: the task model, the error taxonomy
//! and the lifecycle state machines, independent of any particular queue or
//! pool implementation.
//!
//! ## Design Principles
//!
//! - **Results, not exceptions**: routine outcomes (queue closed, queue
//!   drained, pool timeout) are discriminated `Result` values. Only genuine
//!   invariant violations panic.
//! - **Ownership round-trips**: a rejected enqueue hands the task back to
//!   the caller inside the error, so nothing is silently dropped.
//! - **Exactly-once execution**: a task is handed to exactly one worker and
//!   runs at most once before it is discarded.
//! - **Monotonic lifecycle**: queue and pool states only move forward;
//!   shutdown is idempotent.
//!
//! ## Core Components
//!
//! - **Task**: one unit of deferred, independently executable work
//! - **Errors**: producer-side rejection, consumer-side drain signal, pool
//!   lifecycle failures
//! - **Lifecycle types**: queue, worker and pool state machines plus the
//!   shutdown mode selector
//!
//! ## Module Organization
//!
//! - [`task`]: the `Task` trait, boxed task type and failure callback
//! - [`error`]: error types returned by queue and pool operations
//! - [`types`]: lifecycle enums shared by implementations

pub mod error;
pub mod task;
pub mod types;

pub use error::{Drained, EnqueueError, PoolError, TryEnqueueError};
pub use task::{boxed, labeled, noop_error_handler, BoxedTask, Labeled, Task, TaskErrorHandler, TaskFailure};
pub use types::{PoolState, QueueState, ShutdownMode, WorkerState};
