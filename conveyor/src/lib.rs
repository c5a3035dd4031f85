// Conveyor Work Queue Implementation
//
// This crate provides the reference implementation of the conveyor work
// queue API: a bounded MPMC FIFO queue guarded by a mutex and two
// condition variables, and a pool of joinable OS worker threads that
// drain it until a cooperative shutdown closes the queue.

pub mod config;
pub mod logging;
pub mod pool;
pub mod queue;

// Re-export key types for easier usage
pub use config::{WorkerPoolConfig, DEFAULT_QUEUE_CAPACITY};
pub use pool::{PoolMetrics, TaskQueue, WorkerPool};
pub use queue::BoundedQueue;

// Re-export the abstract surface so hosts depend on one crate
pub use conveyor_api::error::{Drained, EnqueueError, PoolError, TryEnqueueError};
pub use conveyor_api::task::{boxed, labeled, BoxedTask, Labeled, Task, TaskErrorHandler, TaskFailure};
pub use conveyor_api::types::{PoolState, QueueState, ShutdownMode, WorkerState};
