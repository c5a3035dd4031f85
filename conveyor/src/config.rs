use std::time::Duration;

/// Default bound for task queues when the host doesn't pick one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Configuration for a [`WorkerPool`](crate::pool::WorkerPool).
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads. Must be at least 1.
    pub pool_size: usize,

    /// Prefix for worker thread names; the worker index is appended.
    pub thread_name_prefix: String,

    /// How long `shutdown_and_wait` waits for workers to terminate.
    pub shutdown_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: num_cpus::get(),
            thread_name_prefix: "conveyor-worker-".to_string(),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl WorkerPoolConfig {
    /// Default configuration with an explicit thread count.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sizes_pool_to_cpu_count() {
        let config = WorkerPoolConfig::default();
        assert_eq!(config.pool_size, num_cpus::get());
        assert!(config.pool_size >= 1);
        assert_eq!(config.thread_name_prefix, "conveyor-worker-");
    }

    #[test]
    fn with_pool_size_overrides_only_the_count() {
        let config = WorkerPoolConfig::with_pool_size(3);
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(10));
    }
}
