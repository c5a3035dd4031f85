#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use conveyor::BoxedTask;

/// Default wait time for cross-thread operations during tests in milliseconds
pub const DEFAULT_WAIT_TIME: u64 = 100;

/// Blocks the current thread for the given number of milliseconds.
pub fn wait_for(duration_millis: u64) {
    std::thread::sleep(Duration::from_millis(duration_millis));
}

/// A task that bumps a shared counter when executed.
pub fn counting_task(counter: &Arc<AtomicUsize>) -> BoxedTask {
    let counter = Arc::clone(counter);
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}
