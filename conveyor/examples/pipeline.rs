//! Producers feeding a worker pool through a bounded queue, then a
//! graceful shutdown that drains the backlog before the pool terminates.
//!
//! Run with: cargo run --example pipeline

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use conveyor::{labeled, logging, BoundedQueue, ShutdownMode, WorkerPool, WorkerPoolConfig};

fn main() -> anyhow::Result<()> {
    logging::init_default();

    let queue = Arc::new(BoundedQueue::new(8));
    let pool = WorkerPool::new(Arc::clone(&queue), WorkerPoolConfig::with_pool_size(4))?
        .with_task_error_handler(|failure| eprintln!("{failure}"));
    pool.start()?;
    conveyor::log_pool!("started", pool_size = pool.pool_size());

    let done = Arc::new(AtomicUsize::new(0));

    // Two producers race to fill the queue; a full queue blocks them until
    // a worker frees a slot.
    let producers: Vec<_> = (0..2)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for i in 0..16 {
                    let done = Arc::clone(&done);
                    let task = labeled(format!("job-{producer}-{i}"), move || {
                        thread::sleep(Duration::from_millis(5));
                        done.fetch_add(1, Ordering::SeqCst);
                    });
                    if queue.enqueue(task).is_err() {
                        eprintln!("queue closed before job {producer}-{i} was accepted");
                        return;
                    }
                }
            })
        })
        .collect();

    for producer in producers {
        let _ = producer.join();
    }

    // Stop accepting work but let the workers finish the backlog.
    pool.shutdown(ShutdownMode::Graceful);
    pool.await_termination(None)?;

    println!("processed {} jobs", done.load(Ordering::SeqCst));
    Ok(())
}
