//! Randomized multi-thread stress coverage: lost wakeups, FIFO under
//! concurrency, the capacity bound, and pool termination across sizes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;

use conveyor::{BoundedQueue, ShutdownMode, TaskQueue, WorkerPool, WorkerPoolConfig};

mod test_helpers;
use test_helpers::counting_task;

#[test]
fn no_lost_wakeups_under_random_producer_consumer_mixes() {
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let capacity = rng.gen_range(1..=8);
        let producers = rng.gen_range(1..=4);
        let consumers = rng.gen_range(1..=4);
        let per_producer = rng.gen_range(10..=40);

        let queue: Arc<BoundedQueue<usize>> = Arc::new(BoundedQueue::new(capacity));

        let producer_handles: Vec<_> = (0..producers)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    for i in 0..per_producer {
                        if rng.gen_bool(0.3) {
                            thread::sleep(Duration::from_micros(rng.gen_range(0..500)));
                        }
                        queue.enqueue(p * per_producer + i).unwrap();
                    }
                })
            })
            .collect();

        let consumed = Arc::new(AtomicUsize::new(0));
        let consumer_handles: Vec<_> = (0..consumers)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let consumed = Arc::clone(&consumed);
                thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    while queue.dequeue().is_ok() {
                        consumed.fetch_add(1, Ordering::SeqCst);
                        if rng.gen_bool(0.3) {
                            thread::sleep(Duration::from_micros(rng.gen_range(0..500)));
                        }
                    }
                })
            })
            .collect();

        for handle in producer_handles {
            handle.join().unwrap();
        }
        // All enqueues succeeded; draining delivers every one of them.
        queue.shutdown(ShutdownMode::Graceful);
        for handle in consumer_handles {
            handle.join().unwrap();
        }

        assert_eq!(consumed.load(Ordering::SeqCst), producers * per_producer);
    }
}

#[test]
fn size_never_exceeds_capacity_under_load() {
    const CAPACITY: usize = 4;

    let queue: Arc<BoundedQueue<u32>> = Arc::new(BoundedQueue::new(CAPACITY));
    let overflow_seen = Arc::new(AtomicBool::new(false));
    let stop_sampling = Arc::new(AtomicBool::new(false));

    let sampler = {
        let queue = Arc::clone(&queue);
        let overflow_seen = Arc::clone(&overflow_seen);
        let stop_sampling = Arc::clone(&stop_sampling);
        thread::spawn(move || {
            while !stop_sampling.load(Ordering::SeqCst) {
                if queue.len() > CAPACITY {
                    overflow_seen.store(true, Ordering::SeqCst);
                }
                thread::yield_now();
            }
        })
    };

    let producers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..200u32 {
                    queue.enqueue(i).unwrap();
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || while queue.dequeue().is_ok() {})
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    queue.shutdown(ShutdownMode::Graceful);
    for handle in consumers {
        handle.join().unwrap();
    }

    stop_sampling.store(true, Ordering::SeqCst);
    sampler.join().unwrap();
    assert!(!overflow_seen.load(Ordering::SeqCst));
}

#[test]
fn fifo_holds_between_one_producer_and_one_consumer() {
    const ITEMS: usize = 500;

    let queue: Arc<BoundedQueue<usize>> = Arc::new(BoundedQueue::new(3));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut received = Vec::with_capacity(ITEMS);
            while let Ok(item) = queue.dequeue() {
                received.push(item);
            }
            received
        })
    };

    for i in 0..ITEMS {
        queue.enqueue(i).unwrap();
    }
    queue.shutdown(ShutdownMode::Graceful);

    let received = consumer.join().unwrap();
    assert_eq!(received, (0..ITEMS).collect::<Vec<_>>());
}

#[test]
fn pool_terminates_for_any_size() {
    for pool_size in [1, 2, 4, 8] {
        let queue: Arc<TaskQueue> = Arc::new(BoundedQueue::new(16));
        let counter = Arc::new(AtomicUsize::new(0));

        let pool =
            WorkerPool::new(Arc::clone(&queue), WorkerPoolConfig::with_pool_size(pool_size))
                .unwrap();
        pool.start().unwrap();

        for _ in 0..100 {
            queue.enqueue(counting_task(&counter)).unwrap();
        }

        pool.shutdown(ShutdownMode::Graceful);
        pool.await_termination(None).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }
}
