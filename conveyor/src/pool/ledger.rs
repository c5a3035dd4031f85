use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Tracks how many worker threads are still alive.
///
/// Workers check themselves out as the last thing they do before their
/// thread exits; `await_termination` blocks on the condition variable
/// until the count hits zero. The wait re-checks the count in a loop, so
/// spurious wakeups are harmless.
pub(crate) struct WorkerLedger {
    live: Mutex<usize>,
    all_stopped: Condvar,
}

impl WorkerLedger {
    pub(crate) fn new() -> Self {
        Self {
            live: Mutex::new(0),
            all_stopped: Condvar::new(),
        }
    }

    /// Checks a worker in. Must happen before its thread is spawned so a
    /// worker that exits immediately is still accounted for.
    pub(crate) fn check_in(&self) {
        *self.live.lock().unwrap() += 1;
    }

    /// Checks a worker out, waking terminators when the last one leaves.
    /// Also used to retract a check-in when a thread fails to spawn.
    pub(crate) fn check_out(&self) {
        let mut live = self.live.lock().unwrap();
        *live -= 1;
        if *live == 0 {
            self.all_stopped.notify_all();
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        *self.live.lock().unwrap()
    }

    /// Blocks until every checked-in worker has checked out, or until the
    /// timeout elapses. Returns `false` only on timeout with workers still
    /// live.
    pub(crate) fn wait_all_stopped(&self, timeout: Option<Duration>) -> bool {
        let mut live = self.live.lock().unwrap();
        match timeout {
            None => {
                while *live > 0 {
                    live = self.all_stopped.wait(live).unwrap();
                }
                true
            }
            Some(limit) => {
                let (live, _result) = self
                    .all_stopped
                    .wait_timeout_while(live, limit, |live| *live > 0)
                    .unwrap();
                *live == 0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wait_returns_immediately_with_no_workers() {
        let ledger = WorkerLedger::new();
        assert!(ledger.wait_all_stopped(Some(Duration::from_millis(10))));
    }

    #[test]
    fn wait_times_out_while_workers_live() {
        let ledger = WorkerLedger::new();
        ledger.check_in();
        assert!(!ledger.wait_all_stopped(Some(Duration::from_millis(20))));
        assert_eq!(ledger.live_count(), 1);
    }

    #[test]
    fn checkout_wakes_waiter() {
        let ledger = Arc::new(WorkerLedger::new());
        ledger.check_in();

        let waiter = {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.wait_all_stopped(None))
        };

        thread::sleep(Duration::from_millis(30));
        ledger.check_out();
        assert!(waiter.join().unwrap());
    }
}
