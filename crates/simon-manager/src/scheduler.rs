// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A [`Scheduler`] backed by one named background thread per task.

use crate::sync::lock;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use simon_core::{Runnable, ScheduledTask, Scheduler, SimonError, SimonResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Runs each scheduled task on its own background thread with a fixed delay
/// between the end of one run and the start of the next.
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    thread_name: String,
}

impl ThreadScheduler {
    /// Creates a scheduler whose threads are named `thread_name`.
    pub fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
        }
    }

    /// Schedules `task` and returns the concrete task handle.
    pub fn spawn(
        &self,
        task: Arc<dyn Runnable>,
        initial_delay: Duration,
        delay: Duration,
    ) -> SimonResult<ThreadTask> {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let runs = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            task,
            cancel_rx,
            cancelled: Arc::clone(&cancelled),
            runs: Arc::clone(&runs),
        };
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker.run(initial_delay, delay))
            .map_err(|e| SimonError::Schedule(format!("failed to spawn scheduler thread: {e}")))?;

        log::debug!("Scheduler thread '{}' spawned", self.thread_name);
        Ok(ThreadTask {
            cancel_tx,
            cancelled,
            runs,
            handle: Mutex::new(Some(handle)),
        })
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new("simon-purger")
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_with_fixed_delay(
        &self,
        task: Arc<dyn Runnable>,
        initial_delay: Duration,
        delay: Duration,
    ) -> SimonResult<Box<dyn ScheduledTask>> {
        Ok(Box::new(self.spawn(task, initial_delay, delay)?))
    }
}

struct Worker {
    task: Arc<dyn Runnable>,
    cancel_rx: Receiver<()>,
    cancelled: Arc<AtomicBool>,
    runs: Arc<AtomicU64>,
}

impl Worker {
    fn run(self, initial_delay: Duration, delay: Duration) {
        log::debug!("Scheduler thread started");
        let mut wait = initial_delay;
        loop {
            match self.cancel_rx.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
            if self.cancelled.load(Ordering::Acquire) {
                break;
            }
            self.task.run();
            self.runs.fetch_add(1, Ordering::Relaxed);
            wait = delay;
        }
        log::debug!(
            "Scheduler thread stopped after {} runs",
            self.runs.load(Ordering::Relaxed)
        );
    }
}

/// The handle of a task scheduled on a [`ThreadScheduler`].
///
/// Cancellation is cooperative: a run in progress finishes and no further run
/// starts. Dropping the handle also stops the thread.
#[derive(Debug)]
pub struct ThreadTask {
    cancel_tx: Sender<()>,
    cancelled: Arc<AtomicBool>,
    runs: Arc<AtomicU64>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ThreadTask {
    /// Number of completed runs.
    pub fn run_count(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Waits for the background thread to exit. Only returns after cancellation.
    pub fn join(&self) {
        if let Some(handle) = lock(&self.handle).take() {
            if handle.join().is_err() {
                log::error!("Scheduler thread panicked");
            }
        }
    }
}

impl ScheduledTask for ThreadTask {
    fn cancel(&self, may_interrupt_if_running: bool) -> bool {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        if may_interrupt_if_running {
            log::debug!("Interrupting a running task is not supported; it will finish its run");
        }
        let _ = self.cancel_tx.try_send(());
        true
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::time::Instant;

    struct Tick {
        count: AtomicU64,
    }

    impl Runnable for Tick {
        fn run(&self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        condition()
    }

    #[test]
    fn test_runs_repeatedly_until_cancelled() {
        let tick = Arc::new(Tick {
            count: AtomicU64::new(0),
        });
        let task = ThreadScheduler::new("test-scheduler")
            .spawn(tick.clone(), Duration::ZERO, Duration::from_millis(1))
            .unwrap();

        assert!(wait_until(Duration::from_secs(5), || task.run_count() >= 3));
        assert!(task.cancel(false));
        assert!(!task.cancel(false), "second cancel reports already cancelled");
        task.join();

        let after_join = tick.count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(tick.count.load(Ordering::SeqCst), after_join);
        assert!(task.is_cancelled());
    }

    #[test]
    fn test_cancel_before_initial_delay_prevents_any_run() {
        let tick = Arc::new(Tick {
            count: AtomicU64::new(0),
        });
        let task = ThreadScheduler::default()
            .spawn(tick.clone(), Duration::from_secs(60), Duration::from_secs(60))
            .unwrap();

        task.cancel(false);
        task.join();
        assert_eq!(tick.count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropping_handle_stops_thread() {
        let tick = Arc::new(Tick {
            count: AtomicU64::new(0),
        });
        let task = ThreadScheduler::default()
            .schedule_with_fixed_delay(tick.clone(), Duration::ZERO, Duration::from_millis(1))
            .unwrap();
        assert!(wait_until(Duration::from_secs(5), || {
            tick.count.load(Ordering::SeqCst) >= 1
        }));
        drop(task);

        assert!(wait_until(Duration::from_secs(5), || Arc::strong_count(&tick) == 1));
    }
}
