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

//! The accumulating Stopwatch and its split handle.

use crate::stats::{Incremental, StopwatchStats};
use crate::sync::lock;
use simon_core::{Clock, Simon, SimonKind, SplitOps, StopwatchOps, StopwatchSample};
use std::fmt;
use std::sync::{Arc, Mutex};

struct StopwatchCore {
    name: String,
    clock: Arc<dyn Clock>,
    created: u64,
    stats: Mutex<Incremental<StopwatchStats>>,
}

impl StopwatchCore {
    fn record_split(&self, nanos: u64, now: u64) {
        lock(&self.stats).update(|s| {
            s.split_stopped();
            s.record(nanos, now);
        });
    }
}

/// A Stopwatch accumulating elapsed-duration statistics.
///
/// Cloning is cheap and yields a handle to the same statistics block.
#[derive(Clone)]
pub struct Stopwatch {
    core: Arc<StopwatchCore>,
}

impl Stopwatch {
    pub(crate) fn new(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let created = clock.nanos();
        Self {
            core: Arc::new(StopwatchCore {
                name: name.into(),
                clock,
                created,
                stats: Mutex::new(Incremental::default()),
            }),
        }
    }

    /// Returns `true` if both handles refer to the same statistics block.
    pub fn same_as(&self, other: &Stopwatch) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Clock reading of the last activity, or of creation if never used.
    pub fn last_activity(&self) -> u64 {
        lock(&self.core.stats)
            .last_usage()
            .unwrap_or(self.core.created)
    }

    /// Number of splits currently running.
    pub fn active(&self) -> u64 {
        lock(&self.core.stats).current().active
    }

    /// Number of tracked incremental-sampling keys.
    pub fn incremental_keys(&self) -> usize {
        lock(&self.core.stats).key_count()
    }

    /// Idle since before `threshold` and no split running.
    pub(crate) fn is_stale(&self, threshold: u64) -> bool {
        let stats = lock(&self.core.stats);
        let last = stats.last_usage().unwrap_or(self.core.created);
        stats.current().active == 0 && last < threshold
    }

    pub(crate) fn purge_increments_older_than(&self, threshold: u64) -> usize {
        lock(&self.core.stats).purge_older_than(threshold)
    }

    /// Runs `f` inside a split and returns its result.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let split = self.start();
        let result = f();
        split.stop();
        result
    }
}

impl fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stopwatch")
            .field("name", &self.core.name)
            .field("created", &self.core.created)
            .finish_non_exhaustive()
    }
}

impl Simon for Stopwatch {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn kind(&self) -> SimonKind {
        SimonKind::Stopwatch
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

impl StopwatchOps for Stopwatch {
    type Split = Split;

    fn start(&self) -> Split {
        let now = self.core.clock.nanos();
        lock(&self.core.stats).update(|s| s.split_started(now));
        Split {
            target: Some(Arc::clone(&self.core)),
            start: now,
            stopped: false,
        }
    }

    fn add_time(&self, nanos: u64) {
        let now = self.core.clock.nanos();
        lock(&self.core.stats).update(|s| s.record(nanos, now));
    }

    fn sample(&self) -> StopwatchSample {
        lock(&self.core.stats).current().to_sample(&self.core.name)
    }

    fn sample_increment(&self, key: &str) -> StopwatchSample {
        let now = self.core.clock.nanos();
        let mut stats = lock(&self.core.stats);
        let increment = stats.sample_increment(key, now);
        let mut sample = increment.to_sample(&self.core.name);
        sample.active = stats.current().active;
        sample
    }

    fn stop_incremental_sampling(&self, key: &str) -> bool {
        lock(&self.core.stats).stop(key)
    }

    fn reset(&self) {
        let now = self.core.clock.nanos();
        let mut stats = lock(&self.core.stats);
        stats.reset();
        stats.update(|s| s.touch(now));
    }
}

/// A running split.
///
/// Stopping records the elapsed time on the stopwatch that produced it, even if
/// that stopwatch was disabled or purged from the registry in the meantime. A
/// split dropped without calling [`SplitOps::stop`] is stopped on drop. Splits
/// produced by a no-op stopwatch record nothing.
pub struct Split {
    target: Option<Arc<StopwatchCore>>,
    start: u64,
    stopped: bool,
}

impl Split {
    pub(crate) fn disabled() -> Self {
        Self {
            target: None,
            start: 0,
            stopped: true,
        }
    }

    fn finish(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;
        match &self.target {
            Some(core) => {
                let now = core.clock.nanos();
                let elapsed = now.saturating_sub(self.start);
                core.record_split(elapsed, now);
                elapsed
            }
            None => 0,
        }
    }
}

impl SplitOps for Split {
    fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    fn start_nanos(&self) -> u64 {
        self.start
    }

    fn running_for(&self) -> u64 {
        match &self.target {
            Some(core) if !self.stopped => core.clock.nanos().saturating_sub(self.start),
            _ => 0,
        }
    }

    fn stop(mut self) -> u64 {
        self.finish()
    }
}

impl Drop for Split {
    fn drop(&mut self) {
        self.finish();
    }
}

impl fmt::Debug for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Split")
            .field("stopwatch", &self.target.as_ref().map(|c| c.name.as_str()))
            .field("start", &self.start)
            .field("stopped", &self.stopped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::ManualClock;
    use std::thread;

    fn stopwatch_with_clock(start: u64) -> (Stopwatch, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        (Stopwatch::new("test.stopwatch", clock.clone()), clock)
    }

    #[test]
    fn test_add_time_accumulates() {
        let (sw, _) = stopwatch_with_clock(0);
        sw.add_time(100);
        sw.add_time(200);
        sw.add_time(300);

        let sample = sw.sample();
        assert_eq!(sample.name, "test.stopwatch");
        assert_eq!(sample.count, 3);
        assert_eq!(sample.total, 600);
        assert_eq!(sample.min, Some(100));
        assert_eq!(sample.max, Some(300));
    }

    #[test]
    fn test_split_measures_clock_time() {
        let (sw, clock) = stopwatch_with_clock(1_000);
        let split = sw.start();
        assert_eq!(sw.active(), 1);

        clock.advance_nanos(250);
        assert_eq!(split.running_for(), 250);
        assert_eq!(split.stop(), 250);

        let sample = sw.sample();
        assert_eq!(sample.count, 1);
        assert_eq!(sample.total, 250);
        assert_eq!(sample.active, 0);
        assert_eq!(sample.max_active, 1);
        assert_eq!(sample.last_usage, Some(1_250));
    }

    #[test]
    fn test_dropped_split_is_recorded() {
        let (sw, clock) = stopwatch_with_clock(0);
        {
            let _split = sw.start();
            clock.advance_nanos(40);
        }
        assert_eq!(sw.sample().total, 40);
    }

    #[test]
    fn test_time_closure() {
        let (sw, clock) = stopwatch_with_clock(0);
        let value = sw.time(|| {
            clock.advance_nanos(7);
            42
        });
        assert_eq!(value, 42);
        assert_eq!(sw.sample().total, 7);
    }

    #[test]
    fn test_staleness_respects_running_splits() {
        let (sw, clock) = stopwatch_with_clock(0);
        let split = sw.start();
        clock.advance_nanos(1_000);
        assert!(!sw.is_stale(500), "a running split keeps the stopwatch alive");
        split.stop();
        clock.advance_nanos(1_000);
        assert!(sw.is_stale(1_500));
        assert!(!sw.is_stale(1_000));
    }

    #[test]
    fn test_clones_share_statistics() {
        let (sw, _) = stopwatch_with_clock(0);
        let other = sw.clone();
        other.add_time(5);
        assert!(sw.same_as(&other));
        assert_eq!(sw.sample().count, 1);
    }

    #[test]
    fn test_concurrent_writers_lose_no_updates() {
        let clock: Arc<dyn Clock> = Arc::new(simon_core::SystemClock::new());
        let sw = Stopwatch::new("concurrent", clock);
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let sw = sw.clone();
                thread::spawn(move || {
                    for i in 0..1_000 {
                        if i % 2 == 0 {
                            sw.add_time(10);
                        } else {
                            sw.start().stop();
                        }
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let sample = sw.sample();
        assert_eq!(sample.count, 8_000);
        assert_eq!(sample.active, 0);
    }

    #[test]
    fn test_reset_clears_statistics() {
        let (sw, clock) = stopwatch_with_clock(10);
        sw.add_time(100);
        clock.advance_nanos(5);
        sw.reset();

        let sample = sw.sample();
        assert_eq!(sample.count, 0);
        assert_eq!(sample.min, None);
        assert_eq!(sample.last_usage, Some(15));
    }

    #[test]
    fn test_sample_increment() {
        let (sw, clock) = stopwatch_with_clock(0);
        sw.add_time(10);
        assert_eq!(sw.sample_increment("console").count, 1);

        sw.add_time(20);
        clock.advance_nanos(10);
        let increment = sw.sample_increment("console");
        assert_eq!(increment.count, 1);
        assert_eq!(increment.total, 20);
        assert_eq!(sw.incremental_keys(), 1);

        assert_eq!(sw.purge_increments_older_than(100), 1);
        assert_eq!(sw.incremental_keys(), 0);
    }
}
