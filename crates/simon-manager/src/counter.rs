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

//! The accumulating Counter.

use crate::stats::{CounterStats, Incremental};
use crate::sync::lock;
use simon_core::{Clock, CounterOps, CounterSample, Simon, SimonKind};
use std::fmt;
use std::sync::{Arc, Mutex};

struct CounterCore {
    name: String,
    clock: Arc<dyn Clock>,
    created: u64,
    stats: Mutex<Incremental<CounterStats>>,
}

/// A Counter tracking a running value and the extrema of that running value.
///
/// Cloning is cheap and yields a handle to the same statistics block.
#[derive(Clone)]
pub struct Counter {
    core: Arc<CounterCore>,
}

impl Counter {
    pub(crate) fn new(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let created = clock.nanos();
        Self {
            core: Arc::new(CounterCore {
                name: name.into(),
                clock,
                created,
                stats: Mutex::new(Incremental::default()),
            }),
        }
    }

    /// Returns `true` if both handles refer to the same statistics block.
    pub fn same_as(&self, other: &Counter) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// The current running value.
    pub fn value(&self) -> i64 {
        lock(&self.core.stats).current().value
    }

    /// Clock reading of the last activity, or of creation if never used.
    pub fn last_activity(&self) -> u64 {
        lock(&self.core.stats)
            .last_usage()
            .unwrap_or(self.core.created)
    }

    /// Number of tracked incremental-sampling keys.
    pub fn incremental_keys(&self) -> usize {
        lock(&self.core.stats).key_count()
    }

    pub(crate) fn is_stale(&self, threshold: u64) -> bool {
        self.last_activity() < threshold
    }

    pub(crate) fn purge_increments_older_than(&self, threshold: u64) -> usize {
        lock(&self.core.stats).purge_older_than(threshold)
    }

    fn apply(&self, compute: impl FnOnce(i64) -> i64, delta_increment: i64, delta_decrement: i64) {
        let now = self.core.clock.nanos();
        let mut stats = lock(&self.core.stats);
        let value = compute(stats.current().value);
        stats.update(|s| {
            s.increment_sum = s.increment_sum.saturating_add(delta_increment);
            s.decrement_sum = s.decrement_sum.saturating_add(delta_decrement);
            s.apply(value, now);
        });
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("name", &self.core.name)
            .field("created", &self.core.created)
            .finish_non_exhaustive()
    }
}

impl Simon for Counter {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn kind(&self) -> SimonKind {
        SimonKind::Counter
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

impl CounterOps for Counter {
    fn increment(&self, delta: i64) {
        self.apply(|value| value.saturating_add(delta), delta, 0);
    }

    fn decrement(&self, delta: i64) {
        self.apply(|value| value.saturating_sub(delta), 0, delta);
    }

    fn set(&self, value: i64) {
        self.apply(|_| value, 0, 0);
    }

    fn sample(&self) -> CounterSample {
        lock(&self.core.stats).current().to_sample(&self.core.name)
    }

    fn sample_increment(&self, key: &str) -> CounterSample {
        let now = self.core.clock.nanos();
        lock(&self.core.stats)
            .sample_increment(key, now)
            .to_sample(&self.core.name)
    }

    fn stop_incremental_sampling(&self, key: &str) -> bool {
        lock(&self.core.stats).stop(key)
    }

    fn reset(&self) {
        let now = self.core.clock.nanos();
        let mut stats = lock(&self.core.stats);
        stats.reset();
        stats.update(|s| {
            s.value = 0;
            s.first_usage.get_or_insert(now);
            s.last_usage = Some(now);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::ManualClock;
    use std::thread;

    fn counter() -> (Counter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (Counter::new("test.counter", clock.clone()), clock)
    }

    #[test]
    fn test_running_sum_extrema() {
        let (c, _) = counter();
        c.increment(5);
        c.decrement(2);
        c.increment(6);

        let sample = c.sample();
        assert_eq!(sample.value, 9);
        assert_eq!(sample.count, 3);
        assert_eq!(sample.min, Some(3));
        assert_eq!(sample.max, Some(9));
        assert_eq!(sample.increment_sum, 11);
        assert_eq!(sample.decrement_sum, 2);
    }

    #[test]
    fn test_extrema_follow_running_value_not_deltas() {
        let (c, _) = counter();
        c.increment(100);
        c.decrement(1);
        c.decrement(1);

        let sample = c.sample();
        assert_eq!(sample.min, Some(98), "min is the lowest running value, not the smallest delta");
        assert_eq!(sample.max, Some(100));
    }

    #[test]
    fn test_set_and_reset() {
        let (c, clock) = counter();
        c.set(-4);
        assert_eq!(c.value(), -4);
        assert_eq!(c.sample().min, Some(-4));

        clock.advance_nanos(3);
        c.reset();
        let sample = c.sample();
        assert_eq!(sample.value, 0);
        assert_eq!(sample.count, 0);
        assert_eq!(sample.min, None);
        assert_eq!(sample.last_usage, Some(3));
    }

    #[test]
    fn test_sample_increment_keeps_running_value() {
        let (c, _) = counter();
        c.increment(10);
        assert_eq!(c.sample_increment("k").value, 10);

        c.increment(5);
        let increment = c.sample_increment("k");
        assert_eq!(increment.value, 15);
        assert_eq!(increment.count, 1);
        assert_eq!(increment.increment_sum, 5);

        let idle = c.sample_increment("k");
        assert_eq!(idle.value, 15);
        assert_eq!(idle.count, 0);
        assert!(c.stop_incremental_sampling("k"));
    }

    #[test]
    fn test_concurrent_increments() {
        let (c, _) = counter();
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let c = c.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        c.increment(2);
                        c.decrement(1);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let sample = c.sample();
        assert_eq!(sample.value, 2_000);
        assert_eq!(sample.count, 4_000);
    }
}
