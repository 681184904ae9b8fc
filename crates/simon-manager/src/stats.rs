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

//! Statistics accumulators guarded by each point's own lock.
//!
//! An [`Incremental`] holds the cumulative accumulator of a point together with
//! one accumulator per incremental-sampling key. Every write is applied to all
//! of them, so `sample_increment` can hand out exact min/max values for the
//! period since the previous call.

use simon_core::{CounterSample, StopwatchSample};
use std::collections::HashMap;

/// Shared behaviour of the per-point accumulators.
pub(crate) trait Accumulator: Default + Clone {
    /// A fresh accumulator carrying only the live state of `current`
    /// (running splits, the running counter value).
    fn fresh_from(current: &Self) -> Self;

    /// Clock reading of the last activity, if any.
    fn last_usage(&self) -> Option<u64>;
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StopwatchStats {
    pub count: u64,
    pub total: u64,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub min_timestamp: Option<u64>,
    pub max_timestamp: Option<u64>,
    pub last: Option<u64>,
    mean: f64,
    m2: f64,
    pub active: u64,
    pub max_active: u64,
    pub first_usage: Option<u64>,
    pub last_usage: Option<u64>,
}

impl StopwatchStats {
    pub fn record(&mut self, nanos: u64, now: u64) {
        self.count += 1;
        self.total = self.total.saturating_add(nanos);
        if self.min.map_or(true, |min| nanos < min) {
            self.min = Some(nanos);
            self.min_timestamp = Some(now);
        }
        if self.max.map_or(true, |max| nanos > max) {
            self.max = Some(nanos);
            self.max_timestamp = Some(now);
        }
        self.last = Some(nanos);

        // Welford's online update.
        let x = nanos as f64;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);

        self.touch(now);
    }

    pub fn split_started(&mut self, now: u64) {
        self.active += 1;
        self.max_active = self.max_active.max(self.active);
        self.touch(now);
    }

    pub fn split_stopped(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    pub fn touch(&mut self, now: u64) {
        self.first_usage.get_or_insert(now);
        self.last_usage = Some(now);
    }

    pub fn to_sample(&self, name: &str) -> StopwatchSample {
        let variance = if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        };
        StopwatchSample {
            name: name.to_string(),
            count: self.count,
            total: self.total,
            min: self.min,
            max: self.max,
            min_timestamp: self.min_timestamp,
            max_timestamp: self.max_timestamp,
            last: self.last,
            mean: self.mean,
            variance,
            active: self.active,
            max_active: self.max_active,
            first_usage: self.first_usage,
            last_usage: self.last_usage,
        }
    }
}

impl Accumulator for StopwatchStats {
    fn fresh_from(current: &Self) -> Self {
        Self {
            active: current.active,
            max_active: current.active,
            ..Default::default()
        }
    }

    fn last_usage(&self) -> Option<u64> {
        self.last_usage
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CounterStats {
    pub value: i64,
    pub count: u64,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub increment_sum: i64,
    pub decrement_sum: i64,
    pub first_usage: Option<u64>,
    pub last_usage: Option<u64>,
}

impl CounterStats {
    /// Applies an update that left the running value at `value`.
    pub fn apply(&mut self, value: i64, now: u64) {
        self.value = value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
        self.first_usage.get_or_insert(now);
        self.last_usage = Some(now);
    }

    pub fn to_sample(&self, name: &str) -> CounterSample {
        CounterSample {
            name: name.to_string(),
            value: self.value,
            count: self.count,
            min: self.min,
            max: self.max,
            increment_sum: self.increment_sum,
            decrement_sum: self.decrement_sum,
            first_usage: self.first_usage,
            last_usage: self.last_usage,
        }
    }
}

impl Accumulator for CounterStats {
    fn fresh_from(current: &Self) -> Self {
        Self {
            value: current.value,
            ..Default::default()
        }
    }

    fn last_usage(&self) -> Option<u64> {
        self.last_usage
    }
}

#[derive(Debug, Clone)]
struct IncrementSlot<S> {
    stats: S,
    last_access: u64,
}

/// The cumulative accumulator plus one accumulator per incremental key.
#[derive(Debug, Default)]
pub(crate) struct Incremental<S> {
    current: S,
    slots: HashMap<String, IncrementSlot<S>>,
}

impl<S: Accumulator> Incremental<S> {
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Applies `update` to the cumulative accumulator and every tracked key.
    #[inline]
    pub fn update(&mut self, mut update: impl FnMut(&mut S)) {
        update(&mut self.current);
        for slot in self.slots.values_mut() {
            update(&mut slot.stats);
        }
    }

    /// Returns what accumulated for `key` since its previous call.
    pub fn sample_increment(&mut self, key: &str, now: u64) -> S {
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.last_access = now;
                std::mem::replace(&mut slot.stats, S::fresh_from(&self.current))
            }
            None => {
                self.slots.insert(
                    key.to_string(),
                    IncrementSlot {
                        stats: S::fresh_from(&self.current),
                        last_access: now,
                    },
                );
                self.current.clone()
            }
        }
    }

    pub fn stop(&mut self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    /// Drops keys not sampled since `threshold`. Returns how many were dropped.
    pub fn purge_older_than(&mut self, threshold: u64) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.last_access >= threshold);
        before - self.slots.len()
    }

    pub fn key_count(&self) -> usize {
        self.slots.len()
    }

    /// Clears every accumulator while keeping live state and tracked keys.
    pub fn reset(&mut self) {
        self.current = S::fresh_from(&self.current);
        let fresh = S::fresh_from(&self.current);
        for slot in self.slots.values_mut() {
            slot.stats = fresh.clone();
        }
    }

    pub fn last_usage(&self) -> Option<u64> {
        self.current.last_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_stats_track_extrema_and_mean() {
        let mut stats = StopwatchStats::default();
        stats.record(100, 1);
        stats.record(300, 2);
        stats.record(200, 3);

        let sample = stats.to_sample("s");
        assert_eq!(sample.count, 3);
        assert_eq!(sample.total, 600);
        assert_eq!(sample.min, Some(100));
        assert_eq!(sample.min_timestamp, Some(1));
        assert_eq!(sample.max, Some(300));
        assert_eq!(sample.max_timestamp, Some(2));
        assert_eq!(sample.last, Some(200));
        assert!((sample.mean - 200.0).abs() < f64::EPSILON);
        assert!((sample.variance - 10_000.0).abs() < 1e-6);
        assert_eq!(sample.first_usage, Some(1));
        assert_eq!(sample.last_usage, Some(3));
    }

    #[test]
    fn counter_stats_track_running_value_extrema() {
        let mut stats = CounterStats::default();
        stats.apply(5, 1);
        stats.apply(3, 2);
        stats.apply(9, 3);

        let sample = stats.to_sample("c");
        assert_eq!(sample.value, 9);
        assert_eq!(sample.count, 3);
        assert_eq!(sample.min, Some(3));
        assert_eq!(sample.max, Some(9));
    }

    #[test]
    fn incremental_keys_see_only_their_period() {
        let mut inc = Incremental::<StopwatchStats>::default();
        inc.update(|s| s.record(10, 1));

        let first = inc.sample_increment("report", 2);
        assert_eq!(first.count, 1, "first call returns the cumulative stats");

        inc.update(|s| s.record(50, 3));
        inc.update(|s| s.record(70, 4));

        let second = inc.sample_increment("report", 5);
        assert_eq!(second.count, 2);
        assert_eq!(second.min, Some(50));
        assert_eq!(second.max, Some(70));

        let third = inc.sample_increment("report", 6);
        assert_eq!(third.count, 0);
        assert_eq!(inc.current().count, 3);
    }

    #[test]
    fn incremental_purge_drops_idle_keys() {
        let mut inc = Incremental::<CounterStats>::default();
        inc.sample_increment("old", 10);
        inc.sample_increment("new", 100);

        assert_eq!(inc.purge_older_than(50), 1);
        assert_eq!(inc.key_count(), 1);
        assert!(inc.stop("new"));
        assert!(!inc.stop("new"));
    }

    #[test]
    fn reset_keeps_running_splits() {
        let mut inc = Incremental::<StopwatchStats>::default();
        inc.update(|s| s.split_started(1));
        inc.update(|s| s.record(42, 2));
        inc.reset();

        assert_eq!(inc.current().count, 0);
        assert_eq!(inc.current().active, 1);
    }
}
