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

//! Synthetic population of a manager for tests and demos.
//!
//! Records bulk stopwatch durations and counter updates without waiting on
//! real time.

use crate::manager::Manager;
use simon_core::{CounterOps, SimonResult, StopwatchOps};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Recording {
    Stopwatch { name: String, durations: Vec<u64> },
    Counter { name: String, deltas: Vec<i64> },
}

/// A builder of recordings applied to a [`Manager`] in one go.
#[derive(Debug, Clone, Default)]
pub struct SyntheticData {
    recordings: Vec<Recording>,
}

impl SyntheticData {
    /// Creates an empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records each of `durations` on the stopwatch `name`.
    pub fn stopwatch(mut self, name: impl Into<String>, durations: &[Duration]) -> Self {
        self.recordings.push(Recording::Stopwatch {
            name: name.into(),
            durations: durations
                .iter()
                .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
                .collect(),
        });
        self
    }

    /// Records raw nanosecond durations on the stopwatch `name`.
    pub fn stopwatch_nanos(mut self, name: impl Into<String>, nanos: &[u64]) -> Self {
        self.recordings.push(Recording::Stopwatch {
            name: name.into(),
            durations: nanos.to_vec(),
        });
        self
    }

    /// Drives the counter `name` through the running values `values`, using an
    /// increment or decrement for each step from the previous value (starting at zero).
    pub fn counter_values(mut self, name: impl Into<String>, values: &[i64]) -> Self {
        let mut previous = 0i64;
        let deltas = values
            .iter()
            .map(|value| {
                let delta = value.saturating_sub(previous);
                previous = *value;
                delta
            })
            .collect();
        self.recordings.push(Recording::Counter {
            name: name.into(),
            deltas,
        });
        self
    }

    /// Applies `deltas` to the counter `name`; negative deltas decrement.
    ///
    /// A decrement carries a non-negative amount, so `i64::MIN` is clamped to a
    /// decrement of `i64::MAX`.
    pub fn counter_deltas(mut self, name: impl Into<String>, deltas: &[i64]) -> Self {
        self.recordings.push(Recording::Counter {
            name: name.into(),
            deltas: deltas.to_vec(),
        });
        self
    }

    /// A small fixed data set: stopwatches `A`, `B` and `C` with a few
    /// millisecond-range durations.
    pub fn console_sample() -> Self {
        Self::new()
            .stopwatch(
                "A",
                &[
                    Duration::from_millis(100),
                    Duration::from_millis(200),
                    Duration::from_millis(300),
                ],
            )
            .stopwatch("B", &[Duration::from_millis(200), Duration::from_millis(100)])
            .stopwatch("C", &[Duration::from_millis(300)])
    }

    /// Applies every recording to `manager`, in insertion order.
    ///
    /// Handles are obtained through normal lookups, so the manager's mode applies.
    pub fn populate(&self, manager: &Manager) -> SimonResult<()> {
        for recording in &self.recordings {
            match recording {
                Recording::Stopwatch { name, durations } => {
                    let stopwatch = manager.get_stopwatch(name)?;
                    for nanos in durations {
                        stopwatch.add_time(*nanos);
                    }
                }
                Recording::Counter { name, deltas } => {
                    let counter = manager.get_counter(name)?;
                    for delta in deltas {
                        if *delta >= 0 {
                            counter.increment(*delta);
                        } else {
                            counter.decrement(clamped_magnitude(*delta));
                        }
                    }
                }
            }
        }
        log::debug!("Synthetic data applied ({} recordings)", self.recordings.len());
        Ok(())
    }
}

fn clamped_magnitude(delta: i64) -> i64 {
    i64::try_from(delta.unsigned_abs()).unwrap_or(i64::MAX)
}
