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

//! Immutable statistics snapshots.
//!
//! Samples are plain values copied out of a measurement point while holding its
//! statistics lock, so a reader never observes a partially applied update.

use serde::{Deserialize, Serialize};

/// A snapshot of a Stopwatch. All durations and timestamps are nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopwatchSample {
    /// Name of the stopwatch (empty for a no-op stopwatch).
    pub name: String,
    /// Number of recorded durations.
    pub count: u64,
    /// Sum of recorded durations.
    pub total: u64,
    /// Shortest recorded duration.
    pub min: Option<u64>,
    /// Longest recorded duration.
    pub max: Option<u64>,
    /// Clock reading when the current minimum was recorded.
    pub min_timestamp: Option<u64>,
    /// Clock reading when the current maximum was recorded.
    pub max_timestamp: Option<u64>,
    /// Most recently recorded duration.
    pub last: Option<u64>,
    /// Arithmetic mean of recorded durations.
    pub mean: f64,
    /// Sample variance (n - 1) of recorded durations.
    pub variance: f64,
    /// Splits currently running.
    pub active: u64,
    /// Highest number of concurrently running splits.
    pub max_active: u64,
    /// Clock reading of the first activity.
    pub first_usage: Option<u64>,
    /// Clock reading of the most recent activity.
    pub last_usage: Option<u64>,
}

impl StopwatchSample {
    /// Standard deviation derived from [`StopwatchSample::variance`].
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// A snapshot of a Counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSample {
    /// Name of the counter (empty for a no-op counter).
    pub name: String,
    /// Current running value.
    pub value: i64,
    /// Number of updates applied.
    pub count: u64,
    /// Lowest running value observed after an update.
    pub min: Option<i64>,
    /// Highest running value observed after an update.
    pub max: Option<i64>,
    /// Sum of all increments.
    pub increment_sum: i64,
    /// Sum of all decrements.
    pub decrement_sum: i64,
    /// Clock reading of the first activity.
    pub first_usage: Option<u64>,
    /// Clock reading of the most recent activity.
    pub last_usage: Option<u64>,
}

/// A snapshot of any measurement point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SimonSample {
    /// A stopwatch snapshot.
    Stopwatch(StopwatchSample),
    /// A counter snapshot.
    Counter(CounterSample),
}

impl SimonSample {
    /// The name of the sampled point.
    pub fn name(&self) -> &str {
        match self {
            SimonSample::Stopwatch(s) => &s.name,
            SimonSample::Counter(c) => &c.name,
        }
    }
}
