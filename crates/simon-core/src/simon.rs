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

//! The measurement-point capability set.
//!
//! A Simon is either a Stopwatch (elapsed-duration statistics) or a Counter
//! (running sum with extrema). Both a real, accumulating implementation and a
//! no-op implementation satisfy these traits, so call sites never branch on
//! whether instrumentation is enabled.

use crate::sample::{CounterSample, StopwatchSample};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The kind of entity registered under a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimonKind {
    /// Accumulates elapsed-duration statistics.
    Stopwatch,
    /// Accumulates a running sum with extrema.
    Counter,
    /// A plain namespace node with no measurement point attached.
    Unknown,
}

impl Display for SimonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimonKind::Stopwatch => f.write_str("stopwatch"),
            SimonKind::Counter => f.write_str("counter"),
            SimonKind::Unknown => f.write_str("unknown"),
        }
    }
}

/// The enablement configured on a namespace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimonState {
    /// Take the state of the nearest explicitly configured ancestor.
    #[default]
    Inherit,
    /// Explicitly enabled.
    Enabled,
    /// Explicitly disabled.
    Disabled,
}

impl SimonState {
    /// Returns `true` unless the state is [`SimonState::Inherit`].
    pub fn is_explicit(self) -> bool {
        self != SimonState::Inherit
    }
}

/// Behaviour common to every measurement point.
pub trait Simon: Send + Sync {
    /// The full hierarchical name, or `""` for a no-op point.
    fn name(&self) -> &str;

    /// The kind of this point.
    fn kind(&self) -> SimonKind;

    /// Whether writes to this point accumulate.
    fn is_enabled(&self) -> bool;
}

/// A running measurement obtained from [`StopwatchOps::start`].
pub trait SplitOps {
    /// Whether stopping this split records anything.
    fn is_enabled(&self) -> bool;

    /// Clock reading when the split was started.
    fn start_nanos(&self) -> u64;

    /// Nanoseconds elapsed since the split was started.
    fn running_for(&self) -> u64;

    /// Stops the split, records it on the owning stopwatch and returns its duration.
    fn stop(self) -> u64;
}

/// The Stopwatch capability.
pub trait StopwatchOps: Simon {
    /// The split handle type produced by [`StopwatchOps::start`].
    type Split: SplitOps;

    /// Starts a new split.
    fn start(&self) -> Self::Split;

    /// Records a duration directly, bypassing split tracking.
    fn add_time(&self, nanos: u64);

    /// Returns a consistent snapshot of the accumulated statistics.
    fn sample(&self) -> StopwatchSample;

    /// Returns statistics accumulated since the previous call with the same key.
    ///
    /// The first call for a key starts tracking it and returns the cumulative sample.
    fn sample_increment(&self, key: &str) -> StopwatchSample;

    /// Stops tracking an incremental key. Returns `false` if it was not tracked.
    fn stop_incremental_sampling(&self, key: &str) -> bool;

    /// Clears the accumulated statistics.
    fn reset(&self);
}

/// The Counter capability.
pub trait CounterOps: Simon {
    /// Adds `delta` to the running value.
    fn increment(&self, delta: i64);

    /// Subtracts `delta` from the running value.
    fn decrement(&self, delta: i64);

    /// Sets the running value.
    fn set(&self, value: i64);

    /// Returns a consistent snapshot of the accumulated statistics.
    fn sample(&self) -> CounterSample;

    /// Returns statistics accumulated since the previous call with the same key.
    ///
    /// The first call for a key starts tracking it and returns the cumulative sample.
    fn sample_increment(&self, key: &str) -> CounterSample;

    /// Stops tracking an incremental key. Returns `false` if it was not tracked.
    fn stop_incremental_sampling(&self, key: &str) -> bool;

    /// Clears the accumulated statistics.
    fn reset(&self);
}
