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

//! Handles returned by registry lookups.
//!
//! A handle is a closed, two-variant enum: the real point or its no-op twin.
//! Dispatch is a `match`, so callers never need to check enablement themselves.

use crate::counter::Counter;
use crate::null::{NullCounter, NullStopwatch};
use crate::stopwatch::{Split, Stopwatch};
use simon_core::{
    CounterOps, CounterSample, Simon, SimonKind, SplitOps, StopwatchOps, StopwatchSample,
};

/// A Stopwatch-capability handle.
#[derive(Debug, Clone)]
pub enum StopwatchHandle {
    /// Writes accumulate on the registered stopwatch.
    Live(Stopwatch),
    /// Writes are discarded.
    Null(NullStopwatch),
}

impl StopwatchHandle {
    /// Whether this handle refers to a real stopwatch.
    pub fn is_live(&self) -> bool {
        matches!(self, StopwatchHandle::Live(_))
    }

    /// The underlying stopwatch, if live.
    pub fn as_live(&self) -> Option<&Stopwatch> {
        match self {
            StopwatchHandle::Live(sw) => Some(sw),
            StopwatchHandle::Null(_) => None,
        }
    }

    /// Returns `true` if both handles are live and share one statistics block.
    pub fn same_point(&self, other: &StopwatchHandle) -> bool {
        match (self, other) {
            (StopwatchHandle::Live(a), StopwatchHandle::Live(b)) => a.same_as(b),
            _ => false,
        }
    }

    /// Runs `f` inside a split and returns its result.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let split = self.start();
        let result = f();
        split.stop();
        result
    }
}

impl Simon for StopwatchHandle {
    fn name(&self) -> &str {
        match self {
            StopwatchHandle::Live(sw) => sw.name(),
            StopwatchHandle::Null(sw) => sw.name(),
        }
    }

    fn kind(&self) -> SimonKind {
        SimonKind::Stopwatch
    }

    fn is_enabled(&self) -> bool {
        self.is_live()
    }
}

impl StopwatchOps for StopwatchHandle {
    type Split = Split;

    #[inline]
    fn start(&self) -> Split {
        match self {
            StopwatchHandle::Live(sw) => sw.start(),
            StopwatchHandle::Null(sw) => sw.start(),
        }
    }

    #[inline]
    fn add_time(&self, nanos: u64) {
        match self {
            StopwatchHandle::Live(sw) => sw.add_time(nanos),
            StopwatchHandle::Null(sw) => sw.add_time(nanos),
        }
    }

    fn sample(&self) -> StopwatchSample {
        match self {
            StopwatchHandle::Live(sw) => sw.sample(),
            StopwatchHandle::Null(sw) => sw.sample(),
        }
    }

    fn sample_increment(&self, key: &str) -> StopwatchSample {
        match self {
            StopwatchHandle::Live(sw) => sw.sample_increment(key),
            StopwatchHandle::Null(sw) => sw.sample_increment(key),
        }
    }

    fn stop_incremental_sampling(&self, key: &str) -> bool {
        match self {
            StopwatchHandle::Live(sw) => sw.stop_incremental_sampling(key),
            StopwatchHandle::Null(sw) => sw.stop_incremental_sampling(key),
        }
    }

    fn reset(&self) {
        match self {
            StopwatchHandle::Live(sw) => sw.reset(),
            StopwatchHandle::Null(sw) => sw.reset(),
        }
    }
}

/// A Counter-capability handle.
#[derive(Debug, Clone)]
pub enum CounterHandle {
    /// Writes accumulate on the registered counter.
    Live(Counter),
    /// Writes are discarded.
    Null(NullCounter),
}

impl CounterHandle {
    /// Whether this handle refers to a real counter.
    pub fn is_live(&self) -> bool {
        matches!(self, CounterHandle::Live(_))
    }

    /// The underlying counter, if live.
    pub fn as_live(&self) -> Option<&Counter> {
        match self {
            CounterHandle::Live(c) => Some(c),
            CounterHandle::Null(_) => None,
        }
    }

    /// Returns `true` if both handles are live and share one statistics block.
    pub fn same_point(&self, other: &CounterHandle) -> bool {
        match (self, other) {
            (CounterHandle::Live(a), CounterHandle::Live(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl Simon for CounterHandle {
    fn name(&self) -> &str {
        match self {
            CounterHandle::Live(c) => c.name(),
            CounterHandle::Null(c) => c.name(),
        }
    }

    fn kind(&self) -> SimonKind {
        SimonKind::Counter
    }

    fn is_enabled(&self) -> bool {
        self.is_live()
    }
}

impl CounterOps for CounterHandle {
    #[inline]
    fn increment(&self, delta: i64) {
        match self {
            CounterHandle::Live(c) => c.increment(delta),
            CounterHandle::Null(c) => c.increment(delta),
        }
    }

    #[inline]
    fn decrement(&self, delta: i64) {
        match self {
            CounterHandle::Live(c) => c.decrement(delta),
            CounterHandle::Null(c) => c.decrement(delta),
        }
    }

    #[inline]
    fn set(&self, value: i64) {
        match self {
            CounterHandle::Live(c) => c.set(value),
            CounterHandle::Null(c) => c.set(value),
        }
    }

    fn sample(&self) -> CounterSample {
        match self {
            CounterHandle::Live(c) => c.sample(),
            CounterHandle::Null(c) => c.sample(),
        }
    }

    fn sample_increment(&self, key: &str) -> CounterSample {
        match self {
            CounterHandle::Live(c) => c.sample_increment(key),
            CounterHandle::Null(c) => c.sample_increment(key),
        }
    }

    fn stop_incremental_sampling(&self, key: &str) -> bool {
        match self {
            CounterHandle::Live(c) => c.stop_incremental_sampling(key),
            CounterHandle::Null(c) => c.stop_incremental_sampling(key),
        }
    }

    fn reset(&self) {
        match self {
            CounterHandle::Live(c) => c.reset(),
            CounterHandle::Null(c) => c.reset(),
        }
    }
}
