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

//! No-op measurement points handed out when instrumentation is disabled.
//!
//! Every operation returns immediately without touching shared state, so a
//! disabled call site costs a match arm and nothing else.

use crate::stopwatch::Split;
use simon_core::{
    CounterOps, CounterSample, Simon, SimonKind, StopwatchOps, StopwatchSample,
};

/// A Stopwatch that records nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullStopwatch;

impl Simon for NullStopwatch {
    #[inline]
    fn name(&self) -> &str {
        ""
    }

    #[inline]
    fn kind(&self) -> SimonKind {
        SimonKind::Stopwatch
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        false
    }
}

impl StopwatchOps for NullStopwatch {
    type Split = Split;

    #[inline]
    fn start(&self) -> Split {
        Split::disabled()
    }

    #[inline]
    fn add_time(&self, _nanos: u64) {}

    fn sample(&self) -> StopwatchSample {
        StopwatchSample::default()
    }

    fn sample_increment(&self, _key: &str) -> StopwatchSample {
        StopwatchSample::default()
    }

    #[inline]
    fn stop_incremental_sampling(&self, _key: &str) -> bool {
        false
    }

    #[inline]
    fn reset(&self) {}
}

/// A Counter that records nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullCounter;

impl Simon for NullCounter {
    #[inline]
    fn name(&self) -> &str {
        ""
    }

    #[inline]
    fn kind(&self) -> SimonKind {
        SimonKind::Counter
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        false
    }
}

impl CounterOps for NullCounter {
    #[inline]
    fn increment(&self, _delta: i64) {}

    #[inline]
    fn decrement(&self, _delta: i64) {}

    #[inline]
    fn set(&self, _value: i64) {}

    fn sample(&self) -> CounterSample {
        CounterSample::default()
    }

    fn sample_increment(&self, _key: &str) -> CounterSample {
        CounterSample::default()
    }

    #[inline]
    fn stop_incremental_sampling(&self, _key: &str) -> bool {
        false
    }

    #[inline]
    fn reset(&self) {}
}
