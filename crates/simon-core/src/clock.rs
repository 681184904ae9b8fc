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

//! Monotonic time sources.
//!
//! Every timestamp in the registry (split start/stop, last usage, purge ticks) is
//! expressed in nanoseconds read from a [`Clock`]. Production code uses the
//! [`SystemClock`]; tests drive a [`ManualClock`] to make staleness deterministic.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic, non-decreasing nanosecond time source.
pub trait Clock: Send + Sync + Debug + 'static {
    /// Returns the current time in nanoseconds relative to the clock's origin.
    fn nanos(&self) -> u64;
}

/// A [`Clock`] backed by [`Instant`], counting from its construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// A hand-driven [`Clock`] for tests and synthetic data.
///
/// The clock never moves backwards: [`ManualClock::set`] ignores values older
/// than the current reading.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `start` nanoseconds.
    pub fn new(start: u64) -> Self {
        Self {
            nanos: AtomicU64::new(start),
        }
    }

    /// Moves the clock forward to `nanos` if that is later than the current reading.
    pub fn set(&self, nanos: u64) {
        self.nanos.fetch_max(nanos, Ordering::SeqCst);
    }

    /// Advances the clock by `by`.
    pub fn advance(&self, by: Duration) {
        self.advance_nanos(by.as_nanos() as u64);
    }

    /// Advances the clock by `nanos` nanoseconds.
    pub fn advance_nanos(&self, nanos: u64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}
