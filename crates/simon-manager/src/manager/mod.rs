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

//! The Simon registry.
//!
//! A [`Manager`] owns a [`Namespace`] and every measurement point attached to
//! it. Lookups create missing points and return a handle chosen by the current
//! [`ManagerMode`]; from then on the caller writes to the handle directly and
//! the manager is not involved again.

mod mode;

pub use mode::ManagerMode;

use crate::config::ManagerConfig;
use crate::counter::Counter;
use crate::handle::{CounterHandle, StopwatchHandle};
use crate::namespace::{Entry, NodeInfo, Namespace};
use crate::null::{NullCounter, NullStopwatch};
use crate::stopwatch::Stopwatch;
use simon_core::{
    Clock, CounterOps, CounterSample, SimonKind, SimonResult, SimonSample, SimonState,
    StopwatchOps, StopwatchSample, SystemClock,
};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// The registry of measurement points.
pub struct Manager {
    mode: AtomicU8,
    namespace: Namespace,
    clock: Arc<dyn Clock>,
    config: ManagerConfig,
    purge_cursor: AtomicUsize,
}

impl Manager {
    /// Creates an empty manager in `mode` driven by the system clock.
    pub fn new(mode: ManagerMode) -> Self {
        Self::with_clock(mode, Arc::new(SystemClock::new()))
    }

    /// Creates an empty manager in `mode` driven by `clock`.
    pub fn with_clock(mode: ManagerMode, clock: Arc<dyn Clock>) -> Self {
        Self::from_config_with_clock(ManagerConfig::default().with_mode(mode), clock)
    }

    /// Creates a manager from `config` driven by the system clock.
    pub fn from_config(config: ManagerConfig) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Creates a manager from `config` driven by `clock`.
    ///
    /// Overrides with an invalid name are skipped with a warning.
    pub fn from_config_with_clock(config: ManagerConfig, clock: Arc<dyn Clock>) -> Self {
        let manager = Self {
            mode: AtomicU8::new(config.mode.to_u8()),
            namespace: Namespace::new(),
            clock,
            purge_cursor: AtomicUsize::new(0),
            config,
        };
        manager.apply_overrides();
        log::info!(
            "Simon manager created (mode: {}, {} overrides)",
            manager.mode(),
            manager.config.overrides.len()
        );
        manager
    }

    fn apply_overrides(&self) {
        for (name, state) in &self.config.overrides {
            if let Err(e) = self.namespace.set_state(name, *state) {
                log::warn!("Ignoring configured override: {e}");
            }
        }
    }

    /// The current mode.
    pub fn mode(&self) -> ManagerMode {
        ManagerMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Switches the mode, keeping every stored point. Returns the previous mode.
    ///
    /// Handles returned before the switch keep referring to what they referred to.
    pub fn set_mode(&self, mode: ManagerMode) -> ManagerMode {
        let previous = ManagerMode::from_u8(self.mode.swap(mode.to_u8(), Ordering::AcqRel));
        if previous != mode {
            log::info!("Simon manager mode switched: {previous} -> {mode}");
        }
        previous
    }

    /// Returns a Stopwatch handle for `name`, creating the point if absent.
    ///
    /// In [`ManagerMode::Disabled`] this always returns a no-op handle and never fails.
    pub fn get_stopwatch(&self, name: &str) -> SimonResult<StopwatchHandle> {
        let mode = self.mode();
        if mode == ManagerMode::Disabled {
            return Ok(StopwatchHandle::Null(NullStopwatch));
        }
        let (entry, enabled) = self.namespace.get_or_attach(name, SimonKind::Stopwatch, || {
            Entry::Stopwatch(Stopwatch::new(name, Arc::clone(&self.clock)))
        })?;
        let Entry::Stopwatch(stopwatch) = entry else {
            return Ok(StopwatchHandle::Null(NullStopwatch));
        };
        Ok(if mode == ManagerMode::Enabled || enabled {
            StopwatchHandle::Live(stopwatch)
        } else {
            StopwatchHandle::Null(NullStopwatch)
        })
    }

    /// Returns a Counter handle for `name`, creating the point if absent.
    ///
    /// In [`ManagerMode::Disabled`] this always returns a no-op handle and never fails.
    pub fn get_counter(&self, name: &str) -> SimonResult<CounterHandle> {
        let mode = self.mode();
        if mode == ManagerMode::Disabled {
            return Ok(CounterHandle::Null(NullCounter));
        }
        let (entry, enabled) = self.namespace.get_or_attach(name, SimonKind::Counter, || {
            Entry::Counter(Counter::new(name, Arc::clone(&self.clock)))
        })?;
        let Entry::Counter(counter) = entry else {
            return Ok(CounterHandle::Null(NullCounter));
        };
        Ok(if mode == ManagerMode::Enabled || enabled {
            CounterHandle::Live(counter)
        } else {
            CounterHandle::Null(NullCounter)
        })
    }

    /// Explicitly enables `name` and, by inheritance, its subtree.
    ///
    /// Only meaningful in [`ManagerMode::Switching`]; otherwise returns `Ok(false)`.
    pub fn enable(&self, name: &str) -> SimonResult<bool> {
        self.set_state(name, SimonState::Enabled)
    }

    /// Explicitly disables `name` and, by inheritance, its subtree.
    ///
    /// Only meaningful in [`ManagerMode::Switching`]; otherwise returns `Ok(false)`.
    pub fn disable(&self, name: &str) -> SimonResult<bool> {
        self.set_state(name, SimonState::Disabled)
    }

    /// Drops the explicit state of `name` so it inherits again.
    pub fn inherit(&self, name: &str) -> SimonResult<bool> {
        self.set_state(name, SimonState::Inherit)
    }

    fn set_state(&self, name: &str, state: SimonState) -> SimonResult<bool> {
        let mode = self.mode();
        if mode != ManagerMode::Switching {
            log::debug!("Ignoring state change of '{name}' to {state:?} in {mode} mode");
            return Ok(false);
        }
        self.namespace.set_state(name, state)?;
        log::debug!("Simon '{name}' set to {state:?}");
        Ok(true)
    }

    /// Whether a lookup of `name` would currently yield a live point.
    pub fn is_enabled(&self, name: &str) -> bool {
        match self.mode() {
            ManagerMode::Enabled => true,
            ManagerMode::Disabled => false,
            ManagerMode::Switching => self.namespace.is_enabled(name),
        }
    }

    /// Removes every point and node, returning to the initial state.
    ///
    /// Configured overrides are applied again.
    pub fn clear(&self) {
        self.namespace.clear();
        self.apply_overrides();
        self.purge_cursor.store(0, Ordering::Relaxed);
        log::info!("Simon manager cleared");
    }

    /// Removes the point registered under `name`.
    ///
    /// A node with children stays in the namespace as a plain node.
    pub fn destroy(&self, name: &str) -> SimonResult<bool> {
        let destroyed = self.namespace.destroy(name)?;
        if destroyed {
            log::debug!("Simon destroyed: {name}");
        }
        Ok(destroyed)
    }

    /// Whether a node named `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        self.namespace.exists(name)
    }

    /// Direct children of `name`.
    pub fn children(&self, name: &str) -> Vec<NodeInfo> {
        self.namespace.children(name)
    }

    /// Names of every registered point, sorted.
    pub fn simon_names(&self) -> Vec<String> {
        self.namespace.point_names()
    }

    /// Number of namespace nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.namespace.len()
    }

    /// Whether the namespace holds only the root.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_empty()
    }

    /// A snapshot of the stopwatch registered under `name`.
    pub fn stopwatch_sample(&self, name: &str) -> Option<StopwatchSample> {
        match self.namespace.entry(name)? {
            Entry::Stopwatch(sw) => Some(sw.sample()),
            _ => None,
        }
    }

    /// A snapshot of the counter registered under `name`.
    pub fn counter_sample(&self, name: &str) -> Option<CounterSample> {
        match self.namespace.entry(name)? {
            Entry::Counter(c) => Some(c.sample()),
            _ => None,
        }
    }

    /// Snapshots of every registered point, sorted by name.
    pub fn samples(&self) -> Vec<SimonSample> {
        let mut samples: Vec<SimonSample> = self
            .namespace
            .entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Stopwatch(sw) => Some(SimonSample::Stopwatch(sw.sample())),
                Entry::Counter(c) => Some(SimonSample::Counter(c.sample())),
                Entry::Unknown => None,
            })
            .collect();
        samples.sort_by(|a, b| a.name().cmp(b.name()));
        samples
    }

    /// The underlying namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The clock used for measurement and purge staleness.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The configuration this manager was built from.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub(crate) fn purge_cursor(&self) -> usize {
        self.purge_cursor.load(Ordering::Relaxed)
    }

    pub(crate) fn set_purge_cursor(&self, cursor: usize) {
        self.purge_cursor.store(cursor, Ordering::Relaxed);
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(ManagerMode::Enabled)
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("mode", &self.mode())
            .field("nodes", &self.len())
            .finish_non_exhaustive()
    }
}
