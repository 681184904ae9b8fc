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

//! JSON configuration for a [`Manager`](crate::Manager) and its purger.

use crate::manager::ManagerMode;
use serde::{Deserialize, Serialize};
use simon_core::SimonState;
use std::collections::BTreeMap;
use std::time::Duration;

/// Background purge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// Delay between the end of one purge tick and the start of the next.
    pub interval_ms: u64,
    /// Delay before the first tick.
    pub initial_delay_ms: u64,
    /// Idle time after which a point is considered stale.
    pub ttl_ms: u64,
    /// Maximum number of nodes inspected per tick.
    pub batch_size: usize,
    /// Whether nodes with an explicit enable/disable override may be purged.
    pub purge_overridden: bool,
}

impl PurgeConfig {
    /// [`PurgeConfig::interval_ms`] as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// [`PurgeConfig::initial_delay_ms`] as a [`Duration`].
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// [`PurgeConfig::ttl_ms`] as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// The staleness window in clock nanoseconds.
    pub fn ttl_nanos(&self) -> u64 {
        self.ttl_ms.saturating_mul(1_000_000)
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            initial_delay_ms: 1_000,
            ttl_ms: 60_000,
            batch_size: 256,
            purge_overridden: false,
        }
    }
}

/// Complete manager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Initial enablement mode.
    pub mode: ManagerMode,
    /// Background purge settings.
    pub purge: PurgeConfig,
    /// Per-name states applied when the manager is built.
    pub overrides: BTreeMap<String, SimonState>,
}

impl ManagerConfig {
    /// Load manager configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load manager configuration from JSON file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save manager configuration to JSON file
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: ManagerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the purge settings.
    pub fn with_purge(mut self, purge: PurgeConfig) -> Self {
        self.purge = purge;
        self
    }

    /// Adds a per-name state.
    pub fn with_override(mut self, name: impl Into<String>, state: SimonState) -> Self {
        self.overrides.insert(name.into(), state);
        self
    }
}
