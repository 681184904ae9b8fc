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

//! The closed set of registry enablement modes.

use crate::purge::{
    DisabledManagerPurger, EnabledManagerPurger, ManagerPurger, SwitchingManagerPurger,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::sync::Arc;

/// How a [`Manager`](crate::Manager) resolves lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerMode {
    /// Every lookup yields a live point.
    #[default]
    Enabled,
    /// Every lookup yields a no-op point; stored statistics are frozen.
    Disabled,
    /// Each name resolves its own enabled flag from the namespace.
    Switching,
}

impl ManagerMode {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            ManagerMode::Enabled => 0,
            ManagerMode::Disabled => 1,
            ManagerMode::Switching => 2,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ManagerMode::Disabled,
            2 => ManagerMode::Switching,
            _ => ManagerMode::Enabled,
        }
    }

    /// The purge strategy paired with this mode.
    pub fn purger(self) -> Arc<dyn ManagerPurger> {
        match self {
            ManagerMode::Enabled => Arc::new(EnabledManagerPurger),
            ManagerMode::Disabled => Arc::new(DisabledManagerPurger),
            ManagerMode::Switching => Arc::new(SwitchingManagerPurger),
        }
    }
}

impl Display for ManagerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerMode::Enabled => f.write_str("enabled"),
            ManagerMode::Disabled => f.write_str("disabled"),
            ManagerMode::Switching => f.write_str("switching"),
        }
    }
}
