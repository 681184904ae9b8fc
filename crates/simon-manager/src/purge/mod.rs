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

//! Background reclamation of stale measurement points.
//!
//! A [`ManagerPurger`] is the per-mode algorithm; a [`PurgerRunnable`] binds one
//! strategy to one manager as a recurring task; an [`IncrementalSimonsPurger`]
//! owns the schedule of that task.

mod purger;
mod runnable;
mod strategy;

pub use purger::{IncrementalSimonsPurger, PurgerStatus};
pub use runnable::PurgerRunnable;
pub use strategy::{DisabledManagerPurger, EnabledManagerPurger, SwitchingManagerPurger};

use crate::manager::{Manager, ManagerMode};
use simon_core::SimonResult;
use std::fmt::Debug;

/// What one purge tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Number of nodes inspected.
    pub scanned: usize,
    /// Full names of the removed nodes.
    pub removed: Vec<String>,
    /// Number of incremental-sampling keys dropped.
    pub increments_dropped: usize,
}

impl PurgeReport {
    /// Whether the tick changed nothing.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.increments_dropped == 0
    }
}

/// A purge algorithm for one [`ManagerMode`].
pub trait ManagerPurger: Send + Sync + Debug + 'static {
    /// The mode this strategy is paired with.
    fn kind(&self) -> ManagerMode;

    /// Runs one bounded purge step against `manager`.
    ///
    /// `timestamp` is a reading of the manager's clock taken once for the tick.
    fn purge_manager(&self, manager: &Manager, timestamp: u64) -> SimonResult<PurgeReport>;
}
