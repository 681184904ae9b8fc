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

//! The recurring purge task.

use super::ManagerPurger;
use crate::manager::Manager;
use simon_core::Runnable;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Purges one manager on each run.
///
/// By default the strategy follows the manager's mode at every run, so a
/// [`Manager::set_mode`] takes effect on the next tick. [`with_purger`]
/// pins one strategy instead. Each run reads the manager's clock once and
/// hands that timestamp to the strategy. Failures and panics of the strategy
/// are logged and swallowed so the schedule keeps running.
///
/// [`with_purger`]: Self::with_purger
#[derive(Debug, Clone)]
pub struct PurgerRunnable {
    manager: Arc<Manager>,
    pinned: Option<Arc<dyn ManagerPurger>>,
}

impl PurgerRunnable {
    /// Creates a runnable purging `manager` with the strategy of its current mode.
    pub fn new(manager: Arc<Manager>) -> Self {
        Self {
            manager,
            pinned: None,
        }
    }

    /// Creates a runnable purging `manager` with `manager_purger` regardless of mode.
    pub fn with_purger(manager: Arc<Manager>, manager_purger: Arc<dyn ManagerPurger>) -> Self {
        Self {
            manager,
            pinned: Some(manager_purger),
        }
    }

    /// The purged manager.
    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    /// The strategy the next run will use.
    pub fn manager_purger(&self) -> Arc<dyn ManagerPurger> {
        match &self.pinned {
            Some(purger) => Arc::clone(purger),
            None => self.manager.mode().purger(),
        }
    }

    /// Whether the strategy follows the manager's mode.
    pub fn follows_mode(&self) -> bool {
        self.pinned.is_none()
    }
}

impl Runnable for PurgerRunnable {
    fn run(&self) {
        let manager_purger = self.manager_purger();
        let timestamp = self.manager.clock().nanos();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            manager_purger.purge_manager(&self.manager, timestamp)
        }));

        match outcome {
            Ok(Ok(report)) if report.is_noop() => {
                log::trace!("Purge tick at {timestamp}: nothing to do ({} scanned)", report.scanned);
            }
            Ok(Ok(report)) => {
                log::debug!(
                    "Purge tick at {timestamp}: {} removed, {} increment keys dropped",
                    report.removed.len(),
                    report.increments_dropped
                );
            }
            Ok(Err(e)) => {
                log::warn!(
                    "Purge tick failed ({} strategy): {e}",
                    manager_purger.kind()
                );
            }
            Err(payload) => {
                log::error!(
                    "Purge strategy panicked ({} strategy): {}",
                    manager_purger.kind(),
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
