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

//! The start/cancel state machine around a scheduled [`PurgerRunnable`].

use super::PurgerRunnable;
use crate::manager::Manager;
use crate::sync::lock;
use simon_core::{ScheduledTask, Scheduler, SimonError, SimonResult};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The observable state of an [`IncrementalSimonsPurger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgerStatus {
    /// Not started yet.
    Idle,
    /// A recurring task is registered with the scheduler.
    Scheduled,
    /// Cancelled. The purger cannot be started again.
    Cancelled,
}

enum PurgerState {
    Idle,
    Scheduled(Box<dyn ScheduledTask>),
    Cancelled,
}

impl PurgerState {
    fn status(&self) -> PurgerStatus {
        match self {
            PurgerState::Idle => PurgerStatus::Idle,
            PurgerState::Scheduled(_) => PurgerStatus::Scheduled,
            PurgerState::Cancelled => PurgerStatus::Cancelled,
        }
    }
}

/// Periodically purges one manager through a [`Scheduler`].
///
/// The lifecycle is `Idle -> Scheduled -> Cancelled` and single-use: calling
/// [`start`](Self::start) twice, or [`cancel`](Self::cancel) before a start or
/// twice, fails with [`SimonError::IllegalState`]. Each tick uses the strategy
/// of the manager's mode at that moment. Dropping a scheduled purger cancels
/// its task.
pub struct IncrementalSimonsPurger {
    manager: Arc<Manager>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<PurgerState>,
}

impl IncrementalSimonsPurger {
    /// Creates an idle purger for `manager`.
    pub fn new(manager: Arc<Manager>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            manager,
            scheduler,
            state: Mutex::new(PurgerState::Idle),
        }
    }

    /// Schedules purging every `interval`, the first run one `interval` from now.
    pub fn start(&self, interval: Duration) -> SimonResult<()> {
        self.start_with_delay(interval, interval)
    }

    /// Schedules purging with the manager's configured delays.
    pub fn start_from_config(&self) -> SimonResult<()> {
        let purge = &self.manager.config().purge;
        self.start_with_delay(purge.initial_delay(), purge.interval())
    }

    /// Schedules purging every `interval` after an `initial_delay`.
    pub fn start_with_delay(&self, initial_delay: Duration, interval: Duration) -> SimonResult<()> {
        let mut state = lock(&self.state);
        match *state {
            PurgerState::Idle => {}
            PurgerState::Scheduled(_) => {
                return Err(SimonError::IllegalState(
                    "purger has already been started".to_string(),
                ))
            }
            PurgerState::Cancelled => {
                return Err(SimonError::IllegalState(
                    "purger was cancelled and cannot be restarted".to_string(),
                ))
            }
        }

        let mode = self.manager.mode();
        let runnable = Arc::new(PurgerRunnable::new(Arc::clone(&self.manager)));
        let task = self
            .scheduler
            .schedule_with_fixed_delay(runnable, initial_delay, interval)?;
        *state = PurgerState::Scheduled(task);

        log::info!(
            "Simon purger started (mode {mode}, every {interval:?}, first run in {initial_delay:?})"
        );
        Ok(())
    }

    /// Stops future purge runs. A run in progress is allowed to finish.
    pub fn cancel(&self) -> SimonResult<()> {
        let mut state = lock(&self.state);
        match std::mem::replace(&mut *state, PurgerState::Cancelled) {
            PurgerState::Scheduled(task) => {
                task.cancel(false);
                log::info!("Simon purger cancelled");
                Ok(())
            }
            PurgerState::Idle => {
                *state = PurgerState::Idle;
                Err(SimonError::IllegalState(
                    "purger has not been started".to_string(),
                ))
            }
            PurgerState::Cancelled => Err(SimonError::IllegalState(
                "purger has already been cancelled".to_string(),
            )),
        }
    }

    /// The current lifecycle state.
    pub fn status(&self) -> PurgerStatus {
        lock(&self.state).status()
    }

    /// The purged manager.
    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }
}

impl Drop for IncrementalSimonsPurger {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let PurgerState::Scheduled(task) = std::mem::replace(state, PurgerState::Cancelled) {
            task.cancel(false);
            log::debug!("Simon purger dropped while scheduled; task cancelled");
        }
    }
}

impl fmt::Debug for IncrementalSimonsPurger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalSimonsPurger")
            .field("manager", &self.manager)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
