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

//! The scheduler abstraction consumed by background maintenance.
//!
//! The purger never spawns threads itself: it hands a [`Runnable`] to a
//! [`Scheduler`] and keeps the returned [`ScheduledTask`] to cancel it later.
//! This keeps the purger testable against a recording scheduler.

use crate::error::SimonResult;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// A unit of recurring work.
pub trait Runnable: Send + Sync + 'static {
    /// Executes one run of the task.
    fn run(&self);

    /// Get a reference to this object as Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// A handle to a recurring task registered with a [`Scheduler`].
pub trait ScheduledTask: Send + Sync + Debug {
    /// Prevents any future run from starting.
    ///
    /// With `may_interrupt_if_running == false` a run already in progress is
    /// allowed to finish. Returns `false` if the task was already cancelled.
    fn cancel(&self, may_interrupt_if_running: bool) -> bool;

    /// Whether [`ScheduledTask::cancel`] has been called.
    fn is_cancelled(&self) -> bool;
}

/// Something that can run a [`Runnable`] repeatedly.
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to run first after `initial_delay`, then repeatedly with
    /// `delay` between the end of one run and the start of the next.
    fn schedule_with_fixed_delay(
        &self,
        task: Arc<dyn Runnable>,
        initial_delay: Duration,
        delay: Duration,
    ) -> SimonResult<Box<dyn ScheduledTask>>;
}
