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

//! # Simon Core
//!
//! Foundational crate containing the contracts and plain data types shared by
//! every Simon implementation: hierarchical names, the measurement-point
//! capability traits, statistics samples, the clock and the scheduler
//! abstraction used by background maintenance.

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod name;
pub mod sample;
pub mod schedule;
pub mod simon;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SimonError, SimonResult};
pub use name::SimonName;
pub use sample::{CounterSample, SimonSample, StopwatchSample};
pub use schedule::{Runnable, ScheduledTask, Scheduler};
pub use simon::{CounterOps, Simon, SimonKind, SimonState, SplitOps, StopwatchOps};
