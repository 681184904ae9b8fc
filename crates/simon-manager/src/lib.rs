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

//! # Simon Manager
//!
//! The registry engine: a hierarchical namespace of Stopwatches and Counters
//! owned by a [`Manager`] whose [`ManagerMode`] decides whether lookups yield
//! live points or free no-ops, plus the incremental background purger that
//! reclaims stale points on a fixed delay.
//!
//! ```no_run
//! use simon_core::{CounterOps, StopwatchOps};
//! use simon_manager::{Manager, ManagerMode};
//!
//! let manager = Manager::new(ManagerMode::Enabled);
//! let hits = manager.get_counter("app.cache.hits")?;
//! hits.increment(1);
//! manager.get_stopwatch("app.cache.load")?.time(|| {
//!     // work
//! });
//! # Ok::<(), simon_core::SimonError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod counter;
pub mod global;
pub mod handle;
pub mod manager;
pub mod namespace;
pub mod null;
pub mod purge;
pub mod scheduler;
pub mod stopwatch;
pub mod synthetic;

mod stats;
mod sync;

pub use config::{ManagerConfig, PurgeConfig};
pub use counter::Counter;
pub use handle::{CounterHandle, StopwatchHandle};
pub use manager::{Manager, ManagerMode};
pub use namespace::{Entry, Namespace, NodeId, NodeInfo, RemovePolicy};
pub use null::{NullCounter, NullStopwatch};
pub use purge::{
    DisabledManagerPurger, EnabledManagerPurger, IncrementalSimonsPurger, ManagerPurger,
    PurgeReport, PurgerRunnable, PurgerStatus, SwitchingManagerPurger,
};
pub use scheduler::{ThreadScheduler, ThreadTask};
pub use stopwatch::{Split, Stopwatch};
pub use synthetic::SyntheticData;
