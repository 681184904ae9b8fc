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

//! The process-wide default manager.
//!
//! Code that prefers not to pass a [`Manager`] around can use this instance.
//! It is created lazily in [`ManagerMode::Enabled`] with the system clock,
//! unless [`install`] provided another one first.

use crate::handle::{CounterHandle, StopwatchHandle};
use crate::manager::{Manager, ManagerMode};
use simon_core::SimonResult;
use std::sync::{Arc, OnceLock};

static DEFAULT_MANAGER: OnceLock<Arc<Manager>> = OnceLock::new();

/// Returns the default manager, creating it on first use.
pub fn manager() -> Arc<Manager> {
    Arc::clone(DEFAULT_MANAGER.get_or_init(|| {
        log::info!("Default Simon manager initialized");
        Arc::new(Manager::new(ManagerMode::Enabled))
    }))
}

/// Installs `manager` as the default instance.
///
/// Returns `false` if a default manager already exists.
pub fn install(manager: Arc<Manager>) -> bool {
    let installed = DEFAULT_MANAGER.set(manager).is_ok();
    if !installed {
        log::warn!("Default Simon manager already initialized; install ignored");
    }
    installed
}

/// [`Manager::get_stopwatch`] on the default manager.
pub fn get_stopwatch(name: &str) -> SimonResult<StopwatchHandle> {
    manager().get_stopwatch(name)
}

/// [`Manager::get_counter`] on the default manager.
pub fn get_counter(name: &str) -> SimonResult<CounterHandle> {
    manager().get_counter(name)
}

/// [`Manager::clear`] on the default manager.
pub fn clear() {
    manager().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::CounterOps;

    #[test]
    fn test_default_manager_is_shared() {
        let a = get_counter("global.test.hits").unwrap();
        let b = get_counter("global.test.hits").unwrap();
        assert!(a.same_point(&b));
        assert!(Arc::ptr_eq(&manager(), &manager()));

        a.increment(2);
        assert!(manager().counter_sample("global.test.hits").unwrap().value >= 2);
        assert!(!install(Arc::new(Manager::default())));
    }
}
