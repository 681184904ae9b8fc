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

use simon_core::{CounterOps, ManualClock, ScheduledTask};
use simon_manager::{
    IncrementalSimonsPurger, Manager, ManagerConfig, ManagerMode, PurgeConfig, PurgerRunnable,
    PurgerStatus, ThreadScheduler,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn test_background_purge_reclaims_stale_points() {
    init_logging();
    let clock = Arc::new(ManualClock::new(0));
    let config = ManagerConfig::default().with_purge(PurgeConfig {
        ttl_ms: 1,
        batch_size: 4,
        ..PurgeConfig::default()
    });
    let manager = Arc::new(Manager::from_config_with_clock(config, clock.clone()));
    for i in 0..10 {
        manager
            .get_counter(&format!("stale.c{i}"))
            .unwrap()
            .increment(1);
    }
    clock.advance(Duration::from_millis(5));
    let keep = manager.get_counter("active").unwrap();
    keep.increment(1);

    let purger = IncrementalSimonsPurger::new(
        Arc::clone(&manager),
        Arc::new(ThreadScheduler::new("simon-purger-test")),
    );
    purger
        .start_with_delay(Duration::ZERO, Duration::from_millis(1))
        .unwrap();

    assert!(
        wait_until(Duration::from_secs(5), || !manager.exists("stale")),
        "the purger should eventually reclaim every stale point"
    );
    assert_eq!(manager.simon_names(), vec!["active"]);

    purger.cancel().unwrap();
    assert_eq!(purger.status(), PurgerStatus::Cancelled);
}

#[test]
fn test_disabled_manager_purge_keeps_points() {
    init_logging();
    let clock = Arc::new(ManualClock::new(0));
    let config = ManagerConfig::default().with_purge(PurgeConfig {
        ttl_ms: 1,
        ..PurgeConfig::default()
    });
    let manager = Arc::new(Manager::from_config_with_clock(config, clock.clone()));
    manager.get_counter("frozen").unwrap().increment(3);
    manager.set_mode(ManagerMode::Disabled);
    clock.advance(Duration::from_millis(5));

    let scheduler = Arc::new(ThreadScheduler::default());
    let task = scheduler
        .spawn(
            Arc::new(PurgerRunnable::new(Arc::clone(&manager))),
            Duration::ZERO,
            Duration::from_millis(1),
        )
        .unwrap();
    assert!(wait_until(Duration::from_secs(5), || task.run_count() >= 3));

    assert_eq!(manager.counter_sample("frozen").unwrap().value, 3);
    assert!(task.cancel(false));
    task.join();
}
