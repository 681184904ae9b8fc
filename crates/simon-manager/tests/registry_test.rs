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

use simon_core::{
    Clock, CounterOps, ManualClock, Runnable, SimonKind, SimonSample, SplitOps, StopwatchOps,
};
use simon_manager::{
    EnabledManagerPurger, Manager, ManagerConfig, ManagerMode, ManagerPurger, PurgeConfig,
    PurgerRunnable, SyntheticData,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn manual_manager(mode: ManagerMode, ttl_ms: u64) -> (Arc<Manager>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let config = ManagerConfig::default().with_mode(mode).with_purge(PurgeConfig {
        ttl_ms,
        ..PurgeConfig::default()
    });
    (
        Arc::new(Manager::from_config_with_clock(config, clock.clone())),
        clock,
    )
}

#[test]
fn test_end_to_end_stopwatch_and_counter() {
    let (manager, _) = manual_manager(ManagerMode::Enabled, 60_000);

    let a = manager.get_stopwatch("A").unwrap();
    for nanos in [100, 200, 300] {
        a.add_time(nanos);
    }
    SyntheticData::new()
        .counter_values("B", &[5, 3, 9])
        .populate(&manager)
        .unwrap();

    let a = manager.stopwatch_sample("A").unwrap();
    assert_eq!(a.count, 3);
    assert_eq!(a.total, 600);
    assert_eq!(a.min, Some(100));
    assert_eq!(a.max, Some(300));

    let b = manager.counter_sample("B").unwrap();
    assert_eq!(b.value, 9);
    assert_eq!(b.min, Some(3));
    assert_eq!(b.max, Some(9));
    assert_eq!(b.count, 3);
}

#[test]
fn test_repeated_lookups_share_identity() {
    let (manager, _) = manual_manager(ManagerMode::Enabled, 60_000);
    let first = manager.get_counter("org.app.requests").unwrap();
    let second = manager.get_counter("org.app.requests").unwrap();
    assert!(first.same_point(&second));

    first.increment(1);
    second.increment(1);
    assert_eq!(manager.counter_sample("org.app.requests").unwrap().value, 2);
    assert_eq!(manager.len(), 3, "org, org.app, org.app.requests");
}

#[test]
fn test_concurrent_lookups_and_writes() {
    let (manager, _) = manual_manager(ManagerMode::Enabled, 60_000);
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for _ in 0..250 {
                    manager.get_stopwatch("shared.sw").unwrap().add_time(1);
                    manager
                        .get_counter(&format!("own.counter{i}"))
                        .unwrap()
                        .increment(1);
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(manager.stopwatch_sample("shared.sw").unwrap().count, 2_000);
    for i in 0..8 {
        let name = format!("own.counter{i}");
        assert_eq!(manager.counter_sample(&name).unwrap().value, 250);
    }
    assert_eq!(manager.children("own").len(), 8);
}

#[test]
fn test_lookups_racing_purge_never_see_half_removed_nodes() {
    let (manager, clock) = manual_manager(ManagerMode::Enabled, 1);
    let stop = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut lookups = 0u64;
                loop {
                    manager
                        .get_counter("race.node.x")
                        .expect("lookup racing a purge must succeed")
                        .increment(1);
                    lookups += 1;
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
                lookups
            })
        })
        .collect();

    for _ in 0..2_000 {
        clock.advance(std::time::Duration::from_millis(2));
        EnabledManagerPurger
            .purge_manager(&manager, clock.nanos())
            .unwrap();

        // Only this thread removes, so a visible point implies its whole path.
        if manager.counter_sample("race.node.x").is_some() {
            assert!(manager.exists("race.node.x"));
            assert!(manager.exists("race.node"));
            assert!(manager.exists("race"));
        }
    }

    stop.store(true, Ordering::Relaxed);
    let lookups: u64 = writers.into_iter().map(|w| w.join().unwrap()).sum();
    assert!(lookups > 0);

    if manager.exists("race.node.x") {
        assert!(manager.counter_sample("race.node.x").is_some());
        assert!(manager.exists("race.node"));
    }
    clock.advance(std::time::Duration::from_millis(2));
    for _ in 0..2 {
        EnabledManagerPurger
            .purge_manager(&manager, clock.nanos())
            .unwrap();
    }
    assert!(!manager.exists("race"), "quiescent stale path is fully reclaimed");
}

#[test]
fn test_handles_keep_identity_across_mode_switch() {
    let (manager, clock) = manual_manager(ManagerMode::Enabled, 60_000);
    let live = manager.get_stopwatch("op").unwrap();
    let split = live.start();

    manager.set_mode(ManagerMode::Disabled);
    let null = manager.get_stopwatch("op").unwrap();
    assert!(!null.is_live());
    null.add_time(1_000);
    null.start().stop();

    clock.advance_nanos(25);
    assert_eq!(split.stop(), 25, "a split started while enabled completes normally");

    manager.set_mode(ManagerMode::Enabled);
    let again = manager.get_stopwatch("op").unwrap();
    assert!(again.same_point(&live));
    let sample = manager.stopwatch_sample("op").unwrap();
    assert_eq!(sample.count, 1);
    assert_eq!(sample.total, 25);
}

#[test]
fn test_switching_toggle_applies_on_next_lookup() {
    let (manager, _) = manual_manager(ManagerMode::Switching, 60_000);
    let before = manager.get_counter("svc.calls").unwrap();
    assert!(before.is_live());

    manager.disable("svc").unwrap();
    before.increment(1);
    let after = manager.get_counter("svc.calls").unwrap();
    assert!(!after.is_live());
    after.increment(10);

    manager.enable("svc.calls").unwrap();
    let reenabled = manager.get_counter("svc.calls").unwrap();
    assert!(reenabled.same_point(&before));
    assert_eq!(manager.counter_sample("svc.calls").unwrap().value, 1);
}

#[test]
fn test_purge_is_idempotent() {
    let (manager, clock) = manual_manager(ManagerMode::Enabled, 10);
    SyntheticData::new()
        .stopwatch_nanos("old.sw", &[5])
        .counter_deltas("old.counter", &[1, -1])
        .populate(&manager)
        .unwrap();
    clock.advance(std::time::Duration::from_millis(20));
    manager.get_counter("fresh").unwrap().increment(1);

    let runnable = PurgerRunnable::new(Arc::clone(&manager));
    let timestamp = clock.nanos();

    let first = runnable
        .manager_purger()
        .purge_manager(&manager, timestamp)
        .unwrap();
    let mut removed = first.removed.clone();
    removed.sort();
    assert_eq!(removed, vec!["old", "old.counter", "old.sw"]);

    let second = runnable
        .manager_purger()
        .purge_manager(&manager, timestamp)
        .unwrap();
    assert!(second.is_noop());
    assert_eq!(manager.simon_names(), vec!["fresh"]);

    runnable.run();
    assert_eq!(manager.simon_names(), vec!["fresh"]);
}

#[test]
fn test_samples_serialize_for_reporting() {
    let (manager, _) = manual_manager(ManagerMode::Enabled, 60_000);
    SyntheticData::console_sample().populate(&manager).unwrap();
    manager.get_counter("Z").unwrap().set(4);

    let samples = manager.samples();
    let kinds: Vec<SimonKind> = samples
        .iter()
        .map(|s| match s {
            SimonSample::Stopwatch(_) => SimonKind::Stopwatch,
            SimonSample::Counter(_) => SimonKind::Counter,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            SimonKind::Stopwatch,
            SimonKind::Stopwatch,
            SimonKind::Stopwatch,
            SimonKind::Counter
        ]
    );

    let json = serde_json::to_value(&samples).unwrap();
    assert_eq!(json[0]["kind"], "stopwatch");
    assert_eq!(json[0]["name"], "A");
    assert_eq!(json[3]["kind"], "counter");
    assert_eq!(json[3]["value"], 4);
}
