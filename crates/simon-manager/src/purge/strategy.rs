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

//! The three purge strategies.

use super::{ManagerPurger, PurgeReport};
use crate::manager::{Manager, ManagerMode};
use crate::namespace::NodeView;
use simon_core::SimonResult;

/// Purges stale points of an Enabled manager.
///
/// Nodes with an explicit state survive unless the configuration sets
/// `purge_overridden`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnabledManagerPurger;

impl ManagerPurger for EnabledManagerPurger {
    fn kind(&self) -> ManagerMode {
        ManagerMode::Enabled
    }

    fn purge_manager(&self, manager: &Manager, timestamp: u64) -> SimonResult<PurgeReport> {
        Ok(sweep(manager, timestamp, manager.config().purge.purge_overridden))
    }
}

/// Purges stale points of a Switching manager.
///
/// Whether a name currently resolves to a no-op plays no part: only the stored
/// last activity counts. Nodes with an explicit state are never purged, since
/// the state is the only record of the switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchingManagerPurger;

impl ManagerPurger for SwitchingManagerPurger {
    fn kind(&self) -> ManagerMode {
        ManagerMode::Switching
    }

    fn purge_manager(&self, manager: &Manager, timestamp: u64) -> SimonResult<PurgeReport> {
        Ok(sweep(manager, timestamp, false))
    }
}

/// The Disabled-mode strategy. Nothing accumulates, so nothing is purged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledManagerPurger;

impl ManagerPurger for DisabledManagerPurger {
    fn kind(&self) -> ManagerMode {
        ManagerMode::Disabled
    }

    fn purge_manager(&self, _manager: &Manager, timestamp: u64) -> SimonResult<PurgeReport> {
        log::trace!("Purge tick at {timestamp} skipped: manager disabled");
        Ok(PurgeReport::default())
    }
}

/// One incremental step: inspects at most `batch_size` nodes from the manager's
/// cursor and removes the stale leaves among them.
fn sweep(manager: &Manager, timestamp: u64, allow_overridden: bool) -> PurgeReport {
    let purge = &manager.config().purge;
    let threshold = timestamp.saturating_sub(purge.ttl_nanos());
    let namespace = manager.namespace();

    let (ids, next) = namespace.scan(manager.purge_cursor(), purge.batch_size.max(1));
    manager.set_purge_cursor(next);

    let mut report = PurgeReport {
        scanned: ids.len(),
        ..PurgeReport::default()
    };
    for id in ids {
        let removed =
            namespace.remove_if(id, |node| is_removable(node, threshold, allow_overridden));
        if removed.is_empty() {
            if let Some(entry) = namespace.entry_by_id(id) {
                report.increments_dropped += entry.purge_increments_older_than(threshold);
            }
        } else {
            report.removed.extend(removed);
        }
    }

    if !report.removed.is_empty() {
        log::debug!(
            "Purged {} stale simons (scanned {}, next cursor {next})",
            report.removed.len(),
            report.scanned
        );
    }
    report
}

fn is_removable(node: &NodeView<'_>, threshold: u64, allow_overridden: bool) -> bool {
    !node.has_children
        && (allow_overridden || !node.state.is_explicit())
        && node.entry.is_stale(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ManagerConfig, PurgeConfig};
    use simon_core::{Clock, CounterOps, ManualClock, StopwatchOps};
    use std::sync::Arc;

    const TTL_NANOS: u64 = 1_000_000;

    fn setup(mode: ManagerMode, purge_overridden: bool) -> (Manager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let config = ManagerConfig::default().with_mode(mode).with_purge(PurgeConfig {
            ttl_ms: 1,
            batch_size: 64,
            purge_overridden,
            ..PurgeConfig::default()
        });
        (Manager::from_config_with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_stale_leaf_cascades_to_plain_ancestors() {
        let (m, clock) = setup(ManagerMode::Enabled, false);
        m.get_counter("a.b.c").unwrap().increment(1);
        clock.advance_nanos(TTL_NANOS + 1);

        let report = EnabledManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap();
        assert_eq!(report.removed, vec!["a.b.c", "a.b", "a"]);
        assert!(m.is_empty());
    }

    #[test]
    fn test_fresh_points_survive() {
        let (m, clock) = setup(ManagerMode::Enabled, false);
        let c = m.get_counter("fresh").unwrap();
        clock.advance_nanos(TTL_NANOS + 1);
        c.increment(1);

        let report = EnabledManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(report.scanned, 1);
        assert!(m.exists("fresh"));
    }

    #[test]
    fn test_running_split_is_not_stale() {
        let (m, clock) = setup(ManagerMode::Enabled, false);
        let split = m.get_stopwatch("busy").unwrap().start();
        clock.advance_nanos(TTL_NANOS * 10);

        assert!(EnabledManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap()
            .removed
            .is_empty());
        drop(split);
    }

    #[test]
    fn test_overridden_nodes() {
        let (m, clock) = setup(ManagerMode::Switching, false);
        m.disable("kept").unwrap();
        m.get_counter("kept").unwrap();
        clock.advance_nanos(TTL_NANOS + 1);

        let report = SwitchingManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap();
        assert!(report.removed.is_empty());

        let (m, clock) = setup(ManagerMode::Switching, true);
        m.disable("gone").unwrap();
        clock.advance_nanos(TTL_NANOS + 1);
        assert!(SwitchingManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap()
            .removed
            .is_empty(), "switching ignores purge_overridden");
        assert_eq!(
            EnabledManagerPurger
                .purge_manager(&m, clock.nanos())
                .unwrap()
                .removed,
            vec!["gone"]
        );
    }

    #[test]
    fn test_disabled_strategy_is_noop() {
        let (m, clock) = setup(ManagerMode::Disabled, false);
        m.set_mode(ManagerMode::Enabled);
        m.get_counter("x").unwrap();
        m.set_mode(ManagerMode::Disabled);
        clock.advance_nanos(TTL_NANOS * 5);

        let report = DisabledManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap();
        assert!(report.is_noop());
        assert!(m.exists("x"));
    }

    #[test]
    fn test_batches_bound_each_tick() {
        let clock = Arc::new(ManualClock::new(0));
        let config = ManagerConfig::default().with_purge(PurgeConfig {
            ttl_ms: 1,
            batch_size: 2,
            ..PurgeConfig::default()
        });
        let m = Manager::from_config_with_clock(config, clock.clone());
        for name in ["p", "q", "r", "s", "t"] {
            m.get_counter(name).unwrap();
        }
        clock.advance_nanos(TTL_NANOS + 1);

        let mut ticks = 0;
        while !m.is_empty() {
            let report = EnabledManagerPurger
                .purge_manager(&m, clock.nanos())
                .unwrap();
            assert!(report.scanned <= 2);
            ticks += 1;
            assert!(ticks < 10, "purge must converge");
        }
        assert!(ticks >= 3);
    }

    #[test]
    fn test_stale_increment_keys_dropped() {
        let (m, clock) = setup(ManagerMode::Enabled, false);
        let sw = m.get_stopwatch("sw").unwrap();
        sw.sample_increment("console");
        clock.advance_nanos(TTL_NANOS + 1);
        sw.add_time(1);

        let report = EnabledManagerPurger
            .purge_manager(&m, clock.nanos())
            .unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(report.increments_dropped, 1);
        assert_eq!(sw.as_live().unwrap().incremental_keys(), 0);
    }
}
