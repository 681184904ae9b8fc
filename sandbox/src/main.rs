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

//! Runs a few worker threads against a Simon manager with the background purger
//! enabled, then prints every sample as JSON.
//!
//! Usage: `sandbox [config.json]`

use anyhow::{Context, Result};
use simon_core::{CounterOps, StopwatchOps};
use simon_manager::{
    global, IncrementalSimonsPurger, Manager, ManagerConfig, SyntheticData, ThreadScheduler,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WORKERS: usize = 4;
const ITERATIONS: u64 = 50;

fn load_config() -> Result<ManagerConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = ManagerConfig::from_file(&path)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("failed to load configuration from {path}"))?;
            log::info!("Loaded configuration from {path}");
            Ok(config)
        }
        None => Ok(ManagerConfig::default()),
    }
}

fn worker(manager: Arc<Manager>, id: usize) -> Result<()> {
    let iterations = manager.get_counter(&format!("sandbox.worker{id}.iterations"))?;
    let step = manager.get_stopwatch(&format!("sandbox.worker{id}.step"))?;
    let in_flight = manager.get_counter("sandbox.in_flight")?;

    for i in 0..ITERATIONS {
        in_flight.increment(1);
        step.time(|| thread::sleep(Duration::from_micros(200 + (i % 5) * 100)));
        in_flight.decrement(1);
        iterations.increment(1);
    }
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let manager = Arc::new(Manager::from_config(load_config()?));
    global::install(Arc::clone(&manager));

    SyntheticData::console_sample()
        .populate(&manager)
        .context("failed to populate synthetic data")?;

    let purger = IncrementalSimonsPurger::new(
        Arc::clone(&manager),
        Arc::new(ThreadScheduler::new("simon-purger")),
    );
    purger.start_from_config()?;

    let handles: Vec<_> = (0..WORKERS)
        .map(|id| {
            let manager = Arc::clone(&manager);
            thread::Builder::new()
                .name(format!("sandbox-worker-{id}"))
                .spawn(move || worker(manager, id))
        })
        .collect::<std::io::Result<_>>()?;

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
    }

    global::get_counter("sandbox.runs")?.increment(1);

    purger.cancel()?;

    let samples = manager.samples();
    log::info!("Collected {} samples in {} mode", samples.len(), manager.mode());
    println!("{}", serde_json::to_string_pretty(&samples)?);
    Ok(())
}
