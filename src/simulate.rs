//! Session simulator.
//!
//! Drives a private registry through a configurable workload: a handful of
//! stores, each resumed over several sessions, some of which fail or reset
//! their state mid-way. The resulting [`Report`] shows what every store
//! recorded.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::registry::{Cell, Registry};

/// Workload parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of independent stores.
    pub stores: usize,
    /// Sessions run against each store.
    pub sessions_per_store: usize,
    /// Initial capacity of the counter table.
    pub table_capacity: usize,
    /// Every N-th session fails after mutating its cells (0 = never).
    pub fail_every: usize,
    /// Every N-th session resets all cells before working (0 = never).
    pub reset_every: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stores: 2,
            sessions_per_store: 3,
            table_capacity: 16,
            fail_every: 0,
            reset_every: 0,
        }
    }
}

/// Simulation errors.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Registry misuse.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The workload asked for no stores at all.
    #[error("simulation needs at least one store")]
    NoStores,

    /// A session failed on purpose after mutating its cells.
    #[error("session {session} failed on purpose")]
    Injected { session: usize },
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Registry the stores were built from.
    pub registry: String,
    /// Number of declared cells.
    pub cells: usize,
    /// Per-store results, in build order.
    pub stores: Vec<StoreReport>,
}

/// Final recorded state of one store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreReport {
    pub store: String,
    /// Recorded value of the `generation` snapshot cell.
    pub generation: u64,
    /// Entries in the recorded counter table.
    pub counters: usize,
    /// Entries in the recorded event log.
    pub events: usize,
    /// Sessions run against the store.
    pub sessions: u64,
    /// Sessions that failed.
    pub failed: usize,
    /// Sessions that reset all cells.
    pub resets: usize,
}

struct Cells {
    counters: Cell<HashMap<String, u64>>,
    generation: Cell<u64>,
    events: Cell<Vec<String>>,
}

impl Cells {
    fn declare(registry: &Registry, config: &SimulationConfig) -> Result<Self, StoreError> {
        let capacity = config.table_capacity;
        Ok(Self {
            counters: registry
                .try_declare_reset("counters", move || HashMap::with_capacity(capacity))?,
            generation: registry.try_declare_snapshot("generation", 0)?,
            events: registry.try_declare_reset("events", Vec::new)?,
        })
    }
}

fn hits(every: usize, session: usize) -> bool {
    every > 0 && session % every == 0
}

/// Run the configured workload and report what each store recorded.
pub fn run_simulation(config: &SimulationConfig) -> Result<Report, SimulationError> {
    if config.stores == 0 {
        return Err(SimulationError::NoStores);
    }

    let registry = Registry::new();
    let cells = Cells::declare(&registry, config)?;

    // Configured before the first build, so every store starts from it.
    cells.generation.set(1);

    let mut stores: Vec<_> = (0..config.stores).map(|_| registry.build_store()).collect();
    info!(
        registry = %registry.id(),
        stores = stores.len(),
        sessions = config.sessions_per_store,
        "simulation started"
    );

    let mut reports = Vec::with_capacity(stores.len());
    for store in &mut stores {
        let mut failed = 0;
        let mut resets = 0;

        for session in 1..=config.sessions_per_store {
            let reset = hits(config.reset_every, session);
            let outcome = registry.try_run(store, || -> Result<(), SimulationError> {
                if reset {
                    registry.try_reset_all()?;
                }

                let generation = cells.generation.with_mut(|g| {
                    *g += 1;
                    *g
                });
                cells.counters.with_mut(|counters| {
                    *counters.entry(format!("session-{session}")).or_insert(0) += 1;
                });
                cells
                    .events
                    .with_mut(|events| events.push(format!("generation {generation}")));

                if hits(config.fail_every, session) {
                    return Err(SimulationError::Injected { session });
                }
                Ok(())
            })?;

            if reset {
                resets += 1;
            }
            match outcome {
                Ok(()) => debug!(store = %store.id(), session, "session completed"),
                Err(err @ SimulationError::Injected { .. }) => {
                    warn!(store = %store.id(), %err, "session failed");
                    failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        let report = StoreReport {
            store: store.id().to_string(),
            generation: store.get(&cells.generation).unwrap_or_default(),
            counters: store.get(&cells.counters).map_or(0, |c| c.len()),
            events: store.get(&cells.events).map_or(0, |e| e.len()),
            sessions: store.sessions(),
            failed,
            resets,
        };
        info!(
            store = %report.store,
            generation = report.generation,
            counters = report.counters,
            failed = report.failed,
            "store finished"
        );
        reports.push(report);
    }

    Ok(Report {
        registry: registry.id().to_string(),
        cells: registry.len(),
        stores: reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workload() {
        let report = run_simulation(&SimulationConfig::default()).unwrap();
        assert_eq!(report.cells, 3);
        assert_eq!(report.stores.len(), 2);

        for store in &report.stores {
            assert_eq!(store.generation, 4);
            assert_eq!(store.counters, 3);
            assert_eq!(store.events, 3);
            assert_eq!(store.sessions, 3);
            assert_eq!(store.failed, 0);
            assert_eq!(store.resets, 0);
        }
    }

    #[test]
    fn test_failed_sessions_are_still_recorded() {
        let config = SimulationConfig {
            stores: 1,
            sessions_per_store: 4,
            fail_every: 2,
            ..SimulationConfig::default()
        };
        let report = run_simulation(&config).unwrap();
        let store = &report.stores[0];

        assert_eq!(store.failed, 2);
        assert_eq!(store.generation, 5);
        assert_eq!(store.counters, 4);
        assert_eq!(store.sessions, 4);
    }

    #[test]
    fn test_reset_sessions_start_from_baseline() {
        let config = SimulationConfig {
            stores: 1,
            sessions_per_store: 3,
            reset_every: 3,
            ..SimulationConfig::default()
        };
        let report = run_simulation(&config).unwrap();
        let store = &report.stores[0];

        assert_eq!(store.resets, 1);
        assert_eq!(store.generation, 2);
        assert_eq!(store.counters, 1);
        assert_eq!(store.events, 1);
    }

    #[test]
    fn test_no_stores_rejected() {
        let config = SimulationConfig {
            stores: 0,
            ..SimulationConfig::default()
        };
        let result = run_simulation(&config);
        assert!(matches!(result, Err(SimulationError::NoStores)));
    }

    #[test]
    fn test_report_serializes() {
        let report = run_simulation(&SimulationConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cells"], 3);
        assert_eq!(json["stores"][0]["generation"], 4);
    }

    #[test]
    fn test_hits() {
        assert!(!hits(0, 3));
        assert!(hits(3, 3));
        assert!(!hits(3, 4));
    }
}
