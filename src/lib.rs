//! # scoped-store
//!
//! Scoped global-state store.
//!
//! A process declares, once, a fixed collection of mutable *cells* and later
//! runs computations with a chosen snapshot of values (a [`Store`])
//! installed into those cells. When the computation finishes, normally or by
//! panicking, the cells' final values are captured back into the store and
//! the registry is released for the next session.
//!
//! ## Lifecycle
//!
//! - **Declare**: register reset cells (regenerated from a factory) and
//!   snapshot cells (restored to a captured value).
//! - **Freeze**: the first [`Registry::build_store`] freezes the registry;
//!   later declarations are rejected.
//! - **Session**: [`Registry::run`] installs a store, runs the computation
//!   and captures the result. Sessions do not nest.
//!
//! ## Quick Start
//!
//! ```
//! use scoped_store::Registry;
//!
//! let registry = Registry::new();
//! let counters = registry.declare_table::<String, u32>("counters", 16);
//! let depth = registry.declare_snapshot("depth", 0u32);
//!
//! let mut store = registry.build_store();
//! registry.run(&mut store, || {
//!     depth.set(5);
//!     counters.with_mut(|c| c.insert("calls".into(), 1));
//! });
//!
//! assert_eq!(store.get(&depth), Some(5));
//! assert_eq!(store.get(&counters).map(|c| c.len()), Some(1));
//!
//! // A fresh store starts from the baseline again.
//! let mut fresh = registry.build_store();
//! let len = registry.run(&mut fresh, || counters.with(|c| c.len()));
//! assert_eq!(len, 0);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod global;
pub mod logging;
pub mod registry;
pub mod session;
pub mod simulate;
pub mod store;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use registry::{Cell, CellKind, Registry, RegistryId, StoreId};
pub use session::BindingState;
pub use simulate::{run_simulation, Report, SimulationConfig, SimulationError, StoreReport};
pub use store::Store;
