//! Process-wide default registry.
//!
//! Components that keep their state in module-level cells declare them here
//! at start-up; whatever manages analysis sessions builds stores and runs
//! computations against the same registry.
//!
//! ```
//! use scoped_store::global;
//!
//! let depth = global::declare_snapshot("example_depth", 0u32);
//! let mut store = global::build_store();
//! global::run(&mut store, || depth.set(depth.get() + 1));
//! assert_eq!(store.get(&depth), Some(1));
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use once_cell::sync::Lazy;

use crate::registry::{Cell, Registry};
use crate::store::Store;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    &GLOBAL
}

/// Declare a reset cell in the process-wide registry.
///
/// # Panics
///
/// Panics if the registry is frozen.
#[track_caller]
pub fn declare_reset<T, F>(name: impl Into<String>, factory: F) -> Cell<T>
where
    T: Clone + Send + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    GLOBAL.declare_reset(name, factory)
}

/// Declare a snapshot cell in the process-wide registry.
///
/// # Panics
///
/// Panics if the registry is frozen.
#[track_caller]
pub fn declare_snapshot<T>(name: impl Into<String>, initial: T) -> Cell<T>
where
    T: Clone + Send + 'static,
{
    GLOBAL.declare_snapshot(name, initial)
}

/// Declare a table cell in the process-wide registry.
///
/// # Panics
///
/// Panics if the registry is frozen.
#[track_caller]
pub fn declare_table<K, V>(name: impl Into<String>, capacity: usize) -> Cell<HashMap<K, V>>
where
    K: Clone + Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    GLOBAL.declare_table(name, capacity)
}

/// Build a store from the process-wide registry, freezing it.
pub fn build_store() -> Store {
    GLOBAL.build_store()
}

/// Run a session against the process-wide registry.
///
/// # Panics
///
/// Panics if a session is already bound or `store` is foreign.
#[track_caller]
pub fn run<R, F>(store: &mut Store, computation: F) -> R
where
    F: FnOnce() -> R,
{
    GLOBAL.run(store, computation)
}

/// Reset every cell of the process-wide registry.
///
/// # Panics
///
/// Panics outside a session.
#[track_caller]
pub fn reset_all() {
    GLOBAL.reset_all()
}

/// Check if a session is running against the process-wide registry.
pub fn is_bound() -> bool {
    GLOBAL.is_bound()
}

/// Check if the process-wide registry is frozen.
pub fn is_frozen() -> bool {
    GLOBAL.is_frozen()
}
