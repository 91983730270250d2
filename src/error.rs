//! Error types for scoped-store.

use thiserror::Error;

use crate::registry::RegistryId;

/// Misuse of the registry, store or session runner.
///
/// Every variant is a programming error in the integrating code. The
/// panicking entry points (`declare_*`, `run`, `reset_all`) abort the
/// calling operation with the variant's message; the `try_` entry points
/// hand it back instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A cell was declared after the registry was frozen.
    #[error("registry {registry} is frozen: cannot declare cell `{cell}`")]
    Frozen { registry: RegistryId, cell: String },

    /// A session is already bound to the registry.
    #[error("registry {0} is already bound: sessions cannot nest")]
    AlreadyBound(RegistryId),

    /// An operation that needs a bound session ran outside one.
    #[error("registry {0} is not bound: reset_all requires a running session")]
    NotBound(RegistryId),

    /// `reset_all` found a cell still borrowed through `Cell::with`.
    #[error("cell `{cell}` of registry {registry} is borrowed: reset_all cannot run inside Cell::with")]
    CellBorrowed { registry: RegistryId, cell: String },

    /// The store was built from a different registry.
    #[error("store was built from registry {store}, not {registry}")]
    ForeignStore {
        store: RegistryId,
        registry: RegistryId,
    },
}

/// Convenience Result type for scoped-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unwraps a registry result, turning misuse into a panic at the caller.
#[track_caller]
pub(crate) fn fault<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
