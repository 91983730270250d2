//! Cell registry.
//!
//! A registry is the ordered, append-only set of declared cells plus two
//! flags: `frozen`, set by the first [`Registry::build_store`], after which
//! declarations are rejected; and `bound`, the reentrancy guard held while a
//! session runs.

mod cell;
mod id;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

pub use cell::{Cell, CellKind};
pub(crate) use cell::{StoreSlot, TypedSlot};
pub use id::{RegistryId, StoreId};

use cell::{CellSlot, ResettableCell};

use crate::error::{fault, StoreError};
use crate::session::BindingState;
use crate::store::Store;
use crate::Result;

struct CellList {
    cells: Vec<Arc<dyn ResettableCell>>,
    frozen: bool,
}

struct RegistryInner {
    id: RegistryId,
    cells: RwLock<CellList>,
    bound: AtomicBool,
}

/// Ordered collection of declared cells.
///
/// Cloning a `Registry` yields another handle to the same cells.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Create a new, empty, unfrozen registry.
    pub fn new() -> Self {
        let id = RegistryId::new();
        debug!(registry = %id, "registry created");
        Self {
            inner: Arc::new(RegistryInner {
                id,
                cells: RwLock::new(CellList {
                    cells: Vec::new(),
                    frozen: false,
                }),
                bound: AtomicBool::new(false),
            }),
        }
    }

    /// Unique identifier of this registry.
    pub fn id(&self) -> RegistryId {
        self.inner.id
    }

    /// Declare a reset cell, regenerated from `factory` on every reset.
    ///
    /// # Panics
    ///
    /// Panics if the registry is frozen.
    #[track_caller]
    pub fn declare_reset<T, F>(&self, name: impl Into<String>, factory: F) -> Cell<T>
    where
        T: Clone + Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        fault(self.try_declare_reset(name, factory))
    }

    /// Declare a reset cell, or report [`StoreError::Frozen`].
    pub fn try_declare_reset<T, F>(&self, name: impl Into<String>, factory: F) -> Result<Cell<T>>
    where
        T: Clone + Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let registry = self.id();
        self.try_declare(name.into(), move |name, index| {
            CellSlot::reset_cell(name, index, registry, Box::new(factory))
        })
    }

    /// Declare a snapshot cell whose value and snapshot start at `initial`.
    ///
    /// # Panics
    ///
    /// Panics if the registry is frozen.
    #[track_caller]
    pub fn declare_snapshot<T>(&self, name: impl Into<String>, initial: T) -> Cell<T>
    where
        T: Clone + Send + 'static,
    {
        fault(self.try_declare_snapshot(name, initial))
    }

    /// Declare a snapshot cell, or report [`StoreError::Frozen`].
    pub fn try_declare_snapshot<T>(&self, name: impl Into<String>, initial: T) -> Result<Cell<T>>
    where
        T: Clone + Send + 'static,
    {
        let registry = self.id();
        self.try_declare(name.into(), move |name, index| {
            CellSlot::snapshot_cell(name, index, registry, initial)
        })
    }

    /// Declare a reset cell holding a table that starts empty with the
    /// given capacity.
    ///
    /// # Panics
    ///
    /// Panics if the registry is frozen.
    #[track_caller]
    pub fn declare_table<K, V>(&self, name: impl Into<String>, capacity: usize) -> Cell<HashMap<K, V>>
    where
        K: Clone + Eq + Hash + Send + 'static,
        V: Clone + Send + 'static,
    {
        self.declare_reset(name, move || HashMap::with_capacity(capacity))
    }

    fn try_declare<T, B>(&self, name: String, build: B) -> Result<Cell<T>>
    where
        T: Clone + Send + 'static,
        B: FnOnce(String, usize) -> CellSlot<T>,
    {
        let mut list = self.inner.cells.write();
        if list.frozen {
            return Err(StoreError::Frozen {
                registry: self.id(),
                cell: name,
            });
        }

        let index = list.cells.len();
        let cell = Cell::new(build(name, index));
        debug!(
            registry = %self.id(),
            cell = cell.name(),
            index,
            kind = ?cell.kind(),
            "cell declared"
        );
        list.cells.push(cell.erased());
        Ok(cell)
    }

    /// Build a new store holding one recorded value per declared cell.
    ///
    /// Reset cells get a fresh factory value; snapshot cells get their
    /// snapshot. The first build also promotes every snapshot cell's live
    /// value to its snapshot, then freezes the registry. Building is atomic
    /// with respect to declarations, so only the first store ever performs
    /// that promotion: every later store starts from the snapshots as they
    /// stood when the registry froze.
    pub fn build_store(&self) -> Store {
        let mut list = self.inner.cells.write();
        let promote = !list.frozen;
        if promote {
            for cell in &list.cells {
                cell.promote();
            }
        }

        let slots = list
            .cells
            .iter()
            .map(|cell| Arc::clone(cell).slot())
            .collect();
        list.frozen = true;
        drop(list);

        let store = Store::new(self.id(), slots);
        debug!(
            registry = %self.id(),
            store = %store.id(),
            cells = store.len(),
            promoted = promote,
            "store built"
        );
        store
    }

    /// Reset every live cell per its policy, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if no session is bound, or if a cell is borrowed through
    /// [`Cell::with`] while resetting.
    #[track_caller]
    pub fn reset_all(&self) {
        fault(self.try_reset_all())
    }

    /// Reset every live cell, or report [`StoreError::NotBound`].
    ///
    /// Reports [`StoreError::CellBorrowed`] when called from inside
    /// [`Cell::with`] or [`Cell::with_mut`]; cells declared before the
    /// borrowed one have already been reset by then.
    pub fn try_reset_all(&self) -> Result<()> {
        if !self.is_bound() {
            return Err(StoreError::NotBound(self.id()));
        }

        let list = self.inner.cells.read();
        for cell in &list.cells {
            if !cell.reset() {
                return Err(StoreError::CellBorrowed {
                    registry: self.id(),
                    cell: cell.name().to_string(),
                });
            }
            trace!(cell = cell.name(), kind = ?cell.kind(), "cell reset");
        }
        debug!(registry = %self.id(), cells = list.cells.len(), "all cells reset");
        Ok(())
    }

    /// Check if a session is running.
    pub fn is_bound(&self) -> bool {
        self.inner.bound.load(Ordering::Acquire)
    }

    /// Current binding state.
    pub fn binding_state(&self) -> BindingState {
        BindingState::from(self.is_bound())
    }

    /// Check if the registry has been frozen by a store build.
    pub fn is_frozen(&self) -> bool {
        self.inner.cells.read().frozen
    }

    /// Number of declared cells.
    pub fn len(&self) -> usize {
        self.inner.cells.read().cells.len()
    }

    /// Check if no cells have been declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the binding flag to `target`, failing if it is not currently
    /// in the target's predecessor state.
    pub(crate) fn transition(&self, target: BindingState) -> Result<()> {
        let from = target.predecessor();
        debug_assert!(from.can_transition_to(target));

        self.inner
            .bound
            .compare_exchange(
                from.is_bound(),
                target.is_bound(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|_| match target {
                BindingState::Bound => StoreError::AlreadyBound(self.id()),
                BindingState::Unbound => StoreError::NotBound(self.id()),
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.inner.cells.read();
        f.debug_struct("Registry")
            .field("id", &self.id())
            .field("cells", &list.cells.len())
            .field("frozen", &list.frozen)
            .field("bound", &self.is_bound())
            .finish()
    }
}
