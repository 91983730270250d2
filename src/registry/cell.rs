//! Declared cells, their reset policies and their store slots.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::RegistryId;

/// Reset policy of a declared cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Regenerated from its factory on every reset.
    Reset,
    /// Restored to its captured snapshot on every reset.
    Snapshot,
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

enum Policy<T> {
    Reset(Factory<T>),
    Snapshot(Mutex<T>),
}

/// Shared backing storage of one cell.
pub(crate) struct CellSlot<T> {
    name: String,
    index: usize,
    registry: RegistryId,
    live: Mutex<T>,
    policy: Policy<T>,
}

impl<T> CellSlot<T> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> CellKind {
        match self.policy {
            Policy::Reset(_) => CellKind::Reset,
            Policy::Snapshot(_) => CellKind::Snapshot,
        }
    }
}

impl<T: Clone> CellSlot<T> {
    /// Build a reset cell; its initial live value comes from the factory.
    pub(crate) fn reset_cell(
        name: String,
        index: usize,
        registry: RegistryId,
        factory: Factory<T>,
    ) -> Self {
        let initial = factory();
        Self {
            name,
            index,
            registry,
            live: Mutex::new(initial),
            policy: Policy::Reset(factory),
        }
    }

    /// Build a snapshot cell whose live value and snapshot both start at `initial`.
    pub(crate) fn snapshot_cell(name: String, index: usize, registry: RegistryId, initial: T) -> Self {
        Self {
            name,
            index,
            registry,
            live: Mutex::new(initial.clone()),
            policy: Policy::Snapshot(Mutex::new(initial)),
        }
    }

    /// The value a reset or a new store starts this cell from.
    fn baseline(&self) -> T {
        match &self.policy {
            Policy::Reset(factory) => factory(),
            Policy::Snapshot(snapshot) => snapshot.lock().clone(),
        }
    }
}

/// Type-erased view of a cell, as held by its registry.
pub(crate) trait ResettableCell: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> CellKind;

    /// Overwrite the live value according to the reset policy.
    ///
    /// Returns `false`, leaving the value alone, if the live value is
    /// currently borrowed.
    fn reset(&self) -> bool;

    /// Copy the live value into the snapshot. No-op for reset cells.
    fn promote(&self);

    /// Create this cell's slot for a new store, seeded with the baseline.
    fn slot(self: Arc<Self>) -> Box<dyn StoreSlot>;
}

impl<T: Clone + Send + 'static> ResettableCell for CellSlot<T> {
    fn name(&self) -> &str {
        CellSlot::name(self)
    }

    fn kind(&self) -> CellKind {
        CellSlot::kind(self)
    }

    fn reset(&self) -> bool {
        let value = self.baseline();
        let Some(mut live) = self.live.try_lock() else {
            return false;
        };
        *live = value;
        true
    }

    fn promote(&self) {
        if let Policy::Snapshot(snapshot) = &self.policy {
            let current = self.live.lock().clone();
            *snapshot.lock() = current;
        }
    }

    fn slot(self: Arc<Self>) -> Box<dyn StoreSlot> {
        let value = self.baseline();
        Box::new(TypedSlot { cell: self, value })
    }
}

/// One recorded value of a store, bound to the cell it belongs to.
pub(crate) trait StoreSlot: Send {
    /// Write the recorded value into the live cell.
    fn install(&self);

    /// Read the live cell back into the recorded value.
    fn capture(&mut self);

    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct TypedSlot<T> {
    cell: Arc<CellSlot<T>>,
    value: T,
}

impl<T> TypedSlot<T> {
    pub(crate) fn value(&self) -> &T {
        &self.value
    }

    pub(crate) fn belongs_to(&self, cell: &Cell<T>) -> bool {
        Arc::ptr_eq(&self.cell, &cell.slot)
    }
}

impl<T: Clone + Send + 'static> StoreSlot for TypedSlot<T> {
    fn install(&self) {
        *self.cell.live.lock() = self.value.clone();
    }

    fn capture(&mut self) {
        self.value = self.cell.live.lock().clone();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handle to a declared cell.
///
/// The handle reads and writes the cell's *live* value. Outside a session
/// that is the value left by the last session (or the declared initial
/// value); inside a session it is the running store's state.
///
/// Handles are cheap to clone and can be shared across threads.
pub struct Cell<T> {
    slot: Arc<CellSlot<T>>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Cell<T> {
    /// Name given at declaration.
    pub fn name(&self) -> &str {
        self.slot.name()
    }

    /// Position in declaration order.
    pub fn index(&self) -> usize {
        self.slot.index
    }

    /// Reset policy of this cell.
    pub fn kind(&self) -> CellKind {
        self.slot.kind()
    }

    /// Registry this cell was declared in.
    pub fn registry_id(&self) -> RegistryId {
        self.slot.registry
    }
}

impl<T: Clone + Send + 'static> Cell<T> {
    pub(crate) fn new(slot: CellSlot<T>) -> Self {
        Self {
            slot: Arc::new(slot),
        }
    }

    pub(crate) fn erased(&self) -> Arc<dyn ResettableCell> {
        self.slot.clone()
    }

    /// Clone the live value.
    pub fn get(&self) -> T {
        self.slot.live.lock().clone()
    }

    /// Overwrite the live value.
    pub fn set(&self, value: T) {
        *self.slot.live.lock() = value;
    }

    /// Overwrite the live value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.slot.live.lock(), value)
    }

    /// Borrow the live value.
    ///
    /// The cell stays locked while `f` runs, so `f` must not touch this cell
    /// again. Calling [`Registry::reset_all`](crate::Registry::reset_all)
    /// from `f` faults with [`StoreError::CellBorrowed`](crate::StoreError::CellBorrowed).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.slot.live.lock();
        f(&guard)
    }

    /// Mutably borrow the live value. Same locking rules as [`Cell::with`].
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.slot.live.lock();
        f(&mut guard)
    }

    /// Current snapshot of a snapshot cell; `None` for reset cells.
    pub fn snapshot(&self) -> Option<T> {
        match &self.slot.policy {
            Policy::Reset(_) => None,
            Policy::Snapshot(snapshot) => Some(snapshot.lock().clone()),
        }
    }
}

impl<T> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("name", &self.name())
            .field("index", &self.index())
            .field("kind", &self.kind())
            .field("registry", &self.registry_id())
            .finish()
    }
}
