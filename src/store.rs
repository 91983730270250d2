//! Stores: independent recorded values, one per declared cell.

use std::fmt;

use crate::registry::{Cell, RegistryId, StoreId, StoreSlot, TypedSlot};

/// One session's state: a recorded value for every cell of its registry.
///
/// Built by [`Registry::build_store`](crate::Registry::build_store). The
/// recorded values are decoupled from the live cells and from every other
/// store; they change only when a session runs against this store, which
/// captures the cells' final values back into it.
pub struct Store {
    id: StoreId,
    registry: RegistryId,
    slots: Vec<Box<dyn StoreSlot>>,
    sessions: u64,
}

impl Store {
    pub(crate) fn new(registry: RegistryId, slots: Vec<Box<dyn StoreSlot>>) -> Self {
        Self {
            id: StoreId::new(),
            registry,
            slots,
            sessions: 0,
        }
    }

    /// Unique identifier of this store.
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Registry this store was built from.
    pub fn registry_id(&self) -> RegistryId {
        self.registry
    }

    /// Number of recorded values.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the store records no values.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of sessions that have run against this store.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Recorded value for `cell`.
    ///
    /// Returns `None` if the cell belongs to another registry.
    pub fn get<T: Clone + Send + 'static>(&self, cell: &Cell<T>) -> Option<T> {
        self.slots
            .get(cell.index())?
            .as_any()
            .downcast_ref::<TypedSlot<T>>()
            .filter(|slot| slot.belongs_to(cell))
            .map(|slot| slot.value().clone())
    }

    /// Write every recorded value into its live cell.
    pub(crate) fn install(&self) {
        for slot in &self.slots {
            slot.install();
        }
    }

    /// Read every live cell back into its recorded value.
    pub(crate) fn capture(&mut self) {
        for slot in &mut self.slots {
            slot.capture();
        }
        self.sessions += 1;
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("registry", &self.registry)
            .field("cells", &self.slots.len())
            .field("sessions", &self.sessions)
            .finish()
    }
}
