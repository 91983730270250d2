//! Registry and store identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for registry ID generation.
static REGISTRY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Global counter for store ID generation.
static STORE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a cell registry.
///
/// Generated from an atomic counter, so unique within a single process
/// lifetime. Displayed as `reg-XXXXXXXX` where X is a hexadecimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryId(u64);

impl RegistryId {
    /// Create a new unique registry ID.
    pub fn new() -> Self {
        Self(REGISTRY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Create a RegistryId from a raw u64 value.
    ///
    /// This is primarily for testing.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for RegistryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg-{:08x}", self.0)
    }
}

/// Unique identifier for a store, displayed as `store-XXXXXXXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

impl StoreId {
    /// Create a new unique store ID.
    pub fn new() -> Self {
        Self(STORE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store-{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..10_000 {
            let id = RegistryId::new();
            assert!(ids.insert(id), "Duplicate ID generated: {}", id);
        }
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_display_format() {
        let id = RegistryId::from_raw(255);
        assert_eq!(id.to_string(), "reg-000000ff");
        assert_eq!(id.as_u64(), 255);

        let id2 = RegistryId::from_raw(0x12345678);
        assert_eq!(id2.to_string(), "reg-12345678");
    }

    #[test]
    fn test_store_ids_are_distinct() {
        let a = StoreId::new();
        let b = StoreId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("store-"));
        assert!(b.as_u64() > a.as_u64());
    }
}
