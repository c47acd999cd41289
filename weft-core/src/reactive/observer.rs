//! Observer identity for the reactive engine.
//!
//! An observer is any computation that depends on reactive cells: a
//! reaction, a derived value, or a bound render. Observers are addressed
//! by ID everywhere in the engine so that cells and the registry never
//! hold strong references to the computations themselves.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an observer.
///
/// Each observer gets a unique ID when created. The ID is used to record
/// dependencies and route invalidations without keeping the observer
/// alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Generate a new unique observer ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_ids_are_unique() {
        let id1 = ObserverId::new();
        let id2 = ObserverId::new();
        let id3 = ObserverId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }
}
