//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects cells to their
//! observers. It keeps two registries:
//!
//! 1. A map from observer IDs to weak references to the observers
//!    themselves, so routing an invalidation never keeps a dead
//!    computation alive.
//!
//! 2. A map from cell IDs to the observer IDs that read the cell during
//!    their last run.
//!
//! # Notification discipline
//!
//! Notification is synchronous and re-entrant: an invalidated observer
//! may re-render on the spot, and that render reads cells, re-registers
//! dependencies, or even disposes the observer. The runtime therefore
//! snapshots the subscriber list and upgrades every weak reference
//! *before* invoking any callback, and holds no registry guard while a
//! callback runs.
//!
//! Errors returned by an observer's invalidation (a failed forced
//! re-render) abort the notification and propagate to the caller of the
//! triggering write.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;

use crate::error::RenderError;

use super::ObserverId;

/// A computation that can be invalidated when a cell it read changes.
pub trait Observer: Send + Sync {
    /// The observer's unique ID.
    fn observer_id(&self) -> ObserverId;

    /// React to a change in one of the observer's dependencies.
    ///
    /// Invoked synchronously by the runtime. An error here is a failed
    /// render and propagates to the write that triggered it.
    fn invalidate(&self) -> Result<(), RenderError>;
}

/// Handle to a registered observer.
///
/// Dropping the handle unregisters the observer from the runtime.
pub struct ObserverHandle {
    observer_id: ObserverId,
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.observer_id);
    }
}

/// The global reactive runtime.
pub struct Runtime;

static OBSERVERS: OnceLock<DashMap<ObserverId, Weak<dyn Observer>>> = OnceLock::new();
static CELL_OBSERVERS: OnceLock<DashMap<u64, Vec<ObserverId>>> = OnceLock::new();

fn observers() -> &'static DashMap<ObserverId, Weak<dyn Observer>> {
    OBSERVERS.get_or_init(DashMap::new)
}

fn cell_observers() -> &'static DashMap<u64, Vec<ObserverId>> {
    CELL_OBSERVERS.get_or_init(DashMap::new)
}

impl Runtime {
    /// Register an observer with the runtime.
    ///
    /// Returns a handle that unregisters the observer when dropped.
    pub fn register(observer: Arc<dyn Observer>) -> ObserverHandle {
        let id = observer.observer_id();
        observers().insert(id, Arc::downgrade(&observer));
        ObserverHandle { observer_id: id }
    }

    /// Unregister an observer and drop all of its dependency edges.
    pub fn unregister(observer_id: ObserverId) {
        observers().remove(&observer_id);
        Self::clear_dependencies(observer_id);
    }

    /// Record that an observer depends on a cell.
    ///
    /// Called by cells when read inside a tracking scope.
    pub fn add_dependency(cell_id: u64, observer_id: ObserverId) {
        let mut subs = cell_observers().entry(cell_id).or_default();
        if !subs.contains(&observer_id) {
            subs.push(observer_id);
        }
    }

    /// Remove every dependency edge pointing at an observer.
    ///
    /// Called before re-tracking a computation, so stale reads from the
    /// previous run stop routing invalidations.
    pub fn clear_dependencies(observer_id: ObserverId) {
        for mut entry in cell_observers().iter_mut() {
            entry.value_mut().retain(|id| *id != observer_id);
        }
    }

    /// Number of observers currently subscribed to a cell.
    pub fn observer_count(cell_id: u64) -> usize {
        cell_observers().get(&cell_id).map_or(0, |subs| subs.len())
    }

    /// Number of cells an observer is currently subscribed to.
    pub fn dependency_count(observer_id: ObserverId) -> usize {
        cell_observers()
            .iter()
            .filter(|entry| entry.value().contains(&observer_id))
            .count()
    }

    /// Drop all bookkeeping for a cell. Called when the cell is dropped.
    pub(crate) fn drop_cell(cell_id: u64) {
        cell_observers().remove(&cell_id);
    }

    /// Notify every observer of a cell that its value changed.
    ///
    /// This is the core update propagation mechanism. Dispatch is
    /// synchronous; the first observer error aborts and propagates.
    pub fn notify_cell_changed(cell_id: u64) -> Result<(), RenderError> {
        // Snapshot the subscriber list before touching any observer, so
        // callbacks are free to mutate the registries.
        let subscriber_ids = cell_observers()
            .get(&cell_id)
            .map(|subs| subs.clone())
            .unwrap_or_default();

        if subscriber_ids.is_empty() {
            return Ok(());
        }

        let mut live: Vec<Arc<dyn Observer>> = Vec::with_capacity(subscriber_ids.len());
        for id in subscriber_ids {
            if let Some(weak) = observers().get(&id) {
                if let Some(observer) = weak.upgrade() {
                    live.push(observer);
                }
            }
        }

        for observer in live {
            observer.invalidate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct CountingObserver {
        id: ObserverId,
        invalidations: AtomicI32,
    }

    impl CountingObserver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: ObserverId::new(),
                invalidations: AtomicI32::new(0),
            })
        }
    }

    impl Observer for CountingObserver {
        fn observer_id(&self) -> ObserverId {
            self.id
        }

        fn invalidate(&self) -> Result<(), RenderError> {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn handle_drop_unregisters() {
        let observer = CountingObserver::new();
        let id = observer.id;

        let handle = Runtime::register(observer);
        assert!(observers().contains_key(&id));

        drop(handle);
        assert!(!observers().contains_key(&id));
    }

    #[test]
    fn notify_reaches_registered_observers() {
        let observer = CountingObserver::new();
        let cell_id = 9_000_001;

        let _handle = Runtime::register(observer.clone());
        Runtime::add_dependency(cell_id, observer.id);

        Runtime::notify_cell_changed(cell_id).unwrap();
        Runtime::notify_cell_changed(cell_id).unwrap();

        assert_eq!(observer.invalidations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dependencies_deduplicate() {
        let observer = CountingObserver::new();
        let cell_id = 9_000_002;

        let _handle = Runtime::register(observer.clone());
        Runtime::add_dependency(cell_id, observer.id);
        Runtime::add_dependency(cell_id, observer.id);

        assert_eq!(Runtime::observer_count(cell_id), 1);
    }

    #[test]
    fn clear_dependencies_stops_notifications() {
        let observer = CountingObserver::new();
        let cell_id = 9_000_003;

        let _handle = Runtime::register(observer.clone());
        Runtime::add_dependency(cell_id, observer.id);
        Runtime::clear_dependencies(observer.id);

        Runtime::notify_cell_changed(cell_id).unwrap();
        assert_eq!(observer.invalidations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_observers_are_skipped() {
        let observer = CountingObserver::new();
        let id = observer.id;
        let cell_id = 9_000_004;

        let handle = Runtime::register(observer);
        Runtime::add_dependency(cell_id, id);
        drop(handle);

        // Stale edges to an unregistered observer are ignored.
        Runtime::notify_cell_changed(cell_id).unwrap();
    }

    struct FailingObserver {
        id: ObserverId,
    }

    impl Observer for FailingObserver {
        fn observer_id(&self) -> ObserverId {
            self.id
        }

        fn invalidate(&self) -> Result<(), RenderError> {
            Err(RenderError::msg("forced render failed"))
        }
    }

    #[test]
    fn observer_errors_propagate_to_the_notifier() {
        let observer = Arc::new(FailingObserver {
            id: ObserverId::new(),
        });
        let cell_id = 9_000_005;

        let _handle = Runtime::register(observer.clone());
        Runtime::add_dependency(cell_id, observer.id);

        let err = Runtime::notify_cell_changed(cell_id).unwrap_err();
        assert_eq!(err, RenderError::msg("forced render failed"));
    }
}
