//! Derived Computation
//!
//! A derived value caches the result of a tracked computation and
//! recomputes lazily: a change to any cell read during the last
//! evaluation only marks the derived dirty, and the next [`Derived::get`]
//! re-evaluates.
//!
//! # Differences from Reaction
//!
//! - Reactions are eager: their callback fires on the writer's stack.
//! - Deriveds are lazy: invalidation is a flag flip, work happens on the
//!   next read.
//!
//! This is why the property wrapper notifies its cell even when the
//! component's own forced re-render is being suppressed: a derived that
//! read `props` still has to see the change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RenderError;

use super::context::TrackingScope;
use super::observer::ObserverId;
use super::runtime::{Observer, ObserverHandle, Runtime};

struct DerivedCore<T> {
    observer_id: ObserverId,
    label: String,
    compute: Box<dyn Fn() -> T + Send + Sync>,
    value: RwLock<Option<T>>,
    dirty: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> Observer for DerivedCore<T> {
    fn observer_id(&self) -> ObserverId {
        self.observer_id
    }

    fn invalidate(&self) -> Result<(), RenderError> {
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A lazily recomputed, cached derived value.
///
/// # Example
///
/// ```rust,ignore
/// let count = Cell::new("count", Value::Int(2));
/// let cell = count.clone();
/// let doubled = Derived::new("doubled", move || {
///     match cell.get() { Value::Int(n) => n * 2, _ => 0 }
/// });
///
/// assert_eq!(doubled.get(), 4);
/// count.set(Value::Int(5))?;   // marks dirty, no work yet
/// assert_eq!(doubled.get(), 10);
/// ```
#[derive(Clone)]
pub struct Derived<T: Clone + Send + Sync + 'static> {
    core: Arc<DerivedCore<T>>,
    _registration: Arc<ObserverHandle>,
}

impl<T: Clone + Send + Sync + 'static> Derived<T> {
    /// Create a new derived computation. Nothing runs until the first
    /// [`Derived::get`].
    pub fn new<F>(label: impl Into<String>, compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let core = Arc::new(DerivedCore {
            observer_id: ObserverId::new(),
            label: label.into(),
            compute: Box::new(compute),
            value: RwLock::new(None),
            dirty: AtomicBool::new(true),
        });
        let registration = Runtime::register(core.clone());
        Self {
            core,
            _registration: Arc::new(registration),
        }
    }

    /// The cached value, recomputing first if a dependency changed.
    pub fn get(&self) -> T {
        if self.core.dirty.load(Ordering::SeqCst) || self.core.value.read().is_none() {
            self.recompute();
        }
        self.core
            .value
            .read()
            .clone()
            .expect("derived value present after recompute")
    }

    /// Whether a dependency changed since the last evaluation.
    pub fn is_dirty(&self) -> bool {
        self.core.dirty.load(Ordering::SeqCst)
    }

    fn recompute(&self) {
        Runtime::clear_dependencies(self.core.observer_id);
        let computed = {
            let _scope = TrackingScope::enter(self.core.observer_id);
            (self.core.compute)()
        };
        *self.core.value.write() = Some(computed);
        self.core.dirty.store(false, Ordering::SeqCst);
        tracing::trace!(label = %self.core.label, "derived recomputed");
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("label", &self.core.label)
            .field("dirty", &self.is_dirty())
            .field("value", &*self.core.value.read())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::Cell;
    use super::*;
    use crate::value::Value;
    use std::sync::atomic::AtomicI32;

    fn int(v: &Value) -> i64 {
        match v {
            Value::Int(n) => *n,
            other => panic!("expected int, got {other:?}"),
        }
    }

    #[test]
    fn derived_is_lazy_and_cached() {
        let runs = Arc::new(AtomicI32::new(0));
        let runs_clone = runs.clone();

        let derived = Derived::new("fixed", move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(derived.get(), 42);
        assert_eq!(derived.get(), 42);
        assert_eq!(derived.get(), 42);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cell_change_marks_dirty_and_next_get_recomputes() {
        let cell = Cell::new("n", Value::Int(10));

        let cell_clone = cell.clone();
        let doubled = Derived::new("doubled", move || int(&cell_clone.get()) * 2);

        assert_eq!(doubled.get(), 20);
        assert!(!doubled.is_dirty());

        cell.set(Value::Int(5)).unwrap();
        assert!(doubled.is_dirty());
        assert_eq!(doubled.get(), 10);
    }

    #[test]
    fn unread_cells_do_not_invalidate() {
        let read = Cell::new("read", Value::Int(1));
        let unread = Cell::new("unread", Value::Int(1));

        let read_clone = read.clone();
        let derived = Derived::new("d", move || int(&read_clone.get()));
        assert_eq!(derived.get(), 1);

        unread.set(Value::Int(2)).unwrap();
        assert!(!derived.is_dirty());
    }
}
