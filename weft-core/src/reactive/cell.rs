//! Observable Cell
//!
//! A cell is the smallest unit of reactive state: one storage location
//! that reports "observed" when read inside a tracking scope and notifies
//! its observers when written with a different value.
//!
//! # How cells work
//!
//! 1. Reading a cell inside a tracking scope registers the scope's
//!    observer as a dependent of the cell.
//!
//! 2. Writing a cell compares the new value against the held one by
//!    identity ([`Value::same`]); identical writes are absorbed silently.
//!
//! 3. A changed write notifies all dependents synchronously, before the
//!    write call returns.
//!
//! Cells are `Clone`; clones share the same storage and identity, so a
//! render closure and the outside world can hold the same cell.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RenderError;
use crate::value::Value;

use super::context::{self, TrackingScope};
use super::runtime::Runtime;

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique cell ID.
fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

struct CellInner {
    id: u64,
    name: Arc<str>,
    value: RwLock<Value>,
}

impl Drop for CellInner {
    fn drop(&mut self) {
        Runtime::drop_cell(self.id);
    }
}

/// A reactive storage location holding a [`Value`].
///
/// # Example
///
/// ```rust,ignore
/// let count = Cell::new("count", Value::Int(0));
///
/// // Read inside a tracking scope: registers the observer.
/// let value = count.get();
///
/// // Write: notifies dependents if the value actually changed.
/// count.set(Value::Int(1))?;
/// ```
#[derive(Clone)]
pub struct Cell {
    inner: Arc<CellInner>,
}

impl Cell {
    /// Create a new cell with the given debug name and initial value.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            inner: Arc::new(CellInner {
                id: next_cell_id(),
                name: Arc::from(name.into().as_str()),
                value: RwLock::new(value),
            }),
        }
    }

    /// The cell's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The cell's debug name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Read the current value, reporting the read to the active tracking
    /// scope (if any) so the current observer becomes a dependent.
    pub fn get(&self) -> Value {
        if TrackingScope::is_active() {
            TrackingScope::note_read(self.inner.id);
            if let Some(observer_id) = TrackingScope::current_observer() {
                Runtime::add_dependency(self.inner.id, observer_id);
            }
        }
        self.inner.value.read().clone()
    }

    /// Read the current value without establishing a dependency.
    pub fn get_untracked(&self) -> Value {
        self.inner.value.read().clone()
    }

    /// Write a new value, notifying observers if it differs by identity
    /// from the held value.
    ///
    /// Notification is synchronous: any dependent re-render completes
    /// before this call returns, and a failed forced re-render surfaces
    /// here. Writing during a tracked render is an error.
    pub fn set(&self, next: Value) -> Result<(), RenderError> {
        context::ensure_writes_allowed(&self.inner.name)?;

        let changed = {
            let held = self.inner.value.read();
            !held.same(&next)
        };
        *self.inner.value.write() = next;

        if changed {
            tracing::trace!(cell = %self.inner.name, id = self.inner.id, "cell changed");
            Runtime::notify_cell_changed(self.inner.id)
        } else {
            Ok(())
        }
    }

    /// Replace the held value without notifying anyone.
    ///
    /// Used by the property wrapper for writes that must not produce a
    /// notification (equal values, framework-internal reassignment).
    pub fn replace(&self, next: Value) {
        *self.inner.value.write() = next;
    }

    /// Notify observers unconditionally, as if the value had changed.
    pub fn invalidate(&self) -> Result<(), RenderError> {
        context::ensure_writes_allowed(&self.inner.name)?;
        tracing::trace!(cell = %self.inner.name, id = self.inner.id, "cell invalidated");
        Runtime::notify_cell_changed(self.inner.id)
    }

    /// Number of observers currently subscribed to this cell.
    pub fn observer_count(&self) -> usize {
        Runtime::observer_count(self.inner.id)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("value", &self.get_untracked())
            .field("observer_count", &self.observer_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::context::MutationGuard;
    use super::super::Reaction;
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn cell_get_and_set() {
        let cell = Cell::new("n", Value::Int(0));
        assert!(cell.get().same(&Value::Int(0)));

        cell.set(Value::Int(42)).unwrap();
        assert!(cell.get().same(&Value::Int(42)));
    }

    #[test]
    fn identical_writes_do_not_notify() {
        let cell = Cell::new("n", Value::Int(1));
        let hits = Arc::new(AtomicI32::new(0));

        let hits_clone = hits.clone();
        let reaction = Reaction::new("watch", move || {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let cell_clone = cell.clone();
        reaction.track(|| {
            cell_clone.get();
        });

        cell.set(Value::Int(1)).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        cell.set(Value::Int(2)).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notification_is_synchronous() {
        let cell = Cell::new("n", Value::Int(0));
        let seen = Arc::new(AtomicI32::new(-1));

        let seen_clone = seen.clone();
        let cell_for_callback = cell.clone();
        let reaction = Reaction::new("watch", move || {
            if let Value::Int(v) = cell_for_callback.get_untracked() {
                seen_clone.store(v as i32, Ordering::SeqCst);
            }
            Ok(())
        });
        let cell_clone = cell.clone();
        reaction.track(|| {
            cell_clone.get();
        });

        cell.set(Value::Int(7)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn writes_during_tracked_render_fail() {
        let cell = Cell::new("guarded", Value::Int(0));

        let _guard = MutationGuard::forbid();
        let err = cell.set(Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            RenderError::MutationDuringRender {
                cell: "guarded".into()
            }
        );
    }

    #[test]
    fn clone_shares_storage_and_identity() {
        let a = Cell::new("n", Value::Int(0));
        let b = a.clone();

        a.set(Value::Int(5)).unwrap();
        assert!(b.get_untracked().same(&Value::Int(5)));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn cell_ids_are_unique() {
        let a = Cell::new("a", Value::Null);
        let b = Cell::new("b", Value::Null);
        assert_ne!(a.id(), b.id());
    }
}
