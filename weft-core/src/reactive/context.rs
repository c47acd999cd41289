//! Tracking Context
//!
//! The tracking context records which observer is currently executing.
//! This enables automatic dependency tracking: when a cell is read, the
//! engine registers the current observer as a dependent.
//!
//! # Implementation
//!
//! A thread-local stack tracks the currently executing observer. Entering
//! a tracking scope (running a reaction or derived computation) pushes an
//! entry; the scope guard pops it on drop, so the stack stays consistent
//! even if the computation panics. Nested scopes work the way nested
//! computations do: the innermost scope collects the reads.
//!
//! # Mutation guard
//!
//! Tracked renders must be pure reads. While a [`MutationGuard`] is
//! alive, cell writes fail with
//! [`RenderError::MutationDuringRender`](crate::error::RenderError). The
//! guard nests independently of tracking scopes: a derived computation
//! re-evaluated in the middle of a guarded render still may not write.

use std::cell::{Cell as StdCell, RefCell};

use smallvec::SmallVec;

use crate::error::RenderError;

use super::ObserverId;

thread_local! {
    static SCOPE_STACK: RefCell<Vec<ScopeEntry>> = const { RefCell::new(Vec::new()) };
    static FORBID_DEPTH: StdCell<usize> = const { StdCell::new(0) };
}

/// An entry on the tracking stack: the running observer and the cell IDs
/// it has read so far.
struct ScopeEntry {
    observer_id: ObserverId,
    reads: SmallVec<[u64; 8]>,
}

/// Guard for an active tracking scope. Pops the scope when dropped.
pub struct TrackingScope {
    observer_id: ObserverId,
}

impl TrackingScope {
    /// Enter a new tracking scope for the given observer.
    ///
    /// While the scope is active, cell reads register the observer as a
    /// dependent. The scope exits when the returned guard is dropped.
    pub fn enter(observer_id: ObserverId) -> Self {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(ScopeEntry {
                observer_id,
                reads: SmallVec::new(),
            });
        });
        Self { observer_id }
    }

    /// Whether any tracking scope is active on this thread.
    pub fn is_active() -> bool {
        SCOPE_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The observer of the innermost active scope, if any.
    pub fn current_observer() -> Option<ObserverId> {
        SCOPE_STACK.with(|stack| stack.borrow().last().map(|entry| entry.observer_id))
    }

    /// Record a cell read in the innermost scope. Called by cells.
    pub fn note_read(cell_id: u64) {
        SCOPE_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if !entry.reads.contains(&cell_id) {
                    entry.reads.push(cell_id);
                }
            }
        });
    }

    /// The cell IDs read so far in the innermost scope.
    pub fn reads() -> Vec<u64> {
        SCOPE_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.reads.to_vec())
                .unwrap_or_default()
        })
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.observer_id, self.observer_id,
                    "tracking scope mismatch: expected {:?}, got {:?}",
                    self.observer_id, entry.observer_id
                );
            }
        });
    }
}

/// Guard that forbids cell writes while alive.
pub struct MutationGuard {
    _private: (),
}

impl MutationGuard {
    /// Forbid writes on this thread until the guard drops.
    pub fn forbid() -> Self {
        FORBID_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self { _private: () }
    }
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        FORBID_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Whether cell writes are currently forbidden on this thread.
pub fn writes_forbidden() -> bool {
    FORBID_DEPTH.with(|depth| depth.get() > 0)
}

/// Fail with [`RenderError::MutationDuringRender`] if writes are
/// currently forbidden.
pub fn ensure_writes_allowed(cell: &str) -> Result<(), RenderError> {
    if writes_forbidden() {
        Err(RenderError::MutationDuringRender {
            cell: cell.to_string(),
        })
    } else {
        Ok(())
    }
}
