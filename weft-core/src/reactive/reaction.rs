//! Reaction
//!
//! A reaction is a tracked computation with an invalidation callback: it
//! executes a function under [`TrackingScope`], records every cell read
//! during that execution, and invokes the callback whenever any recorded
//! cell later changes.
//!
//! # Lifecycle
//!
//! 1. Created with a label and callback; registered with the runtime.
//!
//! 2. [`Reaction::track`] clears the previous run's dependencies, runs
//!    the function in a fresh tracking scope, and leaves the reaction
//!    subscribed to exactly the cells that run read.
//!
//! 3. A change to any subscribed cell invokes the callback synchronously
//!    on the writer's stack. The callback decides what to do; the render
//!    binding re-renders and re-tracks.
//!
//! 4. [`Reaction::dispose`] is idempotent and final: a disposed reaction
//!    never fires again and holds no subscriptions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RenderError;

use super::context::TrackingScope;
use super::observer::ObserverId;
use super::runtime::{Observer, ObserverHandle, Runtime};

/// The invalidation callback type.
pub type InvalidateFn = dyn Fn() -> Result<(), RenderError> + Send + Sync;

struct ReactionCore {
    observer_id: ObserverId,
    label: String,
    on_invalidate: Box<InvalidateFn>,
    disposed: AtomicBool,
}

impl Observer for ReactionCore {
    fn observer_id(&self) -> ObserverId {
        self.observer_id
    }

    fn invalidate(&self) -> Result<(), RenderError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Ok(());
        }
        (self.on_invalidate)()
    }
}

/// A tracked computation that re-fires its callback when any cell it
/// read last time changes.
///
/// Clones share the same underlying reaction. The reaction unregisters
/// from the runtime when disposed or when the last clone drops.
#[derive(Clone)]
pub struct Reaction {
    core: Arc<ReactionCore>,
    _registration: Arc<ObserverHandle>,
}

impl Reaction {
    /// Create a new reaction with a debug label and an invalidation
    /// callback. The function is not run yet; call [`Reaction::track`].
    pub fn new<F>(label: impl Into<String>, on_invalidate: F) -> Self
    where
        F: Fn() -> Result<(), RenderError> + Send + Sync + 'static,
    {
        let core = Arc::new(ReactionCore {
            observer_id: ObserverId::new(),
            label: label.into(),
            on_invalidate: Box::new(on_invalidate),
            disposed: AtomicBool::new(false),
        });
        let registration = Runtime::register(core.clone());
        Self {
            core,
            _registration: Arc::new(registration),
        }
    }

    /// The reaction's observer ID.
    pub fn observer_id(&self) -> ObserverId {
        self.core.observer_id
    }

    /// The reaction's debug label.
    pub fn label(&self) -> &str {
        &self.core.label
    }

    /// Execute `f` while tracking cell reads.
    ///
    /// Dependencies from the previous run are cleared first; afterwards
    /// the reaction is subscribed to exactly the cells `f` read. A
    /// disposed reaction runs `f` untracked, subscribing to nothing.
    pub fn track<T>(&self, f: impl FnOnce() -> T) -> T {
        if self.is_disposed() {
            return f();
        }
        Runtime::clear_dependencies(self.core.observer_id);
        let _scope = TrackingScope::enter(self.core.observer_id);
        f()
    }

    /// Dispose the reaction. Idempotent; safe to call from within the
    /// reaction's own invalidation callback.
    pub fn dispose(&self) {
        if !self.core.disposed.swap(true, Ordering::SeqCst) {
            tracing::trace!(label = %self.core.label, "reaction disposed");
            Runtime::unregister(self.core.observer_id);
        }
    }

    /// Whether the reaction has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.core.disposed.load(Ordering::SeqCst)
    }

    /// Number of cells the reaction is currently subscribed to.
    pub fn dependency_count(&self) -> usize {
        Runtime::dependency_count(self.core.observer_id)
    }
}

impl std::fmt::Debug for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reaction")
            .field("label", &self.core.label)
            .field("disposed", &self.is_disposed())
            .field("dependency_count", &self.dependency_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
