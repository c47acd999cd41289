//! Binding State Flags
//!
//! The per-instance booleans that coordinate the three mutually-exclusive
//! phases of a component's life: a native write, a forced render, and a
//! native render. There is no parallelism here, only synchronous
//! re-entrant dispatch, so these act as a minimal non-reentrant lock, not a
//! thread-level one.

use std::sync::atomic::{AtomicBool, Ordering};

/// Re-entrancy flags for one component instance.
#[derive(Debug, Default)]
pub(crate) struct BindingFlags {
    /// True between an invalidation and the completion of the resulting
    /// render. Coalesces re-entrant invalidation callbacks.
    render_pending: AtomicBool,
    /// True only while a forced re-render is in flight. Distinguishes
    /// framework-internal prop/state reassignment from real mutation.
    forcing_update: AtomicBool,
    /// Set transiently while a property-wrapper write notifies: the host
    /// is about to perform a native render for this very write, so the
    /// forced render would be redundant.
    skip_native_render: AtomicBool,
    /// Monotonic: once set, invalidation and instrumentation are no-ops.
    unmounted: AtomicBool,
}

impl BindingFlags {
    pub(crate) fn is_render_pending(&self) -> bool {
        self.render_pending.load(Ordering::SeqCst)
    }

    pub(crate) fn set_render_pending(&self, value: bool) {
        self.render_pending.store(value, Ordering::SeqCst);
    }

    pub(crate) fn is_forcing_update(&self) -> bool {
        self.forcing_update.load(Ordering::SeqCst)
    }

    /// Set the forcing flag and return its previous value, so nested
    /// forced paths can restore rather than clear.
    pub(crate) fn swap_forcing_update(&self, value: bool) -> bool {
        self.forcing_update.swap(value, Ordering::SeqCst)
    }

    pub(crate) fn is_skip_native_render(&self) -> bool {
        self.skip_native_render.load(Ordering::SeqCst)
    }

    pub(crate) fn set_skip_native_render(&self, value: bool) {
        self.skip_native_render.store(value, Ordering::SeqCst);
    }

    pub(crate) fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::SeqCst)
    }

    /// Mark unmounted. Monotonic; there is no way back.
    pub(crate) fn set_unmounted(&self) {
        self.unmounted.store(true, Ordering::SeqCst);
    }
}
