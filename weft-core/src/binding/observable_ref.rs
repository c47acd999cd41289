//! Observable Property Wrapper
//!
//! Wraps one component field (`props` or `state`) as an accessor pair
//! backed by an observable [`Cell`] plus a held value, with a
//! shallow-equality gate in front of the cell write.
//!
//! # Write path
//!
//! A bound ref's write is gated twice:
//!
//! - While the component is inside a forced update, the host is
//!   reassigning the field it already rendered from; the value is
//!   replaced silently.
//!
//! - A shallow-equal value carries no observable change; it is replaced
//!   silently. This must use the *same* equality as the update decision
//!   policy, or a write one layer absorbs could still re-render through
//!   the other.
//!
//! A genuinely new value is stored and then notified with
//! `skip_native_render` raised for the duration: the native render the
//! host is about to perform covers this write, so the reaction's forced
//! render bows out (see `render_loop`).
//!
//! # Unbound refs
//!
//! Before reactive setup (and permanently in static-rendering mode) a
//! ref behaves as a plain holder: reads report nothing, writes notify
//! nobody.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RenderError;
use crate::reactive::{context, Cell};
use crate::value::{shallow_equal, Value};

use super::flags::BindingFlags;

/// A component field routed through an observable cell.
pub(crate) struct ObservableRef {
    cell: Cell,
    flags: Arc<BindingFlags>,
    bound: AtomicBool,
}

impl ObservableRef {
    /// Create an unbound ref holding `initial`.
    pub(crate) fn new(name: impl Into<String>, initial: Value, flags: Arc<BindingFlags>) -> Self {
        Self {
            cell: Cell::new(name, initial),
            flags,
            bound: AtomicBool::new(false),
        }
    }

    /// Switch the ref from plain holder to observable accessor.
    pub(crate) fn bind(&self) {
        self.bound.store(true, Ordering::SeqCst);
    }

    /// Whether the ref is observable.
    pub(crate) fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    /// Read the held value. Bound refs report "observed" so the current
    /// tracking scope subscribes to this field.
    pub(crate) fn get(&self) -> Value {
        if self.is_bound() {
            self.cell.get()
        } else {
            self.cell.get_untracked()
        }
    }

    /// Read the held value without reporting.
    pub(crate) fn get_untracked(&self) -> Value {
        self.cell.get_untracked()
    }

    /// Write the field, notifying observers only for a genuinely new
    /// value outside a forced update.
    pub(crate) fn set(&self, next: Value) -> Result<(), RenderError> {
        if !self.is_bound() {
            self.cell.replace(next);
            return Ok(());
        }

        context::ensure_writes_allowed(self.cell.name())?;

        let held = self.cell.get_untracked();
        if !self.flags.is_forcing_update() && !shallow_equal(&held, &next) {
            self.cell.replace(next);
            // The host renders natively for this write; suppress the
            // reaction's forced render while observers hear about it.
            self.flags.set_skip_native_render(true);
            let result = self.cell.invalidate();
            self.flags.set_skip_native_render(false);
            result
        } else {
            self.cell.replace(next);
            Ok(())
        }
    }
}

impl std::fmt::Debug for ObservableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableRef")
            .field("cell", &self.cell.name())
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Reaction;
    use std::sync::atomic::AtomicI32;

    fn bound_ref(initial: Value) -> (ObservableRef, Arc<BindingFlags>) {
        let flags = Arc::new(BindingFlags::default());
        let field = ObservableRef::new("props", initial, flags.clone());
        field.bind();
        (field, flags)
    }

    fn watch() -> (Reaction, Arc<AtomicI32>) {
        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();
        let reaction = Reaction::new("watch", move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (reaction, fired)
    }

    #[test]
    fn unbound_ref_is_a_plain_holder() {
        let flags = Arc::new(BindingFlags::default());
        let field = ObservableRef::new("props", Value::Int(1), flags);

        let (reaction, fired) = watch();
        reaction.track(|| {
            field.get();
        });

        field.set(Value::Int(2)).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(field.get_untracked().same(&Value::Int(2)));
    }

    #[test]
    fn shallow_unequal_write_notifies() {
        let (field, _flags) = bound_ref(Value::map([("count", Value::Int(1))]));
        let (reaction, fired) = watch();
        reaction.track(|| {
            field.get();
        });

        field.set(Value::map([("count", Value::Int(2))])).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shallow_equal_write_is_silent() {
        let (field, _flags) = bound_ref(Value::map([("count", Value::Int(1))]));
        let (reaction, fired) = watch();
        reaction.track(|| {
            field.get();
        });

        let equal = Value::map([("count", Value::Int(1))]);
        field.set(equal.clone()).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // The held value is still replaced.
        assert!(field.get_untracked().same(&equal));
    }

    #[test]
    fn writes_during_forced_update_are_silent() {
        let (field, flags) = bound_ref(Value::map([("count", Value::Int(1))]));
        let (reaction, fired) = watch();
        reaction.track(|| {
            field.get();
        });

        flags.swap_forcing_update(true);
        field.set(Value::map([("count", Value::Int(9))])).unwrap();
        flags.swap_forcing_update(false);

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(field
            .get_untracked()
            .get("count")
            .same(&Value::Int(9)));
    }

    #[test]
    fn skip_flag_is_raised_during_notification() {
        let (field, flags) = bound_ref(Value::Int(0));

        let observed_skip = Arc::new(AtomicBool::new(false));
        let observed_clone = observed_skip.clone();
        let flags_clone = flags.clone();
        let reaction = Reaction::new("watch", move || {
            observed_clone.store(flags_clone.is_skip_native_render(), Ordering::SeqCst);
            Ok(())
        });
        reaction.track(|| {
            field.get();
        });

        field.set(Value::Int(1)).unwrap();
        assert!(observed_skip.load(Ordering::SeqCst));
        assert!(!flags.is_skip_native_render());
    }
}
