//! Lifecycle Binder
//!
//! `observe` takes a component definition and returns a reactively bound
//! one. Binding composes hooks once, up front: each lifecycle slot gets a
//! single closure calling the reactive behavior and the author's hook in
//! a fixed order. Nothing is patched at run time and author hooks are
//! never discarded.
//!
//! Composition order:
//!
//! - will-mount: reactive setup first, author second. Reactive setup must
//!   exist before author code that reads `props`/`state`.
//! - did-mount, did-update, will-unmount: author first, reactive second.
//!
//! The default update-skip decision is installed only when the author did
//! not define one; an explicit author decision is user intent and stays.
//!
//! Binding is idempotent: a bound definition passes through unchanged,
//! so hooks are wrapped exactly once no matter how often `observe` runs.

use std::sync::Arc;

use crate::component::{Component, ComponentDef, Hook};
use crate::error::BindError;

use super::{policy, render_loop};

/// Per-definition overrides of the process-wide flags. `None` defers to
/// the global configuration at run time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Override for static rendering.
    pub static_rendering: Option<bool>,
    /// Override for render reporting.
    pub render_reporting: Option<bool>,
}

/// Bind a definition reactively with default options.
pub fn observe(def: &ComponentDef) -> Result<ComponentDef, BindError> {
    observe_with(def, ObserveOptions::default())
}

/// Bind a definition reactively.
///
/// Returns a new definition with composed hooks; the input is untouched.
/// Re-binding a bound definition is a no-op pass-through.
pub fn observe_with(
    def: &ComponentDef,
    options: ObserveOptions,
) -> Result<ComponentDef, BindError> {
    if def.name().is_empty() {
        return Err(BindError::InvalidTarget {
            reason: "component definitions need a non-empty name".into(),
        });
    }
    if def.is_bound() {
        return Ok(def.clone());
    }

    let mut bound = def.clone();
    bound.bound = true;
    bound.options = options;

    bound.will_mount = Some(compose(
        def.will_mount.clone(),
        Arc::new(|c: &Component| render_loop::install(c)),
        true,
    ));
    bound.did_mount = Some(compose(
        def.did_mount.clone(),
        Arc::new(|c: &Component| render_loop::report_render(c)),
        false,
    ));
    bound.did_update = Some(compose(
        def.did_update.clone(),
        Arc::new(|c: &Component| render_loop::report_render(c)),
        false,
    ));
    bound.will_unmount = Some(compose(
        def.will_unmount.clone(),
        Arc::new(|c: &Component| render_loop::teardown(c)),
        false,
    ));

    if bound.should_update.is_none() {
        bound.should_update = Some(Arc::new(policy::default_should_update));
    }

    tracing::debug!(component = def.name(), "definition bound");
    Ok(bound)
}

/// Bind a pure render function, promoting it to a full definition.
pub fn observe_render<F>(name: impl Into<String>, render: F) -> Result<ComponentDef, BindError>
where
    F: Fn(&Component)
            -> Result<std::sync::Arc<crate::component::Node>, crate::error::RenderError>
        + Send
        + Sync
        + 'static,
{
    observe(&ComponentDef::new(name, render))
}

/// Mark a definition as requiring named stores at mount.
///
/// Re-applying with the same list is a no-op; a different list is a
/// conflict and fails.
pub fn inject(def: &ComponentDef, stores: &[&str]) -> Result<ComponentDef, BindError> {
    let requested: Vec<String> = stores.iter().map(|s| s.to_string()).collect();
    if let Some(existing) = def.injected_stores() {
        if existing == requested.as_slice() {
            return Ok(def.clone());
        }
        return Err(BindError::ConflictingInjection {
            existing: existing.to_vec(),
            requested,
        });
    }
    let mut out = def.clone();
    out.injected = Some(requested);
    Ok(out)
}

/// Build one composed hook from the author's hook (if any) and the
/// reactive behavior, in the given order. Built once, at bind time.
fn compose(author: Option<Hook>, reactive: Hook, reactive_first: bool) -> Hook {
    match author {
        None => reactive,
        Some(base) => {
            if reactive_first {
                Arc::new(move |c: &Component| {
                    reactive(c);
                    base(c);
                })
            } else {
                Arc::new(move |c: &Component| {
                    base(c);
                    reactive(c);
                })
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
