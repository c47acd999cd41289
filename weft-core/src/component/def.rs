//! Component Definitions
//!
//! A [`ComponentDef`] is the host-framework-side description of a
//! component: a display name, a render function, and optional author
//! lifecycle hooks. Definitions are cheap to clone (hooks are shared) and
//! one definition can be mounted many times.
//!
//! The binder (`observe`) returns a new definition with composed hooks;
//! it never mutates a definition in place, and a definition that has
//! already been bound passes through unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::RenderError;
use crate::value::Value;

use super::host::Component;
use super::node::Node;

/// Unique identifier for a mounted component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Generate a new unique component ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A render function: a pure read of observable state producing output.
pub type RenderFn =
    Arc<dyn Fn(&Component) -> Result<Arc<Node>, RenderError> + Send + Sync>;

/// A lifecycle hook.
pub type Hook = Arc<dyn Fn(&Component) + Send + Sync>;

/// An update-skip decision: given the candidate next `props`/`state`
/// (`None` means "unchanged"), should the host perform a native render?
pub type ShouldUpdateFn =
    Arc<dyn Fn(&Component, Option<&Value>, Option<&Value>) -> bool + Send + Sync>;

/// The definition of a component: render function plus author hooks.
#[derive(Clone)]
pub struct ComponentDef {
    pub(crate) name: Arc<str>,
    pub(crate) render: RenderFn,
    pub(crate) will_mount: Option<Hook>,
    pub(crate) did_mount: Option<Hook>,
    pub(crate) did_update: Option<Hook>,
    pub(crate) will_unmount: Option<Hook>,
    pub(crate) will_react: Option<Hook>,
    pub(crate) should_update: Option<ShouldUpdateFn>,
    /// Set once by the binder; bound definitions are never re-wrapped.
    pub(crate) bound: bool,
    /// Per-definition overrides of the process-wide flags.
    pub(crate) options: crate::binding::ObserveOptions,
    /// Store names to resolve and merge into props at mount.
    pub(crate) injected: Option<Vec<String>>,
}

impl ComponentDef {
    /// Create a definition with the given display name and render
    /// function.
    pub fn new<F>(name: impl Into<String>, render: F) -> Self
    where
        F: Fn(&Component) -> Result<Arc<Node>, RenderError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into().as_str()),
            render: Arc::new(render),
            will_mount: None,
            did_mount: None,
            did_update: None,
            will_unmount: None,
            will_react: None,
            should_update: None,
            bound: false,
            options: crate::binding::ObserveOptions::default(),
            injected: None,
        }
    }

    /// The component's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the binder has already processed this definition.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Store names this definition expects at mount, if any.
    pub fn injected_stores(&self) -> Option<&[String]> {
        self.injected.as_deref()
    }

    /// Hook run before the first render.
    pub fn on_will_mount<F: Fn(&Component) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.will_mount = Some(Arc::new(f));
        self
    }

    /// Hook run after the first render.
    pub fn on_did_mount<F: Fn(&Component) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.did_mount = Some(Arc::new(f));
        self
    }

    /// Hook run after every subsequent render.
    pub fn on_did_update<F: Fn(&Component) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.did_update = Some(Arc::new(f));
        self
    }

    /// Hook run at unmount, before teardown.
    pub fn on_will_unmount<F: Fn(&Component) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.will_unmount = Some(Arc::new(f));
        self
    }

    /// Hook run when an observed cell changed, before any render work.
    pub fn on_will_react<F: Fn(&Component) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.will_react = Some(Arc::new(f));
        self
    }

    /// Author-defined update-skip decision. When present, the binder
    /// leaves it untouched instead of installing the default policy.
    pub fn with_should_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Component, Option<&Value>, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.should_update = Some(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDef")
            .field("name", &self.name)
            .field("bound", &self.bound)
            .field("injected", &self.injected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_ids_are_unique() {
        assert_ne!(ComponentId::new(), ComponentId::new());
    }

    #[test]
    fn builder_installs_hooks() {
        let def = ComponentDef::new("X", |_| Ok(Node::Empty.shared()))
            .on_will_mount(|_| {})
            .on_did_mount(|_| {})
            .with_should_update(|_, _, _| true);

        assert!(def.will_mount.is_some());
        assert!(def.did_mount.is_some());
        assert!(def.did_update.is_none());
        assert!(def.should_update.is_some());
        assert!(!def.is_bound());
        assert_eq!(def.name(), "X");
    }
}
