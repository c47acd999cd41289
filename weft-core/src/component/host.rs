//! Mounted Components
//!
//! The host side of the binding: constructing an instance from a
//! definition, dispatching its lifecycle, and driving its renders.
//!
//! # Update paths
//!
//! A mounted component renders through exactly three entry points:
//!
//! 1. **First paint**, during [`ComponentDef::mount`]. For a bound
//!    definition this is the tracked render that subscribes the
//!    component to everything it read.
//!
//! 2. **Native updates** ([`Component::update`], [`Component::set_props`],
//!    [`Component::set_state`]): the update-skip decision runs first,
//!    then the candidate values are assigned through the observable
//!    wrappers, then the host renders if the decision said so. The
//!    wrapper raises `skip_native_render` while its notification runs,
//!    so the reaction does not force a second, redundant render for the
//!    same write.
//!
//! 3. **Forced updates** ([`Component::force_update`]): bypasses the
//!    decision entirely. The host reassigns `props`/`state` under
//!    `is_forcing_update` (mirroring how frameworks re-hand a component
//!    its own values) and renders unconditionally. This is the entry
//!    point the reaction uses when an observed cell changes.
//!
//! `unmount` is idempotent; every render path on an unmounted component
//! fails with [`RenderError::Unmounted`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::binding::flags::BindingFlags;
use crate::binding::observable_ref::ObservableRef;
use crate::binding::render_loop::{self, RenderPhase};
use crate::binding::ObserveOptions;
use crate::config;
use crate::error::{BindError, RenderError};
use crate::reactive::Reaction;
use crate::value::{PropMap, Value};

use super::def::{ComponentDef, ComponentId, Hook, RenderFn, ShouldUpdateFn};
use super::node::Node;

/// Named stores available to injected components at mount.
#[derive(Debug, Clone, Default)]
pub struct StoreContext {
    stores: IndexMap<String, Value>,
}

impl StoreContext {
    /// An empty store context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide a named store.
    pub fn provide(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.stores.insert(name.into(), value);
        self
    }

    /// Look up a store by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.stores.get(name)
    }
}

pub(crate) struct ComponentInner {
    pub(crate) id: ComponentId,
    pub(crate) name: Arc<str>,
    pub(crate) render: RenderFn,
    pub(crate) will_mount: Option<Hook>,
    pub(crate) did_mount: Option<Hook>,
    pub(crate) did_update: Option<Hook>,
    pub(crate) will_unmount: Option<Hook>,
    pub(crate) will_react: Option<Hook>,
    pub(crate) should_update: Option<ShouldUpdateFn>,
    pub(crate) options: ObserveOptions,
    pub(crate) props: ObservableRef,
    pub(crate) state: ObservableRef,
    pub(crate) injected_values: Option<IndexMap<String, Value>>,
    pub(crate) flags: Arc<BindingFlags>,
    pub(crate) phase: RwLock<RenderPhase>,
    pub(crate) reaction: RwLock<Option<Reaction>>,
    pub(crate) installed: AtomicBool,
    pub(crate) output: RwLock<Option<Arc<Node>>>,
    pub(crate) mounted_at: Instant,
    pub(crate) last_render_duration: RwLock<Duration>,
}

/// A mounted component instance.
///
/// Cheap to clone; clones share the instance. Lifecycle hooks and render
/// functions receive `&Component` and read `props`/`state` through it.
#[derive(Clone)]
pub struct Component {
    pub(crate) inner: Arc<ComponentInner>,
}

impl ComponentDef {
    /// Mount the component with the given initial `props` and `state`.
    pub fn mount(&self, props: Value, state: Value) -> Result<Component, BindError> {
        self.mount_with_stores(props, state, &StoreContext::default())
    }

    /// Mount with a store context for injected definitions.
    ///
    /// Injected store values merge into map-shaped props; explicit props
    /// win over stores. Missing stores fail here, before any hook runs.
    pub fn mount_with_stores(
        &self,
        props: Value,
        state: Value,
        stores: &StoreContext,
    ) -> Result<Component, BindError> {
        let injected_values = self.resolve_stores(stores)?;
        let props = match &injected_values {
            Some(resolved) => merge_stores(self, props, resolved)?,
            None => props,
        };

        let flags = Arc::new(BindingFlags::default());
        let inner = Arc::new(ComponentInner {
            id: ComponentId::new(),
            name: self.name.clone(),
            render: self.render.clone(),
            will_mount: self.will_mount.clone(),
            did_mount: self.did_mount.clone(),
            did_update: self.did_update.clone(),
            will_unmount: self.will_unmount.clone(),
            will_react: self.will_react.clone(),
            should_update: self.should_update.clone(),
            options: self.options,
            props: ObservableRef::new("props", props, flags.clone()),
            state: ObservableRef::new("state", state, flags.clone()),
            injected_values,
            flags,
            phase: RwLock::new(RenderPhase::Uninitialized),
            reaction: RwLock::new(None),
            installed: AtomicBool::new(false),
            output: RwLock::new(None),
            mounted_at: Instant::now(),
            last_render_duration: RwLock::new(Duration::ZERO),
        });
        let component = Component { inner };

        tracing::debug!(component = %component.label(), "mounting");
        if let Some(hook) = &component.inner.will_mount {
            hook(&component);
        }

        // First paint. For bound definitions this is the tracked render
        // that establishes the subscriptions.
        render_loop::render_entry(&component)?;

        if let Some(hook) = &component.inner.did_mount {
            hook(&component);
        }
        Ok(component)
    }

    fn resolve_stores(
        &self,
        stores: &StoreContext,
    ) -> Result<Option<IndexMap<String, Value>>, BindError> {
        let Some(names) = &self.injected else {
            return Ok(None);
        };
        let mut resolved = IndexMap::new();
        for name in names {
            let value = stores
                .get(name)
                .cloned()
                .ok_or_else(|| BindError::MissingStore {
                    store: name.clone(),
                })?;
            resolved.insert(name.clone(), value);
        }
        Ok(Some(resolved))
    }
}

fn merge_stores(
    def: &ComponentDef,
    props: Value,
    resolved: &IndexMap<String, Value>,
) -> Result<Value, BindError> {
    let mut map = match props {
        Value::Null => PropMap::new(),
        Value::Map(m) => (*m).clone(),
        _ => {
            return Err(BindError::NonMapProps {
                component: def.name().to_string(),
            })
        }
    };
    for (name, value) in resolved {
        if !map.contains_key(name) {
            map.insert(name.clone(), value.clone());
        }
    }
    Ok(Value::Map(Arc::new(map)))
}

impl Component {
    /// The instance's unique identity.
    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    /// The component's display name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// `name#id`, for logs and reaction labels.
    pub(crate) fn label(&self) -> String {
        format!("{}{}", self.inner.name, self.inner.id)
    }

    /// Read `props`, reporting the read to the active tracking scope.
    pub fn props(&self) -> Value {
        self.inner.props.get()
    }

    /// Read `state`, reporting the read to the active tracking scope.
    pub fn state(&self) -> Value {
        self.inner.state.get()
    }

    /// Read `props` without establishing a dependency.
    pub fn props_untracked(&self) -> Value {
        self.inner.props.get_untracked()
    }

    /// Read `state` without establishing a dependency.
    pub fn state_untracked(&self) -> Value {
        self.inner.state.get_untracked()
    }

    /// The most recent rendered output.
    pub fn output(&self) -> Option<Arc<Node>> {
        self.inner.output.read().clone()
    }

    /// Whether reactive render binding is installed on this instance.
    pub fn is_reactive(&self) -> bool {
        self.inner.installed.load(Ordering::SeqCst)
    }

    /// Whether the component has been unmounted.
    pub fn is_unmounted(&self) -> bool {
        self.inner.flags.is_unmounted()
    }

    /// Effective static-rendering flag: the per-definition override, or
    /// the process-wide setting.
    pub fn is_static_rendering(&self) -> bool {
        self.inner
            .options
            .static_rendering
            .unwrap_or_else(config::is_static_rendering)
    }

    /// Effective render-reporting flag.
    pub(crate) fn reporting_enabled(&self) -> bool {
        self.inner
            .options
            .render_reporting
            .unwrap_or_else(config::is_render_reporting)
    }

    /// Hand the component new props through the native update path.
    ///
    /// Returns whether a native render was performed.
    pub fn set_props(&self, props: Value) -> Result<bool, RenderError> {
        self.update(Some(props), None)
    }

    /// Hand the component new state through the native update path.
    pub fn set_state(&self, state: Value) -> Result<bool, RenderError> {
        self.update(None, Some(state))
    }

    /// The native update path: decide, assign, then render if warranted.
    ///
    /// The update-skip decision sees the candidate values before they are
    /// assigned. Assignment always happens, decision notwithstanding, so
    /// the instance holds the latest values either way.
    pub fn update(
        &self,
        next_props: Option<Value>,
        next_state: Option<Value>,
    ) -> Result<bool, RenderError> {
        self.ensure_mounted()?;

        let next_props = next_props
            .map(|p| self.merge_injected(p))
            .transpose()?;

        let should = match &self.inner.should_update {
            Some(decide) => decide(self, next_props.as_ref(), next_state.as_ref()),
            None => true,
        };

        if let Some(props) = next_props {
            self.inner.props.set(props)?;
        }
        if let Some(state) = next_state {
            self.inner.state.set(state)?;
        }

        if should {
            render_loop::render_entry(self)?;
            self.run_did_update();
        }
        Ok(should)
    }

    /// The forced-update entry point: render now, bypassing the
    /// update-skip decision.
    pub fn force_update(&self) -> Result<(), RenderError> {
        self.ensure_mounted()?;
        let previous = self.inner.flags.swap_forcing_update(true);
        let result = self.force_render();
        self.inner.flags.swap_forcing_update(previous);
        result
    }

    /// The body of a forced update. The caller owns `is_forcing_update`.
    pub(crate) fn force_render(&self) -> Result<(), RenderError> {
        // The framework re-hands the component its own props and state;
        // with the forcing flag up, the wrappers absorb these silently.
        let props = self.inner.props.get_untracked();
        let state = self.inner.state.get_untracked();
        self.inner.props.set(props)?;
        self.inner.state.set(state)?;

        render_loop::render_entry(self)?;
        self.run_did_update();
        Ok(())
    }

    /// Unmount the component. Idempotent; later invalidations are no-ops.
    pub fn unmount(&self) {
        if self.inner.flags.is_unmounted() {
            return;
        }
        tracing::debug!(component = %self.label(), "unmounting");
        if let Some(hook) = &self.inner.will_unmount {
            hook(self);
        }
        self.inner.flags.set_unmounted();
    }

    fn run_did_update(&self) {
        if let Some(hook) = &self.inner.did_update {
            hook(self);
        }
    }

    fn ensure_mounted(&self) -> Result<(), RenderError> {
        if self.inner.flags.is_unmounted() {
            Err(RenderError::Unmounted {
                component: self.inner.name.to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn merge_injected(&self, props: Value) -> Result<Value, RenderError> {
        let Some(resolved) = &self.inner.injected_values else {
            return Ok(props);
        };
        // Injection guaranteed map props at mount; keep that shape here.
        let mut map = match props {
            Value::Null => PropMap::new(),
            Value::Map(m) => (*m).clone(),
            other => {
                return Err(RenderError::Render {
                    message: format!(
                        "component `{}` takes injected stores; props must be a map, got {other}",
                        self.inner.name
                    ),
                })
            }
        };
        for (name, value) in resolved {
            if !map.contains_key(name) {
                map.insert(name.clone(), value.clone());
            }
        }
        Ok(Value::Map(Arc::new(map)))
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("reactive", &self.is_reactive())
            .field("unmounted", &self.is_unmounted())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
