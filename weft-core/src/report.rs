//! Instrumentation Channel
//!
//! An optional side channel publishing render timing and teardown events,
//! plus an identity-keyed registry mapping rendered output back to the
//! component that produced it. Nothing here may influence render
//! correctness: emission failures are swallowed, handle resolution
//! degrades to `None`, and a panicking subscriber is caught and logged.
//!
//! Reporting is off by default; enable it process-wide with
//! [`config::set_render_reporting`](crate::config::set_render_reporting)
//! or per definition via
//! [`ObserveOptions`](crate::binding::ObserveOptions).

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::component::{ComponentId, Node};
use crate::error::RenderError;

/// An event on the render-reporting channel.
#[derive(Debug, Clone)]
pub enum ReportEvent {
    /// A component finished a render.
    Render {
        /// Identity of the component instance.
        component: ComponentId,
        /// Display name of the component.
        name: String,
        /// Time spent inside the tracked render.
        render_duration: Duration,
        /// Time since the component started mounting.
        total_duration: Duration,
        /// Best-effort handle to the rendered output. `None` when the
        /// output could not be resolved.
        node: Option<Arc<Node>>,
    },
    /// A component was unmounted.
    Destroy {
        /// Identity of the component instance.
        component: ComponentId,
        /// Display name of the component.
        name: String,
        /// Best-effort handle to the last rendered output.
        node: Option<Arc<Node>>,
    },
}

/// A simple synchronous publish/subscribe channel.
///
/// Subscribers are invoked in subscription order on the emitter's
/// calling thread. A subscriber that panics is caught and logged; it
/// never disturbs the emitter or other subscribers.
pub struct Emitter<T> {
    subscribers: RwLock<Vec<(u64, Arc<dyn Fn(&T) + Send + Sync>)>>,
    next_id: AtomicU64,
}

impl<T> Emitter<T> {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Subscribe to events. Dropping the returned guard unsubscribes.
    pub fn subscribe<F>(&'static self, f: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, Arc::new(f)));
        Subscription { emitter: self, id }
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.write().retain(|(sub_id, _)| *sub_id != id);
    }

    /// Publish an event to all current subscribers.
    pub fn emit(&self, event: &T) {
        // Snapshot so subscribers may subscribe/unsubscribe re-entrantly.
        let subscribers: Vec<Arc<dyn Fn(&T) + Send + Sync>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();

        for subscriber in subscribers {
            if panic::catch_unwind(AssertUnwindSafe(|| subscriber(event))).is_err() {
                tracing::warn!("report subscriber panicked; event dropped for it");
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for an active subscription; unsubscribes on drop.
pub struct Subscription<T: 'static> {
    emitter: &'static Emitter<T>,
    id: u64,
}

impl<T: 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.emitter.unsubscribe(self.id);
    }
}

static RENDER_REPORTER: OnceLock<Emitter<ReportEvent>> = OnceLock::new();
static ERROR_REPORTER: OnceLock<Emitter<RenderError>> = OnceLock::new();

/// The process-wide render-reporting channel.
pub fn render_reporter() -> &'static Emitter<ReportEvent> {
    RENDER_REPORTER.get_or_init(Emitter::new)
}

/// The process-wide render-error channel. Every render failure is
/// published here before it propagates.
pub fn error_reporter() -> &'static Emitter<RenderError> {
    ERROR_REPORTER.get_or_init(Emitter::new)
}

// ----------------------------------------------------------------------------
// Output-node registry
// ----------------------------------------------------------------------------

struct NodeEntry {
    node: Weak<Node>,
    component: ComponentId,
}

static NODE_REGISTRY: OnceLock<DashMap<usize, NodeEntry>> = OnceLock::new();

fn node_registry() -> &'static DashMap<usize, NodeEntry> {
    NODE_REGISTRY.get_or_init(DashMap::new)
}

fn node_key(node: &Arc<Node>) -> usize {
    Arc::as_ptr(node) as usize
}

/// Associate a component's latest output with its identity. Replaces any
/// previous association for the same component.
pub(crate) fn register_output(component: ComponentId, node: &Arc<Node>) {
    let registry = node_registry();
    registry.retain(|_, entry| {
        entry.component != component && entry.node.strong_count() > 0
    });
    registry.insert(
        node_key(node),
        NodeEntry {
            node: Arc::downgrade(node),
            component,
        },
    );
}

/// Drop any association for the component. Called at unmount.
pub(crate) fn release_output(component: ComponentId) {
    node_registry().retain(|_, entry| entry.component != component);
}

/// Look up which component produced an output node, if the association
/// is still alive.
pub fn component_for_node(node: &Arc<Node>) -> Option<ComponentId> {
    let registry = node_registry();
    let entry = registry.get(&node_key(node))?;
    let live = entry.node.upgrade()?;
    if Arc::ptr_eq(&live, node) {
        Some(entry.component)
    } else {
        None
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
