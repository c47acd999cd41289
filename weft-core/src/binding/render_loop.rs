//! Reactive Render Wrapper
//!
//! The dispatcher that turns a component's render function into a tracked
//! computation, and the invalidation callback that re-renders when any
//! cell read during the last render changes.
//!
//! # State machine
//!
//! ```text
//! Uninitialized -> TrackingFirstRender -> Steady
//!      Steady -> Invalidated -> Rerendering -> Steady
//!      any    -> Disposed (unmount, or a failed forced render)
//! ```
//!
//! - The first render through the dispatcher creates the reaction and
//!   executes inside `track`; it *is* the first paint, not a consequence
//!   of the update-skip decision.
//!
//! - An invalidation that arrives while `is_render_pending` is already
//!   set is coalesced away. The flag clears when a render actually runs,
//!   so a suppressed invalidation whose native render never came keeps
//!   coalescing until the next native render. This mirrors the original
//!   binding's single shared flag, deliberately.
//!
//! - While `skip_native_render` is up, the triggering write came from a
//!   native update the host is about to render anyway; the callback
//!   performs the pre-render bookkeeping but leaves the rendering to the
//!   host.
//!
//! - The tracked render runs under a [`MutationGuard`]: writes inside a
//!   render fail, the guard keeps dependency bookkeeping consistent, and
//!   the error surfaces after `track` returns.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use std::time::Instant;

use crate::component::{Component, ComponentInner, Node};
use crate::error::RenderError;
use crate::reactive::{MutationGuard, Reaction};
use crate::report::{self, ReportEvent};

/// Where a component instance is in its reactive life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderPhase {
    /// Dispatcher installed, no render has happened yet.
    Uninitialized,
    /// The mount-time tracked render is executing.
    TrackingFirstRender,
    /// Subscribed and idle.
    Steady,
    /// An observed cell changed; pre-render work is running.
    Invalidated,
    /// The forced re-render is in flight.
    Rerendering,
    /// The reaction is gone; the component will not react again.
    Disposed,
}

/// Reactive will-mount behavior: make `props`/`state` observable and
/// mark the render wrapper installed. Runs before any author hook, so
/// author code sees observable fields from the start.
///
/// In static rendering mode this is a no-op: no binding, no reaction,
/// plain renders.
pub(crate) fn install(component: &Component) {
    if component.is_static_rendering() {
        tracing::debug!(component = %component.label(), "static rendering; reactive setup skipped");
        return;
    }
    component.inner.props.bind();
    component.inner.state.bind();
    component.inner.installed.store(true, Ordering::SeqCst);
    tracing::trace!(component = %component.label(), "render wrapper installed");
}

/// The render dispatcher. Every render of the component funnels through
/// here: the mount-time first paint, native renders, forced renders.
pub(crate) fn render_entry(component: &Component) -> Result<Arc<Node>, RenderError> {
    if !component.inner.installed.load(Ordering::SeqCst) {
        return plain_render(component);
    }
    let phase = *component.inner.phase.read();
    match phase {
        RenderPhase::Disposed => Err(RenderError::Unmounted {
            component: component.name().to_string(),
        }),
        RenderPhase::Uninitialized => initial_render(component),
        _ => reactive_render(component),
    }
}

/// First tracked render: create the reaction, then render through it.
fn initial_render(component: &Component) -> Result<Arc<Node>, RenderError> {
    let weak = Arc::downgrade(&component.inner);
    let label = format!("{}.render()", component.label());
    let reaction = Reaction::new(label, move || on_invalidate(&weak));

    *component.inner.reaction.write() = Some(reaction);
    *component.inner.phase.write() = RenderPhase::TrackingFirstRender;
    reactive_render(component)
}

/// Execute the user's render inside the reaction's tracking scope.
fn reactive_render(component: &Component) -> Result<Arc<Node>, RenderError> {
    let inner = &component.inner;
    inner.flags.set_render_pending(false);

    let reaction = inner.reaction.read().clone();
    let Some(reaction) = reaction else {
        // Unreachable once installed, but a plain render is the safe
        // degenerate behavior.
        return plain_render(component);
    };

    let started = Instant::now();
    let outcome = reaction.track(|| {
        let _guard = MutationGuard::forbid();
        (inner.render)(component)
    });
    *inner.last_render_duration.write() = started.elapsed();

    match outcome {
        Ok(node) => {
            *inner.output.write() = Some(node.clone());
            *inner.phase.write() = RenderPhase::Steady;
            Ok(node)
        }
        Err(err) => {
            report::error_reporter().emit(&err);
            Err(err)
        }
    }
}

/// Untracked render for static mode and unbound definitions.
fn plain_render(component: &Component) -> Result<Arc<Node>, RenderError> {
    let inner = &component.inner;
    let started = Instant::now();
    let outcome = (inner.render)(component);
    *inner.last_render_duration.write() = started.elapsed();

    match outcome {
        Ok(node) => {
            *inner.output.write() = Some(node.clone());
            Ok(node)
        }
        Err(err) => {
            report::error_reporter().emit(&err);
            Err(err)
        }
    }
}

/// The reaction's invalidation callback: an observed cell changed.
///
/// Runs synchronously on the writer's stack. Errors from the forced
/// re-render dispose the reaction and propagate to the writer.
fn on_invalidate(weak: &Weak<ComponentInner>) -> Result<(), RenderError> {
    let Some(inner) = weak.upgrade() else {
        return Ok(());
    };
    let component = Component { inner };
    let flags = &component.inner.flags;

    // Coalesce re-entrant invalidations into the render already pending.
    if flags.is_render_pending() {
        return Ok(());
    }
    flags.set_render_pending(true);
    *component.inner.phase.write() = RenderPhase::Invalidated;
    tracing::trace!(component = %component.label(), "invalidated");

    if let Some(hook) = &component.inner.will_react {
        hook(&component);
    }

    // The pre-render hook may have unmounted the component.
    if flags.is_unmounted() {
        return Ok(());
    }

    *component.inner.phase.write() = RenderPhase::Rerendering;
    let previous = flags.swap_forcing_update(true);
    let result = if flags.is_skip_native_render() {
        // The write came from a native update; the host renders next.
        Ok(())
    } else {
        component.force_render()
    };
    flags.swap_forcing_update(previous);

    if let Err(err) = result {
        // A component that cannot render stops listening.
        if let Some(reaction) = component.inner.reaction.read().clone() {
            reaction.dispose();
        }
        *component.inner.phase.write() = RenderPhase::Disposed;
        return Err(err);
    }
    Ok(())
}

/// Reactive did-mount / did-update behavior: publish render timing and
/// the output handle on the reporting channel.
pub(crate) fn report_render(component: &Component) {
    let inner = &component.inner;
    if !inner.installed.load(Ordering::SeqCst) || !component.reporting_enabled() {
        return;
    }
    let node = inner.output.read().clone();
    if let Some(node) = &node {
        report::register_output(inner.id, node);
    }
    report::render_reporter().emit(&ReportEvent::Render {
        component: inner.id,
        name: inner.name.to_string(),
        render_duration: *inner.last_render_duration.read(),
        total_duration: inner.mounted_at.elapsed(),
        node,
    });
}

/// Reactive will-unmount behavior: dispose the reaction and publish the
/// destroy event. Runs after the author's hook. Safe to reach from
/// within the reaction's own invalidation (a pre-render hook that
/// unmounts).
pub(crate) fn teardown(component: &Component) {
    let inner = &component.inner;
    if !inner.installed.load(Ordering::SeqCst) {
        return;
    }
    if let Some(reaction) = inner.reaction.read().clone() {
        reaction.dispose();
    }
    *inner.phase.write() = RenderPhase::Disposed;

    if component.reporting_enabled() {
        report::render_reporter().emit(&ReportEvent::Destroy {
            component: inner.id,
            name: inner.name.to_string(),
            node: inner.output.read().clone(),
        });
    }
    report::release_output(inner.id);
    tracing::trace!(component = %component.label(), "reaction torn down");
}
