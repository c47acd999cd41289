//! Update Decision Policy
//!
//! The default answer to "should the host perform a native render right
//! now", installed by the binder when the author did not define an
//! update-skip hook of their own.
//!
//! State changes always render: the host's own re-creation of state
//! values is treated as always significant. Props render only when the
//! candidate value is not shallow-equal to the current one. The equality
//! here is the same one the property wrapper gates writes with, so a
//! prop write the wrapper silently absorbed can never disagree with this
//! decision.

use crate::component::Component;
use crate::value::{shallow_equal, Value};

/// Default update-skip decision for reactively bound components.
///
/// `next_props`/`next_state` are the candidate values; `None` means the
/// field is not changing in this update.
pub fn default_should_update(
    component: &Component,
    next_props: Option<&Value>,
    next_state: Option<&Value>,
) -> bool {
    if component.is_static_rendering() {
        tracing::warn!(
            component = component.name(),
            "re-render decision requested in static rendering mode; \
             static components are meant to render exactly once"
        );
    }

    // Update on any state replacement, identity-compared.
    if let Some(next) = next_state {
        if !component.state_untracked().same(next) {
            return true;
        }
    }

    // Update only when props are shallowly modified.
    match next_props {
        Some(next) => !shallow_equal(&component.props_untracked(), next),
        None => false,
    }
}
