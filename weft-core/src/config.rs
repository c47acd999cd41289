//! Process-Wide Configuration
//!
//! Two global toggles, both off by default, confined to this module:
//!
//! - **Static rendering**: components bind without any reactive setup.
//!   No reaction is created, no cell is observed, lifecycle hooks behave
//!   as the author wrote them. Intended for output-once contexts.
//!
//! - **Render reporting**: the instrumentation channel (see `report`)
//!   emits render/destroy events with timing data.
//!
//! Definitions can override either flag per component with
//! [`ObserveOptions`](crate::binding::ObserveOptions); the process-wide
//! value is only the fallback.

use std::sync::atomic::{AtomicBool, Ordering};

struct RuntimeConfig {
    static_rendering: AtomicBool,
    render_reporting: AtomicBool,
}

static CONFIG: RuntimeConfig = RuntimeConfig {
    static_rendering: AtomicBool::new(false),
    render_reporting: AtomicBool::new(false),
};

/// Enable or disable static rendering for the whole process.
pub fn set_static_rendering(enabled: bool) {
    CONFIG.static_rendering.store(enabled, Ordering::SeqCst);
}

/// Whether static rendering is enabled process-wide.
pub fn is_static_rendering() -> bool {
    CONFIG.static_rendering.load(Ordering::SeqCst)
}

/// Enable or disable render reporting for the whole process.
pub fn set_render_reporting(enabled: bool) {
    CONFIG.render_reporting.store(enabled, Ordering::SeqCst);
}

/// Whether render reporting is enabled process-wide.
pub fn is_render_reporting() -> bool {
    CONFIG.render_reporting.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_off_and_round_trip() {
        assert!(!is_static_rendering());
        assert!(!is_render_reporting());

        set_static_rendering(true);
        assert!(is_static_rendering());
        set_static_rendering(false);

        set_render_reporting(true);
        assert!(is_render_reporting());
        set_render_reporting(false);
    }
}
