//! Error Taxonomy
//!
//! Two distinct failure families:
//!
//! - [`RenderError`]: failures on a render path. These propagate as
//!   `Result` to whatever call invoked the render: the host's own
//!   mount/update call, or a cell write whose notification forced a
//!   re-render.
//!
//! - [`BindError`]: setup-time misuse (binding an invalid definition,
//!   conflicting store injection, unresolvable stores). Surfaced
//!   synchronously to the caller of the binder, never deferred.
//!
//! Instrumentation failures are deliberately absent: the reporting
//! channel swallows its own errors (see `report`).

use thiserror::Error;

/// A failure while rendering, or while driving a render path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The component's render function failed.
    #[error("render failed: {message}")]
    Render {
        /// Author-provided description of the failure.
        message: String,
    },

    /// A reactive cell was written while a tracked render was running.
    /// Renders must be pure reads of observable state.
    #[error("cell `{cell}` was written during a tracked render")]
    MutationDuringRender {
        /// Name of the cell that was written.
        cell: String,
    },

    /// A render path was invoked on a component that has been unmounted.
    #[error("component `{component}` is unmounted")]
    Unmounted {
        /// Display name of the component.
        component: String,
    },
}

impl RenderError {
    /// Shorthand for a render failure with the given message.
    pub fn msg(message: impl Into<String>) -> Self {
        RenderError::Render {
            message: message.into(),
        }
    }
}

/// Setup-time misuse of the binder.
#[derive(Debug, Error)]
pub enum BindError {
    /// The definition cannot be bound as given.
    #[error("invalid bind target: {reason}")]
    InvalidTarget {
        /// Why the target was rejected.
        reason: String,
    },

    /// Injection was applied twice with different store lists.
    #[error("stores already injected as {existing:?}, refusing {requested:?}")]
    ConflictingInjection {
        /// Store names from the first application.
        existing: Vec<String>,
        /// Store names from the conflicting application.
        requested: Vec<String>,
    },

    /// An injected store was not provided by the mount context.
    #[error("store `{store}` was not provided")]
    MissingStore {
        /// Name of the missing store.
        store: String,
    },

    /// Store injection requires map-shaped props to merge into.
    #[error("component `{component}` has injected stores but non-map props")]
    NonMapProps {
        /// Display name of the component.
        component: String,
    },

    /// The first paint during mount failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}
