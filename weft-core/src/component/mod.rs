//! Host Component Contract
//!
//! The component abstraction the binding layer installs into: named
//! definitions with an overridable render function and lifecycle hooks,
//! mounted instances with a native update path and a forced-update entry
//! point, and a minimal rendered-output tree.
//!
//! The binder never subclasses or patches anything here; it returns new
//! definitions with composed hooks (see `binding`).

mod def;
mod host;
mod node;

pub use def::{ComponentDef, ComponentId, Hook, RenderFn, ShouldUpdateFn};
pub use host::{Component, StoreContext};
pub use node::Node;

pub(crate) use host::ComponentInner;
