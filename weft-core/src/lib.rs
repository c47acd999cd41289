//! Weft Core
//!
//! This crate provides the core runtime for the Weft reactive
//! render-binding layer. It implements:
//!
//! - Reactive primitives (cells, reactions, derived values)
//! - The render binding: observable `props`/`state`, tracked renders,
//!   lifecycle hook composition, and the update-suppression policy
//! - A host component contract to bind against
//! - An optional render-reporting channel
//!
//! A bound component re-renders exactly when something it read during
//! its last render has changed, and not otherwise: the binder intercepts
//! `props`/`state` behind observable cells, wraps the render function in
//! a tracked reaction, and installs an update-skip decision so the
//! host's own update path and the reaction never render twice for one
//! change.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: cells, reactions, derived values, dependency tracking
//! - `binding`: the render binding (the heart of the crate)
//! - `component`: the host component contract
//! - `value`: dynamic values and the shared shallow equality
//! - `report`: render/destroy instrumentation events
//! - `config`: process-wide static-rendering and reporting flags
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_core::{observe, Cell, ComponentDef, Node, Value};
//!
//! let count = Cell::new("count", Value::Int(0));
//!
//! let cell = count.clone();
//! let def = ComponentDef::new("Counter", move |_| {
//!     Ok(Node::text(format!("count: {}", cell.get())).shared())
//! });
//! let counter = observe(&def)?.mount(Value::Null, Value::Null)?;
//!
//! // The mount rendered once. This write re-renders synchronously:
//! count.set(Value::Int(1))?;
//! assert_eq!(counter.output().unwrap().text_content(), "count: 1");
//! ```

pub mod binding;
pub mod component;
pub mod config;
pub mod error;
pub mod reactive;
pub mod report;
pub mod value;

pub use binding::{inject, observe, observe_render, observe_with, ObserveOptions};
pub use component::{Component, ComponentDef, ComponentId, Node, StoreContext};
pub use error::{BindError, RenderError};
pub use reactive::{Cell, Derived, Reaction};
pub use value::{shallow_equal, PropMap, Value};
