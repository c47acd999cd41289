//! Reactive Engine
//!
//! The dependency-tracking engine the render binding is built on. The
//! binding layer (see `binding`) only relies on the contract exposed
//! here:
//!
//! - [`Cell`]: one reactive storage location. Reads inside a tracking
//!   scope report "observed"; identity-changing writes notify observers
//!   synchronously.
//!
//! - [`Reaction`]: a tracked computation with an invalidation callback.
//!   `track(f)` records every cell `f` reads and `dispose()` ends the
//!   subscription for good.
//!
//! - [`Derived`]: a lazy cached computation invalidated through the same
//!   registry.
//!
//! - [`TrackingScope`] / [`MutationGuard`] (in [`context`]): the
//!   thread-local "currently tracking" state, and the guard that makes
//!   tracked renders read-only.
//!
//! Batching, transactions, and graph scheduling are deliberately absent:
//! dispatch is synchronous and re-entrant on the writer's call stack,
//! which is exactly what the render binding's coalescing flags are
//! designed around.

pub mod context;

mod cell;
mod derived;
mod observer;
mod reaction;
mod runtime;

pub use cell::Cell;
pub use context::{MutationGuard, TrackingScope};
pub use derived::Derived;
pub use observer::ObserverId;
pub use reaction::{InvalidateFn, Reaction};
pub use runtime::{Observer, ObserverHandle, Runtime};
