//! Kinema Core
//!
//! Foundational primitives shared by the Kinema crates:
//!
//! - **Reactive Signals**: signals with automatically tracked, lazily
//!   recomputed derived values
//! - **Style Values**: ordered style/prop maps with tolerant comparison
//! - **Event Types**: interaction events dispatched to elements
//!
//! # Example
//!
//! ```rust
//! use kinema_core::{style, ReactiveGraph};
//!
//! let mut graph = ReactiveGraph::new();
//! let width = graph.create_signal(100.0f32);
//! let animated = graph.create_derived(move |g| style! { "width" => g.get(width).unwrap_or(0.0) });
//!
//! graph.set(width, 150.0);
//! assert_eq!(graph.get_derived(animated), Some(style! { "width" => 150.0 }));
//! ```

pub mod events;
pub mod reactive;
pub mod value;

pub use events::{event_name, event_types, parse_event_name, EventType};
pub use reactive::{
    in_derived_computation, Derived, DerivedId, ReactiveGraph, ReactiveStats,
    SharedReactiveGraph, Signal, SignalId,
};
pub use value::{PropMismatch, PropValue, Style, DEFAULT_NUMBER_EPSILON};
