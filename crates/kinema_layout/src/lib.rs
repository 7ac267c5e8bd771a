//! Kinema Layout
//!
//! Declarative element trees whose styles are driven by shared values.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use kinema_animation::AnimationScheduler;
//! use kinema_core::{event_types, style, ReactiveGraph};
//! use kinema_layout::prelude::*;
//!
//! let scheduler = AnimationScheduler::new(Arc::new(Mutex::new(ReactiveGraph::new())));
//! let (tree, effects) = mount(&scheduler, |cx| {
//!     let width = cx.use_shared_value(100.0);
//!     let pressed = width.clone();
//!     view()
//!         .child(animated_view().test_id("box").bind("width", &width))
//!         .child(button("Grow").test_id("grow").on_press(move |_| {
//!             pressed.set(pressed.get() + 50.0);
//!         }))
//! })
//! .unwrap();
//! effects.run();
//!
//! let grow = tree.find_by_test_id("grow").unwrap();
//! tree.dispatch(grow, event_types::PRESS);
//!
//! let node = tree.find_by_test_id("box").unwrap();
//! assert_eq!(tree.resolve_style(node), Some(style! { "width" => 150.0 }));
//! ```

pub mod element;
pub mod error;
pub mod event_handler;
pub mod mount;
pub mod renderer;
pub mod style;

pub use element::{animated_view, button, text, view, Element, ElementKind};
pub use error::{LayoutError, Result};
pub use event_handler::{EventCallback, EventContext, EventHandlers};
pub use mount::{mount, MountContext, MountEffects};
pub use renderer::{LayoutNodeId, RenderTree};
pub use style::{AnimatedProps, AnimatedStyle, StyleBinding, StyleScope, STYLE_PROP};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::element::{animated_view, button, text, view, Element, ElementKind};
    pub use crate::event_handler::EventContext;
    pub use crate::mount::{mount, MountContext};
    pub use crate::renderer::{LayoutNodeId, RenderTree};
    pub use crate::style::{AnimatedProps, AnimatedStyle, StyleScope};
}
