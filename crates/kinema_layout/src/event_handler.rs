//! Event handler storage for elements
//!
//! Handlers are registered on elements with the builder API, moved into the
//! [`RenderTree`] on mount, and invoked by [`RenderTree::dispatch`].
//!
//! ```text
//! Element
//!     ↓ .on_press(|e| ...)
//! EventHandlers (stored on element)
//!     ↓ mounted into RenderTree
//! RenderTree::dispatch bubbles to the nearest handler
//!     ↓
//! Handler callback invoked
//! ```
//!
//! [`RenderTree`]: crate::renderer::RenderTree
//! [`RenderTree::dispatch`]: crate::renderer::RenderTree::dispatch

use std::collections::HashMap;
use std::rc::Rc;

use kinema_core::events::{event_types, EventType};

use crate::renderer::LayoutNodeId;

/// Element event callback; a mounted tree is driven from one thread
pub type EventCallback = Rc<dyn Fn(&EventContext)>;

/// What a handler learns about the event it is handling
#[derive(Clone, Debug)]
pub struct EventContext {
    pub event_type: EventType,
    /// The node whose handler is running
    pub node_id: LayoutNodeId,
    /// The node the event was fired on
    pub target: LayoutNodeId,
}

impl EventContext {
    /// Context for an event handled on the node it was fired on
    pub fn new(event_type: EventType, node_id: LayoutNodeId) -> Self {
        Self {
            event_type,
            node_id,
            target: node_id,
        }
    }

    /// Set the node the event was originally fired on
    pub fn with_target(mut self, target: LayoutNodeId) -> Self {
        self.target = target;
        self
    }

    /// Whether the event reached this handler by bubbling from a descendant
    pub fn is_bubbled(&self) -> bool {
        self.node_id != self.target
    }
}

/// Handlers registered on one element, keyed by event type
#[derive(Default, Clone)]
pub struct EventHandlers {
    handlers: HashMap<EventType, Vec<EventCallback>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_handler(&self, event_type: EventType) -> bool {
        self.handlers.contains_key(&event_type)
    }

    /// Add a handler; handlers for the same event run in registration order
    pub fn on<F>(&mut self, event_type: EventType, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(Rc::new(handler));
    }

    pub fn on_press<F>(&mut self, handler: F)
    where
        F: Fn(&EventContext) + 'static,
    {
        self.on(event_types::PRESS, handler);
    }

    pub fn get(&self, event_type: EventType) -> Option<&[EventCallback]> {
        self.handlers.get(&event_type).map(|v| v.as_slice())
    }

    /// Run every handler registered for `ctx.event_type`
    pub fn dispatch(&self, ctx: &EventContext) {
        if let Some(handlers) = self.handlers.get(&ctx.event_type) {
            for handler in handlers {
                handler(ctx);
            }
        }
    }
}
