//! Element builders
//!
//! A fluent builder API for declaring the tree a component renders:
//!
//! ```rust
//! use kinema_core::style;
//! use kinema_layout::prelude::*;
//!
//! let ui = view()
//!     .test_id("root")
//!     .style(style! { "flex" => 1.0 })
//!     .child(text("Hello"))
//!     .child(button("Press me").on_press(|_| {}));
//! assert_eq!(ui.children().len(), 2);
//! ```

use kinema_animation::SharedValue;
use kinema_core::events::EventType;
use kinema_core::Style;

use crate::event_handler::{EventContext, EventHandlers};
use crate::style::{AnimatedProps, AnimatedStyle, StyleBinding};

/// The kind of an element
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A plain container
    View,
    /// A container whose style may be driven by shared values
    AnimatedView,
    /// A pressable control with a title
    Button { title: String },
    /// A run of text
    Text { content: String },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::View => "View",
            ElementKind::AnimatedView => "AnimatedView",
            ElementKind::Button { .. } => "Button",
            ElementKind::Text { .. } => "Text",
        }
    }

    /// Whether shared values may drive this element's style
    pub fn is_animated(&self) -> bool {
        matches!(self, ElementKind::AnimatedView)
    }
}

/// A declared element, not yet mounted
pub struct Element {
    pub(crate) kind: ElementKind,
    pub(crate) test_id: Option<String>,
    pub(crate) style: Style,
    pub(crate) bindings: Vec<StyleBinding>,
    pub(crate) animated_style: Option<AnimatedStyle>,
    pub(crate) animated_props: Option<AnimatedProps>,
    pub(crate) handlers: EventHandlers,
    pub(crate) children: Vec<Element>,
}

/// Create a plain view
pub fn view() -> Element {
    Element::new(ElementKind::View)
}

/// Create an animated view
pub fn animated_view() -> Element {
    Element::new(ElementKind::AnimatedView)
}

/// Create a button with a title
pub fn button(title: impl Into<String>) -> Element {
    Element::new(ElementKind::Button {
        title: title.into(),
    })
}

/// Create a text element
pub fn text(content: impl Into<String>) -> Element {
    Element::new(ElementKind::Text {
        content: content.into(),
    })
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            test_id: None,
            style: Style::new(),
            bindings: Vec::new(),
            animated_style: None,
            animated_props: None,
            handlers: EventHandlers::new(),
            children: Vec::new(),
        }
    }

    // =========================================================================
    // Identity & style
    // =========================================================================

    /// Set the identifier tests use to find this element
    pub fn test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Add static style entries, overriding earlier ones with the same key
    pub fn style(mut self, style: Style) -> Self {
        self.style.merge(&style);
        self
    }

    /// Bind a style key to the current value of a shared value
    pub fn bind(mut self, key: impl Into<String>, value: &SharedValue) -> Self {
        self.bindings.push(StyleBinding::new(key, value));
        self
    }

    /// Attach a style derived from shared values
    pub fn animated_style(mut self, style: AnimatedStyle) -> Self {
        self.animated_style = Some(style);
        self
    }

    /// Attach props derived from shared values
    pub fn animated_props(mut self, props: AnimatedProps) -> Self {
        self.animated_props = Some(props);
        self
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a press handler
    pub fn on_press<F>(mut self, handler: F) -> Self
    where
        F: Fn(&EventContext) + 'static,
    {
        self.handlers.on_press(handler);
        self
    }

    /// Register a handler for any event type
    pub fn on<F>(mut self, event_type: EventType, handler: F) -> Self
    where
        F: Fn(&EventContext) + 'static,
    {
        self.handlers.on(event_type, handler);
        self
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn get_test_id(&self) -> Option<&str> {
        self.test_id.as_deref()
    }

    /// Whether any shared value, animated style or animated prop is attached
    pub fn has_animated_bindings(&self) -> bool {
        !self.bindings.is_empty() || self.animated_style.is_some() || self.animated_props.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::style;

    #[test]
    fn test_builder_collects_style_and_children() {
        let el = view()
            .test_id("root")
            .style(style! { "width" => 100.0, "height" => 50.0 })
            .style(style! { "width" => 120.0 })
            .child(text("a"))
            .child(button("b"));

        assert_eq!(el.get_test_id(), Some("root"));
        assert_eq!(el.style.number("width"), Some(120.0));
        assert_eq!(el.style.number("height"), Some(50.0));
        assert_eq!(el.children().len(), 2);
        assert_eq!(el.children()[1].kind().name(), "Button");
        assert!(!el.has_animated_bindings());
    }

    #[test]
    fn test_only_animated_view_is_animated() {
        assert!(animated_view().kind().is_animated());
        assert!(!view().kind().is_animated());
        assert!(!button("x").kind().is_animated());
        assert!(!text("x").kind().is_animated());
    }
}
