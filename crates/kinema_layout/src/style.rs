//! Animated styles and props
//!
//! An [`AnimatedStyle`] is a derived value in the reactive graph whose
//! compute closure reads shared values through a [`StyleScope`]. Reading a
//! shared value through the scope subscribes the style to it, so the style
//! is recomputed on the next snapshot after the value changes and served
//! from cache otherwise.

use kinema_animation::SharedValue;
use kinema_core::{Derived, DerivedId, PropValue, ReactiveGraph, Style};

/// Key of the animated-props entry merged into an element's style
pub const STYLE_PROP: &str = "style";

/// Read access to shared values from inside an animated style closure
pub struct StyleScope<'a> {
    graph: &'a ReactiveGraph,
}

impl<'a> StyleScope<'a> {
    pub(crate) fn new(graph: &'a ReactiveGraph) -> Self {
        Self { graph }
    }

    /// Current value of a shared value, tracked as a dependency
    pub fn get(&self, value: &SharedValue) -> f32 {
        self.graph.get(value.signal()).unwrap_or_default()
    }
}

/// A style map derived from shared values
#[derive(Clone, Copy, Debug)]
pub struct AnimatedStyle {
    derived: Derived<Style>,
}

impl AnimatedStyle {
    pub(crate) fn new(derived: Derived<Style>) -> Self {
        Self { derived }
    }

    pub fn id(&self) -> DerivedId {
        self.derived.id()
    }

    /// Compute (or fetch from cache) the current style
    pub fn resolve(&self, graph: &mut ReactiveGraph) -> Style {
        graph.get_derived(self.derived).unwrap_or_default()
    }
}

/// A props map derived from shared values
///
/// A `style` entry holding a map is merged into the element's style
/// snapshot; every other entry is a plain prop.
#[derive(Clone, Copy, Debug)]
pub struct AnimatedProps {
    derived: Derived<Style>,
}

impl AnimatedProps {
    pub(crate) fn new(derived: Derived<Style>) -> Self {
        Self { derived }
    }

    pub fn id(&self) -> DerivedId {
        self.derived.id()
    }

    /// Compute (or fetch from cache) every prop, `style` included
    pub fn resolve(&self, graph: &mut ReactiveGraph) -> Style {
        graph.get_derived(self.derived).unwrap_or_default()
    }

    /// The `style` entry, if present
    pub fn resolve_style(&self, graph: &mut ReactiveGraph) -> Option<Style> {
        match self.resolve(graph).remove(STYLE_PROP) {
            Some(PropValue::Map(style)) => Some(style),
            _ => None,
        }
    }

    /// Every entry except `style`
    pub fn resolve_props(&self, graph: &mut ReactiveGraph) -> Style {
        let mut props = self.resolve(graph);
        props.remove(STYLE_PROP);
        props
    }
}

/// A style key bound directly to a shared value
#[derive(Clone, Debug)]
pub struct StyleBinding {
    pub key: String,
    pub value: SharedValue,
}

impl StyleBinding {
    pub fn new(key: impl Into<String>, value: &SharedValue) -> Self {
        Self {
            key: key.into(),
            value: value.clone(),
        }
    }

    /// Current value, read directly from the graph
    pub fn resolve(&self, graph: &ReactiveGraph) -> f32 {
        graph.get_untracked(self.value.signal()).unwrap_or_default()
    }
}
