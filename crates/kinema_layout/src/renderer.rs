//! Render tree
//!
//! A mounted element tree. Nodes are addressed by [`LayoutNodeId`] and,
//! when declared with one, by test id. The tree resolves each node's style
//! snapshot on demand and dispatches events to node handlers.

use std::sync::{MutexGuard, PoisonError};

use kinema_core::events::{event_name, EventType};
use kinema_core::{PropValue, ReactiveGraph, SharedReactiveGraph, Style};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, SlotMap};

use crate::element::{Element, ElementKind};
use crate::error::{LayoutError, Result};
use crate::event_handler::{EventCallback, EventContext, EventHandlers};
use crate::style::{AnimatedProps, AnimatedStyle, StyleBinding};

new_key_type! {
    pub struct LayoutNodeId;
}

impl LayoutNodeId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// A mounted element
struct RenderNode {
    kind: ElementKind,
    test_id: Option<String>,
    parent: Option<LayoutNodeId>,
    children: Vec<LayoutNodeId>,
    style: Style,
    bindings: Vec<StyleBinding>,
    animated_style: Option<AnimatedStyle>,
    animated_props: Option<AnimatedProps>,
    handlers: EventHandlers,
}

/// A mounted element tree
pub struct RenderTree {
    nodes: SlotMap<LayoutNodeId, RenderNode>,
    root: Option<LayoutNodeId>,
    test_ids: FxHashMap<String, LayoutNodeId>,
    reactive: SharedReactiveGraph,
}

impl RenderTree {
    /// Create an empty tree reading from the given reactive graph
    pub fn new(reactive: SharedReactiveGraph) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            test_ids: FxHashMap::default(),
            reactive,
        }
    }

    /// Mount an element and its descendants into a new tree
    ///
    /// Fails if two elements share a test id, or if animated bindings are
    /// attached to an element that cannot animate.
    pub fn build(element: Element, reactive: SharedReactiveGraph) -> Result<Self> {
        let mut tree = Self::new(reactive);
        tree.root = Some(tree.build_element(element, None)?);
        Ok(tree)
    }

    fn build_element(&mut self, element: Element, parent: Option<LayoutNodeId>) -> Result<LayoutNodeId> {
        let Element {
            kind,
            test_id,
            style,
            bindings,
            animated_style,
            animated_props,
            handlers,
            children,
        } = element;

        if !kind.is_animated() {
            let what = if !bindings.is_empty() {
                Some("shared value bindings")
            } else if animated_style.is_some() {
                Some("an animated style")
            } else if animated_props.is_some() {
                Some("animated props")
            } else {
                None
            };
            if let Some(what) = what {
                return Err(LayoutError::NotAnimatable {
                    kind: kind.name(),
                    test_id,
                    what,
                });
            }
        }

        if let Some(id) = &test_id {
            if self.test_ids.contains_key(id) {
                return Err(LayoutError::DuplicateTestId(id.clone()));
            }
        }

        let node_id = self.nodes.insert(RenderNode {
            kind,
            test_id: test_id.clone(),
            parent,
            children: Vec::with_capacity(children.len()),
            style,
            bindings,
            animated_style,
            animated_props,
            handlers,
        });
        if let Some(id) = test_id {
            self.test_ids.insert(id, node_id);
        }

        for child in children {
            let child_id = self.build_element(child, Some(node_id))?;
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.children.push(child_id);
            }
        }

        Ok(node_id)
    }

    fn graph(&self) -> MutexGuard<'_, ReactiveGraph> {
        self.reactive.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn root(&self) -> Option<LayoutNodeId> {
        self.root
    }

    /// Number of mounted nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: LayoutNodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Look up a node by test id
    pub fn find_by_test_id(&self, test_id: &str) -> Option<LayoutNodeId> {
        self.test_ids.get(test_id).copied()
    }

    /// Every test id in the tree
    pub fn test_ids(&self) -> impl Iterator<Item = &str> {
        self.test_ids.keys().map(String::as_str)
    }

    pub fn test_id(&self, node: LayoutNodeId) -> Option<&str> {
        self.nodes.get(node)?.test_id.as_deref()
    }

    pub fn kind(&self, node: LayoutNodeId) -> Option<&ElementKind> {
        self.nodes.get(node).map(|n| &n.kind)
    }

    pub fn parent(&self, node: LayoutNodeId) -> Option<LayoutNodeId> {
        self.nodes.get(node)?.parent
    }

    pub fn children(&self, node: LayoutNodeId) -> &[LayoutNodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Text content of a text element, or title of a button
    pub fn text_content(&self, node: LayoutNodeId) -> Option<&str> {
        match self.kind(node)? {
            ElementKind::Text { content } => Some(content),
            ElementKind::Button { title } => Some(title),
            _ => None,
        }
    }

    // =========================================================================
    // Style resolution
    // =========================================================================

    /// Resolve a node's style as of now
    ///
    /// Layers, later winning: static entries, shared-value bindings, the
    /// animated style, then the `style` entry of animated props.
    /// Reading never advances time; repeated reads are served from cache
    /// until a shared value the style depends on changes.
    pub fn resolve_style(&self, node: LayoutNodeId) -> Option<Style> {
        let node = self.nodes.get(node)?;
        let mut style = node.style.clone();

        if node.bindings.is_empty() && node.animated_style.is_none() && node.animated_props.is_none() {
            return Some(style);
        }

        let mut graph = self.graph();
        for binding in &node.bindings {
            style.insert(binding.key.clone(), binding.resolve(&graph));
        }
        if let Some(animated) = &node.animated_style {
            style.merge(&animated.resolve(&mut graph));
        }
        if let Some(props) = &node.animated_props {
            if let Some(props_style) = props.resolve_style(&mut graph) {
                style.merge(&props_style);
            }
        }

        Some(style)
    }

    /// Resolve a node's animated props other than `style`
    pub fn resolve_props(&self, node: LayoutNodeId) -> Option<Style> {
        let node = self.nodes.get(node)?;
        match &node.animated_props {
            Some(props) => Some(props.resolve_props(&mut self.graph())),
            None => Some(Style::new()),
        }
    }

    /// Resolve a single style key
    pub fn resolve_style_value(&self, node: LayoutNodeId, key: &str) -> Option<PropValue> {
        self.resolve_style(node)?.remove(key)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Find the node that handles `event_type` fired on `node`
    ///
    /// Starts at `node` and walks up through its ancestors.
    pub fn handler_target(&self, node: LayoutNodeId, event_type: EventType) -> Option<LayoutNodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.nodes.get(id)?;
            if n.handlers.has_handler(event_type) {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    /// Fire an event on a node, bubbling to the nearest ancestor with a handler
    ///
    /// Returns the node whose handlers ran, or `None` if nothing handled it.
    /// Handlers run synchronously with no lock held, so they may read and
    /// write shared values.
    pub fn dispatch(&self, node: LayoutNodeId, event_type: EventType) -> Option<LayoutNodeId> {
        let target = self.handler_target(node, event_type)?;
        let handlers = self.nodes.get(target)?.handlers.clone();

        tracing::debug!(
            "dispatch {} on node {} handled by node {} ({} handler(s))",
            event_name(event_type),
            node.to_raw(),
            target.to_raw(),
            handlers.get(event_type).map_or(0, <[EventCallback]>::len)
        );

        handlers.dispatch(&EventContext::new(event_type, target).with_target(node));
        Some(target)
    }
}
