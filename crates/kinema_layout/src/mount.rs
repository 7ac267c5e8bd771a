//! Component mounting
//!
//! A component is a function from a [`MountContext`] to an [`Element`]. The
//! context hands out the hooks a component needs: shared values, animated
//! styles and props, effects that run once the tree is mounted, and frame
//! callbacks.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use kinema_animation::AnimationScheduler;
//! use kinema_core::{style, ReactiveGraph};
//! use kinema_layout::prelude::*;
//!
//! let scheduler = AnimationScheduler::new(Arc::new(Mutex::new(ReactiveGraph::new())));
//! let (tree, effects) = mount(&scheduler, |cx| {
//!     let width = cx.use_shared_value(100.0);
//!     let animated = cx.use_animated_style(move |s| style! { "width" => s.get(&width) });
//!     animated_view().test_id("box").animated_style(animated)
//! })
//! .unwrap();
//! effects.run();
//!
//! let node = tree.find_by_test_id("box").unwrap();
//! assert_eq!(tree.resolve_style(node), Some(style! { "width" => 100.0 }));
//! ```

use std::sync::{Arc, MutexGuard, PoisonError};

use kinema_animation::{AnimationScheduler, FrameCallbackId, FrameInfo, SchedulerHandle, SharedValue};
use kinema_core::{ReactiveGraph, SharedReactiveGraph, Style};

use crate::element::Element;
use crate::error::Result;
use crate::renderer::RenderTree;
use crate::style::{AnimatedProps, AnimatedStyle, StyleScope};

type MountEffect = Box<dyn FnOnce()>;

/// Hooks available to a component while it renders
pub struct MountContext<'a> {
    scheduler: &'a AnimationScheduler,
    effects: Vec<MountEffect>,
    frame_callbacks: Vec<FrameCallbackId>,
}

impl<'a> MountContext<'a> {
    pub fn new(scheduler: &'a AnimationScheduler) -> Self {
        Self {
            scheduler,
            effects: Vec::new(),
            frame_callbacks: Vec::new(),
        }
    }

    fn graph(&self) -> MutexGuard<'_, ReactiveGraph> {
        self.scheduler
            .reactive()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle for creating values or callbacks outside of render
    pub fn handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    pub fn reactive(&self) -> &SharedReactiveGraph {
        self.scheduler.reactive()
    }

    /// Create a shared value owned by this mount
    pub fn use_shared_value(&mut self, initial: f32) -> SharedValue {
        self.scheduler.create_value(initial)
    }

    /// Create a style derived from shared values
    ///
    /// Read shared values through the [`StyleScope`] argument. Calling
    /// [`SharedValue::get`] inside the closure logs an error and yields 0.0.
    pub fn use_animated_style<F>(&mut self, compute: F) -> AnimatedStyle
    where
        F: Fn(&StyleScope<'_>) -> Style + Send + 'static,
    {
        let derived = self
            .graph()
            .create_derived(move |graph| compute(&StyleScope::new(graph)));
        AnimatedStyle::new(derived)
    }

    /// Create props derived from shared values
    ///
    /// A `style` entry holding a map is merged into the element's style.
    pub fn use_animated_props<F>(&mut self, compute: F) -> AnimatedProps
    where
        F: Fn(&StyleScope<'_>) -> Style + Send + 'static,
    {
        let derived = self
            .graph()
            .create_derived(move |graph| compute(&StyleScope::new(graph)));
        AnimatedProps::new(derived)
    }

    /// Run `effect` once the tree has been mounted
    pub fn on_mount<F>(&mut self, effect: F)
    where
        F: FnOnce() + 'static,
    {
        self.effects.push(Box::new(effect));
    }

    /// Run `callback` after every frame while it is active
    pub fn use_frame_callback<F>(&mut self, callback: F, active: bool) -> FrameCallbackId
    where
        F: Fn(FrameInfo) + Send + Sync + 'static,
    {
        let id = self.scheduler.register_frame_callback(callback, active);
        self.frame_callbacks.push(id);
        id
    }

    /// Frame callbacks registered during this mount
    pub fn frame_callbacks(&self) -> &[FrameCallbackId] {
        &self.frame_callbacks
    }

    fn into_effects(self) -> MountEffects {
        MountEffects {
            effects: self.effects,
        }
    }
}

/// Effects queued during render, run after mounting
#[must_use = "mount effects do nothing unless run"]
pub struct MountEffects {
    effects: Vec<MountEffect>,
}

impl MountEffects {
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run every effect in registration order
    pub fn run(self) {
        for effect in self.effects {
            effect();
        }
    }
}

/// Render `component` and mount the result into a new tree
///
/// Effects are returned rather than run, so the caller can run them without
/// holding any borrow of the tree.
pub fn mount<F>(scheduler: &AnimationScheduler, component: F) -> Result<(RenderTree, MountEffects)>
where
    F: FnOnce(&mut MountContext<'_>) -> Element,
{
    let mut cx = MountContext::new(scheduler);
    let element = component(&mut cx);
    let tree = RenderTree::build(element, Arc::clone(scheduler.reactive()))?;

    tracing::debug!(
        "mounted {} node(s), {} effect(s), {} frame callback(s)",
        tree.len(),
        cx.effects.len(),
        cx.frame_callbacks.len()
    );

    Ok((tree, cx.into_effects()))
}
