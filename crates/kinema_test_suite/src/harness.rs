//! Scenario harness
//!
//! [`TestContext`] is the scenario runner: it mounts a component, looks up
//! elements by test id, reads style snapshots, fires interactions and moves
//! a virtual clock. Every context owns its own reactive graph, scheduler and
//! clock, so each scenario starts at time zero with no shared state.
//!
//! ```rust
//! use std::time::Duration;
//! use kinema_animation::{with_timing, TimingConfig};
//! use kinema_core::style;
//! use kinema_layout::prelude::*;
//! use kinema_test_suite::{ClockAdvance, TestContext};
//!
//! let mut ctx = TestContext::new("grow");
//! ctx.mount(|cx| {
//!     let width = cx.use_shared_value(100.0);
//!     let target = width.clone();
//!     view()
//!         .child(animated_view().test_id("box").bind("width", &width))
//!         .child(button("Grow").test_id("grow").on_press(move |_| {
//!             target.animate(with_timing(target.get() + 50.0, TimingConfig::duration_ms(500)));
//!         }))
//! })
//! .unwrap();
//!
//! let node = ctx.get_by_test_id("box").unwrap();
//! ctx.press(&ctx.get_by_test_id("grow").unwrap()).unwrap();
//! ctx.assert_snapshot_eq(&node, &style! { "width" => 100.0 }).unwrap();
//!
//! ctx.advance_clock(ClockAdvance::By(Duration::from_millis(500))).unwrap();
//! ctx.assert_snapshot_eq(&node, &style! { "width" => 150.0 }).unwrap();
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kinema_animation::AnimationScheduler;
use kinema_core::events::{event_name, event_types, EventType};
use kinema_core::{ReactiveGraph, Style};
use kinema_layout::{Element, ElementKind, LayoutNodeId, MountContext, RenderTree};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

/// Longest single clock advance a scenario may request
pub const MAX_CLOCK_ADVANCE: Duration = Duration::from_secs(60 * 60);

/// Result of a scenario
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Passed,
    Failed { reason: String },
}

impl TestResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed)
    }
}

/// How far to move the virtual clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAdvance {
    /// Advance by a fixed duration
    By(Duration),
    /// Drain all pending timed work
    All,
}

impl ClockAdvance {
    pub fn ms(ms: u64) -> Self {
        ClockAdvance::By(Duration::from_millis(ms))
    }
}

/// A mounted element found by test id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    node: LayoutNodeId,
    test_id: String,
}

impl NodeHandle {
    pub fn node(&self) -> LayoutNodeId {
        self.node
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }
}

/// Context for a single scenario
pub struct TestContext {
    name: String,
    config: HarnessConfig,
    tree: Option<RenderTree>,
    scheduler: AnimationScheduler,
    failures: Vec<HarnessError>,
}

impl TestContext {
    /// Create a new context with default settings
    pub fn new(name: &str) -> Self {
        Self::with_config(name, HarnessConfig::default())
    }

    pub fn with_config(name: &str, config: HarnessConfig) -> Self {
        let reactive = Arc::new(Mutex::new(ReactiveGraph::new()));
        let scheduler =
            AnimationScheduler::new(reactive).with_frame_interval(config.frame_interval());
        Self {
            name: name.to_string(),
            config,
            tree: None,
            scheduler,
            failures: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The scheduler driving this scenario's shared values
    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    /// Render a component and run its mount effects
    pub fn mount<F>(&mut self, component: F) -> Result<()>
    where
        F: FnOnce(&mut MountContext<'_>) -> Element,
    {
        if self.tree.is_some() {
            return Err(HarnessError::AlreadyMounted);
        }

        let (tree, effects) = match kinema_layout::mount(&self.scheduler, component) {
            Ok(mounted) => mounted,
            Err(e) => {
                // Drop whatever the component registered before the tree was rejected
                self.scheduler.reset();
                return Err(e.into());
            }
        };
        tracing::debug!("{}: mounted {} node(s)", self.name, tree.len());
        self.tree = Some(tree);
        effects.run();
        Ok(())
    }

    /// Tear down the mounted tree and every value and callback it created
    pub fn unmount(&mut self) {
        if self.tree.take().is_some() {
            self.scheduler.reset();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.tree.is_some()
    }

    /// The mounted tree
    pub fn tree(&self) -> Result<&RenderTree> {
        self.tree.as_ref().ok_or(HarnessError::NotMounted)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find an element by test id, failing immediately if absent
    pub fn get_by_test_id(&self, test_id: &str) -> Result<NodeHandle> {
        self.query_by_test_id(test_id)?
            .ok_or_else(|| HarnessError::NotFound {
                test_id: test_id.to_string(),
            })
    }

    /// Find an element by test id
    pub fn query_by_test_id(&self, test_id: &str) -> Result<Option<NodeHandle>> {
        Ok(self.tree()?.find_by_test_id(test_id).map(|node| NodeHandle {
            node,
            test_id: test_id.to_string(),
        }))
    }

    /// Find several elements at once, failing on the first absent id
    pub fn require(&self, test_ids: &[&str]) -> Result<Vec<NodeHandle>> {
        test_ids.iter().map(|id| self.get_by_test_id(id)).collect()
    }

    /// Text of a text element or button title
    pub fn text_content(&self, handle: &NodeHandle) -> Result<Option<String>> {
        let tree = self.tree()?;
        Ok(tree.text_content(handle.node).map(str::to_string))
    }

    pub fn kind(&self, handle: &NodeHandle) -> Result<ElementKind> {
        self.tree()?
            .kind(handle.node)
            .cloned()
            .ok_or_else(|| not_found(handle))
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// The element's style as of the current virtual instant
    ///
    /// Never advances time.
    pub fn snapshot(&self, handle: &NodeHandle) -> Result<Style> {
        self.tree()?
            .resolve_style(handle.node)
            .ok_or_else(|| not_found(handle))
    }

    /// The element's animated props other than `style`
    pub fn props_snapshot(&self, handle: &NodeHandle) -> Result<Style> {
        self.tree()?
            .resolve_props(handle.node)
            .ok_or_else(|| not_found(handle))
    }

    /// Compare the element's snapshot to `expected`
    ///
    /// Numbers match within the configured epsilon. Keys missing from
    /// either side are reported as mismatches.
    pub fn assert_snapshot_eq(&self, handle: &NodeHandle, expected: &Style) -> Result<()> {
        let actual = self.snapshot(handle)?;
        let mismatches = actual.diff(expected, self.config.number_epsilon);
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::SnapshotMismatch {
                test_id: handle.test_id.clone(),
                mismatches,
            })
        }
    }

    /// Like [`assert_snapshot_eq`](Self::assert_snapshot_eq), but records a
    /// failure and lets the scenario continue
    pub fn expect_snapshot(&mut self, handle: &NodeHandle, expected: &Style) -> bool {
        let result = self.assert_snapshot_eq(handle, expected);
        self.expect(result)
    }

    /// Record a failed check without stopping the scenario
    pub fn expect(&mut self, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}: {}", self.name, e);
                self.failures.push(e);
                false
            }
        }
    }

    /// Failures recorded so far
    pub fn failures(&self) -> &[HarnessError] {
        &self.failures
    }

    /// End the scenario, failing if any expectation was recorded
    pub fn finish(&mut self) -> Result<()> {
        let mut failures = std::mem::take(&mut self.failures);
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(HarnessError::Expectations(failures)),
        }
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Fire an event on an element
    ///
    /// Runs the handler of the element or its nearest ancestor that has
    /// one, synchronously. Fails if nothing handles the event.
    pub fn interact(&self, handle: &NodeHandle, event_type: EventType) -> Result<()> {
        let tree = self.tree()?;
        if !tree.contains(handle.node) {
            return Err(not_found(handle));
        }

        match tree.dispatch(handle.node, event_type) {
            Some(_) => Ok(()),
            None => Err(HarnessError::NoHandler {
                test_id: handle.test_id.clone(),
                event: event_name(event_type).to_string(),
            }),
        }
    }

    /// Press an element
    pub fn press(&self, handle: &NodeHandle) -> Result<()> {
        self.interact(handle, event_types::PRESS)
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Move the virtual clock, flushing every frame on the way
    ///
    /// Returns how far the clock moved.
    pub fn advance_clock(&self, advance: ClockAdvance) -> Result<Duration> {
        match advance {
            ClockAdvance::By(by) if by > MAX_CLOCK_ADVANCE => Err(HarnessError::AdvanceTooLong {
                requested: by,
                max: MAX_CLOCK_ADVANCE,
            }),
            ClockAdvance::By(by) => {
                let frames = self.scheduler.advance(by);
                tracing::debug!("{}: advanced {:?} in {} frame(s)", self.name, by, frames);
                Ok(by)
            }
            ClockAdvance::All => {
                let moved = self.scheduler.run_all()?;
                tracing::debug!("{}: drained timers, advanced {:?}", self.name, moved);
                Ok(moved)
            }
        }
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) -> Result<Duration> {
        self.advance_clock(ClockAdvance::ms(ms))
    }

    /// Drain all pending timed work
    pub fn run_all_timers(&self) -> Result<Duration> {
        self.advance_clock(ClockAdvance::All)
    }

    /// Current virtual instant
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }
}

fn not_found(handle: &NodeHandle) -> HarnessError {
    HarnessError::NotFound {
        test_id: handle.test_id.clone(),
    }
}

/// Signature of a scenario body
pub type TestFn = Box<dyn FnOnce(&mut TestContext) -> anyhow::Result<()> + Send>;

/// Runs scenarios with shared settings
pub struct TestHarness {
    config: HarnessConfig,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Create a fresh context for one scenario
    pub fn context(&self, name: &str) -> TestContext {
        TestContext::with_config(name, self.config.clone())
    }

    /// Run one scenario in a fresh context
    ///
    /// Errors, recorded expectations and panics all fail the scenario.
    pub fn run_test<F>(&self, name: &str, test_fn: F) -> TestResult
    where
        F: FnOnce(&mut TestContext) -> anyhow::Result<()>,
    {
        let mut ctx = self.context(name);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<()> {
            test_fn(&mut ctx)?;
            ctx.finish()?;
            Ok(())
        }));

        match outcome {
            Ok(Ok(())) => TestResult::Passed,
            Ok(Err(e)) => TestResult::Failed {
                reason: format!("{e:#}"),
            },
            Err(payload) => TestResult::Failed {
                reason: panic_message(payload.as_ref()),
            },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
