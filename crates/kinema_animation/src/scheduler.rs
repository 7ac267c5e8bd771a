//! Animation scheduler
//!
//! Owns the virtual clock, every shared value's animation state, and the
//! registered frame callbacks. Time only moves through [`advance`] and
//! [`run_all`]; each call steps the clock frame by frame, samples every
//! in-flight descriptor at the new instant, writes the results into the
//! reactive graph, and then runs frame callbacks.
//!
//! Shared values are created through a [`SchedulerHandle`], which holds
//! only weak references so values captured inside derived styles never
//! keep the scheduler or the graph alive.
//!
//! No lock is held while user callbacks run, so callbacks may read, write
//! and animate shared values.
//!
//! [`advance`]: AnimationScheduler::advance
//! [`run_all`]: AnimationScheduler::run_all

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use kinema_core::{in_derived_computation, ReactiveGraph, SharedReactiveGraph, Signal};
use slotmap::{new_key_type, Key, SlotMap};

use crate::clock::VirtualClock;
use crate::descriptor::AnimationDescriptor;
use crate::error::{AnimationError, Result};

/// Default frame step, roughly 60 frames per second
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Frames are never shorter than this, so advancing always terminates
const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

new_key_type! {
    /// Handle to a shared value's slot in the scheduler
    pub struct SharedValueId;
    /// Handle to a registered frame callback
    pub struct FrameCallbackId;
}

impl SharedValueId {
    /// Convert to raw u64 for logging
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Animation state of one shared value
#[derive(Clone, Debug, PartialEq)]
pub enum ValueState {
    /// No pending animation; the value only changes on assignment
    Idle,
    /// A descriptor is playing
    Animating {
        descriptor: AnimationDescriptor,
        /// Value when the descriptor was installed
        from: f32,
        /// Virtual instant when the descriptor was installed
        started_at: Duration,
    },
}

/// Timing information passed to frame callbacks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// Virtual instant of this frame
    pub timestamp: Duration,
    /// Time since the previous frame
    pub since_previous: Duration,
    /// Frame number, starting at 1
    pub frame: u64,
}

/// Callback run after every frame
pub type FrameCallback = Arc<dyn Fn(FrameInfo) + Send + Sync>;

struct ValueSlot {
    signal: Signal<f32>,
    state: ValueState,
}

struct FrameCallbackSlot {
    callback: FrameCallback,
    active: bool,
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    values: SlotMap<SharedValueId, ValueSlot>,
    frame_callbacks: SlotMap<FrameCallbackId, FrameCallbackSlot>,
    clock: VirtualClock,
    frame_interval: Duration,
}

impl SchedulerInner {
    /// Sample every animating value at `now`, returning the signal writes
    fn sample_all(&mut self, now: Duration) -> Vec<(Signal<f32>, f32)> {
        let mut writes = Vec::new();

        for (id, slot) in self.values.iter_mut() {
            let sample = match &slot.state {
                ValueState::Animating {
                    descriptor,
                    from,
                    started_at,
                } => descriptor.sample(*from, now.saturating_sub(*started_at)),
                ValueState::Idle => continue,
            };

            writes.push((slot.signal, sample.value));
            if sample.finished {
                tracing::debug!(
                    "shared value {} finished at {:?} on {}",
                    id.to_raw(),
                    now,
                    sample.value
                );
                slot.state = ValueState::Idle;
            }
        }

        writes
    }

    fn active_callbacks(&self) -> Vec<FrameCallback> {
        self.frame_callbacks
            .values()
            .filter(|slot| slot.active)
            .map(|slot| Arc::clone(&slot.callback))
            .collect()
    }
}

fn lock_inner(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn lock_graph(graph: &Mutex<ReactiveGraph>) -> MutexGuard<'_, ReactiveGraph> {
    graph.lock().unwrap_or_else(PoisonError::into_inner)
}

fn insert_value(
    inner: &Mutex<SchedulerInner>,
    reactive: &Mutex<ReactiveGraph>,
    handle: SchedulerHandle,
    initial: f32,
) -> SharedValue {
    let signal = lock_graph(reactive).create_signal(initial);
    let id = lock_inner(inner).values.insert(ValueSlot {
        signal,
        state: ValueState::Idle,
    });

    tracing::debug!("created shared value {} = {}", id.to_raw(), initial);

    SharedValue { handle, id, signal }
}

fn insert_frame_callback(
    inner: &Mutex<SchedulerInner>,
    callback: FrameCallback,
    active: bool,
) -> FrameCallbackId {
    lock_inner(inner)
        .frame_callbacks
        .insert(FrameCallbackSlot { callback, active })
}

/// The scheduler that drives every shared value from a virtual clock
///
/// One scheduler belongs to one scenario: it starts at time zero with no
/// values, and dropping it ends the lifetime of every value it created.
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    reactive: SharedReactiveGraph,
}

impl AnimationScheduler {
    /// Create a scheduler writing into the given reactive graph
    pub fn new(reactive: SharedReactiveGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                values: SlotMap::with_key(),
                frame_callbacks: SlotMap::with_key(),
                clock: VirtualClock::new(),
                frame_interval: DEFAULT_FRAME_INTERVAL,
            })),
            reactive,
        }
    }

    /// Set the length of one frame step (at least 1ms)
    pub fn with_frame_interval(self, interval: Duration) -> Self {
        self.lock().frame_interval = interval.max(MIN_FRAME_INTERVAL);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        lock_inner(&self.inner)
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
            reactive: Arc::downgrade(&self.reactive),
        }
    }

    /// Create a shared value owned by this scheduler
    pub fn create_value(&self, initial: f32) -> SharedValue {
        insert_value(&self.inner, &self.reactive, self.handle(), initial)
    }

    /// Register a callback to run after every frame
    pub fn register_frame_callback<F>(&self, callback: F, active: bool) -> FrameCallbackId
    where
        F: Fn(FrameInfo) + Send + Sync + 'static,
    {
        insert_frame_callback(&self.inner, Arc::new(callback), active)
    }

    /// The reactive graph values are written into
    pub fn reactive(&self) -> &SharedReactiveGraph {
        &self.reactive
    }

    /// Current virtual instant
    pub fn now(&self) -> Duration {
        self.lock().clock.now()
    }

    /// Number of frames stepped so far
    pub fn frame_count(&self) -> u64 {
        self.lock().clock.frames()
    }

    pub fn frame_interval(&self) -> Duration {
        self.lock().frame_interval
    }

    /// Advance the virtual clock by `by`, flushing every frame up to the new instant
    ///
    /// The clock moves in frame steps; the last step is shortened so the clock
    /// lands exactly on `now + by`. Advancing by zero still runs one frame, so
    /// zero-length animations complete. Returns the number of frames run.
    pub fn advance(&self, by: Duration) -> u64 {
        let target = self.now().saturating_add(by);
        let mut frames = 0;

        loop {
            let (writes, callbacks, info) = {
                let mut inner = self.lock();
                let before = inner.clock.now();
                let step = target.saturating_sub(before).min(inner.frame_interval);
                let now = inner.clock.step(step);
                let info = FrameInfo {
                    timestamp: now,
                    since_previous: step,
                    frame: inner.clock.frames(),
                };
                let writes = inner.sample_all(now);
                (writes, inner.active_callbacks(), info)
            };

            tracing::trace!(
                "frame {} at {:?}: {} value(s) updated",
                info.frame,
                info.timestamp,
                writes.len()
            );

            if !writes.is_empty() {
                let mut graph = lock_graph(&self.reactive);
                for (signal, value) in writes {
                    graph.set(signal, value);
                }
            }

            for callback in callbacks {
                callback(info);
            }

            frames += 1;
            if info.timestamp >= target {
                break;
            }
        }

        frames
    }

    /// Drain all pending timed work
    ///
    /// Fails without moving the clock if any infinitely repeating animation
    /// or active frame callback is present, since those never finish.
    /// Returns how far the clock moved.
    pub fn run_all(&self) -> Result<Duration> {
        let remaining = {
            let inner = self.lock();
            let now = inner.clock.now();

            let mut infinite_values = 0;
            let mut remaining: Option<Duration> = None;
            for slot in inner.values.values() {
                if let ValueState::Animating {
                    descriptor,
                    from,
                    started_at,
                } = &slot.state
                {
                    match descriptor.duration(*from) {
                        Some(d) => {
                            let left = (*started_at + d).saturating_sub(now);
                            remaining = Some(remaining.map_or(left, |r| r.max(left)));
                        }
                        None => infinite_values += 1,
                    }
                }
            }

            let frame_callbacks = inner.frame_callbacks.values().filter(|s| s.active).count();
            if infinite_values > 0 || frame_callbacks > 0 {
                tracing::warn!(
                    "run_all refused: {} infinite animation(s), {} frame callback(s)",
                    infinite_values,
                    frame_callbacks
                );
                return Err(AnimationError::UnboundedDrain {
                    infinite_values,
                    frame_callbacks,
                });
            }
            remaining
        };

        match remaining {
            Some(remaining) => {
                self.advance(remaining);
                Ok(remaining)
            }
            None => Ok(Duration::ZERO),
        }
    }

    /// Check if any shared value is animating
    pub fn has_active_animations(&self) -> bool {
        self.lock()
            .values
            .values()
            .any(|slot| slot.state != ValueState::Idle)
    }

    /// Number of shared values currently animating
    pub fn active_count(&self) -> usize {
        self.lock()
            .values
            .values()
            .filter(|slot| slot.state != ValueState::Idle)
            .count()
    }

    /// Number of shared values owned by this scheduler
    pub fn value_count(&self) -> usize {
        self.lock().values.len()
    }

    /// Drop every value and callback and rewind the clock to zero
    pub fn reset(&self) {
        let signals: Vec<Signal<f32>> = {
            let mut inner = self.lock();
            inner.clock.reset();
            inner.frame_callbacks.clear();
            inner.values.drain().map(|(_, slot)| slot.signal).collect()
        };

        let mut graph = lock_graph(&self.reactive);
        for signal in signals {
            graph.dispose_signal(signal);
        }
    }
}

/// A weak handle to the animation scheduler
///
/// Passed to components that create shared values. It won't prevent the
/// scheduler or the reactive graph from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
    reactive: Weak<Mutex<ReactiveGraph>>,
}

impl SchedulerHandle {
    /// Create a shared value with an initial value
    pub fn create_value(&self, initial: f32) -> Result<SharedValue> {
        let reactive = self
            .reactive
            .upgrade()
            .ok_or(AnimationError::SchedulerDropped)?;
        let inner = self.inner.upgrade().ok_or(AnimationError::SchedulerDropped)?;
        Ok(insert_value(&inner, &reactive, self.clone(), initial))
    }

    /// Register a callback to run after every frame
    pub fn register_frame_callback<F>(&self, callback: F, active: bool) -> Result<FrameCallbackId>
    where
        F: Fn(FrameInfo) + Send + Sync + 'static,
    {
        let inner = self.inner.upgrade().ok_or(AnimationError::SchedulerDropped)?;
        Ok(insert_frame_callback(&inner, Arc::new(callback), active))
    }

    /// Pause or resume a frame callback
    pub fn set_frame_callback_active(&self, id: FrameCallbackId, active: bool) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(slot) = lock_inner(&inner).frame_callbacks.get_mut(id) {
                slot.active = active;
            }
        }
    }

    /// Remove a frame callback
    pub fn remove_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            lock_inner(&inner).frame_callbacks.remove(id);
        }
    }

    /// Current virtual instant, if the scheduler is alive
    pub fn now(&self) -> Option<Duration> {
        self.inner.upgrade().map(|inner| lock_inner(&inner).clock.now())
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn with_slot<R>(&self, id: SharedValueId, f: impl FnOnce(&mut ValueSlot, Duration) -> R) -> Result<R> {
        let inner = self.inner.upgrade().ok_or(AnimationError::SchedulerDropped)?;
        let mut guard = lock_inner(&inner);
        let now = guard.clock.now();
        let slot = guard
            .values
            .get_mut(id)
            .ok_or(AnimationError::ValueNotFound(id.to_raw()))?;
        Ok(f(slot, now))
    }

    /// The reactive graph, unless this thread is inside a derived computation
    /// and therefore already holds it
    fn graph(&self, signal: Signal<f32>) -> Result<Arc<Mutex<ReactiveGraph>>> {
        if in_derived_computation() {
            return Err(AnimationError::InsideDerived(signal.id().to_raw()));
        }
        self.reactive.upgrade().ok_or(AnimationError::SchedulerDropped)
    }

    fn read(&self, signal: Signal<f32>) -> Result<f32> {
        let reactive = self.graph(signal)?;
        let value = lock_graph(&reactive).get_untracked(signal);
        value.ok_or(AnimationError::ValueNotFound(signal.id().to_raw()))
    }

}

// ============================================================================
// Shared Value
// ============================================================================

/// A mutable animated number with a stable identity
///
/// Cloning produces another handle to the same value. Reads and writes take
/// effect immediately; installing a descriptor with [`animate`] leaves the
/// value untouched until the scheduler's clock advances.
///
/// Inside an animated style closure, read through the closure's scope so the
/// dependency is tracked. Calling [`try_get`] there fails with
/// [`AnimationError::InsideDerived`] instead of blocking on the graph.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use kinema_animation::{with_timing, AnimationScheduler, TimingConfig};
/// use kinema_core::ReactiveGraph;
///
/// let scheduler = AnimationScheduler::new(Arc::new(Mutex::new(ReactiveGraph::new())));
/// let width = scheduler.create_value(100.0);
///
/// width.set(width.get() + 50.0);
/// assert_eq!(width.get(), 150.0);
///
/// width.animate(with_timing(200.0, TimingConfig::duration_ms(500)));
/// assert_eq!(width.get(), 150.0);
/// scheduler.advance(Duration::from_millis(500));
/// assert_eq!(width.get(), 200.0);
/// ```
///
/// [`animate`]: SharedValue::animate
/// [`try_get`]: SharedValue::try_get
#[derive(Clone)]
pub struct SharedValue {
    handle: SchedulerHandle,
    id: SharedValueId,
    signal: Signal<f32>,
}

impl SharedValue {
    pub fn id(&self) -> SharedValueId {
        self.id
    }

    /// The reactive signal holding the current value
    pub fn signal(&self) -> Signal<f32> {
        self.signal
    }

    /// Get the current value
    ///
    /// Returns 0.0 once the owning scheduler is gone, and logs an error and
    /// returns 0.0 when called from inside an animated style.
    pub fn get(&self) -> f32 {
        match self.try_get() {
            Ok(value) => value,
            Err(e @ AnimationError::InsideDerived(_)) => {
                tracing::error!("{}", e);
                0.0
            }
            Err(_) => 0.0,
        }
    }

    /// Get the current value
    pub fn try_get(&self) -> Result<f32> {
        self.handle.read(self.signal)
    }

    /// Assign a value immediately, discarding any in-flight animation
    pub fn set(&self, value: f32) {
        if let Err(e) = self.try_set(value) {
            tracing::warn!("shared value {}: set({}) ignored: {}", self.id.to_raw(), value, e);
        }
    }

    /// Assign a value immediately, discarding any in-flight animation
    pub fn try_set(&self, value: f32) -> Result<()> {
        let reactive = self.handle.graph(self.signal)?;
        self.handle.with_slot(self.id, |slot, _| {
            slot.state = ValueState::Idle;
        })?;
        lock_graph(&reactive).set(self.signal, value);
        Ok(())
    }

    /// Install an animation descriptor, replacing any in-flight one
    ///
    /// Invalid descriptors are logged and ignored; use [`try_animate`] to
    /// observe the error.
    ///
    /// [`try_animate`]: SharedValue::try_animate
    pub fn animate(&self, descriptor: AnimationDescriptor) {
        if let Err(e) = self.try_animate(descriptor) {
            tracing::error!("shared value {}: animation rejected: {}", self.id.to_raw(), e);
        }
    }

    /// Install an animation descriptor, replacing any in-flight one
    ///
    /// The descriptor starts from the current value at the current virtual
    /// instant. The value itself does not change until the clock advances.
    pub fn try_animate(&self, descriptor: AnimationDescriptor) -> Result<()> {
        let from = self.try_get()?;
        descriptor.validate(from)?;

        tracing::debug!(
            "shared value {}: animating from {} ({:?})",
            self.id.to_raw(),
            from,
            descriptor
        );

        self.handle.with_slot(self.id, |slot, now| {
            slot.state = ValueState::Animating {
                descriptor,
                from,
                started_at: now,
            };
        })
    }

    /// Stop any in-flight animation, keeping the value where it is
    pub fn cancel(&self) {
        let result = self.handle.with_slot(self.id, |slot, _| {
            slot.state = ValueState::Idle;
        });
        if let Err(e) = result {
            tracing::warn!("shared value {}: cancel ignored: {}", self.id.to_raw(), e);
        }
    }

    /// Check if a descriptor is currently playing
    pub fn is_animating(&self) -> bool {
        self.state()
            .is_some_and(|state| state != ValueState::Idle)
    }

    /// Current animation state, if the value still exists
    pub fn state(&self) -> Option<ValueState> {
        self.handle
            .with_slot(self.id, |slot, _| slot.state.clone())
            .ok()
    }
}

impl std::fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedValue")
            .field("id", &self.id.to_raw())
            .field("value", &self.try_get().ok())
            .finish()
    }
}
