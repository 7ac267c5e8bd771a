//! Shared value storage and derived values
//!
//! Writes mark dependent derived values stale; a stale derived value is
//! recomputed the next time it is read.
//!
//! Dependencies are tracked automatically: every signal read through
//! [`ReactiveGraph::get`] while a derived value is computing is recorded,
//! and the derived value is marked dirty the next time any of those
//! signals is written.
//!
//! ```
//! use kinema_core::reactive::ReactiveGraph;
//!
//! let mut graph = ReactiveGraph::new();
//! let width = graph.create_signal(100.0f32);
//! let doubled = graph.create_derived(move |g| g.get(width).unwrap_or(0.0) * 2.0);
//!
//! assert_eq!(graph.get_derived(doubled), Some(200.0));
//! graph.set(width, 150.0);
//! assert_eq!(graph.get_derived(doubled), Some(300.0));
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex};

thread_local! {
    /// Depth of derived computations running on this thread
    static COMPUTING: Cell<u32> = const { Cell::new(0) };
}

/// Whether a derived value is being computed on the current thread
///
/// The graph is borrowed for the whole computation, so anything reached from
/// a compute closure must read through the graph it was handed rather than
/// lock the graph again.
pub fn in_derived_computation() -> bool {
    COMPUTING.with(|depth| depth.get() > 0)
}

struct ComputingGuard;

impl ComputingGuard {
    fn enter() -> Self {
        COMPUTING.with(|depth| depth.set(depth.get() + 1));
        ComputingGuard
    }
}

impl Drop for ComputingGuard {
    fn drop(&mut self) {
        COMPUTING.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

new_key_type! {
    /// Key of a signal slot
    pub struct SignalId;
    /// Key of a derived slot
    pub struct DerivedId;
}

/// Typed handle to a signal slot
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Signal<T> {}

impl<T> Signal<T> {
    pub fn id(&self) -> SignalId {
        self.id
    }
}

impl SignalId {
    /// Convert to raw u64 for logging and storage
    pub fn to_raw(&self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Typed handle to a derived slot
#[derive(Debug)]
pub struct Derived<T> {
    id: DerivedId,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Derived<T> {}

impl<T> Derived<T> {
    pub fn id(&self) -> DerivedId {
        self.id
    }
}

type ComputeFn = Box<dyn Fn(&ReactiveGraph) -> Box<dyn Any + Send> + Send>;

struct SignalSlot {
    value: Box<dyn Any + Send>,
    /// Bumped on every write
    version: u64,
    /// Derived values to invalidate on change
    subscribers: SmallVec<[DerivedId; 4]>,
}

struct DerivedSlot {
    /// Last computed value
    value: Option<Box<dyn Any + Send>>,
    /// The compute function; taken out while it runs
    compute: Option<ComputeFn>,
    /// Signals read during the last computation
    dependencies: SmallVec<[SignalId; 4]>,
    /// Set when a dependency is written
    dirty: bool,
    /// Number of times the value has been recomputed
    computations: u64,
}

/// The reactive graph that manages all signals and derived values
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalSlot>,
    derived: SlotMap<DerivedId, DerivedSlot>,
    /// Signals read by the derived value currently computing
    tracking: RefCell<Option<Vec<SignalId>>>,
    writes: Cell<u64>,
}

impl ReactiveGraph {
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            derived: SlotMap::with_key(),
            tracking: RefCell::new(None),
            writes: Cell::new(0),
        }
    }

    /// Allocate a signal holding `initial`
    pub fn create_signal<T: Send + 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalSlot {
            value: Box::new(initial),
            version: 0,
            subscribers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// Read a signal
    ///
    /// If called while a derived value is computing, this signal is
    /// recorded as one of its dependencies.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        if let Some(ref mut deps) = *self.tracking.borrow_mut() {
            if !deps.contains(&signal.id) {
                deps.push(signal.id);
            }
        }

        self.get_untracked(signal)
    }

    /// Read a signal without recording a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Set the value of a signal, invalidating every derived value that read it
    pub fn set<T: Send + 'static>(&mut self, signal: Signal<T>, value: T) {
        let Some(node) = self.signals.get_mut(signal.id) else {
            tracing::warn!("set() on disposed signal {}", signal.id.to_raw());
            return;
        };
        node.value = Box::new(value);
        node.version += 1;
        self.writes.set(self.writes.get() + 1);

        let subscribers = node.subscribers.clone();
        for sub in subscribers {
            if let Some(derived) = self.derived.get_mut(sub) {
                derived.dirty = true;
            }
        }
    }

    /// Replace a signal's value with `f(current)`
    pub fn update<T: Clone + Send + 'static, F: FnOnce(T) -> T>(
        &mut self,
        signal: Signal<T>,
        f: F,
    ) {
        if let Some(current) = self.get_untracked(signal) {
            self.set(signal, f(current));
        }
    }

    pub fn signal_version(&self, id: SignalId) -> Option<u64> {
        self.signals.get(id).map(|n| n.version)
    }

    /// Remove a signal from the graph
    pub fn dispose_signal<T>(&mut self, signal: Signal<T>) {
        if let Some(node) = self.signals.remove(signal.id) {
            for sub in node.subscribers {
                if let Some(derived) = self.derived.get_mut(sub) {
                    derived.dirty = true;
                }
            }
        }
    }

    /// Register a derived value computed from signals
    ///
    /// The compute function runs lazily on the first [`get_derived`] and again
    /// only after one of the signals it read has changed.
    ///
    /// [`get_derived`]: ReactiveGraph::get_derived
    pub fn create_derived<T, F>(&mut self, compute: F) -> Derived<T>
    where
        T: Clone + Send + 'static,
        F: Fn(&ReactiveGraph) -> T + Send + 'static,
    {
        let compute_boxed =
            move |graph: &ReactiveGraph| -> Box<dyn Any + Send> { Box::new(compute(graph)) };

        let id = self.derived.insert(DerivedSlot {
            value: None,
            compute: Some(Box::new(compute_boxed)),
            dependencies: SmallVec::new(),
            dirty: true,
            computations: 0,
        });

        Derived {
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// Read a derived value, recomputing it when stale
    pub fn get_derived<T: Clone + 'static>(&mut self, derived: Derived<T>) -> Option<T> {
        let node = self.derived.get_mut(derived.id)?;

        if !node.dirty {
            if let Some(ref cached) = node.value {
                return cached.downcast_ref::<T>().cloned();
            }
        }

        // A derived that reads itself would find its compute function missing
        let compute = node.compute.take()?;

        let outer = self.tracking.replace(Some(Vec::new()));
        let value = {
            let _computing = ComputingGuard::enter();
            compute(self)
        };
        let deps = self.tracking.replace(outer).unwrap_or_default();

        let old_deps = self
            .derived
            .get_mut(derived.id)
            .map(|node| std::mem::take(&mut node.dependencies))
            .unwrap_or_default();

        for dep_id in old_deps {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                sig.subscribers.retain(|s| *s != derived.id);
            }
        }

        // Resubscribe to what this computation actually read
        for &dep_id in &deps {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                if !sig.subscribers.contains(&derived.id) {
                    sig.subscribers.push(derived.id);
                }
            }
        }

        let node = self.derived.get_mut(derived.id)?;
        node.compute = Some(compute);
        node.dependencies = deps.into_iter().collect();
        node.dirty = false;
        node.computations += 1;

        let result = value.downcast_ref::<T>().cloned();
        node.value = Some(value);
        result
    }

    /// Whether a derived value will recompute on its next read
    pub fn is_derived_dirty(&self, id: DerivedId) -> bool {
        self.derived.get(id).map(|n| n.dirty).unwrap_or(false)
    }

    /// Number of times a derived value has been computed
    pub fn derived_computations(&self, id: DerivedId) -> u64 {
        self.derived.get(id).map(|n| n.computations).unwrap_or(0)
    }

    /// Remove a derived value from the graph
    pub fn dispose_derived<T>(&mut self, derived: Derived<T>) {
        if let Some(node) = self.derived.remove(derived.id) {
            for dep_id in node.dependencies {
                if let Some(sig) = self.signals.get_mut(dep_id) {
                    sig.subscribers.retain(|s| *s != derived.id);
                }
            }
        }
    }

    /// Slot counts, for leak checks in tests
    pub fn stats(&self) -> ReactiveStats {
        ReactiveStats {
            signal_count: self.signals.len(),
            derived_count: self.derived.len(),
            dirty_derived: self.derived.values().filter(|n| n.dirty).count(),
            writes: self.writes.get(),
        }
    }
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the reactive graph
#[derive(Debug, Clone)]
pub struct ReactiveStats {
    pub signal_count: usize,
    pub derived_count: usize,
    pub dirty_derived: usize,
    pub writes: u64,
}

/// Shared reactive graph for access from handles and callbacks
pub type SharedReactiveGraph = Arc<Mutex<ReactiveGraph>>;
