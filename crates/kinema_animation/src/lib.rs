//! Kinema Animation System
//!
//! Shared values driven by declarative animation descriptors and a
//! deterministic virtual clock.
//!
//! # Features
//!
//! - **Shared Values**: mutable animated numbers backed by reactive signals
//! - **Descriptors**: timing, spring, delay, sequence and repeat animations
//!   sampled as pure functions of elapsed time
//! - **Virtual Clock**: time advances only when asked, frame by frame
//! - **Frame Callbacks**: per-frame hooks run after values are updated
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use kinema_animation::{with_repeat, with_timing, AnimationScheduler, TimingConfig};
//! use kinema_core::ReactiveGraph;
//!
//! let scheduler = AnimationScheduler::new(Arc::new(Mutex::new(ReactiveGraph::new())));
//! let offset = scheduler.create_value(100.0);
//!
//! offset.animate(with_repeat(
//!     with_timing(-100.0, TimingConfig::duration_ms(500)),
//!     -1,
//!     true,
//! ));
//! scheduler.advance(Duration::from_millis(500));
//! assert_eq!(offset.get(), -100.0);
//! scheduler.advance(Duration::from_millis(500));
//! assert_eq!(offset.get(), 100.0);
//! ```

pub mod clock;
pub mod descriptor;
pub mod easing;
pub mod error;
pub mod scheduler;
pub mod spring;
pub mod values;

pub use clock::VirtualClock;
pub use descriptor::{
    with_delay, with_repeat, with_sequence, with_spring, with_timing, AnimationDescriptor,
    RepeatCount, Sample, TimingConfig, DEFAULT_TIMING_DURATION,
};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use scheduler::{
    AnimationScheduler, FrameCallback, FrameCallbackId, FrameInfo, SchedulerHandle, SharedValue,
    SharedValueId, ValueState, DEFAULT_FRAME_INTERVAL,
};
pub use spring::{Spring, SpringConfig};
pub use values::Interpolate;
