//! Animation descriptors
//!
//! An [`AnimationDescriptor`] is an immutable description of how a shared
//! value moves from wherever it currently is to a target. Installing one on
//! a [`SharedValue`](crate::SharedValue) records the start value and start
//! instant; from then on the value at any virtual instant is
//! `descriptor.sample(from, now - started_at)`.
//!
//! Sampling is a pure function of `(from, elapsed)`, which is what makes
//! snapshots reproducible regardless of how the clock was advanced.
//!
//! ```
//! use std::time::Duration;
//! use kinema_animation::{with_repeat, with_timing, TimingConfig};
//!
//! let swing = with_repeat(with_timing(-100.0, TimingConfig::duration_ms(500)), -1, true);
//! assert_eq!(swing.sample(100.0, Duration::ZERO).value, 100.0);
//! assert_eq!(swing.sample(100.0, Duration::from_millis(500)).value, -100.0);
//! assert_eq!(swing.sample(100.0, Duration::from_millis(1000)).value, 100.0);
//! assert!(swing.duration(100.0).is_none());
//! ```

use std::time::Duration;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::spring::{self, SpringConfig};
use crate::values::Interpolate;

/// Duration used by timing animations when none is given
pub const DEFAULT_TIMING_DURATION: Duration = Duration::from_millis(300);

/// Duration and easing of a timing animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingConfig {
    pub duration: Duration,
    pub easing: Easing,
}

impl TimingConfig {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }

    /// Default easing with the given duration in milliseconds
    pub fn duration_ms(ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(ms),
            ..Self::default()
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_TIMING_DURATION,
            easing: Easing::default(),
        }
    }
}

/// How many cycles a repeat runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatCount {
    Times(u32),
    Infinite,
}

impl RepeatCount {
    /// Zero or negative repetitions mean "forever"
    pub fn from_reps(reps: i32) -> Self {
        if reps <= 0 {
            RepeatCount::Infinite
        } else {
            RepeatCount::Times(reps as u32)
        }
    }
}

/// An immutable animation instruction
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationDescriptor {
    /// Eased interpolation to `to` over a fixed duration
    Timing { to: f32, config: TimingConfig },
    /// Spring motion to `to`, finishing once the spring settles
    Spring { to: f32, config: SpringConfig },
    /// Hold the start value for `delay`, then run `inner`
    Delay {
        delay: Duration,
        inner: Box<AnimationDescriptor>,
    },
    /// Run each item in turn, each starting where the previous one ended
    Sequence(Vec<AnimationDescriptor>),
    /// Run `inner` repeatedly, optionally alternating direction
    Repeat {
        inner: Box<AnimationDescriptor>,
        count: RepeatCount,
        reverse: bool,
    },
}

/// The value of a descriptor at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub value: f32,
    /// True once the descriptor has nothing left to play
    pub finished: bool,
}

impl Sample {
    fn running(value: f32) -> Self {
        Self {
            value,
            finished: false,
        }
    }

    fn done(value: f32) -> Self {
        Self {
            value,
            finished: true,
        }
    }
}

impl AnimationDescriptor {
    /// Total play time when starting from `from`; `None` if it never finishes
    pub fn duration(&self, from: f32) -> Option<Duration> {
        match self {
            AnimationDescriptor::Timing { config, .. } => Some(config.duration),
            AnimationDescriptor::Spring { to, config } => {
                Some(spring::settle_time(*config, from, *to))
            }
            AnimationDescriptor::Delay { delay, inner } => {
                inner.duration(from).map(|d| *delay + d)
            }
            AnimationDescriptor::Sequence(items) => {
                let mut start = from;
                let mut total = Duration::ZERO;
                for item in items {
                    total += item.duration(start)?;
                    start = item.end_value(start)?;
                }
                Some(total)
            }
            AnimationDescriptor::Repeat { inner, count, .. } => match count {
                RepeatCount::Infinite => None,
                RepeatCount::Times(n) => inner.duration(from).map(|d| d * *n),
            },
        }
    }

    /// Whether this descriptor keeps running forever
    pub fn is_infinite(&self, from: f32) -> bool {
        self.duration(from).is_none()
    }

    /// Value the descriptor settles on when started from `from`
    pub fn end_value(&self, from: f32) -> Option<f32> {
        match self {
            AnimationDescriptor::Timing { to, .. } | AnimationDescriptor::Spring { to, .. } => {
                Some(*to)
            }
            AnimationDescriptor::Delay { inner, .. } => inner.end_value(from),
            AnimationDescriptor::Sequence(items) => items
                .iter()
                .try_fold(from, |start, item| item.end_value(start)),
            AnimationDescriptor::Repeat {
                inner,
                count,
                reverse,
            } => match count {
                RepeatCount::Infinite => None,
                // An even number of alternating cycles ends back at the start
                RepeatCount::Times(n) if *reverse && n % 2 == 0 => Some(from),
                RepeatCount::Times(_) => inner.end_value(from),
            },
        }
    }

    /// Sample the descriptor `elapsed` after it started from `from`
    pub fn sample(&self, from: f32, elapsed: Duration) -> Sample {
        match self {
            AnimationDescriptor::Timing { to, config } => {
                if elapsed >= config.duration {
                    return Sample::done(*to);
                }
                let progress = (elapsed.as_secs_f64() / config.duration.as_secs_f64()) as f32;
                Sample::running(from.lerp(to, config.easing.apply(progress)))
            }
            AnimationDescriptor::Spring { to, config } => {
                let (value, finished) = spring::sample(*config, from, *to, elapsed);
                Sample { value, finished }
            }
            AnimationDescriptor::Delay { delay, inner } => {
                if elapsed < *delay {
                    Sample::running(from)
                } else {
                    inner.sample(from, elapsed - *delay)
                }
            }
            AnimationDescriptor::Sequence(items) => {
                let mut start = from;
                let mut remaining = elapsed;
                for item in items {
                    match (item.duration(start), item.end_value(start)) {
                        (Some(d), Some(end)) if remaining >= d => {
                            remaining -= d;
                            start = end;
                        }
                        _ => return Sample::running(item.sample(start, remaining).value),
                    }
                }
                Sample::done(start)
            }
            AnimationDescriptor::Repeat {
                inner,
                count,
                reverse,
            } => {
                let cycle = match inner.duration(from) {
                    Some(d) if !d.is_zero() => d,
                    // Rejected by validate(); play the inner descriptor once
                    _ => return inner.sample(from, elapsed),
                };

                let cycle_nanos = cycle.as_nanos();
                let index = elapsed.as_nanos() / cycle_nanos;
                if let RepeatCount::Times(n) = count {
                    if index >= u128::from(*n) {
                        return Sample::done(self.end_value(from).unwrap_or(from));
                    }
                }

                let local = Duration::from_nanos((elapsed.as_nanos() % cycle_nanos) as u64);
                let value = if *reverse && index % 2 == 1 {
                    // Backward cycles play the inner descriptor at mirrored time
                    inner.sample(from, cycle - local).value
                } else {
                    inner.sample(from, local).value
                };
                Sample::running(value)
            }
        }
    }

    /// Check that the descriptor can be played starting from `from`
    pub fn validate(&self, from: f32) -> Result<()> {
        match self {
            AnimationDescriptor::Timing { to, .. } => {
                if !to.is_finite() {
                    return Err(AnimationError::InvalidDescriptor(format!(
                        "timing target must be finite, got {to}"
                    )));
                }
            }
            AnimationDescriptor::Spring { to, config } => {
                if !to.is_finite() {
                    return Err(AnimationError::InvalidDescriptor(format!(
                        "spring target must be finite, got {to}"
                    )));
                }
                if !config.is_valid() {
                    return Err(AnimationError::InvalidDescriptor(format!(
                        "spring config cannot settle: {config:?}"
                    )));
                }
            }
            AnimationDescriptor::Delay { inner, .. } => inner.validate(from)?,
            AnimationDescriptor::Sequence(items) => {
                let mut start = from;
                for item in items {
                    item.validate(start)?;
                    match item.end_value(start) {
                        Some(end) => start = end,
                        // Nothing after an endless item is ever reached
                        None => break,
                    }
                }
            }
            AnimationDescriptor::Repeat { inner, count, .. } => {
                inner.validate(from)?;
                match inner.duration(from) {
                    None => {
                        return Err(AnimationError::InvalidDescriptor(
                            "cannot repeat an animation that never finishes".to_string(),
                        ))
                    }
                    Some(d) if d.is_zero() => {
                        return Err(AnimationError::InvalidDescriptor(
                            "cannot repeat a zero-length animation".to_string(),
                        ))
                    }
                    Some(_) => {}
                }
                if *count == RepeatCount::Times(0) {
                    return Err(AnimationError::InvalidDescriptor(
                        "repeat count must be at least one".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Animate to `to` with the given timing
pub fn with_timing(to: f32, config: TimingConfig) -> AnimationDescriptor {
    AnimationDescriptor::Timing { to, config }
}

/// Animate to `to` with a spring
pub fn with_spring(to: f32, config: SpringConfig) -> AnimationDescriptor {
    AnimationDescriptor::Spring { to, config }
}

/// Hold the current value for `delay`, then run `inner`
pub fn with_delay(delay: Duration, inner: AnimationDescriptor) -> AnimationDescriptor {
    AnimationDescriptor::Delay {
        delay,
        inner: Box::new(inner),
    }
}

/// Run descriptors back to back
pub fn with_sequence(
    items: impl IntoIterator<Item = AnimationDescriptor>,
) -> AnimationDescriptor {
    AnimationDescriptor::Sequence(items.into_iter().collect())
}

/// Repeat `inner` `reps` times (zero or negative for forever), alternating
/// direction each cycle when `reverse` is set
pub fn with_repeat(inner: AnimationDescriptor, reps: i32, reverse: bool) -> AnimationDescriptor {
    AnimationDescriptor::Repeat {
        inner: Box::new(inner),
        count: RepeatCount::from_reps(reps),
        reverse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn timing(to: f32, duration_ms: u64) -> AnimationDescriptor {
        with_timing(to, TimingConfig::duration_ms(duration_ms))
    }

    #[test]
    fn test_timing_start_and_end() {
        let anim = timing(150.0, 500);
        assert_eq!(anim.sample(100.0, Duration::ZERO), Sample::running(100.0));
        assert_eq!(anim.sample(100.0, ms(500)), Sample::done(150.0));
        assert_eq!(anim.sample(100.0, ms(900)), Sample::done(150.0));
        assert_eq!(anim.duration(100.0), Some(ms(500)));
        assert_eq!(anim.end_value(100.0), Some(150.0));
    }

    #[test]
    fn test_timing_path_is_monotonic() {
        let anim = timing(150.0, 500);
        let mut prev = 100.0;
        for t in (0..=500).step_by(10) {
            let v = anim.sample(100.0, ms(t)).value;
            assert!(v >= prev, "value went backwards at {t}ms");
            assert!((100.0..=150.0).contains(&v));
            prev = v;
        }
    }

    #[test]
    fn test_linear_timing_midpoint() {
        let anim = with_timing(200.0, TimingConfig::duration_ms(100).with_easing(Easing::Linear));
        assert!((anim.sample(0.0, ms(25)).value - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_duration_timing_finishes_immediately() {
        let anim = timing(10.0, 0);
        assert_eq!(anim.sample(0.0, Duration::ZERO), Sample::done(10.0));
    }

    #[test]
    fn test_delay_holds_start_value() {
        let anim = with_delay(ms(200), timing(0.0, 100));
        assert_eq!(anim.sample(1.0, ms(150)).value, 1.0);
        assert_eq!(anim.sample(1.0, ms(300)), Sample::done(0.0));
        assert_eq!(anim.duration(1.0), Some(ms(300)));
    }

    #[test]
    fn test_sequence_chains_start_values() {
        let anim = with_sequence([timing(10.0, 100), timing(-10.0, 100)]);
        assert_eq!(anim.sample(0.0, ms(100)).value, 10.0);
        assert_eq!(anim.sample(0.0, ms(200)), Sample::done(-10.0));
        assert_eq!(anim.duration(0.0), Some(ms(200)));
        assert_eq!(anim.end_value(0.0), Some(-10.0));
    }

    #[test]
    fn test_empty_sequence_is_done() {
        let anim = with_sequence(Vec::new());
        assert_eq!(anim.sample(3.0, Duration::ZERO), Sample::done(3.0));
    }

    #[test]
    fn test_alternating_repeat_half_cycles() {
        let anim = with_repeat(timing(-100.0, 500), -1, true);
        for half_cycle in 0..8u64 {
            let v = anim.sample(100.0, ms(500 * half_cycle)).value;
            let expected = if half_cycle % 2 == 0 { 100.0 } else { -100.0 };
            assert!(
                (v - expected).abs() < 1e-3,
                "half cycle {half_cycle}: expected {expected}, got {v}"
            );
        }
        assert!(!anim.sample(100.0, ms(10_000)).finished);
        assert!(anim.is_infinite(100.0));
        assert_eq!(anim.end_value(100.0), None);
    }

    #[test]
    fn test_non_alternating_repeat_restarts_from_start() {
        let anim = with_repeat(timing(50.0, 100), 3, false);
        assert_eq!(anim.sample(0.0, ms(100)).value, 0.0);
        assert_eq!(anim.sample(0.0, ms(200)).value, 0.0);
        assert_eq!(anim.sample(0.0, ms(300)), Sample::done(50.0));
        assert_eq!(anim.duration(0.0), Some(ms(300)));
    }

    #[test]
    fn test_finite_alternating_repeat_end_value() {
        let even = with_repeat(timing(1.0, 100), 2, true);
        assert_eq!(even.end_value(0.0), Some(0.0));
        assert_eq!(even.sample(0.0, ms(200)), Sample::done(0.0));

        let odd = with_repeat(timing(1.0, 100), 3, true);
        assert_eq!(odd.sample(0.0, ms(300)), Sample::done(1.0));
    }

    #[test]
    fn test_spring_descriptor_finishes_on_target() {
        let anim = with_spring(150.0, SpringConfig::stiff());
        let d = anim.duration(100.0).unwrap();
        assert_eq!(anim.sample(100.0, d), Sample::done(150.0));
        assert_eq!(anim.sample(100.0, Duration::ZERO).value, 100.0);
    }

    #[test]
    fn test_validate_rejects_unplayable() {
        assert!(timing(f32::NAN, 100).validate(0.0).is_err());
        assert!(with_repeat(timing(1.0, 0), -1, true).validate(0.0).is_err());
        assert!(with_repeat(with_repeat(timing(1.0, 10), -1, false), 2, false)
            .validate(0.0)
            .is_err());
        assert!(with_spring(1.0, SpringConfig::new(-1.0, 1.0, 1.0))
            .validate(0.0)
            .is_err());
        assert!(with_repeat(timing(-100.0, 500), -1, true).validate(100.0).is_ok());
    }
}
