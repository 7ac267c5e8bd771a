//! Spring motion
//!
//! Springs are simulated with RK4 at a fixed step from the moment they
//! start, so sampling a spring at a given elapsed time always produces the
//! same value regardless of how the clock got there.

use std::time::Duration;

/// Fixed simulation step (120 Hz)
pub const SPRING_STEP: Duration = Duration::from_nanos(8_333_333);

/// Springs still moving after this long are snapped to their target
pub const SPRING_MAX_DURATION: Duration = Duration::from_secs(10);

const REST_DISTANCE: f32 = 0.01;
const REST_VELOCITY: f32 = 2.0;

/// Physical parameters of a spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// Noticeable overshoot
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    pub fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Slow, without overshoot
    pub fn molasses() -> Self {
        Self::new(100.0, 20.0, 1.0)
    }

    /// Damping at which the spring stops oscillating
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    pub fn overshoots(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Whether the parameters describe a spring that can settle
    pub fn is_valid(&self) -> bool {
        self.stiffness > 0.0
            && self.mass > 0.0
            && self.damping >= 0.0
            && self.stiffness.is_finite()
            && self.damping.is_finite()
            && self.mass.is_finite()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// A spring released at rest from `position`, pulled toward `target`
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    target: f32,
    position: f32,
    velocity: f32,
}

impl Spring {
    pub fn released(config: SpringConfig, from: f32, target: f32) -> Self {
        Self {
            config,
            target,
            position: from,
            velocity: 0.0,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn at_rest(&self) -> bool {
        (self.position - self.target).abs() < REST_DISTANCE && self.velocity.abs() < REST_VELOCITY
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if self.at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
            return;
        }

        let (x, v) = (self.position, self.velocity);
        let half = dt * 0.5;

        let (dx1, dv1) = (v, self.accel(x, v));
        let (dx2, dv2) = (v + dv1 * half, self.accel(x + dx1 * half, v + dv1 * half));
        let (dx3, dv3) = (v + dv2 * half, self.accel(x + dx2 * half, v + dv2 * half));
        let (dx4, dv4) = (v + dv3 * dt, self.accel(x + dx3 * dt, v + dv3 * dt));

        self.position = x + dt / 6.0 * (dx1 + 2.0 * (dx2 + dx3) + dx4);
        self.velocity = v + dt / 6.0 * (dv1 + 2.0 * (dv2 + dv3) + dv4);
    }

    fn accel(&self, x: f32, v: f32) -> f32 {
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;
        (stiffness * (self.target - x) - damping * v) / mass
    }

    fn run_for(&mut self, elapsed: Duration) {
        let mut remaining = elapsed;
        while remaining >= SPRING_STEP {
            self.step(SPRING_STEP.as_secs_f32());
            remaining -= SPRING_STEP;
        }
        if !remaining.is_zero() {
            self.step(remaining.as_secs_f32());
        }
    }
}

/// Time for a spring released at `from` to come to rest on `to`
pub fn settle_time(config: SpringConfig, from: f32, to: f32) -> Duration {
    let mut spring = Spring::released(config, from, to);
    let mut elapsed = Duration::ZERO;
    while !spring.at_rest() && elapsed < SPRING_MAX_DURATION {
        spring.step(SPRING_STEP.as_secs_f32());
        elapsed += SPRING_STEP;
    }
    elapsed
}

/// Position of a spring from `from` to `to` after `elapsed`, and whether it
/// has settled
pub fn sample(config: SpringConfig, from: f32, to: f32, elapsed: Duration) -> (f32, bool) {
    if elapsed >= settle_time(config, from, to) {
        return (to, true);
    }
    let mut spring = Spring::released(config, from, to);
    spring.run_for(elapsed);
    (spring.position(), false)
}
