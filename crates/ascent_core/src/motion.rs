//! Vertical motion model for the astronaut.
//!
//! Velocity is a single scalar measured in world units per simulation step.
//! Input sources never write the astronaut's position: they request a target
//! height and the model turns the remaining distance into a velocity impulse.
//! Each step then spends part of that velocity, decaying it linearly until it
//! snaps to exactly zero, so motion always comes to rest after a bounded
//! number of steps.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Distance-to-velocity divisor (`K`): an impulse adds `distance / K`.
    pub gain_divisor: f32,
    /// Velocity is clamped to `[-max_velocity, max_velocity]`.
    pub max_velocity: f32,
    /// Below this magnitude velocity is treated as rest and zeroed.
    pub rest_epsilon: f32,
    /// Linear decay per second of frame delta.
    pub decay_rate: f32,
    /// Minimum decay per step, so a zero frame delta still converges.
    pub decay_floor: f32,
    /// Multiplier applied each step while movement is restrained.
    pub soft_stop_factor: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            gain_divisor: 100.0,
            max_velocity: 0.15,
            rest_epsilon: 0.0005,
            decay_rate: 0.05,
            decay_floor: 1.0e-5,
            soft_stop_factor: 0.9,
        }
    }
}

/// Inclusive vertical range `[min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Band {
    pub min_y: f32,
    pub max_y: f32,
}

impl Band {
    pub const fn new(min_y: f32, max_y: f32) -> Self {
        Self { min_y, max_y }
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    pub fn clamp(&self, y: f32) -> f32 {
        y.clamp(self.min_y, self.max_y)
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Whether the current step may apply velocity at full strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    Free,
    /// Velocity still applies but bleeds off multiplicatively (soft stop).
    Restrained,
}

#[derive(Debug, Clone)]
pub struct MotionModel {
    velocity: f32,
    pub config: MotionConfig,
}

impl MotionModel {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            velocity: 0.0,
            config,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_at_rest(&self) -> bool {
        self.velocity == 0.0
    }

    /// Add an impulse toward `target_y`. A request for the current height is a no-op.
    pub fn apply_velocity(&mut self, current_y: f32, target_y: f32) {
        if current_y == target_y || !target_y.is_finite() {
            return;
        }
        let limit = self.config.max_velocity;
        self.velocity += (target_y - current_y) / self.config.gain_divisor;
        self.velocity = self.velocity.clamp(-limit, limit);
    }

    /// Clamp `requested_y` into `band` first, then steer toward it.
    /// Returns the clamped target.
    pub fn steer(&mut self, current_y: f32, requested_y: f32, band: Band) -> f32 {
        let target = band.clamp(requested_y);
        self.apply_velocity(current_y, target);
        target
    }

    pub fn stop(&mut self) {
        self.velocity = 0.0;
    }

    /// Apply one step of velocity to `y` and decay it. Returns the new height.
    pub fn advance(&mut self, y: f32, drive: Drive, band: Band, dt: f32) -> f32 {
        if self.velocity.abs() < self.config.rest_epsilon {
            self.velocity = 0.0;
            return y;
        }

        if drive == Drive::Restrained || !band.contains(y) {
            self.velocity *= self.config.soft_stop_factor;
        }
        let next = y + self.velocity;
        self.decay(dt);
        next
    }

    fn decay(&mut self, dt: f32) {
        // f32::max drops a NaN operand, so a NaN delta decays by the floor.
        let step = (dt.max(0.0) * self.config.decay_rate).max(self.config.decay_floor);
        if self.velocity > 0.0 {
            self.velocity = (self.velocity - step).max(0.0);
        } else if self.velocity < 0.0 {
            self.velocity = (self.velocity + step).min(0.0);
        }
    }
}

impl Default for MotionModel {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}
