//! Vertical physics for the runner actor
//!
//! Frame-based integration (one call per animation frame, no dt). Gravity or
//! the weaker glide acceleration, then a hard clamp between ceiling and floor.

use serde::{Deserialize, Serialize};

use crate::config::Capabilities;
use crate::error::{self, Result};

/// Tuning for the runner actor. Units are pixels and pixels/frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Nominal (visual) radius of the actor
    pub radius: f32,
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Downward acceleration per frame while gliding and falling
    pub glide_accel: f32,
    /// Velocity set by a jump (negative is up)
    pub jump_force: f32,
    /// Mid-air jump strength relative to `jump_force`
    pub air_jump_factor: f32,
    /// Mid-air jump only while velocity is above this (still rising slowly or falling)
    pub air_jump_min_velocity: f32,
    /// Velocity set by a slam
    pub slam_velocity: f32,
    /// Distance to the floor that still counts as standing on it
    pub ground_tolerance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            radius: 40.0,
            gravity: 0.6,
            glide_accel: 0.15,
            jump_force: -13.0,
            air_jump_factor: 0.9,
            air_jump_min_velocity: -4.0,
            slam_velocity: 15.0,
            ground_tolerance: 15.0,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<()> {
        error::positive("physics.radius", self.radius)?;
        error::positive("physics.gravity", self.gravity)?;
        error::non_negative("physics.glide_accel", self.glide_accel)?;
        error::finite("physics.jump_force", self.jump_force)?;
        error::non_negative("physics.air_jump_factor", self.air_jump_factor)?;
        error::finite("physics.air_jump_min_velocity", self.air_jump_min_velocity)?;
        error::finite("physics.slam_velocity", self.slam_velocity)?;
        error::non_negative("physics.ground_tolerance", self.ground_tolerance)?;
        Ok(())
    }
}

/// Which kind of jump (if any) an input produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JumpOutcome {
    Ground,
    Air,
    Ignored,
}

/// The actor's vertical state. x is fixed by the game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Body {
    pub y: f32,
    pub velocity: f32,
    pub gliding: bool,
    /// Set once the mid-air jump has been spent; cleared on landing
    pub air_jump_used: bool,
}

impl Body {
    pub fn new(y: f32) -> Self {
        Self {
            y,
            velocity: 0.0,
            gliding: false,
            air_jump_used: false,
        }
    }

    /// Gap between the bottom of the actor and the floor
    #[inline]
    pub fn distance_to_floor(&self, floor_y: f32, cfg: &PhysicsConfig) -> f32 {
        floor_y - (self.y + cfg.radius)
    }

    #[inline]
    pub fn is_grounded(&self, floor_y: f32, cfg: &PhysicsConfig) -> bool {
        self.distance_to_floor(floor_y, cfg) <= cfg.ground_tolerance
    }

    /// Advance one frame. Pure: same input, same output.
    pub fn integrate(self, floor_y: f32, cfg: &PhysicsConfig) -> Self {
        let mut next = self;

        if next.gliding && next.velocity > 0.0 {
            next.velocity += cfg.glide_accel;
        } else {
            next.velocity += cfg.gravity;
        }

        next.y += next.velocity;

        let floor_limit = floor_y - cfg.radius;
        if next.y >= floor_limit {
            next.y = floor_limit;
            next.velocity = 0.0;
            next.air_jump_used = false;
        }

        if next.y < cfg.radius {
            next.y = cfg.radius;
            next.velocity = 0.0;
        }

        next
    }

    /// Jump from the ground, or spend the single mid-air jump when the
    /// capability allows it.
    pub fn jump(&mut self, floor_y: f32, cfg: &PhysicsConfig, caps: Capabilities) -> JumpOutcome {
        if self.is_grounded(floor_y, cfg) {
            self.velocity = cfg.jump_force;
            self.air_jump_used = false;
            return JumpOutcome::Ground;
        }

        if caps.super_jump && !self.air_jump_used && self.velocity > cfg.air_jump_min_velocity {
            self.velocity = cfg.jump_force * cfg.air_jump_factor;
            self.air_jump_used = true;
            return JumpOutcome::Air;
        }

        JumpOutcome::Ignored
    }

    /// Forced fast descent, allowed anywhere
    pub fn slam(&mut self, cfg: &PhysicsConfig) {
        self.velocity = cfg.slam_velocity;
    }
}
