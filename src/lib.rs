//! Flock Arcade - frame simulation for the LiLi runner and the Goose minigames
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, spawning, per-game drivers)
//! - `session`: Host-facing driver (input queue, timers, snapshots, teardown)
//! - `config`: Session configuration with validation
//! - `progress`: Per-level best score and star bookkeeping
//! - `host`: wasm-bindgen surface for the browser (wasm32 only)

pub mod config;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod host;
pub mod progress;
pub mod session;
pub mod sim;

pub use config::{Capabilities, GameConfig, SessionConfig};
pub use error::ConfigError;
pub use progress::Progress;
pub use session::{InputEvent, Session, SessionResult, Snapshot, TickOutcome};

use glam::Vec2;

/// Frame timing constants
pub mod consts {
    /// Simulated duration of one animation frame (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum frames per `Session::advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Elapsed time above this is treated as a stall and clamped (tab switch, debugger)
    pub const MAX_ELAPSED_MS: f64 = 250.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Point on a circle of `radius` around `center` at `theta`
#[inline]
pub fn orbit_point(center: Vec2, radius: f32, theta: f32) -> Vec2 {
    center + Vec2::new(radius * theta.cos(), radius * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert!(normalize_angle(PI) < PI);
    }

    #[test]
    fn test_orbit_point() {
        let p = orbit_point(Vec2::new(100.0, 50.0), 80.0, PI / 2.0);
        assert!((p.x - 100.0).abs() < 1e-4);
        assert!((p.y - 130.0).abs() < 1e-4);
    }
}
