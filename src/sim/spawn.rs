//! Spawn scheduling: when the next entity appears and which variant it is
//!
//! Variant choice uses cumulative probability bands against a single uniform
//! roll, checked from the highest threshold down. Cadence shrinks with speed
//! but never below a floor, plus jitter so spawns don't feel periodic.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

/// Spawn fires once the frame counter reaches the threshold
#[inline]
pub fn should_spawn(frame: u64, next_spawn: u64) -> bool {
    frame >= next_spawn
}

/// Speed-scaled spawn interval in frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnCadence {
    /// Lower bound on the interval, whatever the speed
    pub min_interval: f32,
    /// Interval at speed zero
    pub base_interval: f32,
    /// Frames removed from the interval per unit of speed
    pub speed_scale: f32,
    /// Maximum extra random frames
    pub jitter: f32,
}

impl Default for SpawnCadence {
    fn default() -> Self {
        Self {
            min_interval: 60.0,
            base_interval: 150.0,
            speed_scale: 8.0,
            jitter: 40.0,
        }
    }
}

impl SpawnCadence {
    pub fn validate(&self) -> Result<()> {
        error::positive("cadence.min_interval", self.min_interval)?;
        error::positive("cadence.base_interval", self.base_interval)?;
        error::non_negative("cadence.speed_scale", self.speed_scale)?;
        error::non_negative("cadence.jitter", self.jitter)?;
        Ok(())
    }

    /// Interval before jitter: `max(min, base - speed * scale)`
    pub fn interval(&self, speed: f32) -> f32 {
        (self.base_interval - speed * self.speed_scale).max(self.min_interval)
    }

    /// Frame at which the next spawn fires. `jitter_sample` is in `[0, 1)`.
    ///
    /// Non-increasing in `speed` and always at least `frame + min_interval`.
    pub fn next_spawn(&self, frame: u64, speed: f32, jitter_sample: f32) -> u64 {
        let wait = self.interval(speed) + self.jitter * jitter_sample.clamp(0.0, 1.0);
        frame + wait.ceil() as u64
    }

    /// [`Self::next_spawn`] with jitter drawn from `rng`
    pub fn schedule<R: Rng>(&self, frame: u64, speed: f32, rng: &mut R) -> u64 {
        let sample: f32 = rng.random();
        self.next_spawn(frame, speed, sample)
    }
}

/// One probability band: rolls strictly above `threshold` select `value`
#[derive(Debug, Clone, Copy)]
pub struct Band<T> {
    pub threshold: f32,
    pub value: T,
    pub enabled: bool,
}

/// Variant picker over cumulative bands with a fallback for low rolls
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    /// Sorted by threshold, highest first
    bands: Vec<Band<T>>,
    fallback: T,
}

impl<T: Copy + PartialEq> WeightedTable<T> {
    pub fn new(fallback: T) -> Self {
        Self {
            bands: Vec::new(),
            fallback,
        }
    }

    /// Add a band selected by rolls above `threshold`
    pub fn band(mut self, threshold: f32, value: T) -> Self {
        let at = self
            .bands
            .iter()
            .position(|b| b.threshold < threshold)
            .unwrap_or(self.bands.len());
        self.bands.insert(
            at,
            Band {
                threshold,
                value,
                enabled: true,
            },
        );
        self
    }

    /// Disabled bands fall through to the next lower band
    pub fn set_enabled(&mut self, value: T, enabled: bool) {
        for band in self.bands.iter_mut().filter(|b| b.value == value) {
            band.enabled = enabled;
        }
    }

    pub fn pick(&self, roll: f32) -> T {
        self.bands
            .iter()
            .find(|b| b.enabled && roll > b.threshold)
            .map(|b| b.value)
            .unwrap_or(self.fallback)
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> T {
        let roll: f32 = rng.random();
        self.pick(roll)
    }
}

/// Reject spawn positions that went NaN or infinite
pub fn checked_position(pos: Vec2) -> Option<Vec2> {
    if pos.is_finite() {
        Some(pos)
    } else {
        log::warn!("Rejected spawn at non-finite position {pos:?}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Rock,
        Popcorn,
        Lasagna,
    }

    fn runner_table() -> WeightedTable<Kind> {
        WeightedTable::new(Kind::Rock)
            .band(0.60, Kind::Popcorn)
            .band(0.96, Kind::Lasagna)
    }

    #[test]
    fn test_should_spawn() {
        assert!(!should_spawn(59, 60));
        assert!(should_spawn(60, 60));
        assert!(should_spawn(61, 60));
    }

    #[test]
    fn test_bands_pick_by_roll() {
        let table = runner_table();
        assert_eq!(table.pick(0.0), Kind::Rock);
        assert_eq!(table.pick(0.60), Kind::Rock);
        assert_eq!(table.pick(0.61), Kind::Popcorn);
        assert_eq!(table.pick(0.97), Kind::Lasagna);
    }

    #[test]
    fn test_disabled_band_falls_through() {
        let mut table = runner_table();
        table.set_enabled(Kind::Lasagna, false);
        assert_eq!(table.pick(0.99), Kind::Popcorn);
        table.set_enabled(Kind::Lasagna, true);
        assert_eq!(table.pick(0.99), Kind::Lasagna);
    }

    #[test]
    fn test_band_order_does_not_depend_on_insertion() {
        let table = WeightedTable::new(Kind::Rock)
            .band(0.96, Kind::Lasagna)
            .band(0.60, Kind::Popcorn);
        assert_eq!(table.pick(0.99), Kind::Lasagna);
        assert_eq!(table.pick(0.7), Kind::Popcorn);
    }

    #[test]
    fn test_interval_floor() {
        let cadence = SpawnCadence::default();
        assert_eq!(cadence.interval(0.0), 150.0);
        assert_eq!(cadence.interval(10.0), 70.0);
        assert_eq!(cadence.interval(14.0), 60.0);
        assert_eq!(cadence.next_spawn(100, 14.0, 0.0), 160);
    }

    #[test]
    fn test_draw_is_seeded() {
        let table = runner_table();
        let mut a = Pcg32::seed_from_u64(5);
        let mut b = Pcg32::seed_from_u64(5);
        let left: Vec<Kind> = (0..50).map(|_| table.draw(&mut a)).collect();
        let right: Vec<Kind> = (0..50).map(|_| table.draw(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_checked_position() {
        assert!(checked_position(Vec2::new(1.0, 2.0)).is_some());
        assert!(checked_position(Vec2::new(f32::NAN, 2.0)).is_none());
        assert!(checked_position(Vec2::new(0.0, f32::INFINITY)).is_none());
    }

    proptest! {
        #[test]
        fn prop_cadence_non_increasing_in_speed(
            frame in 0u64..100_000,
            slow in 0.0f32..30.0,
            extra in 0.0f32..30.0,
            sample in 0.0f32..1.0,
        ) {
            let cadence = SpawnCadence::default();
            let fast = slow + extra;
            prop_assert!(cadence.next_spawn(frame, fast, sample) <= cadence.next_spawn(frame, slow, sample));
        }

        #[test]
        fn prop_cadence_respects_min_interval(
            frame in 0u64..100_000,
            speed in 0.0f32..100.0,
            sample in 0.0f32..1.0,
        ) {
            let cadence = SpawnCadence::default();
            let next = cadence.next_spawn(frame, speed, sample);
            prop_assert!(next >= frame + cadence.min_interval as u64);
        }
    }
}
