//! Session configuration
//!
//! Plain serde structs with defaults matching the shipped games. A host can
//! send partial JSON; missing fields take the defaults. Everything is checked
//! once in [`SessionConfig::validate`] and read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{self, ConfigError, Result};
use crate::sim::physics::PhysicsConfig;
use crate::sim::spawn::SpawnCadence;

/// Unlocks the host passes in from the player's save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Red cape: one extra jump per airborne phase in the runner
    pub super_jump: bool,
}

/// Score needed for three and two stars; anything else gets one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    pub three: u64,
    pub two: u64,
}

impl StarThresholds {
    pub fn rating(&self, score: u64) -> u8 {
        if score >= self.three {
            3
        } else if score >= self.two {
            2
        } else {
            1
        }
    }
}

/// LiLi's side-scrolling runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub width: f32,
    pub height: f32,
    /// Ground strip height; the floor is at `height - ground_height`
    pub ground_height: f32,
    pub player_x: f32,
    pub start_y: f32,
    pub physics: PhysicsConfig,
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Speed added per frame until `max_speed`
    pub acceleration: f32,
    pub obstacle_size: f32,
    pub cadence: SpawnCadence,
    pub first_spawn_frame: u64,
    /// Obstacles left of this x are dropped
    pub despawn_x: f32,
    pub player_hitbox_ratio: f32,
    pub obstacle_hitbox_ratio: f32,
    pub popcorn_points: u32,
    pub lasagna_points: u32,
    /// Roll above which popcorn spawns
    pub popcorn_roll: f32,
    /// Roll above which the lasagna spawns (until eaten)
    pub lasagna_roll: f32,
    /// Lasagna floats this far above the ground
    pub lasagna_height: f32,
    /// Popcorn floats between these heights above the ground
    pub popcorn_min_height: f32,
    pub popcorn_max_height: f32,
    pub stars: StarThresholds,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            ground_height: 100.0,
            player_x: 80.0,
            start_y: 200.0,
            physics: PhysicsConfig::default(),
            initial_speed: 6.0,
            max_speed: 14.0,
            acceleration: 0.002,
            obstacle_size: 50.0,
            cadence: SpawnCadence::default(),
            first_spawn_frame: 60,
            despawn_x: -150.0,
            player_hitbox_ratio: 0.7,
            obstacle_hitbox_ratio: 0.85,
            popcorn_points: 10,
            lasagna_points: 100,
            popcorn_roll: 0.60,
            lasagna_roll: 0.96,
            lasagna_height: 200.0,
            popcorn_min_height: 70.0,
            popcorn_max_height: 230.0,
            stars: StarThresholds { three: 500, two: 200 },
        }
    }
}

impl RunnerConfig {
    pub fn ground_y(&self) -> f32 {
        self.height - self.ground_height
    }

    pub fn validate(&self) -> Result<()> {
        error::positive("runner.width", self.width)?;
        error::positive("runner.height", self.height)?;
        error::non_negative("runner.ground_height", self.ground_height)?;
        error::finite("runner.player_x", self.player_x)?;
        error::finite("runner.start_y", self.start_y)?;
        self.physics.validate()?;
        if self.ground_y() < 2.0 * self.physics.radius {
            return Err(ConfigError::InvertedRange {
                field: "runner.playfield",
                min: 2.0 * self.physics.radius,
                max: self.ground_y(),
            });
        }
        error::non_negative("runner.initial_speed", self.initial_speed)?;
        error::ordered("runner.speed", self.initial_speed, self.max_speed + f32::EPSILON)?;
        error::non_negative("runner.acceleration", self.acceleration)?;
        error::positive("runner.obstacle_size", self.obstacle_size)?;
        self.cadence.validate()?;
        error::finite("runner.despawn_x", self.despawn_x)?;
        error::positive("runner.player_hitbox_ratio", self.player_hitbox_ratio)?;
        error::positive("runner.obstacle_hitbox_ratio", self.obstacle_hitbox_ratio)?;
        error::ordered("runner.rolls", self.popcorn_roll, self.lasagna_roll)?;
        error::finite("runner.lasagna_height", self.lasagna_height)?;
        error::ordered(
            "runner.popcorn_height",
            self.popcorn_min_height,
            self.popcorn_max_height,
        )?;
        Ok(())
    }
}

/// Goose "Picnic Panic": catch falling food with the cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    pub width: f32,
    pub height: f32,
    pub intro_ms: f64,
    pub duration_secs: u32,
    pub wind_interval_ms: f64,
    /// Wind is re-rolled uniformly in `[-max_wind, max_wind)`
    pub max_wind: f32,
    pub spawn_interval_ms: f64,
    pub bonus_spawn_interval_ms: f64,
    /// Items spawn at least this far from the side edges
    pub spawn_margin: f32,
    pub spawn_y: f32,
    pub base_fall_speed: f32,
    pub fall_speed_jitter: f32,
    pub golden_fall_speed: f32,
    /// Catch radius before the chubby scale is applied
    pub catch_radius: f32,
    pub max_extra_scale: f32,
    /// Catches needed for +1.0 scale
    pub catches_per_scale: f32,
    pub combo_step: u32,
    pub combo_max: u32,
    pub bonus_ms: f64,
    pub food_points: u32,
    pub cake_points: u32,
    pub golden_points: u32,
    pub pepper_points: u32,
    pub veg_penalty: u32,
    pub stars: StarThresholds,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            intro_ms: 2000.0,
            duration_secs: 60,
            wind_interval_ms: 10_000.0,
            max_wind: 2.0,
            spawn_interval_ms: 600.0,
            bonus_spawn_interval_ms: 200.0,
            spawn_margin: 30.0,
            spawn_y: -50.0,
            base_fall_speed: 3.0,
            fall_speed_jitter: 2.0,
            golden_fall_speed: 8.0,
            catch_radius: 50.0,
            max_extra_scale: 1.5,
            catches_per_scale: 40.0,
            combo_step: 10,
            combo_max: 100,
            bonus_ms: 5000.0,
            food_points: 10,
            cake_points: 30,
            golden_points: 100,
            pepper_points: 50,
            veg_penalty: 20,
            stars: StarThresholds { three: 1500, two: 800 },
        }
    }
}

impl CatchConfig {
    pub fn validate(&self) -> Result<()> {
        error::positive("catch.width", self.width)?;
        error::positive("catch.height", self.height)?;
        error::non_negative("catch.intro_ms", self.intro_ms as f32)?;
        if self.duration_secs == 0 {
            return Err(ConfigError::Empty {
                field: "catch.duration_secs",
            });
        }
        error::positive("catch.wind_interval_ms", self.wind_interval_ms as f32)?;
        error::non_negative("catch.max_wind", self.max_wind)?;
        error::positive("catch.spawn_interval_ms", self.spawn_interval_ms as f32)?;
        error::positive(
            "catch.bonus_spawn_interval_ms",
            self.bonus_spawn_interval_ms as f32,
        )?;
        error::ordered("catch.spawn_margin", self.spawn_margin, self.width - self.spawn_margin)?;
        error::finite("catch.spawn_y", self.spawn_y)?;
        error::positive("catch.base_fall_speed", self.base_fall_speed)?;
        error::non_negative("catch.fall_speed_jitter", self.fall_speed_jitter)?;
        error::positive("catch.golden_fall_speed", self.golden_fall_speed)?;
        error::positive("catch.catch_radius", self.catch_radius)?;
        error::non_negative("catch.max_extra_scale", self.max_extra_scale)?;
        error::positive("catch.catches_per_scale", self.catches_per_scale)?;
        if self.combo_max == 0 {
            return Err(ConfigError::Empty {
                field: "catch.combo_max",
            });
        }
        error::positive("catch.bonus_ms", self.bonus_ms as f32)?;
        Ok(())
    }
}

/// Wall, path, start and end cells as stored in [`MazeConfig::map`]
pub const MAZE_WALL: u8 = 1;
pub const MAZE_PATH: u8 = 0;
pub const MAZE_START: u8 = 2;
pub const MAZE_END: u8 = 3;

/// Goose maze: steer the cursor from start to end without touching walls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_size: f32,
    /// Half-size of the cursor's square hitbox
    pub hitbox: f32,
    pub start_score: u64,
    pub decay_per_second: u32,
    pub crash_penalty: u32,
    /// Row-major grid: 1 wall, 0 path, 2 start, 3 end
    pub map: Vec<Vec<u8>>,
    pub stars: StarThresholds,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: 80.0,
            hitbox: 10.0,
            start_score: 1000,
            decay_per_second: 10,
            crash_penalty: 100,
            map: vec![
                vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
                vec![1, 2, 0, 0, 1, 0, 0, 0, 3, 1],
                vec![1, 1, 1, 0, 1, 0, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
                vec![1, 0, 1, 1, 1, 1, 1, 1, 0, 1],
                vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            ],
            // Strictly above 700 and 400
            stars: StarThresholds { three: 701, two: 401 },
        }
    }
}

impl MazeConfig {
    /// Geometry is checked here; map shape is checked when the layout is built.
    pub fn validate(&self) -> Result<()> {
        error::finite("maze.origin_x", self.origin_x)?;
        error::finite("maze.origin_y", self.origin_y)?;
        error::positive("maze.cell_size", self.cell_size)?;
        error::non_negative("maze.hitbox", self.hitbox)?;
        Ok(())
    }
}

/// Goose "Duck Kingdom": sneak to the king, steal the crown, run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KingdomConfig {
    pub width: f32,
    pub height: f32,
    /// Cursor position before the first pointer event
    pub start_x: f32,
    pub start_y: f32,
    pub intro_ms: f64,
    pub start_score: u64,
    pub caught_penalty: u32,
    /// Crossing above this y starts the boss approach
    pub boss_line_y: f32,
    /// Throne sits at `(width / 2, throne_y)`
    pub throne_y: f32,
    pub throne_click_radius: f32,
    pub throne_hint_radius: f32,
    pub king_toggle_ms: f64,
    /// Movement allowed per frame while the king is awake
    pub move_tolerance: f32,
    /// Escape succeeds below `height - exit_margin`
    pub exit_margin: f32,
    pub player_hit_radius: f32,
    pub duck_hit_radius: f32,
    pub honk_radius: f32,
    pub freeze_ms: f64,
    pub honk_cooldown_ms: f64,
    pub noble_count: u32,
    /// Horizontal gap between noble orbit centres
    pub noble_spacing: f32,
    pub noble_orbit_radius: f32,
    /// Radians per frame
    pub noble_angular_speed: f32,
    pub guard_count: u32,
    /// Pixels per frame
    pub guard_speed: f32,
    pub march_wrap_margin: f32,
    pub chase_multiplier: f32,
    /// Chasing ducks stop this close to the cursor
    pub chase_stop_distance: f32,
    pub win_stars: u8,
}

impl Default for KingdomConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            start_x: 640.0,
            start_y: 720.0,
            intro_ms: 2000.0,
            start_score: 2000,
            caught_penalty: 500,
            boss_line_y: 300.0,
            throne_y: 100.0,
            throne_click_radius: 120.0,
            throne_hint_radius: 100.0,
            king_toggle_ms: 3000.0,
            move_tolerance: 2.0,
            exit_margin: 50.0,
            player_hit_radius: 30.0,
            duck_hit_radius: 30.0,
            honk_radius: 400.0,
            freeze_ms: 1500.0,
            honk_cooldown_ms: 5000.0,
            noble_count: 4,
            noble_spacing: 150.0,
            noble_orbit_radius: 80.0,
            noble_angular_speed: 0.02,
            guard_count: 6,
            guard_speed: 3.0,
            march_wrap_margin: 50.0,
            chase_multiplier: 1.5,
            chase_stop_distance: 5.0,
            win_stars: 3,
        }
    }
}

impl KingdomConfig {
    pub fn validate(&self) -> Result<()> {
        error::positive("kingdom.width", self.width)?;
        error::positive("kingdom.height", self.height)?;
        error::finite("kingdom.start_x", self.start_x)?;
        error::finite("kingdom.start_y", self.start_y)?;
        error::non_negative("kingdom.intro_ms", self.intro_ms as f32)?;
        error::finite("kingdom.boss_line_y", self.boss_line_y)?;
        error::finite("kingdom.throne_y", self.throne_y)?;
        error::positive("kingdom.throne_click_radius", self.throne_click_radius)?;
        error::non_negative("kingdom.throne_hint_radius", self.throne_hint_radius)?;
        error::positive("kingdom.king_toggle_ms", self.king_toggle_ms as f32)?;
        error::non_negative("kingdom.move_tolerance", self.move_tolerance)?;
        error::non_negative("kingdom.exit_margin", self.exit_margin)?;
        error::non_negative("kingdom.player_hit_radius", self.player_hit_radius)?;
        error::non_negative("kingdom.duck_hit_radius", self.duck_hit_radius)?;
        error::non_negative("kingdom.honk_radius", self.honk_radius)?;
        error::non_negative("kingdom.freeze_ms", self.freeze_ms as f32)?;
        error::non_negative("kingdom.honk_cooldown_ms", self.honk_cooldown_ms as f32)?;
        error::finite("kingdom.noble_spacing", self.noble_spacing)?;
        error::positive("kingdom.noble_orbit_radius", self.noble_orbit_radius)?;
        error::finite("kingdom.noble_angular_speed", self.noble_angular_speed)?;
        error::finite("kingdom.guard_speed", self.guard_speed)?;
        error::non_negative("kingdom.march_wrap_margin", self.march_wrap_margin)?;
        error::non_negative("kingdom.chase_multiplier", self.chase_multiplier)?;
        error::non_negative("kingdom.chase_stop_distance", self.chase_stop_distance)?;
        Ok(())
    }

    pub fn throne(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.throne_y)
    }
}

/// Which minigame to run, with its tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameConfig {
    Runner(RunnerConfig),
    Catch(CatchConfig),
    Maze(MazeConfig),
    Kingdom(KingdomConfig),
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            GameConfig::Runner(cfg) => cfg.validate(),
            GameConfig::Catch(cfg) => cfg.validate(),
            GameConfig::Maze(cfg) => cfg.validate(),
            GameConfig::Kingdom(cfg) => cfg.validate(),
        }
    }
}

/// Everything a session needs, fixed at start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// RNG seed; same seed and inputs replay the same session
    pub seed: u64,
    #[serde(default)]
    pub capabilities: Capabilities,
    pub game: GameConfig,
}

impl SessionConfig {
    pub fn new(seed: u64, game: GameConfig) -> Self {
        Self {
            seed,
            capabilities: Capabilities::default(),
            game,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.game.validate()
    }

    /// Parse and validate host JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(RunnerConfig::default().validate().is_ok());
        assert!(CatchConfig::default().validate().is_ok());
        assert!(MazeConfig::default().validate().is_ok());
        assert!(KingdomConfig::default().validate().is_ok());
    }

    #[test]
    fn test_star_thresholds() {
        let stars = StarThresholds { three: 1500, two: 800 };
        assert_eq!(stars.rating(1500), 3);
        assert_eq!(stars.rating(1499), 2);
        assert_eq!(stars.rating(800), 2);
        assert_eq!(stars.rating(0), 1);

        let maze = MazeConfig::default().stars;
        assert_eq!(maze.rating(700), 2);
        assert_eq!(maze.rating(701), 3);
        assert_eq!(maze.rating(400), 1);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut cfg = RunnerConfig::default();
        cfg.physics.radius = -5.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                field: "physics.radius",
                ..
            })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let cfg = CatchConfig {
            catch_radius: f32::NAN,
            ..CatchConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn test_inverted_popcorn_band_rejected() {
        let cfg = RunnerConfig {
            popcorn_min_height: 300.0,
            popcorn_max_height: 100.0,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "seed": 42,
            "capabilities": { "super_jump": true },
            "game": { "game": "runner", "initial_speed": 8.0 }
        }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.seed, 42);
        assert!(config.capabilities.super_jump);
        match config.game {
            GameConfig::Runner(runner) => {
                assert_eq!(runner.initial_speed, 8.0);
                assert_eq!(runner.max_speed, RunnerConfig::default().max_speed);
            }
            other => panic!("expected runner config, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_json_is_a_config_error() {
        assert!(matches!(
            SessionConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        let json = r#"{ "seed": 1, "game": { "game": "maze", "cell_size": 0.0 } }"#;
        assert!(matches!(
            SessionConfig::from_json(json),
            Err(ConfigError::NonPositive { field: "maze.cell_size", .. })
        ));
    }
}
