//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call per animation frame, no wall-clock reads
//! - Seeded RNG only
//! - Entities processed in spawn order
//! - No rendering or platform dependencies

pub mod catch;
pub mod collision;
pub mod game;
pub mod kingdom;
pub mod maze;
pub mod physics;
pub mod runner;
pub mod spawn;
pub mod timers;

pub use catch::{CatchEvent, CatchGame, CatchPhase, CatchSnapshot, FallingItem, ItemKind};
pub use collision::{HitCircle, Rect, Resolution, circles_overlap, first_overlap};
pub use game::{GameResult, InputEvent, Minigame, Step};
pub use kingdom::{
    CaughtBy, Duck, DuckKind, DuckMotion, KingState, KingdomEvent, KingdomGame, KingdomNotice,
    KingdomPhase, KingdomSnapshot, formation,
};
pub use maze::{Cell, MazeEvent, MazeGame, MazeLayout, MazePhase, MazeSnapshot};
pub use physics::{Body, JumpOutcome, PhysicsConfig};
pub use runner::{Actor, Obstacle, ObstacleKind, RunnerEvent, RunnerGame, RunnerPhase, RunnerSnapshot};
pub use spawn::{SpawnCadence, WeightedTable, should_spawn};
pub use timers::{TimerId, TimerQueue};
