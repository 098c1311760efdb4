//! LiLi's side-scrolling runner
//!
//! Per-frame order: ramp speed, integrate the actor, maybe spawn, then move
//! and resolve every obstacle in spawn order. The first hazard ends the run.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::{HitCircle, Resolution};
use super::game::{GameResult, InputEvent, Minigame, Step};
use super::physics::{Body, JumpOutcome};
use super::spawn::{WeightedTable, checked_position, should_spawn};
use crate::config::{Capabilities, RunnerConfig};

/// The runner's actor is a vertical physics body at a fixed x
pub type Actor = Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Rock,
    Popcorn,
    Lasagna,
}

impl ObstacleKind {
    pub fn resolution(self, cfg: &RunnerConfig) -> Resolution {
        match self {
            ObstacleKind::Rock => Resolution::Hazard,
            ObstacleKind::Popcorn => Resolution::Collect {
                points: cfg.popcorn_points,
            },
            ObstacleKind::Lasagna => Resolution::Special {
                points: cfg.lasagna_points,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    pub fn hitbox(&self, ratio: f32) -> HitCircle {
        HitCircle::from_box(self.pos, self.size, ratio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerPhase {
    Running,
    Ended,
}

/// Things that happened this frame, for the host's sound and effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunnerEvent {
    Jumped { air: bool },
    Slammed,
    Spawned { id: u32, kind: ObstacleKind },
    Collected { id: u32, kind: ObstacleKind, points: u32 },
    Crashed { id: u32 },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerSnapshot {
    pub frame: u64,
    pub score: u64,
    pub speed: f32,
    pub player_x: f32,
    pub actor: Actor,
    pub got_lasagna: bool,
    pub phase: RunnerPhase,
    pub obstacles: Vec<Obstacle>,
    pub events: Vec<RunnerEvent>,
}

#[derive(Debug, Clone)]
pub struct RunnerGame {
    cfg: RunnerConfig,
    caps: Capabilities,
    rng: Pcg32,
    table: WeightedTable<ObstacleKind>,
    actor: Actor,
    obstacles: Vec<Obstacle>,
    score: u64,
    frame: u64,
    next_spawn: u64,
    speed: f32,
    got_lasagna: bool,
    /// Ended by the STOP button rather than a crash
    stopped: bool,
    phase: RunnerPhase,
    next_id: u32,
    events: Vec<RunnerEvent>,
    result: Option<GameResult>,
}

impl RunnerGame {
    pub fn new(cfg: RunnerConfig, caps: Capabilities, seed: u64) -> Self {
        let table = WeightedTable::new(ObstacleKind::Rock)
            .band(cfg.popcorn_roll, ObstacleKind::Popcorn)
            .band(cfg.lasagna_roll, ObstacleKind::Lasagna);
        Self {
            actor: Actor::new(cfg.start_y),
            next_spawn: cfg.first_spawn_frame,
            speed: cfg.initial_speed,
            caps,
            rng: Pcg32::seed_from_u64(seed),
            table,
            obstacles: Vec::new(),
            score: 0,
            frame: 0,
            got_lasagna: false,
            stopped: false,
            phase: RunnerPhase::Running,
            next_id: 1,
            events: Vec::new(),
            result: None,
            cfg,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    fn spawn(&mut self) {
        let kind = self.table.draw(&mut self.rng);
        let ground = self.cfg.ground_y();
        let y = match kind {
            ObstacleKind::Rock => ground - self.cfg.obstacle_size,
            ObstacleKind::Lasagna => ground - self.cfg.lasagna_height,
            ObstacleKind::Popcorn => {
                ground
                    - self
                        .rng
                        .random_range(self.cfg.popcorn_min_height..self.cfg.popcorn_max_height)
            }
        };

        let Some(pos) = checked_position(Vec2::new(self.cfg.width, y)) else {
            return;
        };

        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Spawned {kind:?} #{id} at frame {}", self.frame);
        self.obstacles.push(Obstacle {
            id,
            kind,
            pos,
            size: Vec2::splat(self.cfg.obstacle_size),
        });
        self.events.push(RunnerEvent::Spawned { id, kind });
    }

    /// Move and resolve obstacles in spawn order.
    /// Returns the id of the hazard hit, if any.
    fn resolve_obstacles(&mut self) -> Option<u32> {
        let player = HitCircle::forgiving(
            Vec2::new(self.cfg.player_x, self.actor.y),
            self.cfg.physics.radius,
            self.cfg.player_hitbox_ratio,
        );

        let mut i = 0;
        while i < self.obstacles.len() {
            self.obstacles[i].pos.x -= self.speed;
            let obstacle = self.obstacles[i];

            if !player.overlaps(&obstacle.hitbox(self.cfg.obstacle_hitbox_ratio)) {
                i += 1;
                continue;
            }

            let resolution = obstacle.kind.resolution(&self.cfg);
            match resolution {
                Resolution::Hazard => return Some(obstacle.id),
                Resolution::Special { .. } => {
                    self.got_lasagna = true;
                    self.table.set_enabled(ObstacleKind::Lasagna, false);
                }
                Resolution::Collect { .. } | Resolution::Penalty { .. } => {}
            }

            let before = self.score;
            self.score = resolution.apply_to_score(self.score);
            self.events.push(RunnerEvent::Collected {
                id: obstacle.id,
                kind: obstacle.kind,
                points: (self.score - before) as u32,
            });
            self.obstacles.remove(i);
        }
        None
    }

    fn finish(&mut self) -> GameResult {
        if let Some(result) = self.result {
            return result;
        }
        log::info!(
            "Runner ended at frame {} with score {} (lasagna: {})",
            self.frame,
            self.score,
            self.got_lasagna
        );
        let result = GameResult {
            score: self.score,
            special_flag: self.got_lasagna && !self.stopped,
            stars: self.cfg.stars.rating(self.score),
        };
        self.result = Some(result);
        result
    }

    fn snapshot(&mut self) -> RunnerSnapshot {
        RunnerSnapshot {
            frame: self.frame,
            score: self.score,
            speed: self.speed,
            player_x: self.cfg.player_x,
            actor: self.actor,
            got_lasagna: self.got_lasagna,
            phase: self.phase,
            obstacles: self.obstacles.clone(),
            events: std::mem::take(&mut self.events),
        }
    }
}

impl Minigame for RunnerGame {
    type Snapshot = RunnerSnapshot;

    fn apply_input(&mut self, input: &InputEvent, _now_ms: f64) {
        if self.phase == RunnerPhase::Ended {
            return;
        }
        let ground = self.cfg.ground_y();
        match input {
            InputEvent::Press => {
                self.actor.gliding = true;
                match self.actor.jump(ground, &self.cfg.physics, self.caps) {
                    JumpOutcome::Ground => self.events.push(RunnerEvent::Jumped { air: false }),
                    JumpOutcome::Air => self.events.push(RunnerEvent::Jumped { air: true }),
                    JumpOutcome::Ignored => {}
                }
            }
            InputEvent::Release => self.actor.gliding = false,
            InputEvent::Slam => {
                self.actor.slam(&self.cfg.physics);
                self.events.push(RunnerEvent::Slammed);
            }
            InputEvent::Quit => {
                self.phase = RunnerPhase::Ended;
                self.stopped = true;
                self.events.push(RunnerEvent::Quit);
            }
            _ => {}
        }
    }

    fn step(&mut self, _now_ms: f64) -> Step<RunnerSnapshot> {
        if self.phase == RunnerPhase::Ended {
            return Step::Finished(self.finish());
        }

        self.frame += 1;
        self.speed = (self.speed + self.cfg.acceleration).min(self.cfg.max_speed);
        self.actor = self
            .actor
            .integrate(self.cfg.ground_y(), &self.cfg.physics);

        if should_spawn(self.frame, self.next_spawn) {
            self.spawn();
            self.next_spawn = self
                .cfg
                .cadence
                .schedule(self.frame, self.speed, &mut self.rng);
        }

        let crashed = self.resolve_obstacles();

        let despawn_x = self.cfg.despawn_x;
        self.obstacles.retain(|o| o.pos.x >= despawn_x);

        if let Some(id) = crashed {
            self.events.push(RunnerEvent::Crashed { id });
            self.phase = RunnerPhase::Ended;
            return Step::Finished(self.finish());
        }

        Step::Running(self.snapshot())
    }

    fn final_frame(&mut self, _now_ms: f64) -> Self::Snapshot {
        self.snapshot()
    }

    fn cancel_timers(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(seed: u64) -> RunnerGame {
        RunnerGame::new(RunnerConfig::default(), Capabilities::default(), seed)
    }

    fn grounded(game: &mut RunnerGame) {
        game.actor.y = game.cfg.ground_y() - game.cfg.physics.radius;
        game.actor.velocity = 0.0;
    }

    fn place(game: &mut RunnerGame, kind: ObstacleKind, x: f32, y: f32) -> u32 {
        let id = game.next_id;
        game.next_id += 1;
        game.obstacles.push(Obstacle {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::splat(game.cfg.obstacle_size),
        });
        id
    }

    #[test]
    fn test_rock_ends_run_once() {
        let mut game = game(1);
        grounded(&mut game);
        let rock_y = game.cfg.ground_y() - game.cfg.obstacle_size;
        place(&mut game, ObstacleKind::Rock, 65.0, rock_y);

        let result = match game.step(0.0) {
            Step::Finished(result) => result,
            Step::Running(_) => panic!("rock under the player must end the run"),
        };
        assert_eq!(result.score, 0);
        assert!(!result.special_flag);
        assert_eq!(result.stars, 1);
        assert_eq!(game.phase(), RunnerPhase::Ended);

        // Later frames do not simulate
        let frame = game.frame;
        assert_eq!(game.step(16.0), Step::Finished(result));
        assert_eq!(game.frame, frame);
    }

    #[test]
    fn test_popcorn_is_collected_once() {
        let mut game = game(2);
        grounded(&mut game);
        let y = game.actor.y - 25.0;
        let id = place(&mut game, ObstacleKind::Popcorn, 60.0, y);

        let snapshot = match game.step(0.0) {
            Step::Running(s) => s,
            Step::Finished(_) => panic!("popcorn is not a hazard"),
        };
        assert_eq!(snapshot.score, 10);
        assert!(snapshot.obstacles.iter().all(|o| o.id != id));
        assert!(snapshot.events.contains(&RunnerEvent::Collected {
            id,
            kind: ObstacleKind::Popcorn,
            points: 10
        }));
    }

    #[test]
    fn test_lasagna_sets_flag_and_stops_spawning() {
        let mut game = game(3);
        grounded(&mut game);
        let y = game.actor.y - 25.0;
        place(&mut game, ObstacleKind::Lasagna, 60.0, y);
        game.step(0.0);
        assert!(game.got_lasagna);
        assert_eq!(game.score(), 100);
        assert_eq!(game.table.pick(0.99), ObstacleKind::Popcorn);
    }

    #[test]
    fn test_stop_keeps_score_but_not_lasagna_flag() {
        let mut game = game(3);
        grounded(&mut game);
        let y = game.actor.y - 25.0;
        place(&mut game, ObstacleKind::Lasagna, 60.0, y);
        game.step(0.0);
        assert!(game.got_lasagna);

        game.apply_input(&InputEvent::Quit, 16.0);
        let result = match game.step(16.0) {
            Step::Finished(result) => result,
            Step::Running(_) => panic!("quit must end the run"),
        };
        assert_eq!(result.score, 100);
        assert!(!result.special_flag);
        assert_eq!(result.stars, 1);
        assert!(game.final_frame(16.0).events.contains(&RunnerEvent::Quit));
    }

    #[test]
    fn test_collectible_before_hazard_in_spawn_order() {
        let mut game = game(4);
        grounded(&mut game);
        let y = game.actor.y - 25.0;
        place(&mut game, ObstacleKind::Popcorn, 60.0, y);
        let rock_y = game.cfg.ground_y() - game.cfg.obstacle_size;
        place(&mut game, ObstacleKind::Rock, 65.0, rock_y);

        match game.step(0.0) {
            Step::Finished(result) => assert_eq!(result.score, 10),
            Step::Running(_) => panic!("rock should still end the run"),
        }
    }

    #[test]
    fn test_obstacles_despawn_past_threshold() {
        let mut game = game(5);
        place(&mut game, ObstacleKind::Rock, -148.0, 0.0);
        game.step(0.0);
        assert!(game.obstacles().is_empty());
    }

    #[test]
    fn test_speed_ramps_to_cap() {
        let mut game = game(6);
        game.speed = game.cfg.max_speed - 0.001;
        game.step(0.0);
        assert_eq!(game.speed, game.cfg.max_speed);
        game.step(0.0);
        assert_eq!(game.speed, game.cfg.max_speed);
    }

    #[test]
    fn test_first_spawn_at_configured_frame() {
        let mut game = game(7);
        // Keep the actor out of the way of anything spawned
        for _ in 0..59 {
            game.step(0.0);
        }
        assert!(game.obstacles().is_empty());
        game.step(0.0);
        assert_eq!(game.obstacles().len(), 1);
        assert!(game.next_spawn >= game.frame + game.cfg.cadence.min_interval as u64);
    }

    #[test]
    fn test_quit_ends_with_current_score() {
        let mut game = game(8);
        game.score = 42;
        game.apply_input(&InputEvent::Quit, 0.0);
        match game.step(0.0) {
            Step::Finished(result) => assert_eq!(result.score, 42),
            Step::Running(_) => panic!("quit should end the run"),
        }
    }

    #[test]
    fn test_press_jumps_and_glides() {
        let mut game = game(9);
        grounded(&mut game);
        game.apply_input(&InputEvent::Press, 0.0);
        assert!(game.actor.gliding);
        assert_eq!(game.actor.velocity, game.cfg.physics.jump_force);
        game.apply_input(&InputEvent::Release, 0.0);
        assert!(!game.actor.gliding);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = game(99);
        let mut b = game(99);
        for frame in 0..600 {
            if frame % 45 == 0 {
                a.apply_input(&InputEvent::Press, 0.0);
                b.apply_input(&InputEvent::Press, 0.0);
            }
            assert_eq!(a.step(0.0), b.step(0.0));
        }
    }
}
