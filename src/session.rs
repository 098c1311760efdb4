//! Host-facing session driver
//!
//! A session owns exactly one minigame. Every mutation goes through here in
//! arrival order: inputs are queued by [`Session::on_input`] and applied at
//! the start of the next tick, then the game drains its due timers and
//! simulates one frame. After the game finishes the result is reported once
//! and every later tick returns [`TickOutcome::Closed`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, SessionConfig};
use crate::consts::{FRAME_MS, MAX_ELAPSED_MS, MAX_SUBSTEPS};
use crate::error::Result;
use crate::sim::catch::{CatchGame, CatchSnapshot};
use crate::sim::game::{GameResult, Minigame, Step};
use crate::sim::kingdom::{KingdomGame, KingdomSnapshot};
use crate::sim::maze::{MazeGame, MazeSnapshot};
use crate::sim::runner::{RunnerGame, RunnerSnapshot};

pub use crate::sim::game::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Runner,
    Catch,
    Maze,
    Kingdom,
}

/// Per-frame view of the running game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum Snapshot {
    Runner(RunnerSnapshot),
    Catch(CatchSnapshot),
    Maze(MazeSnapshot),
    Kingdom(KingdomSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    pub game: GameKind,
    pub score: u64,
    pub special_flag: bool,
    pub stars: u8,
}

impl SessionResult {
    fn new(game: GameKind, result: GameResult) -> Self {
        Self {
            game,
            score: result.score,
            special_flag: result.special_flag,
            stars: result.stars,
        }
    }

    pub fn abandoned(&self) -> bool {
        self.stars == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum TickOutcome {
    Frame(Snapshot),
    /// Reported exactly once. `last_frame` carries the events raised by the
    /// frame that ended the game.
    Finished {
        result: SessionResult,
        last_frame: Snapshot,
    },
    Closed,
}

#[derive(Debug, Clone)]
enum ActiveGame {
    Runner(RunnerGame),
    Catch(CatchGame),
    Maze(MazeGame),
    Kingdom(KingdomGame),
}

impl ActiveGame {
    fn kind(&self) -> GameKind {
        match self {
            ActiveGame::Runner(_) => GameKind::Runner,
            ActiveGame::Catch(_) => GameKind::Catch,
            ActiveGame::Maze(_) => GameKind::Maze,
            ActiveGame::Kingdom(_) => GameKind::Kingdom,
        }
    }

    fn apply_input(&mut self, input: &InputEvent, now_ms: f64) {
        match self {
            ActiveGame::Runner(game) => game.apply_input(input, now_ms),
            ActiveGame::Catch(game) => game.apply_input(input, now_ms),
            ActiveGame::Maze(game) => game.apply_input(input, now_ms),
            ActiveGame::Kingdom(game) => game.apply_input(input, now_ms),
        }
    }

    fn step(&mut self, now_ms: f64) -> Step<Snapshot> {
        fn wrap<S>(step: Step<S>, f: fn(S) -> Snapshot) -> Step<Snapshot> {
            match step {
                Step::Running(snapshot) => Step::Running(f(snapshot)),
                Step::Finished(result) => Step::Finished(result),
            }
        }

        match self {
            ActiveGame::Runner(game) => wrap(game.step(now_ms), Snapshot::Runner),
            ActiveGame::Catch(game) => wrap(game.step(now_ms), Snapshot::Catch),
            ActiveGame::Maze(game) => wrap(game.step(now_ms), Snapshot::Maze),
            ActiveGame::Kingdom(game) => wrap(game.step(now_ms), Snapshot::Kingdom),
        }
    }

    fn final_frame(&mut self, now_ms: f64) -> Snapshot {
        match self {
            ActiveGame::Runner(game) => Snapshot::Runner(game.final_frame(now_ms)),
            ActiveGame::Catch(game) => Snapshot::Catch(game.final_frame(now_ms)),
            ActiveGame::Maze(game) => Snapshot::Maze(game.final_frame(now_ms)),
            ActiveGame::Kingdom(game) => Snapshot::Kingdom(game.final_frame(now_ms)),
        }
    }

    fn cancel_timers(&mut self) {
        match self {
            ActiveGame::Runner(game) => game.cancel_timers(),
            ActiveGame::Catch(game) => game.cancel_timers(),
            ActiveGame::Maze(game) => game.cancel_timers(),
            ActiveGame::Kingdom(game) => game.cancel_timers(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    seed: u64,
    game: ActiveGame,
    inputs: VecDeque<InputEvent>,
    now_ms: f64,
    frame: u64,
    accumulator: f64,
    closed: bool,
}

impl Session {
    /// Validate the configuration and set up the requested game.
    /// The session clock starts at zero.
    pub fn start(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let SessionConfig {
            seed,
            capabilities,
            game,
        } = config;

        let game = match game {
            GameConfig::Runner(cfg) => ActiveGame::Runner(RunnerGame::new(cfg, capabilities, seed)),
            GameConfig::Catch(cfg) => ActiveGame::Catch(CatchGame::new(cfg, seed)),
            GameConfig::Maze(cfg) => ActiveGame::Maze(MazeGame::new(cfg)?),
            GameConfig::Kingdom(cfg) => ActiveGame::Kingdom(KingdomGame::new(cfg)),
        };
        log::info!("Started {:?} session (seed {seed})", game.kind());

        Ok(Self {
            seed,
            game,
            inputs: VecDeque::new(),
            now_ms: 0.0,
            frame: 0,
            accumulator: 0.0,
            closed: false,
        })
    }

    pub fn kind(&self) -> GameKind {
        self.game.kind()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated milliseconds since start
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Inputs waiting for the next tick
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Queue an input for the next tick. Inputs with non-finite coordinates
    /// and inputs to a closed session are dropped.
    pub fn on_input(&mut self, input: InputEvent) {
        if self.closed {
            log::debug!("Ignoring {input:?}: session closed");
            return;
        }
        if !input.is_finite() {
            log::warn!("Ignoring non-finite input {input:?}");
            return;
        }
        self.inputs.push_back(input);
    }

    /// Advance exactly one frame
    pub fn tick(&mut self) -> TickOutcome {
        if self.closed {
            return TickOutcome::Closed;
        }

        self.now_ms += FRAME_MS;
        self.frame += 1;

        while let Some(input) = self.inputs.pop_front() {
            self.game.apply_input(&input, self.now_ms);
        }

        match self.game.step(self.now_ms) {
            Step::Running(snapshot) => TickOutcome::Frame(snapshot),
            Step::Finished(result) => {
                let result = SessionResult::new(self.kind(), result);
                log::info!(
                    "{:?} session finished at {:.0} ms: score {}, {} stars",
                    result.game,
                    self.now_ms,
                    result.score,
                    result.stars
                );
                let last_frame = self.game.final_frame(self.now_ms);
                self.close();
                TickOutcome::Finished { result, last_frame }
            }
        }
    }

    /// Run as many fixed frames as `elapsed_ms` of wall time covers, capped at
    /// [`MAX_SUBSTEPS`]. Leftover time carries over to the next call.
    /// Outcomes come back in order; a finished session stops the batch.
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<TickOutcome> {
        if self.closed {
            return vec![TickOutcome::Closed];
        }

        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, MAX_ELAPSED_MS)
        } else {
            log::warn!("Ignoring non-finite frame time {elapsed_ms}");
            0.0
        };
        self.accumulator += elapsed;

        let mut outcomes = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= FRAME_MS && substeps < MAX_SUBSTEPS {
            let outcome = self.tick();
            self.accumulator -= FRAME_MS;
            substeps += 1;

            let done = !matches!(outcome, TickOutcome::Frame(_));
            outcomes.push(outcome);
            if done {
                break;
            }
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(FRAME_MS);
        }
        outcomes
    }

    /// Tear the session down without a result. Later ticks return `Closed`.
    pub fn end_session(&mut self) {
        if !self.closed {
            log::info!("{:?} session ended by host", self.kind());
            self.close();
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.accumulator = 0.0;
        self.inputs.clear();
        self.game.cancel_timers();
    }
}
