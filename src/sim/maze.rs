//! Goose hedge maze: steer the cursor from the start cell to the end cell
//! without brushing a wall.

use glam::Vec2;
use serde::Serialize;

use super::collision::Rect;
use super::game::{GameResult, InputEvent, Minigame, Step};
use super::timers::{TimerId, TimerQueue};
use crate::config::{MAZE_END, MAZE_PATH, MAZE_START, MAZE_WALL, MazeConfig};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Wall,
    Path,
    Start,
    End,
}

impl Cell {
    fn from_code(code: u8) -> Option<Cell> {
        match code {
            MAZE_WALL => Some(Cell::Wall),
            MAZE_PATH => Some(Cell::Path),
            MAZE_START => Some(Cell::Start),
            MAZE_END => Some(Cell::End),
            _ => None,
        }
    }
}

/// Validated grid in playfield coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MazeLayout {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f32,
    pub origin: Vec2,
    /// Row-major
    cells: Vec<Cell>,
    start: (usize, usize),
    end: (usize, usize),
}

impl MazeLayout {
    /// Build the layout from the configured map. The map must be rectangular,
    /// use only known cell codes and contain exactly one start and one end.
    pub fn from_config(cfg: &MazeConfig) -> Result<Self> {
        cfg.validate()?;

        let rows = cfg.map.len();
        let cols = cfg.map.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::InvalidMaze("map is empty".into()));
        }

        let mut cells = Vec::with_capacity(rows * cols);
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        for (row, line) in cfg.map.iter().enumerate() {
            if line.len() != cols {
                return Err(ConfigError::InvalidMaze(format!(
                    "row {row} has {} cells, expected {cols}",
                    line.len()
                )));
            }
            for (col, &code) in line.iter().enumerate() {
                let cell = Cell::from_code(code).ok_or_else(|| {
                    ConfigError::InvalidMaze(format!("unknown cell code {code} at ({col}, {row})"))
                })?;
                match cell {
                    Cell::Start => starts.push((col, row)),
                    Cell::End => ends.push((col, row)),
                    Cell::Wall | Cell::Path => {}
                }
                cells.push(cell);
            }
        }

        let start = match starts.as_slice() {
            [only] => *only,
            _ => {
                return Err(ConfigError::InvalidMaze(format!(
                    "expected one start cell, found {}",
                    starts.len()
                )));
            }
        };
        let end = match ends.as_slice() {
            [only] => *only,
            _ => {
                return Err(ConfigError::InvalidMaze(format!(
                    "expected one end cell, found {}",
                    ends.len()
                )));
            }
        };

        Ok(Self {
            cols,
            rows,
            cell_size: cfg.cell_size,
            origin: Vec2::new(cfg.origin_x, cfg.origin_y),
            cells,
            start,
            end,
        })
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col < self.cols && row < self.rows {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn cell_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            self.origin.x + col as f32 * self.cell_size,
            self.origin.y + row as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    pub fn start_rect(&self) -> Rect {
        self.cell_rect(self.start.0, self.start.1)
    }

    pub fn end_rect(&self) -> Rect {
        self.cell_rect(self.end.0, self.end.1)
    }

    /// Wall rectangles in row-major order
    pub fn walls(&self) -> impl Iterator<Item = Rect> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Wall)
            .map(|(i, _)| self.cell_rect(i % self.cols, i / self.cols))
    }

    /// A `hitbox`-padded cursor at `point` touches a wall
    pub fn hits_wall(&self, point: Vec2, hitbox: f32) -> bool {
        self.walls().any(|wall| wall.overlaps_padded(point, hitbox))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MazePhase {
    Waiting,
    Playing,
    Crashed,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MazeTimer {
    Decay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MazeEvent {
    Started,
    Crashed { attempts: u32 },
    Reset,
    Won,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MazeSnapshot {
    pub phase: MazePhase,
    pub score: u64,
    pub attempts: u32,
    pub pointer: Vec2,
    pub events: Vec<MazeEvent>,
}

#[derive(Debug, Clone)]
pub struct MazeGame {
    cfg: MazeConfig,
    layout: MazeLayout,
    timers: TimerQueue<MazeTimer>,
    decay: Option<TimerId>,
    phase: MazePhase,
    pointer: Vec2,
    score: u64,
    attempts: u32,
    quit: bool,
    events: Vec<MazeEvent>,
    result: Option<GameResult>,
}

impl MazeGame {
    pub fn new(cfg: MazeConfig) -> Result<Self> {
        let layout = MazeLayout::from_config(&cfg)?;
        Ok(Self {
            // Off the grid until the first pointer event
            pointer: layout.origin - Vec2::splat(cfg.cell_size),
            score: cfg.start_score,
            layout,
            timers: TimerQueue::new(),
            decay: None,
            phase: MazePhase::Waiting,
            attempts: 0,
            quit: false,
            events: Vec::new(),
            result: None,
            cfg,
        })
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    pub fn phase(&self) -> MazePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn stop_decay(&mut self) {
        if let Some(id) = self.decay.take() {
            self.timers.cancel(id);
        }
    }

    fn crash(&mut self) {
        self.stop_decay();
        self.phase = MazePhase::Crashed;
        self.attempts += 1;
        self.score = self.score.saturating_sub(self.cfg.crash_penalty as u64);
        log::debug!("Maze crash #{} at {:?}", self.attempts, self.pointer);
        self.events.push(MazeEvent::Crashed {
            attempts: self.attempts,
        });
    }

    fn finish(&mut self) -> GameResult {
        if let Some(result) = self.result {
            return result;
        }
        self.timers.cancel_all();
        self.decay = None;
        let won = self.phase == MazePhase::Won;
        log::info!(
            "Maze finished (won: {won}) with score {} after {} crashes",
            self.score,
            self.attempts
        );
        let result = GameResult {
            score: self.score,
            special_flag: won && self.attempts == 0,
            stars: if self.quit {
                0
            } else {
                self.cfg.stars.rating(self.score)
            },
        };
        self.result = Some(result);
        result
    }

    fn snapshot(&mut self) -> MazeSnapshot {
        MazeSnapshot {
            phase: self.phase,
            score: self.score,
            attempts: self.attempts,
            pointer: self.pointer,
            events: std::mem::take(&mut self.events),
        }
    }
}

impl Minigame for MazeGame {
    type Snapshot = MazeSnapshot;

    fn apply_input(&mut self, input: &InputEvent, _now_ms: f64) {
        if self.result.is_some() {
            return;
        }
        match *input {
            InputEvent::Pointer { x, y } | InputEvent::Click { x, y } => {
                self.pointer = Vec2::new(x, y);
            }
            InputEvent::Retry if self.phase == MazePhase::Crashed => {
                self.phase = MazePhase::Waiting;
                self.events.push(MazeEvent::Reset);
            }
            InputEvent::Quit => self.quit = true,
            _ => {}
        }
    }

    fn step(&mut self, now_ms: f64) -> Step<MazeSnapshot> {
        if let Some(result) = self.result {
            return Step::Finished(result);
        }
        if self.quit {
            return Step::Finished(self.finish());
        }

        while let Some(MazeTimer::Decay) = self.timers.pop_due(now_ms) {
            self.score = self.score.saturating_sub(self.cfg.decay_per_second as u64);
        }

        match self.phase {
            MazePhase::Waiting => {
                if self.layout.start_rect().contains(self.pointer) {
                    self.phase = MazePhase::Playing;
                    self.decay = Some(self.timers.every(now_ms, 1000.0, MazeTimer::Decay));
                    self.events.push(MazeEvent::Started);
                }
            }
            MazePhase::Playing => {
                if self.layout.hits_wall(self.pointer, self.cfg.hitbox) {
                    self.crash();
                } else if self.layout.end_rect().contains_strict(self.pointer) {
                    self.stop_decay();
                    self.phase = MazePhase::Won;
                    self.events.push(MazeEvent::Won);
                    return Step::Finished(self.finish());
                }
            }
            MazePhase::Crashed | MazePhase::Won => {}
        }

        Step::Running(self.snapshot())
    }

    fn final_frame(&mut self, _now_ms: f64) -> Self::Snapshot {
        self.snapshot()
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_all();
        self.decay = None;
    }
}
