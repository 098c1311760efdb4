//! Shared contract between the session driver and the individual minigames

use serde::{Deserialize, Serialize};

/// Host input forwarded to the active game. Coordinates are playfield pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer/cursor moved
    Pointer { x: f32, y: f32 },
    /// Primary button down (runner: jump and start gliding)
    Press,
    /// Primary button up (runner: stop gliding)
    Release,
    /// Runner fast drop
    Slam,
    /// Duck-kingdom honk
    Ability,
    /// Click at screen coordinates
    Click { x: f32, y: f32 },
    /// Retry after a recoverable failure
    Retry,
    /// Player gave up; ends the run with the score so far
    Quit,
}

impl InputEvent {
    /// Coordinates carried by the event, if any, are all finite
    pub fn is_finite(&self) -> bool {
        match *self {
            InputEvent::Pointer { x, y } | InputEvent::Click { x, y } => {
                x.is_finite() && y.is_finite()
            }
            _ => true,
        }
    }
}

/// Final report of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u64,
    /// Runner: ate the lasagna and crashed (not stopped). Catch: caught a golden crumb. Maze: no crash.
    /// Kingdom: escaped with the crown.
    pub special_flag: bool,
    /// 1 to 3; 0 when the player walked away from a cursor game
    pub stars: u8,
}

impl GameResult {
    pub fn abandoned(&self) -> bool {
        self.stars == 0
    }
}

/// Outcome of one simulated frame
#[derive(Debug, Clone, PartialEq)]
pub enum Step<S> {
    Running(S),
    Finished(GameResult),
}

/// A per-frame simulation. The session owns one and is the only caller.
pub trait Minigame {
    type Snapshot;

    /// Apply one queued input. `now_ms` is the session clock of the frame
    /// about to run.
    fn apply_input(&mut self, input: &InputEvent, now_ms: f64);

    /// Fire due timers, then simulate one frame.
    /// Once finished, keeps returning the same result without simulating.
    fn step(&mut self, now_ms: f64) -> Step<Self::Snapshot>;

    /// Snapshot of the frame that finished the game, carrying the events it
    /// raised (the crash, the win, the last catches)
    fn final_frame(&mut self, now_ms: f64) -> Self::Snapshot;

    /// Drop every pending timer (session teardown)
    fn cancel_timers(&mut self);
}
