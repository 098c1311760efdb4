//! Goose adventure progress: per-level best score, stars and unlocks
//!
//! Pure bookkeeping. The host persists the JSON form however it likes; this
//! module never touches storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{GameKind, SessionResult};

/// Goose levels in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Catch,
    Maze,
    Kingdom,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Catch, Level::Maze, Level::Kingdom];

    pub fn next(self) -> Option<Level> {
        match self {
            Level::Catch => Some(Level::Maze),
            Level::Maze => Some(Level::Kingdom),
            Level::Kingdom => None,
        }
    }

    /// The runner belongs to the pet, not the goose hub
    pub fn for_game(game: GameKind) -> Option<Level> {
        match game {
            GameKind::Catch => Some(Level::Catch),
            GameKind::Maze => Some(Level::Maze),
            GameKind::Kingdom => Some(Level::Kingdom),
            GameKind::Runner => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelRecord {
    pub unlocked: bool,
    pub high_score: u64,
    pub stars: u8,
}

/// What a recorded result changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecordOutcome {
    pub new_best: bool,
    /// Level opened by this result, if any
    pub unlocked: Option<Level>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// Bread crumbs: every finished level pays its score
    pub currency: u64,
    pub levels: BTreeMap<Level, LevelRecord>,
}

impl Default for Progress {
    fn default() -> Self {
        let mut levels = BTreeMap::new();
        for level in Level::ALL {
            levels.insert(
                level,
                LevelRecord {
                    unlocked: level == Level::Catch,
                    ..LevelRecord::default()
                },
            );
        }
        Self {
            currency: 0,
            levels,
        }
    }
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_for(&self, level: Level) -> LevelRecord {
        self.levels.get(&level).copied().unwrap_or_default()
    }

    pub fn is_unlocked(&self, level: Level) -> bool {
        self.record_for(level).unlocked
    }

    /// Record a finished level. Best score and stars only ever go up, and
    /// finishing a level opens the next one.
    pub fn record(&mut self, level: Level, score: u64, stars: u8) -> RecordOutcome {
        self.currency = self.currency.saturating_add(score);

        let entry = self.levels.entry(level).or_default();
        entry.unlocked = true;
        let new_best = score > entry.high_score;
        entry.high_score = entry.high_score.max(score);
        entry.stars = entry.stars.max(stars.min(3));

        let unlocked = level.next().filter(|next| {
            let next = self.levels.entry(*next).or_default();
            let opened = !next.unlocked;
            next.unlocked = true;
            opened
        });
        if let Some(next) = unlocked {
            log::info!("Unlocked {next:?}");
        }

        RecordOutcome { new_best, unlocked }
    }

    /// Record a session result. Runner results and abandoned games are
    /// ignored.
    pub fn record_result(&mut self, result: &SessionResult) -> Option<RecordOutcome> {
        if result.abandoned() {
            return None;
        }
        let level = Level::for_game(result.game)?;
        Some(self.record(level, result.score, result.stars))
    }

    pub fn total_stars(&self) -> u32 {
        self.levels.values().map(|r| r.stars as u32).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse saved progress. Levels missing from the save get their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut progress: Progress = serde_json::from_str(json)?;
        for (level, record) in Progress::default().levels {
            progress.levels.entry(level).or_insert(record);
        }
        Ok(progress)
    }
}
