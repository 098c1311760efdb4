//! Goose "Picnic Panic": catch falling food with the cursor
//!
//! Time-based rather than frame-based: the countdown, wind shifts, intro and
//! bonus expiry run on the session timer queue, and spawning compares the
//! session clock against the last spawn.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::{HitCircle, Resolution};
use super::game::{GameResult, InputEvent, Minigame, Step};
use super::spawn::{WeightedTable, checked_position};
use super::timers::TimerQueue;
use crate::config::CatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Food,
    Cake,
    Veg,
    Pepper,
    GoldenCrumb,
}

impl ItemKind {
    pub fn resolution(self, cfg: &CatchConfig) -> Resolution {
        match self {
            ItemKind::Food => Resolution::Collect {
                points: cfg.food_points,
            },
            ItemKind::Cake => Resolution::Collect {
                points: cfg.cake_points,
            },
            ItemKind::Pepper => Resolution::Collect {
                points: cfg.pepper_points,
            },
            ItemKind::GoldenCrumb => Resolution::Special {
                points: cfg.golden_points,
            },
            ItemKind::Veg => Resolution::Penalty {
                points: cfg.veg_penalty,
            },
        }
    }

    /// Good catches feed the combo meter; pepper and veg don't
    fn builds_combo(self) -> bool {
        matches!(self, ItemKind::Food | ItemKind::Cake | ItemKind::GoldenCrumb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallingItem {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchPhase {
    Intro,
    Playing,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatchTimer {
    Start,
    Second,
    WindShift,
    BonusEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatchEvent {
    Started,
    Caught { id: u32, kind: ItemKind, points: u32 },
    BadCatch { id: u32, penalty: u32 },
    Spicy { id: u32 },
    BonusStarted,
    BonusEnded,
    WindChanged { wind: f32 },
    TimeUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchSnapshot {
    pub phase: CatchPhase,
    pub time_left: u32,
    pub score: u64,
    pub combo: u32,
    pub bonus: bool,
    pub wind: f32,
    pub catcher: Vec2,
    /// Chubby growth factor applied to the catch radius
    pub catcher_scale: f32,
    pub catcher_radius: f32,
    pub caught: u32,
    pub items: Vec<FallingItem>,
    pub events: Vec<CatchEvent>,
}

#[derive(Debug, Clone)]
pub struct CatchGame {
    cfg: CatchConfig,
    rng: Pcg32,
    table: WeightedTable<ItemKind>,
    timers: TimerQueue<CatchTimer>,
    phase: CatchPhase,
    catcher: Vec2,
    items: Vec<FallingItem>,
    score: u64,
    combo: u32,
    caught: u32,
    bonus: bool,
    wind: f32,
    time_left: u32,
    last_spawn_ms: Option<f64>,
    got_golden: bool,
    abandoned: bool,
    next_id: u32,
    events: Vec<CatchEvent>,
    result: Option<GameResult>,
}

impl CatchGame {
    pub fn new(cfg: CatchConfig, seed: u64) -> Self {
        let table = WeightedTable::new(ItemKind::Food)
            .band(0.95, ItemKind::GoldenCrumb)
            .band(0.90, ItemKind::Pepper)
            .band(0.70, ItemKind::Veg)
            .band(0.60, ItemKind::Cake);
        let mut timers = TimerQueue::new();
        timers.after(0.0, cfg.intro_ms, CatchTimer::Start);
        Self {
            catcher: Vec2::new(cfg.width / 2.0, cfg.height - cfg.catch_radius),
            time_left: cfg.duration_secs,
            rng: Pcg32::seed_from_u64(seed),
            table,
            timers,
            phase: CatchPhase::Intro,
            items: Vec::new(),
            score: 0,
            combo: 0,
            caught: 0,
            bonus: false,
            wind: 0.0,
            last_spawn_ms: None,
            got_golden: false,
            abandoned: false,
            next_id: 1,
            events: Vec::new(),
            result: None,
            cfg,
        }
    }

    pub fn phase(&self) -> CatchPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn in_bonus(&self) -> bool {
        self.bonus
    }

    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    /// `1 + min(max_extra, caught / catches_per_scale)`
    pub fn catcher_scale(&self) -> f32 {
        1.0 + (self.caught as f32 / self.cfg.catches_per_scale).min(self.cfg.max_extra_scale)
    }

    pub fn catcher_radius(&self) -> f32 {
        self.cfg.catch_radius * self.catcher_scale()
    }

    fn on_timer(&mut self, timer: CatchTimer, now_ms: f64) {
        if self.phase == CatchPhase::Ended {
            return;
        }
        match timer {
            CatchTimer::Start => {
                log::info!("Catch game started");
                self.phase = CatchPhase::Playing;
                self.timers.every(now_ms, 1000.0, CatchTimer::Second);
                self.timers
                    .every(now_ms, self.cfg.wind_interval_ms, CatchTimer::WindShift);
                self.events.push(CatchEvent::Started);
            }
            CatchTimer::Second => {
                self.time_left = self.time_left.saturating_sub(1);
                if self.time_left == 0 {
                    self.phase = CatchPhase::Ended;
                    self.events.push(CatchEvent::TimeUp);
                }
            }
            CatchTimer::WindShift => {
                let max = self.cfg.max_wind;
                self.wind = if max > 0.0 {
                    self.rng.random_range(-max..max)
                } else {
                    0.0
                };
                self.events.push(CatchEvent::WindChanged { wind: self.wind });
            }
            CatchTimer::BonusEnd => {
                log::debug!("Bonus over");
                self.bonus = false;
                self.combo = 0;
                self.events.push(CatchEvent::BonusEnded);
            }
        }
    }

    fn spawn_interval(&self) -> f64 {
        if self.bonus {
            self.cfg.bonus_spawn_interval_ms
        } else {
            self.cfg.spawn_interval_ms
        }
    }

    fn spawn(&mut self) {
        let kind = if self.bonus {
            ItemKind::Cake
        } else {
            self.table.draw(&mut self.rng)
        };
        let x = self
            .rng
            .random_range(self.cfg.spawn_margin..self.cfg.width - self.cfg.spawn_margin);
        let jitter: f32 = self.rng.random();
        let vy = match kind {
            ItemKind::GoldenCrumb => self.cfg.golden_fall_speed,
            _ => self.cfg.base_fall_speed + self.cfg.fall_speed_jitter * jitter,
        };

        let Some(pos) = checked_position(Vec2::new(x, self.cfg.spawn_y)) else {
            return;
        };
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(FallingItem {
            id,
            kind,
            pos,
            vel: Vec2::new(0.0, vy),
        });
    }

    /// Move every item, wrap and despawn, then resolve catches in spawn order
    fn update_items(&mut self) {
        let catcher = HitCircle::new(self.catcher, self.catcher_radius());
        let width = self.cfg.width;
        let height = self.cfg.height;
        let wind = self.wind;

        let mut kept = Vec::with_capacity(self.items.len());
        for mut item in std::mem::take(&mut self.items) {
            item.pos.y += item.vel.y;
            item.pos.x += item.vel.x + wind;
            if item.pos.x < 0.0 {
                item.pos.x = width;
            } else if item.pos.x > width {
                item.pos.x = 0.0;
            }
            if item.pos.y > height {
                continue;
            }

            if catcher.overlaps(&HitCircle::new(item.pos, 0.0)) {
                self.catch_item(&item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
    }

    fn catch_item(&mut self, item: &FallingItem) {
        let resolution = item.kind.resolution(&self.cfg);
        self.score = resolution.apply_to_score(self.score);

        match item.kind {
            ItemKind::Veg => {
                self.combo = 0;
                self.events.push(CatchEvent::BadCatch {
                    id: item.id,
                    penalty: self.cfg.veg_penalty,
                });
                return;
            }
            ItemKind::Pepper => self.events.push(CatchEvent::Spicy { id: item.id }),
            ItemKind::GoldenCrumb => self.got_golden = true,
            ItemKind::Food | ItemKind::Cake => {}
        }

        self.caught += 1;
        if item.kind.builds_combo() && !self.bonus {
            self.combo = (self.combo + self.cfg.combo_step).min(self.cfg.combo_max);
        }
        let points = match resolution {
            Resolution::Collect { points } | Resolution::Special { points } => points,
            Resolution::Hazard | Resolution::Penalty { .. } => 0,
        };
        self.events.push(CatchEvent::Caught {
            id: item.id,
            kind: item.kind,
            points,
        });
    }

    fn finish(&mut self) -> GameResult {
        if let Some(result) = self.result {
            return result;
        }
        self.timers.cancel_all();
        log::info!(
            "Catch game over: score {}, caught {}, golden {}",
            self.score,
            self.caught,
            self.got_golden
        );
        let result = GameResult {
            score: self.score,
            special_flag: self.got_golden,
            stars: if self.abandoned {
                0
            } else {
                self.cfg.stars.rating(self.score)
            },
        };
        self.result = Some(result);
        result
    }

    fn snapshot(&mut self) -> CatchSnapshot {
        CatchSnapshot {
            phase: self.phase,
            time_left: self.time_left,
            score: self.score,
            combo: self.combo,
            bonus: self.bonus,
            wind: self.wind,
            catcher: self.catcher,
            catcher_scale: self.catcher_scale(),
            catcher_radius: self.catcher_radius(),
            caught: self.caught,
            items: self.items.clone(),
            events: std::mem::take(&mut self.events),
        }
    }
}

impl Minigame for CatchGame {
    type Snapshot = CatchSnapshot;

    fn apply_input(&mut self, input: &InputEvent, _now_ms: f64) {
        if self.phase == CatchPhase::Ended {
            return;
        }
        match *input {
            InputEvent::Pointer { x, y } | InputEvent::Click { x, y } => {
                self.catcher = Vec2::new(x, y);
            }
            InputEvent::Quit => {
                self.phase = CatchPhase::Ended;
                self.abandoned = true;
            }
            _ => {}
        }
    }

    fn step(&mut self, now_ms: f64) -> Step<CatchSnapshot> {
        if let Some(result) = self.result {
            return Step::Finished(result);
        }

        while let Some(timer) = self.timers.pop_due(now_ms) {
            self.on_timer(timer, now_ms);
        }

        match self.phase {
            CatchPhase::Ended => return Step::Finished(self.finish()),
            CatchPhase::Intro => return Step::Running(self.snapshot()),
            CatchPhase::Playing => {}
        }

        let interval = self.spawn_interval();
        if self.last_spawn_ms.is_none_or(|last| now_ms - last > interval) {
            self.last_spawn_ms = Some(now_ms);
            self.spawn();
        }

        self.update_items();

        if !self.bonus && self.combo >= self.cfg.combo_max {
            log::debug!("Bonus mode at score {}", self.score);
            self.bonus = true;
            self.timers
                .after(now_ms, self.cfg.bonus_ms, CatchTimer::BonusEnd);
            self.events.push(CatchEvent::BonusStarted);
        }

        Step::Running(self.snapshot())
    }

    fn final_frame(&mut self, _now_ms: f64) -> Self::Snapshot {
        self.snapshot()
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_all();
    }
}
