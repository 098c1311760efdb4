//! Goose "Duck Kingdom": sneak past the royal ducks, steal the crown while
//! the king sleeps, then run for the exit with the whole court in pursuit.
//!
//! Phases: `Intro -> Stealth -> BossApproach -> Escape -> Won`, with any
//! active phase able to drop into `Caught`, which `Retry` undoes.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::Serialize;

use super::collision::{HitCircle, first_overlap};
use super::game::{GameResult, InputEvent, Minigame, Step};
use super::timers::{TimerId, TimerQueue};
use crate::config::KingdomConfig;
use crate::{normalize_angle, orbit_point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuckKind {
    Noble,
    Guard,
}

/// Patrol pattern outside the escape phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum DuckMotion {
    /// Circle around `center`; `angular_speed` in radians per frame
    Waltz {
        center: Vec2,
        angle: f32,
        angular_speed: f32,
        radius: f32,
    },
    /// Walk right at `speed` px/frame, wrapping at the screen edge
    March { speed: f32 },
}

impl DuckMotion {
    /// Pixels per frame along the patrol path
    pub fn linear_speed(&self) -> f32 {
        match *self {
            DuckMotion::Waltz {
                angular_speed,
                radius,
                ..
            } => angular_speed.abs() * radius,
            DuckMotion::March { speed } => speed.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Duck {
    pub id: u32,
    pub kind: DuckKind,
    pub pos: Vec2,
    pub motion: DuckMotion,
    pub frozen_until_ms: f64,
}

impl Duck {
    pub fn is_frozen(&self, now_ms: f64) -> bool {
        now_ms < self.frozen_until_ms
    }

    fn patrol(&mut self, width: f32, wrap_margin: f32) {
        match &mut self.motion {
            DuckMotion::Waltz {
                center,
                angle,
                angular_speed,
                radius,
            } => {
                *angle = normalize_angle(*angle + *angular_speed);
                self.pos = orbit_point(*center, *radius, *angle);
            }
            DuckMotion::March { speed } => {
                self.pos.x += *speed;
                if self.pos.x > width + wrap_margin {
                    self.pos.x = -wrap_margin;
                }
            }
        }
    }

    fn chase(&mut self, target: Vec2, multiplier: f32, stop_distance: f32) {
        let to_target = target - self.pos;
        let dist = to_target.length();
        if dist > stop_distance {
            self.pos += to_target / dist * self.motion.linear_speed() * multiplier;
        }
    }
}

/// Four waltzing nobles in the middle, six marching guards below them.
/// Ids run nobles first, then guards.
pub fn formation(cfg: &KingdomConfig) -> Vec<Duck> {
    let nobles = (0..cfg.noble_count).map(|i| {
        let center = Vec2::new(
            cfg.width * 0.3 + i as f32 * cfg.noble_spacing,
            cfg.height * 0.5,
        );
        let angle = normalize_angle(i as f32 * FRAC_PI_2);
        Duck {
            id: i,
            kind: DuckKind::Noble,
            pos: orbit_point(center, cfg.noble_orbit_radius, angle),
            motion: DuckMotion::Waltz {
                center,
                angle,
                angular_speed: cfg.noble_angular_speed,
                radius: cfg.noble_orbit_radius,
            },
            frozen_until_ms: 0.0,
        }
    });

    let spacing = cfg.width / cfg.guard_count.max(1) as f32;
    let guards = (0..cfg.guard_count).map(|i| Duck {
        id: cfg.noble_count + i,
        kind: DuckKind::Guard,
        pos: Vec2::new(spacing * i as f32, cfg.height * 0.75),
        motion: DuckMotion::March {
            speed: cfg.guard_speed,
        },
        frozen_until_ms: 0.0,
    });

    nobles.chain(guards).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KingdomPhase {
    Intro,
    Stealth,
    BossApproach,
    Escape,
    Caught,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KingState {
    Asleep,
    Awake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum CaughtBy {
    Duck { id: u32 },
    King,
}

/// Status line for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KingdomNotice {
    SneakPast,
    ApproachWhileAsleep,
    StealNow,
    Run,
    CaughtByDuck,
    SeenByKing,
    Escaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KingdomTimer {
    EndIntro,
    ToggleKing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum KingdomEvent {
    PhaseChanged { phase: KingdomPhase },
    King { state: KingState },
    Honk { frozen: u32 },
    Caught { by: CaughtBy },
    CrownStolen,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KingdomSnapshot {
    pub phase: KingdomPhase,
    pub score: u64,
    pub king: KingState,
    pub pointer: Vec2,
    pub cooldown_remaining_ms: f64,
    pub near_throne: bool,
    pub notice: KingdomNotice,
    pub ducks: Vec<Duck>,
    pub events: Vec<KingdomEvent>,
}

#[derive(Debug, Clone)]
pub struct KingdomGame {
    cfg: KingdomConfig,
    timers: TimerQueue<KingdomTimer>,
    king_timer: Option<TimerId>,
    phase: KingdomPhase,
    king: KingState,
    ducks: Vec<Duck>,
    pointer: Vec2,
    prev_pointer: Vec2,
    score: u64,
    cooldown_until_ms: f64,
    caught_by: Option<CaughtBy>,
    quit: bool,
    events: Vec<KingdomEvent>,
    result: Option<GameResult>,
}

impl KingdomGame {
    pub fn new(cfg: KingdomConfig) -> Self {
        let mut timers = TimerQueue::new();
        timers.after(0.0, cfg.intro_ms, KingdomTimer::EndIntro);
        let pointer = Vec2::new(cfg.start_x, cfg.start_y);
        Self {
            ducks: formation(&cfg),
            score: cfg.start_score,
            timers,
            king_timer: None,
            phase: KingdomPhase::Intro,
            king: KingState::Asleep,
            pointer,
            prev_pointer: pointer,
            cooldown_until_ms: 0.0,
            caught_by: None,
            quit: false,
            events: Vec::new(),
            result: None,
            cfg,
        }
    }

    pub fn phase(&self) -> KingdomPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn king(&self) -> KingState {
        self.king
    }

    pub fn ducks(&self) -> &[Duck] {
        &self.ducks
    }

    pub fn near_throne(&self) -> bool {
        self.phase == KingdomPhase::BossApproach
            && self.pointer.distance(self.cfg.throne()) < self.cfg.throne_hint_radius
    }

    fn set_phase(&mut self, phase: KingdomPhase) {
        if self.phase == phase {
            return;
        }
        log::info!("Duck kingdom: {:?} -> {:?}", self.phase, phase);
        if self.phase == KingdomPhase::BossApproach {
            if let Some(id) = self.king_timer.take() {
                self.timers.cancel(id);
            }
        }
        self.phase = phase;
        self.events.push(KingdomEvent::PhaseChanged { phase });
    }

    fn enter_boss_approach(&mut self, now_ms: f64) {
        self.set_phase(KingdomPhase::BossApproach);
        self.king = KingState::Asleep;
        self.king_timer = Some(
            self.timers
                .every(now_ms, self.cfg.king_toggle_ms, KingdomTimer::ToggleKing),
        );
    }

    fn caught(&mut self, by: CaughtBy) {
        self.set_phase(KingdomPhase::Caught);
        self.caught_by = Some(by);
        self.score = self.score.saturating_sub(self.cfg.caught_penalty as u64);
        self.events.push(KingdomEvent::Caught { by });
    }

    fn retry(&mut self) {
        self.set_phase(KingdomPhase::Stealth);
        self.score = self.cfg.start_score;
        self.ducks = formation(&self.cfg);
        self.king = KingState::Asleep;
        self.caught_by = None;
        self.prev_pointer = self.pointer;
    }

    /// Freeze every duck near the pointer; returns false while cooling down
    /// or when honking isn't allowed in this phase.
    fn honk(&mut self, now_ms: f64) -> bool {
        let allowed = matches!(
            self.phase,
            KingdomPhase::Stealth | KingdomPhase::BossApproach | KingdomPhase::Escape
        );
        if !allowed || now_ms < self.cooldown_until_ms {
            return false;
        }

        self.cooldown_until_ms = now_ms + self.cfg.honk_cooldown_ms;
        let mut frozen = 0;
        for duck in &mut self.ducks {
            if duck.pos.distance(self.pointer) < self.cfg.honk_radius {
                duck.frozen_until_ms = now_ms + self.cfg.freeze_ms;
                frozen += 1;
            }
        }
        log::debug!("Honk froze {frozen} ducks");
        self.events.push(KingdomEvent::Honk { frozen });
        true
    }

    fn on_timer(&mut self, timer: KingdomTimer) {
        match timer {
            KingdomTimer::EndIntro => {
                if self.phase == KingdomPhase::Intro {
                    self.set_phase(KingdomPhase::Stealth);
                }
            }
            KingdomTimer::ToggleKing => {
                if self.phase != KingdomPhase::BossApproach {
                    return;
                }
                self.king = match self.king {
                    KingState::Asleep => KingState::Awake,
                    KingState::Awake => KingState::Asleep,
                };
                self.events.push(KingdomEvent::King { state: self.king });
            }
        }
    }

    fn move_ducks(&mut self, now_ms: f64) {
        let chase = (self.phase == KingdomPhase::Escape).then_some(self.pointer);
        for duck in self.ducks.iter_mut().filter(|d| !d.is_frozen(now_ms)) {
            match chase {
                Some(target) => duck.chase(
                    target,
                    self.cfg.chase_multiplier,
                    self.cfg.chase_stop_distance,
                ),
                None => duck.patrol(self.cfg.width, self.cfg.march_wrap_margin),
            }
        }
    }

    fn notice(&self) -> KingdomNotice {
        match self.phase {
            KingdomPhase::Intro | KingdomPhase::Stealth => KingdomNotice::SneakPast,
            KingdomPhase::BossApproach if self.near_throne() => KingdomNotice::StealNow,
            KingdomPhase::BossApproach => KingdomNotice::ApproachWhileAsleep,
            KingdomPhase::Escape => KingdomNotice::Run,
            KingdomPhase::Caught => match self.caught_by {
                Some(CaughtBy::King) => KingdomNotice::SeenByKing,
                _ => KingdomNotice::CaughtByDuck,
            },
            KingdomPhase::Won => KingdomNotice::Escaped,
        }
    }

    fn finish(&mut self) -> GameResult {
        if let Some(result) = self.result {
            return result;
        }
        self.timers.cancel_all();
        self.king_timer = None;
        let won = self.phase == KingdomPhase::Won;
        log::info!("Duck kingdom over (won: {won}) with score {}", self.score);
        let result = GameResult {
            score: self.score,
            special_flag: won,
            stars: if won { self.cfg.win_stars } else { 0 },
        };
        self.result = Some(result);
        result
    }

    fn snapshot(&mut self, now_ms: f64) -> KingdomSnapshot {
        KingdomSnapshot {
            phase: self.phase,
            score: self.score,
            king: self.king,
            pointer: self.pointer,
            cooldown_remaining_ms: (self.cooldown_until_ms - now_ms).max(0.0),
            near_throne: self.near_throne(),
            notice: self.notice(),
            ducks: self.ducks.clone(),
            events: std::mem::take(&mut self.events),
        }
    }
}

impl Minigame for KingdomGame {
    type Snapshot = KingdomSnapshot;

    fn apply_input(&mut self, input: &InputEvent, now_ms: f64) {
        if self.result.is_some() {
            return;
        }
        match *input {
            InputEvent::Pointer { x, y } => self.pointer = Vec2::new(x, y),
            InputEvent::Click { x, y } => {
                self.pointer = Vec2::new(x, y);
                if self.phase == KingdomPhase::BossApproach
                    && self.pointer.distance(self.cfg.throne()) < self.cfg.throne_click_radius
                {
                    self.set_phase(KingdomPhase::Escape);
                    self.events.push(KingdomEvent::CrownStolen);
                }
            }
            InputEvent::Ability => {
                self.honk(now_ms);
            }
            InputEvent::Retry if self.phase == KingdomPhase::Caught => self.retry(),
            InputEvent::Quit => self.quit = true,
            _ => {}
        }
    }

    fn step(&mut self, now_ms: f64) -> Step<KingdomSnapshot> {
        if let Some(result) = self.result {
            return Step::Finished(result);
        }
        if self.quit {
            return Step::Finished(self.finish());
        }

        while let Some(timer) = self.timers.pop_due(now_ms) {
            self.on_timer(timer);
        }

        if matches!(self.phase, KingdomPhase::Intro | KingdomPhase::Caught) {
            self.prev_pointer = self.pointer;
            return Step::Running(self.snapshot(now_ms));
        }

        self.move_ducks(now_ms);

        let player = HitCircle::new(self.pointer, self.cfg.player_hit_radius);
        let duck_radius = self.cfg.duck_hit_radius;
        let hit = first_overlap(
            &player,
            self.ducks.iter().map(|d| HitCircle::new(d.pos, duck_radius)),
        );
        if let Some(idx) = hit {
            let id = self.ducks[idx].id;
            self.caught(CaughtBy::Duck { id });
        } else if self.phase == KingdomPhase::BossApproach
            && self.king == KingState::Awake
            && self.pointer.distance(self.prev_pointer) > self.cfg.move_tolerance
        {
            self.caught(CaughtBy::King);
        } else if self.phase == KingdomPhase::Escape
            && self.pointer.y > self.cfg.height - self.cfg.exit_margin
        {
            self.set_phase(KingdomPhase::Won);
            return Step::Finished(self.finish());
        } else if self.phase == KingdomPhase::Stealth && self.pointer.y < self.cfg.boss_line_y {
            self.enter_boss_approach(now_ms);
        }

        self.prev_pointer = self.pointer;
        Step::Running(self.snapshot(now_ms))
    }

    fn final_frame(&mut self, now_ms: f64) -> Self::Snapshot {
        self.snapshot(now_ms)
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_all();
        self.king_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;

    struct Harness {
        game: KingdomGame,
        now: f64,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                game: KingdomGame::new(KingdomConfig::default()),
                now: 0.0,
            }
        }

        fn frame(&mut self) -> Step<KingdomSnapshot> {
            self.now += FRAME_MS;
            self.game.step(self.now)
        }

        fn run_for(&mut self, ms: f64) {
            let until = self.now + ms;
            while self.now < until {
                self.frame();
            }
        }

        fn input(&mut self, input: InputEvent) {
            // Inputs land on the frame about to run
            self.game.apply_input(&input, self.now + FRAME_MS);
        }

        fn point(&mut self, x: f32, y: f32) {
            self.input(InputEvent::Pointer { x, y });
        }

        fn to_stealth(&mut self) {
            self.run_for(2000.0 + FRAME_MS);
            assert_eq!(self.game.phase(), KingdomPhase::Stealth);
        }
    }

    #[test]
    fn test_formation() {
        let cfg = KingdomConfig::default();
        let ducks = formation(&cfg);
        assert_eq!(ducks.len(), 10);
        let nobles: Vec<_> = ducks.iter().filter(|d| d.kind == DuckKind::Noble).collect();
        assert_eq!(nobles.len(), 4);
        assert!((nobles[0].pos - Vec2::new(cfg.width * 0.3 + 80.0, cfg.height * 0.5)).length() < 1e-3);
        let guards: Vec<_> = ducks.iter().filter(|d| d.kind == DuckKind::Guard).collect();
        assert!((guards[3].pos - Vec2::new(cfg.width / 2.0, cfg.height * 0.75)).length() < 1e-3);
        assert!((nobles[0].motion.linear_speed() - 1.6).abs() < 1e-5);
    }

    #[test]
    fn test_formation_ids_are_unique() {
        let cfg = KingdomConfig {
            noble_count: 12,
            ..KingdomConfig::default()
        };
        let ids: Vec<u32> = formation(&cfg).iter().map(|d| d.id).collect();
        assert_eq!(ids, (0..18).collect::<Vec<u32>>());

        let default_ids: Vec<u32> = formation(&KingdomConfig::default()).iter().map(|d| d.id).collect();
        assert_eq!(default_ids, (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn test_intro_then_stealth() {
        let mut h = Harness::new();
        h.run_for(1900.0);
        assert_eq!(h.game.phase(), KingdomPhase::Intro);
        // Ducks hold still during the intro
        assert_eq!(h.game.ducks(), formation(&h.game.cfg).as_slice());
        h.to_stealth();
    }

    #[test]
    fn test_honk_blocked_during_intro() {
        let mut h = Harness::new();
        h.input(InputEvent::Ability);
        assert_eq!(h.game.cooldown_until_ms, 0.0);
        assert!(h.game.ducks().iter().all(|d| d.frozen_until_ms == 0.0));
    }

    #[test]
    fn test_honk_freezes_nearby_ducks_with_cooldown() {
        let mut h = Harness::new();
        h.to_stealth();

        h.input(InputEvent::Ability);
        let honk_at = h.now + FRAME_MS;
        let frozen: Vec<u32> = h
            .game
            .ducks()
            .iter()
            .filter(|d| d.frozen_until_ms > 0.0)
            .map(|d| d.id)
            .collect();
        assert!(!frozen.is_empty());
        assert!(frozen.len() < h.game.ducks().len());
        for duck in h.game.ducks() {
            let near = duck.pos.distance(h.game.pointer) < 400.0;
            assert_eq!(frozen.contains(&duck.id), near);
        }

        let before = h.game.ducks().to_vec();
        let snapshot = match h.frame() {
            Step::Running(s) => s,
            Step::Finished(_) => panic!("game should be running"),
        };
        assert!((snapshot.cooldown_remaining_ms - 5000.0).abs() < 1e-6);
        for (old, new) in before.iter().zip(h.game.ducks()) {
            assert_eq!(old.pos == new.pos, frozen.contains(&old.id));
        }

        // Second honk during cooldown does nothing
        h.run_for(1000.0);
        let stamps: Vec<f64> = h.game.ducks().iter().map(|d| d.frozen_until_ms).collect();
        h.input(InputEvent::Ability);
        let after: Vec<f64> = h.game.ducks().iter().map(|d| d.frozen_until_ms).collect();
        assert_eq!(stamps, after);

        // Thawed after 1500 ms
        h.run_for(600.0);
        let before = h.game.ducks().to_vec();
        h.frame();
        assert!(before.iter().zip(h.game.ducks()).all(|(a, b)| a.pos != b.pos));

        // Honk is back once the cooldown expires
        while h.now + FRAME_MS < honk_at + 5000.0 {
            h.frame();
        }
        h.input(InputEvent::Ability);
        assert!(h.game.cooldown_until_ms > honk_at + 5000.0);
        assert_eq!(h.game.phase(), KingdomPhase::Stealth);
    }

    #[test]
    fn test_duck_collision_and_retry() {
        let mut h = Harness::new();
        h.to_stealth();

        let guard = h
            .game
            .ducks()
            .iter()
            .filter(|d| d.kind == DuckKind::Guard)
            .nth(3)
            .copied()
            .unwrap();
        h.point(guard.pos.x + 3.0, guard.pos.y);
        h.frame();
        assert_eq!(h.game.phase(), KingdomPhase::Caught);
        assert_eq!(h.game.score(), 1500);

        // Caught: nothing moves, ability is refused
        let frozen_scene = h.game.ducks().to_vec();
        h.input(InputEvent::Ability);
        h.frame();
        assert_eq!(h.game.ducks(), frozen_scene.as_slice());
        assert_eq!(h.game.cooldown_until_ms, 0.0);

        h.point(640.0, 720.0);
        h.input(InputEvent::Retry);
        assert_eq!(h.game.phase(), KingdomPhase::Stealth);
        assert_eq!(h.game.score(), 2000);
        assert_eq!(h.game.ducks(), formation(&h.game.cfg).as_slice());
    }

    #[test]
    fn test_penalty_clamps_at_zero() {
        let mut h = Harness::new();
        h.game.score = 200;
        h.to_stealth();
        h.game.caught(CaughtBy::King);
        assert_eq!(h.game.score(), 0);
    }

    #[test]
    fn test_king_sees_movement() {
        let mut h = Harness::new();
        h.to_stealth();
        h.point(640.0, 250.0);
        h.frame();
        assert_eq!(h.game.phase(), KingdomPhase::BossApproach);
        assert_eq!(h.game.king(), KingState::Asleep);

        // Moving while the king sleeps is fine
        h.point(600.0, 260.0);
        h.frame();
        assert_eq!(h.game.phase(), KingdomPhase::BossApproach);

        h.run_for(3000.0);
        assert_eq!(h.game.king(), KingState::Awake);

        // Standing still while awake is fine, moving is not
        h.frame();
        assert_eq!(h.game.phase(), KingdomPhase::BossApproach);
        h.point(605.0, 260.0);
        h.frame();
        assert_eq!(h.game.phase(), KingdomPhase::Caught);
        match h.frame() {
            Step::Running(s) => assert_eq!(s.notice, KingdomNotice::SeenByKing),
            Step::Finished(_) => panic!("caught is recoverable"),
        }
        // Toggle timer was cancelled on leaving the boss approach
        assert!(h.game.timers.is_empty());
    }

    #[test]
    fn test_far_click_does_not_steal() {
        let mut h = Harness::new();
        h.to_stealth();
        h.point(640.0, 250.0);
        h.frame();
        h.input(InputEvent::Click { x: 640.0, y: 225.0 });
        assert_eq!(h.game.phase(), KingdomPhase::BossApproach);
    }

    #[test]
    fn test_steal_and_escape() {
        let mut h = Harness::new();
        h.to_stealth();
        h.point(640.0, 250.0);
        h.frame();

        h.point(640.0, 150.0);
        match h.frame() {
            Step::Running(s) => {
                assert!(s.near_throne);
                assert_eq!(s.notice, KingdomNotice::StealNow);
            }
            Step::Finished(_) => panic!("still sneaking"),
        }

        h.input(InputEvent::Click { x: 640.0, y: 150.0 });
        assert_eq!(h.game.phase(), KingdomPhase::Escape);

        // The court gives chase
        let before = h.game.ducks().to_vec();
        h.frame();
        for (old, new) in before.iter().zip(h.game.ducks()) {
            let target = Vec2::new(640.0, 150.0);
            assert!(new.pos.distance(target) < old.pos.distance(target));
        }

        h.point(640.0, 770.0);
        match h.frame() {
            Step::Finished(result) => {
                assert_eq!(result.stars, 3);
                assert!(result.special_flag);
                assert_eq!(result.score, 2000);
            }
            Step::Running(_) => panic!("reaching the exit should win"),
        }
        assert_eq!(h.game.phase(), KingdomPhase::Won);
    }

    #[test]
    fn test_quit_is_abandoned() {
        let mut h = Harness::new();
        h.to_stealth();
        h.input(InputEvent::Quit);
        match h.frame() {
            Step::Finished(result) => {
                assert_eq!(result.stars, 0);
                assert!(!result.special_flag);
            }
            Step::Running(_) => panic!("quit should end the game"),
        }
    }
}
