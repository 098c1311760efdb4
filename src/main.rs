//! Flock Arcade headless demo
//!
//! Plays the runner, catch and maze games with a simple autopilot and prints
//! the results. Pass a seed as the first argument to replay a run.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use flock_arcade::config::{CatchConfig, GameConfig, MazeConfig, RunnerConfig};
    use flock_arcade::sim::{CatchSnapshot, ItemKind, MazeSnapshot, ObstacleKind, RunnerSnapshot};
    use flock_arcade::{
        Capabilities, ConfigError, InputEvent, Progress, Session, SessionConfig, SessionResult,
        Snapshot, TickOutcome,
    };
    use glam::Vec2;

    /// Ten minutes of frames; every game ends well before this
    const FRAME_LIMIT: u64 = 36_000;

    /// Feed autopilot inputs until the session reports a result
    fn play<F>(config: SessionConfig, mut pilot: F) -> Result<Option<SessionResult>, ConfigError>
    where
        F: FnMut(&Snapshot) -> Vec<InputEvent>,
    {
        let mut session = Session::start(config)?;
        while session.frame() < FRAME_LIMIT {
            match session.tick() {
                TickOutcome::Frame(snapshot) => {
                    for input in pilot(&snapshot) {
                        session.on_input(input);
                    }
                }
                TickOutcome::Finished { result, .. } => return Ok(Some(result)),
                TickOutcome::Closed => break,
            }
        }
        log::warn!("{:?} session hit the frame limit", session.kind());
        session.end_session();
        Ok(None)
    }

    /// Jump when a rock is about to reach LiLi, glide otherwise
    fn runner_pilot(s: &RunnerSnapshot) -> Vec<InputEvent> {
        let danger = s.obstacles.iter().any(|o| {
            o.kind == ObstacleKind::Rock && o.pos.x > s.player_x && o.pos.x < s.player_x + 5.0 * s.speed + 40.0
        });
        if danger && s.actor.velocity == 0.0 {
            vec![InputEvent::Press]
        } else if s.actor.velocity > 0.0 {
            vec![InputEvent::Release]
        } else {
            Vec::new()
        }
    }

    /// Chase the lowest item that isn't a vegetable
    fn catch_pilot(s: &CatchSnapshot) -> Vec<InputEvent> {
        s.items
            .iter()
            .filter(|item| item.kind != ItemKind::Veg)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|item| {
                vec![InputEvent::Pointer {
                    x: item.pos.x,
                    y: item.pos.y + item.vel.y,
                }]
            })
            .unwrap_or_default()
    }

    /// Walks cell centres from start to end
    struct MazePilot {
        waypoints: Vec<Vec2>,
        next: usize,
        pos: Vec2,
    }

    impl MazePilot {
        const STEP: f32 = 8.0;

        fn new(cfg: &MazeConfig) -> Self {
            let cells = [(1, 1), (3, 1), (3, 3), (5, 3), (5, 1), (8, 1)];
            let waypoints: Vec<Vec2> = cells
                .iter()
                .map(|&(col, row)| {
                    Vec2::new(cfg.origin_x, cfg.origin_y)
                        + (Vec2::new(col as f32, row as f32) + 0.5) * cfg.cell_size
                })
                .collect();
            Self {
                pos: waypoints[0],
                waypoints,
                next: 0,
            }
        }

        fn steer(&mut self, _s: &MazeSnapshot) -> Vec<InputEvent> {
            let Some(&target) = self.waypoints.get(self.next) else {
                return Vec::new();
            };
            let to_target = target - self.pos;
            if to_target.length() <= Self::STEP {
                self.pos = target;
                self.next += 1;
            } else {
                self.pos += to_target.normalize() * Self::STEP;
            }
            vec![InputEvent::Pointer {
                x: self.pos.x,
                y: self.pos.y,
            }]
        }
    }

    fn report(label: &str, result: Option<SessionResult>, progress: &mut Progress) {
        match result {
            Some(result) => {
                println!(
                    "{label:>8}: score {:>5}  stars {}  special {}",
                    result.score, result.stars, result.special_flag
                );
                if let Some(outcome) = progress.record_result(&result) {
                    if let Some(level) = outcome.unlocked {
                        println!("          unlocked {level:?}");
                    }
                }
            }
            None => println!("{label:>8}: no result"),
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let seed = std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(42);
        log::info!("Flock Arcade demo, seed {seed}");

        let mut progress = Progress::new();

        let runner = SessionConfig::new(seed, GameConfig::Runner(RunnerConfig::default()))
            .with_capabilities(Capabilities { super_jump: true });
        let result = play(runner, |snapshot| match snapshot {
            Snapshot::Runner(s) => runner_pilot(s),
            _ => Vec::new(),
        })?;
        report("runner", result, &mut progress);

        let catch = SessionConfig::new(seed, GameConfig::Catch(CatchConfig::default()));
        let result = play(catch, |snapshot| match snapshot {
            Snapshot::Catch(s) => catch_pilot(s),
            _ => Vec::new(),
        })?;
        report("catch", result, &mut progress);

        let maze_cfg = MazeConfig::default();
        let mut pilot = MazePilot::new(&maze_cfg);
        let maze = SessionConfig::new(seed, GameConfig::Maze(maze_cfg));
        let result = play(maze, |snapshot| match snapshot {
            Snapshot::Maze(s) => pilot.steer(s),
            _ => Vec::new(),
        })?;
        report("maze", result, &mut progress);

        println!(
            "\nbread crumbs {}  total stars {}",
            progress.currency,
            progress.total_stars()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = demo::run() {
        eprintln!("demo failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is host::init, this is just to satisfy the compiler
}
