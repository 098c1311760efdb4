//! Browser binding
//!
//! JSON in, JSON out. The page owns rendering, audio and storage; it feeds
//! pointer events in and draws whatever `tick` returns.

use wasm_bindgen::prelude::*;

use crate::config::SessionConfig;
use crate::progress::Progress;
use crate::session::{InputEvent, Session, TickOutcome};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Flock Arcade core loaded");
}

#[wasm_bindgen]
#[derive(Default)]
pub struct GameHost {
    session: Option<Session>,
    progress: Progress,
}

#[wasm_bindgen]
impl GameHost {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GameHost {
        GameHost::default()
    }

    /// Start a session from a `SessionConfig` JSON object. A missing seed is
    /// taken from the clock. Replaces any running session.
    pub fn start_session(&mut self, config_json: &str) -> Result<(), JsError> {
        let mut value: serde_json::Value = serde_json::from_str(config_json)?;
        if let Some(object) = value.as_object_mut() {
            object
                .entry("seed")
                .or_insert_with(|| serde_json::Value::from(js_sys::Date::now() as u64));
        }
        let config: SessionConfig = serde_json::from_value(value)?;

        if let Some(mut previous) = self.session.take() {
            previous.end_session();
        }
        self.session = Some(Session::start(config)?);
        Ok(())
    }

    /// Queue an `InputEvent` JSON object, e.g. `{"kind":"press"}`
    pub fn on_input(&mut self, input_json: &str) -> Result<(), JsError> {
        let input: InputEvent = serde_json::from_str(input_json)?;
        if let Some(session) = self.session.as_mut() {
            session.on_input(input);
        }
        Ok(())
    }

    /// Shorthand for the hot path: pointer moves arrive every mouse event
    pub fn pointer(&mut self, x: f32, y: f32) {
        if let Some(session) = self.session.as_mut() {
            session.on_input(InputEvent::Pointer { x, y });
        }
    }

    /// One fixed frame; returns a `TickOutcome` as JSON
    pub fn tick(&mut self) -> Result<String, JsError> {
        let outcome = match self.session.as_mut() {
            Some(session) => session.tick(),
            None => TickOutcome::Closed,
        };
        self.note(&outcome);
        Ok(serde_json::to_string(&outcome)?)
    }

    /// Frames covered by `elapsed_ms` of wall time; returns a JSON array of
    /// `TickOutcome`s
    pub fn advance(&mut self, elapsed_ms: f64) -> Result<String, JsError> {
        let outcomes = match self.session.as_mut() {
            Some(session) => session.advance(elapsed_ms),
            None => vec![TickOutcome::Closed],
        };
        for outcome in &outcomes {
            self.note(outcome);
        }
        Ok(serde_json::to_string(&outcomes)?)
    }

    pub fn end_session(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.end_session();
        }
    }

    /// Replace progress with a saved copy
    pub fn load_progress(&mut self, json: &str) -> Result<(), JsError> {
        self.progress = Progress::from_json(json)?;
        Ok(())
    }

    pub fn progress_json(&self) -> Result<String, JsError> {
        Ok(self.progress.to_json()?)
    }
}

impl GameHost {
    fn note(&mut self, outcome: &TickOutcome) {
        if let TickOutcome::Finished { result, .. } = outcome {
            self.progress.record_result(result);
        }
    }
}
