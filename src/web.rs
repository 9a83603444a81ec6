//! Browser bindings
//!
//! The page's render loop owns a [`WebGame`], feeds it input events and the
//! frame delta from `requestAnimationFrame`, and draws from the JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::highscores::sanitize_name;
use crate::persistence::Store;
use crate::platform::{clock_seed, now_ms};
use crate::sim::{DashDirection, FrameClock, FrameInput, FrameOutcome, Session};
use crate::theme::Theme;
use crate::{Leaderboard, Settings, Tuning};

/// LocalStorage key prefix
const STORAGE_PREFIX: &str = "avoid_the_block";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Avoid The Block (web) starting...");
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Game instance holding all state
#[wasm_bindgen]
pub struct WebGame {
    store: Store,
    settings: Settings,
    tuning: Tuning,
    board: Leaderboard,
    session: Session,
    clock: FrameClock,
    input: FrameInput,
    recorded: bool,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let store = Store::new(STORAGE_PREFIX);
        let settings = Settings::load(&store);
        let tuning = Tuning::load(&store);
        let board = Leaderboard::load(&store);
        let session = Session::with_config(clock_seed(), tuning.clone(), settings.theme);
        WebGame {
            store,
            settings,
            tuning,
            board,
            session,
            clock: FrameClock::new(),
            input: FrameInput::default(),
            recorded: false,
        }
    }

    /// Start a fresh session
    pub fn restart(&mut self) {
        let seed = clock_seed();
        self.session = Session::with_config(seed, self.tuning.clone(), self.settings.theme);
        self.clock = FrameClock::new();
        self.input = FrameInput::default();
        self.recorded = false;
        log::info!("Started new game with seed: {}", seed);
    }

    /// Held steering, -1 (left) to 1 (right)
    pub fn set_axis(&mut self, axis: f32) {
        self.input.axis = axis;
    }

    /// Queue a dash: negative = left, positive = right, 0 = current heading
    pub fn dash(&mut self, direction: i32) {
        self.input.dash = Some(match direction.signum() {
            -1 => DashDirection::Left,
            1 => DashDirection::Right,
            _ => DashDirection::Heading,
        });
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.input.autopilot = on;
    }

    /// Advance by the real frame delta (seconds). Returns true once the player is dead.
    pub fn frame(&mut self, dt: f32) -> bool {
        let outcome = self.clock.step(&mut self.session, &self.input, dt);
        // Clear one-shot inputs after processing
        self.input = self.input.held();
        outcome == FrameOutcome::PlayerDied
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn qualifies(&self) -> bool {
        !self.recorded && self.board.qualifies(self.session.score)
    }

    /// Render snapshot as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_error)
    }

    pub fn leaderboard_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.board).map_err(js_error)
    }

    /// Record the finished session; returns the rank achieved, 0 if none
    pub fn submit_score(&mut self, name: &str) -> Result<u32, JsValue> {
        if self.session.is_alive() || self.recorded {
            return Ok(0);
        }
        self.recorded = true;
        let Some(rank) = self.board.add(name, self.session.score, now_ms()) else {
            return Ok(0);
        };
        self.settings.last_name = sanitize_name(name);
        self.board.save(&self.store).map_err(js_error)?;
        if let Err(e) = self.settings.save(&self.store) {
            log::warn!("Failed saving settings: {}", e);
        }
        Ok(rank as u32)
    }

    /// Switch theme for future sessions
    pub fn select_theme(&mut self, name: &str) -> Result<(), JsValue> {
        let theme = Theme::from_str(name).ok_or_else(|| js_error(format!("unknown theme {name}")))?;
        self.settings
            .select_theme(theme, self.board.best_score())
            .map_err(js_error)?;
        self.settings.save(&self.store).map_err(js_error)
    }

    /// Current preferences as JSON
    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.settings).map_err(js_error)
    }

    pub fn set_volumes(&mut self, master: f32, sfx: f32, music: f32) -> Result<(), JsValue> {
        self.settings.set_volumes(master, sfx, music);
        self.settings.save(&self.store).map_err(js_error)
    }

    pub fn set_reduced_motion(&mut self, on: bool) -> Result<(), JsValue> {
        self.settings.reduced_motion = on;
        self.settings.save(&self.store).map_err(js_error)
    }

    pub fn reduced_motion(&self) -> bool {
        self.settings.reduced_motion
    }

    /// Gain to apply to sound effects
    pub fn sfx_volume(&self) -> f32 {
        self.settings.effective_sfx_volume()
    }

    /// Gain to apply to music
    pub fn music_volume(&self) -> f32 {
        self.settings.effective_music_volume()
    }

    /// Themes selectable with the current best score
    pub fn unlocked_themes(&self) -> Vec<String> {
        Theme::unlocked_for(self.board.best_score())
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
