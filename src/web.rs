//! Browser bridge
//!
//! Exposes [`WebGame`] to JS. The page owns the DOM, images and audio; it
//! forwards button presses and sprite taps here, calls `tick()` from an
//! interval or animation frame, and applies whatever `drain_commands()`
//! returns.

use wasm_bindgen::prelude::*;

use crate::presenter::CommandQueue;
use crate::sim::Game;
use crate::tuning::Tuning;

/// Milliseconds from the page's monotonic clock, falling back to wall time
fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now) as u64
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier instance
        return;
    }
    log::info!("Pop Arena loaded");
}

/// A game instance driven from JS
#[wasm_bindgen]
pub struct WebGame {
    game: Game<CommandQueue>,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game. `tuning_json` may override any subset of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| {
                log::warn!("Rejected tuning: {}", e);
                js_err(e)
            })?,
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let game = Game::with_tuning(CommandQueue::new(), seed, tuning).map_err(js_err)?;
        log::info!("Game initialized with seed: {}", seed);
        Ok(WebGame { game })
    }

    pub fn start(&mut self) {
        self.game.start(now_ms());
    }

    pub fn stop(&mut self) {
        self.game.stop();
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    /// Catch the simulation up to the current time
    pub fn tick(&mut self) {
        self.game.advance(now_ms());
    }

    /// Returns true when the tap scored
    pub fn tap(&mut self, id: u32) -> bool {
        self.game.tap(id, now_ms()).is_some()
    }

    pub fn score(&self) -> f64 {
        self.game.score() as f64
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.game.remaining_secs()
    }

    pub fn status(&self) -> String {
        self.game.status().as_str().to_string()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.game.set_muted(muted);
    }

    /// Pending presenter commands as a JSON array
    pub fn drain_commands(&mut self) -> Result<String, JsValue> {
        self.game.presenter_mut().drain_json().map_err(js_err)
    }
}
