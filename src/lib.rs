//! Pop Arena - A timed tap-the-sprite reflex game
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (timers, spawning, scoring, state machine)
//! - `presenter`: Rendering/audio collaborator seam and the command queue host adapter
//! - `tuning`: Data-driven game balance
//! - `settings`: Audio preferences
//! - `web`: Browser bridge (wasm32 only)

pub mod presenter;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use presenter::{CommandQueue, Controls, PresentCommand, Presenter, Sound};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Round length in seconds
    pub const ROUND_DURATION_SECS: u32 = 30;
    /// Spawn ticker period (ms)
    pub const SPAWN_INTERVAL_MS: u64 = 700;
    /// Countdown poll period (ms); remaining time is recomputed on every poll
    pub const COUNTDOWN_INTERVAL_MS: u64 = 250;
    /// How long an untouched item stays in the arena (ms)
    pub const ITEM_LIFETIME_MS: u64 = 5000;
    /// Chance that a spawn tick produces a single item (otherwise two)
    pub const SINGLE_SPAWN_PROBABILITY: f64 = 0.7;

    /// Spawn box, in percent of the arena
    pub const SPAWN_MIN_X: f32 = 6.0;
    pub const SPAWN_MAX_X: f32 = 94.0;
    pub const SPAWN_MIN_Y: f32 = 8.0;
    pub const SPAWN_MAX_Y: f32 = 92.0;

    /// Points for hitting the penalty sprite (type 0) and every other sprite
    pub const PENALTY_DELTA: i32 = -10;
    pub const REWARD_DELTA: i32 = 10;

    /// Transient feedback lifetimes handed to the presenter (ms)
    pub const FLOATING_TEXT_MS: u32 = 900;
    pub const HIT_EFFECT_MS: u32 = 1000;
}

/// Format whole seconds as `m:ss`
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(30), "0:30");
        assert_eq!(format_time(5), "0:05");
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(61), "1:01");
        assert_eq!(format_time(600), "10:00");
    }
}
