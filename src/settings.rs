//! Audio preferences
//!
//! Kept in memory only; the host may hand them over as JSON.

use serde::{Deserialize, Serialize};

use crate::presenter::Sound;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence everything
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.4,
            sfx_volume: 0.7,
            muted: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Effective playback volume for a cue
    pub fn volume_for(&self, sound: Sound) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = match sound {
            Sound::Music => self.music_volume,
            Sound::Pop => self.sfx_volume,
        };
        (self.master_volume * channel).clamp(0.0, 1.0)
    }
}
