//! Data-driven game balance
//!
//! Everything that shapes a round (timing, spawn box, sprite table) lives in
//! [`Tuning`]. Defaults come from [`crate::consts`]; a host may override any
//! subset from JSON. A `Game` reads its tuning once and never mutates it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::SpriteTable;

/// Rejected tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("single spawn probability {0} is outside [0, 1]")]
    Probability(f64),

    #[error("spawn range {axis} {min}..{max} must satisfy 0 <= min < max <= 100")]
    SpawnRange { axis: char, min: f32, max: f32 },

    #[error("sprite table is empty")]
    EmptySpriteTable,
}

/// Half-open spawn interval along one axis, in percent of the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRange {
    pub min: f32,
    pub max: f32,
}

impl SpawnRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v < self.max
    }

    fn check(&self, axis: char) -> Result<(), TuningError> {
        // Negated comparisons so NaN bounds are rejected too
        if !(self.min >= 0.0 && self.min < self.max && self.max <= 100.0) {
            return Err(TuningError::SpawnRange {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Round balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub round_duration_secs: u32,
    pub spawn_interval_ms: u64,
    pub countdown_interval_ms: u64,
    pub item_lifetime_ms: u64,
    /// Probability that a spawn tick yields one item instead of two
    pub single_spawn_probability: f64,
    pub spawn_x: SpawnRange,
    pub spawn_y: SpawnRange,
    pub sprites: SpriteTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            round_duration_secs: ROUND_DURATION_SECS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            item_lifetime_ms: ITEM_LIFETIME_MS,
            single_spawn_probability: SINGLE_SPAWN_PROBABILITY,
            spawn_x: SpawnRange::new(SPAWN_MIN_X, SPAWN_MAX_X),
            spawn_y: SpawnRange::new(SPAWN_MIN_Y, SPAWN_MAX_Y),
            sprites: SpriteTable::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning overrides. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.round_duration_secs == 0 {
            return Err(TuningError::Zero {
                field: "round_duration_secs",
            });
        }
        if self.spawn_interval_ms == 0 {
            return Err(TuningError::Zero {
                field: "spawn_interval_ms",
            });
        }
        if self.countdown_interval_ms == 0 {
            return Err(TuningError::Zero {
                field: "countdown_interval_ms",
            });
        }
        if self.item_lifetime_ms == 0 {
            return Err(TuningError::Zero {
                field: "item_lifetime_ms",
            });
        }
        if !(0.0..=1.0).contains(&self.single_spawn_probability) {
            return Err(TuningError::Probability(self.single_spawn_probability));
        }
        self.spawn_x.check('x')?;
        self.spawn_y.check('y')?;
        if self.sprites.is_empty() {
            return Err(TuningError::EmptySpriteTable);
        }
        Ok(())
    }
}
