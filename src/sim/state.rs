//! Round and item state
//!
//! Plain data; the transitions live in `game`, `items` and `scoring`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::ROUND_DURATION_SECS;

/// Item identifier (monotonically increasing per game)
pub type ItemId = u32;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundStatus {
    /// No round in progress (initial, after stop or reset)
    #[default]
    Idle,
    /// Timers running, items spawning
    Running,
    /// Countdown reached zero, final score on display
    Finished,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Idle => "idle",
            RoundStatus::Running => "running",
            RoundStatus::Finished => "finished",
        }
    }
}

/// The single live round of a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub status: RoundStatus,
    /// Whole seconds left, never increases while running
    pub remaining_secs: u32,
    /// Host timestamp (ms) at which the current round started
    pub started_at_ms: Option<u64>,
    /// Running total, unbounded in both directions
    pub score: i64,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(ROUND_DURATION_SECS)
    }
}

impl Round {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            status: RoundStatus::Idle,
            remaining_secs: duration_secs,
            started_at_ms: None,
            score: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RoundStatus::Running
    }
}

/// A tap target in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedItem {
    pub id: ItemId,
    /// Position in percent of the arena
    pub pos: Vec2,
    pub type_index: usize,
    pub created_at_ms: u64,
    pub expires_at_ms: u64,
    /// Cleared the moment a tap is accepted
    pub interactable: bool,
}

impl SpawnedItem {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Result of a successful interaction, handed to scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub id: ItemId,
    pub type_index: usize,
    pub pos: Vec2,
}

/// Outcome of a scored hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitScore {
    pub delta: i32,
    pub total: i64,
}

impl HitScore {
    pub fn is_positive(&self) -> bool {
        self.delta >= 0
    }

    /// Floating feedback label, e.g. "+10" / "-10"
    pub fn label(&self) -> String {
        format!("{:+}", self.delta)
    }
}
