//! Scoring
//!
//! Table-driven: the sprite table decides what a hit is worth. The total has
//! no floor, so penalty hits can take it below zero.

use super::sprites::SpriteTable;
use super::state::{HitScore, Round};

/// Apply the delta for `type_index` to the round's score
pub fn apply_hit(round: &mut Round, sprites: &SpriteTable, type_index: usize) -> HitScore {
    if sprites.get(type_index).is_none() {
        log::warn!("Hit on unknown sprite type {}, scoring 0", type_index);
    }
    let delta = sprites.delta(type_index);
    round.score = round.score.saturating_add(i64::from(delta));
    HitScore {
        delta,
        total: round.score,
    }
}

/// Zero the score
pub fn reset(round: &mut Round) {
    round.score = 0;
}
