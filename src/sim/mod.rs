//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the host as millisecond timestamps, never read directly
//! - Seeded (injectable) RNG only
//! - Stable iteration order (by item ID)
//! - Rendering and audio only through the `Presenter` seam

pub mod game;
pub mod items;
pub mod scoring;
pub mod sprites;
pub mod state;
pub mod timers;

pub use game::Game;
pub use items::ItemManager;
pub use scoring::apply_hit;
pub use sprites::{SpriteImage, SpriteKind, SpriteTable};
pub use state::{HitScore, Interaction, ItemId, Round, RoundStatus, SpawnedItem};
pub use timers::{TimerKind, TimerService, TimerTick};
