//! Presentation seam
//!
//! The simulation never touches the DOM, images or audio. It issues commands
//! through [`Presenter`]; failures on the other side (missing art, autoplay
//! rejection) are the presenter's business and never reach the round.
//!
//! [`CommandQueue`] records every call as a [`PresentCommand`] so a host can
//! drain them (the browser bridge ships them to JS as JSON).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{FLOATING_TEXT_MS, HIT_EFFECT_MS};
use crate::sim::{ItemId, SpawnedItem, SpriteImage, SpriteKind};

/// Audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    /// Looping background track, restarted from the top
    Music,
    /// Hit pop
    Pop,
}

/// Visibility of the start/stop buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub start_visible: bool,
    pub stop_visible: bool,
}

impl Controls {
    /// Round in progress
    pub const RUNNING: Controls = Controls {
        start_visible: false,
        stop_visible: true,
    };
    /// Waiting for the player to start
    pub const READY: Controls = Controls {
        start_visible: true,
        stop_visible: false,
    };
    /// Start overlay owns the screen
    pub const HIDDEN: Controls = Controls {
        start_visible: false,
        stop_visible: false,
    };
}

/// Rendering/audio collaborator
pub trait Presenter {
    fn render_item(&mut self, item: &SpawnedItem, sprite: Option<&SpriteKind>);
    fn remove_item(&mut self, id: ItemId);
    fn show_floating_text(&mut self, pos: Vec2, text: &str, positive: bool);
    fn play_hit_effect(&mut self, type_index: usize, pos: Vec2, effect: &str);
    fn update_score_display(&mut self, score: i64);
    fn update_time_display(&mut self, time: &str);
    fn show_end_overlay(&mut self, final_score: i64);
    fn hide_end_overlay(&mut self);
    fn show_start_overlay(&mut self);
    fn hide_start_overlay(&mut self);
    fn set_controls(&mut self, controls: Controls);
    fn play_sound(&mut self, sound: Sound, volume: f32);
    fn pause_music(&mut self);
}

/// A recorded presenter call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresentCommand {
    RenderItem {
        id: ItemId,
        x: f32,
        y: f32,
        type_index: usize,
        /// `None` means draw a placeholder
        image: Option<String>,
    },
    RemoveItem {
        id: ItemId,
    },
    FloatingText {
        x: f32,
        y: f32,
        text: String,
        positive: bool,
        duration_ms: u32,
    },
    HitEffect {
        type_index: usize,
        x: f32,
        y: f32,
        effect: String,
        duration_ms: u32,
    },
    Score {
        score: i64,
    },
    Time {
        text: String,
    },
    ShowEndOverlay {
        final_score: i64,
    },
    HideEndOverlay,
    ShowStartOverlay,
    HideStartOverlay,
    Controls(Controls),
    PlaySound {
        sound: Sound,
        volume: f32,
    },
    PauseMusic,
}

/// Presenter that buffers commands for a host to drain
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<PresentCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PresentCommand] {
        &self.commands
    }

    /// Take everything recorded so far
    pub fn drain(&mut self) -> Vec<PresentCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Drain as a JSON array
    pub fn drain_json(&mut self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.drain())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, command: PresentCommand) {
        self.commands.push(command);
    }
}

impl Presenter for CommandQueue {
    fn render_item(&mut self, item: &SpawnedItem, sprite: Option<&SpriteKind>) {
        let image = match sprite.map(SpriteKind::image) {
            Some(SpriteImage::Image(src)) => Some(src.to_string()),
            _ => None,
        };
        self.push(PresentCommand::RenderItem {
            id: item.id,
            x: item.pos.x,
            y: item.pos.y,
            type_index: item.type_index,
            image,
        });
    }

    fn remove_item(&mut self, id: ItemId) {
        self.push(PresentCommand::RemoveItem { id });
    }

    fn show_floating_text(&mut self, pos: Vec2, text: &str, positive: bool) {
        self.push(PresentCommand::FloatingText {
            x: pos.x,
            y: pos.y,
            text: text.to_string(),
            positive,
            duration_ms: FLOATING_TEXT_MS,
        });
    }

    fn play_hit_effect(&mut self, type_index: usize, pos: Vec2, effect: &str) {
        self.push(PresentCommand::HitEffect {
            type_index,
            x: pos.x,
            y: pos.y,
            effect: effect.to_string(),
            duration_ms: HIT_EFFECT_MS,
        });
    }

    fn update_score_display(&mut self, score: i64) {
        self.push(PresentCommand::Score { score });
    }

    fn update_time_display(&mut self, time: &str) {
        self.push(PresentCommand::Time {
            text: time.to_string(),
        });
    }

    fn show_end_overlay(&mut self, final_score: i64) {
        self.push(PresentCommand::ShowEndOverlay { final_score });
    }

    fn hide_end_overlay(&mut self) {
        self.push(PresentCommand::HideEndOverlay);
    }

    fn show_start_overlay(&mut self) {
        self.push(PresentCommand::ShowStartOverlay);
    }

    fn hide_start_overlay(&mut self) {
        self.push(PresentCommand::HideStartOverlay);
    }

    fn set_controls(&mut self, controls: Controls) {
        self.push(PresentCommand::Controls(controls));
    }

    fn play_sound(&mut self, sound: Sound, volume: f32) {
        self.push(PresentCommand::PlaySound { sound, volume });
    }

    fn pause_music(&mut self) {
        self.push(PresentCommand::PauseMusic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId, type_index: usize) -> SpawnedItem {
        SpawnedItem {
            id,
            pos: Vec2::new(12.5, 40.0),
            type_index,
            created_at_ms: 0,
            expires_at_ms: 5000,
            interactable: true,
        }
    }

    #[test]
    fn test_render_item_resolves_image() {
        let mut queue = CommandQueue::new();
        let sprite = SpriteKind::new("img:./img/a.png", None, 10);
        queue.render_item(&item(3, 1), Some(&sprite));
        queue.render_item(&item(4, 7), None);

        assert_eq!(
            queue.commands()[0],
            PresentCommand::RenderItem {
                id: 3,
                x: 12.5,
                y: 40.0,
                type_index: 1,
                image: Some("./img/a.png".to_string()),
            }
        );
        assert!(matches!(
            queue.commands()[1],
            PresentCommand::RenderItem { image: None, .. }
        ));
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = CommandQueue::new();
        queue.update_score_display(20);
        queue.pause_music();
        assert_eq!(queue.len(), 2);
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let mut queue = CommandQueue::new();
        queue.update_time_display("0:30");
        queue.set_controls(Controls::RUNNING);
        queue.play_sound(Sound::Pop, 0.7);
        let json = queue.drain_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["kind"], "time");
        assert_eq!(value[0]["text"], "0:30");
        assert_eq!(value[1]["kind"], "controls");
        assert_eq!(value[1]["stop_visible"], true);
        assert_eq!(value[2]["sound"], "pop");
    }
}
