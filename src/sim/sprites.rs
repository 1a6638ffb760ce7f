//! Sprite type table
//!
//! Ordered, immutable list of the sprite variants that can spawn. The index
//! of an entry is the item's `type_index`; the entry decides how many points
//! a hit is worth and which art the presenter should use.

use serde::{Deserialize, Serialize};

use crate::consts::{PENALTY_DELTA, REWARD_DELTA};

/// How the presenter should draw a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteImage<'a> {
    /// Image source path
    Image(&'a str),
    /// No usable image reference; draw a placeholder box
    Placeholder,
}

/// One sprite variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteKind {
    /// Image spec, `img:<path>`. Anything else renders as a placeholder.
    pub image: String,
    /// Hit effect animation (e.g. a gif), if any
    #[serde(default)]
    pub effect: Option<String>,
    /// Points awarded when hit (negative for penalty sprites)
    pub delta: i32,
}

impl SpriteKind {
    pub fn new(image: &str, effect: Option<&str>, delta: i32) -> Self {
        Self {
            image: image.to_string(),
            effect: effect.map(str::to_string),
            delta,
        }
    }

    /// Resolve the image spec
    pub fn image(&self) -> SpriteImage<'_> {
        match self.image.strip_prefix("img:") {
            Some(src) if !src.is_empty() => SpriteImage::Image(src),
            _ => SpriteImage::Placeholder,
        }
    }

    pub fn effect(&self) -> Option<&str> {
        self.effect.as_deref().filter(|e| !e.is_empty())
    }
}

/// Ordered sprite table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteTable {
    kinds: Vec<SpriteKind>,
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self::new(vec![
            // Type 0 is the one to avoid
            SpriteKind::new("img:./img/charater-01.png", Some("./img/effect-01.gif"), PENALTY_DELTA),
            SpriteKind::new("img:./img/charater-02.png", Some("./img/effect-02.gif"), REWARD_DELTA),
            SpriteKind::new("img:./img/charater-03.png", Some("./img/effect-03.gif"), REWARD_DELTA),
            SpriteKind::new("img:./img/charater-04.png", Some("./img/effect-04.gif"), REWARD_DELTA),
        ])
    }
}

impl SpriteTable {
    pub fn new(kinds: Vec<SpriteKind>) -> Self {
        Self { kinds }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn get(&self, type_index: usize) -> Option<&SpriteKind> {
        self.kinds.get(type_index)
    }

    /// Score delta for a type; unknown types are worth nothing
    pub fn delta(&self, type_index: usize) -> i32 {
        self.get(type_index).map_or(0, |k| k.delta)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpriteKind> {
        self.kinds.iter()
    }
}
