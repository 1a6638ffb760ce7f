//! Spawned item lifecycle
//!
//! Owns every live tap target: creates batches on spawn ticks, expires them
//! after their lifetime, and hands them to scoring on a successful tap.
//! Expiry deadlines sit in a min-heap; entries are not removed when an item
//! dies early, so every deadline re-checks liveness when it fires.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use glam::Vec2;
use rand::Rng;

use super::sprites::SpriteTable;
use super::state::{Interaction, ItemId, SpawnedItem};
use crate::presenter::Presenter;
use crate::tuning::{SpawnRange, Tuning};

/// Uniform draw inside `range`; a degenerate range pins to `min`
fn draw_coord<R: Rng>(rng: &mut R, range: SpawnRange) -> f32 {
    if range.min.is_finite() && range.max.is_finite() && range.min < range.max {
        rng.random_range(range.min..range.max)
    } else {
        range.min
    }
}

/// Live items plus their pending expiries
#[derive(Debug, Clone)]
pub struct ItemManager {
    /// Sorted by id for deterministic iteration
    live: BTreeMap<ItemId, SpawnedItem>,
    expiries: BinaryHeap<Reverse<(u64, ItemId)>>,
    next_id: ItemId,
}

impl Default for ItemManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemManager {
    pub fn new() -> Self {
        Self {
            live: BTreeMap::new(),
            expiries: BinaryHeap::new(),
            next_id: 1,
        }
    }

    fn next_item_id(&mut self) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&SpawnedItem> {
        self.live.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnedItem> {
        self.live.values()
    }

    /// Draw the batch size for one spawn tick (one draw per tick, not per item).
    /// Probabilities outside [0, 1] behave as if clamped.
    pub fn draw_batch_size<R: Rng>(rng: &mut R, single_probability: f64) -> usize {
        if rng.random::<f64>() < single_probability {
            1
        } else {
            2
        }
    }

    /// Spawn one tick's worth of items at `now_ms`. Returns the new ids.
    pub fn spawn_batch<R, P>(
        &mut self,
        rng: &mut R,
        tuning: &Tuning,
        now_ms: u64,
        presenter: &mut P,
    ) -> Vec<ItemId>
    where
        R: Rng,
        P: Presenter + ?Sized,
    {
        let count = Self::draw_batch_size(rng, tuning.single_spawn_probability);
        (0..count)
            .map(|_| self.spawn_one(&mut *rng, tuning, now_ms, &mut *presenter))
            .collect()
    }

    fn spawn_one<R, P>(
        &mut self,
        rng: &mut R,
        tuning: &Tuning,
        now_ms: u64,
        presenter: &mut P,
    ) -> ItemId
    where
        R: Rng,
        P: Presenter + ?Sized,
    {
        let sprites: &SpriteTable = &tuning.sprites;
        let x = draw_coord(rng, tuning.spawn_x);
        let y = draw_coord(rng, tuning.spawn_y);
        let type_index = rng.random_range(0..sprites.len().max(1));

        let id = self.next_item_id();
        let expires_at_ms = now_ms.saturating_add(tuning.item_lifetime_ms);
        let item = SpawnedItem {
            id,
            pos: Vec2::new(x, y),
            type_index,
            created_at_ms: now_ms,
            expires_at_ms,
            interactable: true,
        };
        log::debug!(
            "Spawned item {} type {} at ({:.1}, {:.1})",
            id,
            type_index,
            x,
            y
        );

        presenter.render_item(&item, sprites.get(type_index));
        self.expiries.push(Reverse((expires_at_ms, id)));
        self.live.insert(id, item);
        id
    }

    /// Resolve a tap. The interactable flag is cleared before anything else
    /// happens, so a second tap on the same item is a no-op.
    pub fn interact<P: Presenter + ?Sized>(
        &mut self,
        id: ItemId,
        presenter: &mut P,
    ) -> Option<Interaction> {
        let item = self.live.get_mut(&id)?;
        if !item.interactable {
            return None;
        }
        item.interactable = false;

        let item = self.live.remove(&id)?;
        presenter.remove_item(id);
        Some(Interaction {
            id,
            type_index: item.type_index,
            pos: item.pos,
        })
    }

    /// Earliest pending deadline (may belong to an item that is already gone)
    pub fn next_expiry(&self) -> Option<u64> {
        self.expiries.peek().map(|Reverse((at, _))| *at)
    }

    /// Remove every item whose deadline is at or before `now_ms`.
    /// Returns the ids that actually expired.
    pub fn expire_due<P: Presenter + ?Sized>(
        &mut self,
        now_ms: u64,
        presenter: &mut P,
    ) -> Vec<ItemId> {
        let mut expired = Vec::new();
        while let Some(&Reverse((at, id))) = self.expiries.peek() {
            if at > now_ms {
                break;
            }
            self.expiries.pop();

            let still_live = self.live.get(&id).is_some_and(|item| item.interactable);
            if still_live {
                self.live.remove(&id);
                presenter.remove_item(id);
                expired.push(id);
            }
        }
        if !expired.is_empty() {
            log::debug!("Expired {} item(s) at {}ms", expired.len(), now_ms);
        }
        expired
    }

    /// Remove every live item and cancel pending expiries. Idempotent.
    pub fn clear_all<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        for id in self.live.keys() {
            presenter.remove_item(*id);
        }
        self.live.clear();
        self.expiries.clear();
    }
}
