//! Entities with Generational Ids
//!
//! Entities are referenced by `EntityId`, a slot index plus a generation.
//! When an entity is despawned its slot can be reused, and the generation
//! increments so that old ids (e.g. inside last frame's events) no longer
//! match the new occupant.

use crate::asset::SpriteId;
use crate::math::{Rect, Vec2};
use crate::world::EntityKind;

/// A unique identifier for a game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    /// Index into the entity storage
    index: u32,
    /// Generation counter - increments when slot is reused
    generation: u32,
}

impl EntityId {
    /// Should only be called by EntityAllocator.
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Allocates and tracks entity lifetimes.
///
/// Freed slots are reused LIFO with incremented generations.
#[derive(Debug, Clone, Default)]
pub struct EntityAllocator {
    /// Generation counter for each slot
    generations: Vec<u32>,
    /// Free slots available for reuse
    free_indices: Vec<u32>,
    /// Number of currently alive entities
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityId {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already incremented on free
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            EntityId::new(index, 0)
        }
    }

    /// Free an entity, making its slot available for reuse.
    /// Returns true if the entity was alive and is now freed.
    pub fn free(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.generations[id.index as usize] += 1;
        self.free_indices.push(id.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index as usize;
        idx < self.generations.len()
            && self.generations[idx] == id.generation
            && !self.free_indices.contains(&id.index)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Forget every slot. Ids handed out before the reset must not be used
    /// afterwards; a fresh allocator is what makes re-initialization
    /// reproduce the same ids.
    pub fn reset(&mut self) {
        self.generations.clear();
        self.free_indices.clear();
        self.alive_count = 0;
    }
}

/// Spawner bookkeeping carried by `EntityKind::Spawner` entities
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnerState {
    /// Index of the spawner's config in the level's entity list
    pub config_index: usize,
    /// Seconds until the next emission
    pub countdown: f32,
    /// Entities emitted by this spawner that are still alive
    pub alive: Vec<EntityId>,
}

/// A game object owned by the core's entity collection
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Top-left corner in level pixels
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub sprite: SpriteId,
    /// Animation frame within the sprite sheet
    pub frame: u16,
    /// Ticks since the last frame change
    pub anim_counter: u16,
    /// Inactive entities are skipped by collision and rendering
    pub active: bool,
    pub gravity: bool,
    pub on_ground: bool,
    pub facing_left: bool,
    /// Score for collecting or stomping
    pub value: u32,
    pub spawner: Option<SpawnerState>,
}

impl Entity {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }
}
