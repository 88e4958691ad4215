//! Entity collection
//!
//! The World owns every entity of the running level:
//! - Entity allocation and lifetime tracking
//! - Creation-order storage (which is also the draw order)
//! - Deferred despawn, so systems can flag removals while iterating

use super::entity::{Entity, EntityAllocator, EntityId};

#[derive(Debug, Clone, Default)]
pub struct World {
    /// Entity allocator for creating/destroying ids
    allocator: EntityAllocator,

    /// Entities in creation order
    entities: Vec<Entity>,

    /// Entities queued for despawn at end of step
    despawn_queue: Vec<EntityId>,

    /// Cached player id (the level guarantees exactly one)
    player: Option<EntityId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id and append the entity. The `id` field of the
    /// argument is overwritten.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.allocator.allocate();
        entity.id = id;
        if entity.is_player() {
            self.player = Some(id);
        }
        self.entities.push(entity);
        id
    }

    /// Stand-in id for entities built before `spawn` assigns the real one
    pub fn placeholder_id() -> EntityId {
        EntityId::new(u32::MAX, 0)
    }

    /// Queue an entity for despawn at the end of the step.
    pub fn despawn(&mut self, id: EntityId) {
        if !self.despawn_queue.contains(&id) {
            self.despawn_queue.push(id);
        }
    }

    /// Remove queued entities, keeping the creation order of the rest.
    /// Returns the removed ids.
    pub fn apply_despawns(&mut self) -> Vec<EntityId> {
        if self.despawn_queue.is_empty() {
            return Vec::new();
        }
        let queue = std::mem::take(&mut self.despawn_queue);
        self.entities.retain(|e| !queue.contains(&e.id));
        for &id in &queue {
            self.allocator.free(id);
            if self.player == Some(id) {
                self.player = None;
            }
        }
        queue
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    pub fn is_queued_for_despawn(&self, id: EntityId) -> bool {
        self.despawn_queue.contains(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        let id = self.player?;
        self.get_mut(id)
    }

    /// Entities in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity and restart id allocation
    pub fn clear(&mut self) {
        self.entities.clear();
        self.despawn_queue.clear();
        self.allocator.reset();
        self.player = None;
    }
}
