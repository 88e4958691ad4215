//! Event System
//!
//! `step` reports what happened during the frame through typed event
//! queues instead of return values. Queues are cleared at the start of
//! every step, so after a step they hold exactly that frame's events.
//!
//! Example flow:
//! 1. Collision detection finds the player overlapping a coin → CollisionEvent
//! 2. Contact resolution removes the coin → CollectedEvent
//! 3. The host reads CollectedEvent → plays the coin sound

use super::entity::EntityId;
use super::state::GameState;
use crate::math::Vec2;
use crate::world::EntityKind;

/// A queue for events of a single type.
#[derive(Debug, Clone)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all game events.
#[derive(Debug, Clone, Default)]
pub struct Events {
    /// Player bounding box overlapped another active entity
    pub collision: EventQueue<CollisionEvent>,

    /// Collectible picked up
    pub collected: EventQueue<CollectedEvent>,

    /// Enemy defeated by landing on it
    pub stomped: EventQueue<StompEvent>,

    /// Player lost a life
    pub player_hit: EventQueue<PlayerHitEvent>,

    /// Player left the ground by jumping
    pub jumped: EventQueue<Vec2>,

    /// Spawner emitted an entity
    pub spawned: EventQueue<SpawnEvent>,

    /// Game state changed
    pub state_changed: EventQueue<StateChangeEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues. Called at the start of each step.
    pub fn clear_all(&mut self) {
        self.collision.clear();
        self.collected.clear();
        self.stomped.clear();
        self.player_hit.clear();
        self.jumped.clear();
        self.spawned.clear();
        self.state_changed.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// The player's box overlapped another entity's box this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub player: EntityId,
    pub other: EntityId,
    /// Copied since the other entity may be despawned by resolution
    pub other_kind: EntityKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectedEvent {
    pub item: EntityId,
    pub value: u32,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StompEvent {
    pub enemy: EntityId,
    pub value: u32,
    pub position: Vec2,
}

/// Why the player lost a life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCause {
    /// Touched a hazard or an enemy from the side
    Contact(EntityId),
    /// Fell onto a fatal floor
    Fall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHitEvent {
    pub cause: HitCause,
    pub lives_left: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnEvent {
    pub spawner: EntityId,
    pub entity: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChangeEvent {
    pub from: GameState,
    pub to: GameState,
}
