//! Game Loop Core
//!
//! A small fixed-cadence 2D game core in the style of the workshop board
//! demos (Donkey Kong, Super Mario Bros, Snake).
//!
//! Key concepts:
//! - Entity: plain struct with a generational id, owned by the World
//! - World: creation-ordered entity storage with deferred despawn
//! - Event: per-step queues the host reads after `step` (sounds, effects)
//! - GameState: Title / Playing / Paused / GameOver / Won
//!
//! Design philosophy:
//! - Simple over flexible (a level holds tens of entities, not thousands)
//! - Everything that can fail is checked once, at `initialize`
//! - `step` never fails; `render` only fails when the surface does

pub mod camera;
pub mod collision;
pub mod entity;
pub mod event;
pub mod pacing;
pub mod physics;
pub mod runtime;
pub mod state;
pub mod world;

// Re-export main types
pub use camera::Camera;
pub use entity::{Entity, EntityId};
pub use event::{Events, HitCause};
pub use pacing::{FpsLimit, FramePacer};
pub use runtime::{FrameControl, GameLoop, SessionStats};
pub use state::{GameState, Trigger};
pub use world::World;
