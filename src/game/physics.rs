//! Movement systems
//!
//! Per-step velocity updates: player steering, jumping, gravity, enemy
//! patrol and sprite animation. Position integration against the tile map
//! lives in `collision`.

use super::collision::TileCollision;
use super::entity::Entity;
use crate::input::{Buttons, InputState};
use crate::world::{EntityKind, MovementMode, PhysicsSettings};

/// Enemies swap walk frames this often (steps)
pub const ENEMY_FRAME_STEPS: u16 = 15;

/// Player sprite sheet layout
pub const PLAYER_FRAME_STAND: u16 = 0;
pub const PLAYER_FRAME_WALK: u16 = 1;
pub const PLAYER_FRAME_JUMP: u16 = 2;

/// Below this speed (px/s) friction stops the body outright
const REST_SPEED: f32 = 1.0;

/// Steer the player from this frame's input. Returns true when a jump
/// started this step.
///
/// `jump_buffer` counts down the frames a jump press stays pending, so a
/// press slightly before landing still jumps.
pub fn steer_player(
    player: &mut Entity,
    input: &InputState,
    mode: MovementMode,
    physics: &PhysicsSettings,
    jump_buffer: &mut u8,
) -> bool {
    let speed = if input.held(Buttons::RUN) {
        physics.run_speed
    } else {
        physics.move_speed
    };
    let h = input.horizontal();

    match mode {
        MovementMode::TopDown => {
            player.velocity.x = h * speed;
            player.velocity.y = input.vertical() * speed;
            if h != 0.0 {
                player.facing_left = h < 0.0;
            }
            false
        }
        MovementMode::Platformer => {
            if h != 0.0 {
                player.velocity.x = h * speed;
                player.facing_left = h < 0.0;
            } else {
                player.velocity.x *= physics.friction;
                if player.velocity.x.abs() < REST_SPEED {
                    player.velocity.x = 0.0;
                }
            }

            if input.pressed(Buttons::JUMP | Buttons::UP) {
                *jump_buffer = physics.jump_buffer_frames.max(1);
            }
            if *jump_buffer > 0 && player.on_ground {
                *jump_buffer = 0;
                player.velocity.y = -physics.jump_speed;
                player.on_ground = false;
                return true;
            }
            *jump_buffer = jump_buffer.saturating_sub(1);
            false
        }
    }
}

/// Accelerate downward, capped at the terminal fall speed
pub fn apply_gravity(entity: &mut Entity, physics: &PhysicsSettings, dt: f32) {
    if !entity.gravity {
        return;
    }
    entity.velocity.y = (entity.velocity.y + physics.gravity * dt).min(physics.max_fall_speed);
}

/// Whether the entity moves at all this step
pub fn is_moving(entity: &Entity) -> bool {
    entity.gravity || entity.velocity.x != 0.0 || entity.velocity.y != 0.0
}

/// Apply a tile move result. Enemies turn around at walls instead of
/// stopping.
pub fn apply_tile_collision(entity: &mut Entity, hit: &TileCollision) {
    let walking = entity.velocity.x;
    entity.position = hit.position;
    entity.velocity = hit.velocity;
    if entity.gravity {
        entity.on_ground = hit.grounded;
    }
    if hit.hit_wall && entity.kind == EntityKind::Enemy {
        entity.velocity.x = -walking;
        entity.facing_left = entity.velocity.x < 0.0;
    }
}

/// Pick the sprite frame for this step. `frames` is the sprite's frame
/// count; the result always wraps into it.
pub fn animate(entity: &mut Entity, mode: MovementMode, frames: u16) {
    let frames = frames.max(1);
    match entity.kind {
        EntityKind::Player => {
            let frame = if mode == MovementMode::Platformer && !entity.on_ground {
                PLAYER_FRAME_JUMP
            } else if entity.velocity.x.abs() >= REST_SPEED || entity.velocity.y.abs() >= REST_SPEED {
                PLAYER_FRAME_WALK
            } else {
                PLAYER_FRAME_STAND
            };
            entity.frame = frame % frames;
        }
        EntityKind::Enemy => {
            entity.anim_counter += 1;
            if entity.anim_counter >= ENEMY_FRAME_STEPS {
                entity.anim_counter = 0;
                entity.frame = (entity.frame + 1) % 2 % frames;
            }
        }
        _ => {}
    }
}
