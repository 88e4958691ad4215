//! Collision System
//!
//! Two kinds of collision:
//! - Body vs tiles: axis-separated sweep that stops a moving box at solid
//!   tiles (x first, then y), reporting ground/wall/ceiling hits.
//! - Player vs entities: strict AABB overlap between the player and every
//!   other active entity, in creation order. No spatial partitioning; levels
//!   hold tens of entities.

use super::entity::{Entity, EntityId};
use crate::math::{Rect, Vec2};
use crate::world::{EntityKind, TileMap};

/// Result of moving a body through the tile map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCollision {
    /// Corrected top-left position
    pub position: Vec2,
    /// Velocity with blocked components zeroed
    pub velocity: Vec2,
    /// Landed on a tile this move
    pub grounded: bool,
    pub hit_wall: bool,
    pub hit_ceiling: bool,
}

/// Move `bounds` by `velocity * dt`, stopping at solid tiles.
///
/// X is resolved before Y so a body running into a wall while falling
/// slides down it instead of snagging on the tile corner.
pub fn move_against_tiles(map: Option<&TileMap>, bounds: Rect, velocity: Vec2, dt: f32) -> TileCollision {
    let mut pos = Vec2::new(bounds.x, bounds.y);
    let mut vel = velocity;
    let mut result = TileCollision {
        position: pos,
        velocity: vel,
        grounded: false,
        hit_wall: false,
        hit_ceiling: false,
    };

    // Horizontal
    pos.x += vel.x * dt;
    if let Some(map) = map {
        let moved = Rect::new(pos.x, pos.y, bounds.w, bounds.h);
        for tile in map.solids_overlapping(&moved) {
            if vel.x > 0.0 {
                pos.x = pos.x.min(tile.x - bounds.w);
                result.hit_wall = true;
            } else if vel.x < 0.0 {
                pos.x = pos.x.max(tile.right());
                result.hit_wall = true;
            }
        }
        if result.hit_wall {
            vel.x = 0.0;
        }
    }

    // Vertical
    pos.y += vel.y * dt;
    if let Some(map) = map {
        let moved = Rect::new(pos.x, pos.y, bounds.w, bounds.h);
        for tile in map.solids_overlapping(&moved) {
            if vel.y > 0.0 {
                pos.y = pos.y.min(tile.y - bounds.h);
                result.grounded = true;
            } else if vel.y < 0.0 {
                pos.y = pos.y.max(tile.bottom());
                result.hit_ceiling = true;
            }
        }
        if result.grounded || result.hit_ceiling {
            vel.y = 0.0;
        }
    }

    result.position = pos;
    result.velocity = vel;
    result
}

/// The player's box overlapped another entity's box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub other: EntityId,
    pub kind: EntityKind,
}

/// All active entities overlapping the player, in creation order.
///
/// An inactive player touches nothing.
pub fn player_contacts(player: &Entity, entities: &[Entity]) -> Vec<Contact> {
    if !player.active {
        return Vec::new();
    }
    let player_box = player.bounds();
    entities
        .iter()
        .filter(|e| e.active && e.id != player.id)
        .filter(|e| player_box.overlaps(&e.bounds()))
        .map(|e| Contact { other: e.id, kind: e.kind })
        .collect()
}

/// A falling player whose bottom edge was above the enemy's top before
/// this frame's move lands on it
pub fn is_stomp(player: &Entity, previous_bottom: f32, enemy: &Entity) -> bool {
    enemy.kind == EntityKind::Enemy
        && player.velocity.y > 0.0
        && previous_bottom <= enemy.position.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{SpriteId, SpriteInfo, SpriteTable};
    use crate::world::{TileMap, TileMapConfig};
    use std::collections::BTreeMap;

    fn sprite() -> SpriteId {
        SpriteTable::new().register("box", SpriteInfo::new(16, 16, 1))
    }

    fn body(index: u32, kind: EntityKind, x: f32, y: f32, w: f32, h: f32) -> Entity {
        Entity {
            id: EntityId::new(index, 0),
            kind,
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            width: w,
            height: h,
            sprite: sprite(),
            frame: 0,
            anim_counter: 0,
            active: true,
            gravity: false,
            on_ground: false,
            facing_left: false,
            value: 0,
            spawner: None,
        }
    }

    fn floor_map() -> TileMap {
        let mut sprites = SpriteTable::new();
        sprites.register("brick", SpriteInfo::new(16, 16, 1));
        let mut legend = BTreeMap::new();
        legend.insert('#', "brick".to_string());
        let config = TileMapConfig {
            tile_size: 16,
            rows: vec!["......".into(), "....#.".into(), "######".into()],
            legend,
        };
        TileMap::build(&config, &sprites).unwrap()
    }

    #[test]
    fn test_contact_iff_overlap_on_both_axes() {
        let player = body(0, EntityKind::Player, 50.0, 50.0, 10.0, 10.0);
        // Sweep another 10x10 box across offsets straddling every edge case
        let mut index = 1;
        for dx in -12i32..=12 {
            for dy in -12i32..=12 {
                let other = body(index, EntityKind::Hazard, 50.0 + dx as f32, 50.0 + dy as f32, 10.0, 10.0);
                index += 1;
                let x_overlap = dx.abs() < 10;
                let y_overlap = dy.abs() < 10;
                let contacts = player_contacts(&player, std::slice::from_ref(&other));
                assert_eq!(!contacts.is_empty(), x_overlap && y_overlap, "dx={} dy={}", dx, dy);
            }
        }
    }

    #[test]
    fn test_contacts_skip_inactive_and_self() {
        let player = body(0, EntityKind::Player, 0.0, 0.0, 16.0, 16.0);
        let mut ghost = body(1, EntityKind::Hazard, 0.0, 0.0, 16.0, 16.0);
        ghost.active = false;
        let coin = body(2, EntityKind::Collectible, 4.0, 4.0, 8.0, 8.0);
        let goal = body(3, EntityKind::Goal, 8.0, 8.0, 16.0, 16.0);
        let all = vec![player.clone(), ghost, coin, goal];

        let contacts = player_contacts(&player, &all);
        let kinds: Vec<_> = contacts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Collectible, EntityKind::Goal]);
    }

    #[test]
    fn test_landing_on_floor() {
        let map = floor_map();
        let bounds = Rect::new(0.0, 10.0, 16.0, 16.0);
        let hit = move_against_tiles(Some(&map), bounds, Vec2::new(0.0, 300.0), 0.1);
        assert!(hit.grounded);
        assert_eq!(hit.position.y, 16.0);
        assert_eq!(hit.velocity.y, 0.0);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let map = floor_map();
        // Standing on the floor, left of the block at column 4
        let bounds = Rect::new(40.0, 16.0, 16.0, 16.0);
        let hit = move_against_tiles(Some(&map), bounds, Vec2::new(200.0, 0.0), 0.1);
        assert!(hit.hit_wall);
        assert_eq!(hit.position.x, 48.0);
        assert_eq!(hit.velocity.x, 0.0);
        assert!(!hit.grounded);
    }

    #[test]
    fn test_head_bump() {
        let map = floor_map();
        // Under the block at column 4 (y 16..32), jumping up from below is
        // impossible here, so use the floor row from underneath instead
        let bounds = Rect::new(0.0, 50.0, 16.0, 16.0);
        let hit = move_against_tiles(Some(&map), bounds, Vec2::new(0.0, -200.0), 0.1);
        assert!(hit.hit_ceiling);
        assert_eq!(hit.position.y, 48.0);
    }

    #[test]
    fn test_no_map_moves_freely() {
        let hit = move_against_tiles(None, Rect::new(0.0, 0.0, 4.0, 4.0), Vec2::new(10.0, 20.0), 0.5);
        assert_eq!(hit.position, Vec2::new(5.0, 10.0));
        assert!(!hit.grounded && !hit.hit_wall && !hit.hit_ceiling);
    }

    #[test]
    fn test_stomp_needs_falling_from_above() {
        // Player now sunk 6px into the enemy, was 2px above it last frame
        let mut player = body(0, EntityKind::Player, 0.0, 0.0, 16.0, 16.0);
        let enemy = body(1, EntityKind::Enemy, 0.0, 10.0, 16.0, 16.0);
        assert!(!is_stomp(&player, 8.0, &enemy));
        player.velocity.y = 50.0;
        assert!(is_stomp(&player, 8.0, &enemy));
        // Walked in from the side
        assert!(!is_stomp(&player, 16.0, &enemy));
        let hazard = body(2, EntityKind::Hazard, 0.0, 10.0, 16.0, 16.0);
        assert!(!is_stomp(&player, 8.0, &hazard));
    }
}
