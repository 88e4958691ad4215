//! Level configuration data
//!
//! A level is a static, serde-friendly description of the starting layout:
//! level size, tile map, entity start positions, physics tuning and the
//! win/lose rules. It is validated once by `validate_level` and then handed
//! to `GameLoop::initialize`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{Rect, Vec2};

/// What an entity is, which decides how the player's contact with it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The controlled character (exactly one per level)
    Player,
    /// Contact costs a life (barrels, spikes)
    Hazard,
    /// Walks and turns at walls; lethal from the side, stomped from above
    Enemy,
    /// Adds its value to the score and disappears
    Collectible,
    /// Reaching it wins the level
    Goal,
    /// Periodically emits copies of a template entity
    Spawner,
}

impl EntityKind {
    /// Kinds the player can be hurt by
    pub fn is_harmful(self) -> bool {
        matches!(self, EntityKind::Hazard | EntityKind::Enemy)
    }
}

/// How the player is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Side view: gravity, jumping, left/right steering
    #[default]
    Platformer,
    /// Top-down view: four-way steering, no gravity
    TopDown,
}

/// Physics tuning (pixels, seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Initial upward speed of a jump (px/s)
    pub jump_speed: f32,
    /// Horizontal speed at full deflection (px/s)
    pub move_speed: f32,
    /// Horizontal speed with Run held (px/s)
    pub run_speed: f32,
    /// Maximum falling speed (px/s)
    pub max_fall_speed: f32,
    /// Velocity kept per step when the stick is released (0..=1)
    pub friction: f32,
    /// Upward speed after stomping an enemy (px/s)
    pub stomp_bounce: f32,
    /// Frames a jump press stays buffered while airborne
    pub jump_buffer_frames: u8,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 540.0,
            jump_speed: 300.0,
            move_speed: 75.0,
            run_speed: 135.0,
            max_fall_speed: 300.0,
            friction: 0.8,
            stomp_bounce: 180.0,
            jump_buffer_frames: 3,
        }
    }
}

/// Condition that moves the game to Won
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WinCondition {
    /// Touch any Goal entity
    ReachGoal,
    /// Player's left edge reaches this x (side scrollers)
    ReachX(f32),
    /// No collectibles remain
    CollectAll,
}

/// Extra ways to lose a life besides touching something harmful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoseRules {
    /// Touching the bottom of the level costs a life (pits)
    pub floor_is_fatal: bool,
}

/// Tile grid drawn as background and used as solid geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMapConfig {
    /// Edge length of a square tile in pixels
    pub tile_size: u32,
    /// One string per row, one char per column. '.' and ' ' are empty.
    pub rows: Vec<String>,
    /// Char → sprite name for every solid tile char used in `rows`
    pub legend: BTreeMap<char, String>,
}

impl TileMapConfig {
    pub fn is_empty_char(c: char) -> bool {
        c == '.' || c == ' '
    }
}

/// Spawner parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Seconds between emissions
    pub interval: f32,
    /// Random extra delay in 0..jitter seconds, drawn from the level seed
    #[serde(default)]
    pub jitter: f32,
    /// Live emitted entities allowed at once
    #[serde(default = "default_max_alive")]
    pub max_alive: u16,
    /// Entity to emit; its x/y are offsets from the spawner's position
    pub template: Box<EntityConfig>,
}

fn default_max_alive() -> u16 {
    8
}

/// Starting description of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Sprite name, resolved against the sprite table at initialize
    pub sprite: String,
    /// Starting velocity (px/s)
    #[serde(default)]
    pub velocity: Vec2,
    /// Override whether gravity applies (default: Player and Enemy in
    /// platformer levels)
    #[serde(default)]
    pub gravity: Option<bool>,
    /// Score for collecting (Collectible) or stomping (Enemy)
    #[serde(default)]
    pub value: u32,
    /// Required for Spawner, forbidden otherwise
    #[serde(default)]
    pub spawn: Option<SpawnerConfig>,
}

impl EntityConfig {
    pub fn new(kind: EntityKind, x: f32, y: f32, width: f32, height: f32, sprite: &str) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
            sprite: sprite.to_string(),
            velocity: Vec2::ZERO,
            gravity: None,
            value: 0,
            spawn: None,
        }
    }

    pub fn with_velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = Some(gravity);
        self
    }

    pub fn with_spawner(mut self, spawn: SpawnerConfig) -> Self {
        self.spawn = Some(spawn);
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether gravity applies under the given movement mode
    pub fn uses_gravity(&self, mode: MovementMode) -> bool {
        self.gravity.unwrap_or(
            mode == MovementMode::Platformer
                && matches!(self.kind, EntityKind::Player | EntityKind::Enemy),
        )
    }
}

/// A complete level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    /// Level width in pixels
    pub width: u32,
    /// Level height in pixels
    pub height: u32,
    /// Visible window (width, height); defaults to the whole level
    #[serde(default)]
    pub viewport: Option<(u32, u32)>,
    /// Start on the Title screen instead of Playing
    #[serde(default)]
    pub title_screen: bool,
    #[serde(default)]
    pub movement: MovementMode,
    #[serde(default)]
    pub physics: PhysicsSettings,
    #[serde(default = "default_lives")]
    pub lives: u8,
    /// Invincibility frames granted after a hit
    #[serde(default = "default_invincible_frames")]
    pub invincible_frames: u16,
    #[serde(default)]
    pub tiles: Option<TileMapConfig>,
    /// Entities in creation order (also the draw order)
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    /// Required: the level is rejected without a win condition
    #[serde(default)]
    pub win: Option<WinCondition>,
    #[serde(default)]
    pub lose: LoseRules,
    /// Seed for spawner jitter
    #[serde(default)]
    pub seed: u64,
}

fn default_lives() -> u8 {
    1
}

fn default_invincible_frames() -> u16 {
    120
}

impl LevelConfig {
    /// An empty level of the given size with default rules and no win
    /// condition (which `validate_level` rejects until one is set)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            viewport: None,
            title_screen: false,
            movement: MovementMode::default(),
            physics: PhysicsSettings::default(),
            lives: default_lives(),
            invincible_frames: default_invincible_frames(),
            tiles: None,
            entities: Vec::new(),
            win: None,
            lose: LoseRules::default(),
            seed: 0,
        }
    }

    pub fn with_entity(mut self, entity: EntityConfig) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_win(mut self, win: WinCondition) -> Self {
        self.win = Some(win);
        self
    }

    pub fn with_movement(mut self, movement: MovementMode) -> Self {
        self.movement = movement;
        self
    }

    /// Visible window size, falling back to the full level
    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport.unwrap_or((self.width, self.height))
    }

    pub fn player(&self) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.kind == EntityKind::Player)
    }
}
