//! Game Loop Runtime
//!
//! `GameLoop` owns everything that changes while a level runs: the entity
//! collection, session stats, the state machine and the camera. Each frame
//! is *sample input → step → render*:
//!
//! - `step` applies state-machine input, then (only while Playing) steering,
//!   gravity, tile collision, spawners, bounds, player-vs-entity contacts
//!   and the win/lose checks. It never fails.
//! - `render` is read-only over the game and only talks to the surface.
//!
//! Contacts that hurt the player are resolved before the win check, so a
//! frame touching both a hazard and the goal can never end in Won.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::camera::Camera;
use super::collision::{is_stomp, move_against_tiles, player_contacts};
use super::entity::{Entity, EntityId, SpawnerState};
use super::event::{
    CollectedEvent, CollisionEvent, Events, HitCause, PlayerHitEvent, SpawnEvent,
    StateChangeEvent, StompEvent,
};
use super::pacing::{FramePacer, MAX_STEP};
use super::physics::{animate, apply_gravity, apply_tile_collision, is_moving, steer_player};
use super::state::{GameState, Trigger};
use super::world::World;
use crate::asset::SpriteTable;
use crate::display::DisplaySurface;
use crate::error::CollaboratorError;
use crate::input::{Buttons, InputSource, InputState};
use crate::math::Vec2;
use crate::world::{
    validate_level, ConfigError, EntityConfig, EntityKind, LevelConfig, MovementMode, TileMap,
    WinCondition,
};

/// Score for stomping an enemy that has no value of its own
pub const STOMP_SCORE: u32 = 100;

/// The player blinks in windows of this many frames while invincible
const BLINK_FRAMES: u16 = 5;

/// Rough width of one HUD glyph, for centering the state banner
const GLYPH_WIDTH: i32 = 6;

/// Score, lives and friends for the running level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub score: u32,
    /// Collectibles picked up
    pub collected: u32,
    pub lives: u8,
    /// Frames of hit immunity left
    pub invincible: u16,
}

/// What the frame driver should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Quit,
}

pub struct GameLoop {
    sprites: SpriteTable,
    /// Last successfully initialized level (kept across reset for restarts)
    level: Option<LevelConfig>,
    tiles: Option<TileMap>,
    world: World,
    events: Events,
    state: GameState,
    stats: SessionStats,
    camera: Camera,
    rng: StdRng,
    jump_buffer: u8,
    /// Simulated steps since the level started
    frame: u64,
    player_start: Vec2,
}

impl GameLoop {
    /// A loop in the Title state with no level. `sprites` is the table
    /// entity and tile sprite names resolve against.
    pub fn new(sprites: SpriteTable) -> Self {
        Self {
            sprites,
            level: None,
            tiles: None,
            world: World::new(),
            events: Events::new(),
            state: GameState::Title,
            stats: SessionStats::default(),
            camera: Camera::default(),
            rng: StdRng::seed_from_u64(0),
            jump_buffer: 0,
            frame: 0,
            player_start: Vec2::ZERO,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load a level and start it.
    ///
    /// Everything that can fail (validation, sprite names, tile legend) is
    /// checked before anything is touched, so on error the loop is left
    /// exactly as it was.
    pub fn initialize(&mut self, level: &LevelConfig) -> Result<(), ConfigError> {
        validate_level(level)?;
        let tiles = level
            .tiles
            .as_ref()
            .map(|t| TileMap::build(t, &self.sprites))
            .transpose()?;
        let mut rng = StdRng::seed_from_u64(level.seed);
        let entities = build_entities(level, &self.sprites, &mut rng)?;

        self.level = Some(level.clone());
        self.tiles = tiles;
        self.start_level(entities, rng);

        let state = if level.title_screen { GameState::Title } else { GameState::Playing };
        self.set_state(state);
        log::info!(
            "Level '{}' initialized: {}x{}, {} entities",
            level.name,
            level.width,
            level.height,
            self.world.len()
        );
        Ok(())
    }

    /// Back to Title with an empty entity collection and cleared stats.
    /// The last level is remembered so Start can bring it back.
    pub fn reset(&mut self) {
        self.world.clear();
        self.events.clear_all();
        self.stats = SessionStats::default();
        self.jump_buffer = 0;
        self.frame = 0;
        self.camera = Camera::default();
        self.set_state(GameState::Title);
    }

    /// Rebuild the stored level from scratch (Start on the title screen)
    fn respawn_level(&mut self) -> bool {
        let Some(level) = self.level.as_ref() else {
            log::warn!("Start pressed with no level loaded");
            return false;
        };
        let mut rng = StdRng::seed_from_u64(level.seed);
        match build_entities(level, &self.sprites, &mut rng) {
            Ok(entities) => {
                self.start_level(entities, rng);
                true
            }
            Err(e) => {
                log::error!("Failed to respawn level: {}", e);
                false
            }
        }
    }

    fn start_level(&mut self, entities: Vec<Entity>, rng: StdRng) {
        self.world.clear();
        self.events.clear_all();
        for entity in entities {
            self.world.spawn(entity);
        }
        self.rng = rng;
        self.jump_buffer = 0;
        self.frame = 0;

        let Some(level) = self.level.as_ref() else { return };
        self.stats = SessionStats {
            lives: level.lives,
            ..SessionStats::default()
        };
        self.camera = Camera::new(level.viewport_size(), (level.width, level.height));
        if let Some(player) = self.world.player() {
            self.player_start = player.position;
            self.camera.snap_to(player.bounds().center());
        }
    }

    // =========================================================================
    // State machine
    // =========================================================================

    fn fire(&mut self, trigger: Trigger) -> bool {
        match self.state.transition(trigger) {
            Some(next) => {
                self.set_state(next);
                true
            }
            None => false,
        }
    }

    fn set_state(&mut self, next: GameState) {
        if next == self.state {
            return;
        }
        log::info!("Game state: {:?} -> {:?}", self.state, next);
        self.events.state_changed.send(StateChangeEvent { from: self.state, to: next });
        self.state = next;
    }

    // =========================================================================
    // Step
    // =========================================================================

    /// Advance the game by one frame.
    ///
    /// `dt` is in seconds; negative or non-finite values count as zero and
    /// long stalls are cut to `MAX_STEP`.
    pub fn step(&mut self, input: &InputState, dt: f32) {
        self.events.clear_all();
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_STEP) } else { 0.0 };

        match self.state {
            GameState::Title => {
                if input.pressed(Buttons::START) && self.respawn_level() {
                    self.fire(Trigger::Start);
                }
            }
            GameState::Paused => {
                if input.pressed(Buttons::PAUSE) {
                    self.fire(Trigger::Pause);
                }
            }
            GameState::GameOver | GameState::Won => {
                if input.pressed(Buttons::START) {
                    self.fire(Trigger::Restart);
                }
            }
            GameState::Playing => {
                if input.pressed(Buttons::PAUSE) {
                    self.fire(Trigger::Pause);
                } else {
                    self.simulate(input, dt);
                }
            }
        }
    }

    fn simulate(&mut self, input: &InputState, dt: f32) {
        let Some(level) = self.level.as_ref() else { return };
        let mode = level.movement;
        let physics = level.physics;
        let floor_is_fatal = level.lose.floor_is_fatal;
        let win = level.win;
        let (level_w, level_h) = (level.width as f32, level.height as f32);

        self.frame += 1;
        self.stats.invincible = self.stats.invincible.saturating_sub(1);

        // Player control
        let previous_bottom = self.world.player().map(|p| p.bounds().bottom()).unwrap_or(0.0);
        if let Some(player) = self.world.player_mut() {
            if steer_player(player, input, mode, &physics, &mut self.jump_buffer) {
                self.events.jumped.send(player.position);
            }
        }

        // Movement against tiles
        let tiles = self.tiles.as_ref();
        for e in self.world.iter_mut() {
            if !e.active || e.kind == EntityKind::Spawner || !is_moving(e) {
                continue;
            }
            apply_gravity(e, &physics, dt);
            let hit = move_against_tiles(tiles, e.bounds(), e.velocity, dt);
            apply_tile_collision(e, &hit);
        }

        self.run_spawners(mode, dt);
        let fell = self.enforce_bounds(level_w, level_h, floor_is_fatal);

        let sprites = &self.sprites;
        for e in self.world.iter_mut() {
            animate(e, mode, sprites.frame_count(e.sprite));
        }

        // Contact resolution. Anything harmful blocks the win check.
        let mut blocked = fell;
        let mut reached_goal = false;
        if fell {
            self.lose_life(HitCause::Fall);
            if self.state == GameState::Playing {
                let start = self.player_start;
                if let Some(player) = self.world.player_mut() {
                    player.position = start;
                    player.velocity = Vec2::ZERO;
                }
            }
        } else if let Some(player) = self.world.player().cloned() {
            let mut hurt_by = None;
            for contact in player_contacts(&player, self.world.as_slice()) {
                self.events.collision.send(CollisionEvent {
                    player: player.id,
                    other: contact.other,
                    other_kind: contact.kind,
                });
                log::debug!("Player touched {:?} {:?}", contact.kind, contact.other);

                let Some(other) = self.world.get(contact.other) else { continue };
                let (value, position) = (other.value, other.position);
                let stomp = is_stomp(&player, previous_bottom, other);
                match contact.kind {
                    EntityKind::Enemy if stomp => {
                        let value = if value > 0 { value } else { STOMP_SCORE };
                        self.stats.score = self.stats.score.saturating_add(value);
                        self.remove_entity(contact.other);
                        self.events.stomped.send(StompEvent { enemy: contact.other, value, position });
                        if let Some(p) = self.world.player_mut() {
                            p.velocity.y = -physics.stomp_bounce;
                            p.on_ground = false;
                        }
                    }
                    EntityKind::Hazard | EntityKind::Enemy => {
                        blocked = true;
                        hurt_by = hurt_by.or(Some(contact.other));
                    }
                    EntityKind::Collectible => {
                        self.stats.score = self.stats.score.saturating_add(value);
                        self.stats.collected += 1;
                        self.remove_entity(contact.other);
                        self.events.collected.send(CollectedEvent { item: contact.other, value, position });
                    }
                    EntityKind::Goal => reached_goal = true,
                    EntityKind::Player | EntityKind::Spawner => {}
                }
            }
            if let Some(id) = hurt_by {
                if self.stats.invincible == 0 {
                    self.lose_life(HitCause::Contact(id));
                }
            }
        }

        self.world.apply_despawns();

        if self.state == GameState::Playing && !blocked {
            let won = match win {
                Some(WinCondition::ReachGoal) => reached_goal,
                Some(WinCondition::ReachX(x)) => self.world.player().is_some_and(|p| p.position.x >= x),
                Some(WinCondition::CollectAll) => {
                    !self.world.iter().any(|e| e.kind == EntityKind::Collectible)
                }
                None => false,
            };
            if won {
                self.fire(Trigger::GoalReached);
            }
        }

        if let Some(player) = self.world.player() {
            self.camera.follow(player.bounds().center());
        }
    }

    fn remove_entity(&mut self, id: EntityId) {
        if let Some(e) = self.world.get_mut(id) {
            e.active = false;
        }
        self.world.despawn(id);
    }

    fn lose_life(&mut self, cause: HitCause) {
        self.stats.lives = self.stats.lives.saturating_sub(1);
        self.events.player_hit.send(PlayerHitEvent { cause, lives_left: self.stats.lives });
        log::info!("Player hit ({:?}), {} lives left", cause, self.stats.lives);
        if self.stats.lives == 0 {
            self.fire(Trigger::PlayerDied);
        } else {
            self.stats.invincible = self.level.as_ref().map_or(0, |l| l.invincible_frames);
        }
    }

    /// Count down every spawner and emit templates that are due
    fn run_spawners(&mut self, mode: MovementMode, dt: f32) {
        let Some(level) = self.level.as_ref() else { return };
        let live: Vec<EntityId> = self.world.iter().map(|e| e.id).collect();
        let rng = &mut self.rng;
        let mut due = Vec::new();

        for e in self.world.iter_mut() {
            if !e.active {
                continue;
            }
            let (spawner_id, origin) = (e.id, e.position);
            let Some(state) = e.spawner.as_mut() else { continue };
            let Some(spawn) = level.entities.get(state.config_index).and_then(|c| c.spawn.as_ref()) else {
                continue;
            };
            state.alive.retain(|id| live.contains(id));
            state.countdown -= dt;
            if state.countdown > 0.0 {
                continue;
            }
            state.countdown += spawn.interval + jitter(rng, spawn.jitter);
            if state.countdown <= 0.0 {
                state.countdown = spawn.interval;
            }
            if state.alive.len() < spawn.max_alive as usize {
                due.push((spawner_id, origin, state.config_index));
            }
        }

        for (spawner_id, origin, config_index) in due {
            let Some(template) = level.entities.get(config_index).and_then(|c| c.spawn.as_ref()) else {
                continue;
            };
            let entity = match build_entity(&template.template, mode, origin, config_index, &self.sprites, &mut self.rng) {
                Ok(entity) => entity,
                Err(e) => {
                    log::warn!("Spawner {:?} skipped an emission: {}", spawner_id, e);
                    continue;
                }
            };
            let id = self.world.spawn(entity);
            if let Some(state) = self.world.get_mut(spawner_id).and_then(|s| s.spawner.as_mut()) {
                state.alive.push(id);
            }
            self.events.spawned.send(SpawnEvent { spawner: spawner_id, entity: id });
            log::debug!("Spawner {:?} emitted {:?}", spawner_id, id);
        }
    }

    /// Keep everything inside the level. The player is clamped; any other
    /// entity is removed once it is outside. Returns true when the player hit
    /// a fatal floor.
    fn enforce_bounds(&mut self, level_w: f32, level_h: f32, floor_is_fatal: bool) -> bool {
        let mut fell = false;
        let mut gone = Vec::new();

        for e in self.world.iter_mut() {
            if !e.active {
                continue;
            }
            if e.is_player() {
                if floor_is_fatal && e.velocity.y > 0.0 && e.position.y + e.height >= level_h {
                    fell = true;
                }
                e.position.x = e.position.x.clamp(0.0, (level_w - e.width).max(0.0));
                if e.position.y < 0.0 {
                    e.position.y = 0.0;
                    e.velocity.y = e.velocity.y.max(0.0);
                }
                if e.position.y + e.height > level_h {
                    e.position.y = (level_h - e.height).max(0.0);
                    e.velocity.y = e.velocity.y.min(0.0);
                    if e.gravity {
                        e.on_ground = true;
                    }
                }
                continue;
            }
            // The level floor catches falling bodies unless it is a pit
            if is_moving(e) && !floor_is_fatal && e.gravity && e.position.y + e.height > level_h {
                e.position.y = level_h - e.height;
                e.velocity.y = 0.0;
                e.on_ground = true;
            }
            let b = e.bounds();
            if b.x < 0.0 || b.y < 0.0 || b.right() > level_w || b.bottom() > level_h {
                gone.push(e.id);
            }
        }

        for id in gone {
            log::debug!("{:?} left the level", id);
            self.remove_entity(id);
        }
        self.world.apply_despawns();
        fell
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// Draw the frame: clear, tiles, entities in creation order, then the
    /// HUD. With no entities (after `reset`) only the state banner is drawn.
    /// Surface errors are returned unchanged.
    pub fn render<S: DisplaySurface + ?Sized>(&self, surface: &mut S) -> Result<(), CollaboratorError> {
        surface.clear()?;
        // After reset the title screen is just the banner
        let showing_level = !self.world.is_empty();

        if let Some(tiles) = self.tiles.as_ref().filter(|_| showing_level) {
            for tile in tiles.tiles() {
                let rect = tiles.tile_rect(tile.col, tile.row);
                if !self.camera.is_visible(&rect) {
                    continue;
                }
                let (x, y) = self.camera.to_screen(Vec2::new(rect.x, rect.y));
                surface.blit(tile.sprite, 0, x, y, false)?;
            }
        }

        let blinking = self.stats.invincible > 0 && (self.stats.invincible / BLINK_FRAMES) % 2 == 1;
        for e in self.world.iter() {
            if !e.active || (blinking && e.is_player()) || !self.camera.is_visible(&e.bounds()) {
                continue;
            }
            let (x, y) = self.camera.to_screen(e.position);
            surface.blit(e.sprite, e.frame, x, y, e.facing_left)?;
        }

        self.render_hud(surface)
    }

    fn render_hud<S: DisplaySurface + ?Sized>(&self, surface: &mut S) -> Result<(), CollaboratorError> {
        let (view_w, view_h) = (self.camera.viewport_w as i32, self.camera.viewport_h as i32);
        if self.level.is_some() && !self.world.is_empty() {
            surface.text(2, 2, &format!("SCORE {:05}", self.stats.score))?;
            let lives = format!("LIVES {}", self.stats.lives);
            surface.text(view_w - 2 - lives.len() as i32 * GLYPH_WIDTH, 2, &lives)?;
        }
        let banner = self.state.label();
        if !banner.is_empty() {
            let x = (view_w - banner.len() as i32 * GLYPH_WIDTH) / 2;
            surface.text(x.max(0), view_h / 2, banner)?;
        }
        Ok(())
    }

    // =========================================================================
    // Frame driver
    // =========================================================================

    /// One full frame: poll input, step, render.
    pub fn run_frame<I, S>(&mut self, input: &mut I, surface: &mut S, dt: f32) -> Result<FrameControl, CollaboratorError>
    where
        I: InputSource + ?Sized,
        S: DisplaySurface + ?Sized,
    {
        let sample = input.poll()?;
        if sample.quit_requested() {
            return Ok(FrameControl::Quit);
        }
        self.step(&sample, dt);
        self.render(surface)?;
        Ok(FrameControl::Continue)
    }

    /// Run frames at the pacer's rate until Quit. Returns the number of
    /// frames completed.
    pub fn run<I, S>(&mut self, input: &mut I, surface: &mut S, pacer: &mut FramePacer) -> Result<u64, CollaboratorError>
    where
        I: InputSource + ?Sized,
        S: DisplaySurface + ?Sized,
    {
        let mut frames = 0;
        loop {
            let dt = pacer.begin_frame();
            if self.run_frame(input, surface, dt)? == FrameControl::Quit {
                log::info!("Quit after {} frames", frames);
                return Ok(frames);
            }
            frames += 1;
            pacer.end_frame();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Events from the most recent step
    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn score(&self) -> u32 {
        self.stats.score
    }

    pub fn lives(&self) -> u8 {
        self.stats.lives
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn level(&self) -> Option<&LevelConfig> {
        self.level.as_ref()
    }

    pub fn tiles(&self) -> Option<&TileMap> {
        self.tiles.as_ref()
    }

    pub fn sprites(&self) -> &SpriteTable {
        &self.sprites
    }

    /// Steps simulated since the level (re)started
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn jitter(rng: &mut StdRng, max: f32) -> f32 {
    if max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}

/// Entity from its config, offset by `origin` (spawner templates are
/// relative to the spawner)
fn build_entity(
    config: &EntityConfig,
    mode: MovementMode,
    origin: Vec2,
    config_index: usize,
    sprites: &SpriteTable,
    rng: &mut StdRng,
) -> Result<Entity, ConfigError> {
    let sprite = sprites
        .resolve(&config.sprite)
        .ok_or_else(|| ConfigError::UnknownSprite(config.sprite.clone()))?;
    let spawner = match &config.spawn {
        Some(spawn) => {
            sprites
                .resolve(&spawn.template.sprite)
                .ok_or_else(|| ConfigError::UnknownSprite(spawn.template.sprite.clone()))?;
            Some(SpawnerState {
                config_index,
                countdown: spawn.interval + jitter(rng, spawn.jitter),
                alive: Vec::new(),
            })
        }
        None => None,
    };

    Ok(Entity {
        id: World::placeholder_id(),
        kind: config.kind,
        position: origin + Vec2::new(config.x, config.y),
        velocity: config.velocity,
        width: config.width,
        height: config.height,
        sprite,
        frame: 0,
        anim_counter: 0,
        active: true,
        gravity: config.uses_gravity(mode),
        on_ground: false,
        facing_left: config.velocity.x < 0.0,
        value: config.value,
        spawner,
    })
}

/// All level entities in declaration order
fn build_entities(level: &LevelConfig, sprites: &SpriteTable, rng: &mut StdRng) -> Result<Vec<Entity>, ConfigError> {
    level
        .entities
        .iter()
        .enumerate()
        .map(|(i, config)| build_entity(config, level.movement, Vec2::ZERO, i, sprites, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{SpriteId, SpriteInfo};
    use crate::display::{DrawCall, RecordingSurface};
    use crate::input::ScriptedInput;
    use crate::game::pacing::FpsLimit;
    use crate::world::{SpawnerConfig, TileMapConfig};
    use std::collections::BTreeMap;

    const DT: f32 = 1.0 / 30.0;

    fn sprites() -> SpriteTable {
        let mut table = SpriteTable::new();
        table.register("player", SpriteInfo::new(16, 16, 3));
        table.register("hazard", SpriteInfo::new(16, 16, 1));
        table.register("goal", SpriteInfo::new(16, 16, 1));
        table.register("coin", SpriteInfo::new(8, 8, 1));
        table.register("enemy", SpriteInfo::new(16, 16, 2));
        table.register("brick", SpriteInfo::new(16, 16, 1));
        table.register("kong", SpriteInfo::new(32, 32, 1));
        table
    }

    fn id_of(game: &GameLoop, name: &str) -> SpriteId {
        game.sprites().resolve(name).unwrap()
    }

    fn player_at(x: f32, y: f32) -> EntityConfig {
        EntityConfig::new(EntityKind::Player, x, y, 16.0, 16.0, "player")
    }

    fn hazard_at(x: f32, y: f32) -> EntityConfig {
        EntityConfig::new(EntityKind::Hazard, x, y, 16.0, 16.0, "hazard")
    }

    fn goal_at(x: f32, y: f32) -> EntityConfig {
        EntityConfig::new(EntityKind::Goal, x, y, 16.0, 16.0, "goal")
    }

    fn started(level: &LevelConfig) -> GameLoop {
        let mut game = GameLoop::new(sprites());
        game.initialize(level).unwrap();
        game
    }

    fn assert_in_bounds(game: &GameLoop) {
        let level = game.level().unwrap();
        for e in game.world().iter() {
            let b = e.bounds();
            assert!(
                b.x >= 0.0 && b.y >= 0.0 && b.right() <= level.width as f32 && b.bottom() <= level.height as f32,
                "{:?} out of bounds at {:?}",
                e.kind,
                b
            );
        }
    }

    #[test]
    fn test_player_on_hazard_is_game_over() {
        let level = LevelConfig::new(64, 64)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(hazard_at(0.0, 0.0))
            .with_entity(goal_at(40.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        assert_eq!(game.state(), GameState::Playing);

        game.step(&InputState::idle(), DT);
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.lives(), 0);

        let events = game.events();
        let hit: Vec<_> = events.collision.iter().map(|c| c.other_kind).collect();
        assert_eq!(hit, vec![EntityKind::Hazard]);
        assert_eq!(events.player_hit.len(), 1);
        assert_eq!(events.state_changed.iter().last().map(|c| c.to), Some(GameState::GameOver));
    }

    #[test]
    fn test_walking_into_goal_wins() {
        let level = LevelConfig::new(128, 128)
            .with_movement(MovementMode::TopDown)
            .with_entity(EntityConfig::new(EntityKind::Player, 10.0, 10.0, 8.0, 8.0, "player"))
            .with_entity(EntityConfig::new(EntityKind::Goal, 100.0, 100.0, 8.0, 8.0, "goal"))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);

        let mut steps = 0;
        while game.state() == GameState::Playing && steps < 200 {
            game.step(&InputState::holding(Buttons::RIGHT | Buttons::DOWN), DT);
            steps += 1;
        }
        assert_eq!(game.state(), GameState::Won);

        // Won is terminal until Start
        game.step(&InputState::holding(Buttons::LEFT), DT);
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn test_missing_win_condition_is_rejected() {
        let level = LevelConfig::new(64, 64)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(40.0, 40.0));
        let mut game = GameLoop::new(sprites());
        let err = game.initialize(&level).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("win")));
        assert!(game.world().is_empty());
        assert_eq!(game.state(), GameState::Title);
        assert!(game.level().is_none());
    }

    #[test]
    fn test_unknown_sprite_leaves_loop_untouched() {
        let good = LevelConfig::new(64, 64)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(40.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&good);

        let bad = good.clone().with_entity(EntityConfig::new(EntityKind::Hazard, 20.0, 0.0, 8.0, 8.0, "nope"));
        let err = game.initialize(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSprite(ref s) if s == "nope"));
        assert_eq!(game.world().len(), 2);
        assert_eq!(game.level(), Some(&good));
    }

    #[test]
    fn test_pause_toggles_and_freezes() {
        let level = LevelConfig::new(128, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(100.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);

        game.step(&InputState::pressing(Buttons::PAUSE), DT);
        assert_eq!(game.state(), GameState::Paused);

        let before = game.world().player().unwrap().position;
        for _ in 0..10 {
            game.step(&InputState::holding(Buttons::PAUSE | Buttons::RIGHT), DT);
        }
        assert_eq!(game.state(), GameState::Paused);
        assert_eq!(game.world().player().unwrap().position, before);

        game.step(&InputState::pressing(Buttons::PAUSE), DT);
        assert_eq!(game.state(), GameState::Playing);
        game.step(&InputState::holding(Buttons::RIGHT), DT);
        assert!(game.world().player().unwrap().position.x > before.x);
    }

    #[test]
    fn test_hazard_beats_goal_in_same_frame() {
        let level = LevelConfig::new(64, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(0.0, 0.0))
            .with_entity(hazard_at(0.0, 0.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        game.step(&InputState::idle(), DT);
        assert_eq!(game.state(), GameState::GameOver);

        // With lives to spare the hit is taken and the goal still ignored
        let mut spare = level.clone();
        spare.lives = 3;
        let mut game = started(&spare);
        for _ in 0..5 {
            game.step(&InputState::idle(), DT);
            assert_ne!(game.state(), GameState::Won);
        }
        assert_eq!(game.lives(), 2);
    }

    fn busy_level() -> LevelConfig {
        let mut legend = BTreeMap::new();
        legend.insert('#', "brick".to_string());
        let mut level = LevelConfig::new(320, 96)
            .with_entity(player_at(16.0, 48.0))
            .with_entity(
                EntityConfig::new(EntityKind::Spawner, 200.0, 16.0, 32.0, 32.0, "kong").with_spawner(SpawnerConfig {
                    interval: 0.4,
                    jitter: 0.3,
                    max_alive: 4,
                    template: Box::new(
                        EntityConfig::new(EntityKind::Hazard, 0.0, 34.0, 12.0, 12.0, "hazard")
                            .with_velocity(-60.0, 0.0)
                            .with_gravity(true),
                    ),
                }),
            )
            .with_entity(EntityConfig::new(EntityKind::Enemy, 120.0, 60.0, 16.0, 16.0, "enemy").with_velocity(30.0, 0.0))
            .with_entity(EntityConfig::new(EntityKind::Collectible, 60.0, 50.0, 8.0, 8.0, "coin").with_value(10))
            .with_win(WinCondition::ReachX(300.0));
        level.seed = 7;
        level.lives = 5;
        level.tiles = Some(TileMapConfig {
            tile_size: 16,
            rows: vec![
                "....................".into(),
                "....................".into(),
                "....................".into(),
                "....................".into(),
                "..........#.........".into(),
                "####################".into(),
            ],
            legend,
        });
        level
    }

    fn script() -> Vec<InputState> {
        (0..90)
            .map(|i| match i % 30 {
                0 => InputState::pressing(Buttons::JUMP | Buttons::RIGHT),
                1..=14 => InputState::holding(Buttons::RIGHT),
                15 => InputState::pressing(Buttons::LEFT),
                _ => InputState::holding(Buttons::LEFT | Buttons::RUN),
            })
            .collect()
    }

    fn snapshot(game: &GameLoop) -> (Vec<(EntityKind, Vec2, Vec2)>, SessionStats, GameState) {
        let entities = game.world().iter().map(|e| (e.kind, e.position, e.velocity)).collect();
        (entities, game.stats(), game.state())
    }

    #[test]
    fn test_reset_then_initialize_replays_identically() {
        let level = busy_level();
        let mut game = started(&level);
        for input in script() {
            game.step(&input, DT);
        }
        let first = snapshot(&game);
        assert!(game.world().iter().any(|e| e.kind == EntityKind::Hazard), "spawner never fired");

        game.reset();
        assert_eq!(game.state(), GameState::Title);
        assert!(game.world().is_empty());
        assert_eq!(game.stats(), SessionStats::default());

        game.initialize(&level).unwrap();
        for input in script() {
            game.step(&input, DT);
        }
        assert_eq!(snapshot(&game), first);
    }

    #[test]
    fn test_entities_stay_in_bounds() {
        let level = busy_level();
        let mut game = started(&level);
        for _ in 0..300 {
            game.step(&InputState::holding(Buttons::RIGHT | Buttons::RUN), DT);
            assert_in_bounds(&game);
            if game.state() != GameState::Playing {
                break;
            }
        }

        let mut game = started(&level);
        for _ in 0..300 {
            game.step(&InputState::holding(Buttons::LEFT), DT);
            assert_in_bounds(&game);
        }
        assert_eq!(game.world().player().unwrap().position.x, 0.0);
    }

    #[test]
    fn test_spawner_template_off_the_level_is_rejected() {
        let level = LevelConfig::new(200, 100)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(
                EntityConfig::new(EntityKind::Spawner, 100.0, 10.0, 16.0, 16.0, "kong").with_spawner(SpawnerConfig {
                    interval: 0.1,
                    jitter: 0.0,
                    max_alive: 2,
                    template: Box::new(EntityConfig::new(EntityKind::Hazard, 0.0, 500.0, 8.0, 8.0, "hazard")),
                }),
            )
            .with_entity(goal_at(180.0, 80.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = GameLoop::new(sprites());
        assert!(matches!(game.initialize(&level), Err(ConfigError::Invalid(_))));
        assert!(game.world().is_empty());
    }

    #[test]
    fn test_resting_entity_outside_the_level_is_removed() {
        let level = LevelConfig::new(128, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(hazard_at(64.0, 0.0))
            .with_entity(goal_at(100.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        let hazard = game.world().iter().find(|e| e.kind == EntityKind::Hazard).map(|e| e.id).unwrap();
        if let Some(e) = game.world.get_mut(hazard) {
            e.position = Vec2::new(64.0, 500.0);
        }
        assert!(!is_moving(game.world().get(hazard).unwrap()));

        game.step(&InputState::idle(), DT);
        assert!(game.world().get(hazard).is_none());
        assert_in_bounds(&game);
    }

    #[test]
    fn test_enemy_walking_off_the_edge_is_removed() {
        let level = LevelConfig::new(100, 64)
            .with_entity(player_at(0.0, 48.0))
            .with_entity(EntityConfig::new(EntityKind::Enemy, 70.0, 48.0, 16.0, 16.0, "enemy").with_velocity(60.0, 0.0))
            .with_entity(goal_at(0.0, 0.0).with_gravity(false))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        for _ in 0..30 {
            game.step(&InputState::idle(), DT);
        }
        assert!(!game.world().iter().any(|e| e.kind == EntityKind::Enemy));
    }

    #[test]
    fn test_stomp_removes_enemy_and_scores() {
        let level = LevelConfig::new(200, 100)
            .with_entity(player_at(50.0, 40.0))
            .with_entity(EntityConfig::new(EntityKind::Enemy, 50.0, 84.0, 16.0, 16.0, "enemy"))
            .with_entity(goal_at(180.0, 0.0).with_gravity(false))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);

        let mut stomped = false;
        for _ in 0..60 {
            game.step(&InputState::idle(), DT);
            if !game.events().stomped.is_empty() {
                stomped = true;
                break;
            }
        }
        assert!(stomped);
        assert_eq!(game.score(), STOMP_SCORE);
        assert_eq!(game.lives(), 1);
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.world().player().unwrap().velocity.y < 0.0);
        assert!(!game.world().iter().any(|e| e.kind == EntityKind::Enemy));
    }

    #[test]
    fn test_enemy_from_the_side_hurts() {
        let level = LevelConfig::new(200, 64)
            .with_entity(player_at(50.0, 48.0))
            .with_entity(EntityConfig::new(EntityKind::Enemy, 80.0, 48.0, 16.0, 16.0, "enemy").with_velocity(-60.0, 0.0))
            .with_entity(goal_at(180.0, 0.0).with_gravity(false))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        for _ in 0..30 {
            game.step(&InputState::idle(), DT);
            if game.state() != GameState::Playing {
                break;
            }
        }
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_invincibility_after_hit() {
        let mut level = LevelConfig::new(64, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(hazard_at(8.0, 0.0))
            .with_entity(goal_at(40.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        level.lives = 3;
        let mut game = started(&level);

        game.step(&InputState::idle(), DT);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.stats().invincible, level.invincible_frames);

        // Still touching, but immune until the frames run out
        for _ in 0..level.invincible_frames - 1 {
            game.step(&InputState::idle(), DT);
        }
        assert_eq!(game.lives(), 2);
        game.step(&InputState::idle(), DT);
        assert_eq!(game.lives(), 1);
    }

    #[test]
    fn test_player_blinks_while_invincible() {
        let mut level = LevelConfig::new(64, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(hazard_at(8.0, 0.0))
            .with_entity(goal_at(40.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        level.lives = 3;
        let mut game = started(&level);
        let player = id_of(&game, "player");
        let drawn = |game: &GameLoop| {
            let mut surface = RecordingSurface::new();
            game.render(&mut surface).unwrap();
            let shown = surface.blits().any(|c| matches!(c, DrawCall::Blit { sprite, .. } if *sprite == player));
            shown
        };

        game.step(&InputState::idle(), DT);
        assert!(drawn(&game));
        for _ in 0..BLINK_FRAMES {
            game.step(&InputState::idle(), DT);
        }
        assert!(!drawn(&game));
    }

    #[test]
    fn test_collectibles_score_and_collect_all_wins() {
        let level = LevelConfig::new(128, 128)
            .with_movement(MovementMode::TopDown)
            .with_entity(EntityConfig::new(EntityKind::Player, 10.0, 10.0, 8.0, 8.0, "player"))
            .with_entity(EntityConfig::new(EntityKind::Collectible, 14.0, 10.0, 8.0, 8.0, "coin").with_value(10))
            .with_entity(EntityConfig::new(EntityKind::Collectible, 40.0, 10.0, 8.0, 8.0, "coin").with_value(25))
            .with_win(WinCondition::CollectAll);
        let mut game = started(&level);

        game.step(&InputState::idle(), DT);
        assert_eq!(game.score(), 10);
        assert_eq!(game.stats().collected, 1);
        assert_eq!(game.events().collected.len(), 1);
        assert_eq!(game.state(), GameState::Playing);

        for _ in 0..30 {
            game.step(&InputState::holding(Buttons::RIGHT), DT);
            if game.state() == GameState::Won {
                break;
            }
        }
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.score(), 35);
    }

    #[test]
    fn test_reach_x_wins() {
        let level = LevelConfig::new(300, 100)
            .with_entity(player_at(0.0, 84.0))
            .with_win(WinCondition::ReachX(100.0));
        let mut game = started(&level);
        for _ in 0..100 {
            game.step(&InputState::holding(Buttons::RIGHT), DT);
            if game.state() == GameState::Won {
                break;
            }
        }
        assert_eq!(game.state(), GameState::Won);
        assert!(game.world().player().unwrap().position.x >= 100.0);
    }

    #[test]
    fn test_reach_x_at_the_far_edge_is_winnable() {
        // The player stops at 100 - 16 = 84
        let level = LevelConfig::new(100, 100)
            .with_entity(player_at(0.0, 84.0))
            .with_win(WinCondition::ReachX(84.0));
        let mut game = started(&level);
        for _ in 0..300 {
            game.step(&InputState::holding(Buttons::RIGHT), DT);
            if game.state() == GameState::Won {
                break;
            }
        }
        assert_eq!(game.state(), GameState::Won);

        let mut past = level.clone();
        past.win = Some(WinCondition::ReachX(95.0));
        let mut game = GameLoop::new(sprites());
        assert!(matches!(game.initialize(&past), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_fatal_floor_costs_a_life_and_respawns() {
        let mut level = LevelConfig::new(100, 100)
            .with_entity(player_at(10.0, 10.0))
            .with_entity(goal_at(80.0, 0.0).with_gravity(false))
            .with_win(WinCondition::ReachGoal);
        level.lose.floor_is_fatal = true;
        level.lives = 2;
        let mut game = started(&level);

        let mut fell = false;
        for _ in 0..60 {
            game.step(&InputState::idle(), DT);
            if game.events().player_hit.iter().any(|h| h.cause == HitCause::Fall) {
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert_eq!(game.lives(), 1);
        assert_eq!(game.world().player().unwrap().position, Vec2::new(10.0, 10.0));

        for _ in 0..60 {
            game.step(&InputState::idle(), DT);
        }
        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn test_jump_leaves_the_ground() {
        let level = LevelConfig::new(100, 100)
            .with_entity(player_at(10.0, 84.0))
            .with_entity(goal_at(80.0, 0.0).with_gravity(false))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        // Settle onto the floor
        game.step(&InputState::idle(), DT);
        assert!(game.world().player().unwrap().on_ground);

        game.step(&InputState::pressing(Buttons::JUMP), DT);
        assert_eq!(game.events().jumped.len(), 1);
        assert!(game.world().player().unwrap().position.y < 84.0);
    }

    #[test]
    fn test_spawner_cadence_and_cap() {
        let dt = 0.0625;
        let level = LevelConfig::new(200, 100)
            .with_movement(MovementMode::TopDown)
            .with_entity(EntityConfig::new(EntityKind::Player, 0.0, 0.0, 8.0, 8.0, "player"))
            .with_entity(
                EntityConfig::new(EntityKind::Spawner, 100.0, 10.0, 16.0, 16.0, "kong").with_spawner(SpawnerConfig {
                    interval: 0.5,
                    jitter: 0.0,
                    max_alive: 2,
                    template: Box::new(EntityConfig::new(EntityKind::Hazard, 0.0, 16.0, 8.0, 8.0, "hazard")),
                }),
            )
            .with_entity(goal_at(180.0, 80.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        let hazards = |game: &GameLoop| game.world().iter().filter(|e| e.kind == EntityKind::Hazard).count();

        for _ in 0..7 {
            game.step(&InputState::idle(), dt);
        }
        assert_eq!(hazards(&game), 0);
        game.step(&InputState::idle(), dt);
        assert_eq!(hazards(&game), 1);
        assert_eq!(game.events().spawned.len(), 1);
        let spawned = game.world().iter().find(|e| e.kind == EntityKind::Hazard).unwrap();
        assert_eq!(spawned.position, Vec2::new(100.0, 26.0));

        for _ in 0..8 {
            game.step(&InputState::idle(), dt);
        }
        assert_eq!(hazards(&game), 2);
        for _ in 0..16 {
            game.step(&InputState::idle(), dt);
        }
        assert_eq!(hazards(&game), 2);
    }

    #[test]
    fn test_restart_goes_through_title() {
        let level = LevelConfig::new(64, 64)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(hazard_at(0.0, 0.0))
            .with_entity(goal_at(40.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        game.step(&InputState::idle(), DT);
        assert_eq!(game.state(), GameState::GameOver);

        // No automatic restart
        for _ in 0..10 {
            game.step(&InputState::idle(), DT);
        }
        assert_eq!(game.state(), GameState::GameOver);

        game.step(&InputState::pressing(Buttons::START), DT);
        assert_eq!(game.state(), GameState::Title);
        game.step(&InputState::holding(Buttons::START), DT);
        assert_eq!(game.state(), GameState::Title);
        game.step(&InputState::pressing(Buttons::START), DT);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.lives(), 1);
        assert_eq!(game.world().len(), 3);
    }

    #[test]
    fn test_title_screen_waits_for_start() {
        let mut level = LevelConfig::new(128, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(100.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        level.title_screen = true;
        let mut game = started(&level);
        assert_eq!(game.state(), GameState::Title);
        assert_eq!(game.world().len(), 2);

        game.step(&InputState::holding(Buttons::RIGHT), DT);
        assert_eq!(game.world().player().unwrap().position, Vec2::ZERO);

        game.step(&InputState::pressing(Buttons::START), DT);
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn test_start_without_level_stays_on_title() {
        let mut game = GameLoop::new(sprites());
        game.step(&InputState::pressing(Buttons::START), DT);
        assert_eq!(game.state(), GameState::Title);
    }

    #[test]
    fn test_render_order() {
        let mut legend = BTreeMap::new();
        legend.insert('#', "brick".to_string());
        let mut level = LevelConfig::new(64, 48)
            .with_movement(MovementMode::TopDown)
            .with_entity(goal_at(40.0, 0.0))
            .with_entity(player_at(0.0, 0.0))
            .with_entity(EntityConfig::new(EntityKind::Collectible, 20.0, 0.0, 8.0, 8.0, "coin"))
            .with_win(WinCondition::ReachGoal);
        level.tiles = Some(TileMapConfig {
            tile_size: 16,
            rows: vec!["....".into(), "....".into(), "##..".into()],
            legend,
        });
        let game = started(&level);

        let mut surface = RecordingSurface::new();
        game.render(&mut surface).unwrap();
        assert_eq!(surface.calls[0], DrawCall::Clear);

        let sprites: Vec<_> = surface
            .blits()
            .map(|c| match c {
                DrawCall::Blit { sprite, .. } => *sprite,
                _ => unreachable!(),
            })
            .collect();
        let brick = id_of(&game, "brick");
        assert_eq!(
            sprites,
            vec![brick, brick, id_of(&game, "goal"), id_of(&game, "player"), id_of(&game, "coin")]
        );

        // HUD comes last
        let last_blit = surface.calls.iter().rposition(|c| matches!(c, DrawCall::Blit { .. })).unwrap();
        assert!(surface.calls[last_blit + 1..].iter().all(|c| matches!(c, DrawCall::Text { .. })));
        assert!(surface.calls.iter().any(|c| matches!(c, DrawCall::Text { text, .. } if text == "SCORE 00000")));
    }

    #[test]
    fn test_render_after_reset_shows_only_the_banner() {
        let mut legend = BTreeMap::new();
        legend.insert('#', "brick".to_string());
        let mut level = LevelConfig::new(64, 48)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(40.0, 0.0))
            .with_win(WinCondition::ReachGoal);
        level.tiles = Some(TileMapConfig {
            tile_size: 16,
            rows: vec!["....".into(), "....".into(), "####".into()],
            legend,
        });
        let mut game = started(&level);
        game.reset();

        let mut surface = RecordingSurface::new();
        game.render(&mut surface).unwrap();
        assert_eq!(surface.blits().count(), 0);
        let texts: Vec<&str> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![GameState::Title.label()]);

        // Start brings the level, tiles and HUD back
        game.step(&InputState::pressing(Buttons::START), DT);
        let mut surface = RecordingSurface::new();
        game.render(&mut surface).unwrap();
        assert!(surface.blits().count() > 2);
        assert!(surface.calls.iter().any(|c| matches!(c, DrawCall::Text { text, .. } if text.starts_with("SCORE"))));
    }

    #[test]
    fn test_render_is_read_only() {
        let level = busy_level();
        let mut game = started(&level);
        game.step(&InputState::holding(Buttons::RIGHT), DT);
        let before = snapshot(&game);
        let mut surface = RecordingSurface::new();
        game.render(&mut surface).unwrap();
        game.render(&mut surface).unwrap();
        assert_eq!(snapshot(&game), before);
    }

    struct BrokenSurface;

    impl DisplaySurface for BrokenSurface {
        fn clear(&mut self) -> Result<(), CollaboratorError> {
            Ok(())
        }

        fn blit(&mut self, _: SpriteId, _: u16, _: i32, _: i32, _: bool) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::Display("bus fault".to_string()))
        }
    }

    #[test]
    fn test_surface_errors_propagate() {
        let level = LevelConfig::new(64, 64)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(40.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let game = started(&level);
        let err = game.render(&mut BrokenSurface).unwrap_err();
        assert!(matches!(err, CollaboratorError::Display(ref m) if m == "bus fault"));
    }

    #[test]
    fn test_bad_elapsed_time_is_ignored() {
        let level = LevelConfig::new(128, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(100.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        game.step(&InputState::holding(Buttons::RIGHT), f32::NAN);
        game.step(&InputState::holding(Buttons::RIGHT), -1.0);
        assert_eq!(game.world().player().unwrap().position, Vec2::ZERO);

        // Huge stalls are clamped
        game.step(&InputState::holding(Buttons::RIGHT), 10.0);
        let x = game.world().player().unwrap().position.x;
        assert!((x - level.physics.move_speed * MAX_STEP).abs() < 1e-3);
    }

    #[test]
    fn test_run_until_quit() {
        let level = LevelConfig::new(128, 64)
            .with_movement(MovementMode::TopDown)
            .with_entity(player_at(0.0, 0.0))
            .with_entity(goal_at(100.0, 40.0))
            .with_win(WinCondition::ReachGoal);
        let mut game = started(&level);
        let mut input = ScriptedInput::new(vec![Buttons::RIGHT; 5]).then_quit();
        let mut surface = RecordingSurface::new();
        let mut pacer = FramePacer::new(FpsLimit::Unlocked);

        let frames = game.run(&mut input, &mut surface, &mut pacer).unwrap();
        assert_eq!(frames, 5);
        assert_eq!(surface.calls.iter().filter(|c| **c == DrawCall::Clear).count(), 5);
        assert!(game.world().player().unwrap().position.x > 0.0);

        let control = game.run_frame(&mut input, &mut surface, DT).unwrap();
        assert_eq!(control, FrameControl::Quit);
    }
}
