//! Level loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable level files.
//! Supports both compressed (brotli) and uncompressed RON files.
//! - Reading: Auto-detects format by checking for valid RON start
//! - Writing: `save_level` compresses, `serialize_level` gives plain text

use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::{EntityConfig, EntityKind, LevelConfig, TileMapConfig, WinCondition};
use crate::math::Rect;

/// Validation limits to keep hand-edited files sane
pub mod limits {
    /// Maximum level width or height in pixels
    pub const MAX_LEVEL_DIM: u32 = 65_536;
    /// Maximum entities declared in a level (spawned ones included at runtime)
    pub const MAX_ENTITIES: usize = 512;
    /// Maximum tile rows / columns
    pub const MAX_TILE_ROWS: usize = 1024;
    pub const MAX_TILE_COLS: usize = 4096;
    /// Maximum sprite name length
    pub const MAX_STRING_LEN: usize = 256;
    pub const MAX_LIVES: u8 = 99;
}

/// Error type for level loading and validation
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    /// A required field is absent (the win condition, the player)
    MissingField(&'static str),
    /// A field is present but out of range or inconsistent
    Invalid(String),
    /// A sprite name that the sprite table does not know
    UnknownSprite(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::MissingField(name) => write!(f, "Missing required field: {}", name),
            ConfigError::Invalid(e) => write!(f, "Validation error: {}", e),
            ConfigError::UnknownSprite(name) => write!(f, "Unknown sprite: {}", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(e) => Some(e),
            ConfigError::SerializeError(e) => Some(e),
            _ => None,
        }
    }
}

fn is_valid_float(f: f32) -> bool {
    f.is_finite()
}

fn validate_sprite_name(name: &str, context: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{}: empty sprite name", context));
    }
    if name.len() > limits::MAX_STRING_LEN {
        return Err(format!("{}: sprite name too long ({} > {})",
            context, name.len(), limits::MAX_STRING_LEN));
    }
    Ok(())
}

/// Shape checks shared by placed entities and spawner templates
fn validate_entity_shape(entity: &EntityConfig, context: &str) -> Result<(), String> {
    if !is_valid_float(entity.x) || !is_valid_float(entity.y) {
        return Err(format!("{}: invalid position ({}, {})", context, entity.x, entity.y));
    }
    if !entity.velocity.is_finite() {
        return Err(format!("{}: invalid velocity", context));
    }
    if !(is_valid_float(entity.width) && entity.width > 0.0)
        || !(is_valid_float(entity.height) && entity.height > 0.0)
    {
        return Err(format!("{}: size must be positive, got {}x{}",
            context, entity.width, entity.height));
    }
    validate_sprite_name(&entity.sprite, context)
}

fn check_inside(b: &Rect, level: &LevelConfig, context: &str) -> Result<(), String> {
    if b.x < 0.0 || b.y < 0.0 || b.right() > level.width as f32 || b.bottom() > level.height as f32 {
        return Err(format!("{}: box ({}, {}, {}x{}) lies outside the {}x{} level",
            context, b.x, b.y, b.w, b.h, level.width, level.height));
    }
    Ok(())
}

fn validate_entity(entity: &EntityConfig, idx: usize, level: &LevelConfig) -> Result<(), String> {
    let context = format!("entity {} ({:?})", idx, entity.kind);
    validate_entity_shape(entity, &context)?;

    check_inside(&entity.bounds(), level, &context)?;

    match (&entity.kind, &entity.spawn) {
        (EntityKind::Spawner, None) => {
            return Err(format!("{}: spawner without spawn settings", context));
        }
        (EntityKind::Spawner, Some(spawn)) => {
            if !(is_valid_float(spawn.interval) && spawn.interval > 0.0) {
                return Err(format!("{}: spawn interval must be positive", context));
            }
            if !(is_valid_float(spawn.jitter) && spawn.jitter >= 0.0) {
                return Err(format!("{}: spawn jitter must be non-negative", context));
            }
            let template = &spawn.template;
            if !matches!(template.kind, EntityKind::Hazard | EntityKind::Enemy | EntityKind::Collectible) {
                return Err(format!("{}: cannot spawn {:?}", context, template.kind));
            }
            if template.spawn.is_some() {
                return Err(format!("{}: nested spawners are not supported", context));
            }
            let template_context = format!("{} template", context);
            validate_entity_shape(template, &template_context)?;
            // Templates are placed relative to the spawner
            let mut landing = template.bounds();
            landing.x += entity.x;
            landing.y += entity.y;
            check_inside(&landing, level, &template_context)?;
        }
        (_, Some(_)) => {
            return Err(format!("{}: only spawners take spawn settings", context));
        }
        _ => {}
    }
    Ok(())
}

fn validate_tiles(tiles: &TileMapConfig) -> Result<(), String> {
    if tiles.tile_size == 0 {
        return Err("tiles: tile_size must be positive".to_string());
    }
    if tiles.rows.len() > limits::MAX_TILE_ROWS {
        return Err(format!("tiles: too many rows ({} > {})", tiles.rows.len(), limits::MAX_TILE_ROWS));
    }
    for (r, row) in tiles.rows.iter().enumerate() {
        if row.chars().count() > limits::MAX_TILE_COLS {
            return Err(format!("tiles: row {} too long", r));
        }
        for c in row.chars() {
            if !TileMapConfig::is_empty_char(c) && !tiles.legend.contains_key(&c) {
                return Err(format!("tiles: row {} uses '{}' which has no legend entry", r, c));
            }
        }
    }
    for (c, sprite) in &tiles.legend {
        validate_sprite_name(sprite, &format!("tiles legend '{}'", c))?;
    }
    Ok(())
}

/// Validate a level before it is used.
///
/// Missing required fields come back as `MissingField`, everything else
/// as `Invalid`. Sprite names are checked later, against the sprite table.
pub fn validate_level(level: &LevelConfig) -> Result<(), ConfigError> {
    let win = level.win.ok_or(ConfigError::MissingField("win"))?;

    if level.width == 0 || level.height == 0 {
        return Err(ConfigError::Invalid(format!("level size must be positive, got {}x{}",
            level.width, level.height)));
    }
    if level.width > limits::MAX_LEVEL_DIM || level.height > limits::MAX_LEVEL_DIM {
        return Err(ConfigError::Invalid(format!("level too large ({}x{})", level.width, level.height)));
    }
    if let Some((w, h)) = level.viewport {
        if w == 0 || h == 0 {
            return Err(ConfigError::Invalid("viewport size must be positive".to_string()));
        }
    }
    if level.lives == 0 || level.lives > limits::MAX_LIVES {
        return Err(ConfigError::Invalid(format!("lives must be 1..={}, got {}",
            limits::MAX_LIVES, level.lives)));
    }

    let p = &level.physics;
    let physics = [p.gravity, p.jump_speed, p.move_speed, p.run_speed, p.max_fall_speed, p.stomp_bounce];
    if physics.iter().any(|v| !is_valid_float(*v) || *v < 0.0) {
        return Err(ConfigError::Invalid("physics values must be finite and non-negative".to_string()));
    }
    if !(0.0..=1.0).contains(&p.friction) {
        return Err(ConfigError::Invalid(format!("friction must be in 0..=1, got {}", p.friction)));
    }

    if level.entities.len() > limits::MAX_ENTITIES {
        return Err(ConfigError::Invalid(format!("too many entities ({} > {})",
            level.entities.len(), limits::MAX_ENTITIES)));
    }
    let players = level.entities.iter().filter(|e| e.kind == EntityKind::Player).count();
    match players {
        0 => return Err(ConfigError::MissingField("player")),
        1 => {}
        n => return Err(ConfigError::Invalid(format!("expected one player, found {}", n))),
    }

    for (idx, entity) in level.entities.iter().enumerate() {
        validate_entity(entity, idx, level).map_err(ConfigError::Invalid)?;
    }

    if let Some(tiles) = &level.tiles {
        validate_tiles(tiles).map_err(ConfigError::Invalid)?;
    }

    let count = |kind: EntityKind| level.entities.iter().filter(|e| e.kind == kind).count();
    match win {
        WinCondition::ReachGoal if count(EntityKind::Goal) == 0 => {
            return Err(ConfigError::Invalid("win is ReachGoal but the level has no goal".to_string()));
        }
        WinCondition::CollectAll if count(EntityKind::Collectible) == 0 => {
            return Err(ConfigError::Invalid("win is CollectAll but the level has no collectibles".to_string()));
        }
        WinCondition::ReachX(x) => {
            // The player is clamped to the level, so its left edge never
            // passes width - player width
            let reach = level.player().map_or(0.0, |p| level.width as f32 - p.width);
            if !is_valid_float(x) || x < 0.0 || x > reach {
                return Err(ConfigError::Invalid(format!(
                    "ReachX({}) is out of the player's reach (0..={})", x, reach)));
            }
        }
        _ => {}
    }

    Ok(())
}

/// Load a level from a RON file (plain or brotli-compressed)
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<LevelConfig, ConfigError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    // Detect format: RON files start with '(' or whitespace, brotli is binary
    let is_plain_ron = bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' || b == b'/')
        .unwrap_or(false);

    let contents = if is_plain_ron {
        String::from_utf8(bytes)
            .map_err(|e| ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8: {}", e)
            )))?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(&bytes), &mut decompressed)
            .map_err(|e| ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("brotli decompression failed: {}", e)
            )))?;
        String::from_utf8(decompressed)
            .map_err(|e| ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8 after decompression: {}", e)
            )))?
    };

    let level = match load_level_from_str(&contents) {
        Ok(level) => level,
        Err(ConfigError::ParseError(e)) => {
            log::error!("RON parse error in {}: {}", path.display(), e);
            if let Some(line) = contents.lines().nth(e.position.line.saturating_sub(1)) {
                log::error!("  Line {}: {}", e.position.line, line.trim_end());
            }
            return Err(ConfigError::ParseError(e));
        }
        Err(e) => return Err(e),
    };

    log::info!("Loaded level '{}' from {} ({} entities)",
        level.name, path.display(), level.entities.len());
    Ok(level)
}

/// Serialize a level to pretty RON text
pub fn serialize_level(level: &LevelConfig) -> Result<String, ConfigError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(level, config)?)
}

/// Save a level to a compressed RON file (brotli)
pub fn save_level<P: AsRef<Path>>(level: &LevelConfig, path: P) -> Result<(), ConfigError> {
    let ron_string = serialize_level(level)?;

    // Compress with brotli (quality 6, window 22 - good balance of speed/ratio)
    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut Cursor::new(ron_string.as_bytes()), &mut compressed, &brotli::enc::BrotliEncoderParams {
        quality: 6,
        lgwin: 22,
        ..Default::default()
    }).map_err(|e| ConfigError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("brotli compression failed: {}", e)
    )))?;

    fs::write(path, compressed)?;
    Ok(())
}

/// Load a level from a RON string (for embedded levels or testing)
pub fn load_level_from_str(s: &str) -> Result<LevelConfig, ConfigError> {
    let level: LevelConfig = ron::from_str(s)?;
    validate_level(&level)?;
    Ok(level)
}
