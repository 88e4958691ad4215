//! Sprite manifest
//!
//! `assets/sprites.ron` lists every sprite a level may name, with its frame
//! layout and an optional sheet image (PNG or BMP, frames side by side).
//! Sprites without an image, or whose image fails to load, are drawn as
//! solid blocks of their color.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::asset::{SpriteInfo, SpriteTable};
use crate::world::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteEntry {
    pub name: String,
    /// Sheet image, relative to the manifest
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default = "one_frame")]
    pub frames: u16,
    /// Fallback block color (RGB)
    #[serde(default = "default_color")]
    pub color: (u8, u8, u8),
}

fn one_frame() -> u16 {
    1
}

fn default_color() -> (u8, u8, u8) {
    (255, 0, 255)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteManifest {
    pub sprites: Vec<SpriteEntry>,
}

/// Decoded RGBA pixels of one sheet
#[derive(Debug, Clone)]
pub struct SheetPixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Everything the surface needs to draw one sprite
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub info: SpriteInfo,
    pub color: (u8, u8, u8),
    /// None: draw a solid block
    pub pixels: Option<SheetPixels>,
}

impl SpriteManifest {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let manifest: SpriteManifest = ron::from_str(s)?;
        for entry in &manifest.sprites {
            if entry.name.is_empty() {
                return Err(ConfigError::Invalid("sprite with empty name".to_string()));
            }
            if entry.frame_width == 0 || entry.frame_height == 0 {
                return Err(ConfigError::Invalid(format!("sprite '{}': frame size must be positive", entry.name)));
            }
        }
        Ok(manifest)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let manifest = Self::parse(&contents)?;
        log::info!("Loaded {} sprites from {}", manifest.sprites.len(), path.display());
        Ok(manifest)
    }

    /// Register every sprite, in manifest order, so handle `i` is entry `i`
    pub fn sprite_table(&self) -> SpriteTable {
        let mut table = SpriteTable::new();
        for entry in &self.sprites {
            table.register(&entry.name, SpriteInfo::new(entry.frame_width, entry.frame_height, entry.frames));
        }
        table
    }

    /// Decode sheet images. Indexed like `sprite_table`. Images that fail
    /// to load are logged and fall back to solid blocks.
    pub fn load_sheets(&self, base_dir: &Path) -> Vec<SpriteSheet> {
        self.sprites
            .iter()
            .map(|entry| {
                let pixels = entry.path.as_ref().and_then(|rel| {
                    let path = base_dir.join(rel);
                    match load_pixels(&path) {
                        Ok(pixels) => Some(pixels),
                        Err(e) => {
                            log::warn!("Sprite '{}': {}", entry.name, e);
                            None
                        }
                    }
                });
                SpriteSheet {
                    info: SpriteInfo::new(entry.frame_width, entry.frame_height, entry.frames),
                    color: entry.color,
                    pixels,
                }
            })
            .collect()
    }
}

/// Load a sheet image as RGBA
pub fn load_pixels(path: &Path) -> Result<SheetPixels, String> {
    let img = image::open(path).map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;
    let rgba = img.to_rgba8();
    Ok(SheetPixels {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}
