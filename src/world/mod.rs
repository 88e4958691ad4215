//! World module - level descriptions
//!
//! Static, serde-friendly level data and the tile grid built from it:
//! - `LevelConfig` and friends describe a level's starting layout
//! - `level` loads, validates and saves RON level files
//! - `TileMap` answers solid-tile queries for collision and rendering

mod config;
mod level;
mod tilemap;

pub use config::*;
pub use level::*;
pub use tilemap::*;
