//! tinyarcade: a tiny 2D game loop for workshop-scale sprite games
//!
//! The core (`game`) runs a fixed-cadence loop of sample input, update
//! entities, detect collisions, resolve state and render, driving a
//! Title / Playing / Paused / GameOver / Won state machine. Hardware is
//! reached through two collaborator traits:
//! - `input::InputSource` yields one `InputState` per frame
//! - `display::DisplaySurface` receives clear / blit / text calls
//!
//! Levels are RON files (`world`), sprites are resolved to handles once at
//! load time (`asset`), and `host` provides the desktop window stand-in.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod asset;
pub mod display;
pub mod error;
pub mod game;
pub mod host;
pub mod input;
pub mod math;
pub mod world;

pub use asset::{SpriteId, SpriteInfo, SpriteTable};
pub use display::{DisplaySurface, DrawCall, RecordingSurface};
pub use error::{CollaboratorError, ConfigError, Error};
pub use game::{FrameControl, GameLoop, GameState};
pub use input::{Buttons, InputSource, InputState};
pub use world::LevelConfig;
