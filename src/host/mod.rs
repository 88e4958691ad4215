//! Desktop host
//!
//! Stands in for the workshop board: a macroquad window as the display
//! surface, keyboard and gilrs gamepads as the input source, sprite sheets
//! decoded with `image`, and persisted settings.

mod input;
mod settings;
mod sprites;
mod surface;

pub use input::HostInput;
pub use settings::Settings;
pub use sprites::{load_pixels, SheetPixels, SpriteEntry, SpriteManifest, SpriteSheet};
pub use surface::WindowSurface;
