//! Host settings
//!
//! Persisted between runs as `settings.ron` in the user config directory.
//! Command-line flags override whatever is loaded here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::game::FpsLimit;
use crate::world::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps: FpsLimit,
    /// Window pixels per game pixel; 0 fits the window
    pub scale: u32,
    /// Level played last, reopened when no level is given
    pub last_level: Option<PathBuf>,
    pub sprites: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: FpsLimit::default(),
            scale: 0,
            last_level: None,
            sprites: PathBuf::from("assets/sprites.ron"),
        }
    }
}

impl Settings {
    /// Default settings file location
    #[cfg(not(target_arch = "wasm32"))]
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tinyarcade")
            .join("settings.ron")
    }

    #[cfg(target_arch = "wasm32")]
    pub fn path() -> PathBuf {
        PathBuf::from("settings.ron")
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Load from the default location, falling back to defaults on error
    pub fn load() -> Self {
        let path = Self::path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let path = Self::path();
        if let Err(e) = self.save_to(&path) {
            log::warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }
}
