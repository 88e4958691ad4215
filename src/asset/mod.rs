//! Sprite handles
//!
//! Levels name their sprites with strings ("mario", "goomba", "brick").
//! Names are resolved to `SpriteId` handles exactly once, when a level is
//! initialized; from then on the core only passes handles and frame indices
//! to the display surface. Pixel data never enters the core.

use std::collections::HashMap;

/// Opaque handle to a registered sprite (index into the sprite table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u16);

impl SpriteId {
    /// Index into the table that issued this id
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Frame layout of a registered sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteInfo {
    /// Width of a single frame in pixels
    pub frame_width: u32,
    /// Height of a single frame in pixels
    pub frame_height: u32,
    /// Number of frames laid out horizontally in the sheet
    pub frames: u16,
}

impl SpriteInfo {
    pub fn new(frame_width: u32, frame_height: u32, frames: u16) -> Self {
        Self {
            frame_width,
            frame_height,
            frames: frames.max(1),
        }
    }
}

/// Name → handle registry shared by the core and the display surface
#[derive(Debug, Clone, Default)]
pub struct SpriteTable {
    infos: Vec<SpriteInfo>,
    names: Vec<String>,
    by_name: HashMap<String, SpriteId>,
}

impl SpriteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sprite. Re-registering a name replaces its frame info and
    /// keeps the original handle.
    pub fn register(&mut self, name: &str, info: SpriteInfo) -> SpriteId {
        if let Some(&id) = self.by_name.get(name) {
            self.infos[id.index()] = info;
            return id;
        }
        let id = SpriteId(self.infos.len() as u16);
        self.infos.push(info);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn resolve(&self, name: &str) -> Option<SpriteId> {
        self.by_name.get(name).copied()
    }

    pub fn info(&self, id: SpriteId) -> Option<&SpriteInfo> {
        self.infos.get(id.index())
    }

    pub fn name(&self, id: SpriteId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Number of frames for a sprite (1 for unknown handles)
    pub fn frame_count(&self, id: SpriteId) -> u16 {
        self.info(id).map(|i| i.frames).unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &str, &SpriteInfo)> {
        self.infos
            .iter()
            .enumerate()
            .map(|(i, info)| (SpriteId(i as u16), self.names[i].as_str(), info))
    }
}
