//! Display surface collaborator
//!
//! The core issues draw commands; the surface owns the pixel buffer and the
//! transfer to hardware. Coordinates are screen pixels (camera already
//! applied), and may be negative or past the edge for partially visible
//! sprites.

use crate::asset::SpriteId;
use crate::error::CollaboratorError;

pub trait DisplaySurface {
    /// Clear the whole surface to the background color
    fn clear(&mut self) -> Result<(), CollaboratorError>;

    /// Draw one frame of a sprite with its top-left corner at (x, y)
    fn blit(
        &mut self,
        sprite: SpriteId,
        frame: u16,
        x: i32,
        y: i32,
        flip_x: bool,
    ) -> Result<(), CollaboratorError>;

    /// Draw overlay text. Surfaces without a font can ignore it.
    fn text(&mut self, _x: i32, _y: i32, _text: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

impl<S: DisplaySurface + ?Sized> DisplaySurface for &mut S {
    fn clear(&mut self) -> Result<(), CollaboratorError> {
        (**self).clear()
    }

    fn blit(
        &mut self,
        sprite: SpriteId,
        frame: u16,
        x: i32,
        y: i32,
        flip_x: bool,
    ) -> Result<(), CollaboratorError> {
        (**self).blit(sprite, frame, x, y, flip_x)
    }

    fn text(&mut self, x: i32, y: i32, text: &str) -> Result<(), CollaboratorError> {
        (**self).text(x, y, text)
    }
}

/// A single recorded draw call (see `RecordingSurface`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Clear,
    Blit {
        sprite: SpriteId,
        frame: u16,
        x: i32,
        y: i32,
        flip_x: bool,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
    },
}

/// Surface that records draw calls instead of drawing.
/// Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blits recorded since the last clear
    pub fn blits(&self) -> impl Iterator<Item = &DrawCall> {
        let start = self
            .calls
            .iter()
            .rposition(|c| *c == DrawCall::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.calls[start..]
            .iter()
            .filter(|c| matches!(c, DrawCall::Blit { .. }))
    }
}

impl DisplaySurface for RecordingSurface {
    fn clear(&mut self) -> Result<(), CollaboratorError> {
        self.calls.push(DrawCall::Clear);
        Ok(())
    }

    fn blit(
        &mut self,
        sprite: SpriteId,
        frame: u16,
        x: i32,
        y: i32,
        flip_x: bool,
    ) -> Result<(), CollaboratorError> {
        self.calls.push(DrawCall::Blit { sprite, frame, x, y, flip_x });
        Ok(())
    }

    fn text(&mut self, x: i32, y: i32, text: &str) -> Result<(), CollaboratorError> {
        self.calls.push(DrawCall::Text { x, y, text: text.to_string() });
        Ok(())
    }
}
