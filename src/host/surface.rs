//! Window display surface
//!
//! Draws the game's low-resolution view into the macroquad window with
//! integer scaling, centered and letterboxed. Sprite sheets become
//! nearest-filtered textures; sprites without a sheet are solid blocks.

use macroquad::prelude::*;

use super::sprites::SpriteSheet;
use crate::asset::{SpriteId, SpriteInfo};
use crate::display::DisplaySurface;
use crate::error::CollaboratorError;

/// HUD font size in game pixels
const FONT_SIZE: f32 = 8.0;

enum SheetTexture {
    Image { texture: Texture2D, info: SpriteInfo },
    Solid { color: Color, info: SpriteInfo },
}

pub struct WindowSurface {
    sheets: Vec<SheetTexture>,
    /// Game view size in game pixels
    view_w: f32,
    view_h: f32,
    /// Fixed scale, or 0 to fit the window
    fixed_scale: u32,
    scale: f32,
    origin: (f32, f32),
}

impl WindowSurface {
    /// Upload sprite sheets (indexed by `SpriteId`) and set the game view size
    pub fn new(sheets: &[SpriteSheet], view: (u32, u32), fixed_scale: u32) -> Self {
        let sheets = sheets
            .iter()
            .map(|sheet| match &sheet.pixels {
                Some(px) if px.width <= u16::MAX as u32 && px.height <= u16::MAX as u32 => {
                    let texture = Texture2D::from_rgba8(px.width as u16, px.height as u16, &px.rgba);
                    texture.set_filter(FilterMode::Nearest);
                    SheetTexture::Image { texture, info: sheet.info }
                }
                _ => {
                    let (r, g, b) = sheet.color;
                    SheetTexture::Solid { color: Color::from_rgba(r, g, b, 255), info: sheet.info }
                }
            })
            .collect();

        Self {
            sheets,
            view_w: view.0 as f32,
            view_h: view.1 as f32,
            fixed_scale,
            scale: 1.0,
            origin: (0.0, 0.0),
        }
    }

    pub fn set_view(&mut self, view: (u32, u32)) {
        self.view_w = view.0 as f32;
        self.view_h = view.1 as f32;
    }

    /// Recompute scale and letterbox for the current window size
    fn layout(&mut self) {
        let fit = (screen_width() / self.view_w).min(screen_height() / self.view_h).floor().max(1.0);
        self.scale = if self.fixed_scale > 0 { self.fixed_scale as f32 } else { fit };
        self.origin = (
            ((screen_width() - self.view_w * self.scale) * 0.5).floor(),
            ((screen_height() - self.view_h * self.scale) * 0.5).floor(),
        );
    }

    fn to_window(&self, x: i32, y: i32) -> (f32, f32) {
        (self.origin.0 + x as f32 * self.scale, self.origin.1 + y as f32 * self.scale)
    }
}

impl DisplaySurface for WindowSurface {
    fn clear(&mut self) -> Result<(), CollaboratorError> {
        self.layout();
        clear_background(BLACK);
        draw_rectangle(
            self.origin.0,
            self.origin.1,
            self.view_w * self.scale,
            self.view_h * self.scale,
            Color::from_rgba(92, 148, 252, 255),
        );
        Ok(())
    }

    fn blit(&mut self, sprite: SpriteId, frame: u16, x: i32, y: i32, flip_x: bool) -> Result<(), CollaboratorError> {
        let Some(sheet) = self.sheets.get(sprite.index()) else {
            return Err(CollaboratorError::Display(format!("no sheet for sprite {:?}", sprite)));
        };
        let (wx, wy) = self.to_window(x, y);
        match sheet {
            SheetTexture::Image { texture, info } => {
                let frame = (frame % info.frames) as f32;
                let (fw, fh) = (info.frame_width as f32, info.frame_height as f32);
                draw_texture_ex(
                    texture,
                    wx,
                    wy,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(fw * self.scale, fh * self.scale)),
                        source: Some(Rect::new(frame * fw, 0.0, fw, fh)),
                        flip_x,
                        ..Default::default()
                    },
                );
            }
            SheetTexture::Solid { color, info } => {
                draw_rectangle(
                    wx,
                    wy,
                    info.frame_width as f32 * self.scale,
                    info.frame_height as f32 * self.scale,
                    *color,
                );
            }
        }
        Ok(())
    }

    fn text(&mut self, x: i32, y: i32, text: &str) -> Result<(), CollaboratorError> {
        let (wx, wy) = self.to_window(x, y);
        let size = FONT_SIZE * self.scale;
        draw_text(text, wx, wy + size * 0.8, size, WHITE);
        Ok(())
    }
}
