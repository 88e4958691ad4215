//! 2D follow camera
//!
//! Scrolls horizontally to keep the player roughly centered when the level
//! is wider than the viewport. The camera never shows anything outside the
//! level.

use crate::math::{Rect, Vec2};

/// Fraction of the remaining distance covered per step
pub const FOLLOW_SMOOTHING: f32 = 0.2;

/// Entities this far outside the viewport are still drawn (partial sprites)
pub const CULL_MARGIN: f32 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    /// Top-left of the viewport in level pixels
    pub offset: Vec2,
    pub viewport_w: f32,
    pub viewport_h: f32,
    level_w: f32,
    level_h: f32,
}

impl Camera {
    pub fn new(viewport: (u32, u32), level: (u32, u32)) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport_w: viewport.0 as f32,
            viewport_h: viewport.1 as f32,
            level_w: level.0 as f32,
            level_h: level.1 as f32,
        }
    }

    fn max_x(&self) -> f32 {
        (self.level_w - self.viewport_w).max(0.0)
    }

    /// Jump straight to the target (used at level start)
    pub fn snap_to(&mut self, target: Vec2) {
        self.offset.x = (target.x - self.viewport_w * 0.5).clamp(0.0, self.max_x());
    }

    /// Ease toward centering on `target`
    pub fn follow(&mut self, target: Vec2) {
        let desired = (target.x - self.viewport_w * 0.5).clamp(0.0, self.max_x());
        self.offset.x += (desired - self.offset.x) * FOLLOW_SMOOTHING;
        self.offset.x = self.offset.x.clamp(0.0, self.max_x());
    }

    /// Visible area in level coordinates
    pub fn view(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.viewport_w, self.viewport_h)
    }

    /// Whether a box is close enough to the view to be drawn
    pub fn is_visible(&self, bounds: &Rect) -> bool {
        let v = self.view();
        let expanded = Rect::new(
            v.x - CULL_MARGIN,
            v.y - CULL_MARGIN,
            v.w + CULL_MARGIN * 2.0,
            v.h + CULL_MARGIN * 2.0,
        );
        expanded.overlaps(bounds)
    }

    /// Level position → integer screen position
    pub fn to_screen(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x - self.offset.x).round() as i32,
            (pos.y - self.offset.y).round() as i32,
        )
    }

    pub fn level_height(&self) -> f32 {
        self.level_h
    }
}
