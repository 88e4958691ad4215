//! Solid tile grid
//!
//! Built once from a `TileMapConfig` with sprite names resolved. Cells
//! outside the grid are empty; the level bounds are enforced separately.

use crate::asset::{SpriteId, SpriteTable};
use crate::math::Rect;
use super::{ConfigError, TileMapConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub col: usize,
    pub row: usize,
    pub sprite: SpriteId,
}

#[derive(Debug, Clone, Default)]
pub struct TileMap {
    tile_size: f32,
    cols: usize,
    rows: usize,
    /// Row-major, `cols * rows` cells
    cells: Vec<Option<SpriteId>>,
}

impl TileMap {
    /// Build the grid, resolving legend sprite names
    pub fn build(config: &TileMapConfig, sprites: &SpriteTable) -> Result<Self, ConfigError> {
        let rows = config.rows.len();
        let cols = config.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut cells = vec![None; rows * cols];

        for (r, line) in config.rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if TileMapConfig::is_empty_char(ch) {
                    continue;
                }
                let name = config.legend.get(&ch).ok_or_else(|| {
                    ConfigError::Invalid(format!("tiles: '{}' has no legend entry", ch))
                })?;
                let sprite = sprites
                    .resolve(name)
                    .ok_or_else(|| ConfigError::UnknownSprite(name.clone()))?;
                cells[r * cols + c] = Some(sprite);
            }
        }

        Ok(Self {
            tile_size: config.tile_size as f32,
            cols,
            rows,
            cells,
        })
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, col: usize, row: usize) -> Option<SpriteId> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    pub fn is_solid(&self, col: usize, row: usize) -> bool {
        self.get(col, row).is_some()
    }

    pub fn tile_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            col as f32 * self.tile_size,
            row as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Solid tiles whose cells overlap `rect`
    pub fn solids_overlapping(&self, rect: &Rect) -> impl Iterator<Item = Rect> + '_ {
        let (c0, c1, r0, r1) = if self.cells.is_empty() || self.tile_size <= 0.0 {
            (0, 0, 0, 0)
        } else {
            let ts = self.tile_size;
            let c0 = (rect.x / ts).floor().max(0.0) as usize;
            let r0 = (rect.y / ts).floor().max(0.0) as usize;
            let c1 = ((rect.right() / ts).ceil().max(0.0) as usize).min(self.cols);
            let r1 = ((rect.bottom() / ts).ceil().max(0.0) as usize).min(self.rows);
            (c0, c1, r0, r1)
        };
        let rect = *rect;
        (r0..r1)
            .flat_map(move |r| (c0..c1).map(move |c| (c, r)))
            .filter(move |&(c, r)| self.is_solid(c, r))
            .map(move |(c, r)| self.tile_rect(c, r))
            .filter(move |t| t.overlaps(&rect))
    }

    /// All solid tiles in row-major order (draw order)
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|sprite| Tile { col: i % cols, row: i / cols, sprite })
        })
    }
}
