use engine::{DrawContext, Entity, FrameContext, Surface, Vec2};
use tracing::debug;

use super::{EditorContext, GRID_COLUMNS, GRID_ROWS, TILE_SIZE_PX};
use crate::app::tiles::{TileId, EMPTY_TILE};

/// Non-empty cells of the starting dungeon, as `(column, first_row, tiles)`
/// runs down a single column.
const SAMPLE_LAYOUT: [(u32, u32, &[TileId]); 10] = [
    (5, 8, &[12, 45, 44]),
    (6, 8, &[46, 47, 14, 13]),
    (7, 7, &[15, 36, 5, 27, 36, 8]),
    (8, 8, &[2, 1, 4, 37, 35]),
    (9, 8, &[6, 3, 7, 41, 43]),
    (10, 5, &[19, 22, 26, 40, 36, 32, 31, 43]),
    (11, 3, &[23, 21, 20, 27, 28, 27, 25, 38, 42, 47]),
    (12, 3, &[33, 34, 18, 23, 25, 26, 43, 9, 11]),
    (13, 5, &[29, 30, 24, 24, 39, 10, 16]),
    (14, 6, &[17]),
];

pub(crate) struct Grid {
    cells: Vec<TileId>,
}

impl Grid {
    pub(crate) fn new() -> Self {
        Self {
            cells: vec![EMPTY_TILE; (GRID_COLUMNS * GRID_ROWS) as usize],
        }
    }

    pub(crate) fn with_sample_layout() -> Self {
        let mut grid = Self::new();
        for (column, first_row, tiles) in SAMPLE_LAYOUT {
            for (offset, tile) in tiles.iter().enumerate() {
                grid.set_tile(column, first_row + offset as u32, *tile);
            }
        }
        grid
    }

    pub(crate) fn tile_at(&self, column: u32, row: u32) -> Option<TileId> {
        cell_index(column, row).map(|index| self.cells[index])
    }

    pub(crate) fn set_tile(&mut self, column: u32, row: u32, tile: TileId) -> bool {
        let Some(index) = cell_index(column, row) else {
            return false;
        };
        self.cells[index] = tile;
        true
    }

    pub(crate) fn painted_cell_count(&self) -> usize {
        self.cells.iter().filter(|tile| **tile != EMPTY_TILE).count()
    }
}

impl Entity<EditorContext> for Grid {
    fn debug_name(&self) -> &'static str {
        "grid"
    }

    fn position(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn update(&mut self, frame: &mut FrameContext<'_, EditorContext>) {
        let Some((column, row)) = frame.input().click().and_then(|point| point.cell()) else {
            return;
        };
        let tile = frame.shared().selection().tile();
        if self.set_tile(column, row, tile) {
            debug!(column, row, tile, "cell_painted");
        }
    }

    fn draw(&self, surface: &mut dyn Surface, context: &DrawContext<'_, EditorContext>) {
        let variants = context.shared.variants();
        for column in 0..GRID_COLUMNS {
            for row in 0..GRID_ROWS {
                let Some(tile) = self.tile_at(column, row) else {
                    continue;
                };
                // Empty cells and unloaded variants are skipped.
                if let Some(sprite) = variants.sprite(tile) {
                    surface.draw_image(
                        sprite,
                        (column * TILE_SIZE_PX) as i32,
                        (row * TILE_SIZE_PX) as i32,
                    );
                }
            }
        }
    }
}

fn cell_index(column: u32, row: u32) -> Option<usize> {
    if column >= GRID_COLUMNS || row >= GRID_ROWS {
        return None;
    }
    Some((column * GRID_ROWS + row) as usize)
}
