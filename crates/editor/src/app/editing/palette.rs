use engine::{DrawContext, Entity, FrameContext, Surface, Vec2};
use tracing::debug;

use super::{EditorContext, TILE_SIZE_PX};
use crate::app::tiles::TileId;

/// The upright variant of every base tile, top to bottom.
pub(crate) const PALETTE_TILES: [TileId; 15] =
    [1, 2, 6, 10, 14, 16, 17, 21, 25, 29, 31, 32, 36, 40, 44];

const PALETTE_COLUMN: u32 = 33;
const PALETTE_FIRST_ROW: u32 = 2;
const BUTTON_GAP_PX: u32 = 8;

/// Column of tile buttons to the right of the grid. Clicks arrive in surface
/// pixels because the palette sits past the grid boundary.
pub(crate) struct Palette {
    column: u32,
    first_row: u32,
}

impl Palette {
    pub(crate) fn new() -> Self {
        Self {
            column: PALETTE_COLUMN,
            first_row: PALETTE_FIRST_ROW,
        }
    }

    fn left(&self) -> u32 {
        self.column * TILE_SIZE_PX
    }

    fn button_top(&self, index: usize) -> u32 {
        let index = index as u32;
        (self.first_row + index) * TILE_SIZE_PX + BUTTON_GAP_PX * index
    }

    pub(crate) fn button_at(&self, x: f32, y: f32) -> Option<usize> {
        let left = self.left() as f32;
        if x < left || x >= left + TILE_SIZE_PX as f32 {
            return None;
        }
        (0..PALETTE_TILES.len()).find(|index| {
            let top = self.button_top(*index) as f32;
            y >= top && y < top + TILE_SIZE_PX as f32
        })
    }
}

impl Entity<EditorContext> for Palette {
    fn debug_name(&self) -> &'static str {
        "palette"
    }

    fn position(&self) -> Vec2 {
        Vec2::new(self.left() as f32, self.button_top(0) as f32)
    }

    fn update(&mut self, frame: &mut FrameContext<'_, EditorContext>) {
        let Some((x, y)) = frame.input().click().and_then(|point| point.surface()) else {
            return;
        };
        match self.button_at(x, y) {
            Some(index) => {
                let tile = PALETTE_TILES[index];
                debug!(index, tile, "palette_button_clicked");
                frame.shared_mut().change_tile(tile);
            }
            None => debug!(x, y, "palette_click_missed"),
        }
    }

    fn draw(&self, surface: &mut dyn Surface, context: &DrawContext<'_, EditorContext>) {
        let variants = context.shared.variants();
        for (index, tile) in PALETTE_TILES.iter().enumerate() {
            if let Some(sprite) = variants.sprite(*tile) {
                surface.draw_image(sprite, self.left() as i32, self.button_top(index) as i32);
            }
        }
    }
}
