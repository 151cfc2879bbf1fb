use std::sync::Arc;

use engine::{EntityEngine, Sprite, WheelDirection};
use tracing::{debug, info};

use super::tiles::{CyclicPermutation, TileId, VariantTable};

mod cursor;
mod grid;
mod palette;

pub(crate) use cursor::CursorPreview;
pub(crate) use grid::Grid;
pub(crate) use palette::Palette;

pub(crate) const TILE_SIZE_PX: u32 = 32;
pub(crate) const GRID_COLUMNS: u32 = 32;
pub(crate) const GRID_ROWS: u32 = 24;
pub(crate) const GRID_PIXEL_WIDTH: u32 = GRID_COLUMNS * TILE_SIZE_PX;
const INITIAL_TILE: TileId = 1;

/// The tile the user paints with. ID and sprite always change together.
#[derive(Debug, Clone)]
pub(crate) struct SelectedTile {
    tile: TileId,
    sprite: Option<Arc<Sprite>>,
}

impl SelectedTile {
    fn resolve(tile: TileId, variants: &VariantTable) -> Self {
        Self {
            tile,
            sprite: variants.sprite(tile).cloned(),
        }
    }

    pub(crate) fn tile(&self) -> TileId {
        self.tile
    }

    pub(crate) fn sprite(&self) -> Option<&Arc<Sprite>> {
        self.sprite.as_ref()
    }
}

pub(crate) struct EditorContext {
    variants: Arc<VariantTable>,
    cycle: CyclicPermutation,
    selection: SelectedTile,
}

impl EditorContext {
    pub(crate) fn new(variants: Arc<VariantTable>) -> Self {
        let selection = SelectedTile::resolve(INITIAL_TILE, &variants);
        Self {
            variants,
            cycle: CyclicPermutation::rotation_cycle(),
            selection,
        }
    }

    pub(crate) fn variants(&self) -> &VariantTable {
        &self.variants
    }

    pub(crate) fn selection(&self) -> &SelectedTile {
        &self.selection
    }

    pub(crate) fn change_tile(&mut self, tile: TileId) {
        self.selection = SelectedTile::resolve(tile, &self.variants);
        debug!(tile, "selection_changed");
    }

    pub(crate) fn step_selection(&mut self, direction: WheelDirection) {
        let tile = self.cycle.step(self.selection.tile, direction);
        self.change_tile(tile);
    }
}

/// Entities draw in insertion order, so the cursor preview covers the grid and
/// the palette sits outside both.
pub(crate) fn build_editor_engine(variants: Arc<VariantTable>) -> EntityEngine<EditorContext> {
    let mut engine = EntityEngine::new(EditorContext::new(variants));
    let grid = Grid::with_sample_layout();
    info!(painted_cells = grid.painted_cell_count(), "sample_layout_loaded");
    engine.add_entity(Box::new(grid));
    engine.add_entity(Box::new(CursorPreview::new()));
    engine.add_entity(Box::new(Palette::new()));
    engine
}
