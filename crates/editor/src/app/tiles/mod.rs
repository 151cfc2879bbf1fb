pub(crate) mod cycle;
pub(crate) mod variants;

pub(crate) use cycle::CyclicPermutation;
pub(crate) use variants::{TileId, VariantTable, BASE_TILE_NAMES, EMPTY_TILE};
