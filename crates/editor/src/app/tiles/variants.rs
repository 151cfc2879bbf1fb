use std::collections::HashMap;
use std::sync::Arc;

use engine::{AssetLoader, Sprite};
use image::{imageops, RgbaImage};
use tracing::{debug, info, warn};

pub(crate) type TileId = u16;

pub(crate) const EMPTY_TILE: TileId = 0;
pub(crate) const TILE_COUNT: usize = 48;

pub(crate) const BASE_TILE_NAMES: [&str; 15] = [
    "tile1.png",
    "tile2.png",
    "tile3.png",
    "tile4.png",
    "tile5.png",
    "tile6.png",
    "tile7.png",
    "tile8.png",
    "tile9.png",
    "tile10.png",
    "tile11.png",
    "tile12.png",
    "tile13.png",
    "tile14.png",
    "tile15.png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Rotation {
    Upright,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    pub(crate) fn degrees(self) -> u16 {
        match self {
            Rotation::Upright => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VariantSpec {
    /// Index into `BASE_TILE_NAMES`.
    pub(crate) base: usize,
    pub(crate) rotation: Rotation,
}

const fn variant(base: usize, rotation: Rotation) -> Option<VariantSpec> {
    Some(VariantSpec { base, rotation })
}

use Rotation::{Half, Quarter, ThreeQuarter, Upright};

pub(crate) const VARIANT_SPECS: [Option<VariantSpec>; TILE_COUNT] = [
    None,
    variant(0, Upright),
    variant(1, Upright),
    variant(1, Quarter),
    variant(1, Half),
    variant(1, ThreeQuarter),
    variant(2, Upright),
    variant(2, Quarter),
    variant(2, Half),
    variant(2, ThreeQuarter),
    variant(3, Upright),
    variant(3, Quarter),
    variant(3, Half),
    variant(3, ThreeQuarter),
    variant(4, Upright),
    variant(4, Quarter),
    variant(5, Upright),
    variant(6, Upright),
    variant(6, Quarter),
    variant(6, Half),
    variant(6, ThreeQuarter),
    variant(7, Upright),
    variant(7, Quarter),
    variant(7, Half),
    variant(7, ThreeQuarter),
    variant(8, Upright),
    variant(8, Quarter),
    variant(8, Half),
    variant(8, ThreeQuarter),
    variant(10, Upright),
    variant(10, Quarter),
    variant(9, Upright),
    variant(11, Upright),
    variant(11, Quarter),
    variant(11, Half),
    variant(11, ThreeQuarter),
    variant(12, Upright),
    variant(12, Quarter),
    variant(12, Half),
    variant(12, ThreeQuarter),
    variant(13, Upright),
    variant(13, Quarter),
    variant(13, Half),
    variant(13, ThreeQuarter),
    variant(14, Upright),
    variant(14, Quarter),
    variant(14, Half),
    variant(14, ThreeQuarter),
];

#[derive(Debug, Clone)]
pub(crate) struct VariantTable {
    slots: Vec<Option<Arc<Sprite>>>,
}

impl VariantTable {
    pub(crate) fn from_loader(loader: &AssetLoader) -> Self {
        Self::build(|name| loader.get(name))
    }

    pub(crate) fn build(lookup: impl Fn(&str) -> Option<Arc<Sprite>>) -> Self {
        let bases: Vec<Option<Arc<Sprite>>> =
            BASE_TILE_NAMES.iter().map(|name| lookup(name)).collect();
        for (name, base) in BASE_TILE_NAMES.iter().zip(&bases) {
            if base.is_none() {
                warn!(asset = name, "tile_base_sprite_missing");
            }
        }

        let mut rotation_cache: HashMap<(usize, Rotation), Arc<Sprite>> = HashMap::new();
        let slots: Vec<Option<Arc<Sprite>>> = VARIANT_SPECS
            .iter()
            .map(|spec| {
                let spec = (*spec)?;
                let base = bases.get(spec.base)?.as_ref()?;
                if spec.rotation == Rotation::Upright {
                    return Some(Arc::clone(base));
                }
                let rotated = rotation_cache
                    .entry((spec.base, spec.rotation))
                    .or_insert_with(|| {
                        debug!(
                            asset = BASE_TILE_NAMES[spec.base],
                            degrees = spec.rotation.degrees(),
                            "tile_variant_rotated"
                        );
                        Arc::new(rotate_into_square(base, spec.rotation))
                    });
                Some(Arc::clone(rotated))
            })
            .collect();

        info!(
            resolved = slots.iter().filter(|slot| slot.is_some()).count(),
            rotated = rotation_cache.len(),
            "variant_table_built"
        );
        Self { slots }
    }

    /// `None` for the empty tile, unknown IDs, and variants whose base failed to load.
    pub(crate) fn sprite(&self, tile: TileId) -> Option<&Arc<Sprite>> {
        self.slots.get(usize::from(tile))?.as_ref()
    }
}

/// Centers `sprite` on a square canvas sized to its longer side, then turns the
/// canvas clockwise about its center.
pub(crate) fn rotate_into_square(sprite: &Sprite, rotation: Rotation) -> Sprite {
    let size = sprite.width().max(sprite.height());
    let mut canvas = RgbaImage::new(size, size);
    let offset_x = (size - sprite.width()) / 2;
    let offset_y = (size - sprite.height()) / 2;
    imageops::overlay(
        &mut canvas,
        sprite.image(),
        i64::from(offset_x),
        i64::from(offset_y),
    );
    let rotated = match rotation {
        Rotation::Upright => canvas,
        Rotation::Quarter => imageops::rotate90(&canvas),
        Rotation::Half => imageops::rotate180(&canvas),
        Rotation::ThreeQuarter => imageops::rotate270(&canvas),
    };
    Sprite::new(rotated)
}
