use engine::WheelDirection;

use super::variants::{TileId, TILE_COUNT};

/// Forward step for every tile ID. Rotations of the same base form one cycle;
/// unrotatable tiles map to themselves.
const SCROLL_FORWARD: [TileId; TILE_COUNT] = [
    0, 1, 5, 2, 3, 4, 9, 6, 7, 8, 13, 10, 11, 12, 15, 14, 16, 20, 17, 18, 19, 24, 21, 22, 23, 28,
    25, 26, 27, 30, 29, 31, 35, 32, 33, 34, 39, 36, 37, 38, 43, 40, 41, 42, 47, 44, 45, 46,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CyclicPermutation {
    next: Vec<TileId>,
    previous: Vec<TileId>,
}

impl CyclicPermutation {
    pub(crate) fn rotation_cycle() -> Self {
        let next = SCROLL_FORWARD.to_vec();
        let previous = invert(&next);
        Self { next, previous }
    }

    /// Unknown IDs step to themselves.
    pub(crate) fn next(&self, tile: TileId) -> TileId {
        self.next.get(usize::from(tile)).copied().unwrap_or(tile)
    }

    pub(crate) fn previous(&self, tile: TileId) -> TileId {
        self.previous.get(usize::from(tile)).copied().unwrap_or(tile)
    }

    pub(crate) fn step(&self, tile: TileId, direction: WheelDirection) -> TileId {
        match direction {
            WheelDirection::Up => self.next(tile),
            WheelDirection::Down => self.previous(tile),
        }
    }
}

fn invert(next: &[TileId]) -> Vec<TileId> {
    let mut previous = vec![0; next.len()];
    for (tile, &target) in next.iter().enumerate() {
        if let Some(slot) = previous.get_mut(usize::from(target)) {
            *slot = tile as TileId;
        }
    }
    previous
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tiles::variants::VARIANT_SPECS;

    fn all_tiles() -> impl Iterator<Item = TileId> {
        (0..TILE_COUNT).map(|tile| tile as TileId)
    }

    #[test]
    fn rotation_table_is_a_valid_permutation() {
        let mut targets = SCROLL_FORWARD.to_vec();
        targets.sort_unstable();
        assert_eq!(targets, all_tiles().collect::<Vec<_>>());
    }

    #[test]
    fn previous_undoes_next_for_every_tile() {
        let cycle = CyclicPermutation::rotation_cycle();
        for tile in all_tiles() {
            assert_eq!(cycle.previous(cycle.next(tile)), tile);
            assert_eq!(cycle.next(cycle.previous(tile)), tile);
        }
    }

    #[test]
    fn forty_eight_steps_return_to_start() {
        let cycle = CyclicPermutation::rotation_cycle();
        for start in all_tiles() {
            let mut forward = start;
            let mut backward = start;
            for _ in 0..TILE_COUNT {
                forward = cycle.next(forward);
                backward = cycle.previous(backward);
            }
            assert_eq!(forward, start);
            assert_eq!(backward, start);
        }
    }

    #[test]
    fn stepping_never_leaves_the_base_sprite() {
        let cycle = CyclicPermutation::rotation_cycle();
        for tile in all_tiles() {
            let base_of = |id: TileId| VARIANT_SPECS[usize::from(id)].map(|spec| spec.base);
            assert_eq!(base_of(cycle.next(tile)), base_of(tile), "tile={tile}");
            assert_eq!(base_of(cycle.previous(tile)), base_of(tile), "tile={tile}");
        }
    }

    #[test]
    fn known_steps_match_the_rotation_order() {
        let cycle = CyclicPermutation::rotation_cycle();
        assert_eq!(cycle.step(2, WheelDirection::Up), 5);
        assert_eq!(cycle.step(2, WheelDirection::Down), 3);
        assert_eq!(cycle.step(14, WheelDirection::Up), 15);
        assert_eq!(cycle.step(15, WheelDirection::Up), 14);
        assert_eq!(cycle.step(16, WheelDirection::Down), 16);
        assert_eq!(cycle.step(0, WheelDirection::Up), 0);
    }

    #[test]
    fn unknown_ids_step_to_themselves() {
        let cycle = CyclicPermutation::rotation_cycle();
        assert_eq!(cycle.next(200), 200);
        assert_eq!(cycle.previous(200), 200);
    }
}
