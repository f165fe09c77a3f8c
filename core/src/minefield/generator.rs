use crate::*;
use rand::prelude::*;

/// Strategy seam for producing mine layouts.
pub trait MineGenerator {
    fn generate(self, config: MinefieldConfig) -> MineLayout;
}

/// Samples distinct mine cells uniformly from a caller-provided seed, so the
/// same seed and config always reproduce the same board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomMineGenerator {
    seed: u64,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(self, config: MinefieldConfig) -> MineLayout {
        let (width, height) = config.size;
        let total_cells = config.total_cells();

        // optimize for full boards
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Mine field already full, generated anyway, requested {} but only fits {}",
                    config.mines,
                    total_cells
                );
            }
            return MineLayout::from_mask(Grid::from_elem(width, height, true), total_cells);
        }

        let mut mask: Grid<bool> = Grid::new(width, height);
        let mut placed = 0;
        let mut rng = SmallRng::seed_from_u64(self.seed);

        while placed < config.mines {
            let coords = (
                rng.random_range(0..width as Coord),
                rng.random_range(0..height as Coord),
            );
            if !mask.get(coords) {
                mask.set(coords, true);
                placed += 1;
            }
        }

        MineLayout::from_mask(mask, placed)
    }
}
