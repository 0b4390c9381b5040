use alloc::vec::Vec;
use ndarray::Array2;

use super::*;

/// Generation strategy that fills random cells up to the difficulty's target
/// density, then keeps adding filled cells until the solver accepts the grid.
///
/// Rejected candidates are never resampled from scratch and filled cells are
/// never taken back, so the fill rate rises monotonically and generation
/// always terminates: a saturated grid is trivially solvable. The same
/// monotonicity biases accepted grids toward the top of the difficulty's
/// fill band when many retries were needed.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomPuzzleGenerator {
    seed: u64,
}

impl RandomPuzzleGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl PuzzleGenerator for RandomPuzzleGenerator {
    fn generate(self, config: PuzzleConfig) -> Puzzle {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let width = config.size.0;
        let total = config.total_cells() as usize;

        let (low, high) = config.difficulty.fill_rate_band();
        let target_fill_rate = rng.random_range(low..high);
        // Truncation after +0.5 rounds; the product is never negative.
        let target = ((total as f32) * target_fill_rate + 0.5) as usize;

        let mut mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut available: Vec<usize> = (0..total).collect();
        for _ in 0..target {
            let Some(index) = pick_available(&mut available, &mut rng) else {
                break;
            };
            mask[from_flat(index, width).to_nd_index()] = true;
        }

        let mut extra_fills = 0u32;
        loop {
            let puzzle = Puzzle::from_fill_mask(mask.clone());
            let mut solver = Solver::for_puzzle(&puzzle, config.difficulty);
            if solver.can_solve_puzzle() {
                log::debug!(
                    "accepted candidate after {} extra fills, {}/{} cells filled",
                    extra_fills,
                    total - available.len(),
                    total
                );
                return puzzle;
            }

            let Some(index) = pick_available(&mut available, &mut rng) else {
                log::warn!("Saturated grid still rejected, returning it anyway");
                return puzzle;
            };
            mask[from_flat(index, width).to_nd_index()] = true;
            extra_fills += 1;
        }
    }
}

fn pick_available(available: &mut Vec<usize>, rng: &mut impl rand::Rng) -> Option<usize> {
    use rand::RngExt;

    if available.is_empty() {
        return None;
    }
    let pick = rng.random_range(0..available.len());
    Some(available.swap_remove(pick))
}
