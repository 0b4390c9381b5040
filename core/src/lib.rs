#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use line::*;
pub use puzzle::*;
pub use solver::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod line;
mod puzzle;
mod solver;
mod tile;
mod types;

/// Player skill level a puzzle is generated and solved at.
///
/// Difficulty couples directly to the solver's conservatism: lower skill
/// levels require larger certain spans before the solver commits a
/// deduction, so the same grid can verify as solvable on hard and
/// unsolvable on easy. Sparser fill bands do the rest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Band of target fill rates for generated solutions. Sparser grids
    /// give the solver less to anchor on and play harder.
    pub const fn fill_rate_band(self) -> (f32, f32) {
        match self {
            Self::Easy => (0.65, 0.75),
            Self::Medium => (0.50, 0.60),
            Self::Hard => (0.35, 0.45),
        }
    }

    /// Smallest certain span the solver may commit at this skill level, for
    /// a grid whose larger dimension is `size`. Pinned runs are exempt.
    pub const fn min_inference_len(self, size: Coord) -> usize {
        let size = size as usize;
        let len = match self {
            Self::Easy => (size + 2) / 4,
            Self::Medium => (size + 3) / 6,
            Self::Hard => 1,
        };
        if len > 1 { len } else { 1 }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub size: Coord2,
    pub difficulty: Difficulty,
}

impl PuzzleConfig {
    pub const fn new_unchecked(size: Coord2, difficulty: Difficulty) -> Self {
        Self { size, difficulty }
    }

    pub fn new((size_x, size_y): Coord2, difficulty: Difficulty) -> Self {
        let size_x = size_x.clamp(1, Coord::MAX);
        let size_y = size_y.clamp(1, Coord::MAX);
        Self::new_unchecked((size_x, size_y), difficulty)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}
