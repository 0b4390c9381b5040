use crate::*;
pub use random::*;

mod random;

pub trait PuzzleGenerator {
    fn generate(self, config: PuzzleConfig) -> Puzzle;
}
