use alloc::vec::Vec;
use core::ops::Range;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Names a single row or column, the unit of constraint propagation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineId {
    Row(Coord),
    Column(Coord),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentState {
    Missing,
    Complete,
}

impl SegmentState {
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// One clue run of a line, annotated against the player's current tiles.
///
/// `Complete` means every cell of the run is filled and both sides are
/// closed off by blocked tiles or the grid edge, so the clue entry can be
/// struck through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub range: Range<usize>,
    pub state: SegmentState,
}

/// The target solution plus the player's current tile grid.
///
/// The solution never changes after construction; `tiles` is mutated by
/// player-driven edits and by [`Puzzle::solve`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    solution: Array2<bool>,
    tiles: Array2<TileState>,
}

impl Puzzle {
    /// Builds a puzzle from a row-major slice of `Filled`/`Blocked` tiles.
    pub fn new(size: Coord2, solution: &[TileState]) -> Result<Self> {
        let (width, height) = size;
        if solution.len() != mult(width, height) as usize {
            return Err(GameError::InvalidSolutionShape);
        }
        let mut mask: Array2<bool> = Array2::default(size.to_nd_index());
        for (index, &state) in solution.iter().enumerate() {
            mask[from_flat(index, width).to_nd_index()] = match state {
                TileState::Filled => true,
                TileState::Blocked => false,
                TileState::Blank | TileState::Error => {
                    return Err(GameError::UndeterminedSolutionTile);
                }
            };
        }
        Ok(Self::from_fill_mask(mask))
    }

    /// Builds a puzzle straight from a fill mask, with all tiles blank.
    pub fn from_fill_mask(mask: Array2<bool>) -> Self {
        let dim = mask.raw_dim();
        Self {
            solution: mask,
            tiles: Array2::default(dim),
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.solution.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.width(), self.height())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile(&self, coords: Coord2) -> TileState {
        self.tiles[coords.to_nd_index()]
    }

    /// Row-major index of `coords`, as used by the solver scan and the
    /// transaction log.
    pub fn tile_index(&self, coords: Coord2) -> usize {
        to_flat(coords, self.width())
    }

    pub fn set_tile(&mut self, coords: Coord2, state: TileState) -> Result<()> {
        let coords = self.validate_coords(coords)?;
        self.tiles[coords.to_nd_index()] = state;
        Ok(())
    }

    pub(crate) fn set_tile_index(&mut self, index: usize, state: TileState) {
        let coords = from_flat(index, self.width());
        self.tiles[coords.to_nd_index()] = state;
    }

    pub fn solution_filled(&self, coords: Coord2) -> bool {
        self.solution[coords.to_nd_index()]
    }

    fn line_len(&self, line: LineId) -> usize {
        match line {
            LineId::Row(_) => self.width() as usize,
            LineId::Column(_) => self.height() as usize,
        }
    }

    fn solution_line(&self, line: LineId) -> Vec<bool> {
        self.line_coords(line)
            .map(|coords| self.solution[coords.to_nd_index()])
            .collect()
    }

    fn tile_line(&self, line: LineId) -> Vec<TileState> {
        self.line_coords(line)
            .map(|coords| self.tiles[coords.to_nd_index()])
            .collect()
    }

    fn line_coords(&self, line: LineId) -> impl Iterator<Item = Coord2> + use<> {
        let len = self.line_len(line) as Coord;
        (0..len).map(move |offset| match line {
            LineId::Row(y) => (offset, y),
            LineId::Column(x) => (x, offset),
        })
    }

    /// Maximal filled runs of the solution for one line. This is the clue
    /// derivation: the run lengths are the clue numbers.
    pub fn segment_ranges(&self, line: LineId) -> Vec<Range<usize>> {
        scan_runs(&self.solution_line(line), |filled| filled)
    }

    /// The line's runs annotated as missing or complete against the current
    /// tiles. `Error` tiles count as blocked when judging closure.
    pub fn segments(&self, line: LineId) -> Vec<Segment> {
        let tiles = self.tile_line(line);
        self.segment_ranges(line)
            .into_iter()
            .map(|range| {
                let filled = range.clone().all(|i| tiles[i].is_filled());
                let closed_before = range.start == 0 || tiles[range.start - 1].rules_out_fill();
                let closed_after = range.end == tiles.len() || tiles[range.end].rules_out_fill();
                let state = if filled && closed_before && closed_after {
                    SegmentState::Complete
                } else {
                    SegmentState::Missing
                };
                Segment { range, state }
            })
            .collect()
    }

    pub fn clues(&self, line: LineId) -> LineClues {
        self.segment_ranges(line)
            .iter()
            .map(|range| range.len() as Coord)
            .collect()
    }

    pub fn row_clues(&self) -> Vec<LineClues> {
        (0..self.height()).map(|y| self.clues(LineId::Row(y))).collect()
    }

    pub fn column_clues(&self) -> Vec<LineClues> {
        (0..self.width()).map(|x| self.clues(LineId::Column(x))).collect()
    }

    /// Only the filled/not-filled bit decides the win; blocked, blank and
    /// error marks on non-solution cells are all equally fine.
    pub fn is_solved(&self) -> bool {
        self.solution
            .iter()
            .zip(&self.tiles)
            .all(|(&filled, &tile)| filled == tile.is_filled())
    }

    /// Reveals the full solution. Error marks stay put, they are not
    /// retroactively cleared.
    pub fn solve(&mut self) {
        for (&filled, tile) in self.solution.iter().zip(self.tiles.iter_mut()) {
            *tile = match (filled, *tile) {
                (_, TileState::Error) => TileState::Error,
                (true, _) => TileState::Filled,
                (false, _) => TileState::Blocked,
            };
        }
    }
}
