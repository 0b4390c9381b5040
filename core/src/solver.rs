use alloc::vec::Vec;
use core::ops::Range;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// One line-deduction step, ready for a hint overlay or the solve loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverAttempt {
    pub line: LineId,
    pub min_ranges: Vec<Range<usize>>,
    pub max_ranges: Vec<Range<usize>>,
    pub old_states: Vec<TileState>,
    pub new_states: Vec<TileState>,
    pub made_progress: bool,
    pub complete: bool,
}

/// Constraint-propagation solver over the clue tables of one puzzle.
///
/// The solver keeps its own tile grid, independent of any [`Puzzle`]; a
/// gameplay layer mirrors player edits into it with [`Solver::set`]. It
/// only ever deduces line-locally and never guesses, so it can report a
/// puzzle as unsolvable that a backtracking solver would crack. That is the
/// intended behavior: the generator uses exactly this conservatism to grade
/// difficulty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solver {
    rows: Vec<LineClues>,
    columns: Vec<LineClues>,
    tiles: Array2<TileState>,
    min_inference_len: usize,
    cursor: usize,
}

impl Solver {
    /// Builds a solver from per-row and per-column clue tables.
    ///
    /// The skill level sets the minimum certain-span length the solver may
    /// commit, tying deduction aggressiveness to difficulty.
    pub fn new(rows: Vec<LineClues>, columns: Vec<LineClues>, skill: Difficulty) -> Self {
        let width = columns.len() as Coord;
        let height = rows.len() as Coord;
        let min_inference_len = skill.min_inference_len(width.max(height));
        Self {
            rows,
            columns,
            tiles: Array2::default([width as usize, height as usize]),
            min_inference_len,
            cursor: 0,
        }
    }

    pub fn for_puzzle(puzzle: &Puzzle, skill: Difficulty) -> Self {
        Self::new(puzzle.row_clues(), puzzle.column_clues(), skill)
    }

    pub fn width(&self) -> Coord {
        self.columns.len() as Coord
    }

    pub fn height(&self) -> Coord {
        self.rows.len() as Coord
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.width(), self.height())
    }

    pub fn tile(&self, coords: Coord2) -> TileState {
        self.tiles[coords.to_nd_index()]
    }

    /// Overwrites one cell, mirroring an external edit. No validation and
    /// no derived recomputation.
    pub fn set(&mut self, coords: Coord2, state: TileState) {
        self.tiles[coords.to_nd_index()] = state;
    }

    /// Same as [`Solver::set`] with a row-major cell index.
    pub fn set_index(&mut self, index: usize, state: TileState) {
        self.set(from_flat(index, self.width()), state);
    }

    fn clues(&self, line: LineId) -> &LineClues {
        match line {
            LineId::Row(y) => &self.rows[y as usize],
            LineId::Column(x) => &self.columns[x as usize],
        }
    }

    fn line_states(&self, line: LineId) -> Vec<TileState> {
        match line {
            LineId::Row(y) => (0..self.width())
                .map(|x| self.tiles[(x, y).to_nd_index()])
                .collect(),
            LineId::Column(x) => (0..self.height())
                .map(|y| self.tiles[(x, y).to_nd_index()])
                .collect(),
        }
    }

    /// Runs the line engine over one line without touching the grid.
    pub fn attempt(&self, line: LineId) -> SolverAttempt {
        let old_states = self.line_states(line);
        let deduction = deduce_line(&old_states, self.clues(line), self.min_inference_len);
        SolverAttempt {
            line,
            min_ranges: deduction.min_ranges,
            max_ranges: deduction.max_ranges,
            old_states,
            new_states: deduction.new_states,
            made_progress: deduction.made_progress,
            complete: deduction.complete,
        }
    }

    /// Finds the next line where deduction makes progress, for hints.
    ///
    /// Scans blank cells in row-major order starting at the rotating cursor,
    /// trying each cell's row before its column, and returns the first
    /// attempt that makes progress. The grid is not mutated, so repeated
    /// calls return the same attempt until an external edit lands.
    pub fn step(&mut self) -> Option<SolverAttempt> {
        let total = self.total_cells() as usize;
        let width = self.width();
        for offset in 0..total {
            let index = (self.cursor + offset) % total;
            let (x, y) = from_flat(index, width);
            if !self.tiles[(x, y).to_nd_index()].is_blank() {
                continue;
            }
            for line in [LineId::Row(y), LineId::Column(x)] {
                let attempt = self.attempt(line);
                if attempt.made_progress {
                    self.cursor = index;
                    return Some(attempt);
                }
            }
        }
        None
    }

    /// Writes an attempt's newly deduced cells into the grid. Cells that
    /// were already set are left alone.
    fn write_back(&mut self, attempt: &SolverAttempt) {
        for (offset, (&old, &new)) in attempt
            .old_states
            .iter()
            .zip(&attempt.new_states)
            .enumerate()
        {
            if old.is_blank() && new.is_set() {
                let coords = match attempt.line {
                    LineId::Row(y) => (offset as Coord, y),
                    LineId::Column(x) => (x, offset as Coord),
                };
                self.tiles[coords.to_nd_index()] = new;
            }
        }
    }

    /// Whether the puzzle resolves fully under pure line-local deduction.
    ///
    /// Passes over all not-yet-complete rows, then columns, writing every
    /// deduction back. Lines leave the working set once complete. `false`
    /// means a full pass made no progress anywhere: the puzzle needs
    /// guessing (or a smaller inference gate) and the caller should treat
    /// that as an ordinary rejection, not an error.
    pub fn can_solve_puzzle(&mut self) -> bool {
        let mut open_rows: Vec<Coord> = (0..self.height()).collect();
        let mut open_columns: Vec<Coord> = (0..self.width()).collect();
        let mut pass = 0u32;

        loop {
            let mut progress = false;

            let mut still_open = Vec::with_capacity(open_rows.len());
            for &y in &open_rows {
                let attempt = self.attempt(LineId::Row(y));
                progress |= attempt.made_progress;
                self.write_back(&attempt);
                if !attempt.complete {
                    still_open.push(y);
                }
            }
            open_rows = still_open;

            let mut still_open = Vec::with_capacity(open_columns.len());
            for &x in &open_columns {
                let attempt = self.attempt(LineId::Column(x));
                progress |= attempt.made_progress;
                self.write_back(&attempt);
                if !attempt.complete {
                    still_open.push(x);
                }
            }
            open_columns = still_open;

            pass += 1;
            log::trace!(
                "solve pass {}: {} rows / {} columns open",
                pass,
                open_rows.len(),
                open_columns.len()
            );

            if open_rows.is_empty() && open_columns.is_empty() {
                return true;
            }
            if !progress {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use smallvec::smallvec;

    use super::*;

    fn puzzle(rows: &[&str]) -> Puzzle {
        let tiles: Vec<TileState> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| {
                if c == '1' {
                    TileState::Filled
                } else {
                    TileState::Blocked
                }
            })
            .collect();
        let size = (rows[0].len() as Coord, rows.len() as Coord);
        Puzzle::new(size, &tiles).unwrap()
    }

    fn solver(rows: &[&str], skill: Difficulty) -> (Puzzle, Solver) {
        let puzzle = puzzle(rows);
        let solver = Solver::for_puzzle(&puzzle, skill);
        (puzzle, solver)
    }

    #[test]
    fn solves_a_line_deducible_grid_exactly() {
        let (mut puzzle, mut solver) = solver(
            &["000000", "011111", "111100", "110110", "011101", "111111"],
            Difficulty::Hard,
        );
        assert!(solver.can_solve_puzzle());

        puzzle.solve();
        for y in 0..puzzle.height() {
            for x in 0..puzzle.width() {
                assert_eq!(solver.tile((x, y)), puzzle.tile((x, y)), "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn reports_ambiguous_grids_as_unsolvable() {
        // Two mirrored diagonal solutions share these clues.
        let (_, mut solver) = solver(&["10", "01"], Difficulty::Hard);
        assert!(!solver.can_solve_puzzle());
    }

    #[test]
    fn mirrored_player_edits_unlock_deduction() {
        let (_, mut solver) = solver(&["10", "01"], Difficulty::Hard);
        solver.set((0, 0), TileState::Filled);
        assert!(solver.can_solve_puzzle());
        assert_eq!(solver.tile((1, 0)), TileState::Blocked);
        assert_eq!(solver.tile((1, 1)), TileState::Filled);
    }

    #[test]
    fn step_is_read_only_and_idempotent() {
        let (_, mut solver) = solver(
            &["000000", "011111", "111100", "110110", "011101", "111111"],
            Difficulty::Hard,
        );
        let first = solver.step().expect("grid has deducible lines");
        let second = solver.step().expect("grid has deducible lines");
        assert_eq!(first, second);
        for y in 0..solver.height() {
            for x in 0..solver.width() {
                assert_eq!(solver.tile((x, y)), TileState::Blank);
            }
        }
    }

    #[test]
    fn step_returns_none_when_no_line_yields_progress() {
        let (_, mut solver) = solver(&["10", "01"], Difficulty::Hard);
        assert!(solver.step().is_none());
    }

    #[test]
    fn step_advances_after_its_result_is_applied() {
        let (_, mut solver) = solver(&["110", "000", "011"], Difficulty::Hard);
        let attempt = solver.step().expect("first line is deducible");
        assert!(attempt.made_progress);

        for (offset, &state) in attempt.new_states.iter().enumerate() {
            if state.is_set() {
                let coords = match attempt.line {
                    LineId::Row(y) => (offset as Coord, y),
                    LineId::Column(x) => (x, offset as Coord),
                };
                solver.set(coords, state);
            }
        }
        let next = solver.step().expect("more lines remain");
        assert_ne!(attempt, next);
    }

    #[test]
    fn easy_skill_gates_narrow_deductions() {
        // `[4, 2]` on a blank 8-cell row overlaps by 3 and by 1; an easy
        // solver on an 8-wide grid only commits spans of 2 or more.
        let rows: Vec<LineClues> = (0..8)
            .map(|y| {
                if y == 0 {
                    smallvec![4, 2]
                } else {
                    LineClues::new()
                }
            })
            .collect();
        let columns: Vec<LineClues> = (0..8).map(|_| LineClues::new()).collect();

        let hard = Solver::new(rows.clone(), columns.clone(), Difficulty::Hard);
        let easy = Solver::new(rows, columns, Difficulty::Easy);
        let hard_attempt = hard.attempt(LineId::Row(0));
        let easy_attempt = easy.attempt(LineId::Row(0));

        assert_eq!(hard_attempt.new_states[6], TileState::Filled);
        assert_eq!(easy_attempt.new_states[6], TileState::Blank);
        // The wide overlap clears the gate at either skill.
        assert_eq!(hard_attempt.new_states[2], TileState::Filled);
        assert_eq!(easy_attempt.new_states[2], TileState::Filled);
    }

    #[test]
    fn set_index_uses_row_major_order() {
        let (_, mut solver) = solver(&["10", "01"], Difficulty::Hard);
        solver.set_index(3, TileState::Filled);
        assert_eq!(solver.tile((1, 1)), TileState::Filled);
    }
}
