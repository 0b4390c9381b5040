use alloc::vec::Vec;
use core::ops::BitOr;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Whether player fills are checked against the solution as they land.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillSemantics {
    /// Fills land as painted; mistakes surface only at the end.
    Free,
    /// A fill that contradicts the solution lands as [`TileState::Error`].
    Checked,
}

impl Default for FillSemantics {
    fn default() -> Self {
        Self::Free
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PaintOutcome {
    NoChange,
    Painted,
    /// The edit landed as an error mark (checked fills only).
    Faulted,
    Won,
}

impl PaintOutcome {
    pub const fn has_update(self) -> bool {
        use PaintOutcome::*;
        match self {
            NoChange => false,
            Painted => true,
            Faulted => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when applying grouped edits.
impl BitOr for PaintOutcome {
    type Output = PaintOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use PaintOutcome::*;
        match (self, rhs) {
            (Won, _) => Won,
            (_, Won) => Won,
            (Faulted, _) => Faulted,
            (_, Faulted) => Faulted,
            (Painted, _) => Painted,
            (_, Painted) => Painted,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// One cell edit, keyed by row-major index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    pub index: usize,
    pub old: TileState,
    pub new: TileState,
}

/// A history entry: either one edit or a batch applied as a unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Single(TileChange),
    Group(Vec<TileChange>),
}

impl Transaction {
    pub fn changes(&self) -> &[TileChange] {
        match self {
            Self::Single(change) => core::slice::from_ref(change),
            Self::Group(changes) => changes,
        }
    }
}

/// Rolls a transaction back on the puzzle's tiles.
pub fn apply_undo(puzzle: &mut Puzzle, transaction: &Transaction) {
    for change in transaction.changes().iter().rev() {
        puzzle.set_tile_index(change.index, change.old);
    }
}

/// Replays a transaction on the puzzle's tiles.
pub fn apply_redo(puzzle: &mut Puzzle, transaction: &Transaction) {
    for change in transaction.changes() {
        puzzle.set_tile_index(change.index, change.new);
    }
}

/// Gameplay engine for one puzzle session.
///
/// Owns the puzzle, the undo/redo history and a hint solver that mirrors
/// every player edit, so a hint is always computed against the player's
/// current knowledge rather than a blank grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    puzzle: Puzzle,
    hint_solver: Solver,
    fill_semantics: FillSemantics,
    state: EngineState,
    move_count: u32,
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
}

impl PlayEngine {
    pub fn new(puzzle: Puzzle, skill: Difficulty, fill_semantics: FillSemantics) -> Self {
        let hint_solver = Solver::for_puzzle(&puzzle, skill);
        Self {
            puzzle,
            hint_solver,
            fill_semantics,
            state: Default::default(),
            move_count: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn can_paint_at(&self, coords: Coord2) -> bool {
        !self.state.is_finished() && self.puzzle.validate_coords(coords).is_ok()
    }

    /// Applies one player edit. `mark` is the intended state, one of
    /// `Blank` (erase), `Filled` or `Blocked`; passing `Error` is a caller
    /// bug.
    pub fn paint(&mut self, coords: Coord2, mark: TileState) -> Result<PaintOutcome> {
        let coords = self.puzzle.validate_coords(coords)?;
        self.check_not_finished()?;

        let Some(change) = self.resolve_edit(coords, mark) else {
            return Ok(PaintOutcome::NoChange);
        };

        self.commit(Transaction::Single(change));
        Ok(self.settle_outcome(change))
    }

    /// Applies a batch of edits as one undoable unit, merging the outcomes.
    pub fn paint_group(&mut self, edits: &[(Coord2, TileState)]) -> Result<PaintOutcome> {
        self.check_not_finished()?;
        for &(coords, _) in edits {
            self.puzzle.validate_coords(coords)?;
        }

        let mut changes = Vec::new();
        for &(coords, mark) in edits {
            if let Some(change) = self.resolve_edit(coords, mark) {
                self.puzzle.set_tile_index(change.index, change.new);
                self.hint_solver.set_index(change.index, change.new);
                changes.push(change);
            }
        }
        if changes.is_empty() {
            return Ok(PaintOutcome::NoChange);
        }

        // Cells are already written; commit only records and syncs state.
        let outcome = changes
            .iter()
            .map(|&change| self.settle_outcome(change))
            .reduce(BitOr::bitor)
            .unwrap_or(PaintOutcome::NoChange);
        self.undo_stack.push(Transaction::Group(changes));
        self.redo_stack.clear();
        self.move_count += 1;
        self.mark_started();
        Ok(outcome)
    }

    pub fn undo(&mut self) -> Result<PaintOutcome> {
        self.check_not_finished()?;
        let Some(transaction) = self.undo_stack.pop() else {
            return Ok(PaintOutcome::NoChange);
        };
        apply_undo(&mut self.puzzle, &transaction);
        self.sync_solver(&transaction);
        self.redo_stack.push(transaction);
        Ok(PaintOutcome::Painted)
    }

    pub fn redo(&mut self) -> Result<PaintOutcome> {
        self.check_not_finished()?;
        let Some(transaction) = self.redo_stack.pop() else {
            return Ok(PaintOutcome::NoChange);
        };
        apply_redo(&mut self.puzzle, &transaction);
        self.sync_solver(&transaction);
        self.undo_stack.push(transaction);
        let won = self.check_win();
        Ok(if won {
            PaintOutcome::Won
        } else {
            PaintOutcome::Painted
        })
    }

    /// Next deducible line for the hint overlay, if any.
    pub fn hint(&mut self) -> Option<SolverAttempt> {
        if self.state.is_finished() {
            return None;
        }
        self.hint_solver.step()
    }

    /// Figures out what `mark` actually lands as, or `None` for a no-op.
    fn resolve_edit(&self, coords: Coord2, mark: TileState) -> Option<TileChange> {
        debug_assert!(mark != TileState::Error, "error marks are derived, not painted");

        let old = self.puzzle.tile(coords);
        let new = match mark {
            TileState::Filled
                if matches!(self.fill_semantics, FillSemantics::Checked)
                    && !self.puzzle.solution_filled(coords) =>
            {
                TileState::Error
            }
            other => other,
        };
        if old == new {
            return None;
        }
        Some(TileChange {
            index: self.puzzle.tile_index(coords),
            old,
            new,
        })
    }

    fn commit(&mut self, transaction: Transaction) {
        apply_redo(&mut self.puzzle, &transaction);
        self.sync_solver(&transaction);
        self.undo_stack.push(transaction);
        self.redo_stack.clear();
        self.move_count += 1;
        self.mark_started();
    }

    /// Mirrors a transaction's cells from the puzzle into the hint solver.
    fn sync_solver(&mut self, transaction: &Transaction) {
        for change in transaction.changes() {
            let state = self
                .puzzle
                .tile(from_flat(change.index, self.puzzle.width()));
            self.hint_solver.set_index(change.index, state);
        }
    }

    fn settle_outcome(&mut self, change: TileChange) -> PaintOutcome {
        if self.check_win() {
            PaintOutcome::Won
        } else if change.new == TileState::Error {
            PaintOutcome::Faulted
        } else {
            PaintOutcome::Painted
        }
    }

    fn check_win(&mut self) -> bool {
        if self.state.is_finished() {
            return true;
        }
        if !self.puzzle.is_solved() {
            return false;
        }
        self.state = EngineState::Won;
        // Completion reveals the remaining blocked cells.
        self.puzzle.solve();
        log::debug!("puzzle solved after {} moves", self.move_count);
        true
    }

    fn mark_started(&mut self) {
        if matches!(self.state, EngineState::Ready) {
            log::debug!("first move made, session active");
            self.state = EngineState::Active;
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use TileState::*;

    fn puzzle(rows: &[&str]) -> Puzzle {
        let tiles: Vec<TileState> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| if c == '1' { Filled } else { Blocked })
            .collect();
        let size = (rows[0].len() as Coord, rows.len() as Coord);
        Puzzle::new(size, &tiles).unwrap()
    }

    fn engine(rows: &[&str], fill_semantics: FillSemantics) -> PlayEngine {
        PlayEngine::new(puzzle(rows), Difficulty::Hard, fill_semantics)
    }

    #[test]
    fn painting_the_last_cell_wins_and_reveals() {
        let mut engine = engine(&["10"], FillSemantics::Free);
        let outcome = engine.paint((0, 0), Filled).unwrap();

        assert_eq!(outcome, PaintOutcome::Won);
        assert_eq!(engine.state(), EngineState::Won);
        // Reveal normalizes the untouched cell to blocked.
        assert_eq!(engine.puzzle().tile((1, 0)), Blocked);
        assert_eq!(engine.paint((1, 0), Blank), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn checked_fills_land_as_error_marks() {
        let mut engine = engine(&["10", "01"], FillSemantics::Checked);

        assert_eq!(engine.paint((1, 0), Filled).unwrap(), PaintOutcome::Faulted);
        assert_eq!(engine.puzzle().tile((1, 0)), Error);

        // Undo clears the mistake again.
        assert_eq!(engine.undo().unwrap(), PaintOutcome::Painted);
        assert_eq!(engine.puzzle().tile((1, 0)), Blank);
    }

    #[test]
    fn free_fills_land_as_painted() {
        let mut engine = engine(&["10", "01"], FillSemantics::Free);
        assert_eq!(engine.paint((1, 0), Filled).unwrap(), PaintOutcome::Painted);
        assert_eq!(engine.puzzle().tile((1, 0)), Filled);
    }

    #[test]
    fn undo_and_redo_round_trip() {
        let mut engine = engine(&["10", "01"], FillSemantics::Free);
        engine.paint((0, 0), Filled).unwrap();
        engine.paint((1, 0), Blocked).unwrap();
        assert_eq!(engine.move_count(), 2);

        engine.undo().unwrap();
        assert_eq!(engine.puzzle().tile((1, 0)), Blank);
        assert_eq!(engine.puzzle().tile((0, 0)), Filled);

        engine.redo().unwrap();
        assert_eq!(engine.puzzle().tile((1, 0)), Blocked);

        // A fresh paint clears the redo stack.
        engine.undo().unwrap();
        engine.paint((0, 1), Blocked).unwrap();
        assert_eq!(engine.redo().unwrap(), PaintOutcome::NoChange);
    }

    #[test]
    fn grouped_edits_undo_as_a_unit() {
        let mut engine = engine(&["111", "000"], FillSemantics::Free);
        let outcome = engine
            .paint_group(&[((0, 0), Filled), ((1, 0), Filled)])
            .unwrap();
        assert_eq!(outcome, PaintOutcome::Painted);
        assert_eq!(engine.move_count(), 1);

        engine.undo().unwrap();
        assert_eq!(engine.puzzle().tile((0, 0)), Blank);
        assert_eq!(engine.puzzle().tile((1, 0)), Blank);
    }

    #[test]
    fn group_outcome_merging_prefers_the_strongest() {
        use PaintOutcome::*;
        assert_eq!(NoChange | Painted, Painted);
        assert_eq!(Painted | Faulted, Faulted);
        assert_eq!(Faulted | Won, Won);
        assert_eq!(NoChange | NoChange, NoChange);
        assert!(!NoChange.has_update());
        assert!(Won.has_update());
    }

    #[test]
    fn hints_track_player_edits() {
        let mut engine = engine(&["110", "000", "011"], FillSemantics::Free);
        let first = engine.hint().expect("fresh grid has deducible lines");
        assert!(first.made_progress);

        // Apply the hint through regular paints and ask again.
        let edits: Vec<(Coord2, TileState)> = first
            .new_states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_set())
            .map(|(offset, &state)| {
                let coords = match first.line {
                    LineId::Row(y) => (offset as Coord, y),
                    LineId::Column(x) => (x, offset as Coord),
                };
                (coords, state)
            })
            .collect();
        engine.paint_group(&edits).unwrap();

        let second = engine.hint().expect("grid is not finished yet");
        assert_ne!(first, second);
    }

    #[test]
    fn hint_is_gone_once_the_game_is_won() {
        let mut engine = engine(&["10"], FillSemantics::Free);
        engine.paint((0, 0), Filled).unwrap();
        assert!(engine.hint().is_none());
    }

    #[test]
    fn engine_round_trips_through_serde() {
        let mut engine = engine(&["10", "01"], FillSemantics::Checked);
        engine.paint((0, 0), Filled).unwrap();
        engine.paint((1, 0), Filled).unwrap();

        let json = serde_json::to_string(&engine).unwrap();
        let restored: PlayEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(engine, restored);
    }
}
