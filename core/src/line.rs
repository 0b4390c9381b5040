use alloc::vec::Vec;
use core::ops::Range;
use serde::{Deserialize, Serialize};

use crate::*;

/// Result of one bounding pass over a single line.
///
/// `min_ranges[i]`/`max_ranges[i]` are the earliest/latest half-open interval
/// run `i` can still occupy. Both are empty when the pass short-circuited
/// (line already determined, or blocked out by an empty clue list).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDeduction {
    pub min_ranges: Vec<Range<usize>>,
    pub max_ranges: Vec<Range<usize>>,
    pub new_states: Vec<TileState>,
    pub made_progress: bool,
    pub complete: bool,
}

/// Maximal contiguous runs of cells matching `is_set`, as half-open ranges.
///
/// Shared by clue derivation, segment annotation and the filled-run
/// reconciliation below, so the three can never disagree on what a run is.
pub fn scan_runs<T: Copy>(cells: &[T], is_set: impl Fn(T) -> bool) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &cell) in cells.iter().enumerate() {
        match (start, is_set(cell)) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..cells.len());
    }
    runs
}

/// Deduce new tile states for one line by bounding each clue run.
///
/// Callers guarantee the clues are consistent with the line: a clue total
/// exceeding the line length is a caller bug and panics on out-of-bounds
/// indexing rather than being tolerated.
///
/// Intersections of a run's extreme placements are only committed when they
/// span at least `min_inference_len` cells, except for pinned runs which are
/// always committed. Cells are never downgraded: only blank cells are
/// written.
pub fn deduce_line(states: &[TileState], clues: &[Coord], min_inference_len: usize) -> LineDeduction {
    let n = states.len();
    let mut new_states = states.to_vec();

    // Fully determined lines need no bounding work.
    if states.iter().all(|state| state.is_set()) {
        return LineDeduction {
            min_ranges: Vec::new(),
            max_ranges: Vec::new(),
            new_states,
            made_progress: false,
            complete: true,
        };
    }

    // An empty clue list (conventionally also written `[0]`) blocks out the
    // whole line.
    if clues.iter().all(|&clue| clue == 0) {
        for state in &mut new_states {
            if state.is_blank() {
                *state = TileState::Blocked;
            }
        }
        return LineDeduction {
            min_ranges: Vec::new(),
            max_ranges: Vec::new(),
            new_states,
            made_progress: true,
            complete: true,
        };
    }

    let mut min_ranges = leftmost_fit(states, clues);
    let mut max_ranges = rightmost_fit(states, clues);

    reconcile_filled_runs(states, clues, &mut min_ranges, &mut max_ranges);
    retighten_ordering(clues, &mut min_ranges, &mut max_ranges);

    // Cells no placement can reach are blocked.
    for idx in 0..n {
        if !new_states[idx].is_blank() {
            continue;
        }
        let reachable = min_ranges
            .iter()
            .zip(&max_ranges)
            .any(|(lo, hi)| lo.start <= idx && idx < hi.end);
        if !reachable {
            new_states[idx] = TileState::Blocked;
        }
    }

    for (i, &clue) in clues.iter().enumerate() {
        let lo = min_ranges[i].clone();
        let hi = max_ranges[i].clone();
        let pinned = lo == hi;
        debug_assert_eq!(lo.len(), clue as usize);

        // Cells covered by both extreme placements are filled no matter
        // where the run finally lands.
        let overlap = hi.start..lo.end;
        if overlap.start < overlap.end && (pinned || overlap.len() >= min_inference_len) {
            for idx in overlap {
                if new_states[idx].is_blank() {
                    new_states[idx] = TileState::Filled;
                }
            }
        }

        // A pinned run is sealed off on both sides.
        if pinned {
            if lo.start > 0 && new_states[lo.start - 1].is_blank() {
                new_states[lo.start - 1] = TileState::Blocked;
            }
            if lo.end < n && new_states[lo.end].is_blank() {
                new_states[lo.end] = TileState::Blocked;
            }
        }
    }

    let made_progress = new_states.iter().zip(states).any(|(new, old)| new != old);
    let complete = new_states.iter().all(|state| state.is_set());
    LineDeduction {
        min_ranges,
        max_ranges,
        new_states,
        made_progress,
        complete,
    }
}

/// Earliest placement for every run: greedy left-to-right scan that skips
/// past blocked cells and keeps the mandatory one-cell gap between runs.
fn leftmost_fit(states: &[TileState], clues: &[Coord]) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(clues.len());
    let mut pos = 0;
    for &clue in clues {
        let len = clue as usize;
        let mut start = pos;
        let mut span = 0;
        let mut i = start;
        while span < len {
            if states[i].rules_out_fill() {
                span = 0;
                start = i + 1;
            } else {
                span += 1;
            }
            i += 1;
        }
        ranges.push(start..start + len);
        pos = start + len + 1;
    }
    ranges
}

/// Latest placement for every run: the leftmost placement of the mirrored
/// line, mirrored back.
fn rightmost_fit(states: &[TileState], clues: &[Coord]) -> Vec<Range<usize>> {
    let n = states.len();
    let reversed: Vec<TileState> = states.iter().rev().copied().collect();
    let reversed_clues: Vec<Coord> = clues.iter().rev().copied().collect();
    let mut ranges: Vec<Range<usize>> = leftmost_fit(&reversed, &reversed_clues)
        .into_iter()
        .map(|range| n - range.end..n - range.start)
        .collect();
    ranges.reverse();
    ranges
}

/// Anchor runs onto filled cells already on the line.
///
/// An observed filled run that sits inside exactly one run's combined bound
/// interval must belong to that run, so the run cannot start after the
/// observed cells nor end before them. Zero or multiple matches leave the
/// bounds untouched; a later pass gets another chance once other deductions
/// have narrowed the intervals.
fn reconcile_filled_runs(
    states: &[TileState],
    clues: &[Coord],
    min_ranges: &mut [Range<usize>],
    max_ranges: &mut [Range<usize>],
) {
    for observed in scan_runs(states, TileState::is_filled) {
        let mut candidates = (0..clues.len()).filter(|&i| {
            min_ranges[i].start <= observed.start && observed.end <= max_ranges[i].end
        });
        let Some(run) = candidates.next() else {
            continue;
        };
        if candidates.next().is_some() {
            continue;
        }

        let len = clues[run] as usize;
        let anchored_start = max_ranges[run].start.min(observed.start);
        max_ranges[run] = anchored_start..anchored_start + len;
        let anchored_end = min_ranges[run].end.max(observed.end);
        min_ranges[run] = anchored_end - len..anchored_end;
    }
}

/// Restore run ordering after per-run anchoring moved bounds independently.
fn retighten_ordering(clues: &[Coord], min_ranges: &mut [Range<usize>], max_ranges: &mut [Range<usize>]) {
    for i in 1..clues.len() {
        let earliest = min_ranges[i - 1].end + 1;
        if min_ranges[i].start < earliest {
            min_ranges[i] = earliest..earliest + clues[i] as usize;
        }
    }
    for i in (0..clues.len().saturating_sub(1)).rev() {
        let latest = max_ranges[i + 1].start - 1;
        if max_ranges[i].end > latest {
            max_ranges[i] = latest - clues[i] as usize..latest;
        }
    }
}
