//! Match engine - match detection and move search over a grid
//!
//! Everything here is side-effect free from the caller's point of view.
//! [`detect_swap_match`] does mutate the grid temporarily, but a drop guard
//! swaps the cards back on every exit path, unwinding included.

use std::ops::Deref;

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{Position, MIN_MATCH_FLOOR};

/// Direction of a match run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A run of `>= min_match` equal kinds in one row or one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub axis: Axis,
    pub kind: u8,
    /// Contiguous cells, left to right or top to bottom.
    pub cells: Vec<Position>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// Total cards across all groups. A card shared by a horizontal and a
/// vertical group counts once per group.
pub fn cards_matched(groups: &[MatchGroup]) -> usize {
    groups.iter().map(MatchGroup::len).sum()
}

fn flush_run(run: &mut Vec<Position>, kind: Option<u8>, axis: Axis, min: usize, out: &mut Vec<MatchGroup>) {
    if let Some(kind) = kind {
        if run.len() >= min {
            out.push(MatchGroup {
                axis,
                kind,
                cells: run.clone(),
            });
        }
    }
    run.clear();
}

fn scan_line(
    grid: &Grid,
    line: impl Iterator<Item = Position>,
    axis: Axis,
    min: usize,
    out: &mut Vec<MatchGroup>,
) {
    let mut run: Vec<Position> = Vec::new();
    let mut run_kind: Option<u8> = None;

    for pos in line {
        let kind = grid.kind_at(pos);
        if kind.is_some() && kind == run_kind {
            run.push(pos);
            continue;
        }
        flush_run(&mut run, run_kind, axis, min, out);
        run_kind = kind;
        if kind.is_some() {
            run.push(pos);
        }
    }
    flush_run(&mut run, run_kind, axis, min, out);
}

/// Find every horizontal run (rows, left to right) and then every vertical run
/// (columns, top to bottom) of at least `min_match` equal kinds.
///
/// Empty slots and removed cards break runs. `min_match` is floored at 3.
pub fn find_matches(grid: &Grid, min_match: u8) -> Vec<MatchGroup> {
    let min = min_match.max(MIN_MATCH_FLOOR) as usize;
    let mut out = Vec::new();

    for row in 0..grid.rows() {
        let line = (0..grid.cols()).map(move |col| Position::new(row, col));
        scan_line(grid, line, Axis::Horizontal, min, &mut out);
    }
    for col in 0..grid.cols() {
        let line = (0..grid.rows()).map(move |row| Position::new(row, col));
        scan_line(grid, line, Axis::Vertical, min, &mut out);
    }

    out
}

/// Swaps two cells for its lifetime and swaps them back on drop.
struct SwapGuard<'a> {
    grid: &'a mut Grid,
    a: Position,
    b: Position,
}

impl<'a> SwapGuard<'a> {
    fn new(grid: &'a mut Grid, a: Position, b: Position) -> Self {
        grid.swap(a, b);
        Self { grid, a, b }
    }
}

impl Deref for SwapGuard<'_> {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        &*self.grid
    }
}

impl Drop for SwapGuard<'_> {
    fn drop(&mut self) {
        self.grid.swap(self.a, self.b);
    }
}

/// Matches that would exist if the cards at `a` and `b` were swapped.
///
/// The grid is identical before and after the call. Returns no groups when
/// either slot is empty or holds a removed card.
pub fn detect_swap_match(grid: &mut Grid, a: Position, b: Position, min_match: u8) -> Vec<MatchGroup> {
    if grid.kind_at(a).is_none() || grid.kind_at(b).is_none() {
        return Vec::new();
    }
    let swapped = SwapGuard::new(grid, a, b);
    find_matches(&swapped, min_match)
}

/// First adjacent pair whose swap yields a match.
///
/// Cells are visited in row-major order; for each cell the right neighbour is
/// tried before the down neighbour, so the result is reproducible.
pub fn find_hint_pair(grid: &mut Grid, min_match: u8) -> Option<(Position, Position)> {
    let (rows, cols) = (grid.rows(), grid.cols());
    for row in 0..rows {
        for col in 0..cols {
            let here = Position::new(row, col);
            let candidates: ArrayVec<Position, 4> = grid.forward_neighbors(here).collect();
            for other in candidates {
                if !detect_swap_match(grid, here, other, min_match).is_empty() {
                    return Some((here, other));
                }
            }
        }
    }
    None
}

/// True when at least one swap produces a match.
pub fn has_possible_move(grid: &mut Grid, min_match: u8) -> bool {
    find_hint_pair(grid, min_match).is_some()
}
