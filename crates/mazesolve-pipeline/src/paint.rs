//! Recoloring a searched grid to show the solution.
//!
//! Painting runs once, after a successful search, in three passes:
//!
//! 1. every [`Visited`](CellState::Visited) neighbor of a path cell
//!    becomes [`DeadEndMark`](CellState::DeadEndMark), outlining the
//!    corridor the solution runs through;
//! 2. every cell still [`Open`](CellState::Open) (never reached) becomes
//!    `Visited`, so explored and unexplored space share one class;
//! 3. every path cell becomes [`PathMark`](CellState::PathMark).
//!
//! Each path cell's neighbors are examined exactly once.
//!
//! The passes are not idempotent: cells collapsed from `Open` in pass 2
//! may border the path, and a second pass 1 would outline them too. A
//! grid that already carries `PathMark` cells is therefore refused.

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, PixelGrid};
use crate::types::{Path, PipelineError};

/// Counts of each visual class after painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaintSummary {
    /// Cells on the solution path.
    pub path_cells: usize,
    /// Explored cells bordering the path.
    pub dead_end_cells: usize,
    /// Cells never reached by the search, now shown as explored.
    pub unexplored_cells: usize,
}

/// Paint the solution `path` onto a grid the search has just explored.
///
/// # Errors
///
/// Returns [`PipelineError::AlreadyPainted`] if the grid already holds
/// [`CellState::PathMark`] cells, and [`PipelineError::OutOfBounds`] if
/// the path leaves the grid.
pub fn paint_result(grid: &mut PixelGrid, path: &Path) -> Result<PaintSummary, PipelineError> {
    if grid.count(CellState::PathMark) > 0 {
        return Err(PipelineError::AlreadyPainted);
    }
    for &c in path.coordinates() {
        grid.index_of(c)?;
    }

    for &c in path.coordinates() {
        for n in grid.neighbors(c) {
            if grid.get(n)? == CellState::Visited {
                grid.set(n, CellState::DeadEndMark)?;
            }
        }
    }

    let unexplored_cells = grid.replace_all(CellState::Open, CellState::Visited);

    for &c in path.coordinates() {
        grid.set(c, CellState::PathMark)?;
    }

    let summary = PaintSummary {
        path_cells: grid.count(CellState::PathMark),
        dead_end_cells: grid.count(CellState::DeadEndMark),
        unexplored_cells,
    };
    log::debug!("painted {summary:?}");
    Ok(summary)
}
