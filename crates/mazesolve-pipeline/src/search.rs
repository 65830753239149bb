//! Breadth-first shortest-path search over open cells.
//!
//! The search expands cells in FIFO order, visiting neighbors in the
//! grid's fixed [`neighbors`](PixelGrid::neighbors) order, so the
//! returned path is a shortest one (fewest unit steps) and the same
//! input always yields the same path.
//!
//! Instead of carrying a full path in every queue entry, each discovered
//! cell records its predecessor and the path is rebuilt once by walking
//! back from the end. Results and tie-breaks are identical to the
//! path-copying formulation.
//!
//! The grid is mutated as a side effect: every cell the search reaches
//! becomes [`CellState::Visited`] the moment it is discovered, before it
//! is enqueued. The end cell is left untouched because discovering it
//! ends the search.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, PixelGrid};
use crate::types::{Coordinate, Path, PipelineError};

/// Counters describing how much of the grid a search touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Cells marked [`CellState::Visited`] by the search.
    pub cells_visited: usize,
    /// Cells taken off the queue and expanded.
    pub cells_expanded: usize,
    /// Largest queue length observed.
    pub peak_frontier: usize,
}

/// Find a shortest 4-connected path from `start` to `end` through open
/// cells, marking reached cells as visited.
///
/// # Errors
///
/// Returns [`PipelineError::NoPathFound`] if `end` is unreachable, and
/// [`PipelineError::OutOfBounds`] if either endpoint is outside the grid.
pub fn find_path(
    grid: &mut PixelGrid,
    start: Coordinate,
    end: Coordinate,
) -> Result<Path, PipelineError> {
    find_path_with_stats(grid, start, end).map(|(path, _)| path)
}

/// [`find_path`], also returning [`SearchStats`].
///
/// # Errors
///
/// Same as [`find_path`].
pub fn find_path_with_stats(
    grid: &mut PixelGrid,
    start: Coordinate,
    end: Coordinate,
) -> Result<(Path, SearchStats), PipelineError> {
    let start_index = grid.index_of(start)?;
    grid.index_of(end)?;

    let mut stats = SearchStats::default();
    if start == end {
        return Ok((Path::from_walk(vec![start]), stats));
    }

    let mut predecessors: Vec<Option<Coordinate>> = vec![None; grid.len()];
    let mut queue = VecDeque::from([start]);
    stats.peak_frontier = 1;

    // Keeps neighbors of `start` from walking back into it.
    if grid.get(start)? == CellState::Open {
        grid.set(start, CellState::Visited)?;
        stats.cells_visited += 1;
    }

    while let Some(current) = queue.pop_front() {
        stats.cells_expanded += 1;
        for next in grid.neighbors(current) {
            if grid.get(next)? != CellState::Open {
                continue;
            }
            let next_index = grid.index_of(next)?;
            predecessors[next_index] = Some(current);
            if next == end {
                let path = backtrack(grid, &predecessors, start_index, end)?;
                log::debug!(
                    "found path of {} cells after expanding {} cells",
                    path.len(),
                    stats.cells_expanded,
                );
                return Ok((path, stats));
            }
            grid.set(next, CellState::Visited)?;
            stats.cells_visited += 1;
            queue.push_back(next);
            stats.peak_frontier = stats.peak_frontier.max(queue.len());
        }
    }

    log::warn!(
        "search exhausted {} cells without reaching {end}",
        stats.cells_expanded
    );
    Err(PipelineError::NoPathFound)
}

/// Rebuild the path by following predecessors from `end` back to the
/// cell at `start_index`.
fn backtrack(
    grid: &PixelGrid,
    predecessors: &[Option<Coordinate>],
    start_index: usize,
    end: Coordinate,
) -> Result<Path, PipelineError> {
    let mut walk = vec![end];
    let mut current = end;
    while grid.index_of(current)? != start_index {
        let Some(previous) = predecessors[grid.index_of(current)?] else {
            break;
        };
        walk.push(previous);
        current = previous;
    }
    walk.reverse();
    Ok(Path::from_walk(walk))
}
