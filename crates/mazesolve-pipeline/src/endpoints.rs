//! Locating the maze entrance and exit on the boundary row.
//!
//! The bottom row of the grid is scanned left to right, skipping a
//! fixed margin at each end to stay clear of corner artifacts. The first
//! column of each of the first two runs of open cells becomes an
//! endpoint. Mazes with more than two openings on that row, or with the
//! openings elsewhere, are not handled.

use crate::grid::{CellState, PixelGrid};
use crate::types::{Coordinate, Endpoints, PipelineError};

/// Find the start and end openings on the last row of `grid`.
///
/// Columns `[margin, width - margin)` are scanned. The scan stops as soon
/// as the second run begins.
///
/// # Errors
///
/// Returns [`PipelineError::EndpointNotFound`] if fewer than two runs
/// are found, including when the grid is empty or narrower than twice
/// the margin.
pub fn locate_endpoints(grid: &PixelGrid, margin: u32) -> Result<Endpoints, PipelineError> {
    let Some(row) = grid.height().checked_sub(1) else {
        return Err(PipelineError::EndpointNotFound { runs_found: 0 });
    };

    let mut starts: Vec<Coordinate> = Vec::with_capacity(2);
    let mut in_run = false;
    for col in margin..grid.width().saturating_sub(margin) {
        let c = Coordinate::new(row, col);
        if grid.get(c)? != CellState::Open {
            in_run = false;
            continue;
        }
        if in_run {
            continue;
        }
        in_run = true;
        starts.push(c);
        if starts.len() == 2 {
            break;
        }
    }

    let &[start, end] = starts.as_slice() else {
        log::warn!(
            "boundary row {row} has {} opening(s) within margin {margin}",
            starts.len()
        );
        return Err(PipelineError::EndpointNotFound {
            runs_found: starts.len(),
        });
    };

    for c in [start, end] {
        if grid.get(c)? != CellState::Open {
            return Err(PipelineError::EndpointNotFound { runs_found: 2 });
        }
    }

    log::debug!("endpoints: start {start}, end {end}");
    Ok(Endpoints { start, end })
}
