//! The cell grid every solving stage reads and mutates.
//!
//! A [`PixelGrid`] is a fixed-size, row-major buffer of one-byte
//! [`CellState`]s. It performs no I/O: images come in through
//! [`PixelGrid::from_binary`] and go out through
//! [`PixelGrid::to_gray_image`].
//!
//! All coordinate access is bounds-checked. Out-of-range access returns
//! [`PipelineError::OutOfBounds`], which indicates a defect in the caller
//! rather than a property of the maze.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::{Coordinate, Dimensions, Palette, PipelineError};

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// Wall; never traversed.
    Blocked,
    /// Corridor not yet reached by the search.
    Open,
    /// Reached by the search (or unexplored space after painting).
    Visited,
    /// Cell on the solution path.
    PathMark,
    /// Explored cell bordering the solution path.
    DeadEndMark,
}

impl CellState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Blocked,
        Self::Open,
        Self::Visited,
        Self::PathMark,
        Self::DeadEndMark,
    ];

    /// Short human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blocked => "wall",
            Self::Open => "open",
            Self::Visited => "explored",
            Self::PathMark => "path",
            Self::DeadEndMark => "path edge",
        }
    }
}

/// Iterator over the in-bounds 4-neighbors of a cell.
///
/// Owns its coordinates, so the grid may be mutated while iterating.
pub type Neighbors = std::iter::Flatten<std::array::IntoIter<Option<Coordinate>, 4>>;

/// A mutable 2D grid of [`CellState`]s with fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
}

impl PixelGrid {
    /// Create a `width × height` grid with every cell set to `fill`.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: CellState) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        }
    }

    /// Build a grid from a binarized image: pixels equal to 255 are
    /// [`CellState::Open`], all others [`CellState::Blocked`].
    #[must_use]
    pub fn from_binary(image: &GrayImage) -> Self {
        let cells = image
            .pixels()
            .map(|p| {
                if p.0[0] == u8::MAX {
                    CellState::Open
                } else {
                    CellState::Blocked
                }
            })
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            cells,
        }
    }

    /// Build a grid from text rows: `#` is a wall, any other character
    /// is open.
    ///
    /// ```
    /// # use mazesolve_pipeline::grid::{CellState, PixelGrid};
    /// # use mazesolve_pipeline::Coordinate;
    /// let grid = PixelGrid::from_ascii(&["#.#", "..."])?;
    /// assert_eq!(grid.get(Coordinate::new(0, 0))?, CellState::Blocked);
    /// assert_eq!(grid.get(Coordinate::new(0, 1))?, CellState::Open);
    /// # Ok::<(), mazesolve_pipeline::PipelineError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidGrid`] if the rows differ in
    /// length or the grid is too large to index.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, PipelineError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.chars().count() != width)
        {
            return Err(PipelineError::InvalidGrid(format!(
                "row {i} has {} cells, expected {width}",
                row.chars().count(),
            )));
        }
        let too_large = |_| PipelineError::InvalidGrid("grid dimensions exceed u32".to_string());
        let cells = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|ch| {
                if ch == '#' {
                    CellState::Blocked
                } else {
                    CellState::Open
                }
            })
            .collect();
        Ok(Self {
            width: u32::try_from(width).map_err(too_large)?,
            height: u32::try_from(rows.len()).map_err(too_large)?,
            cells,
        })
    }

    /// Grid width (number of columns).
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (number of rows).
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the grid has no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Returns `true` if `c` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, c: Coordinate) -> bool {
        c.row < self.height && c.col < self.width
    }

    /// Row-major index of `c`.
    pub(crate) fn index_of(&self, c: Coordinate) -> Result<usize, PipelineError> {
        if self.contains(c) {
            Ok(c.row as usize * self.width as usize + c.col as usize)
        } else {
            Err(PipelineError::OutOfBounds {
                coordinate: c,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// State of the cell at `c`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::OutOfBounds`] if `c` is outside the grid.
    pub fn get(&self, c: Coordinate) -> Result<CellState, PipelineError> {
        Ok(self.cells[self.index_of(c)?])
    }

    /// Overwrite the cell at `c`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::OutOfBounds`] if `c` is outside the grid.
    pub fn set(&mut self, c: Coordinate, state: CellState) -> Result<(), PipelineError> {
        let i = self.index_of(c)?;
        self.cells[i] = state;
        Ok(())
    }

    /// The in-bounds 4-neighbors of `c`, in the fixed order
    /// up (`-row`), down (`+row`), left (`-col`), right (`+col`).
    ///
    /// This order decides which of several equally short paths the
    /// search returns.
    #[must_use]
    pub fn neighbors(&self, c: Coordinate) -> Neighbors {
        let keep = |n: Coordinate| self.contains(n).then_some(n);
        [
            c.row
                .checked_sub(1)
                .and_then(|row| keep(Coordinate::new(row, c.col))),
            c.row
                .checked_add(1)
                .and_then(|row| keep(Coordinate::new(row, c.col))),
            c.col
                .checked_sub(1)
                .and_then(|col| keep(Coordinate::new(c.row, col))),
            c.col
                .checked_add(1)
                .and_then(|col| keep(Coordinate::new(c.row, col))),
        ]
        .into_iter()
        .flatten()
    }

    /// Number of cells in `state`.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&s| s == state).count()
    }

    /// Change every cell in state `from` to `to`, returning how many
    /// cells changed.
    pub fn replace_all(&mut self, from: CellState, to: CellState) -> usize {
        let mut changed = 0;
        for cell in self.cells.iter_mut().filter(|s| **s == from) {
            *cell = to;
            changed += 1;
        }
        changed
    }

    /// Render the grid as an 8-bit luma image using `palette`.
    #[must_use]
    pub fn to_gray_image(&self, palette: &Palette) -> GrayImage {
        let raw = self.cells.iter().map(|&s| palette.value(s)).collect();
        // Buffer length is width * height by construction.
        GrayImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn c(row: u32, col: u32) -> Coordinate {
        Coordinate::new(row, col)
    }

    #[test]
    fn labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            CellState::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), CellState::ALL.len());
    }

    #[test]
    fn new_fills_every_cell() {
        let grid = PixelGrid::new(4, 3, CellState::Open);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.count(CellState::Open), 12);
    }

    #[test]
    fn from_binary_maps_white_to_open() {
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(1, 0, image::Luma([255]));
        img.put_pixel(2, 1, image::Luma([254]));
        let grid = PixelGrid::from_binary(&img);
        assert_eq!(grid.get(c(0, 1)).unwrap(), CellState::Open);
        assert_eq!(grid.get(c(1, 2)).unwrap(), CellState::Blocked);
        assert_eq!(grid.count(CellState::Open), 1);
    }

    #[test]
    fn from_binary_uses_row_col_axes() {
        // Pixel (x=2, y=0) must land at row 0, column 2.
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(2, 0, image::Luma([255]));
        let grid = PixelGrid::from_binary(&img);
        assert_eq!(grid.get(c(0, 2)).unwrap(), CellState::Open);
    }

    #[test]
    fn from_ascii_rejects_ragged_rows() {
        let result = PixelGrid::from_ascii(&["...", ".."]);
        assert!(matches!(result, Err(PipelineError::InvalidGrid(ref s)) if s.contains("row 1")));
    }

    #[test]
    fn from_ascii_empty_is_empty_grid() {
        let grid = PixelGrid::from_ascii(&[]).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.dimensions(), Dimensions { width: 0, height: 0 });
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut grid = PixelGrid::new(5, 5, CellState::Open);
        grid.set(c(2, 3), CellState::Visited).unwrap();
        assert_eq!(grid.get(c(2, 3)).unwrap(), CellState::Visited);
        assert_eq!(grid.get(c(3, 2)).unwrap(), CellState::Open);
    }

    #[test]
    fn out_of_bounds_access_fails() {
        let mut grid = PixelGrid::new(5, 4, CellState::Open);
        assert!(matches!(
            grid.get(c(4, 0)),
            Err(PipelineError::OutOfBounds {
                width: 5,
                height: 4,
                ..
            })
        ));
        assert!(matches!(
            grid.set(c(0, 5), CellState::Blocked),
            Err(PipelineError::OutOfBounds { .. })
        ));
        assert_eq!(grid.count(CellState::Blocked), 0);
    }

    #[test]
    fn neighbors_in_fixed_order() {
        let grid = PixelGrid::new(5, 5, CellState::Open);
        let n: Vec<_> = grid.neighbors(c(2, 2)).collect();
        assert_eq!(n, vec![c(1, 2), c(3, 2), c(2, 1), c(2, 3)]);
    }

    #[test]
    fn neighbors_clipped_at_corners() {
        let grid = PixelGrid::new(5, 5, CellState::Open);
        let top_left: Vec<_> = grid.neighbors(c(0, 0)).collect();
        assert_eq!(top_left, vec![c(1, 0), c(0, 1)]);
        let bottom_right: Vec<_> = grid.neighbors(c(4, 4)).collect();
        assert_eq!(bottom_right, vec![c(3, 4), c(4, 3)]);
    }

    #[test]
    fn neighbors_of_single_cell_grid_is_empty() {
        let grid = PixelGrid::new(1, 1, CellState::Open);
        assert_eq!(grid.neighbors(c(0, 0)).count(), 0);
    }

    #[test]
    fn neighbors_ignore_blocked_state() {
        // Neighbor enumeration is purely geometric.
        let grid = PixelGrid::new(3, 3, CellState::Blocked);
        assert_eq!(grid.neighbors(c(1, 1)).count(), 4);
    }

    #[test]
    fn neighbors_of_outside_cell_stay_inside() {
        let grid = PixelGrid::new(3, 3, CellState::Open);
        let n: Vec<_> = grid.neighbors(c(3, 1)).collect();
        assert_eq!(n, vec![c(2, 1)]);
        assert_eq!(grid.neighbors(c(u32::MAX, u32::MAX)).count(), 0);
    }

    #[test]
    fn replace_all_counts_changes() {
        let mut grid = PixelGrid::from_ascii(&["#..", ".#."]).unwrap();
        let changed = grid.replace_all(CellState::Open, CellState::Visited);
        assert_eq!(changed, 4);
        assert_eq!(grid.count(CellState::Open), 0);
        assert_eq!(grid.count(CellState::Blocked), 2);
    }

    #[test]
    fn to_gray_image_applies_palette() {
        let mut grid = PixelGrid::from_ascii(&["#.", ".."]).unwrap();
        grid.set(c(1, 0), CellState::PathMark).unwrap();
        grid.set(c(1, 1), CellState::Visited).unwrap();
        let palette = Palette {
            path: 200,
            ..Palette::default()
        };
        let img = grid.to_gray_image(&palette);
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 255);
        assert_eq!(img.get_pixel(0, 1).0[0], 200);
        assert_eq!(img.get_pixel(1, 1).0[0], 127);
    }

    #[test]
    fn binary_round_trip_preserves_walls() {
        let img = GrayImage::from_fn(6, 4, |x, y| {
            image::Luma([if (x + y) % 3 == 0 { 0 } else { 255 }])
        });
        let grid = PixelGrid::from_binary(&img);
        assert_eq!(grid.to_gray_image(&Palette::default()), img);
    }
}
