//! Shared types for the mazesolve pipeline.

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, PixelGrid};
use crate::paint::PaintSummary;
use crate::search::SearchStats;

/// Re-export `GrayImage` so downstream crates can reference raster
/// intermediates without depending on `image` directly.
pub use image::GrayImage;

/// A cell position in the grid.
///
/// `row` indexes the vertical axis (0 is the top row) and `col` the
/// horizontal axis (0 is the leftmost column). Image pixel `(x, y)`
/// corresponds to `Coordinate { row: y, col: x }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    /// Row index, counted from the top edge.
    pub row: u32,
    /// Column index, counted from the left edge.
    pub col: u32,
}

impl Coordinate {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Number of unit steps along the axes between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Returns `true` if `other` differs by exactly one unit in exactly
    /// one axis.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An ordered, non-empty walk from a start cell to an end cell.
///
/// Consecutive coordinates are 4-adjacent. Paths produced by
/// [`find_path`](crate::search::find_path) always satisfy this; paths
/// built by hand go through [`Path::try_new`], which checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path(Vec<Coordinate>);

impl Path {
    /// Build a path from coordinates, validating that it is non-empty and
    /// that every step moves to a 4-adjacent cell.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPath`] if `coordinates` is empty
    /// or contains a non-adjacent step.
    pub fn try_new(coordinates: Vec<Coordinate>) -> Result<Self, PipelineError> {
        if coordinates.is_empty() {
            return Err(PipelineError::InvalidPath("path is empty".to_string()));
        }
        if let Some(pair) = coordinates.windows(2).find(|w| !w[0].is_adjacent(w[1])) {
            return Err(PipelineError::InvalidPath(format!(
                "step from {} to {} is not 4-adjacent",
                pair[0], pair[1],
            )));
        }
        Ok(Self(coordinates))
    }

    /// Wrap coordinates already known to form a valid walk.
    pub(crate) fn from_walk(coordinates: Vec<Coordinate>) -> Self {
        debug_assert!(!coordinates.is_empty());
        debug_assert!(coordinates.windows(2).all(|w| w[0].is_adjacent(w[1])));
        Self(coordinates)
    }

    /// Number of cells on the path, start and end included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a path holds at least its start cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of unit moves along the path (`len() - 1`).
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// The first cell of the path.
    #[must_use]
    pub fn start(&self) -> Option<Coordinate> {
        self.0.first().copied()
    }

    /// The last cell of the path.
    #[must_use]
    pub fn end(&self) -> Option<Coordinate> {
        self.0.last().copied()
    }

    /// Returns a slice of all coordinates, start first.
    #[must_use]
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.0
    }

    /// Consumes the path and returns the underlying coordinates.
    #[must_use]
    pub fn into_coordinates(self) -> Vec<Coordinate> {
        self.0
    }
}

/// The two openings on the boundary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Where the search starts (leftmost opening).
    pub start: Coordinate,
    /// Where the search ends (second opening).
    pub end: Coordinate,
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Pixel values used when a [`PixelGrid`] is rendered back to an image.
///
/// The defaults reproduce the classic output: black walls, mid-grey
/// explored and unexplored space, and a near-white corridor around the
/// solution with the solution itself in full white. The corridor (254)
/// and the path (255) are meant to read as one bright band on screen;
/// they stay distinct values in the image, and a custom `dead_end` can
/// pull them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Value for [`CellState::Blocked`].
    pub blocked: u8,
    /// Value for [`CellState::Open`].
    pub open: u8,
    /// Value for [`CellState::Visited`].
    pub visited: u8,
    /// Value for [`CellState::DeadEndMark`].
    pub dead_end: u8,
    /// Value for [`CellState::PathMark`].
    pub path: u8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            blocked: 0,
            open: 255,
            visited: 127,
            dead_end: 254,
            path: 255,
        }
    }
}

impl Palette {
    /// Pixel value for a cell state.
    #[must_use]
    pub const fn value(&self, state: CellState) -> u8 {
        match state {
            CellState::Blocked => self.blocked,
            CellState::Open => self.open,
            CellState::Visited => self.visited,
            CellState::DeadEndMark => self.dead_end,
            CellState::PathMark => self.path,
        }
    }
}

/// Configuration for a solve run.
///
/// Use [`SolveConfig::validate`] (called by the pipeline before any
/// processing) to reject values the pipeline cannot work with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveConfig {
    /// Luma values strictly above this become open; the rest are walls.
    pub threshold: u8,

    /// Integer downscale applied before solving and reversed on export.
    /// Must be at least 1.
    pub factor: u32,

    /// Columns ignored at each end of the boundary row when scanning for
    /// openings.
    pub margin: u32,

    /// Pixel values for rendering the solved grid.
    pub palette: Palette,
}

impl SolveConfig {
    /// Default binarization threshold.
    pub const DEFAULT_THRESHOLD: u8 = 128;
    /// Default downscale factor.
    pub const DEFAULT_FACTOR: u32 = 4;
    /// Default boundary-row margin.
    pub const DEFAULT_MARGIN: u32 = 2;

    /// Check the config for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `factor` is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.factor == 0 {
            return Err(PipelineError::InvalidConfig(
                "factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            factor: Self::DEFAULT_FACTOR,
            margin: Self::DEFAULT_MARGIN,
            palette: Palette::default(),
        }
    }
}

/// Result of running the full pipeline, with the intermediates kept for
/// export, display, and debugging.
#[derive(Debug, Clone)]
pub struct SolvedMaze {
    /// Decoded source image in 8-bit luma.
    pub original: GrayImage,
    /// Source image after binarization (values 0 and 255 only).
    pub binary: GrayImage,
    /// Binarized image at working resolution.
    pub working: GrayImage,
    /// Grid as the search left it: explored cells are `Visited`.
    pub explored: PixelGrid,
    /// Final grid after painting.
    pub painted: PixelGrid,
    /// The boundary openings the path connects.
    pub endpoints: Endpoints,
    /// Shortest path from `endpoints.start` to `endpoints.end`.
    pub path: Path,
    /// Counters from the search.
    pub search: SearchStats,
    /// Counters from the painter.
    pub paint: PaintSummary,
    /// Downscale factor the grid was solved at.
    pub factor: u32,
    /// Palette used for rendering.
    pub palette: Palette,
}

impl SolvedMaze {
    /// Working-resolution dimensions of the solved grid.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.painted.dimensions()
    }

    /// The painted grid rendered at working resolution.
    #[must_use]
    pub fn rendered(&self) -> GrayImage {
        self.painted.to_gray_image(&self.palette)
    }

    /// The painted grid rendered and scaled back up by `factor`.
    #[must_use]
    pub fn rendered_full_size(&self) -> GrayImage {
        crate::downsample::upscale(&self.rendered(), self.factor)
    }
}

/// Errors that can occur while solving a maze.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A grid could not be built from the given description.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A hand-built path is not a valid 4-connected walk.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The boundary row does not hold two openings.
    #[error("no start/end: found {runs_found} of 2 openings on the boundary row")]
    EndpointNotFound {
        /// Number of open runs seen before the scan ended.
        runs_found: usize,
    },

    /// The search exhausted every reachable cell without reaching the end.
    #[error("no path between the endpoints")]
    NoPathFound,

    /// The grid already carries a painted solution.
    #[error("grid is already painted")]
    AlreadyPainted,

    /// A coordinate outside the grid was accessed.
    #[error("coordinate {coordinate} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        coordinate: Coordinate,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
}
