//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::solve`], which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use mazesolve_pipeline::{Pipeline, SolveConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let config = SolveConfig::default();
//! let solved = Pipeline::new(png, config)
//!     .decode()?
//!     .binarize()
//!     .downsample()?
//!     .locate_endpoints()?
//!     .search()?
//!     .paint()?
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. The caller can inspect the current stage's output via
//! accessor methods at any point.
//!
//! # Memory
//!
//! Every stage keeps the decoded and binarized source images alongside
//! the working grid, and [`Painted`] holds two grids (explored and
//! painted). [`SolvedMaze`] needs all of them for export and stage
//! dumps. Callers that only need the grid-level answer and already hold
//! a [`PixelGrid`] should prefer [`crate::solve_grid`].

use crate::diagnostics::StageMetrics;
use crate::grid::{CellState, PixelGrid};
use crate::paint::PaintSummary;
use crate::search::SearchStats;
use crate::types::{Endpoints, GrayImage, Path, PipelineError, SolveConfig, SolvedMaze};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source image bytes and config are stored but not yet touched.
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .decode() to continue"]
pub struct Pending {
    config: SolveConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Validate the config, decode the source image to 8-bit luma, and
    /// advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the config is
    /// unusable, [`PipelineError::EmptyInput`] if the source bytes are
    /// empty, and [`PipelineError::ImageDecode`] if the image format is
    /// unrecognized or the data is corrupt.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.config.validate()?;
        let source_len = self.source.len();
        let original = crate::decode::decode(&self.source)?;
        log::debug!(
            "decoded {source_len} bytes to {}x{}",
            original.width(),
            original.height()
        );
        Ok(Decoded {
            config: self.config,
            original,
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image.
///
/// Call [`binarize`](Self::binarize) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .binarize() to continue"]
pub struct Decoded {
    config: SolveConfig,
    original: GrayImage,
    source_len: usize,
}

impl Decoded {
    /// The decoded luma image.
    #[must_use]
    pub const fn original(&self) -> &GrayImage {
        &self.original
    }

    /// Threshold the image at `config.threshold` and advance to the
    /// [`Binarized`] stage.
    pub fn binarize(self) -> Binarized {
        let binary = crate::decode::binarize(&self.original, self.config.threshold);
        log::debug!("binarized at threshold {}", self.config.threshold);
        Binarized {
            config: self.config,
            original: self.original,
            binary,
        }
    }
}

// ───────────────────────── Stage 2: Binarized ────────────────────────

/// Pipeline state after thresholding to walls (0) and corridors (255).
///
/// Call [`downsample`](Self::downsample) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .downsample() to continue"]
pub struct Binarized {
    config: SolveConfig,
    original: GrayImage,
    binary: GrayImage,
}

impl Binarized {
    /// The binarized image at source resolution.
    #[must_use]
    pub const fn binary(&self) -> &GrayImage {
        &self.binary
    }

    /// Shrink the binarized image by `config.factor`, build the working
    /// grid, and advance to the [`Downsampled`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the image is too small
    /// for the factor.
    pub fn downsample(self) -> Result<Downsampled, PipelineError> {
        let (working, applied) = crate::downsample::downsample(&self.binary, self.config.factor)?;
        let grid = PixelGrid::from_binary(&working);
        log::debug!(
            "working grid {}x{} (factor {}, applied: {applied})",
            grid.width(),
            grid.height(),
            self.config.factor,
        );
        Ok(Downsampled {
            config: self.config,
            original: self.original,
            binary: self.binary,
            working,
            grid,
            applied,
        })
    }
}

// ───────────────────────── Stage 3: Downsampled ──────────────────────

/// Pipeline state after shrinking to working resolution.
///
/// The working image has been converted into a [`PixelGrid`]. Call
/// [`locate_endpoints`](Self::locate_endpoints) to advance.
#[must_use = "pipeline stages are consumed by advancing — call .locate_endpoints() to continue"]
pub struct Downsampled {
    config: SolveConfig,
    original: GrayImage,
    binary: GrayImage,
    working: GrayImage,
    grid: PixelGrid,
    applied: bool,
}

impl Downsampled {
    /// The binarized image at working resolution.
    #[must_use]
    pub const fn working(&self) -> &GrayImage {
        &self.working
    }

    /// The working grid built from [`working`](Self::working).
    #[must_use]
    pub const fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Whether the image was actually resized (factor above 1).
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Find the two openings on the boundary row and advance to the
    /// [`Located`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EndpointNotFound`] if the boundary row
    /// does not hold two openings.
    pub fn locate_endpoints(self) -> Result<Located, PipelineError> {
        let endpoints = crate::endpoints::locate_endpoints(&self.grid, self.config.margin)?;
        Ok(Located {
            config: self.config,
            original: self.original,
            binary: self.binary,
            working: self.working,
            grid: self.grid,
            endpoints,
        })
    }
}

// ───────────────────────── Stage 4: Located ──────────────────────────

/// Pipeline state once the start and end cells are known.
///
/// Call [`search`](Self::search) to advance.
#[must_use = "pipeline stages are consumed by advancing — call .search() to continue"]
pub struct Located {
    config: SolveConfig,
    original: GrayImage,
    binary: GrayImage,
    working: GrayImage,
    grid: PixelGrid,
    endpoints: Endpoints,
}

impl Located {
    /// The start and end openings.
    #[must_use]
    pub const fn endpoints(&self) -> Endpoints {
        self.endpoints
    }

    /// Run the breadth-first search from start to end and advance to the
    /// [`Searched`] stage. The grid is carried forward with every reached
    /// cell marked visited.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoPathFound`] if the end is unreachable.
    pub fn search(mut self) -> Result<Searched, PipelineError> {
        let open_cells = self.grid.count(CellState::Open);
        let (path, stats) = crate::search::find_path_with_stats(
            &mut self.grid,
            self.endpoints.start,
            self.endpoints.end,
        )?;
        Ok(Searched {
            config: self.config,
            original: self.original,
            binary: self.binary,
            working: self.working,
            explored: self.grid,
            endpoints: self.endpoints,
            path,
            stats,
            open_cells,
        })
    }
}

// ───────────────────────── Stage 5: Searched ─────────────────────────

/// Pipeline state after a successful search.
///
/// Call [`paint`](Self::paint) to advance.
#[must_use = "pipeline stages are consumed by advancing — call .paint() to continue"]
pub struct Searched {
    config: SolveConfig,
    original: GrayImage,
    binary: GrayImage,
    working: GrayImage,
    explored: PixelGrid,
    endpoints: Endpoints,
    path: Path,
    stats: SearchStats,
    /// Open cells in the grid before the search touched it.
    open_cells: usize,
}

impl Searched {
    /// The grid as the search left it.
    #[must_use]
    pub const fn explored(&self) -> &PixelGrid {
        &self.explored
    }

    /// The shortest path found.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Search counters.
    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Paint a copy of the explored grid and advance to the [`Painted`]
    /// stage. The explored grid is kept as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AlreadyPainted`] or
    /// [`PipelineError::OutOfBounds`] only if the grid and path were
    /// corrupted, which the typed stages rule out.
    pub fn paint(self) -> Result<Painted, PipelineError> {
        let mut painted = self.explored.clone();
        let summary = crate::paint::paint_result(&mut painted, &self.path)?;
        Ok(Painted {
            config: self.config,
            original: self.original,
            binary: self.binary,
            working: self.working,
            explored: self.explored,
            painted,
            endpoints: self.endpoints,
            path: self.path,
            stats: self.stats,
            summary,
        })
    }
}

// ───────────────────────── Stage 6: Painted ──────────────────────────

/// Final pipeline state.
///
/// Call [`into_result`](Self::into_result) to obtain the
/// [`SolvedMaze`].
#[must_use = "pipeline stages are consumed by advancing — call .into_result() to finish"]
pub struct Painted {
    config: SolveConfig,
    original: GrayImage,
    binary: GrayImage,
    working: GrayImage,
    explored: PixelGrid,
    painted: PixelGrid,
    endpoints: Endpoints,
    path: Path,
    stats: SearchStats,
    summary: PaintSummary,
}

impl Painted {
    /// The painted grid.
    #[must_use]
    pub const fn painted(&self) -> &PixelGrid {
        &self.painted
    }

    /// The shortest path found.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Painter counters.
    #[must_use]
    pub const fn summary(&self) -> PaintSummary {
        self.summary
    }

    /// Consume the pipeline and return the full [`SolvedMaze`].
    #[must_use]
    pub fn into_result(self) -> SolvedMaze {
        SolvedMaze {
            original: self.original,
            binary: self.binary,
            working: self.working,
            explored: self.explored,
            painted: self.painted,
            endpoints: self.endpoints,
            path: self.path,
            search: self.stats,
            paint: self.summary,
            factor: self.config.factor,
            palette: self.config.palette,
        }
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 7;

/// The output produced by a single pipeline stage.
///
/// Each variant borrows the data that the corresponding stage computed.
#[must_use]
pub enum StageOutput<'a> {
    /// Source image bytes (not yet decoded).
    Source {
        /// The raw image bytes.
        bytes: &'a [u8],
    },
    /// Decoded luma image.
    Decoded {
        /// The decoded image.
        original: &'a GrayImage,
    },
    /// Binarized image at source resolution.
    Binarized {
        /// The two-valued image.
        binary: &'a GrayImage,
    },
    /// Working-resolution image and grid.
    Downsampled {
        /// The shrunk binarized image.
        working: &'a GrayImage,
        /// The grid built from it.
        grid: &'a PixelGrid,
    },
    /// Boundary openings.
    Located {
        /// The untouched working grid.
        grid: &'a PixelGrid,
        /// Start and end cells.
        endpoints: Endpoints,
    },
    /// Search result.
    Searched {
        /// Grid with reached cells marked visited.
        explored: &'a PixelGrid,
        /// The shortest path.
        path: &'a Path,
    },
    /// Painted result.
    Painted {
        /// The final grid.
        painted: &'a PixelGrid,
        /// The shortest path.
        path: &'a Path,
    },
}

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// Each stage struct implements it, and [`Stage`] delegates to whichever
/// variant it holds.
///
/// # Loop pattern
///
/// ```rust
/// # use mazesolve_pipeline::{Pipeline, SolveConfig, PipelineError};
/// # use mazesolve_pipeline::pipeline::{Stage, PipelineStage, Advance};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage: Stage = Pipeline::new(png, SolveConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let solved = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage: Sized {
    /// Short name of this stage (e.g. `"source"`, `"search"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `6` for
    /// Painted).
    const INDEX: usize;

    /// The output this stage produced.
    fn output(&self) -> StageOutput<'_>;

    /// Stage-specific metrics for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage, which has not
    /// done any work yet.
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage, or `Err` if the stage transition fails.
    ///
    /// # Errors
    ///
    /// Returns the [`PipelineError`] of the failing transition.
    fn next(self) -> Result<Option<Stage>, PipelineError>;

    /// Run all remaining stages and return the [`SolvedMaze`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    fn complete(self) -> Result<SolvedMaze, PipelineError>;
}

impl PipelineStage for Pending {
    const NAME: &str = "source";
    const INDEX: usize = 0;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Source {
            bytes: &self.source,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Decoded(self.decode()?)))
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        self.decode()?.complete()
    }
}

impl PipelineStage for Decoded {
    const NAME: &str = "decode";
    const INDEX: usize = 1;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Decoded {
            original: &self.original,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Decode {
            input_bytes: self.source_len,
            width: self.original.width(),
            height: self.original.height(),
            pixel_count: u64::from(self.original.width()) * u64::from(self.original.height()),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Binarized(self.binarize())))
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        self.binarize().complete()
    }
}

impl PipelineStage for Binarized {
    const NAME: &str = "binarize";
    const INDEX: usize = 2;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Binarized {
            binary: &self.binary,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Binarize {
            threshold: self.config.threshold,
            open_pixels: crate::diagnostics::count_open_pixels(&self.binary),
            total_pixels: u64::from(self.binary.width()) * u64::from(self.binary.height()),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Downsampled(self.downsample()?)))
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        self.downsample()?.complete()
    }
}

impl PipelineStage for Downsampled {
    const NAME: &str = "downsample";
    const INDEX: usize = 3;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Downsampled {
            working: &self.working,
            grid: &self.grid,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Downsample {
            original_width: self.binary.width(),
            original_height: self.binary.height(),
            width: self.grid.width(),
            height: self.grid.height(),
            factor: self.config.factor,
            applied: self.applied,
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Located(self.locate_endpoints()?)))
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        self.locate_endpoints()?.complete()
    }
}

impl PipelineStage for Located {
    const NAME: &str = "locate";
    const INDEX: usize = 4;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Located {
            grid: &self.grid,
            endpoints: self.endpoints,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Locate {
            margin: self.config.margin,
            start: self.endpoints.start,
            end: self.endpoints.end,
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Searched(self.search()?)))
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        self.search()?.complete()
    }
}

impl PipelineStage for Searched {
    const NAME: &str = "search";
    const INDEX: usize = 5;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Searched {
            explored: &self.explored,
            path: &self.path,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Search {
            path_cells: self.path.len(),
            open_cells: self.open_cells,
            cells_visited: self.stats.cells_visited,
            cells_expanded: self.stats.cells_expanded,
            peak_frontier: self.stats.peak_frontier,
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Painted(self.paint()?)))
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        self.paint()?.complete()
    }
}

impl PipelineStage for Painted {
    const NAME: &str = "paint";
    const INDEX: usize = 6;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Painted {
            painted: &self.painted,
            path: &self.path,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Paint {
            path_cells: self.summary.path_cells,
            dead_end_cells: self.summary.dead_end_cells,
            unexplored_cells: self.summary.unexplored_cells,
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(None)
    }

    fn complete(self) -> Result<SolvedMaze, PipelineError> {
        Ok(self.into_result())
    }
}

/// Type-erased pipeline state: whichever stage the pipeline is at.
///
/// Convert any stage struct into a `Stage` with `.into()` and drive it
/// with [`advance`](Self::advance).
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`Binarized`].
    Binarized(Binarized),
    /// See [`Downsampled`].
    Downsampled(Downsampled),
    /// See [`Located`].
    Located(Located),
    /// See [`Searched`].
    Searched(Searched),
    /// See [`Painted`].
    Painted(Painted),
}

/// Compile-time guard: if a [`Stage`] variant is added, this match becomes
/// non-exhaustive and the build fails — reminding you to bump [`STAGE_COUNT`].
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage) {
    match s {
        Stage::Pending(_)
        | Stage::Decoded(_)
        | Stage::Binarized(_)
        | Stage::Downsampled(_)
        | Stage::Located(_)
        | Stage::Searched(_)
        | Stage::Painted(_) => {}
    }
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance {
    /// The pipeline advanced to this next stage.
    Next(Stage),
    /// The pipeline was already at the final stage; returned unchanged.
    Complete(Stage),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::Decoded(s) => s.$method($($arg),*),
            Self::Binarized(s) => s.$method($($arg),*),
            Self::Downsampled(s) => s.$method($($arg),*),
            Self::Located(s) => s.$method($($arg),*),
            Self::Searched(s) => s.$method($($arg),*),
            Self::Painted(s) => s.$method($($arg),*),
        }
    };
}

impl Stage {
    /// Short name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// The output this stage produced.
    pub fn output(&self) -> StageOutput<'_> {
        delegate!(self, output)
    }

    /// Stage-specific metrics for diagnostics. `None` for `Pending`.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Painted(_))
    }

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(next_stage))` on success, `Ok(None)` if
    /// already complete (the `Painted` value is consumed), or `Err` if
    /// the transition fails.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn next(self) -> Result<Option<Self>, PipelineError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// This is the loop-friendly version of [`next`](Self::next): the
    /// final stage comes back as [`Advance::Complete`] so
    /// [`complete`](Self::complete) can still be called on it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn advance(self) -> Result<Advance, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Non-complete stages always return Ok(Some(_)) from next().
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-complete stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    pub fn complete(self) -> Result<SolvedMaze, PipelineError> {
        delegate!(self, complete)
    }
}

// The macro needs `.name()` and `.index()` on `&self`; associated
// constants are not reachable through a value.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<T: PipelineStage> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

impl From<Pending> for Stage {
    fn from(s: Pending) -> Self {
        Self::Pending(s)
    }
}

impl From<Decoded> for Stage {
    fn from(s: Decoded) -> Self {
        Self::Decoded(s)
    }
}

impl From<Binarized> for Stage {
    fn from(s: Binarized) -> Self {
        Self::Binarized(s)
    }
}

impl From<Downsampled> for Stage {
    fn from(s: Downsampled) -> Self {
        Self::Downsampled(s)
    }
}

impl From<Located> for Stage {
    fn from(s: Located) -> Self {
        Self::Located(s)
    }
}

impl From<Searched> for Stage {
    fn from(s: Searched) -> Self {
        Self::Searched(s)
    }
}

impl From<Painted> for Stage {
    fn from(s: Painted) -> Self {
        Self::Painted(s)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental maze-solving pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing. Each stage method consumes the
/// current state and returns the next, making it a compile-time error to
/// skip stages or call them out of order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// No processing is performed. Call [`.decode()`](Pending::decode)
    /// (or convert to a [`Stage`] and loop) to begin.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: SolveConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    /// A small maze whose openings sit at columns 3 and 6 of the bottom
    /// row. The shortest route climbs through the inner chamber: 12 cells.
    const MAZE: [&str; 8] = [
        "##########",
        "#........#",
        "#.######.#",
        "#.#....#.#",
        "#.#.##.#.#",
        "#...##...#",
        "###.##.###",
        "###.##.###",
    ];

    /// Render text rows as a PNG, each cell a `scale × scale` block.
    fn maze_png(rows: &[&str], scale: u32) -> Vec<u8> {
        let grid = PixelGrid::from_ascii(rows).unwrap();
        let img = crate::downsample::upscale(
            &grid.to_gray_image(&crate::types::Palette::default()),
            scale,
        );
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    fn maze() -> Vec<u8> {
        maze_png(&MAZE, 4)
    }

    // ─────────── Typed API tests ─────────────────────────────────

    #[test]
    fn pending_exposes_source_bytes() {
        let png = maze();
        let expected_len = png.len();
        let pending = Pipeline::new(png, SolveConfig::default());
        assert_eq!(pending.source().len(), expected_len);
    }

    #[test]
    fn decode_empty_input_returns_error() {
        let result = Pipeline::new(vec![], SolveConfig::default()).decode();
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn decode_rejects_invalid_config_before_decoding() {
        let config = SolveConfig {
            factor: 0,
            ..SolveConfig::default()
        };
        let result = Pipeline::new(vec![], config).decode();
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn decoded_exposes_original() {
        let decoded = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap();
        assert_eq!(decoded.original().dimensions(), (40, 32));
    }

    #[test]
    fn binarized_has_two_values() {
        let binarized = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize();
        assert!(
            binarized
                .binary()
                .pixels()
                .all(|p| p.0[0] == 0 || p.0[0] == 255)
        );
    }

    #[test]
    fn downsampled_recovers_cell_grid() {
        let downsampled = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap();
        assert!(downsampled.applied());
        assert_eq!(downsampled.working().dimensions(), (10, 8));
        assert_eq!(downsampled.grid(), &PixelGrid::from_ascii(&MAZE).unwrap());
    }

    #[test]
    fn factor_one_solves_at_source_resolution() {
        let config = SolveConfig {
            factor: 1,
            ..SolveConfig::default()
        };
        let downsampled = Pipeline::new(maze_png(&MAZE, 1), config)
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap();
        assert!(!downsampled.applied());
        assert_eq!(downsampled.grid().width(), 10);
    }

    #[test]
    fn located_exposes_endpoints() {
        let located = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap();
        assert_eq!(located.endpoints().start, Coordinate::new(7, 3));
        assert_eq!(located.endpoints().end, Coordinate::new(7, 6));
    }

    #[test]
    fn locate_fails_without_openings() {
        let closed = [
            "##########",
            "#........#",
            "##########",
        ];
        let result = Pipeline::new(maze_png(&closed, 4), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints();
        assert!(matches!(
            result,
            Err(PipelineError::EndpointNotFound { runs_found: 0 })
        ));
    }

    #[test]
    fn searched_exposes_path_and_explored_grid() {
        let searched = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap()
            .search()
            .unwrap();
        assert_eq!(searched.path().len(), 12);
        assert_eq!(
            searched.explored().count(CellState::Visited),
            searched.stats().cells_visited
        );
    }

    #[test]
    fn search_fails_when_openings_are_disconnected() {
        let split = [
            "##########",
            "#...##...#",
            "###.##.###",
        ];
        let result = Pipeline::new(maze_png(&split, 4), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap()
            .search();
        assert!(matches!(result, Err(PipelineError::NoPathFound)));
    }

    #[test]
    fn painted_keeps_explored_snapshot() {
        let solved = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap()
            .search()
            .unwrap()
            .paint()
            .unwrap()
            .into_result();
        assert_eq!(solved.explored.count(CellState::PathMark), 0);
        assert_eq!(solved.painted.count(CellState::PathMark), 12);
        assert_eq!(solved.painted.count(CellState::Open), 0);
        assert_eq!(solved.factor, 4);
        assert_eq!(solved.rendered_full_size().dimensions(), (40, 32));
    }

    // ─────────── Helper: drive a Stage to completion ────────────

    /// Advance a [`Stage`] to completion, returning the final stage
    /// and a log of `(index, name)` pairs visited along the way.
    #[allow(clippy::type_complexity)]
    fn drive_to_end(start: Stage) -> Result<(Stage, Vec<(usize, &'static str)>), PipelineError> {
        let mut log = vec![(start.index(), start.name())];
        let mut stage = start;
        loop {
            match stage.advance()? {
                Advance::Next(next) => {
                    log.push((next.index(), next.name()));
                    stage = next;
                }
                Advance::Complete(done) => return Ok((done, log)),
            }
        }
    }

    // ─────────── PipelineStage trait + Stage enum tests ───────────

    #[test]
    fn stage_names_and_indices() {
        let start: Stage = Pipeline::new(maze(), SolveConfig::default()).into();
        let (_, log) = drive_to_end(start).unwrap();
        let expected = [
            (0, "source"),
            (1, "decode"),
            (2, "binarize"),
            (3, "downsample"),
            (4, "locate"),
            (5, "search"),
            (6, "paint"),
        ];
        assert_eq!(log.as_slice(), &expected);
    }

    #[test]
    fn loop_to_completion_matches_chained_api() {
        let config = SolveConfig::default();
        let chained = Pipeline::new(maze(), config.clone())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap()
            .search()
            .unwrap()
            .paint()
            .unwrap()
            .into_result();

        let start: Stage = Pipeline::new(maze(), config).into();
        let (final_stage, _) = drive_to_end(start).unwrap();
        let looped = final_stage.complete().unwrap();

        assert_eq!(chained.original, looped.original);
        assert_eq!(chained.binary, looped.binary);
        assert_eq!(chained.working, looped.working);
        assert_eq!(chained.explored, looped.explored);
        assert_eq!(chained.painted, looped.painted);
        assert_eq!(chained.endpoints, looped.endpoints);
        assert_eq!(chained.path, looped.path);
        assert_eq!(chained.search, looped.search);
        assert_eq!(chained.paint, looped.paint);
    }

    #[test]
    fn complete_from_pending() {
        let solved = Pipeline::new(maze(), SolveConfig::default())
            .complete()
            .unwrap();
        assert_eq!(solved.path.len(), 12);
    }

    #[test]
    fn complete_from_mid_stage() {
        let located = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap();
        let solved = located.complete().unwrap();
        assert_eq!(solved.path.len(), 12);
    }

    #[test]
    fn next_on_painted_returns_none() {
        let painted = Pipeline::new(maze(), SolveConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .downsample()
            .unwrap()
            .locate_endpoints()
            .unwrap()
            .search()
            .unwrap()
            .paint()
            .unwrap();
        assert!(painted.next().unwrap().is_none());
    }

    #[test]
    fn stage_is_complete() {
        let start: Stage = Pipeline::new(maze(), SolveConfig::default()).into();
        assert!(!start.is_complete());
        let (final_stage, _) = drive_to_end(start).unwrap();
        assert!(final_stage.is_complete());
    }

    #[test]
    fn output_variant_matches_stage() {
        let mut stage: Stage = Pipeline::new(maze(), SolveConfig::default()).into();
        let mut visited = 0;
        loop {
            let idx = stage.index();
            let variant_idx = match stage.output() {
                StageOutput::Source { .. } => 0,
                StageOutput::Decoded { .. } => 1,
                StageOutput::Binarized { .. } => 2,
                StageOutput::Downsampled { .. } => 3,
                StageOutput::Located { .. } => 4,
                StageOutput::Searched { .. } => 5,
                StageOutput::Painted { .. } => 6,
            };
            assert_eq!(idx, variant_idx, "output variant mismatch at index {idx}");
            visited += 1;
            match stage.advance().unwrap() {
                Advance::Next(next) => stage = next,
                Advance::Complete(_) => break,
            }
        }
        assert_eq!(visited, STAGE_COUNT);
    }

    #[test]
    fn metrics_present_after_pending() {
        let mut stage: Stage = Pipeline::new(maze(), SolveConfig::default()).into();
        assert!(stage.metrics().is_none());
        loop {
            match stage.advance().unwrap() {
                Advance::Next(next) => {
                    assert!(next.metrics().is_some(), "{} has no metrics", next.name());
                    stage = next;
                }
                Advance::Complete(_) => break,
            }
        }
    }

    #[test]
    fn pending_decode_error_via_advance() {
        let stage: Stage = Pipeline::new(vec![], SolveConfig::default()).into();
        let result = stage.advance();
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }
}
