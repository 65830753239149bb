//! Solve diagnostics: timing, counts, and other metrics for each stage.
//!
//! Timing goes through the [`Clock`] trait so this crate stays free of
//! platform time sources; binaries supply an `Instant`-backed clock and
//! tests supply a deterministic one.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Advance, Pipeline, Stage};
use crate::types::{Coordinate, PipelineError, SolveConfig, SolvedMaze};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// One entry per executed stage, in pipeline order.
    pub stages: Vec<StageDiagnostics>,
    /// Total wall-clock duration of the whole run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: SolveSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Stage name (`"decode"`, `"search"`, ...).
    pub stage: String,
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Thresholding metrics.
    Binarize {
        /// Luma level; values strictly above it became open.
        threshold: u8,
        /// Pixels that became open (255).
        open_pixels: u64,
        /// Total pixel count.
        total_pixels: u64,
    },
    /// Working-resolution metrics.
    Downsample {
        /// Source width in pixels.
        original_width: u32,
        /// Source height in pixels.
        original_height: u32,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
        /// Integer downscale factor.
        factor: u32,
        /// Whether resizing was actually applied.
        applied: bool,
    },
    /// Endpoint scan metrics.
    Locate {
        /// Columns skipped at each end of the boundary row.
        margin: u32,
        /// Start cell.
        start: Coordinate,
        /// End cell.
        end: Coordinate,
    },
    /// Breadth-first search metrics.
    Search {
        /// Cells on the shortest path.
        path_cells: usize,
        /// Open cells before the search.
        open_cells: usize,
        /// Cells marked visited.
        cells_visited: usize,
        /// Cells taken off the queue.
        cells_expanded: usize,
        /// Largest queue length.
        peak_frontier: usize,
    },
    /// Painter metrics.
    Paint {
        /// Cells on the solution path.
        path_cells: usize,
        /// Explored cells outlining the path.
        dead_end_cells: usize,
        /// Unreached cells folded into the explored class.
        unexplored_cells: usize,
    },
}

/// High-level summary for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Grid width in cells.
    pub grid_width: u32,
    /// Grid height in cells.
    pub grid_height: u32,
    /// Integer downscale factor.
    pub factor: u32,
    /// Start cell.
    pub start: Coordinate,
    /// End cell.
    pub end: Coordinate,
    /// Cells on the shortest path.
    pub path_cells: usize,
    /// Cells the search reached.
    pub cells_visited: usize,
}

impl SolveSummary {
    fn from_solved(solved: &SolvedMaze) -> Self {
        let grid = solved.dimensions();
        Self {
            image_width: solved.original.width(),
            image_height: solved.original.height(),
            grid_width: grid.width,
            grid_height: grid.height,
            factor: solved.factor,
            start: solved.endpoints.start,
            end: solved.endpoints.end,
            path_cells: solved.path.len(),
            cells_visited: solved.search.cells_visited,
        }
    }
}

impl SolveDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Solve Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} -> grid {}x{} (factor {})",
            self.summary.image_width,
            self.summary.image_height,
            self.summary.grid_width,
            self.summary.grid_height,
            self.summary.factor,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for diag in &self.stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let name = &diag.stage;
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Path: {} -> {}, {} cells  |  Visited: {}",
            self.summary.start,
            self.summary.end,
            self.summary.path_cells,
            self.summary.cells_visited,
        ));

        lines.join("\n")
    }

    /// Diagnostics for the stage called `name`, if it ran.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageDiagnostics> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// Run the full pipeline, timing each stage with `clock`.
///
/// # Errors
///
/// Returns the [`PipelineError`] of the first stage that fails; no
/// diagnostics are returned in that case.
pub fn solve_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &SolveConfig,
    clock: &C,
) -> Result<(SolvedMaze, SolveDiagnostics), PipelineError> {
    solve_observed(image_bytes, config, clock, |_| {})
}

/// [`solve_with_diagnostics`], calling `observe` with every stage the
/// pipeline reaches after the source stage.
///
/// Stages are observed as they are produced, so a run that fails still
/// shows everything up to the failing stage. Time spent in `observe` is
/// not attributed to any stage.
///
/// # Errors
///
/// Same as [`solve_with_diagnostics`].
pub fn solve_observed<C: Clock, F: FnMut(&Stage)>(
    image_bytes: &[u8],
    config: &SolveConfig,
    clock: &C,
    mut observe: F,
) -> Result<(SolvedMaze, SolveDiagnostics), PipelineError> {
    let total_start = clock.now();
    let mut stages = Vec::with_capacity(crate::pipeline::STAGE_COUNT - 1);
    let mut stage: Stage = Pipeline::new(image_bytes.to_vec(), config.clone()).into();

    loop {
        let start = clock.now();
        match stage.advance()? {
            Advance::Next(next) => {
                let duration = clock.elapsed(&start);
                if let Some(metrics) = next.metrics() {
                    stages.push(StageDiagnostics {
                        stage: next.name().to_string(),
                        duration,
                        metrics,
                    });
                }
                observe(&next);
                stage = next;
            }
            Advance::Complete(done) => {
                stage = done;
                break;
            }
        }
    }

    let solved = stage.complete()?;
    let total_duration = clock.elapsed(&total_start);
    let summary = SolveSummary::from_solved(&solved);
    Ok((
        solved,
        SolveDiagnostics {
            stages,
            total_duration,
            summary,
        },
    ))
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Binarize {
            threshold,
            open_pixels,
            total_pixels,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixels > 0 {
                *open_pixels as f64 / *total_pixels as f64 * 100.0
            } else {
                0.0
            };
            format!("level={threshold} open={open_pixels} ({density:.1}%)")
        }
        StageMetrics::Downsample {
            original_width,
            original_height,
            width,
            height,
            factor,
            applied,
        } => {
            if *applied {
                format!("{original_width}x{original_height} -> {width}x{height} (/{factor})")
            } else {
                format!("{width}x{height} (unchanged)")
            }
        }
        StageMetrics::Locate { margin, start, end } => {
            format!("start={start} end={end} margin={margin}")
        }
        StageMetrics::Search {
            path_cells,
            open_cells,
            cells_visited,
            cells_expanded,
            peak_frontier,
        } => format!(
            "path={path_cells} visited={cells_visited}/{open_cells} expanded={cells_expanded} frontier<={peak_frontier}",
        ),
        StageMetrics::Paint {
            path_cells,
            dead_end_cells,
            unexplored_cells,
        } => format!("path={path_cells} halo={dead_end_cells} unexplored={unexplored_cells}"),
    }
}

/// Count open pixels (value == 255) in a binarized image.
pub(crate) fn count_open_pixels(image: &image::GrayImage) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}
