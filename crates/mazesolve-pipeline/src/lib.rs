//! mazesolve-pipeline: Maze image solver core (sans-IO).
//!
//! Turns a photo or scan of a maze into a painted solution through:
//! decode -> binarize -> downsample -> locate endpoints ->
//! breadth-first search -> paint.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and grids and returns structured data. Filesystem and
//! terminal interaction lives in `mazesolve-io`.

pub mod decode;
pub mod diagnostics;
pub mod downsample;
pub mod endpoints;
pub mod grid;
pub mod paint;
pub mod pipeline;
pub mod search;
pub mod types;

pub use grid::{CellState, PixelGrid};
pub use paint::PaintSummary;
pub use pipeline::Pipeline;
pub use search::SearchStats;
pub use types::{
    Coordinate, Dimensions, Endpoints, GrayImage, Palette, Path, PipelineError, SolveConfig,
    SolvedMaze,
};

/// Solve a maze image end to end.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration and
/// returns the [`SolvedMaze`] with every intermediate kept.
///
/// # Pipeline steps
///
/// 1. Decode and convert to 8-bit luma
/// 2. Threshold to walls and corridors
/// 3. Shrink by the integer factor and build the grid
/// 4. Find the two openings on the bottom row
/// 5. Breadth-first search between them
/// 6. Paint the solution
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for an unusable config or an
/// image too small for the factor, [`PipelineError::EmptyInput`] or
/// [`PipelineError::ImageDecode`] for unreadable input,
/// [`PipelineError::EndpointNotFound`] if the bottom row lacks two
/// openings, and [`PipelineError::NoPathFound`] if they are not
/// connected.
pub fn solve(image_bytes: &[u8], config: &SolveConfig) -> Result<SolvedMaze, PipelineError> {
    Pipeline::new(image_bytes.to_vec(), config.clone())
        .decode()?
        .binarize()
        .downsample()?
        .locate_endpoints()?
        .search()?
        .paint()
        .map(pipeline::Painted::into_result)
}

/// Result of [`solve_grid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSolution {
    /// The grid as the search left it.
    pub explored: PixelGrid,
    /// The grid after painting.
    pub painted: PixelGrid,
    /// Start and end cells.
    pub endpoints: Endpoints,
    /// Shortest path from start to end.
    pub path: Path,
    /// Search counters.
    pub search: SearchStats,
    /// Painter counters.
    pub paint: PaintSummary,
}

/// Solve a grid the caller already holds: locate endpoints, search, and
/// paint. Only `config.margin` is used.
///
/// # Errors
///
/// Returns [`PipelineError::EndpointNotFound`] or
/// [`PipelineError::NoPathFound`] as [`solve`] does.
pub fn solve_grid(grid: PixelGrid, config: &SolveConfig) -> Result<GridSolution, PipelineError> {
    let mut explored = grid;
    let endpoints = endpoints::locate_endpoints(&explored, config.margin)?;
    let (path, search) =
        search::find_path_with_stats(&mut explored, endpoints.start, endpoints.end)?;
    let mut painted = explored.clone();
    let paint = paint::paint_result(&mut painted, &path)?;
    Ok(GridSolution {
        explored,
        painted,
        endpoints,
        path,
        search,
        paint,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode text rows as a PNG, each cell a `scale × scale` block.
    fn maze_png(rows: &[&str], scale: u32) -> Vec<u8> {
        let grid = PixelGrid::from_ascii(rows).unwrap();
        let img = downsample::upscale(&grid.to_gray_image(&Palette::default()), scale);
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

    const CORRIDOR: [&str; 4] = [
        "########",
        "#......#",
        "#.####.#",
        "#.####.#",
    ];

    #[test]
    fn solve_empty_input() {
        let result = solve(&[], &SolveConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn solve_corrupt_input() {
        let result = solve(&[0xFF, 0x00], &SolveConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn solve_image_too_small_for_factor() {
        let png = maze_png(&CORRIDOR, 1);
        let config = SolveConfig {
            factor: 16,
            ..SolveConfig::default()
        };
        assert!(matches!(
            solve(&png, &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn solve_corridor_maze() {
        // Openings at columns 1 and 6 of the bottom row; margin 1 keeps
        // them in range.
        let config = SolveConfig {
            margin: 1,
            ..SolveConfig::default()
        };
        let solved = solve(&maze_png(&CORRIDOR, 4), &config).unwrap();
        assert_eq!(solved.endpoints.start, Coordinate::new(3, 1));
        assert_eq!(solved.endpoints.end, Coordinate::new(3, 6));
        // Up the left arm, across row 1, down the right arm.
        assert_eq!(solved.path.len(), 10);
        assert_eq!(solved.dimensions(), Dimensions { width: 8, height: 4 });
    }

    #[test]
    fn solve_grid_matches_image_solve() {
        let config = SolveConfig {
            margin: 1,
            ..SolveConfig::default()
        };
        let from_image = solve(&maze_png(&CORRIDOR, 4), &config).unwrap();
        let from_grid = solve_grid(PixelGrid::from_ascii(&CORRIDOR).unwrap(), &config).unwrap();
        assert_eq!(from_grid.path, from_image.path);
        assert_eq!(from_grid.painted, from_image.painted);
        assert_eq!(from_grid.explored, from_image.explored);
    }

    #[test]
    fn solve_grid_reports_missing_endpoints() {
        let grid = PixelGrid::from_ascii(&["#####", "#...#", "#####"]).unwrap();
        let result = solve_grid(grid, &SolveConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::EndpointNotFound { runs_found: 0 })
        ));
    }

    #[test]
    fn rendered_uses_palette() {
        let config = SolveConfig {
            margin: 1,
            palette: Palette {
                path: 200,
                ..Palette::default()
            },
            ..SolveConfig::default()
        };
        let solved = solve(&maze_png(&CORRIDOR, 4), &config).unwrap();
        let img = solved.rendered();
        // (3, 1) is the start cell: column 1, row 3.
        assert_eq!(img.get_pixel(1, 3).0[0], 200);
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
    }
}
