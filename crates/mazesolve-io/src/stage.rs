//! Writing pipeline intermediates to disk for inspection.

use std::path::{Path, PathBuf};

use mazesolve_pipeline::pipeline::{Stage, StageOutput};
use mazesolve_pipeline::{Endpoints, GrayImage, Palette, PixelGrid};

use crate::IoError;
use crate::file::{OutputFormat, write_image};

fn ensure_dir(dir: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|source| IoError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

/// Grid rendered with the two openings drawn in the explored shade.
fn endpoints_image(grid: &PixelGrid, endpoints: Endpoints, palette: &Palette) -> GrayImage {
    let mut img = grid.to_gray_image(palette);
    for c in [endpoints.start, endpoints.end] {
        if c.col < img.width() && c.row < img.height() {
            img.put_pixel(c.col, c.row, image::Luma([palette.visited]));
        }
    }
    img
}

/// Write the image a stage produced to `dir` as `NN-name.png`.
///
/// Returns the written path, or `None` for the source stage, which has
/// nothing to show yet.
///
/// # Errors
///
/// Returns [`IoError::Write`] if `dir` cannot be created or the file
/// cannot be written.
pub fn dump_stage(stage: &Stage, dir: &Path, palette: &Palette) -> Result<Option<PathBuf>, IoError> {
    let image = match stage.output() {
        StageOutput::Source { .. } => return Ok(None),
        StageOutput::Decoded { original } => original.clone(),
        StageOutput::Binarized { binary } => binary.clone(),
        StageOutput::Downsampled { working, .. } => working.clone(),
        StageOutput::Located { grid, endpoints } => endpoints_image(grid, endpoints, palette),
        StageOutput::Searched { explored, .. } => explored.to_gray_image(palette),
        StageOutput::Painted { painted, .. } => painted.to_gray_image(palette),
    };
    ensure_dir(dir)?;
    let path = dir.join(format!(
        "{:02}-{}.{}",
        stage.index(),
        stage.name(),
        OutputFormat::Png.extension()
    ));
    write_image(&image, &path, OutputFormat::Png)?;
    log::info!("dumped stage {} to {}", stage.name(), path.display());
    Ok(Some(path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mazesolve_pipeline::pipeline::Advance;
    use mazesolve_pipeline::{Pipeline, PipelineError, SolveConfig};

    use super::*;
    use crate::file::encode;

    const MAZE: [&str; 6] = [
        "########",
        "#......#",
        "#.####.#",
        "#.#..#.#",
        "#.#..#.#",
        "#.####.#",
    ];

    fn maze_png() -> Vec<u8> {
        let grid = PixelGrid::from_ascii(&MAZE).unwrap();
        let img =
            mazesolve_pipeline::downsample::upscale(&grid.to_gray_image(&Palette::default()), 4);
        encode(&img, OutputFormat::Png).unwrap()
    }

    fn config() -> SolveConfig {
        SolveConfig {
            margin: 1,
            ..SolveConfig::default()
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mazesolve-stage-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn read_gray(path: &Path) -> GrayImage {
        image::open(path).unwrap().to_luma8()
    }

    #[test]
    fn every_stage_after_source_is_dumped() -> Result<(), PipelineError> {
        let dir = scratch_dir("all");
        let palette = Palette::default();
        let mut stage: Stage = Pipeline::new(maze_png(), config()).into();
        assert_eq!(dump_stage(&stage, &dir, &palette).unwrap(), None);

        let mut written = Vec::new();
        loop {
            match stage.advance()? {
                Advance::Next(next) => {
                    written.push(dump_stage(&next, &dir, &palette).unwrap().unwrap());
                    stage = next;
                }
                Advance::Complete(done) => {
                    stage = done;
                    break;
                }
            }
        }

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "01-decode.png",
                "02-binarize.png",
                "03-downsample.png",
                "04-locate.png",
                "05-search.png",
                "06-paint.png",
            ]
        );
        assert_eq!(read_gray(&written[0]).dimensions(), (32, 24));
        assert_eq!(read_gray(&written[2]).dimensions(), (8, 6));

        let solved = stage.complete()?;
        assert_eq!(read_gray(&written[5]), solved.rendered());

        std::fs::remove_dir_all(dir).unwrap();
        Ok(())
    }

    #[test]
    fn located_dump_marks_openings() -> Result<(), PipelineError> {
        let dir = scratch_dir("located");
        let palette = Palette::default();
        let located: Stage = Pipeline::new(maze_png(), config())
            .decode()?
            .binarize()
            .downsample()?
            .locate_endpoints()?
            .into();
        let path = dump_stage(&located, &dir, &palette).unwrap().unwrap();
        let img = read_gray(&path);
        // Openings at (5, 1) and (5, 6).
        assert_eq!(img.get_pixel(1, 5).0[0], palette.visited);
        assert_eq!(img.get_pixel(6, 5).0[0], palette.visited);
        assert_eq!(img.get_pixel(1, 1).0[0], palette.open);
        std::fs::remove_dir_all(dir).unwrap();
        Ok(())
    }
}
