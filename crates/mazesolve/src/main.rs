//! mazesolve: solve a black-and-white maze image from the command line.
//!
//! Reads a maze image, finds the shortest route between the two openings
//! on its bottom edge, previews the painted result in the terminal and
//! optionally writes it to disk at the original size.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin mazesolve -- [OPTIONS] <INPUT> [OUTPUT]
//! ```
//!
//! Set `RUST_LOG=debug` for stage-by-stage logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use mazesolve_io::{IoError, OutputFormat};
use mazesolve_pipeline::SolveConfig;
use mazesolve_pipeline::diagnostics::{Clock, solve_observed};

/// Solve a maze image with a shortest-path breadth-first search.
///
/// The maze must have dark walls on a light background and exactly two
/// openings in its bottom edge.
#[derive(Parser)]
#[command(name = "mazesolve", version)]
struct Cli {
    /// Path to the maze image (PNG, JPEG, BMP, WebP).
    input: PathBuf,

    /// Where to write the solved image. Nothing is written when omitted.
    output: Option<PathBuf>,

    /// Shrink the image by this integer factor before solving.
    #[arg(long, default_value_t = SolveConfig::DEFAULT_FACTOR, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    factor: u32,

    /// Grey level above which a pixel counts as open.
    #[arg(long, default_value_t = SolveConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Columns skipped at each end of the bottom row when looking for
    /// the openings.
    #[arg(long, default_value_t = SolveConfig::DEFAULT_MARGIN)]
    margin: u32,

    /// Output image format. Inferred from OUTPUT's extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Skip the terminal preview.
    #[arg(long)]
    no_display: bool,

    /// Maximum preview width in columns. Defaults to the terminal width.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    columns: Option<u32>,

    /// Print a colour legend under the preview.
    #[arg(long)]
    legend: bool,

    /// Print per-stage diagnostics.
    #[arg(long)]
    report: bool,

    /// Print per-stage diagnostics as JSON instead of a table.
    #[arg(long, conflicts_with = "report")]
    json: bool,

    /// Full solve config as a JSON string.
    ///
    /// When provided, `--factor`, `--threshold` and `--margin` are
    /// ignored. The JSON must be a valid `SolveConfig` serialization;
    /// missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write each stage's image into this directory as it is produced.
    #[arg(long, value_name = "DIR")]
    dump_stages: Option<PathBuf>,
}

/// Output format selection.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Lossless PNG.
    Png,
    /// Uncompressed BMP.
    Bmp,
    /// Lossy JPEG.
    Jpeg,
    /// Lossless WebP.
    Webp,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => Self::Png,
            Format::Bmp => Self::Bmp,
            Format::Jpeg => Self::Jpeg,
            Format::Webp => Self::WebP,
        }
    }
}

/// Errors that end a CLI run.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("failed to serialize diagnostics: {0}")]
    Json(#[from] serde_json::Error),
}

/// Build a [`SolveConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SolveConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        SolveConfig {
            threshold: cli.threshold,
            factor: cli.factor,
            margin: cli.margin,
            ..SolveConfig::default()
        }
    };
    config
        .validate()
        .map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &SolveConfig) -> Result<(), CliError> {
    // Resolve the output format before spending time on the solve.
    let output = cli
        .output
        .as_deref()
        .map(|path| {
            OutputFormat::for_output(path, cli.format.map(OutputFormat::from))
                .map(|format| (path, format))
        })
        .transpose()?;

    let image_bytes = mazesolve_io::load(&cli.input)?;
    eprintln!(
        "Image: {} ({} bytes)",
        cli.input.display(),
        image_bytes.len(),
    );
    log::debug!("config: {config:?}");

    let mut dump_error = None;
    let result = solve_observed(&image_bytes, config, &StdClock, |stage| {
        let Some(ref dir) = cli.dump_stages else {
            return;
        };
        if dump_error.is_some() {
            return;
        }
        if let Err(e) = mazesolve_io::dump_stage(stage, dir, &config.palette) {
            dump_error = Some(e);
        }
    });
    let (solved, diagnostics) = result.map_err(IoError::from)?;
    if let Some(e) = dump_error {
        return Err(e.into());
    }

    eprintln!(
        "Solved: {} cells from {} to {} ({} cells explored)",
        solved.path.len(),
        solved.endpoints.start,
        solved.endpoints.end,
        solved.search.cells_visited,
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else if cli.report {
        println!("{}", diagnostics.report());
    }

    if !cli.no_display {
        let columns = cli.columns.unwrap_or_else(mazesolve_io::terminal_columns);
        mazesolve_io::display(&solved.rendered(), columns)?;
        if cli.legend {
            mazesolve_io::display_legend(&solved.palette)?;
        }
    }

    if let Some((path, format)) = output {
        mazesolve_io::save(&solved, path, format)?;
        eprintln!("Solution written to {} ({format})", path.display());
    }

    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
