//! mazesolve-io: Filesystem and terminal I/O for mazesolve.
//!
//! Reads maze images from disk, writes solved images and per-stage
//! intermediates, and previews images in a terminal. All solving lives
//! in `mazesolve-pipeline`; this crate only moves bytes and pixels.

use std::path::PathBuf;

use mazesolve_pipeline::PipelineError;

pub mod file;
pub mod stage;
pub mod terminal;

pub use file::{OutputFormat, encode, load, save, write_image};
pub use stage::dump_stage;
pub use terminal::{display, display_legend, render, render_legend, terminal_columns};

/// Errors that can occur while reading, writing, or displaying images.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Reading an input file failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing an output file or directory failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The file or directory being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Image encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// The output file extension does not name a supported format.
    #[error("unsupported output format for {}", path.display())]
    UnsupportedFormat {
        /// The offending output path.
        path: PathBuf,
    },

    /// Writing to the terminal failed.
    #[error("terminal output failed: {0}")]
    Terminal(#[source] std::io::Error),

    /// The pipeline reported an error.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
