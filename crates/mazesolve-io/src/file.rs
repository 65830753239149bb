//! Reading maze images and writing results to disk.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use mazesolve_pipeline::{GrayImage, SolvedMaze};

use crate::IoError;

/// Raster formats the solved image can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Uncompressed BMP.
    Bmp,
    /// Lossy JPEG. Blurs the single-pixel path edge.
    Jpeg,
    /// Lossless WebP.
    WebP,
}

impl OutputFormat {
    /// Every format, in preference order.
    pub const ALL: [Self; 4] = [Self::Png, Self::Bmp, Self::Jpeg, Self::WebP];

    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Guess the format from a path's extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Pick the format for writing `path`.
    ///
    /// An explicit choice wins. Otherwise the extension decides, and a
    /// path with no extension gets the default ([`OutputFormat::Png`]).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] if the extension names a
    /// format that cannot be written.
    pub fn for_output(path: &Path, explicit: Option<Self>) -> Result<Self, IoError> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        if path.extension().is_none() {
            return Ok(Self::default());
        }
        Self::from_path(path).ok_or_else(|| IoError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Read an image file into memory.
///
/// # Errors
///
/// Returns [`IoError::Read`] if the file cannot be read.
pub fn load(path: &Path) -> Result<Vec<u8>, IoError> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Encode a luma image in `format`.
///
/// # Errors
///
/// Returns [`IoError::Encode`] if the encoder rejects the image.
pub fn encode(image: &GrayImage, format: OutputFormat) -> Result<Vec<u8>, IoError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut Cursor::new(&mut buf), format.image_format())?;
    Ok(buf)
}

/// Encode `image` and write it to `path`.
///
/// # Errors
///
/// Returns [`IoError::Encode`] or [`IoError::Write`].
pub fn write_image(image: &GrayImage, path: &Path, format: OutputFormat) -> Result<(), IoError> {
    let bytes = encode(image, format)?;
    std::fs::write(path, &bytes).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "wrote {}x{} {format} ({} bytes) to {}",
        image.width(),
        image.height(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Write the painted solution, scaled back up by the solve factor, to
/// `path`.
///
/// # Errors
///
/// Returns [`IoError::Encode`] or [`IoError::Write`].
pub fn save(solved: &SolvedMaze, path: &Path, format: OutputFormat) -> Result<(), IoError> {
    write_image(&solved.rendered_full_size(), path, format)
}
