//! Terminal preview of grey-level images.
//!
//! Each character cell shows two vertically stacked pixels using the
//! upper half block: the foreground colours the top pixel and the
//! background colours the bottom one. Images wider than the requested
//! column count are shrunk with nearest-neighbour sampling first, which
//! keeps the palette's exact grey levels but drops whole pixel rows and
//! columns: in a preview narrower than the image, one-cell paths and
//! walls can disappear. Pass a wider `max_columns` (or solve with a larger
//! factor) to see every cell.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color as CtColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use image::imageops::{self, FilterType};
use mazesolve_pipeline::{CellState, GrayImage, Palette};

use crate::IoError;

/// Column count assumed when the terminal size cannot be queried.
pub const FALLBACK_COLUMNS: u32 = 80;

const HALF_BLOCK: char = '\u{2580}';

/// Width of the attached terminal in columns, or [`FALLBACK_COLUMNS`].
#[must_use]
pub fn terminal_columns() -> u32 {
    crossterm::terminal::size().map_or(FALLBACK_COLUMNS, |(cols, _)| u32::from(cols.max(1)))
}

const fn grey(value: u8) -> CtColor {
    CtColor::Rgb {
        r: value,
        g: value,
        b: value,
    }
}

/// Shrink `image` to at most `max_columns` wide, keeping its aspect ratio.
fn fit(image: &GrayImage, max_columns: u32) -> Option<GrayImage> {
    let max_columns = max_columns.max(1);
    if image.width() <= max_columns {
        return None;
    }
    let height = u64::from(image.height()) * u64::from(max_columns) / u64::from(image.width());
    let height = u32::try_from(height).unwrap_or(u32::MAX).max(1);
    Some(imageops::resize(image, max_columns, height, FilterType::Nearest))
}

/// Write `image` to `out` as coloured half blocks, at most `max_columns`
/// characters wide.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render<W: Write>(out: &mut W, image: &GrayImage, max_columns: u32) -> io::Result<()> {
    let fitted = fit(image, max_columns);
    let image = fitted.as_ref().unwrap_or(image);
    let (width, height) = image.dimensions();

    for top_row in (0..height).step_by(2) {
        let mut fg = None;
        let mut bg = None;
        for x in 0..width {
            let top = grey(image.get_pixel(x, top_row).0[0]);
            let bottom = if top_row + 1 < height {
                grey(image.get_pixel(x, top_row + 1).0[0])
            } else {
                CtColor::Reset
            };
            if fg != Some(top) {
                queue!(out, SetForegroundColor(top))?;
                fg = Some(top);
            }
            if bg != Some(bottom) {
                queue!(out, SetBackgroundColor(bottom))?;
                bg = Some(bottom);
            }
            queue!(out, Print(HALF_BLOCK))?;
        }
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

/// Write one swatch per cell state, showing how `palette` draws it.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render_legend<W: Write>(out: &mut W, palette: &Palette) -> io::Result<()> {
    for state in CellState::ALL {
        let value = palette.value(state);
        queue!(
            out,
            SetBackgroundColor(grey(value)),
            Print("  "),
            ResetColor,
            Print(format!(" {:<10} {value:>3}\n", state.label())),
        )?;
    }
    out.flush()
}

/// Preview `image` on stdout, at most `max_columns` characters wide.
///
/// # Errors
///
/// Returns [`IoError::Terminal`] if writing to stdout fails.
pub fn display(image: &GrayImage, max_columns: u32) -> Result<(), IoError> {
    let mut stdout = io::stdout().lock();
    render(&mut stdout, image, max_columns).map_err(IoError::Terminal)
}

/// Print the legend for `palette` on stdout.
///
/// # Errors
///
/// Returns [`IoError::Terminal`] if writing to stdout fails.
pub fn display_legend(palette: &Palette) -> Result<(), IoError> {
    let mut stdout = io::stdout().lock();
    render_legend(&mut stdout, palette).map_err(IoError::Terminal)
}
