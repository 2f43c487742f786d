//! Content trimming: crop a cell down to its handwriting.
//!
//! Ink detection uses a stricter cut-off than the transparency stage
//! ([`ink_opaque`], three quarters of the background threshold). Scanned
//! JPEGs carry light ringing around every stroke; with the plain threshold
//! those artefacts would stretch the bounding box to the cell borders.

use super::crop::{extract_region, for_each_rgb8};
use super::geometry::Rect;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Pixels kept around the ink bounding box on every side.
pub const TRIM_PADDING: u32 = 2;

/// Brightness at or below which a pixel is treated as solid ink.
///
/// `floor(threshold * 3 / 4)`, shared by trimming and transparency.
pub fn ink_opaque(threshold: u8) -> u8 {
    (threshold as u32 * 3 / 4).min(255) as u8
}

/// A trimmed cell plus the rectangle it was cut from.
#[derive(Debug, Clone)]
pub struct TrimmedCell {
    /// The cropped raster.
    pub image: DynamicImage,
    /// Bounds actually used, in cell-local coordinates. Equals the full
    /// cell when no ink was found.
    pub bounds: Rect,
}

/// Find the tight bounding box of ink pixels, or `None` for a blank cell.
///
/// The returned rectangle is inclusive of the last ink pixel on each axis
/// (`max_x`/`max_y` point *at* it, not past it).
fn ink_extent(cell: &DynamicImage, ink: u8) -> Option<Rect> {
    let mut extent: Option<Rect> = None;

    for_each_rgb8(cell, |x, y, [r, g, b]| {
        if r < ink && g < ink && b < ink {
            let e = extent.get_or_insert(Rect {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            });
            e.min_x = e.min_x.min(x);
            e.min_y = e.min_y.min(y);
            e.max_x = e.max_x.max(x);
            e.max_y = e.max_y.max(y);
        }
    });

    extent
}

/// Crop `cell` to the bounding box of its ink plus [`TRIM_PADDING`].
///
/// A cell without ink is returned unchanged together with its full bounds.
/// Padding is applied before clamping: the minimum edges are pulled out and
/// clamped at zero first, then the exclusive maximum edges (last ink pixel
/// + padding + 1) are clamped to the cell size.
pub fn trim_to_content(cell: &DynamicImage, threshold: u8) -> TrimmedCell {
    let (width, height) = cell.dimensions();
    let full = Rect::from_size(width, height);

    let Some(extent) = ink_extent(cell, ink_opaque(threshold)) else {
        return TrimmedCell {
            image: cell.clone(),
            bounds: full,
        };
    };

    let min_x = extent.min_x.saturating_sub(TRIM_PADDING);
    let min_y = extent.min_y.saturating_sub(TRIM_PADDING);
    let max_x = (extent.max_x + TRIM_PADDING + 1).min(width);
    let max_y = (extent.max_y + TRIM_PADDING + 1).min(height);

    let bounds = Rect::new(min_x, min_y, max_x, max_y);
    debug!(
        "Trimmed {}x{} cell to {}x{} at ({}, {})",
        width,
        height,
        bounds.width(),
        bounds.height(),
        bounds.min_x,
        bounds.min_y
    );

    TrimmedCell {
        image: extract_region(cell, bounds),
        bounds,
    }
}
