//! Background removal: white paper → transparent, with anti-aliased edges.
//!
//! Every pixel is classified by its lightness (the brightest of its three
//! channels) into one of three zones:
//!
//! ```text
//! 0 ────────── ink_opaque ──────────── threshold ────────── 255
//! │  opaque ink  │   linear alpha ramp   │   transparent     │
//! ```

use super::crop::for_each_rgb8;
use super::trim::ink_opaque;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Which part of the lightness scale a pixel falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelZone {
    /// At or above the background threshold.
    Transparent,
    /// At or below the ink cut-off.
    Opaque,
    /// Strictly between the two; carries the interpolated alpha.
    Edge(u8),
}

impl PixelZone {
    pub fn alpha(self) -> u8 {
        match self {
            PixelZone::Transparent => 0,
            PixelZone::Opaque => 255,
            PixelZone::Edge(alpha) => alpha,
        }
    }
}

/// Classify one lightness value against `threshold`.
///
/// Zones are tested in priority order: transparent, opaque, edge. In the
/// edge band `alpha = 255 * (threshold - lightness) / (threshold - ink_opaque)`
/// with integer division.
pub fn classify_lightness(lightness: u8, threshold: u8) -> PixelZone {
    let ink = ink_opaque(threshold);

    if lightness >= threshold {
        return PixelZone::Transparent;
    }
    if lightness <= ink {
        return PixelZone::Opaque;
    }

    // ink < lightness < threshold, so span >= 2.
    let span = (threshold - ink) as u32;
    let alpha = 255 * (threshold - lightness) as u32 / span;
    PixelZone::Edge(alpha as u8)
}

/// Convert `raster` to RGBA with the paper background made transparent.
///
/// Transparent pixels are reset to `(0, 0, 0, 0)`; opaque and edge pixels
/// keep their colour. The output has the same dimensions as the input and
/// always carries an alpha channel.
pub fn make_transparent(raster: &DynamicImage, threshold: u8) -> DynamicImage {
    let (width, height) = raster.dimensions();
    let mut out = RgbaImage::new(width, height);

    for_each_rgb8(raster, |x, y, [r, g, b]| {
        let lightness = r.max(g).max(b);
        let converted = match classify_lightness(lightness, threshold) {
            PixelZone::Transparent => Rgba([0, 0, 0, 0]),
            zone => Rgba([r, g, b, zone.alpha()]),
        };
        out.put_pixel(x, y, converted);
    });

    DynamicImage::ImageRgba8(out)
}
