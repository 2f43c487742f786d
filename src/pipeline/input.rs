//! Input decoding: turn a scan file (or buffer) into a page raster.
//!
//! The format is sniffed from the file contents rather than trusted from the
//! extension: scanner software happily writes JPEG data into `.png` files.
//! Any failure here is fatal for the run, so each case gets its own error
//! variant with the path attached.

use crate::error::GlyphExtractorError;
use image::{DynamicImage, ImageReader};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode the page image at `path`.
pub fn load_page(path: &Path) -> Result<DynamicImage, GlyphExtractorError> {
    let reader = ImageReader::open(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => GlyphExtractorError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => GlyphExtractorError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let reader = reader
        .with_guessed_format()
        .map_err(|e| GlyphExtractorError::DecodeFailed {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?;

    let image = reader
        .decode()
        .map_err(|source| GlyphExtractorError::DecodeFailed {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        "Decoded {} → {}x{} px ({:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Decode a page image held in memory.
pub fn load_page_from_bytes(bytes: &[u8]) -> Result<DynamicImage, GlyphExtractorError> {
    image::load_from_memory(bytes).map_err(|source| GlyphExtractorError::DecodeFailed {
        path: PathBuf::from("<memory>"),
        source,
    })
}
