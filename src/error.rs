//! Error types for the glyph-extractor library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GlyphExtractorError`] — **Fatal**: the run cannot proceed at all
//!   (a scan cannot be decoded, the output directory cannot be created, the
//!   configuration is invalid). Returned as `Err(GlyphExtractorError)` from
//!   the top-level `extract*`, `generate_template` and `rename_glyphs`
//!   functions.
//!
//! * [`GlyphError`] — **Non-fatal**: a single glyph could not be persisted
//!   but the cursor keeps moving, so every later glyph is still bound to the
//!   right character. Stored in [`crate::output::ExtractionOutput::errors`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the glyph-extractor library.
#[derive(Debug, Error)]
pub enum GlyphExtractorError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input scan was not found at the given path.
    #[error("Scan not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not a supported or intact image.
    #[error("Failed to decode page image '{path}': {source}")]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// No input pages were supplied.
    #[error("No input pages given")]
    NoInput,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not serialise, write or read back `glyphs.json`.
    #[error("Manifest '{path}' failed: {detail}")]
    ManifestFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or geometry validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A custom character set file could not be read.
    #[error("Failed to load character set from '{path}': {source}")]
    CharsetLoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Template errors ───────────────────────────────────────────────────
    /// pdfium returned an error while drawing or saving the template.
    #[error("Template rendering failed: {0}")]
    TemplateFailed(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Template rendering needs the pdfium shared library.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Or install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Rename errors ─────────────────────────────────────────────────────
    /// The glyph directory could not be listed.
    #[error("Failed to read glyph directory '{path}': {source}")]
    RenameFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal error for a single glyph.
///
/// The pipeline logs it, records it, and moves on to the next cell.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GlyphError {
    /// PNG encoding of the glyph failed.
    #[error("Glyph '{character}': PNG encoding failed: {detail}")]
    EncodeFailed { character: char, detail: String },

    /// Writing the glyph file failed.
    #[error("Glyph '{character}': failed to save '{path}': {detail}")]
    SaveFailed {
        character: char,
        path: PathBuf,
        detail: String,
    },
}

impl GlyphError {
    /// The character whose glyph failed.
    pub fn character(&self) -> char {
        match self {
            GlyphError::EncodeFailed { character, .. } => *character,
            GlyphError::SaveFailed { character, .. } => *character,
        }
    }
}
