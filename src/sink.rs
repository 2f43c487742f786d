//! Glyph sinks: where finished glyphs go.
//!
//! The pipeline only produces [`GlyphResult`]s; naming and persisting them is
//! the sink's job. [`DirectorySink`] writes one PNG per glyph using the
//! filename table in [`crate::charset`].

use crate::charset::char_to_filename;
use crate::error::{GlyphError, GlyphExtractorError};
use crate::pipeline::page::GlyphResult;
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives finished glyphs one at a time.
pub trait GlyphSink {
    /// Persist `glyph` and return the filename it was stored under.
    ///
    /// An error here is non-fatal: the caller records it and continues.
    fn accept(&mut self, glyph: &GlyphResult) -> Result<String, GlyphError>;
}

/// Writes `<name>.png` files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the directory (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, GlyphExtractorError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| GlyphExtractorError::OutputDirFailed {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename used for `character`, e.g. `slash.png`.
    pub fn filename_for(character: char) -> String {
        format!("{}.png", char_to_filename(character))
    }
}

impl GlyphSink for DirectorySink {
    fn accept(&mut self, glyph: &GlyphResult) -> Result<String, GlyphError> {
        let filename = Self::filename_for(glyph.character);
        let path = self.dir.join(&filename);

        let mut buf = Vec::new();
        glyph
            .image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| GlyphError::EncodeFailed {
                character: glyph.character,
                detail: e.to_string(),
            })?;

        std::fs::write(&path, &buf).map_err(|e| GlyphError::SaveFailed {
            character: glyph.character,
            path: path.clone(),
            detail: e.to_string(),
        })?;

        debug!("Saved '{}' → {} ({} bytes)", glyph.character, path.display(), buf.len());
        Ok(filename)
    }
}
