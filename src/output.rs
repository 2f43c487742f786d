//! Output types: the `glyphs.json` manifest and run statistics.

use crate::error::{GlyphError, GlyphExtractorError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Manifest format version written to `glyphs.json`.
pub const MANIFEST_VERSION: u32 = 1;

/// Manifest filename inside the output directory.
pub const MANIFEST_FILENAME: &str = "glyphs.json";

/// Nominal cell size in millimetres, as printed on the template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

/// The `glyphs.json` document: character → glyph filename.
///
/// ```json
/// {
///   "version": 1,
///   "cellSize": { "width": 22.5, "height": 26.2 },
///   "glyphs": { ".": "dot.png", "A": "A.png" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphManifest {
    pub version: u32,
    pub cell_size: CellSize,
    /// Sorted by character so the file diffs cleanly between runs.
    pub glyphs: BTreeMap<String, String>,
}

impl GlyphManifest {
    pub fn new(cell_size: CellSize) -> Self {
        Self {
            version: MANIFEST_VERSION,
            cell_size,
            glyphs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, character: char, filename: impl Into<String>) {
        self.glyphs.insert(character.to_string(), filename.into());
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the manifest atomically: temp file next to it, then rename.
    pub fn write_to(&self, path: &Path) -> Result<(), GlyphExtractorError> {
        let fail = |detail: String| GlyphExtractorError::ManifestFailed {
            path: path.to_path_buf(),
            detail,
        };

        let json = self.to_json().map_err(|e| fail(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|e| fail(e.to_string()))?;
        std::fs::rename(&tmp_path, path).map_err(|e| fail(e.to_string()))?;
        Ok(())
    }

    /// Read a manifest written by an earlier run.
    pub fn read_from(path: &Path) -> Result<Self, GlyphExtractorError> {
        let fail = |detail: String| GlyphExtractorError::ManifestFailed {
            path: path.to_path_buf(),
            detail,
        };
        let text = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| fail(e.to_string()))
    }
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages decoded and processed.
    pub pages_processed: usize,
    /// Cells visited (each consumed one character).
    pub cells_visited: usize,
    pub glyphs_saved: usize,
    pub glyphs_failed: usize,
    /// Characters left without a cell.
    pub unassigned_characters: usize,
    pub total_duration_ms: u64,
}

/// Result of [`crate::extract_to_dir`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub manifest: GlyphManifest,
    /// Per-glyph failures; the run continued past each of them.
    pub errors: Vec<GlyphError>,
    pub stats: ExtractionStats,
}
