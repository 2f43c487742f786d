//! # glyph-extractor
//!
//! Cut scanned handwriting grids into one transparent PNG per character,
//! plus a `glyphs.json` manifest mapping characters to files.
//!
//! A printed template (see [`template`]) holds a fixed grid of cells, one
//! handwritten character per cell. After scanning, each cell is cropped,
//! trimmed to its ink and its paper background turned transparent. Which
//! character a cell holds is purely positional: cells are read row by row,
//! pages in the order given, against a [`CharacterSet`].
//!
//! ## Pipeline Overview
//!
//! ```text
//! scan (PNG/JPEG)
//!  │
//!  ├─ 1. Input         decode the page raster
//!  ├─ 2. Geometry      mm layout + DPI → cell rectangles in pixels
//!  ├─ 3. Crop          copy one cell out of the page
//!  ├─ 4. Trim          shrink to the ink bounding box, 2 px padding
//!  ├─ 5. Transparency  paper → alpha 0, ink → alpha 255, ramp between
//!  └─ 6. Sink          <output>/glyphs/<name>.png + <output>/glyphs.json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glyph_extractor::{extract_to_dir, ExtractionConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().dpi(300).threshold(240).build()?;
//!     let output = extract_to_dir(&["scan1.jpg", "scan2.jpg"], Path::new("./output"), &config)?;
//!     eprintln!(
//!         "{} glyphs saved, {} failed",
//!         output.stats.glyphs_saved, output.stats.glyphs_failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `glyph-extractor` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! glyph-extractor = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Only [`generate_template`] needs pdfium. It binds at runtime to the library
//! named by `PDFIUM_LIB_PATH`, or to the system copy. Extraction and renaming
//! never touch it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod charset;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod rename;
pub mod sink;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use charset::{char_to_filename, filename_to_char, CharacterSet};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{GlyphError, GlyphExtractorError};
pub use extract::{extract_to_dir, extract_with_sink};
pub use output::{CellSize, ExtractionOutput, ExtractionStats, GlyphManifest};
pub use pipeline::geometry::{GridGeometry, Rect};
pub use pipeline::page::{extract_glyphs, CellOptions, CharacterCursor, GlyphResult};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use rename::{rename_glyphs, RenameReport};
pub use sink::{DirectorySink, GlyphSink};
pub use template::{generate_template, TemplateConfig};
