//! Progress-callback trait for per-glyph extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the grid. The library never prints; the CLI
//! turns these events into a progress bar.
//!
//! # Example
//!
//! ```rust
//! use glyph_extractor::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl ExtractionProgressCallback for Counter {
//!     fn on_glyph_complete(&self, character: char, filename: &str) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{character} → {filename}");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction pipeline as it processes pages and glyphs.
///
/// All methods default to no-ops so implementors only override what they
/// need. `Send + Sync` so a callback can be shared with a UI thread.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before the first page is decoded.
    ///
    /// * `total_glyphs` — glyphs the run will try to produce
    ///   (`min(pages × cells_per_page, charset length)`)
    fn on_run_start(&self, total_glyphs: usize) {
        let _ = total_glyphs;
    }

    /// Called after a page has been decoded, before its cells are cut.
    ///
    /// * `page_num` — 1-indexed page number
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a glyph has been persisted.
    fn on_glyph_complete(&self, character: char, filename: &str) {
        let _ = (character, filename);
    }

    /// Called when a glyph could not be persisted. The run continues.
    fn on_glyph_error(&self, character: char, error: &str) {
        let _ = (character, error);
    }

    /// Called once after the last glyph.
    fn on_run_complete(&self, saved: usize, failed: usize) {
        let _ = (saved, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
