//! Run-level entry points: decode scans, cut glyphs, persist them.
//!
//! [`extract_to_dir`] is the usual API: it writes every glyph under
//! `<output>/glyphs/` and the manifest to `<output>/glyphs.json`.
//! [`extract_with_sink`] does the same work but hands glyphs to any
//! [`GlyphSink`] and leaves the manifest to the caller.

use crate::config::ExtractionConfig;
use crate::error::GlyphExtractorError;
use crate::output::{CellSize, ExtractionOutput, ExtractionStats, GlyphManifest, MANIFEST_FILENAME};
use crate::pipeline::input::load_page;
use crate::pipeline::page::{process_page, CellOptions, CharacterCursor};
use crate::sink::{DirectorySink, GlyphSink};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Subdirectory of the output directory that receives the PNGs.
pub const GLYPH_SUBDIR: &str = "glyphs";

/// Extract every glyph from `inputs` into `output_dir`.
///
/// Pages are processed in the order given, with one character cursor shared
/// across them. A page that cannot be decoded aborts the run; a glyph that
/// cannot be saved is recorded in [`ExtractionOutput::errors`] and skipped.
///
/// # Errors
/// - [`GlyphExtractorError::NoInput`] when `inputs` is empty
/// - [`GlyphExtractorError::OutputDirFailed`] when the glyph directory
///   cannot be created
/// - any decode error from [`load_page`]
/// - [`GlyphExtractorError::ManifestFailed`] when `glyphs.json` cannot be
///   written
///
/// # Example
/// ```rust,no_run
/// use glyph_extractor::{extract_to_dir, ExtractionConfig};
/// use std::path::{Path, PathBuf};
///
/// let pages = vec![PathBuf::from("scan1.jpg"), PathBuf::from("scan2.jpg")];
/// let out = extract_to_dir(&pages, Path::new("./output"), &ExtractionConfig::default())?;
/// println!("{} glyphs", out.manifest.len());
/// # Ok::<(), glyph_extractor::GlyphExtractorError>(())
/// ```
pub fn extract_to_dir<P: AsRef<Path>>(
    inputs: &[P],
    output_dir: &Path,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, GlyphExtractorError> {
    if inputs.is_empty() {
        return Err(GlyphExtractorError::NoInput);
    }

    let mut sink = DirectorySink::create(output_dir.join(GLYPH_SUBDIR))?;
    let output = extract_with_sink(inputs, config, &mut sink)?;

    let manifest_path = output_dir.join(MANIFEST_FILENAME);
    output.manifest.write_to(&manifest_path)?;
    info!(
        "Wrote manifest with {} glyphs to {}",
        output.manifest.len(),
        manifest_path.display()
    );

    Ok(output)
}

/// Extract glyphs from `inputs` and hand each one to `sink`.
///
/// The returned manifest lists every glyph the sink accepted, keyed by
/// character, with the filename the sink reported.
pub fn extract_with_sink<P: AsRef<Path>>(
    inputs: &[P],
    config: &ExtractionConfig,
    sink: &mut dyn GlyphSink,
) -> Result<ExtractionOutput, GlyphExtractorError> {
    let start = Instant::now();
    if inputs.is_empty() {
        return Err(GlyphExtractorError::NoInput);
    }
    config.geometry.validate()?;

    let geometry = &config.geometry;
    let options = CellOptions {
        threshold: config.threshold,
        transparent: config.transparent,
    };
    let total_pages = inputs.len();
    let expected = (total_pages * geometry.cells_per_page()).min(config.charset.len());

    info!(
        "Extracting from {} page(s): {} characters, {}x{} grid, {} DPI",
        total_pages,
        config.charset.len(),
        geometry.columns,
        geometry.rows,
        geometry.dpi
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(expected);
    }

    let mut manifest = GlyphManifest::new(CellSize {
        width: geometry.cell_width_mm,
        height: geometry.cell_height_mm,
    });
    let mut errors = Vec::new();
    let mut stats = ExtractionStats::default();
    let mut cursor = CharacterCursor::new(&config.charset);

    for (page_index, input) in inputs.iter().enumerate() {
        let path = input.as_ref();
        if cursor.is_exhausted() {
            warn!(
                "Character set exhausted; skipping {} remaining page(s) starting at {}",
                total_pages - page_index,
                path.display()
            );
            break;
        }

        info!("Processing page {}/{}: {}", page_index + 1, total_pages, path.display());
        let page = load_page(path)?;
        info!("Image size: {}x{}", page.width(), page.height());
        info!(
            "Cell size: {}x{} px, margins {}x{} px",
            geometry.cell_width_px(),
            geometry.cell_height_px(),
            geometry.margin_left_px(),
            geometry.margin_top_px()
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_index + 1, total_pages);
        }

        let before = cursor.position();
        let glyphs = process_page(&page, page_index, geometry, options, &mut cursor);
        stats.pages_processed += 1;
        stats.cells_visited += cursor.position() - before;

        for glyph in &glyphs {
            match sink.accept(glyph) {
                Ok(filename) => {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_glyph_complete(glyph.character, &filename);
                    }
                    manifest.insert(glyph.character, filename);
                    stats.glyphs_saved += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_glyph_error(glyph.character, &e.to_string());
                    }
                    errors.push(e);
                    stats.glyphs_failed += 1;
                }
            }
        }
        debug!(
            "Page {} done: {} glyphs, cursor at {}",
            page_index + 1,
            glyphs.len(),
            cursor.position()
        );
    }

    stats.unassigned_characters = cursor.remaining();
    if stats.unassigned_characters > 0 {
        warn!(
            "{} character(s) had no cell; add more pages to cover them",
            stats.unassigned_characters
        );
    }
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Extraction complete: {} saved, {} failed, {}ms",
        stats.glyphs_saved, stats.glyphs_failed, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(stats.glyphs_saved, stats.glyphs_failed);
    }

    Ok(ExtractionOutput {
        manifest,
        errors,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::CharacterSet;
    use crate::error::GlyphError;
    use crate::pipeline::geometry::GridGeometry;
    use crate::pipeline::page::GlyphResult;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::path::PathBuf;

    fn small_config(chars: &str) -> ExtractionConfig {
        ExtractionConfig::builder()
            .geometry(GridGeometry {
                cell_width_mm: 25.4,
                cell_height_mm: 25.4,
                columns: 4,
                rows: 2,
                dpi: 10,
                margin_top_mm: 0.0,
                margin_left_mm: 0.0,
            })
            .charset(CharacterSet::parse(chars))
            .build()
            .expect("valid config")
    }

    fn write_page(dir: &Path, name: &str) -> PathBuf {
        let mut img = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        for cy in 0..2 {
            for cx in 0..4 {
                img.put_pixel(cx * 10 + 5, cy * 10 + 5, Rgb([0, 0, 0]));
            }
        }
        let path = dir.join(name);
        DynamicImage::ImageRgb8(img).save(&path).expect("save page");
        path
    }

    /// Keeps filenames in memory and fails on one chosen character.
    struct MemorySink {
        fail_on: char,
        seen: Vec<char>,
    }

    impl GlyphSink for MemorySink {
        fn accept(&mut self, glyph: &GlyphResult) -> Result<String, GlyphError> {
            self.seen.push(glyph.character);
            if glyph.character == self.fail_on {
                return Err(GlyphError::EncodeFailed {
                    character: glyph.character,
                    detail: "refused".into(),
                });
            }
            Ok(format!("{}.mem", glyph.character))
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let none: Vec<PathBuf> = Vec::new();
        let err = extract_to_dir(&none, dir.path(), &small_config("ab")).unwrap_err();
        assert!(matches!(err, GlyphExtractorError::NoInput));
    }

    #[test]
    fn sink_failure_keeps_cursor_moving() {
        let dir = tempfile::tempdir().expect("tempdir");
        let page = write_page(dir.path(), "p1.png");
        let mut sink = MemorySink {
            fail_on: 'c',
            seen: Vec::new(),
        };
        let out = extract_with_sink(&[page], &small_config("abcdefgh"), &mut sink).expect("run");
        assert_eq!(sink.seen, "abcdefgh".chars().collect::<Vec<_>>());
        assert_eq!(out.stats.glyphs_saved, 7);
        assert_eq!(out.stats.glyphs_failed, 1);
        assert_eq!(out.errors[0].character(), 'c');
        assert_eq!(out.manifest.glyphs.get("d").map(String::as_str), Some("d.mem"));
        assert!(!out.manifest.glyphs.contains_key("c"));
    }

    #[test]
    fn pages_after_exhaustion_are_not_decoded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let page = write_page(dir.path(), "p1.png");
        // The second "page" is not an image at all; it must never be opened.
        let bogus = dir.path().join("p2.png");
        std::fs::write(&bogus, b"not an image").expect("write");
        let mut sink = MemorySink {
            fail_on: '\0',
            seen: Vec::new(),
        };
        let out = extract_with_sink(&[page, bogus], &small_config("abcdefgh"), &mut sink)
            .expect("run");
        assert_eq!(out.stats.pages_processed, 1);
        assert_eq!(out.manifest.len(), 8);
    }

    #[test]
    fn unreadable_page_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let page = write_page(dir.path(), "p1.png");
        let missing = dir.path().join("missing.jpg");
        let err = extract_to_dir(&[page, missing], dir.path(), &small_config("abcdefghijkl"))
            .unwrap_err();
        assert!(matches!(err, GlyphExtractorError::FileNotFound { .. }));
    }

    #[test]
    fn unassigned_characters_are_counted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let page = write_page(dir.path(), "p1.png");
        let out = extract_to_dir(&[page], dir.path(), &small_config("abcdefghijk")).expect("run");
        assert_eq!(out.stats.cells_visited, 8);
        assert_eq!(out.stats.unassigned_characters, 3);
        assert!(dir.path().join("glyphs/h.png").exists());
        assert!(!dir.path().join("glyphs/i.png").exists());
        assert!(dir.path().join(MANIFEST_FILENAME).exists());
    }
}
