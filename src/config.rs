//! Configuration types for glyph extraction.
//!
//! Everything that controls a run lives in [`ExtractionConfig`], built via
//! [`ExtractionConfigBuilder`]. The character set is part of the config
//! rather than a global table, so other scripts or layouts only need a
//! different [`CharacterSet`], not a rebuild.

use crate::charset::CharacterSet;
use crate::error::GlyphExtractorError;
use crate::pipeline::geometry::GridGeometry;
use crate::progress::ProgressCallback;
use std::fmt;

/// Margin used by the `extract` command and the printed template, in mm.
pub const SCAN_MARGIN_MM: f64 = 15.0;

/// Default background threshold.
pub const DEFAULT_THRESHOLD: u8 = 240;

/// Configuration for one extraction run.
///
/// # Example
/// ```rust
/// use glyph_extractor::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(600)
///     .margins_mm(15.0, 15.0)
///     .threshold(230)
///     .build()
///     .unwrap();
/// assert_eq!(config.geometry.cell_width_px(), 531);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Grid layout and scan resolution.
    pub geometry: GridGeometry,

    /// Background threshold (0–255). Default: 240.
    ///
    /// Pixels whose brightest channel reaches this value are paper. Lower it
    /// for grey-ish scans; raise it if faint strokes disappear.
    pub threshold: u8,

    /// Convert the paper background to transparency. Default: true.
    ///
    /// When false, glyphs keep the scanned background and are only trimmed.
    pub transparent: bool,

    /// Characters bound to successive cells, in scan order across pages.
    pub charset: CharacterSet,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            geometry: GridGeometry {
                margin_top_mm: SCAN_MARGIN_MM,
                margin_left_mm: SCAN_MARGIN_MM,
                ..GridGeometry::default()
            },
            threshold: DEFAULT_THRESHOLD,
            transparent: true,
            charset: CharacterSet::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("geometry", &self.geometry)
            .field("threshold", &self.threshold)
            .field("transparent", &self.transparent)
            .field("charset_len", &self.charset.len())
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl fmt::Debug for ExtractionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ExtractionConfigBuilder {
    pub fn geometry(mut self, geometry: GridGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.geometry.dpi = dpi;
        self
    }

    pub fn cell_size_mm(mut self, width: f64, height: f64) -> Self {
        self.config.geometry.cell_width_mm = width;
        self.config.geometry.cell_height_mm = height;
        self
    }

    pub fn grid(mut self, columns: u32, rows: u32) -> Self {
        self.config.geometry.columns = columns;
        self.config.geometry.rows = rows;
        self
    }

    pub fn margins_mm(mut self, top: f64, left: f64) -> Self {
        self.config.geometry.margin_top_mm = top;
        self.config.geometry.margin_left_mm = left;
        self
    }

    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn transparent(mut self, v: bool) -> Self {
        self.config.transparent = v;
        self
    }

    pub fn charset(mut self, charset: CharacterSet) -> Self {
        self.config.charset = charset;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, GlyphExtractorError> {
        self.config.geometry.validate()?;
        if self.config.charset.is_empty() {
            return Err(GlyphExtractorError::InvalidConfig(
                "character set is empty".into(),
            ));
        }
        Ok(self.config)
    }
}
