//! Printable template PDF: the grid people write their characters into.
//!
//! Layout is computed in millimetres with a top-left origin ([`layout_pages`])
//! and only then drawn with pdfium, whose origin is bottom-left. Keeping the
//! two apart lets the layout be tested without a pdfium library.
//!
//! The grid uses the same [`GridGeometry`] as extraction, so a template
//! printed at 100 % and scanned at `geometry.dpi` lines up with the crops.

use crate::charset::CharacterSet;
use crate::config::SCAN_MARGIN_MM;
use crate::error::GlyphExtractorError;
use crate::pipeline::geometry::GridGeometry;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A4 portrait height; pdfium y coordinates are measured up from here.
const PAGE_HEIGHT_MM: f64 = 297.0;

const TITLE_FONT_SIZE: f32 = 12.0;
const TITLE_BASELINE_MM: f64 = 11.0;
const FOOTER_FONT_SIZE: f32 = 8.0;
const FOOTER_BASELINE_MM: f64 = 286.0;
/// Label inset from the cell's top-left corner.
const LABEL_INSET_MM: f64 = 1.0;

const BORDER_WIDTH_MM: f32 = 0.3;
const BASELINE_WIDTH_MM: f32 = 0.2;
/// Baseline guide position as a fraction of the cell height.
pub const BASELINE_RATIO: f64 = 0.75;
pub const DASH_MM: f64 = 2.0;
pub const GAP_MM: f64 = 1.0;

const POINTS_TO_MM: f64 = 25.4 / 72.0;

/// Page titles used by the default two-page Czech layout.
pub const DEFAULT_TITLES: [&str; 2] = [
    "Strana 1 - Velká písmena, čísla, interpunkce",
    "Strana 2 - Malá písmena, speciální znaky",
];

/// Settings for [`generate_template`].
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Grid layout. `dpi` is irrelevant here; only millimetres are used.
    pub geometry: GridGeometry,
    /// TrueType font for all text. Without one the built-in Helvetica is
    /// used, which cannot draw most Czech diacritics.
    pub font_path: Option<PathBuf>,
    /// Cell label size in points. Default: 8.
    pub font_size: f32,
    /// One title per page; pages past the end get `Strana N`.
    pub titles: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            geometry: GridGeometry {
                margin_top_mm: SCAN_MARGIN_MM,
                margin_left_mm: SCAN_MARGIN_MM,
                ..GridGeometry::default()
            },
            font_path: None,
            font_size: 8.0,
            titles: DEFAULT_TITLES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TemplateConfig {
    fn title(&self, page_index: usize) -> String {
        self.titles
            .get(page_index)
            .cloned()
            .unwrap_or_else(|| format!("Strana {}", page_index + 1))
    }
}

/// One cell outline with the label printed in its corner.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMark {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    /// `None` for cells past the end of the character set.
    pub label: Option<String>,
}

/// One dash of a baseline guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashSegment {
    pub x1_mm: f64,
    pub x2_mm: f64,
    pub y_mm: f64,
}

/// Everything drawn on one template page, top-left origin, millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub title: String,
    pub cells: Vec<CellMark>,
    pub baselines: Vec<DashSegment>,
    pub footer: String,
}

/// Printable label for a character. Whitespace gets a short mnemonic.
pub fn label_for(c: char) -> String {
    match c {
        ' ' => "SP".to_string(),
        '\t' => "TAB".to_string(),
        '\n' => "NL".to_string(),
        other => other.to_string(),
    }
}

/// Split the horizontal line `x1..x2` at height `y` into dashes.
///
/// The last dash is clipped to `x2`.
pub fn dash_segments(x1: f64, x2: f64, y: f64, dash: f64, gap: f64) -> Vec<DashSegment> {
    let mut segments = Vec::new();
    if dash <= 0.0 || gap < 0.0 {
        return segments;
    }
    let mut x = x1;
    while x < x2 {
        segments.push(DashSegment {
            x1_mm: x,
            x2_mm: (x + dash).min(x2),
            y_mm: y,
        });
        x += dash + gap;
    }
    segments
}

fn footer_text(geometry: &GridGeometry) -> String {
    format!(
        "Políčko: {:.1} × {:.1} mm | Mřížka: {} × {} | Modrá čára = účaří",
        geometry.cell_width_mm, geometry.cell_height_mm, geometry.columns, geometry.rows
    )
}

/// Compute the drawing for every page needed by `charset`.
pub fn layout_pages(config: &TemplateConfig, charset: &CharacterSet) -> Vec<PageLayout> {
    let g = &config.geometry;
    let per_page = g.cells_per_page();
    let grid_right = g.margin_left_mm + g.columns as f64 * g.cell_width_mm;

    (0..charset.page_count(per_page))
        .map(|page_index| {
            let mut labels = charset.page(page_index, per_page).iter().copied();

            let mut cells = Vec::with_capacity(per_page);
            for row in 0..g.rows {
                for col in 0..g.columns {
                    cells.push(CellMark {
                        x_mm: g.margin_left_mm + col as f64 * g.cell_width_mm,
                        y_mm: g.margin_top_mm + row as f64 * g.cell_height_mm,
                        width_mm: g.cell_width_mm,
                        height_mm: g.cell_height_mm,
                        label: labels.next().map(label_for),
                    });
                }
            }

            let baselines = (0..g.rows)
                .flat_map(|row| {
                    let y = g.margin_top_mm
                        + row as f64 * g.cell_height_mm
                        + g.cell_height_mm * BASELINE_RATIO;
                    dash_segments(g.margin_left_mm, grid_right, y, DASH_MM, GAP_MM)
                })
                .collect();

            PageLayout {
                title: config.title(page_index),
                cells,
                baselines,
                footer: footer_text(g),
            }
        })
        .collect()
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` if set, otherwise the system library.
pub fn bind_pdfium() -> Result<Pdfium, GlyphExtractorError> {
    let bindings = match std::env::var_os("PDFIUM_LIB_PATH") {
        Some(path) => {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={:?}", path);
            Pdfium::bind_to_library(PathBuf::from(path))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| GlyphExtractorError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Render the template for `charset` to `output`.
///
/// Writes atomically (temp file + rename), so a failed render never leaves
/// a truncated PDF behind. Returns the number of pages written.
pub fn generate_template(
    output: &Path,
    config: &TemplateConfig,
    charset: &CharacterSet,
) -> Result<usize, GlyphExtractorError> {
    config.geometry.validate()?;
    if charset.is_empty() {
        return Err(GlyphExtractorError::InvalidConfig(
            "character set is empty".into(),
        ));
    }

    let pages = layout_pages(config, charset);
    let pdfium = bind_pdfium()?;
    let bytes = render_pdf(&pdfium, &pages, config)?;

    let tmp_path = output.with_extension("pdf.tmp");
    let write_failed = |e: std::io::Error| {
        GlyphExtractorError::TemplateFailed(format!("writing '{}': {}", output.display(), e))
    };
    std::fs::write(&tmp_path, &bytes).map_err(write_failed)?;
    std::fs::rename(&tmp_path, output).map_err(write_failed)?;

    info!(
        "Template written to {} ({} pages, {} bytes)",
        output.display(),
        pages.len(),
        bytes.len()
    );
    Ok(pages.len())
}

fn pdf_err(context: &str) -> impl Fn(PdfiumError) -> GlyphExtractorError + '_ {
    move |e| GlyphExtractorError::TemplateFailed(format!("{}: {:?}", context, e))
}

fn mm(value: f64) -> PdfPoints {
    PdfPoints::from_mm(value as f32)
}

/// Distance from the bottom edge, for a top-left `y_mm`.
fn flip(y_mm: f64) -> PdfPoints {
    mm(PAGE_HEIGHT_MM - y_mm)
}

struct Fonts {
    regular: PdfFontToken,
    bold: PdfFontToken,
    italic: PdfFontToken,
}

fn load_fonts(document: &mut PdfDocument<'_>, config: &TemplateConfig) -> Result<Fonts, GlyphExtractorError> {
    match config.font_path {
        Some(ref path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                GlyphExtractorError::TemplateFailed(format!(
                    "reading font '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            let token = document
                .fonts_mut()
                .load_true_type_from_bytes(&bytes, true)
                .map_err(pdf_err("loading font"))?;
            debug!("Loaded font {}", path.display());
            // A single TTF serves every style, like the printed originals.
            Ok(Fonts {
                regular: token,
                bold: token,
                italic: token,
            })
        }
        None => {
            let fonts = document.fonts_mut();
            Ok(Fonts {
                regular: fonts.helvetica(),
                bold: fonts.helvetica_bold(),
                italic: fonts.helvetica_oblique(),
            })
        }
    }
}

fn render_pdf(
    pdfium: &Pdfium,
    pages: &[PageLayout],
    config: &TemplateConfig,
) -> Result<Vec<u8>, GlyphExtractorError> {
    let mut document = pdfium
        .create_new_pdf()
        .map_err(pdf_err("creating document"))?;
    let fonts = load_fonts(&mut document, config)?;

    let border = PdfColor::new(180, 180, 180, 255);
    let label_color = PdfColor::new(150, 150, 150, 255);
    let baseline = PdfColor::new(200, 200, 255, 255);
    let footer_color = PdfColor::new(128, 128, 128, 255);
    let black = PdfColor::new(0, 0, 0, 255);

    let label_size = PdfPoints::new(config.font_size);
    let label_drop = LABEL_INSET_MM + config.font_size as f64 * POINTS_TO_MM;

    for (page_index, layout) in pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(pdf_err("adding page"))?;
        let objects = page.objects_mut();

        let mut title = objects
            .create_text_object(
                mm(config.geometry.margin_left_mm),
                flip(TITLE_BASELINE_MM),
                &layout.title,
                fonts.bold,
                PdfPoints::new(TITLE_FONT_SIZE),
            )
            .map_err(pdf_err("drawing title"))?;
        title.set_fill_color(black).map_err(pdf_err("colouring title"))?;

        for cell in &layout.cells {
            let rect = PdfRect::new(
                flip(cell.y_mm + cell.height_mm),
                mm(cell.x_mm),
                flip(cell.y_mm),
                mm(cell.x_mm + cell.width_mm),
            );
            objects
                .create_path_object_rect(
                    rect,
                    Some(border),
                    Some(PdfPoints::from_mm(BORDER_WIDTH_MM)),
                    None,
                )
                .map_err(pdf_err("drawing cell"))?;

            if let Some(ref label) = cell.label {
                let mut text = objects
                    .create_text_object(
                        mm(cell.x_mm + LABEL_INSET_MM),
                        flip(cell.y_mm + label_drop),
                        label,
                        fonts.regular,
                        label_size,
                    )
                    .map_err(pdf_err("drawing label"))?;
                text.set_fill_color(label_color)
                    .map_err(pdf_err("colouring label"))?;
            }
        }

        for dash in &layout.baselines {
            objects
                .create_path_object_line(
                    mm(dash.x1_mm),
                    flip(dash.y_mm),
                    mm(dash.x2_mm),
                    flip(dash.y_mm),
                    baseline,
                    PdfPoints::from_mm(BASELINE_WIDTH_MM),
                )
                .map_err(pdf_err("drawing baseline"))?;
        }

        let mut footer = objects
            .create_text_object(
                mm(config.geometry.margin_left_mm),
                flip(FOOTER_BASELINE_MM),
                &layout.footer,
                fonts.italic,
                PdfPoints::new(FOOTER_FONT_SIZE),
            )
            .map_err(pdf_err("drawing footer"))?;
        footer
            .set_fill_color(footer_color)
            .map_err(pdf_err("colouring footer"))?;

        debug!(
            "Template page {}: {} cells, {} baseline dashes",
            page_index + 1,
            layout.cells.len(),
            layout.baselines.len()
        );
    }

    document.save_to_bytes().map_err(pdf_err("saving document"))
}
