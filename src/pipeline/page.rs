//! Per-page orchestration: walk the grid and bind cells to characters.
//!
//! A single [`CharacterCursor`] is threaded through every page. It advances
//! by exactly one per visited cell, blank or not, so a skipped or unreadable
//! cell never shifts later glyphs onto the wrong character.

use super::crop::extract_cell;
use super::geometry::{GridGeometry, Rect};
use super::transparency::make_transparent;
use super::trim::trim_to_content;
use crate::charset::CharacterSet;
use image::DynamicImage;
use tracing::{debug, warn};

/// Position in the character set shared across all pages of a run.
#[derive(Debug, Clone)]
pub struct CharacterCursor<'a> {
    charset: &'a CharacterSet,
    position: usize,
}

impl<'a> CharacterCursor<'a> {
    pub fn new(charset: &'a CharacterSet) -> Self {
        Self {
            charset,
            position: 0,
        }
    }

    /// Start at `position`, e.g. the first index of a page's range.
    pub fn starting_at(charset: &'a CharacterSet, position: usize) -> Self {
        Self {
            charset,
            position: position.min(charset.len()),
        }
    }

    /// Take the current character and advance, or `None` once exhausted.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.charset.get(self.position)?;
        self.position += 1;
        Some(c)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.charset.len()
    }

    pub fn remaining(&self) -> usize {
        self.charset.len().saturating_sub(self.position)
    }
}

/// Per-cell processing switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOptions {
    pub threshold: u8,
    pub transparent: bool,
}

/// One glyph cut from the grid, bound to its character.
#[derive(Debug, Clone)]
pub struct GlyphResult {
    pub character: char,
    /// 0-indexed page the glyph came from.
    pub page_index: usize,
    pub row: u32,
    pub col: u32,
    /// Final raster (RGBA when transparency is on).
    pub image: DynamicImage,
    /// Trim rectangle in cell-local coordinates.
    pub trim_bounds: Rect,
}

/// Extract, trim and optionally clean one cell.
pub fn process_cell(
    page: &DynamicImage,
    geometry: &GridGeometry,
    row: u32,
    col: u32,
    options: CellOptions,
) -> (DynamicImage, Rect) {
    let cell = extract_cell(page, geometry, row, col);
    let trimmed = trim_to_content(&cell, options.threshold);
    let image = if options.transparent {
        make_transparent(&trimmed.image, options.threshold)
    } else {
        trimmed.image
    };
    (image, trimmed.bounds)
}

/// Cut every cell of `page` in scan order, binding each to the next character.
///
/// Stops early, without error, once the cursor runs out of characters.
pub fn process_page(
    page: &DynamicImage,
    page_index: usize,
    geometry: &GridGeometry,
    options: CellOptions,
    cursor: &mut CharacterCursor<'_>,
) -> Vec<GlyphResult> {
    let mut glyphs = Vec::with_capacity(geometry.cells_per_page().min(cursor.remaining()));

    for (row, col) in geometry.cell_positions() {
        let Some(character) = cursor.advance() else {
            warn!(
                "More cells than characters: stopping at page {} cell [{},{}]",
                page_index + 1,
                row,
                col
            );
            break;
        };

        let (image, trim_bounds) = process_cell(page, geometry, row, col, options);
        debug!(
            "[{},{}] '{}' → {}x{} px",
            row,
            col,
            character,
            image.width(),
            image.height()
        );

        glyphs.push(GlyphResult {
            character,
            page_index,
            row,
            col,
            image,
            trim_bounds,
        });
    }

    glyphs
}

/// Run the whole pipeline over already-decoded pages, in memory.
///
/// Pages are consumed in order with one shared cursor. Once the character
/// set is exhausted the remaining pages are ignored.
pub fn extract_glyphs(
    pages: &[DynamicImage],
    geometry: &GridGeometry,
    options: CellOptions,
    charset: &CharacterSet,
) -> Vec<GlyphResult> {
    let mut cursor = CharacterCursor::new(charset);
    let mut glyphs = Vec::new();

    for (page_index, page) in pages.iter().enumerate() {
        if cursor.is_exhausted() {
            warn!(
                "Character set exhausted; ignoring {} remaining page(s)",
                pages.len() - page_index
            );
            break;
        }
        glyphs.extend(process_page(page, page_index, geometry, options, &mut cursor));
    }

    glyphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    /// 4×2 grid of 10 px cells (25.4 mm at 10 DPI), no margins.
    fn small_grid() -> GridGeometry {
        GridGeometry {
            cell_width_mm: 25.4,
            cell_height_mm: 25.4,
            columns: 4,
            rows: 2,
            dpi: 10,
            margin_top_mm: 0.0,
            margin_left_mm: 0.0,
        }
    }

    /// White page with a dark dot in the middle of every cell.
    fn dotted_page() -> DynamicImage {
        let mut img = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        for cy in 0..2 {
            for cx in 0..4 {
                img.put_pixel(cx * 10 + 5, cy * 10 + 5, Rgb([0, 0, 0]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    const OPTS: CellOptions = CellOptions {
        threshold: 240,
        transparent: true,
    };

    #[test]
    fn cursor_advances_and_exhausts() {
        let set = CharacterSet::parse("ab");
        let mut cursor = CharacterCursor::new(&set);
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.advance(), Some('b'));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn cursor_start_is_clamped() {
        let set = CharacterSet::parse("abc");
        let cursor = CharacterCursor::starting_at(&set, 10);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn cells_bind_in_row_major_order() {
        let set = CharacterSet::parse("abcdefgh");
        let mut cursor = CharacterCursor::new(&set);
        let glyphs = process_page(&dotted_page(), 0, &small_grid(), OPTS, &mut cursor);
        let order: Vec<_> = glyphs.iter().map(|g| (g.character, g.row, g.col)).collect();
        assert_eq!(order[0], ('a', 0, 0));
        assert_eq!(order[3], ('d', 0, 3));
        assert_eq!(order[4], ('e', 1, 0));
        assert_eq!(order[7], ('h', 1, 3));
    }

    #[test]
    fn each_dot_is_trimmed_and_transparent() {
        let set = CharacterSet::parse("abcdefgh");
        let mut cursor = CharacterCursor::new(&set);
        let glyphs = process_page(&dotted_page(), 0, &small_grid(), OPTS, &mut cursor);
        for g in &glyphs {
            assert_eq!(g.trim_bounds, Rect::new(3, 3, 8, 8));
            assert_eq!(g.image.dimensions(), (5, 5));
            let rgba = g.image.to_rgba8();
            assert_eq!(rgba.get_pixel(2, 2).0, [0, 0, 0, 255]);
            assert_eq!(rgba.get_pixel(0, 0).0, [0, 0, 0, 0]);
        }
    }

    #[test]
    fn transparency_can_be_disabled() {
        let set = CharacterSet::parse("a");
        let mut cursor = CharacterCursor::new(&set);
        let opts = CellOptions {
            transparent: false,
            ..OPTS
        };
        let glyphs = process_page(&dotted_page(), 0, &small_grid(), opts, &mut cursor);
        assert_eq!(glyphs[0].image.color(), image::ColorType::Rgb8);
        assert_eq!(glyphs[0].image.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn short_charset_stops_without_error() {
        let set = CharacterSet::parse("12345");
        let mut cursor = CharacterCursor::new(&set);
        let glyphs = process_page(&dotted_page(), 0, &small_grid(), OPTS, &mut cursor);
        assert_eq!(glyphs.len(), 5);
        assert_eq!(glyphs.last().map(|g| g.character), Some('5'));
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn cursor_continues_across_pages() {
        let set = CharacterSet::parse("abcdefghijkl");
        let pages = vec![dotted_page(), dotted_page()];
        let glyphs = extract_glyphs(&pages, &small_grid(), OPTS, &set);
        assert_eq!(glyphs.len(), 12);
        assert_eq!(glyphs[8].character, 'i');
        assert_eq!(glyphs[8].page_index, 1);
        assert_eq!((glyphs[8].row, glyphs[8].col), (0, 0));
    }

    #[test]
    fn blank_cells_still_consume_characters() {
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([255, 255, 255])));
        let set = CharacterSet::parse("abcdefghij");
        let glyphs = extract_glyphs(&[blank, dotted_page()], &small_grid(), OPTS, &set);
        assert_eq!(glyphs.len(), 10);
        assert_eq!(glyphs[8].character, 'i');
        assert_eq!(glyphs[8].page_index, 1);
        assert_eq!(glyphs[0].image.dimensions(), (10, 10));
    }

    #[test]
    fn cells_off_the_page_are_empty() {
        let tiny = DynamicImage::ImageRgb8(RgbImage::from_pixel(15, 20, Rgb([255, 255, 255])));
        let set = CharacterSet::parse("abcd");
        let glyphs = extract_glyphs(&[tiny], &small_grid(), OPTS, &set);
        assert_eq!(glyphs.len(), 4);
        assert_eq!(glyphs[1].image.dimensions(), (5, 10));
        assert_eq!(glyphs[2].image.dimensions(), (0, 0));
    }

    #[test]
    fn pipeline_is_deterministic() {
        let set = CharacterSet::parse("abcdefgh");
        let pages = vec![dotted_page()];
        let first = extract_glyphs(&pages, &small_grid(), OPTS, &set);
        let second = extract_glyphs(&pages, &small_grid(), OPTS, &set);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.character, b.character);
            assert_eq!(a.image.as_bytes(), b.image.as_bytes());
        }
    }
}
