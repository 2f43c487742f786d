//! Grid geometry: physical millimetre layout → pixel rectangles.
//!
//! The template is printed in millimetres and scanned at a fixed DPI, so
//! every pixel offset is derived from `mm / 25.4 * dpi`. The conversion
//! **truncates** rather than rounds, matching the offsets existing scans
//! were calibrated against.

use crate::error::GlyphExtractorError;
use serde::{Deserialize, Serialize};

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Physical description of the handwriting grid and the scan resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Cell width in mm. Default: 22.5.
    pub cell_width_mm: f64,
    /// Cell height in mm. Default: 26.2.
    pub cell_height_mm: f64,
    /// Number of columns. Default: 8.
    pub columns: u32,
    /// Number of rows. Default: 10.
    pub rows: u32,
    /// Scanner resolution in dots per inch. Default: 300.
    pub dpi: u32,
    /// Top margin in mm. Default: 10.
    pub margin_top_mm: f64,
    /// Left margin in mm. Default: 10.
    pub margin_left_mm: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            cell_width_mm: 22.5,
            cell_height_mm: 26.2,
            columns: 8,
            rows: 10,
            dpi: 300,
            margin_top_mm: 10.0,
            margin_left_mm: 10.0,
        }
    }
}

impl GridGeometry {
    /// Check the invariants every derived pixel value relies on.
    pub fn validate(&self) -> Result<(), GlyphExtractorError> {
        if !(self.cell_width_mm > 0.0) || !(self.cell_height_mm > 0.0) {
            return Err(GlyphExtractorError::InvalidConfig(format!(
                "cell size must be positive, got {}×{} mm",
                self.cell_width_mm, self.cell_height_mm
            )));
        }
        if self.dpi == 0 {
            return Err(GlyphExtractorError::InvalidConfig(
                "DPI must be > 0".into(),
            ));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(GlyphExtractorError::InvalidConfig(format!(
                "grid must have at least one cell, got {}×{}",
                self.columns, self.rows
            )));
        }
        if !(self.margin_top_mm >= 0.0) || !(self.margin_left_mm >= 0.0) {
            return Err(GlyphExtractorError::InvalidConfig(format!(
                "margins must be non-negative, got top={} left={} mm",
                self.margin_top_mm, self.margin_left_mm
            )));
        }
        let lengths = [
            self.cell_width_mm,
            self.cell_height_mm,
            self.margin_top_mm,
            self.margin_left_mm,
        ];
        if lengths.iter().any(|mm| !mm.is_finite()) {
            return Err(GlyphExtractorError::InvalidConfig(format!(
                "lengths must be finite, got cell {}×{} mm, margins top={} left={} mm",
                self.cell_width_mm, self.cell_height_mm, self.margin_top_mm, self.margin_left_mm
            )));
        }
        self.far_edge_px("horizontal", self.margin_left_mm, self.cell_width_mm, self.columns)?;
        self.far_edge_px("vertical", self.margin_top_mm, self.cell_height_mm, self.rows)?;
        Ok(())
    }

    /// Exclusive pixel edge of the last cell along one axis.
    ///
    /// Every `cell_rect` coordinate is at most this value, so a geometry
    /// whose edges fit in `u32` can never overflow when cropping.
    fn far_edge_px(
        &self,
        axis: &str,
        margin_mm: f64,
        cell_mm: f64,
        count: u32,
    ) -> Result<u32, GlyphExtractorError> {
        let too_large = || {
            GlyphExtractorError::InvalidConfig(format!(
                "{axis} grid extent does not fit in pixel coordinates at {} DPI",
                self.dpi
            ))
        };
        // `as u32` saturates, so reject values that would clamp.
        for mm in [margin_mm, cell_mm] {
            if mm / MM_PER_INCH * self.dpi as f64 >= u32::MAX as f64 {
                return Err(too_large());
            }
        }
        let margin_px = self.mm_to_px(margin_mm);
        let cell_px = self.mm_to_px(cell_mm);
        count
            .checked_mul(cell_px)
            .and_then(|span| margin_px.checked_add(span))
            .ok_or_else(too_large)
    }

    /// Convert millimetres to pixels, truncating toward zero.
    pub fn mm_to_px(&self, mm: f64) -> u32 {
        let inches = mm / MM_PER_INCH;
        (inches * self.dpi as f64) as u32
    }

    pub fn cell_width_px(&self) -> u32 {
        self.mm_to_px(self.cell_width_mm)
    }

    pub fn cell_height_px(&self) -> u32 {
        self.mm_to_px(self.cell_height_mm)
    }

    pub fn margin_top_px(&self) -> u32 {
        self.mm_to_px(self.margin_top_mm)
    }

    pub fn margin_left_px(&self) -> u32 {
        self.mm_to_px(self.margin_left_mm)
    }

    /// Number of cells on one page.
    pub fn cells_per_page(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Pixel rectangle of the cell at (`row`, `col`) in page coordinates.
    ///
    /// The geometry is expected to have passed [`validate`](Self::validate).
    ///
    /// # Panics
    /// If `row >= rows` or `col >= columns`.
    pub fn cell_rect(&self, row: u32, col: u32) -> Rect {
        assert!(
            row < self.rows,
            "row {row} out of range (grid has {} rows)",
            self.rows
        );
        assert!(
            col < self.columns,
            "column {col} out of range (grid has {} columns)",
            self.columns
        );

        let cell_w = self.cell_width_px();
        let cell_h = self.cell_height_px();
        let x = self.margin_left_px() + col * cell_w;
        let y = self.margin_top_px() + row * cell_h;

        Rect::new(x, y, x + cell_w, y + cell_h)
    }

    /// Every (row, col) pair in scan order: left to right, top to bottom.
    pub fn cell_positions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| (row, col)))
    }
}

/// Integer pixel bounds with exclusive maxima.
///
/// `min_x == max_x` (or `min_y == max_y`) is a legal, empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Rect {
    /// Build a rectangle, normalising so that `min <= max` on each axis.
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }

    /// The rectangle `[0, width) × [0, height)`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Overlap of two rectangles. Disjoint inputs give an empty rectangle.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        if min_x >= max_x || min_y >= max_y {
            return Rect::default();
        }
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_geometry() -> GridGeometry {
        GridGeometry {
            margin_top_mm: 15.0,
            margin_left_mm: 15.0,
            ..GridGeometry::default()
        }
    }

    #[test]
    fn mm_to_px_truncates() {
        let g = scan_geometry();
        assert_eq!(g.mm_to_px(15.0), 177); // 177.16…
        assert_eq!(g.mm_to_px(22.5), 265); // 265.74…
        assert_eq!(g.mm_to_px(26.2), 309); // 309.44…
        assert_eq!(g.mm_to_px(0.0), 0);
    }

    #[test]
    fn first_row_cells() {
        let g = scan_geometry();
        let a = g.cell_rect(0, 0);
        let b = g.cell_rect(0, 1);
        assert_eq!((a.min_x, a.max_x), (177, 442));
        assert_eq!((b.min_x, b.max_x), (442, 707));
        assert_eq!((a.min_y, a.max_y), (177, 177 + 309));
    }

    #[test]
    fn cell_rect_is_deterministic() {
        let g = scan_geometry();
        for (row, col) in g.cell_positions() {
            assert_eq!(g.cell_rect(row, col), g.cell_rect(row, col));
        }
    }

    #[test]
    fn adjacent_cells_touch_but_never_overlap() {
        let g = scan_geometry();
        for row in 0..g.rows {
            for col in 1..g.columns {
                let left = g.cell_rect(row, col - 1);
                let right = g.cell_rect(row, col);
                assert_eq!(right.min_x - left.min_x, g.cell_width_px());
                assert_eq!(left.max_x, right.min_x);
                assert!(left.intersect(&right).is_empty());
            }
        }
    }

    #[test]
    fn positions_are_row_major() {
        let g = GridGeometry {
            columns: 3,
            rows: 2,
            ..GridGeometry::default()
        };
        let order: Vec<_> = g.cell_positions().collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert_eq!(g.cells_per_page(), 6);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn row_out_of_range_panics() {
        let g = GridGeometry::default();
        g.cell_rect(g.rows, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn column_out_of_range_panics() {
        let g = GridGeometry::default();
        g.cell_rect(0, g.columns);
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        let ok = GridGeometry::default();
        assert!(ok.validate().is_ok());

        let zero_dpi = GridGeometry { dpi: 0, ..ok };
        assert!(zero_dpi.validate().is_err());

        let no_width = GridGeometry {
            cell_width_mm: 0.0,
            ..ok
        };
        assert!(no_width.validate().is_err());

        let nan_height = GridGeometry {
            cell_height_mm: f64::NAN,
            ..ok
        };
        assert!(nan_height.validate().is_err());

        let negative_margin = GridGeometry {
            margin_left_mm: -1.0,
            ..ok
        };
        assert!(negative_margin.validate().is_err());

        let empty_grid = GridGeometry { columns: 0, ..ok };
        assert!(empty_grid.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_lengths() {
        let ok = GridGeometry::default();
        let infinite_margin = GridGeometry {
            margin_left_mm: f64::INFINITY,
            ..ok
        };
        assert!(infinite_margin.validate().is_err());

        let infinite_cell = GridGeometry {
            cell_height_mm: f64::INFINITY,
            ..ok
        };
        assert!(infinite_cell.validate().is_err());
    }

    #[test]
    fn validate_rejects_grids_past_u32_pixels() {
        let ok = GridGeometry::default();
        let huge_margin = GridGeometry {
            margin_top_mm: 1e12,
            margin_left_mm: 1e12,
            ..ok
        };
        let err = huge_margin.validate().unwrap_err();
        assert!(err.to_string().contains("does not fit"), "got {err}");

        // Each value fits on its own, but 8 columns of it do not.
        let wide_cells = GridGeometry {
            cell_width_mm: 2_000_000.0,
            dpi: 10_000,
            ..ok
        };
        assert!(wide_cells.mm_to_px(wide_cells.cell_width_mm) < u32::MAX);
        assert!(wide_cells.validate().is_err());

        let huge_dpi = GridGeometry {
            dpi: u32::MAX,
            ..ok
        };
        assert!(huge_dpi.validate().is_err());
    }

    #[test]
    fn last_cell_of_a_valid_grid_ends_at_the_far_edge() {
        let g = scan_geometry();
        g.validate().expect("valid");
        let last = g.cell_rect(g.rows - 1, g.columns - 1);
        let far_x = g.far_edge_px("horizontal", g.margin_left_mm, g.cell_width_mm, g.columns);
        assert_eq!(far_x.ok(), Some(last.max_x));
        assert_eq!(last.max_y, 177 + 10 * 309);
    }

    #[test]
    fn intersect_clips_and_handles_disjoint() {
        let page = Rect::from_size(100, 80);
        let partial = Rect::new(90, 70, 120, 95);
        assert_eq!(page.intersect(&partial), Rect::new(90, 70, 100, 80));

        let outside = Rect::new(150, 10, 200, 20);
        let clipped = page.intersect(&outside);
        assert!(clipped.is_empty());
        assert_eq!(clipped.width(), 0);
    }
}
