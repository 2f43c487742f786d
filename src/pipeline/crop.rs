//! Cell cropping: copy one rectangle out of a page raster.

use super::geometry::{GridGeometry, Rect};
use image::{DynamicImage, GenericImageView};

/// Copy the pixels of `rect` out of `page`.
///
/// The rectangle is clipped to the page first. A rectangle that lies
/// entirely outside the page (scan cropped too tightly) yields a zero-sized
/// image rather than an error. Output pixel (0, 0) is the top-left corner of
/// the clipped rectangle. The source image is never modified.
pub fn extract_region(page: &DynamicImage, rect: Rect) -> DynamicImage {
    let bounds = Rect::from_size(page.width(), page.height());
    let clipped = bounds.intersect(&rect);
    page.crop_imm(
        clipped.min_x,
        clipped.min_y,
        clipped.width(),
        clipped.height(),
    )
}

/// Visit every pixel of `raster` as 8-bit RGB, in row-major order.
///
/// 16-bit samples keep their high byte (`v >> 8`), so a sample maps to the
/// same 8-bit value a scanner driver writing 8-bit output would produce.
/// Alpha is not read. Other layouts go through `image`'s own conversion.
pub fn for_each_rgb8(raster: &DynamicImage, mut f: impl FnMut(u32, u32, [u8; 3])) {
    let high = |v: u16| (v >> 8) as u8;
    match raster {
        DynamicImage::ImageRgb16(buf) => {
            for (x, y, p) in buf.enumerate_pixels() {
                let [r, g, b] = p.0;
                f(x, y, [high(r), high(g), high(b)]);
            }
        }
        DynamicImage::ImageRgba16(buf) => {
            for (x, y, p) in buf.enumerate_pixels() {
                let [r, g, b, _] = p.0;
                f(x, y, [high(r), high(g), high(b)]);
            }
        }
        DynamicImage::ImageLuma16(buf) => {
            for (x, y, p) in buf.enumerate_pixels() {
                let v = high(p.0[0]);
                f(x, y, [v, v, v]);
            }
        }
        DynamicImage::ImageLumaA16(buf) => {
            for (x, y, p) in buf.enumerate_pixels() {
                let v = high(p.0[0]);
                f(x, y, [v, v, v]);
            }
        }
        _ => {
            for (x, y, p) in raster.pixels() {
                let [r, g, b, _] = p.0;
                f(x, y, [r, g, b]);
            }
        }
    }
}

/// Extract the cell at (`row`, `col`) of `geometry` from a page.
///
/// # Panics
/// If the cell lies outside the grid, see [`GridGeometry::cell_rect`].
pub fn extract_cell(page: &DynamicImage, geometry: &GridGeometry, row: u32, col: u32) -> DynamicImage {
    extract_region(page, geometry.cell_rect(row, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 10×8 page where each pixel encodes its own coordinates.
    fn coordinate_page() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(10, 8, |x, y| {
            Rgb([x as u8, y as u8, 0])
        }))
    }

    #[test]
    fn region_inside_page() {
        let page = coordinate_page();
        let cell = extract_region(&page, Rect::new(2, 3, 6, 5));
        assert_eq!(cell.dimensions(), (4, 2));
        assert_eq!(cell.get_pixel(0, 0).0[..2], [2, 3]);
        assert_eq!(cell.get_pixel(3, 1).0[..2], [5, 4]);
    }

    #[test]
    fn region_is_clipped_to_page() {
        let page = coordinate_page();
        let cell = extract_region(&page, Rect::new(7, 6, 20, 20));
        assert_eq!(cell.dimensions(), (3, 2));
        assert_eq!(cell.get_pixel(0, 0).0[..2], [7, 6]);
    }

    #[test]
    fn region_outside_page_is_empty() {
        let page = coordinate_page();
        let cell = extract_region(&page, Rect::new(50, 50, 60, 60));
        assert_eq!(cell.dimensions(), (0, 0));
    }

    #[test]
    fn source_is_untouched() {
        let page = coordinate_page();
        let before = page.clone();
        let _ = extract_region(&page, Rect::new(0, 0, 5, 5));
        assert_eq!(page.as_bytes(), before.as_bytes());
    }

    #[test]
    fn extract_cell_uses_geometry() {
        // 25.4 mm cells at 4 DPI → 4 px cells, no margins.
        let geometry = GridGeometry {
            cell_width_mm: 25.4,
            cell_height_mm: 25.4,
            columns: 2,
            rows: 2,
            dpi: 4,
            margin_top_mm: 0.0,
            margin_left_mm: 0.0,
        };
        let page = coordinate_page();
        let cell = extract_cell(&page, &geometry, 1, 1);
        assert_eq!(cell.dimensions(), (4, 4));
        assert_eq!(cell.get_pixel(0, 0).0[..2], [4, 4]);
    }

    #[test]
    fn sixteen_bit_samples_keep_the_high_byte() {
        use image::{ImageBuffer, Luma, Rgb};
        // 46100 >> 8 = 180; rounding would give 179.
        let rgb = ImageBuffer::<Rgb<u16>, _>::from_pixel(2, 1, Rgb([46100, 255, 65535]));
        let mut seen = Vec::new();
        for_each_rgb8(&DynamicImage::ImageRgb16(rgb), |x, y, p| seen.push((x, y, p)));
        assert_eq!(seen, vec![(0, 0, [180, 0, 255]), (1, 0, [180, 0, 255])]);

        let luma = ImageBuffer::<Luma<u16>, _>::from_pixel(1, 1, Luma([61440]));
        let mut seen = Vec::new();
        for_each_rgb8(&DynamicImage::ImageLuma16(luma), |_, _, p| seen.push(p));
        assert_eq!(seen, vec![[240, 240, 240]]);
    }

    #[test]
    fn eight_bit_samples_pass_through() {
        let page = coordinate_page();
        let mut count = 0;
        for_each_rgb8(&page, |x, y, p| {
            assert_eq!(p, [x as u8, y as u8, 0]);
            count += 1;
        });
        assert_eq!(count, 80);
    }
}
