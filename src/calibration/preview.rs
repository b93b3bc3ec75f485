//! Overlay rendering for checking calibrated geometry.
//!
//! Draws the slot, color patch and OCR rectangles onto a window screenshot
//! so misaligned geometry is easy to spot in the debug images.

use image::{Rgba, RgbaImage};

use crate::grid::{GridGeometry, Rect, ScanReport};

pub const COLOR_SLOT: Rgba<u8> = Rgba([0, 0, 255, 255]); // Blue
pub const COLOR_PATCH: Rgba<u8> = Rgba([255, 0, 0, 255]); // Red
pub const COLOR_OCR: Rgba<u8> = Rgba([0, 255, 0, 255]); // Lime

/// Renders the grid over `screenshot`.
///
/// Every slot in the scanned rows gets its outline and color patch; OCR
/// regions are drawn only for slots that matched a tier.
pub fn render_overlay(
    screenshot: &RgbaImage,
    geometry: &GridGeometry,
    report: &ScanReport,
) -> RgbaImage {
    let mut img = screenshot.clone();

    let rows = report.rows_scanned.max(1).min(geometry.max_rows);
    for row in 0..rows {
        for col in 0..geometry.num_cols {
            draw_rect(&mut img, geometry.slot_rect(row, col), COLOR_SLOT, 1);
            draw_rect(&mut img, geometry.color_patch_rect(row, col), COLOR_PATCH, 1);
        }
    }

    for item in &report.items {
        if let Some((row, col)) = geometry.slot_position(item.original_slot) {
            draw_rect(&mut img, geometry.ocr_rect(row, col), COLOR_OCR, 1);
        }
    }

    img
}

/// Draws a rectangle border, clipped to the image.
pub fn draw_rect(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>, thickness: u32) {
    if rect.is_empty() {
        return;
    }
    let (img_w, img_h) = img.dimensions();
    let thickness = thickness.min(rect.width).min(rect.height) as i32;
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.width as i32 - 1, rect.y + rect.height as i32 - 1);

    let mut put = |x: i32, y: i32| {
        if x >= 0 && y >= 0 && (x as u32) < img_w && (y as u32) < img_h {
            img.put_pixel(x as u32, y as u32, color);
        }
    };

    for t in 0..thickness {
        // Top and bottom edges
        for x in x0..=x1 {
            put(x, y0 + t);
            put(x, y1 - t);
        }
        // Left and right edges
        for y in y0..=y1 {
            put(x0 + t, y);
            put(x1 - t, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ScannedItem;

    #[test]
    fn test_draw_rect() {
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        draw_rect(&mut img, Rect::new(10, 10, 50, 30), COLOR_OCR, 2);

        assert_eq!(*img.get_pixel(10, 10), COLOR_OCR);
        assert_eq!(*img.get_pixel(59, 39), COLOR_OCR);
        assert_eq!(*img.get_pixel(11, 25), COLOR_OCR);
        assert_eq!(*img.get_pixel(35, 25), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_draw_rect_clips() {
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        draw_rect(&mut img, Rect::new(-5, -5, 40, 10), COLOR_SLOT, 1);
        // Only the bottom edge (y = 4) falls inside the image.
        assert_eq!(*img.get_pixel(0, 4), COLOR_SLOT);
        assert_eq!(*img.get_pixel(19, 4), COLOR_SLOT);
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_overlay_marks_tiered_ocr_regions() {
        let geometry = GridGeometry::default();
        let screenshot = RgbaImage::from_pixel(1000, 1200, Rgba([0, 0, 0, 255]));
        let report = ScanReport {
            items: vec![ScannedItem::new(1, 1, 1)],
            effective_rows: 1,
            rows_scanned: 2,
        };

        let img = render_overlay(&screenshot, &geometry, &report);

        let slot = geometry.slot_rect(1, 3);
        assert_eq!(*img.get_pixel(slot.x as u32, slot.y as u32), COLOR_SLOT);
        let patch = geometry.color_patch_rect(0, 0);
        assert_eq!(*img.get_pixel(patch.x as u32, patch.y as u32), COLOR_PATCH);
        let ocr = geometry.ocr_rect(0, 1);
        assert_eq!(*img.get_pixel(ocr.x as u32, ocr.y as u32), COLOR_OCR);
        let empty_ocr = geometry.ocr_rect(0, 2);
        assert_eq!(
            *img.get_pixel(empty_ocr.x as u32, empty_ocr.y as u32),
            Rgba([0, 0, 0, 255])
        );
        // Rows past the scan are left alone.
        let unscanned = geometry.slot_rect(2, 0);
        assert_eq!(
            *img.get_pixel(unscanned.x as u32, unscanned.y as u32),
            Rgba([0, 0, 0, 255])
        );
    }
}
