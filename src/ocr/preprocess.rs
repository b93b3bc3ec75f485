use image::imageops::FilterType;
use image::{GrayImage, ImageBuffer, Luma, RgbaImage};

use super::OcrSettings;

/// Prepares a stack count crop for Tesseract.
///
/// Converts to grayscale, upscales by the configured factor (Lanczos), then
/// binarizes so the bright digits end up black on a white background.
pub fn prepare_for_ocr(crop: &RgbaImage, settings: &OcrSettings) -> GrayImage {
    let gray = image::imageops::grayscale(crop);
    let (width, height) = gray.dimensions();
    let factor = settings.upscale_factor.max(1);

    let scaled = if factor > 1 && width > 0 && height > 0 {
        image::imageops::resize(&gray, width * factor, height * factor, FilterType::Lanczos3)
    } else {
        gray
    };

    threshold_bright_pixels(&scaled, settings.threshold)
}

/// Converts a grayscale image to binary by keeping only bright pixels.
///
/// Pixels brighter than `threshold` become black (text). All other pixels
/// become white (background).
pub fn threshold_bright_pixels(img: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] > threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_threshold_bright_pixels() {
        let mut img: GrayImage = ImageBuffer::new(3, 1);
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([250]));
        img.put_pixel(2, 0, Luma([180]));

        let result = threshold_bright_pixels(&img, 180);

        assert_eq!(result.get_pixel(0, 0)[0], 255, "Dark pixel should become white");
        assert_eq!(result.get_pixel(1, 0)[0], 0, "Bright pixel should become black");
        assert_eq!(result.get_pixel(2, 0)[0], 255, "Pixel at threshold is background");
    }

    #[test]
    fn test_prepare_for_ocr_upscales() {
        let crop: RgbaImage = ImageBuffer::from_pixel(30, 25, Rgba([255, 255, 255, 255]));
        let settings = OcrSettings {
            upscale_factor: 3,
            threshold: 180,
        };
        let out = prepare_for_ocr(&crop, &settings);
        assert_eq!(out.dimensions(), (90, 75));
        assert!(out.pixels().all(|p| p[0] == 0), "white digits become black");
    }

    #[test]
    fn test_prepare_for_ocr_factor_zero_is_identity_size() {
        let crop = RgbaImage::new(8, 4);
        let settings = OcrSettings {
            upscale_factor: 0,
            threshold: 10,
        };
        let out = prepare_for_ocr(&crop, &settings);
        assert_eq!(out.dimensions(), (8, 4));
        assert!(out.pixels().all(|p| p[0] == 255));
    }
}
