//! Stack count recognition.
//!
//! The OCR collaborator is anything implementing [`DigitReader`]; the
//! production implementation shells out to Tesseract. [`StackCounter`] wraps
//! an optional reader and never fails: every error path yields a count of 1.

pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::TesseractReader;
pub use extract::parse_stack_count;
pub use preprocess::prepare_for_ocr;
pub use setup::init_tesseract;

use anyhow::Result;
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reads a string of digits from a small preprocessed image.
pub trait DigitReader {
    fn read_digits(&self, image: &GrayImage) -> Result<String>;
}

/// Preprocessing parameters applied before OCR.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Integer upscale factor for the crop (1 = no scaling).
    pub upscale_factor: u32,
    /// Gray level above which a pixel is considered part of the digits.
    pub threshold: u8,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            upscale_factor: 2,
            threshold: 180,
        }
    }
}

/// Turns OCR crops into stack counts, falling back to 1.
pub struct StackCounter {
    reader: Option<Box<dyn DigitReader>>,
    settings: OcrSettings,
    debug_dir: Option<PathBuf>,
}

impl StackCounter {
    /// Creates a counter. `None` disables OCR for the whole run.
    pub fn new(reader: Option<Box<dyn DigitReader>>, settings: OcrSettings) -> Self {
        Self {
            reader,
            settings,
            debug_dir: None,
        }
    }

    /// Saves raw and processed crops into `dir` for inspection.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    pub fn is_available(&self) -> bool {
        self.reader.is_some()
    }

    /// Reads the stack count from the OCR crop of `slot`.
    pub fn count(&self, crop: &RgbaImage, slot: usize) -> u32 {
        let Some(reader) = &self.reader else {
            return 1;
        };

        let processed = prepare_for_ocr(crop, &self.settings);

        if let Some(dir) = &self.debug_dir {
            let raw_path = dir.join(format!("ocr_slot_{}_raw.png", slot));
            let processed_path = dir.join(format!("ocr_slot_{}_processed.png", slot));
            if let Err(e) = crop.save(&raw_path).and_then(|_| processed.save(&processed_path)) {
                crate::log(&format!("Could not save OCR debug image for slot {}: {}", slot, e));
            }
        }

        match reader.read_digits(&processed) {
            Ok(text) => parse_stack_count(&text).unwrap_or(1),
            Err(e) => {
                crate::log(&format!("Slot {} OCR error: {}", slot, e));
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingReader;

    impl DigitReader for FailingReader {
        fn read_digits(&self, _image: &GrayImage) -> Result<String> {
            Err(anyhow!("tesseract crashed"))
        }
    }

    struct EchoSize;

    impl DigitReader for EchoSize {
        fn read_digits(&self, image: &GrayImage) -> Result<String> {
            Ok(format!("{}", image.width()))
        }
    }

    #[test]
    fn test_unavailable_reader_counts_one() {
        let counter = StackCounter::new(None, OcrSettings::default());
        assert!(!counter.is_available());
        assert_eq!(counter.count(&RgbaImage::new(30, 25), 0), 1);
    }

    #[test]
    fn test_reader_error_counts_one() {
        let counter = StackCounter::new(Some(Box::new(FailingReader)), OcrSettings::default());
        assert_eq!(counter.count(&RgbaImage::new(30, 25), 3), 1);
    }

    #[test]
    fn test_reader_receives_upscaled_image() {
        let counter = StackCounter::new(Some(Box::new(EchoSize)), OcrSettings::default());
        assert_eq!(counter.count(&RgbaImage::new(30, 25), 0), 60);
    }

    #[test]
    fn test_debug_images_written() {
        let dir = tempfile::tempdir().unwrap();
        let counter = StackCounter::new(Some(Box::new(EchoSize)), OcrSettings::default())
            .with_debug_dir(Some(dir.path().to_path_buf()));
        counter.count(&RgbaImage::new(10, 10), 7);
        assert!(dir.path().join("ocr_slot_7_raw.png").exists());
        assert!(dir.path().join("ocr_slot_7_processed.png").exists());
    }
}
