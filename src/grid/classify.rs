//! Slot classification: tier by sampled color, stack count by OCR.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::geometry::{GridGeometry, Rect};
use crate::ocr::StackCounter;

/// An RGB color, serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Sum of absolute per-channel differences.
    pub fn manhattan_distance(&self, other: &Rgb) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (*a as i32 - *b as i32).unsigned_abs())
            .sum()
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.0[0], self.0[1], self.0[2])
    }
}

/// The closest tier to a sampled color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierMatch {
    pub tier: u32,
    pub distance: u32,
}

/// Result of classifying one slot as occupied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub tier: u32,
    pub count: u32,
    pub color: Rgb,
}

/// Anything that can decide what occupies a grid slot.
pub trait ClassifySlot {
    /// Returns `None` when the slot should be treated as empty.
    fn classify(&self, image: &RgbaImage, row: u32, col: u32) -> Option<Classification>;
}

/// Averages the RGB channels over the part of `rect` that lies inside the image.
///
/// Returns `None` when the rectangle does not overlap the image. Channel means
/// are truncated to integers.
pub fn mean_color(image: &RgbaImage, rect: &Rect) -> Option<Rgb> {
    let (x, y, w, h) = rect.clip_to(image.width(), image.height())?;

    let mut sums = [0u64; 3];
    for py in y..y + h {
        for px in x..x + w {
            let pixel = image.get_pixel(px, py);
            sums[0] += pixel[0] as u64;
            sums[1] += pixel[1] as u64;
            sums[2] += pixel[2] as u64;
        }
    }

    let n = w as u64 * h as u64;
    Some(Rgb([
        (sums[0] / n) as u8,
        (sums[1] / n) as u8,
        (sums[2] / n) as u8,
    ]))
}

/// Finds the tier whose reference color is closest to `color`.
///
/// The first tier wins on equal distances. The match is accepted only if its
/// distance is at most `tolerance`.
pub fn match_tier(
    color: &Rgb,
    tiers: impl IntoIterator<Item = (u32, Rgb)>,
    tolerance: u32,
) -> Option<TierMatch> {
    let mut best: Option<TierMatch> = None;
    for (tier, reference) in tiers {
        let distance = color.manhattan_distance(&reference);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(TierMatch { tier, distance });
        }
    }
    best.filter(|m| m.distance <= tolerance)
}

/// Classifies slots of a window screenshot using calibrated geometry.
pub struct SlotClassifier<'a> {
    geometry: &'a GridGeometry,
    counter: &'a StackCounter,
}

impl<'a> SlotClassifier<'a> {
    pub fn new(geometry: &'a GridGeometry, counter: &'a StackCounter) -> Self {
        Self { geometry, counter }
    }
}

impl ClassifySlot for SlotClassifier<'_> {
    fn classify(&self, image: &RgbaImage, row: u32, col: u32) -> Option<Classification> {
        let patch = self.geometry.color_patch_rect(row, col);
        let color = mean_color(image, &patch)?;
        let matched = match_tier(
            &color,
            self.geometry.tiers(),
            self.geometry.color_patch.tolerance,
        )?;

        let slot = self.geometry.slot_index(row, col);
        let ocr_rect = self.geometry.ocr_rect(row, col);
        let count = if ocr_rect.fits_within(image.width(), image.height()) {
            let crop = image::imageops::crop_imm(
                image,
                ocr_rect.x as u32,
                ocr_rect.y as u32,
                ocr_rect.width,
                ocr_rect.height,
            )
            .to_image();
            self.counter.count(&crop, slot)
        } else {
            crate::log(&format!(
                "WARN: OCR region for slot {} lies outside the screenshot. Defaulting count to 1.",
                slot
            ));
            1
        };

        Some(Classification {
            tier: matched.tier,
            count,
            color,
        })
    }
}
