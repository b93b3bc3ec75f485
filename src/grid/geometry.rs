//! Slot geometry: maps grid rows and columns to pixel rectangles.
//!
//! All coordinates are relative to the game window's top-left corner, which
//! is also the top-left corner of a window screenshot. Use [`Point::offset`]
//! to turn them into absolute screen coordinates.

use serde::{Deserialize, Serialize};

use super::classify::Rgb;

/// A pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translates this point by `by`.
    pub fn offset(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }

    /// Returns `self - other` as a vector.
    pub fn relative_to(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if the whole rectangle lies within a `width`×`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty()
            && self.x >= 0
            && self.y >= 0
            && self.right() <= width as i64
            && self.bottom() <= height as i64
    }

    /// Intersects the rectangle with a `width`×`height` image.
    ///
    /// Returns `(x, y, w, h)` in image coordinates, or `None` when the
    /// intersection is empty.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = (self.x as i64).clamp(0, width as i64);
        let y0 = (self.y as i64).clamp(0, height as i64);
        let x1 = self.right().clamp(0, width as i64);
        let y1 = self.bottom().clamp(0, height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// Where the tier color is sampled inside a slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorPatch {
    /// Patch center relative to the slot's top-left corner.
    pub offset: Point,
    /// Side length of the square sample area.
    pub size: u32,
    /// Maximum Manhattan distance for a tier match.
    pub tolerance: u32,
}

/// Where the stack count is printed inside a slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OcrRegion {
    /// Top-left corner relative to the slot's top-left corner.
    pub offset: Point,
    pub width: u32,
    pub height: u32,
}

/// Calibrated inventory grid layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    /// Top-left corner of slot 0, relative to the game window.
    pub origin: Point,
    pub num_cols: u32,
    pub max_rows: u32,
    pub slot_width: u32,
    pub slot_height: u32,
    pub gap_x: u32,
    pub gap_y: u32,
    pub color_patch: ColorPatch,
    /// Reference colors; index 0 is tier 1.
    pub tier_colors: Vec<Rgb>,
    pub ocr_region: OcrRegion,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            origin: Point::new(310, 170),
            num_cols: 6,
            max_rows: 10,
            slot_width: 83,
            slot_height: 83,
            gap_x: 10,
            gap_y: 10,
            color_patch: ColorPatch {
                offset: Point::new(15, 68),
                size: 10,
                tolerance: 30,
            },
            tier_colors: default_tier_colors(),
            ocr_region: OcrRegion {
                offset: Point::new(8, 8),
                width: 30,
                height: 25,
            },
        }
    }
}

/// Reference colors for tiers 1 through 5.
pub fn default_tier_colors() -> Vec<Rgb> {
    vec![
        Rgb([47, 67, 81]),
        Rgb([81, 89, 42]),
        Rgb([95, 64, 40]),
        Rgb([102, 41, 35]),
        Rgb([61, 50, 85]),
    ]
}

impl GridGeometry {
    /// Number of physical slots in the grid.
    pub fn slot_count(&self) -> usize {
        self.num_cols as usize * self.max_rows as usize
    }

    /// Row-major slot index.
    pub fn slot_index(&self, row: u32, col: u32) -> usize {
        row as usize * self.num_cols as usize + col as usize
    }

    /// Splits a slot index into `(row, col)`, or `None` if it lies outside the grid.
    pub fn slot_position(&self, index: usize) -> Option<(u32, u32)> {
        if self.num_cols == 0 || index >= self.slot_count() {
            return None;
        }
        let cols = self.num_cols as usize;
        Some(((index / cols) as u32, (index % cols) as u32))
    }

    /// Top-left corner of the slot at `(row, col)`.
    pub fn slot_origin(&self, row: u32, col: u32) -> Point {
        let step_x = (self.slot_width + self.gap_x) as i32;
        let step_y = (self.slot_height + self.gap_y) as i32;
        Point::new(
            self.origin.x + col as i32 * step_x,
            self.origin.y + row as i32 * step_y,
        )
    }

    pub fn slot_rect(&self, row: u32, col: u32) -> Rect {
        let tl = self.slot_origin(row, col);
        Rect::new(tl.x, tl.y, self.slot_width, self.slot_height)
    }

    pub fn slot_center(&self, row: u32, col: u32) -> Point {
        let tl = self.slot_origin(row, col);
        Point::new(
            tl.x + (self.slot_width / 2) as i32,
            tl.y + (self.slot_height / 2) as i32,
        )
    }

    /// Center of the slot with the given index, if the index is inside the grid.
    pub fn slot_center_at(&self, index: usize) -> Option<Point> {
        self.slot_position(index)
            .map(|(row, col)| self.slot_center(row, col))
    }

    pub fn color_patch_center(&self, row: u32, col: u32) -> Point {
        self.slot_origin(row, col).offset(self.color_patch.offset)
    }

    /// Square sample area centered on the color patch point.
    pub fn color_patch_rect(&self, row: u32, col: u32) -> Rect {
        let center = self.color_patch_center(row, col);
        let half = (self.color_patch.size / 2) as i32;
        Rect::new(
            center.x - half,
            center.y - half,
            self.color_patch.size,
            self.color_patch.size,
        )
    }

    pub fn ocr_rect(&self, row: u32, col: u32) -> Rect {
        let tl = self.slot_origin(row, col).offset(self.ocr_region.offset);
        Rect::new(tl.x, tl.y, self.ocr_region.width, self.ocr_region.height)
    }

    /// Tier number (1-based) for each reference color.
    pub fn tiers(&self) -> impl Iterator<Item = (u32, Rgb)> + '_ {
        self.tier_colors
            .iter()
            .enumerate()
            .map(|(i, color)| (i as u32 + 1, *color))
    }

    /// One-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "origin {}, grid {}x{} (max), slot {}x{}, gap {}x{}, patch {} size {} tol {}, ocr {} {}x{}",
            self.origin,
            self.num_cols,
            self.max_rows,
            self.slot_width,
            self.slot_height,
            self.gap_x,
            self.gap_y,
            self.color_patch.offset,
            self.color_patch.size,
            self.color_patch.tolerance,
            self.ocr_region.offset,
            self.ocr_region.width,
            self.ocr_region.height
        )
    }
}
