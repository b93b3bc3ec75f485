//! The calibration tools and the geometry each step derives.
//!
//! Every step captures one cursor position (absolute screen coordinates).
//! A step's commit function turns the points captured so far into geometry
//! fields on the draft. Sizes and gaps must come out positive.

use crate::grid::{GridGeometry, Point};

/// A multi-step capture procedure that fills in part of the geometry.
pub trait CalibrationTool {
    fn name(&self) -> &'static str;

    /// One prompt per step, shown before the step's point is captured.
    fn prompts(&self) -> &'static [&'static str];

    /// Whether `step` needs the game window's screen origin.
    fn needs_window_origin(&self, step: usize) -> bool;

    /// Applies the point just captured for `step`.
    ///
    /// `points[step]` is the new point. `window_origin` is the game window's
    /// top-left corner when [`Self::needs_window_origin`] asked for it.
    /// An `Err` rejects the point and the step must be repeated.
    fn commit(
        &self,
        step: usize,
        points: &[Point],
        window_origin: Point,
        draft: &mut GridGeometry,
    ) -> Result<(), String>;
}

/// The available calibration tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// All geometry in eight steps.
    Full,
    GridOrigin,
    SlotDimensions,
    GapX,
    GapY,
    TierColorPoint,
    OcrRegion,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const FULL_PROMPTS: &[&str] = &[
    "Hover over the TOP-LEFT corner of the FIRST slot (row 0, col 0).",
    "Hover over the TOP-RIGHT corner of the SAME first slot.",
    "Hover over the BOTTOM-LEFT corner of the SAME first slot.",
    "Hover over the TOP-LEFT corner of the slot TO THE RIGHT (row 0, col 1).",
    "Hover over the TOP-LEFT corner of the slot BELOW (row 1, col 0).",
    "Hover over the CENTER of the tier color area in the first slot.",
    "Hover over the TOP-LEFT of the stack count number in the first slot.",
    "Hover over the BOTTOM-RIGHT of the SAME stack count number.",
];

const GRID_ORIGIN_PROMPTS: &[&str] = &["Hover over the TOP-LEFT corner of the FIRST slot."];

const SLOT_DIMENSIONS_PROMPTS: &[&str] = &[
    "Hover over the TOP-LEFT corner of ANY slot.",
    "Hover over the BOTTOM-RIGHT corner of the SAME slot.",
];

const GAP_X_PROMPTS: &[&str] = &[
    "Hover over the TOP-RIGHT corner of slot A.",
    "Hover over the TOP-LEFT corner of slot B, right of A.",
];

const GAP_Y_PROMPTS: &[&str] = &[
    "Hover over the BOTTOM-LEFT corner of slot A.",
    "Hover over the TOP-LEFT corner of slot B, below A.",
];

const TIER_COLOR_POINT_PROMPTS: &[&str] = &[
    "Hover over the TOP-LEFT corner of ANY slot (reference).",
    "Hover over the CENTER of the tier color area IN THIS SLOT.",
];

const OCR_REGION_PROMPTS: &[&str] = &[
    "Hover over the TOP-LEFT corner of ANY slot (reference).",
    "Hover over the TOP-LEFT of the stack count number in this slot.",
    "Hover over the BOTTOM-RIGHT of the SAME stack count number.",
];

fn abs_diff(a: i32, b: i32) -> u32 {
    a.abs_diff(b)
}

fn positive(name: &str, value: u32) -> Result<u32, String> {
    if value == 0 {
        Err(format!("{} came out as 0", name))
    } else {
        Ok(value)
    }
}

impl CalibrationTool for ToolKind {
    fn name(&self) -> &'static str {
        match self {
            ToolKind::Full => "full calibration",
            ToolKind::GridOrigin => "grid origin",
            ToolKind::SlotDimensions => "slot dimensions",
            ToolKind::GapX => "slot X gap",
            ToolKind::GapY => "slot Y gap",
            ToolKind::TierColorPoint => "tier color point",
            ToolKind::OcrRegion => "OCR region",
        }
    }

    fn prompts(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Full => FULL_PROMPTS,
            ToolKind::GridOrigin => GRID_ORIGIN_PROMPTS,
            ToolKind::SlotDimensions => SLOT_DIMENSIONS_PROMPTS,
            ToolKind::GapX => GAP_X_PROMPTS,
            ToolKind::GapY => GAP_Y_PROMPTS,
            ToolKind::TierColorPoint => TIER_COLOR_POINT_PROMPTS,
            ToolKind::OcrRegion => OCR_REGION_PROMPTS,
        }
    }

    fn needs_window_origin(&self, step: usize) -> bool {
        matches!(self, ToolKind::Full | ToolKind::GridOrigin) && step == 0
    }

    fn commit(
        &self,
        step: usize,
        points: &[Point],
        window_origin: Point,
        draft: &mut GridGeometry,
    ) -> Result<(), String> {
        let p = |i: usize| points[i];

        match (self, step) {
            (ToolKind::Full | ToolKind::GridOrigin, 0) => {
                draft.origin = p(0).relative_to(window_origin);
            }

            (ToolKind::Full, 1) => {
                draft.slot_width = positive("Slot width", abs_diff(p(1).x, p(0).x))?;
            }
            (ToolKind::Full, 2) => {
                draft.slot_height = positive("Slot height", abs_diff(p(2).y, p(0).y))?;
            }
            (ToolKind::Full, 3) => {
                draft.gap_x = positive("Slot X gap", abs_diff(p(3).x, p(1).x))?;
            }
            (ToolKind::Full, 4) => {
                draft.gap_y = positive(
                    "Slot Y gap",
                    abs_diff(p(4).y, p(0).y + draft.slot_height as i32),
                )?;
            }
            (ToolKind::Full, 5) => {
                draft.color_patch.offset = p(5).relative_to(p(0));
            }
            (ToolKind::Full, 6) => {
                draft.ocr_region.offset = p(6).relative_to(p(0));
            }
            (ToolKind::Full, 7) => {
                let width = positive("OCR width", abs_diff(p(7).x, p(6).x))?;
                let height = positive("OCR height", abs_diff(p(7).y, p(6).y))?;
                draft.ocr_region.width = width;
                draft.ocr_region.height = height;
            }

            (ToolKind::SlotDimensions, 1) => {
                let width = positive("Slot width", abs_diff(p(1).x, p(0).x))?;
                let height = positive("Slot height", abs_diff(p(1).y, p(0).y))?;
                draft.slot_width = width;
                draft.slot_height = height;
            }
            (ToolKind::GapX, 1) => {
                draft.gap_x = positive("Slot X gap", abs_diff(p(1).x, p(0).x))?;
            }
            (ToolKind::GapY, 1) => {
                draft.gap_y = positive("Slot Y gap", abs_diff(p(1).y, p(0).y))?;
            }
            (ToolKind::TierColorPoint, 1) => {
                draft.color_patch.offset = p(1).relative_to(p(0));
            }
            (ToolKind::OcrRegion, 2) => {
                let width = positive("OCR width", abs_diff(p(2).x, p(1).x))?;
                let height = positive("OCR height", abs_diff(p(2).y, p(1).y))?;
                draft.ocr_region.offset = p(1).relative_to(p(0));
                draft.ocr_region.width = width;
                draft.ocr_region.height = height;
            }

            // Reference points only; used by a later step.
            _ => {}
        }
        Ok(())
    }
}
