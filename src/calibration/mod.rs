//! Interactive geometry calibration.
//!
//! Each tool is driven by its own hotkey: the first press arms it and shows
//! the first prompt, every later press captures the cursor position for the
//! current step. Results go into the session geometry on completion and are
//! written to disk only by the save hotkey.

pub mod preview;
pub mod sampler;
pub mod state;
pub mod tools;

pub use state::{SteppedCapture, StepOutcome};
pub use tools::{CalibrationTool, ToolKind};

use anyhow::Result;

use crate::grid::{GridGeometry, Point};
use crate::log;

/// Result of one calibration hotkey press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    Armed,
    Captured,
    Rejected,
    Completed,
    /// The tool was abandoned because the cursor or window could not be read.
    Aborted,
}

/// At most one active calibration tool.
#[derive(Debug, Default)]
pub struct Calibration {
    active: Option<SteppedCapture<ToolKind>>,
}

impl Calibration {
    pub fn active_tool(&self) -> Option<ToolKind> {
        self.active.as_ref().map(|c| *c.tool())
    }

    /// Drops the active tool, if any, without applying it.
    pub fn abandon(&mut self) {
        if let Some(capture) = self.active.take() {
            log(&format!(
                "Calibration: {} abandoned at step {}/{}.",
                capture.tool(),
                capture.step() + 1,
                capture.total_steps()
            ));
        }
    }

    /// Handles a press of `kind`'s hotkey.
    ///
    /// `cursor` reads the pointer position. `window_origin` is asked only on
    /// steps that place the grid relative to the game window. `geometry`
    /// receives the calibrated values once the last step is accepted.
    pub fn press(
        &mut self,
        kind: ToolKind,
        geometry: &mut GridGeometry,
        cursor: impl FnOnce() -> Result<Point>,
        window_origin: impl FnOnce() -> Result<Point>,
    ) -> PressOutcome {
        if self.active_tool().is_some_and(|active| active != kind) {
            self.abandon();
        }

        let Some(capture) = self.active.as_mut() else {
            let capture = SteppedCapture::arm(kind, geometry);
            log(&format!("Calibration: --- {} started ---", kind));
            log_prompt(&capture);
            self.active = Some(capture);
            return PressOutcome::Armed;
        };

        let point = match cursor() {
            Ok(point) => point,
            Err(e) => {
                log(&format!("Calibration: could not read cursor position: {:#}", e));
                self.abandon();
                return PressOutcome::Aborted;
            }
        };

        let origin = if capture.needs_window_origin() {
            match window_origin() {
                Ok(origin) => origin,
                Err(e) => {
                    log(&format!("Calibration: {:#}", e));
                    self.abandon();
                    return PressOutcome::Aborted;
                }
            }
        } else {
            Point::default()
        };

        let step = capture.step();
        match capture.capture(point, origin) {
            StepOutcome::Next { .. } => {
                log(&format!("Calibration:   P{} captured at {}.", step + 1, point));
                log_prompt(capture);
                PressOutcome::Captured
            }
            StepOutcome::Rejected { reason, .. } => {
                log(&format!(
                    "Calibration:   P{} at {} rejected: {}. Try again.",
                    step + 1,
                    point,
                    reason
                ));
                log_prompt(capture);
                PressOutcome::Rejected
            }
            StepOutcome::Complete(draft) => {
                log(&format!("Calibration:   P{} captured at {}.", step + 1, point));
                log(&format!("Calibration: --- {} complete ---", kind));
                log(&format!("Calibration: {}", draft.summary()));
                log("Calibration: press the save hotkey to write these values to config.json.");
                *geometry = draft;
                self.active = None;
                PressOutcome::Completed
            }
        }
    }
}

fn log_prompt(capture: &SteppedCapture<ToolKind>) {
    log(&format!(
        "Calibration: STEP {}/{}: {} Press the {} hotkey.",
        capture.step() + 1,
        capture.total_steps(),
        capture.prompt(),
        capture.tool()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn at(x: i32, y: i32) -> impl FnOnce() -> Result<Point> {
        move || Ok(Point::new(x, y))
    }

    fn no_window() -> Result<Point> {
        Err(anyhow!("window not found"))
    }

    #[test]
    fn test_first_press_only_arms() {
        let mut calibration = Calibration::default();
        let mut geometry = GridGeometry::default();

        let outcome = calibration.press(ToolKind::GapX, &mut geometry, at(1, 1), no_window);

        assert_eq!(outcome, PressOutcome::Armed);
        assert_eq!(calibration.active_tool(), Some(ToolKind::GapX));
        assert_eq!(geometry, GridGeometry::default());
    }

    #[test]
    fn test_completion_applies_geometry() {
        let mut calibration = Calibration::default();
        let mut geometry = GridGeometry::default();

        calibration.press(ToolKind::GapX, &mut geometry, at(0, 0), no_window);
        calibration.press(ToolKind::GapX, &mut geometry, at(100, 0), no_window);
        assert_eq!(geometry.gap_x, 10, "not applied before the last step");

        let outcome = calibration.press(ToolKind::GapX, &mut geometry, at(104, 0), no_window);
        assert_eq!(outcome, PressOutcome::Completed);
        assert_eq!(geometry.gap_x, 4);
        assert_eq!(calibration.active_tool(), None);
    }

    #[test]
    fn test_other_tool_abandons_active_one() {
        let mut calibration = Calibration::default();
        let mut geometry = GridGeometry::default();

        calibration.press(ToolKind::SlotDimensions, &mut geometry, at(0, 0), no_window);
        calibration.press(ToolKind::SlotDimensions, &mut geometry, at(10, 10), no_window);

        let outcome = calibration.press(ToolKind::GapY, &mut geometry, at(0, 0), no_window);
        assert_eq!(outcome, PressOutcome::Armed);
        assert_eq!(calibration.active_tool(), Some(ToolKind::GapY));
        assert_eq!(geometry, GridGeometry::default());
    }

    #[test]
    fn test_missing_window_aborts_origin_step() {
        let mut calibration = Calibration::default();
        let mut geometry = GridGeometry::default();

        calibration.press(ToolKind::GridOrigin, &mut geometry, at(0, 0), no_window);
        let outcome = calibration.press(ToolKind::GridOrigin, &mut geometry, at(5, 5), no_window);

        assert_eq!(outcome, PressOutcome::Aborted);
        assert_eq!(calibration.active_tool(), None);
    }

    #[test]
    fn test_grid_origin_uses_window_origin() {
        let mut calibration = Calibration::default();
        let mut geometry = GridGeometry::default();

        calibration.press(ToolKind::GridOrigin, &mut geometry, at(0, 0), no_window);
        let outcome = calibration.press(ToolKind::GridOrigin, &mut geometry, at(500, 400), || {
            Ok(Point::new(200, 100))
        });

        assert_eq!(outcome, PressOutcome::Completed);
        assert_eq!(geometry.origin, Point::new(300, 300));
    }

    #[test]
    fn test_rejected_step_keeps_tool_active() {
        let mut calibration = Calibration::default();
        let mut geometry = GridGeometry::default();

        calibration.press(ToolKind::SlotDimensions, &mut geometry, at(0, 0), no_window);
        calibration.press(ToolKind::SlotDimensions, &mut geometry, at(50, 50), no_window);
        let outcome = calibration.press(ToolKind::SlotDimensions, &mut geometry, at(50, 90), no_window);

        assert_eq!(outcome, PressOutcome::Rejected);
        assert_eq!(calibration.active_tool(), Some(ToolKind::SlotDimensions));
    }
}
