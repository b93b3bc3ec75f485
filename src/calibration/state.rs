//! Step-by-step point capture for one calibration tool.

use crate::grid::{GridGeometry, Point};

use super::tools::CalibrationTool;

/// What happened after capturing a point.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// The point was accepted; `step` (0-based) is next.
    Next { step: usize, prompt: &'static str },
    /// The point was rejected; the same step must be repeated.
    Rejected {
        step: usize,
        prompt: &'static str,
        reason: String,
    },
    /// All steps done; the draft holds the calibrated geometry.
    Complete(GridGeometry),
}

/// An armed calibration tool collecting points into a draft geometry.
#[derive(Clone, Debug)]
pub struct SteppedCapture<T: CalibrationTool> {
    tool: T,
    step: usize,
    points: Vec<Point>,
    draft: GridGeometry,
}

impl<T: CalibrationTool> SteppedCapture<T> {
    /// Arms `tool`, starting from a copy of the current geometry.
    pub fn arm(tool: T, current: &GridGeometry) -> Self {
        Self {
            tool,
            step: 0,
            points: Vec::new(),
            draft: current.clone(),
        }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// 0-based index of the step waiting for a point.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        self.tool.prompts().len()
    }

    pub fn prompt(&self) -> &'static str {
        self.tool.prompts().get(self.step).copied().unwrap_or_default()
    }

    pub fn needs_window_origin(&self) -> bool {
        self.tool.needs_window_origin(self.step)
    }

    /// Captures `point` for the current step.
    pub fn capture(&mut self, point: Point, window_origin: Point) -> StepOutcome {
        self.points.push(point);

        let mut candidate = self.draft.clone();
        if let Err(reason) = self
            .tool
            .commit(self.step, &self.points, window_origin, &mut candidate)
        {
            self.points.pop();
            return StepOutcome::Rejected {
                step: self.step,
                prompt: self.prompt(),
                reason,
            };
        }

        self.draft = candidate;
        self.step += 1;
        if self.step >= self.total_steps() {
            return StepOutcome::Complete(self.draft.clone());
        }
        StepOutcome::Next {
            step: self.step,
            prompt: self.prompt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ToolKind;

    #[test]
    fn test_steps_advance_to_completion() {
        let current = GridGeometry::default();
        let mut capture = SteppedCapture::arm(ToolKind::SlotDimensions, &current);
        assert_eq!(capture.step(), 0);
        assert_eq!(capture.total_steps(), 2);

        let outcome = capture.capture(Point::new(100, 100), Point::default());
        assert!(matches!(outcome, StepOutcome::Next { step: 1, .. }));

        match capture.capture(Point::new(160, 170), Point::default()) {
            StepOutcome::Complete(g) => {
                assert_eq!((g.slot_width, g.slot_height), (60, 70));
                assert_eq!(g.origin, current.origin);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_rejected_point_repeats_step() {
        let mut capture = SteppedCapture::arm(ToolKind::SlotDimensions, &GridGeometry::default());
        capture.capture(Point::new(100, 100), Point::default());

        let outcome = capture.capture(Point::new(100, 150), Point::default());
        assert!(matches!(outcome, StepOutcome::Rejected { step: 1, .. }));
        assert_eq!(capture.step(), 1);

        let outcome = capture.capture(Point::new(150, 150), Point::default());
        assert!(matches!(outcome, StepOutcome::Complete(_)));
    }

    #[test]
    fn test_single_step_tool_completes_immediately() {
        let mut capture = SteppedCapture::arm(ToolKind::GridOrigin, &GridGeometry::default());
        assert!(capture.needs_window_origin());
        match capture.capture(Point::new(400, 300), Point::new(100, 100)) {
            StepOutcome::Complete(g) => assert_eq!(g.origin, Point::new(300, 200)),
            other => panic!("expected completion, got {:?}", other),
        }
    }
}
