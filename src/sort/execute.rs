//! Replays a plan as mouse drags.

use std::time::Duration;

use super::plan::Plan;
use crate::input::{DragTiming, Pointer};
use crate::log;

/// Outcome of executing a plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub performed: usize,
    /// Moves without derivable screen coordinates.
    pub skipped: usize,
    /// Moves whose drag returned an error.
    pub failed: usize,
}

/// Performs every move of `plan` in order.
///
/// `pause` is called with the pacing delay between consecutive moves, never
/// after the last one. A failed or skipped move does not stop the rest.
pub fn execute_plan<P, F>(
    plan: &Plan,
    pointer: &P,
    timing: &DragTiming,
    mut pause: F,
) -> ExecutionReport
where
    P: Pointer + ?Sized,
    F: FnMut(Duration),
{
    let mut report = ExecutionReport::default();
    let total = plan.moves.len();

    for (i, mv) in plan.moves.iter().enumerate() {
        match (mv.from_point, mv.to_point) {
            (Some(from), Some(to)) => {
                log(&format!("Execute: move {}/{}: {}", i + 1, total, mv));
                match pointer.drag(from, to, timing) {
                    Ok(()) => report.performed += 1,
                    Err(e) => {
                        log(&format!("Execute: drag {} failed: {}", mv, e));
                        report.failed += 1;
                    }
                }
            }
            _ => {
                log(&format!(
                    "WARN: Execute: skipping {}, slot coordinates unavailable.",
                    mv
                ));
                report.skipped += 1;
            }
        }

        if i + 1 < total {
            pause(timing.pacing());
        }
    }

    report
}
