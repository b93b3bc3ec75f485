//! Simulated mouse input.
//!
//! Drags are performed as eased cursor glides with a button press in
//! between. The easing and path math here is platform independent; the
//! Windows `SendInput` backend lives in [`mouse`].

#[cfg(windows)]
pub mod mouse;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::grid::Point;

/// Interval between cursor updates while gliding.
pub const GLIDE_STEP: Duration = Duration::from_millis(10);

/// Durations used for each drag, in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragTiming {
    /// Glide from the current cursor position to the source slot.
    pub move_duration: f64,
    /// Glide from the source slot to the destination while holding the button.
    pub drag_duration: f64,
    /// Pause after each drag before the next one starts.
    pub post_action_delay: f64,
}

impl Default for DragTiming {
    fn default() -> Self {
        Self {
            move_duration: 0.20,
            drag_duration: 0.30,
            post_action_delay: 0.30,
        }
    }
}

impl DragTiming {
    pub fn move_time(&self) -> Duration {
        seconds(self.move_duration)
    }

    pub fn drag_time(&self) -> Duration {
        seconds(self.drag_duration)
    }

    pub fn pacing(&self) -> Duration {
        seconds(self.post_action_delay)
    }
}

/// Converts seconds to a `Duration`, treating negative or non-finite values as zero.
fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

/// Something that can move the cursor and drag with the left button.
pub trait Pointer {
    /// Current cursor position in screen coordinates.
    fn cursor_position(&self) -> Result<Point>;

    /// Glides to `from`, presses, glides to `to`, releases.
    fn drag(&self, from: Point, to: Point, timing: &DragTiming) -> Result<()>;
}

/// Quadratic ease-in-out on `t` in `[0, 1]`.
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Number of cursor updates for a glide lasting `duration`.
pub fn glide_steps(duration: Duration) -> u32 {
    let steps = duration.as_millis() / GLIDE_STEP.as_millis();
    steps.clamp(1, 1000) as u32
}

/// Intermediate cursor positions for an eased glide from `from` to `to`.
///
/// The last point is always exactly `to`.
pub fn glide_path(from: Point, to: Point, steps: u32) -> Vec<Point> {
    let steps = steps.max(1);
    (1..=steps)
        .map(|i| {
            let k = ease_in_out_quad(i as f64 / steps as f64);
            Point::new(
                from.x + ((to.x - from.x) as f64 * k).round() as i32,
                from.y + ((to.y - from.y) as f64 * k).round() as i32,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_out_quad_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert_eq!(ease_in_out_quad(-3.0), 0.0);
        assert_eq!(ease_in_out_quad(7.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_quad_is_monotonic() {
        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_quad(i as f64 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_glide_path_ends_at_target() {
        let path = glide_path(Point::new(10, 10), Point::new(110, -90), 20);
        assert_eq!(path.len(), 20);
        assert_eq!(*path.last().unwrap(), Point::new(110, -90));
        // Slow start: the first step covers less than a twentieth of the distance.
        assert!(path[0].x - 10 < 5);
    }

    #[test]
    fn test_glide_path_zero_steps() {
        let path = glide_path(Point::new(0, 0), Point::new(5, 5), 0);
        assert_eq!(path, vec![Point::new(5, 5)]);
    }

    #[test]
    fn test_glide_steps() {
        assert_eq!(glide_steps(Duration::ZERO), 1);
        assert_eq!(glide_steps(Duration::from_millis(300)), 30);
    }

    #[test]
    fn test_timing_durations() {
        let timing = DragTiming::default();
        assert_eq!(timing.move_time(), Duration::from_millis(200));
        assert_eq!(timing.pacing(), Duration::from_millis(300));

        let broken = DragTiming {
            move_duration: -1.0,
            drag_duration: f64::NAN,
            post_action_delay: 0.0,
        };
        assert_eq!(broken.move_time(), Duration::ZERO);
        assert_eq!(broken.drag_time(), Duration::ZERO);
    }
}
