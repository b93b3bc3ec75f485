//! Console color sampler for picking tier reference colors.
//!
//! Prints the mean color of the 5×5 block under the pointer once per
//! interval until asked to stop.

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::capture::ScreenCapture;
use crate::grid::classify::mean_color;
use crate::grid::{Point, Rect, Rgb};
use crate::input::Pointer;
use crate::log;

/// Side length of the sampled block.
pub const SAMPLE_SIZE: u32 = 5;

/// Mean color of the block centered on `at`.
pub fn sample_color_at<C: ScreenCapture + ?Sized>(capture: &C, at: Point) -> Result<Rgb> {
    let half = (SAMPLE_SIZE / 2) as i32;
    let region = Rect::new(at.x - half, at.y - half, SAMPLE_SIZE, SAMPLE_SIZE);
    let img = capture.capture(region)?;
    let full = Rect::new(0, 0, img.width(), img.height());
    mean_color(&img, &full).ok_or_else(|| anyhow!("Empty capture at {}", at))
}

/// Logs the color under the pointer every `interval` until `stop` is set.
///
/// `wait` performs the sleep between samples.
pub fn run_sampler<D, W>(desktop: &D, stop: &AtomicBool, interval: Duration, mut wait: W)
where
    D: ScreenCapture + Pointer + ?Sized,
    W: FnMut(Duration),
{
    log("Sampling colors under the pointer. Press Enter to stop.");
    while !stop.load(Ordering::SeqCst) {
        let sample = desktop
            .cursor_position()
            .and_then(|at| sample_color_at(desktop, at).map(|color| (at, color)));
        match sample {
            Ok((at, color)) => log(&format!(
                "Mouse {} - mean {}x{} color: {}",
                at, SAMPLE_SIZE, SAMPLE_SIZE, color
            )),
            Err(e) => {
                log(&format!("Color sampling error: {:#}", e));
                break;
            }
        }
        wait(interval);
    }
    log("Color sampling stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::DragTiming;
    use image::{Rgba, RgbaImage};
    use std::cell::{Cell, RefCell};

    struct FakeScreen {
        cursor: Point,
        regions: RefCell<Vec<Rect>>,
    }

    impl ScreenCapture for FakeScreen {
        fn capture(&self, region: Rect) -> Result<RgbaImage> {
            self.regions.borrow_mut().push(region);
            let mut img = RgbaImage::from_pixel(region.width, region.height, Rgba([10, 20, 30, 255]));
            img.put_pixel(0, 0, Rgba([35, 45, 55, 255]));
            Ok(img)
        }
    }

    impl Pointer for FakeScreen {
        fn cursor_position(&self) -> Result<Point> {
            Ok(self.cursor)
        }

        fn drag(&self, _from: Point, _to: Point, _timing: &DragTiming) -> Result<()> {
            Ok(())
        }
    }

    fn screen() -> FakeScreen {
        FakeScreen {
            cursor: Point::new(100, 200),
            regions: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_sample_is_centered_5x5_mean() {
        let screen = screen();
        let color = sample_color_at(&screen, Point::new(100, 200)).unwrap();
        assert_eq!(screen.regions.borrow()[0], Rect::new(98, 198, 5, 5));
        // One brighter pixel among 25: (25*10 + 25) / 25 = 11.
        assert_eq!(color, Rgb([11, 21, 31]));
    }

    #[test]
    fn test_sampler_runs_until_stopped() {
        let screen = screen();
        let stop = AtomicBool::new(false);
        let waits = Cell::new(0);

        run_sampler(&screen, &stop, Duration::from_secs(1), |_| {
            waits.set(waits.get() + 1);
            if waits.get() == 3 {
                stop.store(true, Ordering::SeqCst);
            }
        });

        assert_eq!(waits.get(), 3);
        assert_eq!(screen.regions.borrow().len(), 3);
    }
}
