//! The real desktop: window lookup, screen capture and mouse input.
//!
//! On Windows every call goes to the Win32 backends. Other targets build a
//! stub whose calls fail, so the pipeline and its tests still compile there.

use anyhow::Result;
use image::RgbaImage;

use crate::capture::{GameWindow, ScreenCapture, WindowLocator};
use crate::grid::{Point, Rect};
use crate::input::{DragTiming, Pointer};

#[derive(Clone, Copy, Debug, Default)]
pub struct Desktop;

#[cfg(windows)]
impl WindowLocator for Desktop {
    fn find_window(&self, title: &str) -> Result<GameWindow> {
        crate::capture::window::find_window(title)
    }

    fn activate(&self, window: &GameWindow) -> bool {
        crate::capture::window::activate(window)
    }
}

#[cfg(windows)]
impl ScreenCapture for Desktop {
    fn capture(&self, region: Rect) -> Result<RgbaImage> {
        crate::capture::screenshot::capture_region(region)
    }
}

#[cfg(windows)]
impl Pointer for Desktop {
    fn cursor_position(&self) -> Result<Point> {
        crate::input::mouse::cursor_position()
    }

    fn drag(&self, from: Point, to: Point, timing: &DragTiming) -> Result<()> {
        crate::input::mouse::drag(from, to, timing)
    }
}

#[cfg(not(windows))]
const UNSUPPORTED: &str = "Desktop automation is only available on Windows";

#[cfg(not(windows))]
impl WindowLocator for Desktop {
    fn find_window(&self, title: &str) -> Result<GameWindow> {
        Err(anyhow::anyhow!("{} (looking for '{}')", UNSUPPORTED, title))
    }

    fn activate(&self, _window: &GameWindow) -> bool {
        false
    }
}

#[cfg(not(windows))]
impl ScreenCapture for Desktop {
    fn capture(&self, _region: Rect) -> Result<RgbaImage> {
        Err(anyhow::anyhow!(UNSUPPORTED))
    }
}

#[cfg(not(windows))]
impl Pointer for Desktop {
    fn cursor_position(&self) -> Result<Point> {
        Err(anyhow::anyhow!(UNSUPPORTED))
    }

    fn drag(&self, _from: Point, _to: Point, _timing: &DragTiming) -> Result<()> {
        Err(anyhow::anyhow!(UNSUPPORTED))
    }
}
