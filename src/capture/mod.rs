//! Game window discovery and screen capture.
//!
//! Collaborators are traits so the session can be driven by a fake desktop
//! in tests. The Windows implementations live in [`window`] and
//! [`screenshot`] and are tied together by [`crate::desktop::Desktop`].

#[cfg(windows)]
pub mod screenshot;
#[cfg(windows)]
pub mod window;

use anyhow::Result;
use image::RgbaImage;

use crate::grid::{Point, Rect};

/// A top-level window matched by title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameWindow {
    /// Raw platform handle.
    pub handle: isize,
    pub title: String,
    /// Outer window bounds in screen coordinates.
    pub bounds: Rect,
    pub minimized: bool,
    /// Whether the window is in the foreground.
    pub active: bool,
}

impl GameWindow {
    pub fn origin(&self) -> Point {
        self.bounds.top_left()
    }
}

/// Finds and focuses the game window.
pub trait WindowLocator {
    /// Returns the first window whose title contains `title`.
    fn find_window(&self, title: &str) -> Result<GameWindow>;

    /// Brings the window to the foreground. Returns false if the OS refused.
    fn activate(&self, window: &GameWindow) -> bool;
}

/// Grabs screen pixels.
pub trait ScreenCapture {
    /// Captures `region` (screen coordinates) as an RGBA image.
    fn capture(&self, region: Rect) -> Result<RgbaImage>;
}

/// Case-insensitive substring title match.
pub fn title_matches(window_title: &str, wanted: &str) -> bool {
    !wanted.is_empty() && window_title.to_lowercase().contains(&wanted.to_lowercase())
}
