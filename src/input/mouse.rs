//! Hardware-level mouse simulation with `SendInput`.
//!
//! Games read input through DirectInput/RawInput, so window messages are
//! ignored; only `SendInput` drags are picked up. This moves the real cursor.

use anyhow::{anyhow, Result};
use std::time::Duration;

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN,
};

use super::{glide_path, glide_steps, DragTiming, GLIDE_STEP};
use crate::grid::Point;

/// Delay between pressing the button and starting to move.
const PRESS_SETTLE: Duration = Duration::from_millis(50);

/// Returns the cursor position in screen coordinates.
pub fn cursor_position() -> Result<Point> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point)? };
    Ok(Point::new(point.x, point.y))
}

/// Normalizes a screen point to the 0-65535 range `MOUSEEVENTF_ABSOLUTE` expects.
fn normalize(point: Point) -> Result<(i32, i32)> {
    let screen_width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
    let screen_height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
    if screen_width <= 0 || screen_height <= 0 {
        return Err(anyhow!("Invalid screen size {}x{}", screen_width, screen_height));
    }

    let norm_x = ((point.x as i64 * 65535) / screen_width as i64) as i32;
    let norm_y = ((point.y as i64 * 65535) / screen_height as i64) as i32;
    Ok((norm_x, norm_y))
}

/// Sends one absolute mouse event at `point`.
fn send_mouse(point: Point, flags: MOUSE_EVENT_FLAGS) -> Result<()> {
    let (dx, dy) = normalize(point)?;
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                dwFlags: flags | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE,
                ..Default::default()
            },
        },
    };

    let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
    if sent != 1 {
        return Err(anyhow!("SendInput rejected mouse event at {}", point));
    }
    Ok(())
}

/// Moves the cursor from `from` to `to` along an eased path.
fn glide(from: Point, to: Point, duration: Duration) -> Result<()> {
    let steps = glide_steps(duration);
    let pause = (duration / steps).min(GLIDE_STEP * 2);
    for point in glide_path(from, to, steps) {
        send_mouse(point, MOUSE_EVENT_FLAGS(0))?;
        std::thread::sleep(pause);
    }
    Ok(())
}

/// Drags with the left button from `from` to `to`.
///
/// The button is always released, even if a glide fails midway.
pub fn drag(from: Point, to: Point, timing: &DragTiming) -> Result<()> {
    let start = cursor_position().unwrap_or(from);
    glide(start, from, timing.move_time())?;

    send_mouse(from, MOUSEEVENTF_LEFTDOWN)?;
    std::thread::sleep(PRESS_SETTLE);

    let moved = glide(from, to, timing.drag_time());
    let released = send_mouse(to, MOUSEEVENTF_LEFTUP);
    moved.and(released)
}
