//! Window discovery by title.

use anyhow::{anyhow, Result};
use std::ffi::{c_void, OsString};
use std::os::windows::ffi::OsStringExt;

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetForegroundWindow, GetWindowRect, GetWindowTextLengthW, GetWindowTextW,
    IsIconic, IsWindowVisible, SetForegroundWindow,
};

use super::{title_matches, GameWindow};
use crate::grid::Rect;

fn to_hwnd(handle: isize) -> HWND {
    HWND(handle as *mut c_void)
}

fn window_title(hwnd: HWND) -> String {
    unsafe {
        let title_len = GetWindowTextLengthW(hwnd);
        if title_len <= 0 {
            return String::new();
        }
        let mut title_buf: Vec<u16> = vec![0; (title_len + 1) as usize];
        let copied = GetWindowTextW(hwnd, &mut title_buf).max(0) as usize;
        OsString::from_wide(&title_buf[..copied.min(title_len as usize)])
            .to_string_lossy()
            .to_string()
    }
}

/// Reads the current state of `hwnd`.
fn describe(hwnd: HWND, title: String) -> Result<GameWindow> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut rect)? };

    let width = (rect.right - rect.left).max(0) as u32;
    let height = (rect.bottom - rect.top).max(0) as u32;
    let minimized = unsafe { IsIconic(hwnd).as_bool() };
    let active = unsafe { GetForegroundWindow() } == hwnd;

    Ok(GameWindow {
        handle: hwnd.0 as isize,
        title,
        bounds: Rect::new(rect.left, rect.top, width, height),
        minimized,
        active,
    })
}

/// Finds the first visible top-level window whose title contains `wanted`.
pub fn find_window(wanted: &str) -> Result<GameWindow> {
    struct EnumData<'a> {
        wanted: &'a str,
        found: Option<(HWND, String)>,
    }

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
        unsafe {
            let data = &mut *(lparam.0 as *mut EnumData);

            if !IsWindowVisible(hwnd).as_bool() {
                return TRUE;
            }

            let title = window_title(hwnd);
            if title_matches(&title, data.wanted) {
                data.found = Some((hwnd, title));
                return BOOL(0); // Stop enumeration
            }

            TRUE
        }
    }

    let mut data = EnumData {
        wanted,
        found: None,
    };
    unsafe {
        // EnumWindows reports an error when the callback stops early; that is the success case here.
        let _ = EnumWindows(Some(enum_callback), LPARAM(&mut data as *mut _ as isize));
    }

    let (hwnd, title) = data
        .found
        .ok_or_else(|| anyhow!("Could not find a window titled '{}'. Is the game running?", wanted))?;
    describe(hwnd, title)
}

/// Brings the window to the foreground.
pub fn activate(window: &GameWindow) -> bool {
    let hwnd = to_hwnd(window.handle);
    let accepted = unsafe { SetForegroundWindow(hwnd).as_bool() };
    // Give the window time to become active.
    std::thread::sleep(std::time::Duration::from_millis(100));
    accepted && unsafe { GetForegroundWindow() } == hwnd
}
