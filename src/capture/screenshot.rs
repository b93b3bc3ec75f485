//! Screen region capture with GDI `BitBlt`.

use anyhow::{anyhow, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::ffi::c_void;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS,
    HGDIOBJ, SRCCOPY,
};

use crate::grid::Rect;

/// Captures `region` of the screen.
///
/// Reads the composed desktop, so the game window must be visible and on top.
pub fn capture_region(region: Rect) -> Result<RgbaImage> {
    if region.is_empty() {
        return Err(anyhow!("Cannot capture empty region {:?}", region));
    }
    let width = region.width as i32;
    let height = region.height as i32;

    let mut buffer = vec![0u8; region.width as usize * region.height as usize * 4];

    unsafe {
        let screen_dc = GetDC(HWND::default());
        if screen_dc.is_invalid() {
            return Err(anyhow!("GetDC failed"));
        }
        let mem_dc = CreateCompatibleDC(screen_dc);
        let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
        let previous = SelectObject(mem_dc, HGDIOBJ(bitmap.0));

        let blit = BitBlt(
            mem_dc, 0, 0, width, height, screen_dc, region.x, region.y, SRCCOPY,
        );

        // Negative height requests a top-down DIB.
        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let lines = if blit.is_ok() {
            GetDIBits(
                mem_dc,
                bitmap,
                0,
                height as u32,
                Some(buffer.as_mut_ptr() as *mut c_void),
                &mut info,
                DIB_RGB_COLORS,
            )
        } else {
            0
        };

        SelectObject(mem_dc, previous);
        let _ = DeleteObject(HGDIOBJ(bitmap.0));
        let _ = DeleteDC(mem_dc);
        ReleaseDC(HWND::default(), screen_dc);

        blit.map_err(|e| anyhow!("BitBlt failed: {}", e))?;
        if lines != height {
            return Err(anyhow!("GetDIBits copied {} of {} lines", lines, height));
        }
    }

    Ok(bgra_to_rgba(region.width, region.height, &buffer))
}

/// Converts a top-down BGRA buffer into an opaque RGBA image.
fn bgra_to_rgba(width: u32, height: u32, src: &[u8]) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(width, height);
    for (i, pixel) in img.pixels_mut().enumerate() {
        let offset = i * 4;
        // BGRA -> RGBA; GDI leaves alpha undefined.
        *pixel = Rgba([src[offset + 2], src[offset + 1], src[offset], 255]);
    }
    img
}
