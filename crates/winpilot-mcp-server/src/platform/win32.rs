//! Win32 implementation of [`Desktop`]
//!
//! Window queries go through `user32`, capture is a GDI `BitBlt` from the
//! desktop DC (which covers the whole virtual screen), and direct input uses
//! `SendInput` with scan codes.

use super::{Desktop, MouseButton, PlatformError, WindowHandle};
use crate::coords::{Point, Rect};
use image::RgbaImage;
use std::ffi::c_void;
use std::mem;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BitBlt, CAPTUREBLT, ClientToScreen,
    CreateCompatibleBitmap, CreateCompatibleDC, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ROP_CODE, ReleaseDC, SRCCOPY, ScreenToClient, SelectObject,
};
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBD_EVENT_FLAGS, KEYBDINPUT,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, MAPVK_VK_TO_VSC,
    MOUSE_EVENT_FLAGS, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK, MOUSEINPUT, MapVirtualKeyW, SendInput,
    VIRTUAL_KEY, VkKeyScanW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetClientRect, GetSystemMetrics, GetWindowRect, GetWindowTextW,
    IsWindow, IsWindowVisible, PostMessageW, SM_CXSCREEN, SM_CXVIRTUALSCREEN, SM_CYSCREEN,
    SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};

/// The live Win32 desktop of the current session
#[derive(Debug, Clone, Copy)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        // Window rects, client points and captured pixels must share one coordinate space.
        if let Err(e) =
            unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
        {
            tracing::debug!("Per-monitor DPI awareness not enabled: {}", e);
        }
        Self
    }
}

impl Default for Win32Desktop {
    fn default() -> Self {
        Self::new()
    }
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn to_rect(r: RECT) -> Rect {
    Rect::new(r.left, r.top, r.right, r.bottom)
}

fn last_error() -> String {
    windows::core::Error::from_win32().to_string()
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    handles.push(WindowHandle(hwnd.0 as isize));
    TRUE
}

/// Keys whose scan code needs the E0 prefix
fn is_extended_key(vk: u8) -> bool {
    matches!(
        vk,
        0x21..=0x28 // page up/down, end, home, arrows
            | 0x2D // insert
            | 0x2E // delete
            | 0x5B | 0x5C // windows keys
            | 0x6F // numpad divide
            | 0x90 // num lock
            | 0xA3 // right control
            | 0xA5 // right alt
    )
}

fn mouse_input(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send_inputs(inputs: &[INPUT]) -> Result<(), PlatformError> {
    let sent = unsafe { SendInput(inputs, mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(PlatformError::os("SendInput", last_error()));
    }
    Ok(())
}

impl Desktop for Win32Desktop {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>, PlatformError> {
        let mut handles: Vec<WindowHandle> = Vec::new();
        unsafe {
            EnumWindows(
                Some(collect_window),
                LPARAM(&mut handles as *mut Vec<WindowHandle> as isize),
            )
        }
        .map_err(|e| PlatformError::os("EnumWindows", e.to_string()))?;
        Ok(handles)
    }

    fn is_visible(&self, hwnd: WindowHandle) -> Option<bool> {
        let hwnd = to_hwnd(hwnd);
        unsafe {
            if !IsWindow(hwnd).as_bool() {
                return None;
            }
            Some(IsWindowVisible(hwnd).as_bool())
        }
    }

    fn class_name(&self, hwnd: WindowHandle) -> Option<String> {
        let mut buf = [0u16; 256];
        let len = unsafe { GetClassNameW(to_hwnd(hwnd), &mut buf) };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }

    fn title(&self, hwnd: WindowHandle) -> Option<String> {
        let hwnd = to_hwnd(hwnd);
        let mut buf = [0u16; 512];
        unsafe {
            if !IsWindow(hwnd).as_bool() {
                return None;
            }
            // 0 is also returned for untitled windows
            let len = GetWindowTextW(hwnd, &mut buf).max(0) as usize;
            Some(String::from_utf16_lossy(&buf[..len]))
        }
    }

    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        let mut r = RECT::default();
        unsafe { GetWindowRect(to_hwnd(hwnd), &mut r) }.ok()?;
        Some(to_rect(r))
    }

    fn client_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        let mut r = RECT::default();
        unsafe { GetClientRect(to_hwnd(hwnd), &mut r) }.ok()?;
        Some(to_rect(r))
    }

    fn client_to_screen(&self, hwnd: WindowHandle, point: Point) -> Option<Point> {
        let mut p = POINT {
            x: point.x,
            y: point.y,
        };
        let ok = unsafe { ClientToScreen(to_hwnd(hwnd), &mut p) }.as_bool();
        ok.then(|| Point::new(p.x, p.y))
    }

    fn screen_to_client(&self, hwnd: WindowHandle, point: Point) -> Option<Point> {
        let mut p = POINT {
            x: point.x,
            y: point.y,
        };
        let ok = unsafe { ScreenToClient(to_hwnd(hwnd), &mut p) }.as_bool();
        ok.then(|| Point::new(p.x, p.y))
    }

    fn primary_display_size(&self) -> Option<(i32, i32)> {
        let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        (w > 0 && h > 0).then_some((w, h))
    }

    fn capture(&self, rect: Rect) -> Result<RgbaImage, PlatformError> {
        let (width, height) = (rect.width(), rect.height());
        let mut pixels = vec![0u8; width as usize * height as usize * 4];

        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height gives a top-down DIB
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let lines = unsafe {
            let screen_dc = GetDC(HWND::default());
            if screen_dc.is_invalid() {
                return Err(PlatformError::os("GetDC", last_error()));
            }
            let mem_dc = CreateCompatibleDC(screen_dc);
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            let previous = SelectObject(mem_dc, bitmap);

            let blit = BitBlt(
                mem_dc,
                0,
                0,
                width,
                height,
                screen_dc,
                rect.left,
                rect.top,
                ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0),
            );
            let lines = match blit {
                Ok(()) => GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    height as u32,
                    Some(pixels.as_mut_ptr() as *mut c_void),
                    &mut info,
                    DIB_RGB_COLORS,
                ),
                Err(e) => {
                    tracing::debug!("BitBlt failed: {}", e);
                    0
                }
            };

            SelectObject(mem_dc, previous);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(HWND::default(), screen_dc);
            lines
        };

        if lines <= 0 {
            return Err(PlatformError::os("BitBlt/GetDIBits", last_error()));
        }

        // BGRA -> RGBA; GDI leaves alpha undefined
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
            px[3] = 255;
        }

        RgbaImage::from_raw(width as u32, height as u32, pixels)
            .ok_or_else(|| PlatformError::Capture("pixel buffer size mismatch".to_string()))
    }

    fn post_message(
        &self,
        hwnd: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<(), PlatformError> {
        unsafe { PostMessageW(to_hwnd(hwnd), msg, WPARAM(wparam), LPARAM(lparam)) }
            .map_err(|e| PlatformError::os("PostMessageW", e.to_string()))
    }

    fn scan_virtual_key(&self, ch: char) -> Option<u8> {
        let mut units = [0u16; 2];
        let encoded = ch.encode_utf16(&mut units);
        if encoded.len() != 1 {
            return None;
        }
        let result = unsafe { VkKeyScanW(units[0]) };
        if result == -1 {
            return None;
        }
        Some((result & 0xFF) as u8)
    }

    fn move_cursor(&self, point: Point) -> Result<(), PlatformError> {
        let (vx, vy, vw, vh) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        };
        if vw <= 1 || vh <= 1 {
            return Err(PlatformError::os("GetSystemMetrics", "virtual screen size unavailable"));
        }

        // Absolute coordinates are normalized to 0..=65535 over the virtual desktop
        let dx = (i64::from(point.x - vx) * 65535 / i64::from(vw - 1)) as i32;
        let dy = (i64::from(point.y - vy) * 65535 / i64::from(vh - 1)) as i32;
        send_inputs(&[mouse_input(
            dx,
            dy,
            MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK,
        )])
    }

    fn mouse_click(&self, button: MouseButton) -> Result<(), PlatformError> {
        let (down, up) = match button {
            MouseButton::Left => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP),
            MouseButton::Right => (MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP),
            MouseButton::Middle => (MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP),
        };
        send_inputs(&[mouse_input(0, 0, down), mouse_input(0, 0, up)])
    }

    fn key_event(&self, vk: u8, down: bool) -> Result<(), PlatformError> {
        let scan = unsafe { MapVirtualKeyW(u32::from(vk), MAPVK_VK_TO_VSC) } as u16;

        let mut flags = KEYBD_EVENT_FLAGS(0);
        let virtual_key = if scan == 0 {
            // No scan code for this layout, fall back to the virtual key
            VIRTUAL_KEY(u16::from(vk))
        } else {
            flags |= KEYEVENTF_SCANCODE;
            VIRTUAL_KEY(0)
        };
        if is_extended_key(vk) {
            flags |= KEYEVENTF_EXTENDEDKEY;
        }
        if !down {
            flags |= KEYEVENTF_KEYUP;
        }

        send_inputs(&[INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: virtual_key,
                    wScan: scan,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }])
    }
}
