//! Stand-in desktop for hosts without Win32
//!
//! The protocol keeps working (`tools/list`, `wait`, screen-rect fallback); every
//! window, capture and input call reports that it needs Windows.

use super::{Desktop, MouseButton, PlatformError, WindowHandle};
use crate::coords::{Point, Rect};
use image::RgbaImage;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDesktop;

impl UnsupportedDesktop {
    pub fn new() -> Self {
        Self
    }
}

impl Desktop for UnsupportedDesktop {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>, PlatformError> {
        Err(PlatformError::Unavailable("window lookup"))
    }

    fn is_visible(&self, _hwnd: WindowHandle) -> Option<bool> {
        None
    }

    fn class_name(&self, _hwnd: WindowHandle) -> Option<String> {
        None
    }

    fn title(&self, _hwnd: WindowHandle) -> Option<String> {
        None
    }

    fn window_rect(&self, _hwnd: WindowHandle) -> Option<Rect> {
        None
    }

    fn client_rect(&self, _hwnd: WindowHandle) -> Option<Rect> {
        None
    }

    fn client_to_screen(&self, _hwnd: WindowHandle, _point: Point) -> Option<Point> {
        None
    }

    fn screen_to_client(&self, _hwnd: WindowHandle, _point: Point) -> Option<Point> {
        None
    }

    fn primary_display_size(&self) -> Option<(i32, i32)> {
        None
    }

    fn capture(&self, _rect: Rect) -> Result<RgbaImage, PlatformError> {
        Err(PlatformError::Unavailable("screen capture"))
    }

    fn post_message(
        &self,
        _hwnd: WindowHandle,
        _msg: u32,
        _wparam: usize,
        _lparam: isize,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("window messages"))
    }

    fn scan_virtual_key(&self, _ch: char) -> Option<u8> {
        None
    }

    fn move_cursor(&self, _point: Point) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("input injection"))
    }

    fn mouse_click(&self, _button: MouseButton) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("input injection"))
    }

    fn key_event(&self, _vk: u8, _down: bool) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("input injection"))
    }
}
