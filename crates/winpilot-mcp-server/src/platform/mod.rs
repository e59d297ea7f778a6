//! Native capability providers
//!
//! Everything that touches the OS goes through the [`Desktop`] trait: window
//! enumeration and geometry, message posting, pixel capture and input injection.
//! Each query returns an explicit `Option`/`Result` so callers decide whether a
//! failure is skipped, replaced by a fallback, or reported.

use crate::coords::{Point, Rect};
use image::RgbaImage;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
pub mod fake;
#[cfg(not(target_os = "windows"))]
mod unsupported;
#[cfg(target_os = "windows")]
mod win32;

#[cfg(not(target_os = "windows"))]
pub use unsupported::UnsupportedDesktop;
#[cfg(target_os = "windows")]
pub use win32::Win32Desktop;

/// Opaque top-level window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Mouse button used by click injection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

/// Errors raised by capability providers
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The capability does not exist on this host
    #[error("{0} requires Windows")]
    Unavailable(&'static str),

    /// A native call failed
    #[error("{call} failed: {message}")]
    Os { call: &'static str, message: String },

    /// Captured pixels could not be turned into an image
    #[error("screen capture failed: {0}")]
    Capture(String),
}

impl PlatformError {
    pub fn os(call: &'static str, message: impl Into<String>) -> Self {
        Self::Os {
            call,
            message: message.into(),
        }
    }
}

/// OS window system, screen and input devices
pub trait Desktop {
    /// All top-level windows in platform enumeration order
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>, PlatformError>;

    /// `None` when the window vanished
    fn is_visible(&self, hwnd: WindowHandle) -> Option<bool>;

    fn class_name(&self, hwnd: WindowHandle) -> Option<String>;

    fn title(&self, hwnd: WindowHandle) -> Option<String>;

    /// Outer rectangle (frame and title bar included) in screen coordinates
    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect>;

    /// Client rectangle in client coordinates (origin is always 0,0)
    fn client_rect(&self, hwnd: WindowHandle) -> Option<Rect>;

    fn client_to_screen(&self, hwnd: WindowHandle, point: Point) -> Option<Point>;

    fn screen_to_client(&self, hwnd: WindowHandle, point: Point) -> Option<Point>;

    /// Primary display size in pixels
    fn primary_display_size(&self) -> Option<(i32, i32)>;

    /// Grab the pixels of a screen rectangle, spanning every attached display
    fn capture(&self, rect: Rect) -> Result<RgbaImage, PlatformError>;

    /// Post a window message without waiting for it to be processed
    fn post_message(
        &self,
        hwnd: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<(), PlatformError>;

    /// Virtual-key code the current keyboard layout produces for `ch`
    fn scan_virtual_key(&self, ch: char) -> Option<u8>;

    /// Move the system cursor to an absolute screen position
    fn move_cursor(&self, point: Point) -> Result<(), PlatformError>;

    /// Press and release a mouse button at the current cursor position
    fn mouse_click(&self, button: MouseButton) -> Result<(), PlatformError>;

    /// Emit a system-level key transition
    fn key_event(&self, vk: u8, down: bool) -> Result<(), PlatformError>;
}
