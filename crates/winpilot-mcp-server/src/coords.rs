//! Target rectangles and normalized-coordinate mapping
//!
//! `to_screen` is the only place a normalized `(x, y)` pair becomes an absolute
//! pixel position, so the rect reported by `capture` and the point hit by
//! `click` always agree.

use crate::constants::FALLBACK_SCREEN_SIZE;
use crate::errors::ToolError;
use crate::platform::Desktop;
use crate::window::{self, WindowTarget};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

/// A point in screen or client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width, never below 1
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(1)
    }

    /// Height, never below 1
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(1)
    }

    /// Area used to rank candidate windows; degenerate rects count as 0
    pub fn area(&self) -> i64 {
        let w = i64::from((self.right - self.left).max(0));
        let h = i64::from((self.bottom - self.top).max(0));
        w * h
    }
}

/// What a normalized coordinate is relative to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Window,
    Screen,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Screen => "screen",
        }
    }
}

/// Resolve the rectangle a tool call operates on.
///
/// `Screen` never fails: if the display size cannot be queried the fixed
/// fallback size is used. `Window` fails with [`ToolError::TargetNotFound`]
/// when no window matches.
pub fn rect_for<D: Desktop + ?Sized>(
    desktop: &D,
    kind: TargetKind,
    target: &WindowTarget,
) -> Result<Rect, ToolError> {
    match kind {
        TargetKind::Screen => Ok(screen_rect(desktop)),
        TargetKind::Window => {
            let hwnd = window::locate(desktop, target)?.ok_or(ToolError::TargetNotFound)?;

            if target.include_frame {
                return desktop
                    .window_rect(hwnd)
                    .ok_or(ToolError::WindowQuery("window rect"));
            }

            let client = desktop
                .client_rect(hwnd)
                .ok_or(ToolError::WindowQuery("client rect"))?;
            // Both corners go through the OS separately instead of applying one offset.
            let top_left = desktop
                .client_to_screen(hwnd, Point::new(client.left, client.top))
                .ok_or(ToolError::WindowQuery("client-to-screen"))?;
            let bottom_right = desktop
                .client_to_screen(hwnd, Point::new(client.right, client.bottom))
                .ok_or(ToolError::WindowQuery("client-to-screen"))?;

            Ok(Rect::new(
                top_left.x,
                top_left.y,
                bottom_right.x,
                bottom_right.y,
            ))
        }
    }
}

fn screen_rect<D: Desktop + ?Sized>(desktop: &D) -> Rect {
    let (width, height) = desktop
        .primary_display_size()
        .filter(|&(w, h)| w > 0 && h > 0)
        .unwrap_or_else(|| {
            tracing::debug!("Display metrics unavailable, using fallback screen size");
            FALLBACK_SCREEN_SIZE
        });
    Rect::new(0, 0, width, height)
}

/// Map a normalized coordinate inside `rect` to an absolute screen pixel.
///
/// Half-pixel positions round to the even neighbour.
pub fn to_screen(rect: &Rect, x: f64, y: f64) -> Point {
    let px = (f64::from(rect.left) + x * f64::from(rect.width())).round_ties_even();
    let py = (f64::from(rect.top) + y * f64::from(rect.height())).round_ties_even();
    Point::new(saturate(px), saturate(py))
}

fn saturate(value: f64) -> i32 {
    // `as` saturates at the i32 bounds and maps NaN to 0
    value as i32
}
