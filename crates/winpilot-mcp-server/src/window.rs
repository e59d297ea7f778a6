//! Top-level window lookup
//!
//! Every tool call resolves its window from scratch: windows move, close and get
//! replaced between calls, so no handle is ever cached.

use crate::platform::{Desktop, PlatformError, WindowHandle};

/// Selection criteria for one window lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowTarget {
    /// Exact window class name
    pub class_name: Option<String>,
    /// Case-insensitive substring of the window title
    pub title_contains: Option<String>,
    /// Use the outer window rect instead of the client area
    pub include_frame: bool,
}

impl WindowTarget {
    /// Build a target; empty filter strings are treated as absent
    pub fn new(
        class_name: Option<String>,
        title_contains: Option<String>,
        include_frame: bool,
    ) -> Self {
        Self {
            class_name: class_name.filter(|s| !s.is_empty()),
            title_contains: title_contains.filter(|s| !s.is_empty()),
            include_frame,
        }
    }

    fn matches<D: Desktop + ?Sized>(&self, desktop: &D, hwnd: WindowHandle) -> bool {
        if desktop.is_visible(hwnd) != Some(true) {
            return false;
        }
        if let Some(wanted) = &self.class_name {
            match desktop.class_name(hwnd) {
                Some(class) if &class == wanted => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.title_contains {
            match desktop.title(hwnd) {
                Some(title) if title.to_lowercase().contains(&needle.to_lowercase()) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Find the best window for `target`.
///
/// Visible windows passing both filters are ranked by outer-rect area; the first
/// enumerated window wins a tie. Windows that vanish while being inspected are
/// skipped. Only an unavailable window system is reported as an error, any other
/// enumeration failure resolves to `None`.
pub fn locate<D: Desktop + ?Sized>(
    desktop: &D,
    target: &WindowTarget,
) -> Result<Option<WindowHandle>, PlatformError> {
    let handles = match desktop.top_level_windows() {
        Ok(handles) => handles,
        Err(e @ PlatformError::Unavailable(_)) => return Err(e),
        Err(e) => {
            tracing::debug!("Window enumeration failed: {}", e);
            return Ok(None);
        }
    };

    let best = handles
        .into_iter()
        .filter(|&hwnd| target.matches(desktop, hwnd))
        .map(|hwnd| {
            let area = desktop.window_rect(hwnd).map(|r| r.area()).unwrap_or(0);
            (hwnd, area)
        })
        .fold(None, |best: Option<(WindowHandle, i64)>, candidate| match best {
            Some((_, best_area)) if best_area >= candidate.1 => best,
            _ => Some(candidate),
        });

    if let Some((hwnd, area)) = best {
        tracing::debug!("Resolved window {:?} (area {})", hwnd, area);
    }
    Ok(best.map(|(hwnd, _)| hwnd))
}
