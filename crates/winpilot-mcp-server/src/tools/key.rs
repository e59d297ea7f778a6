//! Key tool implementation

use super::{ToolResult, pause};
use crate::constants::{WM_KEYDOWN, WM_KEYUP};
use crate::errors::ToolError;
use crate::keymap;
use crate::platform::Desktop;
use crate::requests::{InputMode, KeyRequest};
use crate::window;
use serde_json::json;

/// Send a key to the target window or to the system input queue
pub async fn run<D: Desktop + ?Sized>(
    desktop: &D,
    request: KeyRequest,
    default_class: Option<&str>,
) -> Result<ToolResult, ToolError> {
    let action = request.action;

    match request.mode {
        InputMode::DirectInput => {
            let vk = keymap::virtual_key(desktop, &request.key)?;
            for i in 0..request.repeat {
                if action.sends_down() {
                    desktop.key_event(vk, true)?;
                }
                if action.sends_up() {
                    desktop.key_event(vk, false)?;
                }
                if i + 1 < request.repeat {
                    pause(request.interval_ms).await;
                }
            }
        }
        InputMode::PostMessage => {
            let target = request.window_target(default_class);
            let hwnd = window::locate(desktop, &target)?.ok_or(ToolError::TargetNotFound)?;
            let vk = usize::from(keymap::virtual_key(desktop, &request.key)?);
            for i in 0..request.repeat {
                if action.sends_down() {
                    desktop.post_message(hwnd, WM_KEYDOWN, vk, 0)?;
                }
                if action.sends_up() {
                    desktop.post_message(hwnd, WM_KEYUP, vk, 0)?;
                }
                if i + 1 < request.repeat {
                    pause(request.interval_ms).await;
                }
            }
        }
    }

    let text = format!(
        "key ok: mode={} key={} action={} repeat={}",
        request.mode.as_str(),
        request.key,
        action.as_str(),
        request.repeat
    );
    let metadata = json!({
        "mode": request.mode.as_str(),
        "key": request.key,
        "action": action.as_str(),
        "repeat": request.repeat,
    });

    Ok(ToolResult::text(text, metadata))
}
