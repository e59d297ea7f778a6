//! Click tool implementation

use super::{ToolResult, pause};
use crate::constants::{
    MK_LBUTTON, MK_MBUTTON, MK_RBUTTON, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_RBUTTONDOWN, WM_RBUTTONUP,
};
use crate::coords::{self, Point};
use crate::errors::ToolError;
use crate::platform::{Desktop, MouseButton};
use crate::requests::{ClickRequest, InputMode};
use crate::window;
use serde_json::json;

/// Down message, up message and button-state flag for a button
fn button_messages(button: MouseButton) -> (u32, u32, usize) {
    match button {
        MouseButton::Left => (WM_LBUTTONDOWN, WM_LBUTTONUP, MK_LBUTTON),
        MouseButton::Right => (WM_RBUTTONDOWN, WM_RBUTTONUP, MK_RBUTTON),
        MouseButton::Middle => (WM_MBUTTONDOWN, WM_MBUTTONUP, MK_MBUTTON),
    }
}

/// Pack client coordinates the way mouse messages expect them in lParam
pub fn make_lparam(point: Point) -> isize {
    let low = (point.x as u32) & 0xFFFF;
    let high = (point.y as u32) & 0xFFFF;
    ((high << 16) | low) as isize
}

/// Click at a normalized position inside the target rect
pub async fn run<D: Desktop + ?Sized>(
    desktop: &D,
    request: ClickRequest,
    default_class: Option<&str>,
) -> Result<ToolResult, ToolError> {
    let target = request.window_target(default_class);
    let rect = coords::rect_for(desktop, request.target, &target)?;
    let screen = coords::to_screen(&rect, request.x, request.y);

    match request.mode {
        InputMode::DirectInput => {
            desktop.move_cursor(screen)?;
            for i in 0..request.clicks {
                desktop.mouse_click(request.button)?;
                if i + 1 < request.clicks {
                    pause(request.interval_ms).await;
                }
            }
        }
        InputMode::PostMessage => {
            // Resolved again so screen targets also deliver to a window
            let hwnd = window::locate(desktop, &target)?.ok_or(ToolError::TargetNotFound)?;
            let client = desktop
                .screen_to_client(hwnd, screen)
                .ok_or(ToolError::WindowQuery("screen-to-client"))?;
            let lparam = make_lparam(client);
            let (down, up, flag) = button_messages(request.button);

            for i in 0..request.clicks {
                desktop.post_message(hwnd, down, flag, lparam)?;
                desktop.post_message(hwnd, up, 0, lparam)?;
                if i + 1 < request.clicks {
                    pause(request.interval_ms).await;
                }
            }
        }
    }

    let text = format!(
        "click ok: target={} mode={} button={} at x={:.4},y={:.4} (screen {},{}) clicks={}",
        request.target.as_str(),
        request.mode.as_str(),
        request.button.as_str(),
        request.x,
        request.y,
        screen.x,
        screen.y,
        request.clicks
    );
    let metadata = json!({
        "target": request.target.as_str(),
        "mode": request.mode.as_str(),
        "button": request.button.as_str(),
        "x": request.x,
        "y": request.y,
        "screen": screen,
        "rect": rect,
        "clicks": request.clicks,
    });

    Ok(ToolResult::text(text, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::platform::WindowHandle;
    use crate::platform::fake::{Event, FakeDesktop, FakeWindow};
    use crate::requests::parse;
    use std::time::Instant;

    fn game() -> FakeDesktop {
        FakeDesktop::new().with_display(1920, 1080).with_window(
            FakeWindow::new(7, "UnityWndClass", "Game")
                .frame(Rect::new(100, 100, 916, 739))
                .client(Point::new(108, 131), 800, 600),
        )
    }

    #[test]
    fn test_make_lparam() {
        assert_eq!(make_lparam(Point::new(400, 300)), (300 << 16) | 400);
        assert_eq!(make_lparam(Point::new(0, 0)), 0);
        // negative client coordinates keep only their low 16 bits
        assert_eq!(make_lparam(Point::new(-1, 2)), (2 << 16) | 0xFFFF);
    }

    #[tokio::test]
    async fn test_postmessage_click_center() {
        let desktop = game();
        let request = parse(json!({"x": 0.5, "y": 0.5})).unwrap();
        let result = run(&desktop, request, Some("UnityWndClass")).await.unwrap();

        let hwnd = WindowHandle(7);
        let lparam = (300 << 16) | 400;
        assert_eq!(
            desktop.events(),
            vec![
                Event::Posted {
                    hwnd,
                    msg: WM_LBUTTONDOWN,
                    wparam: MK_LBUTTON,
                    lparam
                },
                Event::Posted {
                    hwnd,
                    msg: WM_LBUTTONUP,
                    wparam: 0,
                    lparam
                },
            ]
        );

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["content"][0]["text"],
            json!(
                "click ok: target=window mode=postmessage button=left at x=0.5000,y=0.5000 (screen 508,431) clicks=1"
            )
        );
        assert_eq!(value["metadata"]["screen"], json!({"x": 508, "y": 431}));
        assert_eq!(
            value["metadata"]["rect"],
            json!({"left": 108, "top": 131, "right": 908, "bottom": 731})
        );
    }

    #[tokio::test]
    async fn test_postmessage_right_double_click() {
        let desktop = game();
        let request =
            parse(json!({"x": 0, "y": 0, "button": "right", "clicks": 2, "interval_ms": 0}))
                .unwrap();
        run(&desktop, request, Some("UnityWndClass")).await.unwrap();

        let events = desktop.events();
        assert_eq!(events.len(), 4);
        let messages: Vec<(u32, usize)> = events
            .iter()
            .map(|e| match e {
                Event::Posted { msg, wparam, .. } => (*msg, *wparam),
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(
            messages,
            vec![
                (WM_RBUTTONDOWN, MK_RBUTTON),
                (WM_RBUTTONUP, 0),
                (WM_RBUTTONDOWN, MK_RBUTTON),
                (WM_RBUTTONUP, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_direct_input_click() {
        let desktop = game();
        let request = parse(json!({
            "x": 1,
            "y": 1,
            "mode": "pydirectinput",
            "button": "middle",
            "clicks": 3,
            "interval_ms": 0
        }))
        .unwrap();
        run(&desktop, request, Some("UnityWndClass")).await.unwrap();

        assert_eq!(
            desktop.events(),
            vec![
                Event::MoveCursor(Point::new(908, 731)),
                Event::Click(MouseButton::Middle),
                Event::Click(MouseButton::Middle),
                Event::Click(MouseButton::Middle),
            ]
        );
    }

    #[tokio::test]
    async fn test_screen_target_direct_input() {
        let desktop = FakeDesktop::new().with_display(1920, 1080);
        let request =
            parse(json!({"x": 0.25, "y": 0.75, "target": "screen", "mode": "pydirectinput"}))
                .unwrap();
        let result = run(&desktop, request, None).await.unwrap();
        assert_eq!(desktop.events()[0], Event::MoveCursor(Point::new(480, 810)));
        assert_eq!(result.metadata["target"], json!("screen"));
    }

    #[tokio::test]
    async fn test_interval_only_between_clicks() {
        let desktop = game();
        let request = parse(json!({"x": 0.5, "y": 0.5, "clicks": 2, "interval_ms": 30})).unwrap();
        let started = Instant::now();
        run(&desktop, request, Some("UnityWndClass")).await.unwrap();
        let elapsed = started.elapsed().as_millis();
        assert!(elapsed >= 30, "elapsed {}ms", elapsed);

        // a single click never sleeps
        let request = parse(json!({"x": 0.5, "y": 0.5, "interval_ms": 5000})).unwrap();
        let started = Instant::now();
        run(&desktop, request, Some("UnityWndClass")).await.unwrap();
        assert!(started.elapsed().as_millis() < 5000);
    }

    #[tokio::test]
    async fn test_missing_window() {
        let desktop = FakeDesktop::new().with_display(1920, 1080);
        let request = parse(json!({"x": 0.5, "y": 0.5, "hwnd_class": "Nope"})).unwrap();
        let err = run(&desktop, request, None).await.unwrap_err();
        assert!(matches!(err, ToolError::TargetNotFound));
        assert!(desktop.events().is_empty());
    }

    #[tokio::test]
    async fn test_screen_target_postmessage_needs_window() {
        let desktop = FakeDesktop::new().with_display(1920, 1080);
        let request = parse(json!({"x": 0.5, "y": 0.5, "target": "screen"})).unwrap();
        let err = run(&desktop, request, None).await.unwrap_err();
        assert_eq!(err.to_string(), "target window not found");
    }
}
