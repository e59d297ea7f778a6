//! In-memory desktop used by unit tests

use super::{Desktop, MouseButton, PlatformError, WindowHandle};
use crate::coords::{Point, Rect};
use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use std::collections::HashMap;

/// A window on the fake desktop
#[derive(Debug, Clone)]
pub struct FakeWindow {
    handle: WindowHandle,
    class_name: String,
    title: String,
    frame: Rect,
    client_origin: Point,
    client_size: (i32, i32),
    visible: bool,
    vanished: bool,
}

impl FakeWindow {
    pub fn new(handle: isize, class_name: &str, title: &str) -> Self {
        Self {
            handle: WindowHandle(handle),
            class_name: class_name.to_string(),
            title: title.to_string(),
            frame: Rect::new(0, 0, 100, 100),
            client_origin: Point::new(0, 0),
            client_size: (100, 100),
            visible: true,
            vanished: false,
        }
    }

    /// Outer rect; the client area defaults to the same rect
    pub fn frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self.client_origin = Point::new(frame.left, frame.top);
        self.client_size = (frame.right - frame.left, frame.bottom - frame.top);
        self
    }

    pub fn client(mut self, origin: Point, width: i32, height: i32) -> Self {
        self.client_origin = origin;
        self.client_size = (width, height);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Still enumerated, but every query on it fails
    pub fn vanished(mut self) -> Self {
        self.vanished = true;
        self
    }
}

/// Something the code under test asked the desktop to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Posted {
        hwnd: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    },
    MoveCursor(Point),
    Click(MouseButton),
    Key { vk: u8, down: bool },
    Capture(Rect),
}

#[derive(Debug, Default)]
pub struct FakeDesktop {
    windows: Vec<FakeWindow>,
    display: Option<(i32, i32)>,
    scan_codes: HashMap<char, u8>,
    fail_enumeration: bool,
    events: RefCell<Vec<Event>>,
}

impl FakeDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: FakeWindow) -> Self {
        self.windows.push(window);
        self
    }

    pub fn with_display(mut self, width: i32, height: i32) -> Self {
        self.display = Some((width, height));
        self
    }

    pub fn with_scan_code(mut self, ch: char, vk: u8) -> Self {
        self.scan_codes.insert(ch, vk);
        self
    }

    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn live(&self, hwnd: WindowHandle) -> Option<&FakeWindow> {
        self.windows
            .iter()
            .find(|w| w.handle == hwnd)
            .filter(|w| !w.vanished)
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl Desktop for FakeDesktop {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>, PlatformError> {
        if self.fail_enumeration {
            return Err(PlatformError::os("EnumWindows", "fake failure"));
        }
        Ok(self.windows.iter().map(|w| w.handle).collect())
    }

    fn is_visible(&self, hwnd: WindowHandle) -> Option<bool> {
        self.live(hwnd).map(|w| w.visible)
    }

    fn class_name(&self, hwnd: WindowHandle) -> Option<String> {
        self.live(hwnd).map(|w| w.class_name.clone())
    }

    fn title(&self, hwnd: WindowHandle) -> Option<String> {
        self.live(hwnd).map(|w| w.title.clone())
    }

    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        self.live(hwnd).map(|w| w.frame)
    }

    fn client_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        self.live(hwnd)
            .map(|w| Rect::new(0, 0, w.client_size.0, w.client_size.1))
    }

    fn client_to_screen(&self, hwnd: WindowHandle, point: Point) -> Option<Point> {
        self.live(hwnd).map(|w| {
            Point::new(point.x + w.client_origin.x, point.y + w.client_origin.y)
        })
    }

    fn screen_to_client(&self, hwnd: WindowHandle, point: Point) -> Option<Point> {
        self.live(hwnd).map(|w| {
            Point::new(point.x - w.client_origin.x, point.y - w.client_origin.y)
        })
    }

    fn primary_display_size(&self) -> Option<(i32, i32)> {
        self.display
    }

    fn capture(&self, rect: Rect) -> Result<RgbaImage, PlatformError> {
        self.record(Event::Capture(rect));
        let (w, h) = (rect.width() as u32, rect.height() as u32);
        Ok(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        }))
    }

    fn post_message(
        &self,
        hwnd: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<(), PlatformError> {
        if self.live(hwnd).is_none() {
            return Err(PlatformError::os("PostMessageW", "invalid window handle"));
        }
        self.record(Event::Posted {
            hwnd,
            msg,
            wparam,
            lparam,
        });
        Ok(())
    }

    fn scan_virtual_key(&self, ch: char) -> Option<u8> {
        self.scan_codes.get(&ch).copied()
    }

    fn move_cursor(&self, point: Point) -> Result<(), PlatformError> {
        self.record(Event::MoveCursor(point));
        Ok(())
    }

    fn mouse_click(&self, button: MouseButton) -> Result<(), PlatformError> {
        self.record(Event::Click(button));
        Ok(())
    }

    fn key_event(&self, vk: u8, down: bool) -> Result<(), PlatformError> {
        self.record(Event::Key { vk, down });
        Ok(())
    }
}
