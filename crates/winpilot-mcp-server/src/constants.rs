//! Constants used throughout the MCP server
//!
//! This module centralizes tool defaults and Win32 message codes.

/// Screen size used when display metrics cannot be queried
pub const FALLBACK_SCREEN_SIZE: (i32, i32) = (1920, 1080);

/// Default JPEG quality for captures
pub const DEFAULT_JPEG_QUALITY: u8 = 65;

/// Default capture bounds in pixels
pub const DEFAULT_MAX_WIDTH: u32 = 1280;
pub const DEFAULT_MAX_HEIGHT: u32 = 720;

/// Default delay between repeated clicks in milliseconds
pub const DEFAULT_CLICK_INTERVAL_MS: u64 = 60;

/// Default delay between repeated key strokes in milliseconds
pub const DEFAULT_KEY_INTERVAL_MS: u64 = 35;

/// Default duration of the wait tool in milliseconds
pub const DEFAULT_WAIT_MS: u64 = 250;

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "winpilot-mcp.json";

// Win32 window messages
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;

// Button-state flags carried in wParam of mouse messages
pub const MK_LBUTTON: usize = 0x0001;
pub const MK_RBUTTON: usize = 0x0002;
pub const MK_MBUTTON: usize = 0x0010;
