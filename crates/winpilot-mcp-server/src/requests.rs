//! MCP tool request types
//!
//! This module contains the argument types of the four tools. The JSON Schema
//! advertised by `tools/list` is derived from these types, and `validate`
//! enforces the same bounds at call time.

use crate::constants::{
    DEFAULT_CLICK_INTERVAL_MS, DEFAULT_JPEG_QUALITY, DEFAULT_KEY_INTERVAL_MS, DEFAULT_MAX_HEIGHT,
    DEFAULT_MAX_WIDTH, DEFAULT_WAIT_MS,
};
use crate::coords::TargetKind;
use crate::errors::ToolError;
use crate::platform::MouseButton;
use crate::window::WindowTarget;
use rmcp::schemars;
use serde::de::{self, DeserializeOwned, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;

/// Encoded image format of a capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// How input reaches the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub enum InputMode {
    /// Window messages posted straight to the target window
    #[default]
    #[serde(rename = "postmessage")]
    PostMessage,
    /// System-wide input events, like a physical device
    #[serde(rename = "pydirectinput")]
    DirectInput,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PostMessage => "postmessage",
            Self::DirectInput => "pydirectinput",
        }
    }
}

/// Which key transitions to send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    /// Key down followed by key up
    #[default]
    Press,
    Down,
    Up,
}

impl KeyAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Down => "down",
            Self::Up => "up",
        }
    }

    pub fn sends_down(self) -> bool {
        matches!(self, Self::Press | Self::Down)
    }

    pub fn sends_up(self) -> bool {
        matches!(self, Self::Press | Self::Up)
    }
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_MAX_HEIGHT
}

fn default_one() -> u32 {
    1
}

fn default_click_interval() -> u64 {
    DEFAULT_CLICK_INTERVAL_MS
}

fn default_key_interval() -> u64 {
    DEFAULT_KEY_INTERVAL_MS
}

fn default_wait_ms() -> u64 {
    DEFAULT_WAIT_MS
}

/// Integer field that also accepts whole floats such as `10.0`
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let value = match (number.as_u64(), number.as_i64(), number.as_f64()) {
        (Some(u), _, _) => u,
        (None, Some(i), _) => {
            return Err(de::Error::invalid_value(
                Unexpected::Signed(i),
                &"a non-negative integer",
            ));
        }
        (None, None, Some(f)) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => f as u64,
        (None, None, Some(f)) => {
            return Err(de::Error::invalid_value(
                Unexpected::Float(f),
                &"a non-negative integer",
            ));
        }
        (None, None, None) => {
            return Err(de::Error::invalid_type(
                Unexpected::Other("number"),
                &"a non-negative integer",
            ));
        }
    };
    T::try_from(value).map_err(|_| {
        de::Error::invalid_value(Unexpected::Unsigned(value), &"an integer in range")
    })
}

/// Bounds checks run after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), ToolError>;
}

fn check_range<T: PartialOrd + Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ToolError> {
    if value < min || value > max {
        return Err(ToolError::invalid(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Deserialize and validate tool arguments
pub fn parse<T: DeserializeOwned + Validate>(arguments: Value) -> Result<T, ToolError> {
    let request: T = serde_json::from_value(arguments)
        .map_err(|e| ToolError::invalid(format!("invalid arguments: {}", e)))?;
    request.validate()?;
    Ok(request)
}

/// Pick the class filter, falling back to the configured default
fn class_filter(requested: &Option<String>, default_class: Option<&str>) -> Option<String> {
    requested
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(default_class)
        .map(str::to_string)
}

/// Request for capture tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CaptureRequest {
    #[serde(default)]
    #[schemars(description = "Capture the target window or the whole primary screen")]
    pub target: TargetKind,
    #[schemars(description = "Exact window class name (defaults to the configured class)")]
    pub hwnd_class: Option<String>,
    #[schemars(description = "Case-insensitive substring of the window title")]
    pub title_contains: Option<String>,
    #[serde(default)]
    #[schemars(description = "Include borders and title bar instead of the client area only")]
    pub include_window_frame: bool,
    #[serde(default)]
    #[schemars(description = "Image encoding")]
    pub format: ImageFormat,
    #[serde(default = "default_quality", deserialize_with = "whole_number")]
    #[schemars(range(min = 1, max = 95), description = "JPEG quality")]
    pub quality: u8,
    #[serde(default = "default_max_width", deserialize_with = "whole_number")]
    #[schemars(range(min = 64, max = 4096), description = "Maximum output width in pixels")]
    pub max_width: u32,
    #[serde(default = "default_max_height", deserialize_with = "whole_number")]
    #[schemars(range(min = 64, max = 4096), description = "Maximum output height in pixels")]
    pub max_height: u32,
}

impl CaptureRequest {
    pub fn window_target(&self, default_class: Option<&str>) -> WindowTarget {
        WindowTarget::new(
            class_filter(&self.hwnd_class, default_class),
            self.title_contains.clone(),
            self.include_window_frame,
        )
    }
}

impl Validate for CaptureRequest {
    fn validate(&self) -> Result<(), ToolError> {
        check_range("quality", self.quality, 1, 95)?;
        check_range("max_width", self.max_width, 64, 4096)?;
        check_range("max_height", self.max_height, 64, 4096)
    }
}

/// Request for click tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClickRequest {
    #[schemars(range(min = 0.0, max = 1.0), description = "Normalized x within the target rect")]
    pub x: f64,
    #[schemars(range(min = 0.0, max = 1.0), description = "Normalized y within the target rect")]
    pub y: f64,
    #[serde(default)]
    #[schemars(description = "Coordinates are relative to the target window or the primary screen")]
    pub target: TargetKind,
    #[schemars(description = "Exact window class name (defaults to the configured class)")]
    pub hwnd_class: Option<String>,
    #[schemars(description = "Case-insensitive substring of the window title")]
    pub title_contains: Option<String>,
    #[serde(default)]
    #[schemars(description = "Normalize against the outer window rect instead of the client area")]
    pub include_window_frame: bool,
    #[serde(default)]
    #[schemars(description = "Post window messages or inject system mouse events")]
    pub mode: InputMode,
    #[serde(default)]
    #[schemars(description = "Mouse button")]
    pub button: MouseButton,
    #[serde(default = "default_one", deserialize_with = "whole_number")]
    #[schemars(range(min = 1, max = 10), description = "Number of clicks")]
    pub clicks: u32,
    #[serde(default = "default_click_interval", deserialize_with = "whole_number")]
    #[schemars(range(min = 0, max = 5000), description = "Delay between clicks in milliseconds")]
    pub interval_ms: u64,
}

impl ClickRequest {
    pub fn window_target(&self, default_class: Option<&str>) -> WindowTarget {
        WindowTarget::new(
            class_filter(&self.hwnd_class, default_class),
            self.title_contains.clone(),
            self.include_window_frame,
        )
    }
}

impl Validate for ClickRequest {
    fn validate(&self) -> Result<(), ToolError> {
        check_range("x", self.x, 0.0, 1.0)?;
        check_range("y", self.y, 0.0, 1.0)?;
        check_range("clicks", self.clicks, 1, 10)?;
        check_range("interval_ms", self.interval_ms, 0, 5000)
    }
}

/// Request for key tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeyRequest {
    #[schemars(description = "Key name (e.g., 'enter', 'esc', 'space', 'f5', 'a', 'up')")]
    pub key: String,
    #[schemars(description = "Exact window class name (defaults to the configured class)")]
    pub hwnd_class: Option<String>,
    #[schemars(description = "Case-insensitive substring of the window title")]
    pub title_contains: Option<String>,
    #[serde(default)]
    #[schemars(description = "Post window messages or inject system key events")]
    pub mode: InputMode,
    #[serde(default)]
    #[schemars(description = "Send key down and up, only down, or only up")]
    pub action: KeyAction,
    #[serde(default = "default_one", deserialize_with = "whole_number")]
    #[schemars(range(min = 1, max = 50), description = "Number of repetitions")]
    pub repeat: u32,
    #[serde(default = "default_key_interval", deserialize_with = "whole_number")]
    #[schemars(range(min = 0, max = 5000), description = "Delay between repetitions in milliseconds")]
    pub interval_ms: u64,
}

impl KeyRequest {
    pub fn window_target(&self, default_class: Option<&str>) -> WindowTarget {
        WindowTarget::new(
            class_filter(&self.hwnd_class, default_class),
            self.title_contains.clone(),
            false,
        )
    }
}

impl Validate for KeyRequest {
    fn validate(&self) -> Result<(), ToolError> {
        check_range("repeat", self.repeat, 1, 50)?;
        check_range("interval_ms", self.interval_ms, 0, 5000)
    }
}

/// Request for wait tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WaitRequest {
    #[serde(default = "default_wait_ms", deserialize_with = "whole_number")]
    #[schemars(range(min = 0, max = 600000), description = "Duration in milliseconds")]
    pub ms: u64,
}

impl Validate for WaitRequest {
    fn validate(&self) -> Result<(), ToolError> {
        check_range("ms", self.ms, 0, 600_000)
    }
}
