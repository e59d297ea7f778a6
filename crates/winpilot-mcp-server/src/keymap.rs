//! Symbolic key name to Win32 virtual-key code
//!
//! Lookup order is fixed: exact alias, then `F1`..`F24`, then a single ASCII
//! letter or digit, then the keyboard layout's own scan lookup. The later tiers
//! are broader, so reordering them would shadow aliases such as `up` or `f5`.

use crate::errors::ToolError;
use crate::platform::Desktop;

const VK_BACK: u8 = 0x08;
const VK_TAB: u8 = 0x09;
const VK_RETURN: u8 = 0x0D;
const VK_SHIFT: u8 = 0x10;
const VK_CONTROL: u8 = 0x11;
const VK_MENU: u8 = 0x12;
const VK_ESCAPE: u8 = 0x1B;
const VK_SPACE: u8 = 0x20;
const VK_LEFT: u8 = 0x25;
const VK_UP: u8 = 0x26;
const VK_RIGHT: u8 = 0x27;
const VK_DOWN: u8 = 0x28;
const VK_DELETE: u8 = 0x2E;
const VK_F1: u8 = 0x70;
const VK_LSHIFT: u8 = 0xA0;
const VK_RSHIFT: u8 = 0xA1;
const VK_LCONTROL: u8 = 0xA2;
const VK_RCONTROL: u8 = 0xA3;
const VK_LMENU: u8 = 0xA4;
const VK_RMENU: u8 = 0xA5;

const ALIASES: &[(&str, u8)] = &[
    ("esc", VK_ESCAPE),
    ("escape", VK_ESCAPE),
    ("space", VK_SPACE),
    ("tab", VK_TAB),
    ("enter", VK_RETURN),
    ("return", VK_RETURN),
    ("backspace", VK_BACK),
    ("delete", VK_DELETE),
    ("up", VK_UP),
    ("down", VK_DOWN),
    ("left", VK_LEFT),
    ("right", VK_RIGHT),
    ("shift", VK_SHIFT),
    ("lshift", VK_LSHIFT),
    ("rshift", VK_RSHIFT),
    ("ctrl", VK_CONTROL),
    ("control", VK_CONTROL),
    ("lctrl", VK_LCONTROL),
    ("rctrl", VK_RCONTROL),
    ("alt", VK_MENU),
    ("menu", VK_MENU),
    ("lalt", VK_LMENU),
    ("ralt", VK_RMENU),
];

fn alias(key: &str) -> Option<u8> {
    ALIASES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, vk)| vk)
}

fn function_key(key: &str) -> Option<u8> {
    let digits = key.strip_prefix('f')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (1..=24).contains(&n).then(|| VK_F1 + (n - 1))
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Resolve a key name such as `enter`, `f5`, `a` or `/` to a virtual-key code
pub fn virtual_key<D: Desktop + ?Sized>(desktop: &D, name: &str) -> Result<u8, ToolError> {
    let key = name.trim().to_lowercase();

    if let Some(vk) = alias(&key) {
        return Ok(vk);
    }
    if let Some(vk) = function_key(&key) {
        return Ok(vk);
    }
    if let Some(c) = single_char(&key) {
        if c.is_ascii_alphanumeric() {
            return Ok(c.to_ascii_uppercase() as u8);
        }
        if let Some(vk) = desktop.scan_virtual_key(c) {
            return Ok(vk);
        }
    }
    Err(ToolError::UnsupportedKey(name.to_string()))
}
