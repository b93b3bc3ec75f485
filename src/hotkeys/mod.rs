//! Global hotkeys.
//!
//! Bindings are strings such as `num_1` or `ctrl+shift+s`. They are parsed
//! into [`Hotkey`]s carrying Windows virtual-key codes and modifier bits, so
//! the listener can register them directly.

#[cfg(windows)]
pub mod listener;

use anyhow::{anyhow, Result};

use crate::calibration::ToolKind;
use crate::config::HotkeyConfig;
use crate::log;

/// What a hotkey asks the session to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Screenshot, scan and compute a new plan.
    CalculatePlan,
    /// Replay the stored plan.
    ExecuteSort,
    /// Start or advance a calibration tool.
    Calibrate(ToolKind),
    /// Persist the current geometry to config.json.
    SaveGeometry,
    Exit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::CalculatePlan => write!(f, "calculate & plan"),
            Action::ExecuteSort => write!(f, "execute sort"),
            Action::Calibrate(tool) => write!(f, "calibrate {}", tool),
            Action::SaveGeometry => write!(f, "save geometry"),
            Action::Exit => write!(f, "exit"),
        }
    }
}

pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;

const VK_NUMPAD0: u32 = 0x60;
const VK_MULTIPLY: u32 = 0x6A;
const VK_ADD: u32 = 0x6B;
const VK_SUBTRACT: u32 = 0x6D;
const VK_DECIMAL: u32 = 0x6E;
const VK_DIVIDE: u32 = 0x6F;
const VK_F1: u32 = 0x70;

/// A parsed key combination.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hotkey {
    /// `MOD_*` bits.
    pub modifiers: u32,
    /// Windows virtual-key code.
    pub vk: u32,
    /// Normalized binding text, for logs.
    pub label: String,
}

impl std::fmt::Display for Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

impl Hotkey {
    /// Parses a `+`-separated, case-insensitive binding.
    ///
    /// The last part is the key; all earlier parts must be modifiers.
    pub fn parse(text: &str) -> Result<Hotkey> {
        let normalized = text.trim().to_ascii_lowercase();
        let parts: Vec<&str> = normalized.split('+').map(str::trim).collect();

        // "num_plus" is spelled out, so a literal '+' never reaches here as a key.
        let Some((key, modifier_parts)) = parts.split_last() else {
            return Err(anyhow!("Empty hotkey"));
        };
        if key.is_empty() {
            return Err(anyhow!("Hotkey '{}' has no key", text));
        }

        let mut modifiers = 0;
        for part in modifier_parts {
            modifiers |= match *part {
                "ctrl" | "control" => MOD_CONTROL,
                "shift" => MOD_SHIFT,
                "alt" => MOD_ALT,
                "win" => MOD_WIN,
                other => return Err(anyhow!("Unknown modifier '{}' in '{}'", other, text)),
            };
        }

        let vk = key_code(key).ok_or_else(|| anyhow!("Unknown key '{}' in '{}'", key, text))?;

        Ok(Hotkey {
            modifiers,
            vk,
            label: parts.join("+"),
        })
    }
}

/// Maps a key name to its virtual-key code.
fn key_code(name: &str) -> Option<u32> {
    match name {
        "num_plus" => return Some(VK_ADD),
        "num_minus" => return Some(VK_SUBTRACT),
        "num_multiply" => return Some(VK_MULTIPLY),
        "num_divide" => return Some(VK_DIVIDE),
        "num_decimal" => return Some(VK_DECIMAL),
        _ => {}
    }

    if let Some(digit) = name.strip_prefix("num_") {
        let n: u32 = digit.parse().ok()?;
        return (n <= 9 && digit.len() == 1).then_some(VK_NUMPAD0 + n);
    }

    if let Some(number) = name.strip_prefix('f') {
        if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
            let n: u32 = number.parse().ok()?;
            return (1..=24).contains(&n).then(|| VK_F1 + n - 1);
        }
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => Some(c.to_ascii_uppercase() as u32),
        (Some(c), None) if c.is_ascii_digit() => Some(c as u32),
        _ => None,
    }
}

/// Parses every configured binding, skipping the ones that fail.
pub fn resolve_bindings(config: &HotkeyConfig) -> Vec<(Hotkey, Action)> {
    let mut resolved: Vec<(Hotkey, Action)> = Vec::new();

    for (action, text) in config.bindings() {
        let hotkey = match Hotkey::parse(text) {
            Ok(hotkey) => hotkey,
            Err(e) => {
                log(&format!("WARN: Hotkey for {} skipped: {}", action, e));
                continue;
            }
        };

        if let Some((_, taken)) = resolved.iter().find(|(h, _)| *h == hotkey) {
            log(&format!(
                "WARN: Hotkey '{}' for {} already bound to {}, skipped.",
                hotkey, action, taken
            ));
            continue;
        }

        resolved.push((hotkey, action));
    }

    resolved
}
