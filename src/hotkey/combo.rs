//! Key combination parsing and matching
//!
//! A combination such as `cmd+shift+g` is a set of modifiers plus exactly
//! one other key. Parsing is case-insensitive and ignores spaces.

use crate::error::HotkeyError;
use crate::mode::RewriteMode;
use rdev::{EventType, Key};
use std::str::FromStr;

/// Modifier state; left and right keys count the same
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub control: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Set the flag for a modifier name, returning false for other names
    fn set_by_name(&mut self, name: &str) -> bool {
        match name {
            "cmd" | "command" | "meta" | "super" | "win" => self.meta = true,
            "ctrl" | "control" => self.control = true,
            "alt" | "option" | "opt" => self.alt = true,
            "shift" => self.shift = true,
            _ => return false,
        }
        true
    }

    /// Set the flag for a physical modifier key, returning false otherwise
    fn set_by_key(&mut self, key: Key) -> bool {
        match key {
            Key::MetaLeft | Key::MetaRight => self.meta = true,
            Key::ControlLeft | Key::ControlRight => self.control = true,
            Key::Alt | Key::AltGr => self.alt = true,
            Key::ShiftLeft | Key::ShiftRight => self.shift = true,
            _ => return false,
        }
        true
    }

    /// Modifier state implied by a set of held keys
    pub fn from_held(held: &[Key]) -> Self {
        let mut modifiers = Self::default();
        for &key in held {
            modifiers.set_by_key(key);
        }
        modifiers
    }
}

fn is_modifier(key: Key) -> bool {
    Modifiers::default().set_by_key(key)
}

/// A parsed hotkey combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl FromStr for KeyCombo {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in normalized.split('+') {
            if modifiers.set_by_name(part) {
                continue;
            }

            let parsed = parse_key_name(part).ok_or_else(|| HotkeyError::UnknownKey {
                combo: s.to_string(),
                key: part.to_string(),
            })?;

            if key.replace(parsed).is_some() {
                return Err(HotkeyError::TooManyKeys(s.to_string()));
            }
        }

        let key = key.ok_or_else(|| HotkeyError::MissingKey(s.to_string()))?;
        Ok(Self { modifiers, key })
    }
}

/// Parse a non-modifier key name (lowercase) to an rdev Key
fn parse_key_name(name: &str) -> Option<Key> {
    let key = match name {
        // Letters
        "a" => Key::KeyA,
        "b" => Key::KeyB,
        "c" => Key::KeyC,
        "d" => Key::KeyD,
        "e" => Key::KeyE,
        "f" => Key::KeyF,
        "g" => Key::KeyG,
        "h" => Key::KeyH,
        "i" => Key::KeyI,
        "j" => Key::KeyJ,
        "k" => Key::KeyK,
        "l" => Key::KeyL,
        "m" => Key::KeyM,
        "n" => Key::KeyN,
        "o" => Key::KeyO,
        "p" => Key::KeyP,
        "q" => Key::KeyQ,
        "r" => Key::KeyR,
        "s" => Key::KeyS,
        "t" => Key::KeyT,
        "u" => Key::KeyU,
        "v" => Key::KeyV,
        "w" => Key::KeyW,
        "x" => Key::KeyX,
        "y" => Key::KeyY,
        "z" => Key::KeyZ,

        // Digits
        "0" => Key::Num0,
        "1" => Key::Num1,
        "2" => Key::Num2,
        "3" => Key::Num3,
        "4" => Key::Num4,
        "5" => Key::Num5,
        "6" => Key::Num6,
        "7" => Key::Num7,
        "8" => Key::Num8,
        "9" => Key::Num9,

        // Function keys
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        // Special keys
        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "enter" | "return" => Key::Return,
        "delete" => Key::Delete,
        "insert" => Key::Insert,

        // Navigation
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,

        _ => return None,
    };
    Some(key)
}

/// Turns raw key events into mode triggers.
///
/// Fires on the press of a binding's key when the held modifiers are
/// exactly the binding's modifiers. Auto-repeat presses of a key that is
/// already held are ignored.
#[derive(Debug, Default)]
pub struct ComboMatcher {
    bindings: Vec<(KeyCombo, RewriteMode)>,
    held: Vec<Key>,
}

impl ComboMatcher {
    pub fn new(bindings: Vec<(KeyCombo, RewriteMode)>) -> Self {
        Self {
            bindings,
            held: Vec::new(),
        }
    }

    /// Feed one event; returns the mode to trigger, if any
    pub fn handle(&mut self, event: &EventType) -> Option<RewriteMode> {
        match event {
            &EventType::KeyPress(key) => {
                if self.held.contains(&key) {
                    return None;
                }
                self.held.push(key);

                if is_modifier(key) {
                    return None;
                }

                let modifiers = Modifiers::from_held(&self.held);
                self.bindings
                    .iter()
                    .find(|(combo, _)| combo.key == key && combo.modifiers == modifiers)
                    .map(|&(_, mode)| mode)
            }
            &EventType::KeyRelease(key) => {
                self.held.retain(|&k| k != key);
                None
            }
            _ => None,
        }
    }
}
