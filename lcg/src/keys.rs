//! Key normalisation and key-to-command dispatch.
//!
//! Raw key events carry a legacy key code and modifier flags. [`KeyCombo`]
//! turns them into a canonical name such as `Ctrl-Shift-Right`, and a
//! [`Keymap`] maps those names to widget commands.

use std::collections::HashMap;

use lcgdom::{Event, EventKind, Modifiers, NodeId};
use thiserror::Error;

use crate::page::Page;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letter key, always lowercase
    Char(char),
    Backspace,
    Enter,
    Escape,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
}

impl Key {
    /// Map a legacy `which` key code to a key.
    ///
    /// Letters A-Z (65-90) map to lowercase characters; only the named keys
    /// the widgets bind are recognised, everything else is `None`.
    pub fn from_key_code(code: u32) -> Option<Self> {
        let key = match code {
            65..=90 => Key::Char(char::from_u32(code)?.to_ascii_lowercase()),
            8 => Key::Backspace,
            10 | 13 => Key::Enter,
            27 => Key::Escape,
            32 => Key::Space,
            33 => Key::PageUp,
            34 => Key::PageDown,
            35 => Key::End,
            36 => Key::Home,
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            _ => return None,
        };
        Some(key)
    }

    /// The legacy key code producing this key (the canonical one for Enter).
    pub fn key_code(&self) -> u32 {
        match self {
            Key::Char(c) => c.to_ascii_uppercase() as u32,
            Key::Backspace => 8,
            Key::Enter => 13,
            Key::Escape => 27,
            Key::Space => 32,
            Key::PageUp => 33,
            Key::PageDown => 34,
            Key::End => 35,
            Key::Home => 36,
            Key::Left => 37,
            Key::Up => 38,
            Key::Right => 39,
            Key::Down => 40,
        }
    }

    fn name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Backspace => "Backspace".into(),
            Key::Enter => "Enter".into(),
            Key::Escape => "Escape".into(),
            Key::Space => "Space".into(),
            Key::PageUp => "PageUp".into(),
            Key::PageDown => "PageDown".into(),
            Key::End => "End".into(),
            Key::Home => "Home".into(),
            Key::Left => "Left".into(),
            Key::Up => "Up".into(),
            Key::Right => "Right".into(),
            Key::Down => "Down".into(),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Backspace" => Key::Backspace,
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            "Space" => Key::Space,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "End" => Key::End,
            "Home" => Key::Home,
            "Left" => Key::Left,
            "Up" => Key::Up,
            "Right" => Key::Right,
            "Down" => Key::Down,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_lowercase() => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// A key combination (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    /// The key code
    pub key: Key,
    /// Modifier keys
    pub modifiers: Modifiers,
}

impl KeyCombo {
    /// Create a new key combo
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Create a key combo without modifiers
    pub const fn key(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Add ctrl modifier
    pub const fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    /// Add shift modifier
    pub const fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    /// Add alt modifier
    pub const fn alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    /// Normalise a key event. Returns `None` for non-key events and
    /// unmapped key codes.
    pub fn from_event(event: &Event) -> Option<Self> {
        if event.kind != EventKind::KeyDown {
            return None;
        }
        Key::from_key_code(event.key_code).map(|key| Self::new(key, event.modifiers))
    }
}

/// Canonical modifier-qualified name of a key event, e.g. `Ctrl-Shift-Up`.
pub fn event_key(event: &Event) -> Option<String> {
    KeyCombo::from_event(event).map(|combo| combo.to_string())
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl-")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt-")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift-")?;
        }
        f.write_str(&self.key.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key name {0:?}")]
pub struct KeyParseError(pub String);

impl std::str::FromStr for KeyCombo {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::NONE;
        let mut rest = s;
        loop {
            if let Some(r) = rest.strip_prefix("Ctrl-") {
                modifiers.ctrl = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("Alt-") {
                modifiers.alt = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("Shift-") {
                modifiers.shift = true;
                rest = r;
            } else {
                break;
            }
        }
        Key::from_name(rest)
            .map(|key| Self::new(key, modifiers))
            .ok_or_else(|| KeyParseError(s.to_string()))
    }
}

// =============================================================================
// Commands
// =============================================================================

/// What a command wants done with the event that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// Prevent the browser default and stop propagation.
    Handled,
    /// Leave the event alone.
    PassThrough,
}

/// A widget command bound to a key. Receives the event and the node the
/// event was targeted at.
pub type Command<W> = fn(&mut W, &mut Event, NodeId, &mut Page) -> CommandResult;

/// Key binding table of one widget instance.
pub struct Keymap<W> {
    binds: HashMap<KeyCombo, Command<W>>,
}

impl<W> Default for Keymap<W> {
    fn default() -> Self {
        Self {
            binds: HashMap::new(),
        }
    }
}

impl<W> std::fmt::Debug for Keymap<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.binds.keys().map(KeyCombo::to_string).collect();
        keys.sort();
        f.debug_struct("Keymap").field("keys", &keys).finish()
    }
}

impl<W> Keymap<W> {
    /// Create an empty keymap
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key combination to a command
    pub fn bind(mut self, key: KeyCombo, command: Command<W>) -> Self {
        self.binds.insert(key, command);
        self
    }

    /// Look up the command for a key combination
    pub fn get(&self, key: &KeyCombo) -> Option<Command<W>> {
        self.binds.get(key).copied()
    }

    pub fn contains(&self, key: &KeyCombo) -> bool {
        self.binds.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}

/// Dispatches key events to the commands of a widget's keymap.
pub trait KeyHandler: Sized {
    fn keymap(&self) -> &Keymap<Self>;

    /// Handle a key press. Returns true if a command handled it.
    ///
    /// Unbound keys are left untouched so the browser can process them
    /// normally (Tab navigation in particular).
    fn on_key_down(&mut self, event: &mut Event, page: &mut Page) -> bool {
        let Some(combo) = KeyCombo::from_event(event) else {
            return false;
        };
        let Some(command) = self.keymap().get(&combo) else {
            log::trace!("[keys] unbound {combo}");
            return false;
        };
        log::trace!("[keys] {combo} on {}", event.target);
        let target = event.target;
        match command(self, event, target, page) {
            CommandResult::Handled => {
                event.prevent_default();
                event.stop_propagation();
                true
            }
            CommandResult::PassThrough => false,
        }
    }
}
