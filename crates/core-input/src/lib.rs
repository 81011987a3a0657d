//! Native keyboard and mouse events to the editor's bracketed key notation.
//!
//! `KeyTranslator::translate` is a pure function of one `KeyInput` and the platform modifier
//! bindings chosen at startup. An empty result means "suppress, do not forward".

pub mod mouse;
pub mod platform;
pub mod terminal;
pub mod translate;

pub use mouse::{MouseAction, MouseButton, MouseInput, MouseNotation};
pub use platform::{ModifierBindings, ParsePlatformError, PlatformId};
pub use translate::KeyTranslator;

bitflags::bitflags! {
    /// Native modifier bits as reported by the host toolkit. Which bit means "control" or
    /// "command" to the editor is decided by `ModifierBindings`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT     = 0b0000_0100;
        const META    = 0b0000_1000;
        /// Key originated on the numeric keypad.
        const KEYPAD  = 0b0001_0000;
    }
}

/// Bare modifier keys; pressing one alone never produces output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Meta,
}

/// Native key identity, independent of the composed text it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key. For letters the identity is case-insensitive; the translator applies
    /// case from the shift state when it reads the key instead of the text.
    Char(char),
    Up,
    Down,
    Left,
    Right,
    F(u8),
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    /// Main-block Return.
    Return,
    /// Keypad Enter.
    Enter,
    Tab,
    Backtab,
    Escape,
    Backslash,
    Space,
    Modifier(ModifierKey),
    /// Anything the host reported that has no notation (media keys, caps lock).
    Unknown,
}

/// One native key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInput {
    /// Composed text (after IME / keyboard layout); may be empty.
    pub text: String,
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(text: impl Into<String>, key: Key, modifiers: Modifiers) -> Self {
        Self {
            text: text.into(),
            key,
            modifiers,
        }
    }

    /// Printable character key whose text is the character itself.
    pub fn char(c: char, modifiers: Modifiers) -> Self {
        Self::new(c.to_string(), Key::Char(c), modifiers)
    }
}
