//! Key notation translator.
//!
//! Priority order:
//! 1. keypad keys (under `Modifiers::KEYPAD`) map to `<kPlus>`, `<k0>`, `<Home>`, ...
//! 2. literal `<` becomes `<lt>`
//! 3. named keys from the special table, wrapped with the modifier prefix
//! 4. literal `\` becomes `<Bslash>`
//! 5. with control or command held the character comes from the key identity, lower-cased
//!    unless shift is held; a bare modifier key yields nothing
//! 6. otherwise the composed text is used
//! 7. shift is dropped from the prefix for single printable non-digit Latin-1 characters
//!
//! Key payloads are never logged; only lengths and discriminants.

use crate::{Key, KeyInput, ModifierBindings, Modifiers, PlatformId};
use tracing::trace;

#[derive(Clone, Copy, Debug)]
pub struct KeyTranslator {
    bindings: ModifierBindings,
}

impl KeyTranslator {
    pub fn new(platform: PlatformId) -> Self {
        Self {
            bindings: ModifierBindings::for_platform(platform),
        }
    }

    pub fn with_bindings(bindings: ModifierBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &ModifierBindings {
        &self.bindings
    }

    /// Translate one key press; `""` means suppress.
    pub fn translate(&self, input: &KeyInput) -> String {
        let out = self.translate_inner(input);
        trace!(
            target: "input.translate",
            key = ?discriminant(&input.key),
            text_len = input.text.len(),
            mods = input.modifiers.bits(),
            out_len = out.len(),
            "key_translated"
        );
        out
    }

    fn translate_inner(&self, input: &KeyInput) -> String {
        let mods = input.modifiers;
        let b = &self.bindings;

        if mods.contains(Modifiers::KEYPAD) {
            if let Some(name) = keypad_name(input.key) {
                return format!("<{}{}>", b.prefix(mods), name);
            }
        }

        if input.text == "<" {
            return "<lt>".to_string();
        }

        if let Some(name) = special_name(input.key) {
            return format!("<{}{}>", b.prefix(mods), name);
        }

        if input.text == "\\" {
            return format!("<{}Bslash>", b.prefix(mods));
        }

        let c = if b.is_control_or_command(mods) {
            match input.key {
                Key::Char(ch) if mods.intersects(b.shift) => ch.to_uppercase().collect(),
                Key::Char(ch) => ch.to_lowercase().collect(),
                _ => String::new(),
            }
        } else {
            input.text.clone()
        };
        if c.is_empty() {
            return String::new();
        }

        let mut mods = mods;
        if is_plain_printable(&c) {
            mods.remove(b.shift);
        }

        let prefix = b.prefix(mods);
        if prefix.is_empty() {
            c
        } else {
            format!("<{prefix}{c}>")
        }
    }
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new(PlatformId::current())
    }
}

fn keypad_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Home => "Home",
        Key::End => "End",
        Key::PageUp => "PageUp",
        Key::PageDown => "PageDown",
        Key::Enter | Key::Return => "kEnter",
        Key::Char('+') => "kPlus",
        Key::Char('-') => "kMinus",
        Key::Char('*') => "kMultiply",
        Key::Char('/') => "kDivide",
        Key::Char('.') => "kPoint",
        Key::Char('0') => "k0",
        Key::Char('1') => "k1",
        Key::Char('2') => "k2",
        Key::Char('3') => "k3",
        Key::Char('4') => "k4",
        Key::Char('5') => "k5",
        Key::Char('6') => "k6",
        Key::Char('7') => "k7",
        Key::Char('8') => "k8",
        Key::Char('9') => "k9",
        _ => return None,
    };
    Some(name)
}

const F_KEYS: [&str; 24] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14",
    "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
];

fn special_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Up => "Up",
        Key::Down => "Down",
        Key::Left => "Left",
        Key::Right => "Right",
        Key::F(n) => return F_KEYS.get(usize::from(n).checked_sub(1)?).copied(),
        Key::Backspace => "BS",
        Key::Delete => "Del",
        Key::Insert => "Insert",
        Key::Home => "Home",
        Key::End => "End",
        Key::PageUp => "PageUp",
        Key::PageDown => "PageDown",
        Key::Return | Key::Enter => "Enter",
        Key::Tab | Key::Backtab => "Tab",
        Key::Escape => "Esc",
        Key::Backslash => "Bslash",
        Key::Space => "Space",
        _ => return None,
    };
    Some(name)
}

/// Single printable, non-numeric character below U+0100: its glyph already reflects shift.
fn is_plain_printable(c: &str) -> bool {
    let mut chars = c.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => (ch as u32) < 0x100 && !ch.is_numeric() && !ch.is_control(),
        _ => false,
    }
}

fn discriminant(key: &Key) -> &'static str {
    match key {
        Key::Char(_) => "char",
        Key::Modifier(_) => "modifier",
        Key::F(_) => "function",
        Key::Unknown => "unknown",
        _ => "named",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModifierKey;
    use pretty_assertions::assert_eq;

    fn linux() -> KeyTranslator {
        KeyTranslator::new(PlatformId::Linux)
    }

    fn t(tr: &KeyTranslator, text: &str, key: Key, mods: Modifiers) -> String {
        tr.translate(&KeyInput::new(text, key, mods))
    }

    #[test]
    fn control_letter() {
        assert_eq!(t(&linux(), "a", Key::Char('A'), Modifiers::CONTROL), "<C-a>");
        assert_eq!(t(&linux(), "\u{1}", Key::Char('a'), Modifiers::CONTROL), "<C-a>");
    }

    #[test]
    fn less_than_escaped() {
        assert_eq!(t(&linux(), "<", Key::Char('<'), Modifiers::empty()), "<lt>");
        assert_eq!(t(&linux(), "<", Key::Char(','), Modifiers::SHIFT), "<lt>");
    }

    #[test]
    fn tab_is_named() {
        assert_eq!(t(&linux(), "\t", Key::Tab, Modifiers::empty()), "<Tab>");
        assert_eq!(t(&linux(), "", Key::Backtab, Modifiers::SHIFT), "<S-Tab>");
    }

    #[test]
    fn shift_dropped_for_printable() {
        assert_eq!(t(&linux(), "A", Key::Char('A'), Modifiers::SHIFT), "A");
        assert_eq!(t(&linux(), "é", Key::Char('é'), Modifiers::SHIFT), "é");
        assert_eq!(t(&linux(), "!", Key::Char('1'), Modifiers::SHIFT), "!");
    }

    #[test]
    fn shift_kept_for_digits_and_wide_chars() {
        assert_eq!(t(&linux(), "1", Key::Char('1'), Modifiers::SHIFT), "<S-1>");
        assert_eq!(t(&linux(), "界", Key::Char('界'), Modifiers::SHIFT), "<S-界>");
    }

    #[test]
    fn control_shift_keeps_case_and_drops_shift() {
        assert_eq!(
            t(&linux(), "", Key::Char('a'), Modifiers::CONTROL | Modifiers::SHIFT),
            "<C-A>"
        );
    }

    #[test]
    fn bare_modifier_suppressed() {
        let tr = linux();
        for m in [
            ModifierKey::Shift,
            ModifierKey::Control,
            ModifierKey::Alt,
            ModifierKey::Meta,
        ] {
            assert_eq!(t(&tr, "", Key::Modifier(m), Modifiers::CONTROL), "");
            assert_eq!(t(&tr, "", Key::Modifier(m), Modifiers::empty()), "");
        }
    }

    #[test]
    fn special_keys_take_prefix() {
        let tr = linux();
        assert_eq!(t(&tr, "", Key::Up, Modifiers::empty()), "<Up>");
        assert_eq!(t(&tr, "", Key::F(24), Modifiers::ALT), "<A-F24>");
        assert_eq!(t(&tr, "", Key::F(25), Modifiers::empty()), "");
        assert_eq!(t(&tr, "", Key::F(0), Modifiers::empty()), "");
        assert_eq!(t(&tr, "\u{8}", Key::Backspace, Modifiers::empty()), "<BS>");
        assert_eq!(t(&tr, "\r", Key::Return, Modifiers::CONTROL), "<C-Enter>");
        assert_eq!(t(&tr, "\u{1b}", Key::Escape, Modifiers::empty()), "<Esc>");
        assert_eq!(t(&tr, " ", Key::Space, Modifiers::SHIFT), "<S-Space>");
        assert_eq!(
            t(&tr, "", Key::Delete, Modifiers::all() - Modifiers::KEYPAD),
            "<D-C-S-A-Del>"
        );
    }

    #[test]
    fn backslash() {
        assert_eq!(t(&linux(), "\\", Key::Char('\\'), Modifiers::empty()), "<Bslash>");
        assert_eq!(t(&linux(), "\\", Key::Backslash, Modifiers::ALT), "<A-Bslash>");
    }

    #[test]
    fn keypad_names() {
        let tr = linux();
        let kp = Modifiers::KEYPAD;
        assert_eq!(t(&tr, "+", Key::Char('+'), kp), "<kPlus>");
        assert_eq!(t(&tr, "-", Key::Char('-'), kp), "<kMinus>");
        assert_eq!(t(&tr, "*", Key::Char('*'), kp), "<kMultiply>");
        assert_eq!(t(&tr, "/", Key::Char('/'), kp), "<kDivide>");
        assert_eq!(t(&tr, ".", Key::Char('.'), kp), "<kPoint>");
        assert_eq!(t(&tr, "\r", Key::Enter, kp), "<kEnter>");
        assert_eq!(t(&tr, "7", Key::Char('7'), kp), "<k7>");
        assert_eq!(t(&tr, "", Key::Home, kp | Modifiers::CONTROL), "<C-Home>");
        assert_eq!(t(&tr, "", Key::PageDown, kp), "<PageDown>");
        // keys with no keypad name fall through
        assert_eq!(t(&tr, "", Key::Up, kp), "<Up>");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(t(&linux(), "x", Key::Char('x'), Modifiers::empty()), "x");
        assert_eq!(t(&linux(), "ñ", Key::Unknown, Modifiers::empty()), "ñ");
        assert_eq!(t(&linux(), "", Key::Unknown, Modifiers::empty()), "");
        assert_eq!(t(&linux(), "x", Key::Char('x'), Modifiers::ALT), "<A-x>");
    }

    #[test]
    fn macos_control_is_meta() {
        let tr = KeyTranslator::new(PlatformId::MacOs);
        assert_eq!(t(&tr, "a", Key::Char('a'), Modifiers::META), "<C-a>");
        assert_eq!(t(&tr, "s", Key::Char('S'), Modifiers::CONTROL), "<D-s>");
        assert_eq!(t(&tr, "", Key::Modifier(ModifierKey::Meta), Modifiers::META), "");
    }

    #[test]
    fn windows_meta_is_ignored() {
        let tr = KeyTranslator::new(PlatformId::Windows);
        assert_eq!(t(&tr, "a", Key::Char('a'), Modifiers::META), "a");
        assert_eq!(t(&tr, "", Key::Left, Modifiers::META), "<Left>");
    }

    #[test]
    fn non_char_key_under_control_without_name_is_suppressed() {
        assert_eq!(t(&linux(), "x", Key::Unknown, Modifiers::CONTROL), "");
    }
}
