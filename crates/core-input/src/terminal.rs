//! crossterm adapter so a terminal host can drive the translator.

use crate::{Key, KeyInput, ModifierKey, Modifiers, MouseAction, MouseButton, MouseInput};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyEventState as CKeyEventState, KeyModifiers as CKeyModifiers, ModifierKeyCode,
    MouseButton as CMouseButton, MouseEvent as CMouseEvent, MouseEventKind as CMouseEventKind,
};

/// Map a crossterm key event. Release events are ignored (`None`).
pub fn key_input(event: &CKeyEvent) -> Option<KeyInput> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let mut modifiers = map_modifiers(event.modifiers);
    if event.state.contains(CKeyEventState::KEYPAD) {
        modifiers |= Modifiers::KEYPAD;
    }
    let (text, key) = match event.code {
        CKeyCode::Char(' ') => (" ".to_string(), Key::Space),
        CKeyCode::Char('\\') => ("\\".to_string(), Key::Backslash),
        CKeyCode::Char(c) => (c.to_string(), Key::Char(c)),
        CKeyCode::Enter if modifiers.contains(Modifiers::KEYPAD) => ("\r".to_string(), Key::Enter),
        CKeyCode::Enter => ("\r".to_string(), Key::Return),
        CKeyCode::Esc => ("\u{1b}".to_string(), Key::Escape),
        CKeyCode::Backspace => ("\u{8}".to_string(), Key::Backspace),
        CKeyCode::Tab => ("\t".to_string(), Key::Tab),
        CKeyCode::BackTab => {
            modifiers |= Modifiers::SHIFT;
            (String::new(), Key::Backtab)
        }
        CKeyCode::Up => (String::new(), Key::Up),
        CKeyCode::Down => (String::new(), Key::Down),
        CKeyCode::Left => (String::new(), Key::Left),
        CKeyCode::Right => (String::new(), Key::Right),
        CKeyCode::Home => (String::new(), Key::Home),
        CKeyCode::End => (String::new(), Key::End),
        CKeyCode::PageUp => (String::new(), Key::PageUp),
        CKeyCode::PageDown => (String::new(), Key::PageDown),
        CKeyCode::Insert => (String::new(), Key::Insert),
        CKeyCode::Delete => (String::new(), Key::Delete),
        CKeyCode::F(n) => (String::new(), Key::F(n)),
        CKeyCode::Modifier(m) => (String::new(), Key::Modifier(map_modifier_key(m)?)),
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_) => return None,
    };
    Some(KeyInput::new(text, key, modifiers))
}

/// Map a crossterm mouse event. Plain motion without a button is ignored.
pub fn mouse_input(event: &CMouseEvent) -> Option<MouseInput> {
    let (button, action) = match event.kind {
        CMouseEventKind::Down(b) => (map_button(b), MouseAction::Press),
        CMouseEventKind::Drag(b) => (map_button(b), MouseAction::Drag),
        CMouseEventKind::Up(b) => (map_button(b), MouseAction::Release),
        CMouseEventKind::ScrollUp => (MouseButton::WheelUp, MouseAction::Press),
        CMouseEventKind::ScrollDown => (MouseButton::WheelDown, MouseAction::Press),
        CMouseEventKind::ScrollLeft => (MouseButton::WheelLeft, MouseAction::Press),
        CMouseEventKind::ScrollRight => (MouseButton::WheelRight, MouseAction::Press),
        CMouseEventKind::Moved => return None,
    };
    Some(MouseInput {
        button,
        action,
        row: usize::from(event.row),
        col: usize::from(event.column),
        modifiers: map_modifiers(event.modifiers),
    })
}

fn map_button(b: CMouseButton) -> MouseButton {
    match b {
        CMouseButton::Left => MouseButton::Left,
        CMouseButton::Right => MouseButton::Right,
        CMouseButton::Middle => MouseButton::Middle,
    }
}

fn map_modifier_key(m: ModifierKeyCode) -> Option<ModifierKey> {
    let key = match m {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => ModifierKey::Shift,
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => ModifierKey::Control,
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => ModifierKey::Alt,
        ModifierKeyCode::LeftSuper
        | ModifierKeyCode::RightSuper
        | ModifierKeyCode::LeftMeta
        | ModifierKeyCode::RightMeta
        | ModifierKeyCode::LeftHyper
        | ModifierKeyCode::RightHyper => ModifierKey::Meta,
        ModifierKeyCode::IsoLevel3Shift | ModifierKeyCode::IsoLevel5Shift => return None,
    };
    Some(key)
}

/// crossterm flags to native modifier bits. SUPER and META both land on `META`.
pub fn map_modifiers(mods: CKeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= Modifiers::CONTROL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= Modifiers::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if mods.intersects(CKeyModifiers::SUPER | CKeyModifiers::META) {
        out |= Modifiers::META;
    }
    out
}
