//! Mouse events to `<LeftMouse>`-style notation.

use crate::{ModifierBindings, Modifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Press,
    Drag,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseInput {
    pub button: MouseButton,
    pub action: MouseAction,
    /// Grid cell under the pointer.
    pub row: usize,
    pub col: usize,
    pub modifiers: Modifiers,
}

/// Translated mouse event: the key token plus the grid cell it applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MouseNotation {
    pub key: String,
    pub row: usize,
    pub col: usize,
}

impl MouseNotation {
    /// Input string understood by the editor: the key token followed by `<col,row>`.
    pub fn to_input(&self) -> String {
        format!("{}<{},{}>", self.key, self.col, self.row)
    }
}

impl MouseInput {
    pub fn translate(&self, bindings: &ModifierBindings) -> MouseNotation {
        let name = match (self.button, self.action) {
            (MouseButton::WheelUp, _) => "ScrollWheelUp".to_string(),
            (MouseButton::WheelDown, _) => "ScrollWheelDown".to_string(),
            (MouseButton::WheelLeft, _) => "ScrollWheelLeft".to_string(),
            (MouseButton::WheelRight, _) => "ScrollWheelRight".to_string(),
            (button, action) => {
                let button = match button {
                    MouseButton::Right => "Right",
                    MouseButton::Middle => "Middle",
                    _ => "Left",
                };
                let action = match action {
                    MouseAction::Press => "Mouse",
                    MouseAction::Drag => "Drag",
                    MouseAction::Release => "Release",
                };
                format!("{button}{action}")
            }
        };
        MouseNotation {
            key: format!("<{}{}>", bindings.prefix(self.modifiers), name),
            row: self.row,
            col: self.col,
        }
    }
}
