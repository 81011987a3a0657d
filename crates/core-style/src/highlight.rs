//! Highlight attribute bundle applied to grid cells.

use crate::Color;
use serde_json::{Map, Value};

/// Attributes captured by a cell when it is written.
///
/// `None` colors inherit the session default. The struct is `Clone` with plain
/// value fields so every cell owns an independent snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlight {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub special: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub undercurl: bool,
    pub reverse: bool,
}

/// Session-level colors used to resolve `None` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultColors {
    pub foreground: Color,
    pub background: Color,
    pub special: Color,
}

impl Default for DefaultColors {
    /// Light gray on near-black, white special.
    fn default() -> Self {
        Self {
            foreground: Color::rgb(180, 185, 190),
            background: Color::rgb(9, 13, 17),
            special: Color::WHITE,
        }
    }
}

/// Concrete colors after defaults and `reverse` are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColors {
    pub foreground: Color,
    pub background: Color,
    pub special: Color,
}

impl Highlight {
    /// Parse the attribute map carried by `highlight_set`.
    ///
    /// Unknown keys are ignored; non-integer color values and non-bool flags
    /// leave the field at its default.
    pub fn from_attrs(attrs: &Map<String, Value>) -> Self {
        let color = |key: &str| {
            attrs
                .get(key)
                .and_then(Value::as_i64)
                .and_then(Color::from_packed)
        };
        let flag = |key: &str| attrs.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            foreground: color("foreground"),
            background: color("background"),
            special: color("special"),
            bold: flag("bold"),
            italic: flag("italic"),
            underline: flag("underline"),
            undercurl: flag("undercurl"),
            reverse: flag("reverse"),
        }
    }

    /// Highlight carrying only a background, used for cleared cells.
    pub fn background_only(background: Option<Color>) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    pub fn resolve(&self, defaults: &DefaultColors) -> ResolvedColors {
        let fg = self.foreground.unwrap_or(defaults.foreground);
        let bg = self.background.unwrap_or(defaults.background);
        let (foreground, background) = if self.reverse { (bg, fg) } else { (fg, bg) };
        ResolvedColors {
            foreground,
            background,
            special: self.special.unwrap_or(defaults.special),
        }
    }
}
