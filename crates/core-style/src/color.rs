//! Immutable RGBA color value and the derived-color transforms.
//!
//! Every transform returns a new `Color`; nothing mutates in place. Channel
//! arithmetic is carried out in `i32` and saturated back into `0..=255`, and
//! alpha is always preserved.

use std::fmt;

/// Midpoint channel value used by `warp` and `gradient`.
const MIDPOINT: i32 = 128;

/// Three 8-bit channels plus an alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same channels, different alpha. Alpha is clamped into `0.0..=1.0`.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Decode the protocol's packed `0xRRGGBB` integer.
    ///
    /// Negative values (the protocol sends `-1`) mean "no color configured"
    /// and yield `None`.
    pub fn from_packed(packed: i64) -> Option<Self> {
        if packed < 0 {
            return None;
        }
        let b = (packed & 0xff) as u8;
        let g = ((packed >> 8) & 0xff) as u8;
        let r = ((packed >> 16) & 0xff) as u8;
        Some(Self::rgb(r, g, b))
    }

    /// Inverse of `from_packed` (alpha is dropped).
    pub fn to_packed(self) -> i64 {
        (i64::from(self.r) << 16) | (i64::from(self.g) << 8) | i64::from(self.b)
    }

    /// Parse `#rrggbb` or `rrggbb`. Returns `None` for anything else.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let packed = i64::from_str_radix(digits, 16).ok()?;
        Self::from_packed(packed)
    }

    /// `#rrggbb` (alpha omitted).
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Subtract `v` from every channel.
    pub fn shift(&self, v: i32) -> Self {
        self.map_channels(|c| c.saturating_sub(v))
    }

    /// Push channels away from the midpoint: bright channels gain `v`, dark
    /// channels lose `2 * v`.
    pub fn warp(&self, v: i32) -> Self {
        self.map_channels(|c| {
            if c > MIDPOINT {
                c.saturating_add(v)
            } else {
                c.saturating_sub(v.saturating_mul(2))
            }
        })
    }

    /// Move every channel halfway toward the midpoint.
    pub fn gradient(&self) -> Self {
        self.map_channels(|c| {
            if c > MIDPOINT {
                c - (c - MIDPOINT) / 2
            } else {
                c + (MIDPOINT - c) / 2
            }
        })
    }

    /// `255 - channel` for every channel.
    pub fn inverted(&self) -> Self {
        self.map_channels(|c| 255 - c)
    }

    fn map_channels<F>(&self, f: F) -> Self
    where
        F: Fn(i32) -> i32,
    {
        let ch = |c: u8| f(i32::from(c)).clamp(0, 255) as u8;
        Self {
            r: ch(self.r),
            g: ch(self.g),
            b: ch(self.b),
            a: self.a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.6})", self.r, self.g, self.b, self.a)
    }
}
