//! Signature-help tooltip (`signature_show` / `signature_pos` / `signature_hide`).

use crate::{Anchor, AnchorMetrics, Overlay};
use core_grid::CursorPos;
use std::ops::Range;

#[derive(Debug, Default)]
pub struct Signature {
    visible: bool,
    text: String,
    /// Offset from the grid cursor.
    offset: (i64, i64),
    /// Ordinal of the parameter under the cursor.
    active: usize,
    anchor: Anchor,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        text: impl Into<String>,
        offset: (i64, i64),
        active: usize,
        cursor: CursorPos,
        metrics: &AnchorMetrics,
    ) {
        self.text = text.into();
        self.offset = offset;
        self.active = active;
        self.reposition(cursor, metrics);
        self.visible = true;
    }

    /// `signature_pos`: only the active parameter changes.
    pub fn set_active(&mut self, active: usize) {
        self.active = active;
    }

    /// Place the tooltip one line above the cursor with the opening parenthesis over the
    /// cursor column.
    pub fn reposition(&mut self, cursor: CursorPos, metrics: &AnchorMetrics) {
        let row = cursor.row as i64 + self.offset.0;
        let col = cursor.col as i64 + self.offset.1;
        let lead = self
            .text
            .find('(')
            .map_or(0, |i| self.text[..i].chars().count() as i64);
        self.anchor = metrics.anchor(row - 1, col - lead);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Byte range of the active parameter between the parentheses, with leading commas and
    /// spaces skipped. `None` when the text has no parameter list.
    pub fn active_parameter(&self) -> Option<Range<usize>> {
        active_parameter(&self.text, self.active)
    }
}

pub fn active_parameter(text: &str, active: usize) -> Option<Range<usize>> {
    let left = text.find('(')?;
    let right = left + text[left..].find(')')?;
    let bytes = text.as_bytes();
    let mut commas = 0;
    let mut i = left + 1;
    let mut start = i;
    while i < right {
        if bytes[i] == b',' {
            commas += 1;
            if commas > active {
                break;
            }
            start = i;
        }
        i += 1;
    }
    while start < i && matches!(bytes[start], b',' | b' ') {
        start += 1;
    }
    Some(start..i)
}

impl Overlay for Signature {
    type Item = String;

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn items(&self) -> &[String] {
        std::slice::from_ref(&self.text)
    }

    fn selected_index(&self) -> Option<usize> {
        Some(self.active)
    }

    fn anchor_position(&self) -> Anchor {
        self.anchor
    }

    fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIG: &str = "fn put(text: &str, advance: bool, hl: u8)";

    fn param(active: usize) -> &'static str {
        let r = active_parameter(SIG, active).unwrap();
        &SIG[r]
    }

    #[test]
    fn selects_each_parameter() {
        assert_eq!(param(0), "text: &str");
        assert_eq!(param(1), "advance: bool");
        assert_eq!(param(2), "hl: u8");
    }

    #[test]
    fn ordinal_past_end_sticks_to_last() {
        assert_eq!(param(7), "hl: u8");
    }

    #[test]
    fn no_parens_no_range() {
        assert_eq!(active_parameter("plain", 0), None);
        assert_eq!(active_parameter("f(x", 0), None);
        assert_eq!(active_parameter("f()", 0), Some(2..2));
    }

    #[test]
    fn anchor_aligns_paren_with_cursor() {
        let m = AnchorMetrics::new(10, 20);
        let mut s = Signature::new();
        s.show("foo(a, b)", (0, 1), 0, CursorPos::new(5, 10), &m);
        assert!(s.is_visible());
        // col 10 + 1 - 3 chars before '(' = 8; row 5 - 1 = 4
        assert_eq!(s.anchor_position(), Anchor { x: 80, y: 80 });
        s.set_active(1);
        assert_eq!(&s.text()[s.active_parameter().unwrap()], "b");
        assert!(s.hide());
        assert!(!s.hide());
    }
}
