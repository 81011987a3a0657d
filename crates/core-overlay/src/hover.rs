//! Hover tooltip (`hover_show` / `hover_pos` / `hover_hide`).

use crate::{Anchor, AnchorMetrics, Overlay};
use core_grid::CursorPos;

#[derive(Debug, Default)]
pub struct Hover {
    visible: bool,
    text: String,
    offset: (i64, i64),
    anchor: Anchor,
}

impl Hover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        text: impl Into<String>,
        offset: (i64, i64),
        cursor: CursorPos,
        metrics: &AnchorMetrics,
    ) {
        self.text = text.into();
        self.offset = offset;
        self.reposition(cursor, metrics);
        self.visible = true;
    }

    pub fn set_offset(&mut self, offset: (i64, i64), cursor: CursorPos, metrics: &AnchorMetrics) {
        self.offset = offset;
        self.reposition(cursor, metrics);
    }

    /// Below the cursor cell, shifted by the offset.
    pub fn reposition(&mut self, cursor: CursorPos, metrics: &AnchorMetrics) {
        self.anchor = metrics.anchor(
            cursor.row as i64 + self.offset.0 + 1,
            cursor.col as i64 + self.offset.1,
        );
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Overlay for Hover {
    type Item = String;

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn items(&self) -> &[String] {
        std::slice::from_ref(&self.text)
    }

    fn selected_index(&self) -> Option<usize> {
        None
    }

    fn anchor_position(&self) -> Anchor {
        self.anchor
    }

    fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }
}
