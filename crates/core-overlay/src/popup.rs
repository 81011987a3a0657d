//! Completion popup menu (`popupmenu_show` / `popupmenu_select` / `popupmenu_hide`).

use crate::{Anchor, AnchorMetrics, Overlay};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupItem {
    pub word: String,
    pub kind: String,
    pub menu: String,
    pub info: String,
}

impl PopupItem {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct PopupMenu {
    visible: bool,
    items: Vec<PopupItem>,
    selected: Option<usize>,
    row: usize,
    col: usize,
    anchor: Anchor,
}

impl PopupMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `items` anchored at grid cell `(row, col)`. Replaces any previous content.
    pub fn show(
        &mut self,
        items: Vec<PopupItem>,
        selected: Option<usize>,
        row: usize,
        col: usize,
        metrics: &AnchorMetrics,
    ) {
        trace!(target: "overlay.popup", items = items.len(), ?selected, row, col, "popup_show");
        self.selected = selected.filter(|&i| i < items.len());
        self.items = items;
        self.row = row;
        self.col = col;
        // The menu opens on the line below the anchor cell.
        self.anchor = metrics.anchor(row as i64 + 1, col as i64);
        self.visible = true;
    }

    /// Move the selection. Out-of-range indices clear it.
    pub fn select(&mut self, selected: Option<usize>) {
        self.selected = selected.filter(|&i| i < self.items.len());
    }

    /// Recompute the anchor after font metrics change.
    pub fn relayout(&mut self, metrics: &AnchorMetrics) {
        self.anchor = metrics.anchor(self.row as i64 + 1, self.col as i64);
    }

    pub fn selected_item(&self) -> Option<&PopupItem> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

impl Overlay for PopupMenu {
    type Item = PopupItem;

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn items(&self) -> &[PopupItem] {
        &self.items
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected
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

    fn items(n: usize) -> Vec<PopupItem> {
        (0..n).map(|i| PopupItem::new(format!("w{i}"))).collect()
    }

    #[test]
    fn show_select_hide_show_resets_selection() {
        let m = AnchorMetrics::default();
        let mut p = PopupMenu::new();
        p.show(items(5), None, 3, 4, &m);
        p.select(Some(2));
        assert_eq!(p.selected_index(), Some(2));
        assert!(p.hide());
        p.show(items(3), Some(0), 3, 4, &m);
        assert_eq!(p.selected_index(), Some(0));
        p.hide();
        p.show(items(3), None, 3, 4, &m);
        assert_eq!(p.selected_index(), None);
    }

    #[test]
    fn hide_is_idempotent() {
        let mut p = PopupMenu::new();
        assert!(!p.hide());
        p.show(items(1), None, 0, 0, &AnchorMetrics::default());
        assert!(p.hide());
        assert!(!p.hide());
        assert!(!p.is_visible());
    }

    #[test]
    fn anchor_sits_below_cell() {
        let mut p = PopupMenu::new();
        p.show(items(1), None, 2, 5, &AnchorMetrics::new(10, 20));
        assert_eq!(p.anchor_position(), Anchor { x: 50, y: 60 });
        p.relayout(&AnchorMetrics::new(5, 10));
        assert_eq!(p.anchor_position(), Anchor { x: 25, y: 30 });
    }

    #[test]
    fn out_of_range_selection_clears() {
        let mut p = PopupMenu::new();
        p.show(items(2), Some(9), 0, 0, &AnchorMetrics::default());
        assert_eq!(p.selected_index(), None);
        p.select(Some(1));
        assert_eq!(p.selected_item().map(|i| i.word.as_str()), Some("w1"));
        p.select(Some(7));
        assert_eq!(p.selected_index(), None);
    }
}
