//! Fuzzy finder overlay (`finder_*` GUI notifications).
//!
//! Result rows arrive as raw candidate strings plus the character indices that matched the
//! pattern. Path rows are reformatted for display (`src/grid.rs` becomes `grid.rs src`), so each
//! row carries a remap table from logical character index to display character index. Match
//! highlighting goes through the table; indices that have no display position (the path
//! separator between the two halves) are dropped.

use crate::{Anchor, AnchorMetrics, Overlay};
use tracing::trace;

/// How a result row is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultKind {
    File,
    Dir,
    /// File header of a grep result group.
    AgFile,
    /// Matched line below an `AgFile` header.
    AgLine,
    #[default]
    Line,
}

impl ResultKind {
    /// Unknown names render as plain lines.
    pub fn from_name(name: &str) -> Self {
        match name {
            "file" => ResultKind::File,
            "dir" => ResultKind::Dir,
            "ag_file" => ResultKind::AgFile,
            "ag_line" => ResultKind::AgLine,
            _ => ResultKind::Line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderRow {
    pub text: String,
    pub kind: ResultKind,
    pub display: String,
    /// Logical match indices as received.
    pub matches: Vec<usize>,
    /// `remap[i]` is the display index of logical char `i`.
    pub remap: Vec<Option<usize>>,
}

impl FinderRow {
    pub fn new(text: impl Into<String>, kind: ResultKind, matches: Vec<usize>) -> Self {
        let text = text.into();
        let (display, remap) = format_row(&text, kind);
        Self {
            text,
            kind,
            display,
            matches,
            remap,
        }
    }

    /// Match positions in display-character space, ascending.
    pub fn display_matches(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .matches
            .iter()
            .filter_map(|&i| self.remap.get(i).copied().flatten())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Build the display string and logical->display index table for `text`.
pub fn format_row(text: &str, kind: ResultKind) -> (String, Vec<Option<usize>>) {
    match kind {
        ResultKind::File | ResultKind::Dir => format_path(text, ""),
        ResultKind::AgFile => format_path(text, "- "),
        ResultKind::AgLine => indent(text, 4),
        ResultKind::Line => indent(text, 0),
    }
}

fn indent(text: &str, width: usize) -> (String, Vec<Option<usize>>) {
    let display = format!("{}{}", " ".repeat(width), text);
    let remap = (0..text.chars().count()).map(|i| Some(i + width)).collect();
    (display, remap)
}

/// `dir/sub/name` -> `name dir/sub`. A trailing separator is not displayed.
fn format_path(text: &str, prefix: &str) -> (String, Vec<Option<usize>>) {
    let total = text.chars().count();
    let trimmed = text.strip_suffix('/').unwrap_or(text);
    let kept = trimmed.chars().count();
    let lead = prefix.chars().count();
    let mut remap = vec![None; total];

    let Some((dir, base)) = trimmed.rsplit_once('/') else {
        for (i, slot) in remap.iter_mut().enumerate().take(kept) {
            *slot = Some(lead + i);
        }
        return (format!("{prefix}{trimmed}"), remap);
    };

    let dir_len = dir.chars().count();
    let base_len = base.chars().count();
    for (i, slot) in remap.iter_mut().enumerate().take(kept) {
        *slot = if i < dir_len {
            Some(lead + base_len + 1 + i)
        } else if i == dir_len {
            None
        } else {
            Some(lead + i - dir_len - 1)
        };
    }
    let display = if dir.is_empty() {
        format!("{prefix}{base}")
    } else {
        format!("{prefix}{base} {dir}")
    };
    (display, remap)
}

#[derive(Debug, Default)]
pub struct Finder {
    visible: bool,
    pattern: String,
    pattern_pos: usize,
    rows: Vec<FinderRow>,
    selected: Option<usize>,
    anchor: Anchor,
}

impl Finder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `finder_pattern`: showing a new pattern also makes the finder visible.
    pub fn set_pattern(&mut self, pattern: impl Into<String>, metrics: &AnchorMetrics, grid_cols: usize) {
        self.pattern = pattern.into();
        self.visible = true;
        self.recenter(metrics, grid_cols);
    }

    /// `finder_pattern_pos`: cursor column within the pattern.
    pub fn set_pattern_pos(&mut self, pos: usize) {
        self.pattern_pos = pos;
    }

    /// `finder_show_result`: replaces all rows.
    pub fn show_result(&mut self, rows: Vec<FinderRow>, selected: Option<usize>) {
        trace!(target: "overlay.finder", rows = rows.len(), ?selected, "finder_show_result");
        self.selected = selected.filter(|&i| i < rows.len());
        self.rows = rows;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn select(&mut self, selected: Option<usize>) {
        self.selected = selected.filter(|&i| i < self.rows.len());
    }

    /// Horizontally centered on the grid, docked at the top.
    pub fn recenter(&mut self, metrics: &AnchorMetrics, grid_cols: usize) {
        let width = finder_width_cols(grid_cols);
        let left = (grid_cols.saturating_sub(width) / 2) as i64;
        self.anchor = metrics.anchor(0, left);
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn pattern_pos(&self) -> usize {
        self.pattern_pos
    }

    /// Pixel x of the pattern cursor relative to the overlay.
    pub fn pattern_cursor_x(&self, metrics: &AnchorMetrics) -> i64 {
        metrics.anchor(0, self.pattern_pos as i64).x
    }
}

fn finder_width_cols(grid_cols: usize) -> usize {
    (grid_cols * 3 / 4).max(grid_cols.min(40))
}

impl Overlay for Finder {
    type Item = FinderRow;

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn items(&self) -> &[FinderRow] {
        &self.rows
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
    use pretty_assertions::assert_eq;

    #[test]
    fn file_rows_put_basename_first() {
        let row = FinderRow::new("src/grid.rs", ResultKind::File, vec![0, 4, 5]);
        assert_eq!(row.display, "grid.rs src");
        // 's' (0) -> display 8, 'g' (4) -> 0, 'r' (5) -> 1
        assert_eq!(row.display_matches(), vec![0, 1, 8]);
    }

    #[test]
    fn separator_has_no_display_index() {
        let row = FinderRow::new("a/b", ResultKind::File, vec![1]);
        assert_eq!(row.display, "b a");
        assert_eq!(row.remap, vec![Some(2), None, Some(0)]);
        assert!(row.display_matches().is_empty());
    }

    #[test]
    fn dir_trailing_slash_hidden() {
        let row = FinderRow::new("crates/core/", ResultKind::Dir, vec![7, 11]);
        assert_eq!(row.display, "core crates");
        assert_eq!(row.display_matches(), vec![0]);
    }

    #[test]
    fn bare_name_is_unchanged() {
        let row = FinderRow::new("Cargo.toml", ResultKind::File, vec![0]);
        assert_eq!(row.display, "Cargo.toml");
        assert_eq!(row.display_matches(), vec![0]);
    }

    #[test]
    fn ag_rows_are_prefixed_and_indented() {
        let header = FinderRow::new("lib/a.rs", ResultKind::AgFile, vec![4]);
        assert_eq!(header.display, "- a.rs lib");
        assert_eq!(header.display_matches(), vec![2]);

        let line = FinderRow::new("12: let x", ResultKind::AgLine, vec![0, 8]);
        assert_eq!(line.display, "    12: let x");
        assert_eq!(line.display_matches(), vec![4, 12]);
    }

    #[test]
    fn plain_line_identity_and_wide_chars() {
        let row = FinderRow::new("日本/語", ResultKind::Line, vec![3]);
        assert_eq!(row.display, "日本/語");
        assert_eq!(row.display_matches(), vec![3]);
        let path = FinderRow::new("日本/語", ResultKind::File, vec![0, 3]);
        assert_eq!(path.display, "語 日本");
        assert_eq!(path.display_matches(), vec![0, 2]);
    }

    #[test]
    fn out_of_range_match_indices_ignored() {
        let row = FinderRow::new("ab", ResultKind::Line, vec![1, 99]);
        assert_eq!(row.display_matches(), vec![1]);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ResultKind::from_name("ag_file"), ResultKind::AgFile);
        assert_eq!(ResultKind::from_name("buffer"), ResultKind::Line);
    }

    #[test]
    fn pattern_shows_and_result_selection_resets() {
        let m = AnchorMetrics::default();
        let mut f = Finder::new();
        f.set_pattern("gr", &m, 80);
        assert!(f.is_visible());
        f.set_pattern_pos(2);
        assert_eq!(f.pattern_cursor_x(&m), 16);
        f.show_result(vec![FinderRow::new("a", ResultKind::Line, vec![])], Some(0));
        f.select(Some(3));
        assert_eq!(f.selected_index(), None);
        f.show_result(
            vec![
                FinderRow::new("a", ResultKind::Line, vec![]),
                FinderRow::new("b", ResultKind::Line, vec![]),
            ],
            Some(1),
        );
        assert_eq!(f.selected_index(), Some(1));
        assert_eq!(f.anchor_position(), Anchor { x: 10 * 8, y: 0 });
        assert!(f.hide());
        assert!(!f.hide());
        f.show();
        assert!(f.is_visible());
    }
}
