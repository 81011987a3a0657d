//! Screen buffer: a `rows x cols` matrix of cells plus cursor, scroll region,
//! active highlight and the editor's logical mode.
//!
//! Every mutation is driven by one protocol event and leaves the grid in a
//! structurally valid state; there is no pending state between calls.
//! Out-of-range coordinates from the event stream are clamped, never raised.
//!
//! Cursor invariant: `cursor()` always reports a position inside the grid.
//! Internally the insertion column may sit one past the last column after a
//! `put` fills the row; further `put` text on that row is dropped until the
//! next `cursor_goto` (no automatic wrap).
//!
//! Wide glyph policy: a wide glyph occupies a leader cell and an empty
//! continuation cell. Writing into either half blanks the other half. A wide
//! glyph that does not fit in the last column is written as a blank cell.

use crate::width::{clusters, glyph_width};
use core_style::Highlight;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKind {
    #[default]
    Narrow,
    /// First column of a double-width glyph.
    Wide,
    /// Placeholder for the second column of a wide glyph.
    Continuation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// One grapheme cluster, `" "` for blank cells, empty for continuations.
    pub text: String,
    pub highlight: Highlight,
    pub kind: CellKind,
}

impl Cell {
    pub fn blank(highlight: Highlight) -> Self {
        Self {
            text: " ".to_string(),
            highlight,
            kind: CellKind::Narrow,
        }
    }

    fn continuation(highlight: Highlight) -> Self {
        Self {
            text: String::new(),
            highlight,
            kind: CellKind::Continuation,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.kind == CellKind::Narrow && self.text == " "
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

impl CursorPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Inclusive bounds, matching `set_scroll_region` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRegion {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl ScrollRegion {
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            top: 0,
            bottom: rows.saturating_sub(1),
            left: 0,
            right: cols.saturating_sub(1),
        }
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    /// Insertion point; `col` may equal `cols` after a full-row put.
    cursor: CursorPos,
    region: ScrollRegion,
    active: Highlight,
    mode: String,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Grid {
    /// Allocate a blank grid. A zero dimension yields the empty `0x0` grid a
    /// session holds before its first `resize`.
    pub fn new(rows: usize, cols: usize) -> Self {
        let (rows, cols) = if rows == 0 || cols == 0 {
            (0, 0)
        } else {
            (rows, cols)
        };
        Self {
            rows,
            cols,
            cells: vec![Cell::blank(Highlight::default()); rows * cols],
            cursor: CursorPos::default(),
            region: ScrollRegion::full(rows, cols),
            active: Highlight::default(),
            mode: "normal".to_string(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn cursor(&self) -> CursorPos {
        CursorPos {
            row: self.cursor.row,
            col: self.cursor.col.min(self.cols.saturating_sub(1)),
        }
    }

    pub fn scroll_region(&self) -> ScrollRegion {
        self.region
    }

    pub fn active_highlight(&self) -> &Highlight {
        &self.active
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.cells[self.idx(row, col)])
    }

    /// Cells of one row, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.cells[start..start + self.cols])
    }

    /// Row contents as text (continuations contribute nothing).
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.row(row)
            .map(|cells| cells.iter().map(|c| c.text.as_str()).collect())
    }

    /// Every row as text with trailing blanks trimmed.
    pub fn snapshot_text(&self) -> Vec<String> {
        (0..self.rows)
            .filter_map(|r| self.row_text(r))
            .map(|line| line.trim_end().to_string())
            .collect()
    }

    /// Reallocate as a blank `rows x cols` grid. No-op when either dimension
    /// is zero. The cursor is clamped and the scroll region reset.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            trace!(target: "grid", rows, cols, "resize_ignored");
            return;
        }
        self.rows = rows;
        self.cols = cols;
        self.cells = vec![Cell::blank(Highlight::default()); rows * cols];
        self.region = ScrollRegion::full(rows, cols);
        self.cursor.row = self.cursor.row.min(rows - 1);
        self.cursor.col = self.cursor.col.min(cols - 1);
        trace!(target: "grid", rows, cols, "resized");
    }

    pub fn cursor_goto(&mut self, row: usize, col: usize) {
        if self.is_empty() {
            return;
        }
        let clamped = CursorPos::new(row.min(self.rows - 1), col.min(self.cols - 1));
        if clamped != CursorPos::new(row, col) {
            trace!(target: "grid", row, col, "cursor_goto_clamped");
        }
        self.cursor = clamped;
    }

    /// Write `text` at the cursor and advance past it.
    pub fn put(&mut self, text: &str) {
        self.put_with(text, true);
    }

    /// Write `text` at the cursor with the active highlight. When `advance`
    /// is false the cursor stays where it was.
    pub fn put_with(&mut self, text: &str, advance: bool) {
        if self.is_empty() {
            return;
        }
        let row = self.cursor.row;
        let mut col = self.cursor.col;
        for cluster in clusters(text) {
            let width = glyph_width(cluster);
            if width == 0 {
                self.attach_zero_width(row, col, cluster);
                continue;
            }
            if col >= self.cols {
                trace!(target: "grid", row, len = text.len(), "put_past_eol_dropped");
                break;
            }
            if width == 2 && col + 1 >= self.cols {
                self.detach_wide(row, col);
                let blank = self.blank();
                let i = self.idx(row, col);
                self.cells[i] = blank;
                col += 1;
                continue;
            }
            self.detach_wide(row, col);
            if width == 2 {
                self.detach_wide(row, col + 1);
            }
            let i = self.idx(row, col);
            self.cells[i] = Cell {
                text: cluster.to_string(),
                highlight: self.active.clone(),
                kind: if width == 2 {
                    CellKind::Wide
                } else {
                    CellKind::Narrow
                },
            };
            if width == 2 {
                self.cells[i + 1] = Cell::continuation(self.active.clone());
            }
            col += width;
        }
        if advance {
            self.cursor.col = col;
        }
    }

    /// Blank from the cursor to the right edge of the scroll region.
    pub fn eol_clear(&mut self) {
        if self.is_empty() {
            return;
        }
        let CursorPos { row, col } = self.cursor;
        let right = self.region.right;
        if col > right {
            return;
        }
        self.clear_region(row, row, col, right);
    }

    /// Blank the whole grid and reset the scroll region.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        let blank = self.blank();
        self.cells.fill(blank);
        self.region = ScrollRegion::full(self.rows, self.cols);
    }

    /// Blank an inclusive rectangle, clamped to the grid.
    pub fn clear_region(&mut self, top: usize, bottom: usize, left: usize, right: usize) {
        if self.is_empty() {
            return;
        }
        let bottom = bottom.min(self.rows - 1);
        let right = right.min(self.cols - 1);
        if top > bottom || left > right {
            return;
        }
        let blank = self.blank();
        for row in top..=bottom {
            self.detach_wide(row, left);
            self.detach_wide(row, right);
            let start = self.idx(row, left);
            let end = self.idx(row, right);
            self.cells[start..=end].fill(blank.clone());
        }
    }

    /// Shift the scroll region's rows by `count`. Positive moves content up,
    /// negative moves it down; vacated rows are blanked with the active
    /// background. Only the region's columns move.
    pub fn scroll(&mut self, count: i64) {
        if count == 0 || self.is_empty() {
            return;
        }
        let ScrollRegion {
            top,
            bottom,
            left,
            right,
        } = self.region;
        let n = usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX);
        if n >= self.region.height() {
            self.clear_region(top, bottom, left, right);
            return;
        }
        if count > 0 {
            for row in top..=bottom - n {
                self.copy_span(row + n, row, left, right);
            }
            self.clear_region(bottom - n + 1, bottom, left, right);
        } else {
            for row in (top + n..=bottom).rev() {
                self.copy_span(row - n, row, left, right);
            }
            self.clear_region(top, top + n - 1, left, right);
        }
    }

    /// Constrain subsequent scroll / eol-clear operations. Bounds are
    /// clamped into the grid; an inverted region resets to the full grid.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize, left: usize, right: usize) {
        if self.is_empty() {
            return;
        }
        let region = ScrollRegion {
            top: top.min(self.rows - 1),
            bottom: bottom.min(self.rows - 1),
            left: left.min(self.cols - 1),
            right: right.min(self.cols - 1),
        };
        if region.top > region.bottom || region.left > region.right {
            trace!(target: "grid", top, bottom, left, right, "scroll_region_inverted");
            self.region = ScrollRegion::full(self.rows, self.cols);
            return;
        }
        self.region = region;
    }

    /// Replace the active highlight; existing cells keep their snapshot.
    pub fn highlight_set(&mut self, highlight: Highlight) {
        self.active = highlight;
    }

    pub fn mode_change(&mut self, mode: &str) {
        self.mode = mode.to_string();
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn blank(&self) -> Cell {
        Cell::blank(Highlight::background_only(self.active.background))
    }

    /// Copy columns `left..=right` of row `src` onto row `dst`. Wide glyphs cut by either
    /// edge lose their other half, on both the copied and the overwritten side.
    fn copy_span(&mut self, src: usize, dst: usize, left: usize, right: usize) {
        self.detach_wide(dst, left);
        self.detach_wide(dst, right);
        for col in left..=right {
            let cell = self.cells[self.idx(src, col)].clone();
            let i = self.idx(dst, col);
            self.cells[i] = cell;
        }
        let first = self.idx(dst, left);
        if self.cells[first].kind == CellKind::Continuation {
            self.cells[first] = self.blank();
        }
        let last = self.idx(dst, right);
        if self.cells[last].kind == CellKind::Wide {
            self.cells[last] = self.blank();
        }
    }

    /// Blank the partner half when `(row, col)` belongs to a wide glyph.
    fn detach_wide(&mut self, row: usize, col: usize) {
        let partner = match self.cells[self.idx(row, col)].kind {
            CellKind::Narrow => return,
            CellKind::Wide if col + 1 < self.cols => col + 1,
            CellKind::Continuation if col > 0 => col - 1,
            _ => return,
        };
        let blank = self.blank();
        let i = self.idx(row, partner);
        self.cells[i] = blank;
    }

    fn attach_zero_width(&mut self, row: usize, col: usize, cluster: &str) {
        if col == 0 {
            return;
        }
        let mut target = col - 1;
        if self.cells[self.idx(row, target)].kind == CellKind::Continuation && target > 0 {
            target -= 1;
        }
        let i = self.idx(row, target);
        self.cells[i].text.push_str(cluster);
    }
}
