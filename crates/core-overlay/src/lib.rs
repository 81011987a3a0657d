//! Overlay state machines driven by the redraw and `Gui` streams.
//!
//! Every overlay follows the same lifecycle: `hidden -> shown -> updated* -> hidden`.
//! `show` replaces all content and selection (nothing leaks across show cycles), updates mutate in
//! place without a visibility transition, and `hide` is idempotent. Overlays are pure data: the
//! renderer reads them through the `Overlay` accessors after each repaint.

use core_grid::CursorPos;

pub mod cmdline;
pub mod finder;
pub mod hover;
pub mod popup;
pub mod signature;
pub mod tabline;

pub use cmdline::{Cmdline, CmdlineChunk, Wildmenu};
pub use finder::{Finder, FinderRow, ResultKind};
pub use hover::Hover;
pub use popup::{PopupItem, PopupMenu};
pub use signature::Signature;
pub use tabline::{Tab, Tabline};

/// Pixel metrics used to turn grid coordinates into overlay anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMetrics {
    pub cell_width: u32,
    pub line_height: u32,
}

impl Default for AnchorMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8,
            line_height: 16,
        }
    }
}

impl AnchorMetrics {
    pub fn new(cell_width: u32, line_height: u32) -> Self {
        Self {
            cell_width: cell_width.max(1),
            line_height: line_height.max(1),
        }
    }

    /// Top-left pixel of grid cell `(row, col)`. Signed so overlays may sit above row 0.
    pub fn anchor(&self, row: i64, col: i64) -> Anchor {
        Anchor {
            x: col * i64::from(self.cell_width),
            y: row * i64::from(self.line_height),
        }
    }

    pub fn anchor_at(&self, pos: CursorPos) -> Anchor {
        self.anchor(pos.row as i64, pos.col as i64)
    }
}

/// Pixel offset of an overlay relative to the grid origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    pub x: i64,
    pub y: i64,
}

/// Wire selection index: negative means "no selection".
pub fn selection_from_wire(index: i64) -> Option<usize> {
    usize::try_from(index).ok()
}

/// Snapshot accessors shared by all overlays.
pub trait Overlay {
    type Item;

    fn is_visible(&self) -> bool;
    fn items(&self) -> &[Self::Item];
    /// `None` when no row is highlighted.
    fn selected_index(&self) -> Option<usize>;
    fn anchor_position(&self) -> Anchor;
    /// Returns `true` when visibility actually changed.
    fn hide(&mut self) -> bool;
}
