//! Terminal-cell screen buffer driven by the editor's redraw events.

pub mod grid;
pub mod width;

pub use grid::{Cell, CellKind, CursorPos, Grid, GridError, ScrollRegion};
