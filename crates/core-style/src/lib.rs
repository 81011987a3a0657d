//! Color and highlight value types shared by the grid, overlays and session.
//!
//! Pure value semantics: nothing in this crate holds interior mutability and
//! derived colors are always fresh values.

pub mod color;
pub mod highlight;

pub use color::Color;
pub use highlight::{DefaultColors, Highlight, ResolvedColors};
