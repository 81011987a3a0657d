//! Grid dumps for the replay tool.
//!
//! Runs of cells with the same resolved colors and attributes are grouped into one `Print`, so
//! a colored dump costs one style change per run rather than per cell.

use anyhow::Result;
use core_grid::{Cell, CellKind};
use core_session::{Repaint, Session, Surface};
use core_style::{Color, DefaultColors, ResolvedColors};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use std::io::Write;

/// Every row with trailing blanks trimmed.
pub fn plain(session: &Session) -> String {
    let mut out = String::new();
    for line in session.grid().snapshot_text() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
struct Style {
    colors: ResolvedColors,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl Style {
    fn of(cell: &Cell, defaults: &DefaultColors) -> Self {
        Self {
            colors: cell.highlight.resolve(defaults),
            bold: cell.highlight.bold,
            italic: cell.highlight.italic,
            underline: cell.highlight.underline || cell.highlight.undercurl,
        }
    }
}

fn term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Write the grid with 24-bit colors. Returns the number of `Print` commands issued.
pub fn ansi<W: Write>(session: &Session, out: &mut W) -> Result<u64> {
    let defaults = session.colors();
    let mut prints = 0u64;
    for row in 0..session.grid().rows() {
        let Some(cells) = session.grid().row(row) else {
            break;
        };
        let mut run = String::new();
        let mut style: Option<Style> = None;
        for cell in cells {
            if cell.kind == CellKind::Continuation {
                continue;
            }
            let next = Style::of(cell, &defaults);
            if style.as_ref() != Some(&next) {
                if let Some(current) = style.take() {
                    emit(out, &current, &run)?;
                    prints += 1;
                    run.clear();
                }
                style = Some(next);
            }
            run.push_str(&cell.text);
        }
        if let Some(current) = style {
            emit(out, &current, &run)?;
            prints += 1;
        }
        queue!(out, ResetColor, SetAttribute(Attribute::Reset), Print("\n"))?;
    }
    out.flush()?;
    Ok(prints)
}

fn emit<W: Write>(out: &mut W, style: &Style, text: &str) -> Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(term(style.colors.foreground)),
        SetBackgroundColor(term(style.colors.background))
    )?;
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.italic {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if style.underline {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    queue!(out, Print(text))?;
    Ok(())
}

/// Headless surface that only keeps count; the dump is printed once the replay ends.
#[derive(Debug, Default)]
pub struct ReplaySurface {
    pub repaints: u64,
    pub full_repaints: u64,
}

impl Surface for ReplaySurface {
    fn draw(&mut self, _session: &Session, repaint: &Repaint) {
        self.repaints += 1;
        if *repaint == Repaint::Full {
            self.full_repaints += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Batch;
    use serde_json::json;

    fn painted() -> Session {
        let mut s = Session::default();
        let b = Batch::from_redraw_params(&json!([
            ["resize", [5, 2]],
            ["cursor_goto", [0, 0]],
            ["put", ["a"], ["b"]],
            ["highlight_set", [{"foreground": 0xff0000, "bold": true}]],
            ["put", ["c"]],
            ["highlight_set", [{}]],
            ["cursor_goto", [1, 1]],
            ["put", ["界"]]
        ]))
        .unwrap();
        s.apply_batch(&b);
        s
    }

    #[test]
    fn plain_dump_trims_rows() {
        assert_eq!(plain(&painted()), "abc\n 界\n");
    }

    #[test]
    fn ansi_dump_groups_runs() {
        let s = painted();
        let mut buf = Vec::new();
        let prints = ansi(&s, &mut buf).unwrap();
        // Row 0: "ab", "c", blanks. Row 1: one default run.
        assert_eq!(prints, 4);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\u{1b}[38;2;255;0;0m"));
        assert!(text.contains("ab"));
        assert!(text.contains(" 界  "));
    }
}
