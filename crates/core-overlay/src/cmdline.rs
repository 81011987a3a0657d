//! External command line (`cmdline_*`) and its wildmenu sub-state (`wildmenu_*`).

use crate::{Anchor, AnchorMetrics, Overlay};
use core_style::Highlight;
use tracing::trace;

/// One highlighted run of command-line content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CmdlineChunk {
    pub highlight: Highlight,
    pub text: String,
}

impl CmdlineChunk {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            highlight: Highlight::default(),
            text: text.into(),
        }
    }
}

/// Completion list shown beneath the command line.
#[derive(Debug, Default)]
pub struct Wildmenu {
    visible: bool,
    items: Vec<String>,
    selected: Option<usize>,
}

impl Wildmenu {
    pub fn show(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected = None;
        self.visible = true;
    }

    pub fn select(&mut self, selected: Option<usize>) {
        self.selected = selected.filter(|&i| i < self.items.len());
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }
}

#[derive(Debug, Default)]
pub struct Cmdline {
    visible: bool,
    content: Vec<CmdlineChunk>,
    pos: usize,
    firstc: String,
    prompt: String,
    indent: usize,
    level: i64,
    /// Special character shown at the cursor while a key sequence is pending (`<C-v>`, `<C-r>`).
    pending: Option<(String, bool)>,
    block: Vec<Vec<CmdlineChunk>>,
    wildmenu: Wildmenu,
    anchor: Anchor,
}

impl Cmdline {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn show(
        &mut self,
        content: Vec<CmdlineChunk>,
        pos: usize,
        firstc: impl Into<String>,
        prompt: impl Into<String>,
        indent: usize,
        level: i64,
        metrics: &AnchorMetrics,
        grid_rows: usize,
    ) {
        self.content = content;
        self.pos = pos;
        self.firstc = firstc.into();
        self.prompt = prompt.into();
        self.indent = indent;
        self.level = level;
        self.pending = None;
        // Docked on the last grid row, shifted up for every block line above it.
        let row = grid_rows.saturating_sub(1) as i64 - self.block.len() as i64;
        self.anchor = metrics.anchor(row, 0);
        self.visible = true;
        trace!(target: "overlay.cmdline", level, pos, chunks = self.content.len(), "cmdline_show");
    }

    pub fn set_pos(&mut self, pos: usize, level: i64) {
        if level == self.level {
            self.pos = pos;
            self.pending = None;
        }
    }

    /// `shift` means the character is inserted (pushing text right) rather than overlaid.
    pub fn set_char(&mut self, c: impl Into<String>, shift: bool, level: i64) {
        if level == self.level {
            self.pending = Some((c.into(), shift));
        }
    }

    pub fn block_show(&mut self, lines: Vec<Vec<CmdlineChunk>>) {
        self.block = lines;
    }

    pub fn block_append(&mut self, line: Vec<CmdlineChunk>) {
        self.block.push(line);
    }

    pub fn block_hide(&mut self) {
        self.block.clear();
    }

    pub fn wildmenu(&self) -> &Wildmenu {
        &self.wildmenu
    }

    pub fn wildmenu_mut(&mut self) -> &mut Wildmenu {
        &mut self.wildmenu
    }

    pub fn content(&self) -> &[CmdlineChunk] {
        &self.content
    }

    pub fn block(&self) -> &[Vec<CmdlineChunk>] {
        &self.block
    }

    /// Cursor byte offset within `text()`.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn firstc(&self) -> &str {
        &self.firstc
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn text(&self) -> String {
        self.content.iter().map(|c| c.text.as_str()).collect()
    }

    /// Line as the user sees it: firstc, prompt, indentation, content, with any pending special
    /// character placed at the cursor.
    pub fn display_text(&self) -> String {
        let mut text = self.text();
        if let Some((c, shift)) = &self.pending {
            let at = floor_char_boundary(&text, self.pos);
            if *shift {
                text.insert_str(at, c);
            } else {
                let end = text[at..]
                    .chars()
                    .next()
                    .map_or(at, |ch| at + ch.len_utf8());
                text.replace_range(at..end, c);
            }
        }
        format!(
            "{}{}{}{}",
            self.firstc,
            self.prompt,
            " ".repeat(self.indent),
            text
        )
    }
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

impl Overlay for Cmdline {
    type Item = CmdlineChunk;

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn items(&self) -> &[CmdlineChunk] {
        &self.content
    }

    fn selected_index(&self) -> Option<usize> {
        None
    }

    fn anchor_position(&self) -> Anchor {
        self.anchor
    }

    fn hide(&mut self) -> bool {
        self.pending = None;
        self.wildmenu.hide();
        std::mem::replace(&mut self.visible, false)
    }
}
