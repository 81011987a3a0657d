//! Event kinds and the kind -> handler tables.
//!
//! Wire names resolve to a kind through a lookup map built once; each table maps a kind to a
//! plain function. New behavior is added by registering a handler, not by growing a match.

use crate::Session;
use ahash::AHashMap;
use core_events::{Args, ProtocolError};
use std::hash::Hash;
use std::sync::OnceLock;

/// Handler for one argument tuple.
pub type Handler = fn(&mut Session, Args<'_>) -> Result<(), ProtocolError>;

/// Kinds carried on the `redraw` channel. Names are the editor's, bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SetTitle,
    SetIcon,
    OptionSet,
    UpdateFg,
    UpdateBg,
    UpdateSp,
    CursorGoto,
    Put,
    EolClear,
    Clear,
    Resize,
    HighlightSet,
    SetScrollRegion,
    Scroll,
    ModeChange,
    ModeInfoSet,
    MouseOn,
    MouseOff,
    Bell,
    VisualBell,
    PopupmenuShow,
    PopupmenuHide,
    PopupmenuSelect,
    TablineUpdate,
    CmdlineShow,
    CmdlinePos,
    CmdlineChar,
    CmdlineHide,
    CmdlineBlockShow,
    CmdlineBlockAppend,
    CmdlineBlockHide,
    WildmenuShow,
    WildmenuSelect,
    WildmenuHide,
    MsgStartKind,
    MsgChunk,
    MsgEnd,
    MsgShowcmd,
    BusyStart,
    BusyStop,
    Flush,
}

impl EventKind {
    pub const ALL: [EventKind; 41] = [
        EventKind::SetTitle,
        EventKind::SetIcon,
        EventKind::OptionSet,
        EventKind::UpdateFg,
        EventKind::UpdateBg,
        EventKind::UpdateSp,
        EventKind::CursorGoto,
        EventKind::Put,
        EventKind::EolClear,
        EventKind::Clear,
        EventKind::Resize,
        EventKind::HighlightSet,
        EventKind::SetScrollRegion,
        EventKind::Scroll,
        EventKind::ModeChange,
        EventKind::ModeInfoSet,
        EventKind::MouseOn,
        EventKind::MouseOff,
        EventKind::Bell,
        EventKind::VisualBell,
        EventKind::PopupmenuShow,
        EventKind::PopupmenuHide,
        EventKind::PopupmenuSelect,
        EventKind::TablineUpdate,
        EventKind::CmdlineShow,
        EventKind::CmdlinePos,
        EventKind::CmdlineChar,
        EventKind::CmdlineHide,
        EventKind::CmdlineBlockShow,
        EventKind::CmdlineBlockAppend,
        EventKind::CmdlineBlockHide,
        EventKind::WildmenuShow,
        EventKind::WildmenuSelect,
        EventKind::WildmenuHide,
        EventKind::MsgStartKind,
        EventKind::MsgChunk,
        EventKind::MsgEnd,
        EventKind::MsgShowcmd,
        EventKind::BusyStart,
        EventKind::BusyStop,
        EventKind::Flush,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::SetTitle => "set_title",
            EventKind::SetIcon => "set_icon",
            EventKind::OptionSet => "option_set",
            EventKind::UpdateFg => "update_fg",
            EventKind::UpdateBg => "update_bg",
            EventKind::UpdateSp => "update_sp",
            EventKind::CursorGoto => "cursor_goto",
            EventKind::Put => "put",
            EventKind::EolClear => "eol_clear",
            EventKind::Clear => "clear",
            EventKind::Resize => "resize",
            EventKind::HighlightSet => "highlight_set",
            EventKind::SetScrollRegion => "set_scroll_region",
            EventKind::Scroll => "scroll",
            EventKind::ModeChange => "mode_change",
            EventKind::ModeInfoSet => "mode_info_set",
            EventKind::MouseOn => "mouse_on",
            EventKind::MouseOff => "mouse_off",
            EventKind::Bell => "bell",
            EventKind::VisualBell => "visual_bell",
            EventKind::PopupmenuShow => "popupmenu_show",
            EventKind::PopupmenuHide => "popupmenu_hide",
            EventKind::PopupmenuSelect => "popupmenu_select",
            EventKind::TablineUpdate => "tabline_update",
            EventKind::CmdlineShow => "cmdline_show",
            EventKind::CmdlinePos => "cmdline_pos",
            EventKind::CmdlineChar => "cmdline_char",
            EventKind::CmdlineHide => "cmdline_hide",
            EventKind::CmdlineBlockShow => "cmdline_block_show",
            EventKind::CmdlineBlockAppend => "cmdline_block_append",
            EventKind::CmdlineBlockHide => "cmdline_block_hide",
            EventKind::WildmenuShow => "wildmenu_show",
            EventKind::WildmenuSelect => "wildmenu_select",
            EventKind::WildmenuHide => "wildmenu_hide",
            EventKind::MsgStartKind => "msg_start_kind",
            EventKind::MsgChunk => "msg_chunk",
            EventKind::MsgEnd => "msg_end",
            EventKind::MsgShowcmd => "msg_showcmd",
            EventKind::BusyStart => "busy_start",
            EventKind::BusyStop => "busy_stop",
            EventKind::Flush => "flush",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        static BY_NAME: OnceLock<AHashMap<&'static str, EventKind>> = OnceLock::new();
        BY_NAME
            .get_or_init(|| Self::ALL.iter().map(|k| (k.name(), *k)).collect())
            .get(name)
            .copied()
    }
}

/// Kinds carried on the `Gui` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuiKind {
    FinderPattern,
    FinderPatternPos,
    FinderShowResult,
    FinderShow,
    FinderHide,
    FinderSelect,
    SignatureShow,
    SignaturePos,
    SignatureHide,
    HoverShow,
    HoverPos,
    HoverHide,
    Font,
    Linespace,
}

impl GuiKind {
    pub const ALL: [GuiKind; 14] = [
        GuiKind::FinderPattern,
        GuiKind::FinderPatternPos,
        GuiKind::FinderShowResult,
        GuiKind::FinderShow,
        GuiKind::FinderHide,
        GuiKind::FinderSelect,
        GuiKind::SignatureShow,
        GuiKind::SignaturePos,
        GuiKind::SignatureHide,
        GuiKind::HoverShow,
        GuiKind::HoverPos,
        GuiKind::HoverHide,
        GuiKind::Font,
        GuiKind::Linespace,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GuiKind::FinderPattern => "finder_pattern",
            GuiKind::FinderPatternPos => "finder_pattern_pos",
            GuiKind::FinderShowResult => "finder_show_result",
            GuiKind::FinderShow => "finder_show",
            GuiKind::FinderHide => "finder_hide",
            GuiKind::FinderSelect => "finder_select",
            GuiKind::SignatureShow => "signature_show",
            GuiKind::SignaturePos => "signature_pos",
            GuiKind::SignatureHide => "signature_hide",
            GuiKind::HoverShow => "hover_show",
            GuiKind::HoverPos => "hover_pos",
            GuiKind::HoverHide => "hover_hide",
            GuiKind::Font => "Font",
            GuiKind::Linespace => "Linespace",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        static BY_NAME: OnceLock<AHashMap<&'static str, GuiKind>> = OnceLock::new();
        BY_NAME
            .get_or_init(|| Self::ALL.iter().map(|k| (k.name(), *k)).collect())
            .get(name)
            .copied()
    }
}

/// Kind -> handler table.
#[derive(Debug, Clone)]
pub struct HandlerTable<K> {
    handlers: AHashMap<K, Handler>,
}

impl<K> Default for HandlerTable<K> {
    fn default() -> Self {
        Self {
            handlers: AHashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> HandlerTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: K, handler: Handler) -> Option<Handler> {
        self.handlers.insert(kind, handler)
    }

    pub fn get(&self, kind: K) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerTable<EventKind> {
    /// Every redraw kind wired to its built-in handler.
    pub fn redraw() -> Self {
        let mut table = Self::new();
        crate::handlers::install(&mut table);
        table
    }
}

impl HandlerTable<GuiKind> {
    /// Every GUI kind wired to its built-in handler.
    pub fn gui() -> Self {
        let mut table = Self::new();
        crate::gui::install(&mut table);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_lookup() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        for kind in GuiKind::ALL {
            assert_eq!(GuiKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("grid_line"), None);
        assert_eq!(GuiKind::from_name("font"), None);
    }

    #[test]
    fn built_in_tables_cover_every_kind() {
        let redraw = HandlerTable::redraw();
        assert_eq!(redraw.len(), EventKind::ALL.len());
        assert!(EventKind::ALL.iter().all(|k| redraw.get(*k).is_some()));
        let gui = HandlerTable::gui();
        assert_eq!(gui.len(), GuiKind::ALL.len());
    }

    #[test]
    fn register_replaces_existing_handler() {
        fn noop(_: &mut Session, _: Args<'_>) -> Result<(), ProtocolError> {
            Ok(())
        }
        let mut table = HandlerTable::redraw();
        assert!(table.register(EventKind::Bell, noop).is_some());
        assert_eq!(table.len(), EventKind::ALL.len());
    }
}
