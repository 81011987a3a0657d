//! Built-in handlers for the `redraw` channel.
//!
//! Each handler decodes one argument tuple, mutates the session and marks the damage it caused.
//! Decoding errors are returned, never panicked on; the dispatcher counts and logs them.

use crate::Session;
use crate::dispatch::{EventKind, HandlerTable};
use crate::scheduler::Damage;
use core_events::{Args, ProtocolError};
use core_overlay::{CmdlineChunk, Overlay, PopupItem, Tab, selection_from_wire};
use core_style::Highlight;
use serde_json::Value;
use tracing::{debug, trace};

pub(crate) fn install(table: &mut HandlerTable<EventKind>) {
    use EventKind::*;
    table.register(SetTitle, set_title);
    table.register(SetIcon, set_icon);
    table.register(OptionSet, option_set);
    table.register(UpdateFg, update_fg);
    table.register(UpdateBg, update_bg);
    table.register(UpdateSp, update_sp);
    table.register(CursorGoto, cursor_goto);
    table.register(Put, put);
    table.register(EolClear, eol_clear);
    table.register(Clear, clear);
    table.register(Resize, resize);
    table.register(HighlightSet, highlight_set);
    table.register(SetScrollRegion, set_scroll_region);
    table.register(Scroll, scroll);
    table.register(ModeChange, mode_change);
    table.register(ModeInfoSet, mode_info_set);
    table.register(MouseOn, mouse_on);
    table.register(MouseOff, mouse_off);
    table.register(Bell, bell);
    table.register(VisualBell, visual_bell);
    table.register(PopupmenuShow, popupmenu_show);
    table.register(PopupmenuHide, popupmenu_hide);
    table.register(PopupmenuSelect, popupmenu_select);
    table.register(TablineUpdate, tabline_update);
    table.register(CmdlineShow, cmdline_show);
    table.register(CmdlinePos, cmdline_pos);
    table.register(CmdlineChar, cmdline_char);
    table.register(CmdlineHide, cmdline_hide);
    table.register(CmdlineBlockShow, cmdline_block_show);
    table.register(CmdlineBlockAppend, cmdline_block_append);
    table.register(CmdlineBlockHide, cmdline_block_hide);
    table.register(WildmenuShow, wildmenu_show);
    table.register(WildmenuSelect, wildmenu_select);
    table.register(WildmenuHide, wildmenu_hide);
    // Messages are rendered by the editor in the grid itself.
    table.register(MsgStartKind, acknowledge);
    table.register(MsgChunk, acknowledge);
    table.register(MsgEnd, acknowledge);
    table.register(MsgShowcmd, acknowledge);
    table.register(BusyStart, busy_start);
    table.register(BusyStop, busy_stop);
    table.register(Flush, flush);
}

type HandlerResult = Result<(), ProtocolError>;

fn set_title(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.title = args.str(0)?.to_string();
    Ok(())
}

fn set_icon(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.icon = args.str(0)?.to_string();
    Ok(())
}

fn option_set(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let name = args.str(0)?;
    let value = args.get(1)?;
    match name {
        "guifont" => {
            if let Some(spec) = value.as_str() {
                s.apply_font(spec);
            }
        }
        "linespace" => {
            s.apply_linespace(value);
        }
        _ => {}
    }
    s.options.insert(name.to_string(), value.clone());
    Ok(())
}

fn update_fg(s: &mut Session, args: Args<'_>) -> HandlerResult {
    if s.colors.update_foreground(args.i64(0)?) {
        s.scheduler.mark(Damage::Colors);
    }
    Ok(())
}

fn update_bg(s: &mut Session, args: Args<'_>) -> HandlerResult {
    if s.colors.update_background(args.i64(0)?) {
        s.scheduler.mark(Damage::Colors);
    }
    Ok(())
}

fn update_sp(s: &mut Session, args: Args<'_>) -> HandlerResult {
    if s.colors.update_special(args.i64(0)?) {
        s.scheduler.mark(Damage::Colors);
    }
    Ok(())
}

fn cursor_goto(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let row = args.usize(0)?;
    let col = args.usize(1)?;
    s.grid.cursor_goto(row, col);
    s.scheduler.mark(Damage::Cursor);
    Ok(())
}

fn put(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let text = args.str(0)?;
    let row = s.grid.cursor().row;
    s.grid.put(text);
    s.scheduler.mark(Damage::Rows(row..row + 1));
    Ok(())
}

fn eol_clear(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    let row = s.grid.cursor().row;
    s.grid.eol_clear();
    s.scheduler.mark(Damage::Rows(row..row + 1));
    Ok(())
}

fn clear(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.grid.clear();
    s.scheduler.mark(Damage::Full);
    Ok(())
}

/// `[cols, rows]` on the wire.
fn resize(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let cols = args.usize(0)?;
    let rows = args.usize(1)?;
    s.grid.resize(rows, cols);
    s.relayout_overlays();
    s.scheduler.mark(Damage::Full);
    Ok(())
}

fn highlight_set(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let attrs = args.map(0)?;
    s.grid.highlight_set(Highlight::from_attrs(attrs));
    Ok(())
}

fn set_scroll_region(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let top = args.usize(0)?;
    let bottom = args.usize(1)?;
    let left = args.usize(2)?;
    let right = args.usize(3)?;
    s.grid.set_scroll_region(top, bottom, left, right);
    Ok(())
}

fn scroll(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let count = args.i64(0)?;
    let region = s.grid.scroll_region();
    s.grid.scroll(count);
    s.scheduler.mark(Damage::Rows(region.top..region.bottom + 1));
    Ok(())
}

fn mode_change(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let mode = args.str(0)?;
    s.grid.mode_change(mode);
    s.mode_index = args.opt_i64(1);
    s.scheduler.mark(Damage::Cursor);
    Ok(())
}

fn mode_info_set(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.cursor_style_enabled = args.bool(0)?;
    s.mode_info = args.array(1)?.clone();
    s.scheduler.mark(Damage::Cursor);
    Ok(())
}

fn mouse_on(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.mouse_enabled = true;
    Ok(())
}

fn mouse_off(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.mouse_enabled = false;
    Ok(())
}

fn bell(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.bells += 1;
    debug!(target: "redraw.dispatch", total = s.bells, "bell");
    Ok(())
}

fn visual_bell(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.visual_bells += 1;
    debug!(target: "redraw.dispatch", total = s.visual_bells, "visual_bell");
    Ok(())
}

fn busy_start(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.busy = true;
    s.scheduler.mark(Damage::Cursor);
    Ok(())
}

fn busy_stop(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.busy = false;
    s.scheduler.mark(Damage::Cursor);
    Ok(())
}

/// The batch boundary itself is the repaint point; `flush` carries nothing else.
fn flush(_s: &mut Session, _args: Args<'_>) -> HandlerResult {
    trace!(target: "redraw.dispatch", "flush");
    Ok(())
}

fn acknowledge(_s: &mut Session, _args: Args<'_>) -> HandlerResult {
    Ok(())
}

fn popupmenu_show(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let items = args
        .array(0)?
        .iter()
        .map(|item| popup_item(args.event(), item))
        .collect::<Result<Vec<_>, _>>()?;
    let selected = selection_from_wire(args.i64(1)?);
    let row = args.usize(2)?;
    let col = args.usize(3)?;
    let metrics = s.metrics();
    s.popup.show(items, selected, row, col, &metrics);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

/// `[word, kind, menu, info]`; trailing fields may be missing.
fn popup_item(event: &str, item: &Value) -> Result<PopupItem, ProtocolError> {
    let fields = item.as_array().ok_or_else(|| ProtocolError::WrongType {
        event: event.to_string(),
        index: 0,
        expected: "an array of popup items",
    })?;
    let args = Args::new(event, fields);
    Ok(PopupItem {
        word: args.str(0)?.to_string(),
        kind: args.opt_str(1).unwrap_or_default().to_string(),
        menu: args.opt_str(2).unwrap_or_default().to_string(),
        info: args.opt_str(3).unwrap_or_default().to_string(),
    })
}

fn popupmenu_select(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.popup.select(selection_from_wire(args.i64(0)?));
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn popupmenu_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    if s.popup.hide() {
        s.scheduler.mark(Damage::Overlay);
    }
    Ok(())
}

/// `[current_handle, [{tab, name}...]]`.
fn tabline_update(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let current = args.i64(0)?;
    let tabs = args
        .array(1)?
        .iter()
        .map(|tab| -> Result<Tab, ProtocolError> {
            let wrong = || ProtocolError::WrongType {
                event: args.event().to_string(),
                index: 1,
                expected: "a list of {tab, name} maps",
            };
            let map = tab.as_object().ok_or_else(wrong)?;
            let handle = map.get("tab").and_then(Value::as_i64).ok_or_else(wrong)?;
            let name = map.get("name").and_then(Value::as_str).unwrap_or_default();
            Ok(Tab::new(handle, name))
        })
        .collect::<Result<Vec<_>, _>>()?;
    s.tabline.update(current, tabs);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

/// `[[attrs, text], ...]`.
fn chunks(event: &str, index: usize, values: &[Value]) -> Result<Vec<CmdlineChunk>, ProtocolError> {
    let wrong = || ProtocolError::WrongType {
        event: event.to_string(),
        index,
        expected: "a list of [attrs, text] chunks",
    };
    values
        .iter()
        .map(|chunk| -> Result<CmdlineChunk, ProtocolError> {
            let pair = chunk.as_array().ok_or_else(wrong)?;
            let [attrs, text] = pair.as_slice() else {
                return Err(wrong());
            };
            let text = text.as_str().ok_or_else(wrong)?;
            let highlight = attrs
                .as_object()
                .map(Highlight::from_attrs)
                .unwrap_or_default();
            Ok(CmdlineChunk {
                highlight,
                text: text.to_string(),
            })
        })
        .collect()
}

/// `[content, pos, firstc, prompt, indent, level]`.
fn cmdline_show(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let content = chunks(args.event(), 0, args.array(0)?)?;
    let pos = args.usize(1)?;
    let firstc = args.str(2)?;
    let prompt = args.str(3)?;
    let indent = args.usize(4)?;
    let level = args.i64(5)?;
    let metrics = s.metrics();
    let rows = s.grid.rows();
    s.cmdline
        .show(content, pos, firstc, prompt, indent, level, &metrics, rows);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn cmdline_pos(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let pos = args.usize(0)?;
    let level = args.i64(1)?;
    s.cmdline.set_pos(pos, level);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn cmdline_char(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let c = args.str(0)?;
    let shift = args.bool(1)?;
    let level = args.i64(2)?;
    s.cmdline.set_char(c, shift, level);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn cmdline_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    if s.cmdline.hide() {
        s.scheduler.mark(Damage::Overlay);
    }
    Ok(())
}

fn cmdline_block_show(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let lines = args
        .array(0)?
        .iter()
        .map(|line| match line.as_array() {
            Some(line) => chunks(args.event(), 0, line),
            None => Err(ProtocolError::WrongType {
                event: args.event().to_string(),
                index: 0,
                expected: "a list of lines",
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    s.cmdline.block_show(lines);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn cmdline_block_append(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let line = chunks(args.event(), 0, args.array(0)?)?;
    s.cmdline.block_append(line);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn cmdline_block_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.cmdline.block_hide();
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn wildmenu_show(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let items = args
        .array(0)?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ProtocolError::WrongType {
                    event: args.event().to_string(),
                    index: 0,
                    expected: "a list of strings",
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    s.cmdline.wildmenu_mut().show(items);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn wildmenu_select(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.cmdline
        .wildmenu_mut()
        .select(selection_from_wire(args.i64(0)?));
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn wildmenu_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    if s.cmdline.wildmenu_mut().hide() {
        s.scheduler.mark(Damage::Overlay);
    }
    Ok(())
}
