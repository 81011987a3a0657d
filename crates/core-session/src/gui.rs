//! Handlers for the `Gui` channel (finder, signature help, hover, font).
//!
//! Arguments are flat: `["hover_show", text, [row, col]]` arrives as name `hover_show` with args
//! `[text, [row, col]]`.

use crate::Session;
use crate::dispatch::{GuiKind, HandlerTable};
use crate::scheduler::Damage;
use core_events::{Args, ProtocolError};
use core_overlay::{FinderRow, Overlay, ResultKind, selection_from_wire};
use serde_json::Value;

pub(crate) fn install(table: &mut HandlerTable<GuiKind>) {
    use GuiKind::*;
    table.register(FinderPattern, finder_pattern);
    table.register(FinderPatternPos, finder_pattern_pos);
    table.register(FinderShowResult, finder_show_result);
    table.register(FinderShow, finder_show);
    table.register(FinderHide, finder_hide);
    table.register(FinderSelect, finder_select);
    table.register(SignatureShow, signature_show);
    table.register(SignaturePos, signature_pos);
    table.register(SignatureHide, signature_hide);
    table.register(HoverShow, hover_show);
    table.register(HoverPos, hover_pos);
    table.register(HoverHide, hover_hide);
    table.register(Font, font);
    table.register(Linespace, linespace);
}

type HandlerResult = Result<(), ProtocolError>;

/// `guifont` value: `Family:h12`. Options other than the height are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    pub height: u32,
}

impl FontSpec {
    pub const DEFAULT_HEIGHT: u32 = 14;

    /// `None` for an empty family or an unparsable height.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split(':');
        let family = parts.next()?.trim();
        if family.is_empty() {
            return None;
        }
        let mut height = Self::DEFAULT_HEIGHT;
        for part in parts {
            if let Some(h) = part.strip_prefix('h') {
                height = h.parse().ok()?;
            }
        }
        Some(Self {
            family: family.to_string(),
            height,
        })
    }
}

/// `linespace` arrives either as an integer or as its decimal string.
pub(crate) fn parse_linespace(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `[row, col]` offset relative to the grid cursor.
fn offset(args: &Args<'_>, index: usize) -> Result<(i64, i64), ProtocolError> {
    let pair = args.array(index)?;
    let nested = Args::new(args.event(), pair);
    Ok((nested.i64(0)?, nested.i64(1)?))
}

fn finder_pattern(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let pattern = args.str(0)?;
    let metrics = s.metrics();
    let cols = s.grid.cols();
    s.finder.set_pattern(pattern, &metrics, cols);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn finder_pattern_pos(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.finder.set_pattern_pos(args.usize(0)?);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

/// `[results, selected, matches, result_type?]`; the type defaults to plain lines.
fn finder_show_result(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let results = args.array(0)?;
    let selected = selection_from_wire(args.i64(1)?);
    let matches = args.array(2)?;
    let kind = ResultKind::from_name(args.opt_str(3).unwrap_or("line"));
    let rows = results
        .iter()
        .enumerate()
        .map(|(i, text)| -> Result<FinderRow, ProtocolError> {
            let text = text.as_str().ok_or_else(|| ProtocolError::WrongType {
                event: args.event().to_string(),
                index: 0,
                expected: "a list of strings",
            })?;
            let positions = matches
                .get(i)
                .and_then(Value::as_array)
                .map(|m| {
                    m.iter()
                        .filter_map(Value::as_u64)
                        .filter_map(|p| usize::try_from(p).ok())
                        .collect()
                })
                .unwrap_or_default();
            Ok(FinderRow::new(text, kind, positions))
        })
        .collect::<Result<Vec<_>, _>>()?;
    s.finder.show_result(rows, selected);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn finder_show(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    s.finder.show();
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn finder_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    if s.finder.hide() {
        s.scheduler.mark(Damage::Overlay);
    }
    Ok(())
}

fn finder_select(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.finder.select(selection_from_wire(args.i64(0)?));
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

/// `[text, [row, col], active]`.
fn signature_show(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let text = args.str(0)?;
    let off = offset(&args, 1)?;
    let active = args.usize(2)?;
    let cursor = s.grid.cursor();
    let metrics = s.metrics();
    s.signature.show(text, off, active, cursor, &metrics);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

/// `[active]`.
fn signature_pos(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.signature.set_active(args.usize(0)?);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn signature_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    if s.signature.hide() {
        s.scheduler.mark(Damage::Overlay);
    }
    Ok(())
}

/// `[text, [row, col]]`.
fn hover_show(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let text = args.str(0)?;
    let off = offset(&args, 1)?;
    let cursor = s.grid.cursor();
    let metrics = s.metrics();
    s.hover.show(text, off, cursor, &metrics);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

/// `[[row, col]]`.
fn hover_pos(s: &mut Session, args: Args<'_>) -> HandlerResult {
    let off = offset(&args, 0)?;
    let cursor = s.grid.cursor();
    let metrics = s.metrics();
    s.hover.set_offset(off, cursor, &metrics);
    s.scheduler.mark(Damage::Overlay);
    Ok(())
}

fn hover_hide(s: &mut Session, _args: Args<'_>) -> HandlerResult {
    if s.hover.hide() {
        s.scheduler.mark(Damage::Overlay);
    }
    Ok(())
}

fn font(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.apply_font(args.str(0)?);
    Ok(())
}

fn linespace(s: &mut Session, args: Args<'_>) -> HandlerResult {
    s.apply_linespace(args.get(0)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn font_spec_parsing() {
        assert_eq!(
            FontSpec::parse("Hack:h12"),
            Some(FontSpec {
                family: "Hack".into(),
                height: 12
            })
        );
        assert_eq!(FontSpec::parse("Fira Code").map(|f| f.height), Some(14));
        assert_eq!(FontSpec::parse("Hack:b:h9").map(|f| f.height), Some(9));
        assert_eq!(FontSpec::parse("Hack:hx"), None);
        assert_eq!(FontSpec::parse(":h12"), None);
    }

    #[test]
    fn finder_drops_unrepresentable_match_positions() {
        use core_events::GuiNotification;

        let mut s = Session::default();
        s.apply_gui(&GuiNotification::new(
            "finder_show_result",
            vec![json!(["abc"]), json!(0), json!([[0, -1, "x", 2.5, 2]])],
        ));
        assert_eq!(s.stats().malformed, 0);
        assert_eq!(s.finder().items()[0].matches, vec![0, 2]);
    }

    #[test]
    fn linespace_accepts_int_or_string() {
        assert_eq!(parse_linespace(&json!(3)), Some(3));
        assert_eq!(parse_linespace(&json!("4")), Some(4));
        assert_eq!(parse_linespace(&json!("x")), None);
        assert_eq!(parse_linespace(&json!(true)), None);
    }
}
