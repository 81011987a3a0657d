//! Session state and the redraw dispatcher.
//!
//! A `Session` owns the grid, every overlay and the default colors of one editor connection.
//! It is mutated only by applying events, one batch at a time, through `&mut self`: the single
//! consumer of the event channel is the only writer, so batches can never interleave.
//!
//! Applying a batch runs every handler call in order, collapses the damage they marked into one
//! `Repaint` hint and notifies the observers exactly once. Errors inside a batch (unknown event
//! names, malformed arguments) are counted and logged, never propagated.

use core_config::Settings;
use core_events::{Args, Batch, Event, GuiNotification};
use core_grid::{Cell, CursorPos, Grid, GridError};
use core_overlay::{AnchorMetrics, Cmdline, Finder, Hover, PopupMenu, Signature, Tabline};
use core_style::DefaultColors;
use core_transport::{QueryError, Request, Transport, query_string};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod color;
pub mod dispatch;
pub mod gui;
mod handlers;
pub mod runtime;
pub mod scheduler;
pub mod surface;

pub use color::ColorPolicy;
pub use dispatch::{EventKind, GuiKind, Handler, HandlerTable};
pub use gui::FontSpec;
pub use runtime::{RunSummary, run};
pub use scheduler::{Damage, Repaint, RepaintMetricsSnapshot, RepaintScheduler};
pub use surface::{InputRouter, NullSurface, Surface};

/// Construction parameters, usually derived from the loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub rows: usize,
    pub cols: usize,
    pub colors: DefaultColors,
    pub grace_flushes: u32,
    pub metrics: AnchorMetrics,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SessionOptions {
    /// 80x24 until the first `resize` arrives.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rows: 24,
            cols: 80,
            colors: settings.colors,
            grace_flushes: settings.grace_flushes,
            metrics: AnchorMetrics::new(settings.cell_width, settings.line_height),
        }
    }
}

/// Called once per applied batch.
pub trait RepaintObserver: Send {
    fn on_repaint(&mut self, session: &Session, repaint: &Repaint);
}

impl<F> RepaintObserver for F
where
    F: FnMut(&Session, &Repaint) + Send,
{
    fn on_repaint(&mut self, session: &Session, repaint: &Repaint) {
        self(session, repaint)
    }
}

/// Dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Applied batches, GUI notifications included.
    pub batches: u64,
    /// Handler calls attempted.
    pub events: u64,
    /// Updates whose name has no handler.
    pub unknown: u64,
    /// Handler calls or updates rejected for their argument shape.
    pub malformed: u64,
}

pub struct Session {
    pub(crate) grid: Grid,
    pub(crate) popup: PopupMenu,
    pub(crate) cmdline: Cmdline,
    pub(crate) finder: Finder,
    pub(crate) signature: Signature,
    pub(crate) hover: Hover,
    pub(crate) tabline: Tabline,
    pub(crate) colors: ColorPolicy,
    pub(crate) scheduler: RepaintScheduler,
    pub(crate) base_metrics: AnchorMetrics,
    pub(crate) title: String,
    pub(crate) icon: String,
    pub(crate) options: BTreeMap<String, Value>,
    pub(crate) font: Option<FontSpec>,
    pub(crate) linespace: i64,
    pub(crate) busy: bool,
    pub(crate) mouse_enabled: bool,
    pub(crate) mode_index: Option<i64>,
    pub(crate) mode_info: Vec<Value>,
    pub(crate) cursor_style_enabled: bool,
    pub(crate) bells: u64,
    pub(crate) visual_bells: u64,
    redraw_handlers: HandlerTable<EventKind>,
    gui_handlers: HandlerTable<GuiKind>,
    observers: Vec<Box<dyn RepaintObserver>>,
    stats: DispatchStats,
    stopped: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("rows", &self.grid.rows())
            .field("cols", &self.grid.cols())
            .field("mode", &self.grid.mode())
            .field("stats", &self.stats)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            grid: Grid::new(options.rows, options.cols),
            popup: PopupMenu::new(),
            cmdline: Cmdline::new(),
            finder: Finder::new(),
            signature: Signature::new(),
            hover: Hover::new(),
            tabline: Tabline::new(),
            colors: ColorPolicy::new(options.colors, options.grace_flushes),
            scheduler: RepaintScheduler::new(),
            base_metrics: options.metrics,
            title: String::new(),
            icon: String::new(),
            options: BTreeMap::new(),
            font: None,
            linespace: 0,
            busy: false,
            mouse_enabled: false,
            mode_index: None,
            mode_info: Vec::new(),
            cursor_style_enabled: false,
            bells: 0,
            visual_bells: 0,
            redraw_handlers: HandlerTable::redraw(),
            gui_handlers: HandlerTable::gui(),
            observers: Vec::new(),
            stats: DispatchStats::default(),
            stopped: false,
        }
    }

    /// Replace or add the handler for a redraw kind.
    pub fn register_handler(&mut self, kind: EventKind, handler: Handler) -> Option<Handler> {
        self.redraw_handlers.register(kind, handler)
    }

    /// Replace or add the handler for a GUI kind.
    pub fn register_gui_handler(&mut self, kind: GuiKind, handler: Handler) -> Option<Handler> {
        self.gui_handlers.register(kind, handler)
    }

    pub fn subscribe(&mut self, observer: impl RepaintObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply one channel event. Returns the repaint hint for batch events.
    pub fn apply_event(&mut self, event: &Event) -> Option<Repaint> {
        match event {
            Event::Redraw(batch) => Some(self.apply_batch(batch)),
            Event::Gui(note) => Some(self.apply_gui(note)),
            Event::Stopped | Event::Shutdown => {
                if !self.stopped {
                    info!(target: "redraw.dispatch", kind = event.kind_str(), stats = ?self.stats, "session_stopped");
                }
                self.stopped = true;
                None
            }
        }
    }

    /// Apply every update of `batch` in order, then repaint once.
    pub fn apply_batch(&mut self, batch: &Batch) -> Repaint {
        self.colors.begin_batch();
        for event in &batch.events {
            let Some(handler) =
                EventKind::from_name(&event.name).and_then(|k| self.redraw_handlers.get(k))
            else {
                self.note_unknown("redraw", &event.name);
                continue;
            };
            for call in &event.calls {
                self.invoke(handler, Args::new(&event.name, call));
            }
        }
        if batch.malformed > 0 {
            self.stats.malformed += batch.malformed as u64;
        }
        if self.colors.end_batch() {
            self.scheduler.mark(Damage::Colors);
        }
        self.finish_batch(batch.events.len())
    }

    /// Apply one GUI notification as its own single-event batch.
    pub fn apply_gui(&mut self, note: &GuiNotification) -> Repaint {
        match GuiKind::from_name(&note.name).and_then(|k| self.gui_handlers.get(k)) {
            Some(handler) => self.invoke(handler, Args::new(&note.name, &note.args)),
            None => self.note_unknown("gui", &note.name),
        }
        self.finish_batch(1)
    }

    fn invoke(&mut self, handler: Handler, args: Args<'_>) {
        self.stats.events += 1;
        if let Err(e) = handler(self, args) {
            self.stats.malformed += 1;
            warn!(target: "redraw.dispatch", event = args.event(), error = %e, "malformed_event");
        }
    }

    fn note_unknown(&mut self, channel: &'static str, name: &str) {
        self.stats.unknown += 1;
        warn!(target: "redraw.dispatch", channel, event = name, "unknown_event");
    }

    fn finish_batch(&mut self, updates: usize) -> Repaint {
        let repaint = self.scheduler.consume();
        self.stats.batches += 1;
        debug!(target: "redraw.dispatch", updates, ?repaint, "batch_applied");
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer.on_repaint(self, &repaint);
        }
        observers.append(&mut self.observers);
        self.observers = observers;
        repaint
    }

    /// Ask the editor for its mode and record it. Used where `mode_change` is not sent
    /// (terminal buffers).
    pub async fn probe_mode<T: Transport>(
        &mut self,
        transport: &T,
        timeout: Duration,
    ) -> Result<&str, QueryError> {
        let code = query_string(transport, Request::mode(), timeout).await?;
        let Some(name) = mode_name(&code) else {
            debug!(target: "redraw.dispatch", code = %code, "mode_probe_unmapped");
            return Ok(self.grid.mode());
        };
        self.grid.mode_change(name);
        self.scheduler.mark(Damage::Cursor);
        Ok(self.grid.mode())
    }

    pub(crate) fn metrics(&self) -> AnchorMetrics {
        let line_height = (i64::from(self.base_metrics.line_height) + self.linespace)
            .clamp(1, i64::from(u32::MAX)) as u32;
        AnchorMetrics::new(self.base_metrics.cell_width, line_height)
    }

    /// The renderer reports real font metrics.
    pub fn set_metrics(&mut self, metrics: AnchorMetrics) {
        if self.base_metrics != metrics {
            self.base_metrics = metrics;
            self.relayout_overlays();
        }
    }

    pub(crate) fn relayout_overlays(&mut self) {
        let metrics = self.metrics();
        let cursor = self.grid.cursor();
        self.popup.relayout(&metrics);
        self.finder.recenter(&metrics, self.grid.cols());
        self.signature.reposition(cursor, &metrics);
        self.hover.reposition(cursor, &metrics);
    }

    pub(crate) fn apply_font(&mut self, spec: &str) {
        match FontSpec::parse(spec) {
            Some(font) => {
                info!(target: "redraw.dispatch", family = %font.family, height = font.height, "font_changed");
                self.font = Some(font);
                self.relayout_overlays();
                self.scheduler.mark(Damage::Full);
            }
            None => debug!(target: "redraw.dispatch", spec, "font_spec_ignored"),
        }
    }

    pub(crate) fn apply_linespace(&mut self, value: &Value) {
        match gui::parse_linespace(value) {
            Some(linespace) => {
                self.linespace = linespace;
                self.relayout_overlays();
                self.scheduler.mark(Damage::Full);
            }
            None => debug!(target: "redraw.dispatch", ?value, "linespace_ignored"),
        }
    }

    // ---------------------------------------------------------------------------------------
    // Read side
    // ---------------------------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        self.grid.get_cell(row, col)
    }

    pub fn cursor(&self) -> CursorPos {
        self.grid.cursor()
    }

    pub fn mode(&self) -> &str {
        self.grid.mode()
    }

    /// Index into `mode_info` sent with the last `mode_change`.
    pub fn mode_index(&self) -> Option<i64> {
        self.mode_index
    }

    pub fn mode_info(&self) -> &[Value] {
        &self.mode_info
    }

    pub fn cursor_style_enabled(&self) -> bool {
        self.cursor_style_enabled
    }

    pub fn popup(&self) -> &PopupMenu {
        &self.popup
    }

    pub fn cmdline(&self) -> &Cmdline {
        &self.cmdline
    }

    pub fn finder(&self) -> &Finder {
        &self.finder
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn hover(&self) -> &Hover {
        &self.hover
    }

    pub fn tabline(&self) -> &Tabline {
        &self.tabline
    }

    /// Defaults currently in effect for cells without their own colors.
    pub fn colors(&self) -> DefaultColors {
        self.colors.effective()
    }

    pub fn color_policy(&self) -> &ColorPolicy {
        &self.colors
    }

    pub fn anchor_metrics(&self) -> AnchorMetrics {
        self.metrics()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn font(&self) -> Option<&FontSpec> {
        self.font.as_ref()
    }

    pub fn linespace(&self) -> i64 {
        self.linespace
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn mouse_enabled(&self) -> bool {
        self.mouse_enabled
    }

    pub fn bells(&self) -> u64 {
        self.bells
    }

    pub fn visual_bells(&self) -> u64 {
        self.visual_bells
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn repaint_metrics(&self) -> RepaintMetricsSnapshot {
        self.scheduler.metrics_snapshot()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Short codes returned by `mode()` mapped to `mode_change` names.
pub fn mode_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "t" => "terminal-input",
        "n" => "normal",
        "c" => "cmdline_normal",
        "i" => "insert",
        "v" => "visual",
        "R" => "replace",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::NamedEvent;
    use serde_json::json;

    fn batch(events: Value) -> Batch {
        Batch::from_redraw_params(&events).unwrap()
    }

    #[test]
    fn mode_codes_map_to_names() {
        assert_eq!(mode_name("t"), Some("terminal-input"));
        assert_eq!(mode_name("c"), Some("cmdline_normal"));
        assert_eq!(mode_name("R"), Some("replace"));
        assert_eq!(mode_name("no"), None);
    }

    #[test]
    fn option_set_tracks_font_and_linespace() {
        let mut s = Session::default();
        s.apply_batch(&batch(json!([
            ["option_set", ["guifont", "Hack:h11"], ["linespace", "3"], ["ruler", true]]
        ])));
        assert_eq!(s.font().map(|f| f.height), Some(11));
        assert_eq!(s.linespace(), 3);
        assert_eq!(s.option("ruler"), Some(&json!(true)));
        assert_eq!(s.anchor_metrics().line_height, 19);
    }

    #[test]
    fn handlers_can_be_replaced() {
        fn shout(s: &mut Session, args: Args<'_>) -> Result<(), core_events::ProtocolError> {
            s.title = args.str(0)?.to_uppercase();
            Ok(())
        }
        let mut s = Session::default();
        assert!(s.register_handler(EventKind::SetTitle, shout).is_some());
        s.apply_batch(&Batch::new(vec![NamedEvent::new(
            "set_title",
            vec![vec![json!("vim")]],
        )]));
        assert_eq!(s.title(), "VIM");
    }

    #[test]
    fn stop_is_recorded_once() {
        let mut s = Session::default();
        assert_eq!(s.apply_event(&Event::Stopped), None);
        assert_eq!(s.apply_event(&Event::Shutdown), None);
        assert!(s.is_stopped());
    }
}
