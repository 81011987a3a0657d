//! Repaint scheduler.
//!
//! Handlers report what they touched (`Damage`) via `mark` while a batch applies. At batch end
//! `consume` collapses everything into one `Repaint` hint for the observers.
//!
//! Collapse rules:
//! - `Full` or `Colors` anywhere in the queue yields `Full` (a color change invalidates every
//!   cell that inherits a default).
//! - Multiple `Rows` merge into one half-open range `[min(start), max(end))`.
//! - Heterogeneous precedence: `Full` > `Rows` > `Overlay` > `Cursor`.
//! - An empty queue yields `Repaint::Nothing`; the observers still fire once.
//!
//! Examples:
//! - `Rows(5..6) + Cursor` => `Rows(5..6)`.
//! - `Overlay + Cursor` => `Overlay`.
//! - `Rows(0..1) + Colors` => `Full`.

use smallvec::SmallVec;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Damage reported by a single handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Damage {
    Full,
    /// Default colors changed.
    Colors,
    /// Grid rows, half-open.
    Rows(Range<usize>),
    Overlay,
    Cursor,
}

/// Collapsed hint handed to observers once per batch. Consumers re-read session state; this is
/// never a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repaint {
    Nothing,
    Cursor,
    Overlay,
    Rows(Range<usize>),
    Full,
}

#[derive(Debug, Default)]
pub struct RepaintScheduler {
    pending: SmallVec<[Damage; 8]>,
    metrics: RepaintMetrics,
}

#[derive(Debug, Default)]
pub struct RepaintMetrics {
    full: AtomicU64,
    rows: AtomicU64,
    overlay: AtomicU64,
    cursor: AtomicU64,
    nothing: AtomicU64,
    /// Marks absorbed by a collapse (everything beyond the first mark of a batch).
    collapsed_marks: AtomicU64,
    frames: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepaintMetricsSnapshot {
    pub full: u64,
    pub rows: u64,
    pub overlay: u64,
    pub cursor: u64,
    pub nothing: u64,
    pub collapsed_marks: u64,
    pub frames: u64,
}

impl RepaintMetrics {
    pub fn snapshot(&self) -> RepaintMetricsSnapshot {
        RepaintMetricsSnapshot {
            full: self.full.load(Relaxed),
            rows: self.rows.load(Relaxed),
            overlay: self.overlay.load(Relaxed),
            cursor: self.cursor.load(Relaxed),
            nothing: self.nothing.load(Relaxed),
            collapsed_marks: self.collapsed_marks.load(Relaxed),
            frames: self.frames.load(Relaxed),
        }
    }

    fn incr(&self, repaint: &Repaint) {
        let counter = match repaint {
            Repaint::Full => &self.full,
            Repaint::Rows(_) => &self.rows,
            Repaint::Overlay => &self.overlay,
            Repaint::Cursor => &self.cursor,
            Repaint::Nothing => &self.nothing,
        };
        counter.fetch_add(1, Relaxed);
        self.frames.fetch_add(1, Relaxed);
    }
}

impl RepaintScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics_snapshot(&self) -> RepaintMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Record damage. Consecutive identical marks (a run of `put` on one row) are stored once.
    pub fn mark(&mut self, damage: Damage) {
        if self.pending.last() == Some(&damage) {
            return;
        }
        tracing::trace!(target: "redraw.scheduler", ?damage, "repaint_mark");
        self.pending.push(damage);
    }

    /// Collapse queued damage into the hint for this batch and reset the queue.
    pub fn consume(&mut self) -> Repaint {
        let repaint = self.collapse();
        if self.pending.len() > 1 {
            self.metrics
                .collapsed_marks
                .fetch_add(self.pending.len() as u64 - 1, Relaxed);
        }
        self.pending.clear();
        self.metrics.incr(&repaint);
        tracing::trace!(target: "redraw.scheduler", ?repaint, "repaint_collapse");
        repaint
    }

    fn collapse(&self) -> Repaint {
        if self
            .pending
            .iter()
            .any(|d| matches!(d, Damage::Full | Damage::Colors))
        {
            return Repaint::Full;
        }
        let mut rows: Option<Range<usize>> = None;
        let mut overlay = false;
        let mut cursor = false;
        for d in &self.pending {
            match d {
                Damage::Full | Damage::Colors => return Repaint::Full,
                Damage::Rows(r) => {
                    rows = Some(match rows.take() {
                        None => r.clone(),
                        Some(existing) => existing.start.min(r.start)..existing.end.max(r.end),
                    });
                }
                Damage::Overlay => overlay = true,
                Damage::Cursor => cursor = true,
            }
        }
        if let Some(r) = rows {
            return Repaint::Rows(r);
        }
        if overlay {
            return Repaint::Overlay;
        }
        if cursor {
            return Repaint::Cursor;
        }
        Repaint::Nothing
    }
}
