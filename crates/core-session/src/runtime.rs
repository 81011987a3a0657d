//! Consumer side of the event channel.

use crate::Session;
use crate::surface::Surface;
use core_events::{Event, EventHooks};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: u64,
    pub repaints: u64,
    /// A source reported end of stream (as opposed to every sender going away).
    pub stopped: bool,
}

/// Drain `rx` into `session` until a source stops or every sender is dropped.
///
/// Events are applied strictly in arrival order, each batch to completion before the next is
/// received, and the surface draws once per applied batch.
pub async fn run(
    session: &mut Session,
    rx: &mut Receiver<Event>,
    surface: &mut dyn Surface,
    hooks: &dyn EventHooks,
) -> RunSummary {
    let mut summary = RunSummary::default();
    while let Some(event) = rx.recv().await {
        summary.events += 1;
        hooks.pre_handle(&event);
        if let Some(repaint) = session.apply_event(&event) {
            surface.draw(session, &repaint);
            summary.repaints += 1;
        }
        hooks.post_handle(&event);
        if session.is_stopped() {
            summary.stopped = true;
            break;
        }
    }
    if !summary.stopped {
        debug!(target: "runtime", "event_channel_closed");
    }
    info!(
        target: "runtime",
        events = summary.events,
        repaints = summary.repaints,
        stopped = summary.stopped,
        "event_loop_finished"
    );
    summary
}
