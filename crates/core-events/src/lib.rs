//! Event types and channel helpers shared between the transport and the session.
//!
//! Everything the editor process pushes at the GUI arrives here as an `Event`:
//! redraw batches, `Gui` notifications, and lifecycle markers.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

pub mod protocol;

pub use protocol::{Args, Batch, GuiNotification, NamedEvent, ProtocolError};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Redraw batches travel over one bounded mpsc channel. Producers await `send`, so a slow consumer
// parks the transport reader instead of dropping batches: a dropped batch would leave the grid out
// of sync with the editor for good.
// -------------------------------------------------------------------------------------------------
pub const REDRAW_CHANNEL_CAP: usize = 1000;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static REDRAW_BATCHES_SENT: AtomicU64 = AtomicU64::new(0);
pub static GUI_NOTIFICATIONS_SENT: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// One `redraw` notification.
    Redraw(Batch),
    /// One `Gui` notification.
    Gui(GuiNotification),
    /// A source reached end of stream (editor exited or trace exhausted).
    Stopped,
    Shutdown,
}

impl Event {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Event::Redraw(_) => "redraw",
            Event::Gui(_) => "gui",
            Event::Stopped => "stopped",
            Event::Shutdown => "shutdown",
        }
    }
}

/// Send `event`, recording telemetry. Returns `false` once the consumer is gone.
pub async fn send_event(tx: &Sender<Event>, event: Event) -> bool {
    let counter = match &event {
        Event::Redraw(_) => Some(&REDRAW_BATCHES_SENT),
        Event::Gui(_) => Some(&GUI_NOTIFICATIONS_SENT),
        _ => None,
    };
    match tx.send(event).await {
        Ok(()) => {
            if let Some(c) = counter {
                c.fetch_add(1, Ordering::Relaxed);
            }
            true
        }
        Err(_) => {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            false
        }
    }
}

/// Optional hooks that observe events at the loop boundary. Must not block.
pub trait EventHooks: Send + Sync + 'static {
    fn pre_handle(&self, _event: &Event) {}
    fn post_handle(&self, _event: &Event) {}
}

pub struct NoopEventHooks;

impl EventHooks for NoopEventHooks {}

/// Any async producer of `Event`s (a transport reader, a trace replayer).
///
/// Implementors spawn one background task and stop when `send` fails (consumer dropped) or on
/// their own end-of-stream, in which case they emit `Event::Stopped` first.
pub trait AsyncEventSource: Send + 'static {
    fn name(&self) -> &'static str;
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

#[derive(Default)]
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources. Each gets its own `Sender` clone; the caller drops its own
    /// clone before awaiting the handles so sources observe the closed channel.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning_event_source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}
