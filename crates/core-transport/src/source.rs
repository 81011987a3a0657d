//! Reader side: turn a stream of raw notifications into `Event`s on the bounded channel.

use core_events::{
    AsyncEventSource, Batch, Event, GuiNotification, ProtocolError, send_event,
};
use serde_json::Value;
use std::future::Future;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Decode one `(method, params)` notification. Methods other than `redraw` and `Gui` are
/// reported as `Ok(None)`.
pub fn decode_notification(method: &str, params: &Value) -> Result<Option<Event>, ProtocolError> {
    match method {
        "redraw" => Ok(Some(Event::Redraw(Batch::from_redraw_params(params)?))),
        "Gui" => Ok(Some(Event::Gui(GuiNotification::from_params(params)?))),
        _ => Ok(None),
    }
}

/// Ordered source of decoded events. `Ok(None)` is end of stream.
pub trait BatchStream: Send + 'static {
    fn next_event(&mut self) -> impl Future<Output = anyhow::Result<Option<Event>>> + Send;
}

/// Event source running one reader task per session.
///
/// Every decoded event is pushed in arrival order; the reader parks on a full channel. End of
/// stream or a read error pushes `Event::Stopped` and ends the task.
pub struct BatchSource<S> {
    name: &'static str,
    stream: S,
}

impl<S: BatchStream> BatchSource<S> {
    pub fn new(name: &'static str, stream: S) -> Self {
        Self { name, stream }
    }
}

impl<S: BatchStream> AsyncEventSource for BatchSource<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let BatchSource { name, mut stream } = *self;
        tokio::spawn(async move {
            let mut forwarded = 0u64;
            loop {
                match stream.next_event().await {
                    Ok(Some(event)) => {
                        if !send_event(&tx, event).await {
                            debug!(target: "transport.reader", source = name, "consumer_dropped");
                            return;
                        }
                        forwarded += 1;
                    }
                    Ok(None) => {
                        info!(target: "transport.reader", source = name, forwarded, "stream_ended");
                        break;
                    }
                    Err(e) => {
                        warn!(target: "transport.reader", source = name, error = %e, "stream_failed");
                        break;
                    }
                }
            }
            send_event(&tx, Event::Stopped).await;
        })
    }
}

/// Stream over raw `(method, params)` notifications delivered through a channel, as produced by
/// an RPC client's notification handler.
pub struct ChannelStream {
    rx: Receiver<(String, Value)>,
}

impl ChannelStream {
    pub fn new(rx: Receiver<(String, Value)>) -> Self {
        Self { rx }
    }
}

impl BatchStream for ChannelStream {
    async fn next_event(&mut self) -> anyhow::Result<Option<Event>> {
        while let Some((method, params)) = self.rx.recv().await {
            match decode_notification(&method, &params) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => {
                    debug!(target: "transport.reader", method = %method, "notification_ignored");
                }
                Err(e) => {
                    warn!(target: "transport.reader", method = %method, error = %e, "notification_malformed");
                }
            }
        }
        Ok(None)
    }
}
