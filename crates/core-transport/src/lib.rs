//! Transport boundary: the RPC connection to the editor process.
//!
//! The core only needs four things from a connection: fire-and-forget input, requests whose
//! replies may arrive late (or never), resize requests, and an ordered stream of notifications.
//! Requests return a `PendingReply` future carrying a cancellation token; `query` races it against
//! a deadline so a stalled editor can never freeze the caller.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub mod loopback;
pub mod source;
pub mod trace;

pub use loopback::LoopbackTransport;
pub use source::{BatchSource, BatchStream, ChannelStream, decode_notification};
pub use trace::TraceReplay;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
    #[error("request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The editor did not answer before the deadline.
    #[error("neovim busy")]
    Busy,
    #[error("transport closed")]
    Closed,
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<TransportError> for QueryError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Closed => QueryError::Closed,
            TransportError::Rejected(msg) => QueryError::Rejected(msg),
        }
    }
}

/// Synchronous state requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    /// Run an ex command and capture its output.
    CommandOutput(String),
    /// Evaluate an expression.
    Eval(String),
}

impl Request {
    /// Expression answering the editor's current short mode code.
    pub fn mode() -> Self {
        Request::Eval("mode()".to_string())
    }

    fn kind(&self) -> &'static str {
        match self {
            Request::CommandOutput(_) => "command_output",
            Request::Eval(_) => "eval",
        }
    }
}

pub type Reply = Result<Value, TransportError>;

/// Reply future handed out by `Transport::request`.
///
/// The responder side must check `is_cancelled` (or simply ignore a failed send): once the
/// caller gives up the reply is dropped silently.
#[derive(Debug)]
pub struct PendingReply {
    pub rx: oneshot::Receiver<Reply>,
    pub cancel: CancellationToken,
}

/// Responder half paired with a `PendingReply`.
#[derive(Debug)]
pub struct ReplySlot {
    tx: oneshot::Sender<Reply>,
    cancel: CancellationToken,
}

impl ReplySlot {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The caller gave up or dropped its `PendingReply`; no answer can reach it anymore.
    pub fn is_abandoned(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    /// Deliver the reply. Returns `false` when the caller already gave up.
    pub fn send(self, reply: Reply) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx.send(reply).is_ok()
    }
}

pub fn reply_pair() -> (ReplySlot, PendingReply) {
    let (tx, rx) = oneshot::channel();
    let cancel = CancellationToken::new();
    (
        ReplySlot {
            tx,
            cancel: cancel.clone(),
        },
        PendingReply { rx, cancel },
    )
}

/// Outbound half of an editor connection.
pub trait Transport: Send + Sync {
    fn send_input(&self, keys: &str) -> Result<(), TransportError>;
    fn request(&self, request: Request) -> PendingReply;
    fn request_resize(&self, cols: usize, rows: usize) -> Result<(), TransportError>;
}

/// Issue `request` and wait at most `timeout` for the answer.
///
/// On timeout the request's token is cancelled and `QueryError::Busy` is returned; the editor may
/// still answer later and that answer is discarded.
pub async fn query<T>(transport: &T, request: Request, timeout: Duration) -> Result<Value, QueryError>
where
    T: Transport + ?Sized,
{
    let kind = request.kind();
    let PendingReply { rx, cancel } = transport.request(request);
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(e))) => {
            debug!(target: "transport.query", kind, error = %e, "query_failed");
            Err(e.into())
        }
        Ok(Err(_)) => {
            debug!(target: "transport.query", kind, "query_responder_dropped");
            Err(QueryError::Closed)
        }
        Err(_) => {
            cancel.cancel();
            warn!(target: "transport.query", kind, timeout_ms = timeout.as_millis() as u64, "query_busy");
            Err(QueryError::Busy)
        }
    }
}

/// `query` returning the answer as a string (command output, `mode()`).
pub async fn query_string<T>(
    transport: &T,
    request: Request,
    timeout: Duration,
) -> Result<String, QueryError>
where
    T: Transport + ?Sized,
{
    match query(transport, request, timeout).await? {
        Value::String(s) => Ok(s),
        other => Err(QueryError::Rejected(format!("expected a string, got {other}"))),
    }
}
