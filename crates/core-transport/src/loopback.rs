//! In-memory transport for tests and the replay tool.
//!
//! Records every input and resize, and answers requests from a scripted table, optionally after
//! a delay. Unscripted requests never answer, which is how a wedged editor looks from the outside.

use crate::{PendingReply, ReplySlot, Request, Transport, TransportError, reply_pair};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone)]
struct Scripted {
    reply: Result<Value, TransportError>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    inputs: Vec<String>,
    resizes: Vec<(usize, usize)>,
    script: HashMap<Request, Scripted>,
    unanswered: Vec<ReplySlot>,
}

#[derive(Debug, Clone, Default)]
pub struct LoopbackTransport {
    inner: Arc<Mutex<Inner>>,
    closed: Arc<AtomicBool>,
    /// Replies discarded because the caller had already given up.
    late_replies: Arc<AtomicU64>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer `request` with `value` immediately.
    pub fn script(&self, request: Request, value: Value) {
        self.script_reply(request, Ok(value), None);
    }

    /// Answer `request` with `reply` after `delay` (if any).
    pub fn script_reply(
        &self,
        request: Request,
        reply: Result<Value, TransportError>,
        delay: Option<Duration>,
    ) {
        self.lock().script.insert(request, Scripted { reply, delay });
    }

    /// Simulate the editor process exiting.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn inputs(&self) -> Vec<String> {
        self.lock().inputs.clone()
    }

    pub fn resizes(&self) -> Vec<(usize, usize)> {
        self.lock().resizes.clone()
    }

    /// Unscripted requests still waiting on a caller.
    pub fn parked_requests(&self) -> usize {
        let mut inner = self.lock();
        inner.unanswered.retain(|s| !s.is_abandoned());
        inner.unanswered.len()
    }

    pub fn late_replies(&self) -> u64 {
        self.late_replies.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Transport for LoopbackTransport {
    fn send_input(&self, keys: &str) -> Result<(), TransportError> {
        self.check_open()?;
        trace!(target: "transport.loopback", len = keys.len(), "input");
        self.lock().inputs.push(keys.to_string());
        Ok(())
    }

    /// Delayed replies are spawned, so those need a tokio runtime.
    fn request(&self, request: Request) -> PendingReply {
        let (slot, pending) = reply_pair();
        if self.check_open().is_err() {
            slot.send(Err(TransportError::Closed));
            return pending;
        }
        let scripted = self.lock().script.get(&request).cloned();
        let Some(Scripted { reply, delay }) = scripted else {
            // Never answered; the slot stays parked so the caller sees a timeout, not a close.
            let mut inner = self.lock();
            inner.unanswered.retain(|s| !s.is_abandoned());
            inner.unanswered.push(slot);
            return pending;
        };
        match delay {
            None => {
                slot.send(reply);
            }
            Some(delay) => {
                let late = self.late_replies.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if !slot.send(reply) {
                        late.fetch_add(1, Ordering::SeqCst);
                        trace!(target: "transport.loopback", "late_reply_dropped");
                    }
                });
            }
        }
        pending
    }

    fn request_resize(&self, cols: usize, rows: usize) -> Result<(), TransportError> {
        self.check_open()?;
        self.lock().resizes.push((cols, rows));
        Ok(())
    }
}
