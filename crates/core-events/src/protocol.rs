//! Wire shapes of the redraw and GUI notifications.
//!
//! A redraw notification carries a list of updates; every update is
//! `[name, args_1, args_2, ...]` where each `args_i` is a positional array and
//! the handler for `name` runs once per `args_i`, in order. A GUI notification
//! is flat: `[name, arg, arg, ...]`.
//!
//! Decoding is lenient at the update level: a malformed update is dropped,
//! counted on the batch and logged, and the rest of the batch survives.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("notification params are not an array")]
    NotAnArray,
    #[error("{event}: missing argument {index}")]
    MissingArg { event: String, index: usize },
    #[error("{event}: argument {index} is not {expected}")]
    WrongType {
        event: String,
        index: usize,
        expected: &'static str,
    },
}

/// One named update with every positional argument tuple it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEvent {
    pub name: String,
    pub calls: Vec<Vec<Value>>,
}

impl NamedEvent {
    pub fn new(name: impl Into<String>, calls: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }
}

/// Ordered list of updates applied atomically between two repaints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub events: Vec<NamedEvent>,
    /// Updates dropped while decoding.
    pub malformed: usize,
}

impl Batch {
    pub fn new(events: Vec<NamedEvent>) -> Self {
        Self {
            events,
            malformed: 0,
        }
    }

    /// Decode the params of a `redraw` notification.
    pub fn from_redraw_params(params: &Value) -> Result<Self, ProtocolError> {
        let updates = params.as_array().ok_or(ProtocolError::NotAnArray)?;
        let mut batch = Batch::default();
        for update in updates {
            match decode_update(update) {
                Some(event) => batch.events.push(event),
                None => {
                    batch.malformed += 1;
                    warn!(target: "redraw.decode", "malformed_update_dropped");
                }
            }
        }
        Ok(batch)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of handler invocations this batch will cause.
    pub fn call_count(&self) -> usize {
        self.events.iter().map(|e| e.calls.len()).sum()
    }
}

fn decode_update(update: &Value) -> Option<NamedEvent> {
    let parts = update.as_array()?;
    let (name, rest) = parts.split_first()?;
    let name = name.as_str()?;
    let mut calls = Vec::with_capacity(rest.len());
    for args in rest {
        calls.push(args.as_array()?.clone());
    }
    Some(NamedEvent::new(name, calls))
}

/// Notification on the `Gui` channel (finder, signature, hover, font...).
#[derive(Debug, Clone, PartialEq)]
pub struct GuiNotification {
    pub name: String,
    pub args: Vec<Value>,
}

impl GuiNotification {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn from_params(params: &Value) -> Result<Self, ProtocolError> {
        let parts = params.as_array().ok_or(ProtocolError::NotAnArray)?;
        let (name, rest) = parts.split_first().ok_or(ProtocolError::MissingArg {
            event: "Gui".to_string(),
            index: 0,
        })?;
        let name = name.as_str().ok_or(ProtocolError::WrongType {
            event: "Gui".to_string(),
            index: 0,
            expected: "a string",
        })?;
        Ok(Self::new(name, rest.to_vec()))
    }
}

/// Typed positional access to one argument tuple.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    event: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(event: &'a str, values: &'a [Value]) -> Self {
        Self { event, values }
    }

    /// Name of the event these arguments belong to.
    pub fn event(&self) -> &'a str {
        self.event
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn get(&self, index: usize) -> Result<&'a Value, ProtocolError> {
        self.values.get(index).ok_or_else(|| ProtocolError::MissingArg {
            event: self.event.to_string(),
            index,
        })
    }

    pub fn i64(&self, index: usize) -> Result<i64, ProtocolError> {
        self.get(index)?
            .as_i64()
            .ok_or_else(|| self.wrong(index, "an integer"))
    }

    /// Non-negative integer.
    pub fn usize(&self, index: usize) -> Result<usize, ProtocolError> {
        let v = self.i64(index)?;
        usize::try_from(v).map_err(|_| self.wrong(index, "a non-negative integer"))
    }

    pub fn str(&self, index: usize) -> Result<&'a str, ProtocolError> {
        self.get(index)?
            .as_str()
            .ok_or_else(|| self.wrong(index, "a string"))
    }

    pub fn bool(&self, index: usize) -> Result<bool, ProtocolError> {
        self.get(index)?
            .as_bool()
            .ok_or_else(|| self.wrong(index, "a boolean"))
    }

    pub fn array(&self, index: usize) -> Result<&'a Vec<Value>, ProtocolError> {
        self.get(index)?
            .as_array()
            .ok_or_else(|| self.wrong(index, "an array"))
    }

    pub fn map(&self, index: usize) -> Result<&'a Map<String, Value>, ProtocolError> {
        self.get(index)?
            .as_object()
            .ok_or_else(|| self.wrong(index, "a map"))
    }

    /// Argument `index` when present and of the right type.
    pub fn opt_i64(&self, index: usize) -> Option<i64> {
        self.values.get(index).and_then(Value::as_i64)
    }

    pub fn opt_str(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).and_then(Value::as_str)
    }

    fn wrong(&self, index: usize, expected: &'static str) -> ProtocolError {
        ProtocolError::WrongType {
            event: self.event.to_string(),
            index,
            expected,
        }
    }
}
