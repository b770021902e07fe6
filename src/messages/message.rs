//! # Messages carried by the bus.
//!
//! A [`Message`] is a topic string plus a typed [`Payload`]. The topic decides
//! routing (its first segment names the channel) and, for the `event` channel,
//! how the dispatcher interprets the payload:
//!
//! | Topic                        | Payload             | Effect                         |
//! |------------------------------|---------------------|--------------------------------|
//! | `quit`                       | [`Payload::Empty`]  | stop the dispatcher            |
//! | `event:on`                   | [`Payload::On`]     | register a listener            |
//! | `event:emit:<reserved>:j\|g` | [`Payload::Emit`]   | notify listeners of `name`     |
//!
//! ## Ordering
//! Each message has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Message, Payload, Source};
//! use serde_json::json;
//!
//! let msg = Message::emit("clicked", vec![json!(1), json!(2)], Source::Backend);
//! assert_eq!(&*msg.topic, "event:emit:from:g");
//! assert!(matches!(msg.payload, Payload::Emit(ref p) if p.name == "clicked"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PayloadError;
use crate::listeners::Handler;
use crate::topic::Source;

/// Global sequence counter for message ordering.
static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Payload of an `emit` message: the event name and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitPayload {
    /// Event name listeners registered for.
    pub name: String,
    /// Ordered arguments handed to every listener.
    #[serde(default)]
    pub data: Vec<Value>,
}

impl EmitPayload {
    /// Creates a new emit payload.
    pub fn new(name: impl Into<String>, data: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Decodes a payload sent as JSON text, e.g. `{"name":"clicked","data":[1,2,3]}`.
    ///
    /// A missing `data` field decodes as no arguments.
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        let payload: EmitPayload = serde_json::from_str(text)?;
        if payload.name.is_empty() {
            return Err(PayloadError::EmptyName);
        }
        Ok(payload)
    }
}

/// Payload of an `on` message: the event name and the callback to register.
#[derive(Clone)]
pub struct OnPayload {
    /// Event name to listen for.
    pub name: String,
    /// Callback invoked on every matching notification.
    pub callback: Handler,
}

impl OnPayload {
    /// Creates a new registration payload.
    pub fn new(name: impl Into<String>, callback: Handler) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl fmt::Debug for OnPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnPayload")
            .field("name", &self.name)
            .field("callback", &Arc::as_ptr(&self.callback))
            .finish()
    }
}

/// Message body.
#[derive(Debug, Clone)]
pub enum Payload {
    /// No payload (e.g. `quit`).
    Empty,
    /// Notify listeners.
    Emit(EmitPayload),
    /// Register a listener.
    On(OnPayload),
}

impl Payload {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Emit(_) => "emit",
            Payload::On(_) => "on",
        }
    }
}

/// A topic-addressed message.
///
/// - `seq`: monotonic global sequence
/// - `at`: wall-clock timestamp (for logs)
/// - `topic`: colon-delimited topic; the first segment is the channel
#[derive(Debug, Clone)]
pub struct Message {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Colon-delimited topic.
    pub topic: Arc<str>,
    /// Message body.
    pub payload: Payload,
}

impl Message {
    /// Creates a new message with current timestamp and next sequence number.
    pub fn new(topic: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            seq: MESSAGE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            topic: topic.into(),
            payload,
        }
    }

    /// Creates a `quit` message for the default quit channel.
    #[inline]
    pub fn quit() -> Self {
        Self::new("quit", Payload::Empty)
    }

    /// Creates an `event:on` message registering `callback` for `name`.
    #[inline]
    pub fn on(name: impl Into<String>, callback: Handler) -> Self {
        Self::new("event:on", Payload::On(OnPayload::new(name, callback)))
    }

    /// Creates an `event:emit:from:<source>` message.
    #[inline]
    pub fn emit(name: impl Into<String>, data: Vec<Value>, source: Source) -> Self {
        Self::new(
            format!("event:emit:from:{}", source.tag()),
            Payload::Emit(EmitPayload::new(name, data)),
        )
    }

    /// Time elapsed since the message was created; zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        self.at.elapsed().unwrap_or_default()
    }

    /// Returns the channel this message is routed to (first topic segment).
    #[inline]
    pub fn channel(&self) -> &str {
        self.topic.split(':').next().unwrap_or_default()
    }
}
