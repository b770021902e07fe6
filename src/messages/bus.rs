//! # Topic-addressed message bus.
//!
//! [`MessageBus`] keeps one [`tokio::sync::broadcast`] channel per channel name.
//! A message is routed by the first segment of its topic: `quit` goes to the
//! `quit` channel, `event:emit:from:g` goes to the `event` channel.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                   Subscribers:
//!   frontend ──┐                 ┌──► "quit"  ──► Dispatcher (shutdown)
//!   backend  ──┼──► MessageBus ──┤
//!   signals  ──┘                 └──► "event" ──► Dispatcher (on / emit)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits for receivers.
//! - **Bounded capacity**: each channel stores the most recent `capacity` messages.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: messages are lost if there are no receivers at send time.
//! - **Close**: after [`MessageBus::close`] every receiver observes `RecvError::Closed`
//!   and subscribe/publish return [`BusError::Closed`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::message::Message;
use crate::error::BusError;

/// Receiving end of a bus channel.
pub type Subscription = broadcast::Receiver<Message>;

struct Inner {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<Message>>>,
    closed: AtomicBool,
}

/// Topic-addressed broadcast bus.
///
/// ### Properties
/// - **Lazy channels**: a channel is created on its first subscribe; publishing to
///   a channel nobody subscribed to is a no-op.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (`Arc`-backed); clones share all channels.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<Inner>,
}

impl MessageBus {
    /// Creates a new bus whose channels hold up to `capacity` messages each.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity: capacity.max(1),
                channels: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a receiver for `channel` that observes messages sent after this call.
    pub fn subscribe(&self, channel: &str) -> Result<Subscription, BusError> {
        if channel.is_empty() {
            return Err(BusError::EmptyChannel {
                topic: String::new(),
            });
        }
        let mut channels = self.inner.channels.lock();
        // Checked under the lock so `close` cannot race a new subscription.
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        let tx = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0);
        Ok(tx.subscribe())
    }

    /// Publishes a message to the channel named by its topic's first segment.
    ///
    /// Returns the number of receivers the message was handed to; `Ok(0)` means
    /// nobody was listening and the message was dropped.
    pub fn publish(&self, message: Message) -> Result<usize, BusError> {
        let channel = message.channel();
        if channel.is_empty() {
            return Err(BusError::EmptyChannel {
                topic: message.topic.to_string(),
            });
        }
        let tx = {
            let channels = self.inner.channels.lock();
            if self.is_closed() {
                return Err(BusError::Closed);
            }
            match channels.get(channel) {
                Some(tx) => tx.clone(),
                None => return Ok(0),
            }
        };
        Ok(tx.send(message).unwrap_or(0))
    }

    /// Closes the bus: drops every channel so receivers observe `Closed`.
    pub fn close(&self) {
        let mut channels = self.inner.channels.lock();
        self.inner.closed.store(true, Ordering::SeqCst);
        channels.clear();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Returns the per-channel capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Payload;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[tokio::test]
    async fn test_routes_by_first_segment() {
        let bus = MessageBus::new(8);
        let mut quit = bus.subscribe("quit").unwrap();
        let mut events = bus.subscribe("event").unwrap();

        assert_eq!(bus.publish(Message::new("event:on", Payload::Empty)).unwrap(), 1);
        assert_eq!(bus.publish(Message::quit()).unwrap(), 1);

        assert_eq!(&*events.recv().await.unwrap().topic, "event:on");
        assert_eq!(&*quit.recv().await.unwrap().topic, "quit");
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_publish_without_receivers_is_dropped() {
        let bus = MessageBus::new(8);
        assert_eq!(bus.publish(Message::quit()).unwrap(), 0);

        let _rx = bus.subscribe("quit").unwrap();
        assert_eq!(bus.publish(Message::quit()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_rejects_and_wakes_receivers() {
        let bus = MessageBus::new(8);
        let mut rx = bus.subscribe("event").unwrap();
        bus.close();

        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert_eq!(bus.subscribe("event").unwrap_err(), BusError::Closed);
        assert_eq!(bus.publish(Message::quit()).unwrap_err(), BusError::Closed);
    }

    #[test]
    fn test_empty_channel_rejected() {
        let bus = MessageBus::default();
        assert_eq!(bus.subscribe("").unwrap_err().as_label(), "bus_empty_channel");
        assert!(matches!(
            bus.publish(Message::new(":emit", Payload::Empty)),
            Err(BusError::EmptyChannel { .. })
        ));
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(MessageBus::new(0).capacity(), 1);
    }
}
