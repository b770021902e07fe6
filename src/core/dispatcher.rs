//! # Dispatcher: bridges the message bus to the listener registry.
//!
//! The [`Dispatcher`] owns a [`ListenerRegistry`] and two bus subscriptions
//! (quit and event). [`Dispatcher::start`] spawns a single run loop that waits
//! on both channels and never busy-polls.
//!
//! ## High-level architecture
//! ```text
//! Construction:
//!   Dispatcher::new(&bus, cfg)
//!     ├─► bus.subscribe(cfg.quit_channel)   ─┐ any failure → RuntimeError::Subscribe
//!     └─► bus.subscribe(cfg.event_channel)  ─┘ (no dispatcher is created)
//!
//! Run loop (one task):
//!   loop {
//!     select! (biased) {
//!       quit  ──► break
//!       event ──► Operation::parse(topic)
//!                  ├─ Emit{j|g} + Emit payload ──► spawn(registry.notify(name, data))
//!                  ├─ On        + On payload   ──► registry.register(name, cb)   (inline)
//!                  └─ anything else            ──► error!(...), continue
//!     }
//!   }
//!   shutdown hook: cancel OS-signal bridge, state = Stopped
//! ```
//!
//! ## State machine
//! ```text
//! Idle ──start()──► Running ──quit / bus closed──► Stopped
//! ```
//!
//! ## Rules
//! - A malformed message never stops the loop; it is logged and dropped.
//! - Notifications run on their own tasks; the loop does not wait for them.
//! - Shutdown is cooperative: messages queued behind the quit signal may be lost,
//!   in-flight callbacks are not interrupted.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Config, Dispatcher, Message, MessageBus, Source, handler};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = MessageBus::new(64);
//!     let dispatcher = Dispatcher::new(&bus, Config::default())?;
//!     let run = dispatcher.start()?;
//!
//!     dispatcher.register_listener("clicked", handler(|args| println!("clicked {args:?}")));
//!     bus.publish(Message::emit("clicked", vec![json!(1)], Source::Frontend))?;
//!
//!     bus.publish(Message::quit())?;
//!     run.await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::builder::DispatcherBuilder;
use super::config::Config;
use super::shutdown;
use crate::error::{PayloadError, RuntimeError};
use crate::listeners::{Handler, ListenerRegistry};
use crate::messages::{Message, MessageBus, Payload, Subscription};
use crate::topic::Operation;

/// Lifecycle state of a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Constructed, loop not started.
    Idle,
    /// Run loop active.
    Running,
    /// Run loop exited.
    Stopped,
}

/// Receivers consumed by the run loop.
pub(crate) struct Inbox {
    pub(crate) quit: Subscription,
    pub(crate) events: Subscription,
}

/// Routes bus messages to the listener registry.
pub struct Dispatcher {
    cfg: Config,
    bus: MessageBus,
    registry: Arc<ListenerRegistry>,
    inbox: Mutex<Option<Inbox>>,
    state: Arc<watch::Sender<DispatcherState>>,
    signals: CancellationToken,
}

impl Dispatcher {
    /// Creates a builder with the given configuration.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Creates a dispatcher subscribed to `bus` with a fresh registry.
    ///
    /// Fails if the quit or event channel cannot be subscribed to.
    pub fn new(bus: &MessageBus, cfg: Config) -> Result<Self, RuntimeError> {
        DispatcherBuilder::new(cfg).with_bus(bus.clone()).build()
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: MessageBus,
        registry: Arc<ListenerRegistry>,
        inbox: Inbox,
    ) -> Self {
        let (state, _) = watch::channel(DispatcherState::Idle);
        Self {
            cfg,
            bus,
            registry,
            inbox: Mutex::new(Some(inbox)),
            state: Arc::new(state),
            signals: CancellationToken::new(),
        }
    }

    /// Registers an unlimited listener for `name`. Never fails.
    pub fn register_listener(&self, name: impl Into<String>, callback: Handler) {
        self.registry.register(name, callback);
    }

    /// Returns the registry shared with the run loop.
    pub fn registry(&self) -> Arc<ListenerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Returns the bus this dispatcher is subscribed to.
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> DispatcherState {
        *self.state.borrow()
    }

    /// Waits until the run loop has stopped.
    pub async fn stopped(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s == DispatcherState::Stopped).await;
    }

    /// Starts the run loop on a new Tokio task and enters `Running`.
    ///
    /// Returns [`RuntimeError::AlreadyStarted`] on a second call.
    pub fn start(&self) -> Result<JoinHandle<()>, RuntimeError> {
        let inbox = self.inbox.lock().take().ok_or(RuntimeError::AlreadyStarted)?;

        if self.cfg.os_signals {
            shutdown::forward_os_signals(
                self.bus.clone(),
                self.cfg.quit_channel.clone(),
                self.signals.child_token(),
            );
        }

        self.state.send_replace(DispatcherState::Running);
        debug!(
            quit = %self.cfg.quit_channel,
            event = %self.cfg.event_channel,
            "dispatcher starting"
        );

        let run_loop = RunLoop {
            inbox,
            registry: Arc::clone(&self.registry),
            state: Arc::clone(&self.state),
            signals: self.signals.clone(),
        };
        Ok(tokio::spawn(run_loop.run()))
    }
}

/// State moved into the run-loop task.
struct RunLoop {
    inbox: Inbox,
    registry: Arc<ListenerRegistry>,
    state: Arc<watch::Sender<DispatcherState>>,
    signals: CancellationToken,
}

impl RunLoop {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                quit = self.inbox.quit.recv() => {
                    if let Err(RecvError::Closed) = quit {
                        debug!("quit channel closed");
                    }
                    break;
                }
                msg = self.inbox.events.recv() => match msg {
                    Ok(message) => self.dispatch(message),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event receiver lagged; messages dropped");
                    }
                    Err(RecvError::Closed) => {
                        debug!("event channel closed");
                        break;
                    }
                },
            }
        }

        self.shutdown();
    }

    /// Decodes one event message and registers or notifies.
    fn dispatch(&self, message: Message) {
        let operation = match Operation::parse(&message.topic) {
            Ok(op) => op,
            Err(err) => {
                error!(
                    topic = %message.topic,
                    seq = message.seq,
                    age_ms = message.age().as_millis() as u64,
                    label = err.as_label(),
                    "{}; message dropped",
                    err.as_message()
                );
                return;
            }
        };

        let age_ms = message.age().as_millis() as u64;
        match (operation, message.payload) {
            (Operation::Emit { source }, Payload::Emit(emit)) => {
                trace!(event = %emit.name, %source, seq = message.seq, age_ms, "emit received");
                let registry = Arc::clone(&self.registry);
                tokio::spawn(async move {
                    registry.notify(&emit.name, emit.data);
                });
            }
            (Operation::On, Payload::On(on)) if on.name.is_empty() => {
                let err = PayloadError::EmptyName;
                error!(
                    topic = %message.topic,
                    seq = message.seq,
                    age_ms,
                    label = err.as_label(),
                    "{err}; message dropped"
                );
            }
            (Operation::On, Payload::On(on)) => {
                trace!(
                    event = %on.name,
                    callback = ?Arc::as_ptr(&on.callback),
                    "listener registered"
                );
                self.registry.register(on.name, on.callback);
            }
            (op, payload) => {
                error!(
                    topic = %message.topic,
                    seq = message.seq,
                    operation = ?op,
                    payload = payload.kind(),
                    age_ms,
                    "payload does not match operation; message dropped"
                );
            }
        }
    }

    fn shutdown(&self) {
        self.signals.cancel();
        self.state.send_replace(DispatcherState::Stopped);
        debug!("dispatcher stopped");
    }
}
