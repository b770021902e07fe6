//! # eventvisor
//!
//! **Eventvisor** is a small in-process event bus for Rust.
//!
//! It bridges a topic-addressed message bus to dynamically registered
//! listeners: messages on the `event` channel either register a listener
//! (`event:on`) or notify every listener of an event name
//! (`event:emit:<reserved>:<j|g>`). Listeners are fired concurrently and are
//! never awaited; a listener may expire after a number of invocations.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   frontend   │   │   backend    │   │  OS signals  │
//!     │ (source "j") │   │ (source "g") │   │ (optional)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 MessageBus (one broadcast channel per name)       │
//! │                 capacity: Config::bus_capacity                    │
//! └──────────────┬─────────────────────────────────────┬──────────────┘
//!                ▼ "event"                             ▼ "quit"
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher run loop (one task, select! over both channels)       │
//! │  - Operation::parse(topic)  (topic codec)                         │
//! │  - on   → ListenerRegistry::register   (inline)                   │
//! │  - emit → ListenerRegistry::notify     (spawned)                  │
//! │  - quit → shutdown hook, exit                                     │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                   ┌────────────────────────┐
//!                   │    ListenerRegistry    │
//!                   │  name → [records...]   │
//!                   └───┬────────────────┬───┘
//!                       ▼                ▼
//!                     task 1   ...     task N       (fire-and-forget)
//!                       ▼                ▼
//!                     cb1(args)        cbN(args)
//! ```
//!
//! ### Notification cycle
//! ```text
//! notify(name, args)
//!   ├─► lock registry
//!   ├─► for record in map[name] (insertion order):
//!   │     ├─ remaining > 0 → remaining -= 1
//!   │     ├─ spawn callback(args)             (not awaited, panic-isolated)
//!   │     └─ remaining hit 0 → mark for removal
//!   ├─► any marked → map[name] = unmarked records
//!   └─► unlock
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Bus**           | Topic-addressed broadcast channels.                      | [`MessageBus`], [`Message`], [`Payload`]  |
//! | **Topics**        | Decode `event:on` / `event:emit:_:j\|g`.                 | [`Operation`], [`Source`]                 |
//! | **Listeners**     | Register, expire and notify callbacks.                   | [`ListenerRegistry`], [`Handler`]         |
//! | **Dispatch**      | Run loop bridging the bus to the registry.               | [`Dispatcher`], [`DispatcherState`]       |
//! | **Errors**        | Typed errors for setup, bus and decoding.                | [`RuntimeError`], [`BusError`]            |
//! | **Configuration** | Centralize runtime settings.                             | [`Config`]                                |
//! | **System**        | Package-manager contract and dependency report.          | [`PackageManager`], [`scan_dependencies`] |
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
//!     // Register through the bus (or directly with `register_listener`).
//!     bus.publish(Message::on("clicked", handler(|args| println!("clicked: {args:?}"))))?;
//!     bus.publish(Message::emit("clicked", vec![json!(1), json!(2), json!(3)], Source::Backend))?;
//!
//!     bus.publish(Message::quit())?;
//!     run.await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod listeners;
mod messages;
mod system;
mod topic;

// ---- Public re-exports ----

pub use crate::core::{Config, Dispatcher, DispatcherBuilder, DispatcherState, wait_for_shutdown_signal};
pub use error::{BusError, PackageError, PayloadError, RuntimeError, TopicError};
pub use listeners::{Handler, ListenerRegistry, Notified, handler};
pub use messages::{EmitPayload, Message, MessageBus, OnPayload, Payload, Subscription};
pub use system::{
    Dependency, DependencyList, Package, PackageManager, PackageMap, scan_dependencies,
};
pub use topic::{Operation, Source};

/// Untyped event argument.
pub use serde_json::Value;
