//! Bus messages: types and the topic-addressed bus.
//!
//! This module groups the message **data model** and the **bus** that carries
//! messages from publishers (frontend, backend, OS-signal bridge) to the dispatcher.
//!
//! ## Contents
//! - [`Message`], [`Payload`], [`EmitPayload`], [`OnPayload`] message and payload types
//! - [`MessageBus`] per-channel wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: embedding code, `core::shutdown` (OS signals → `quit`).
//! - **Consumers**: the dispatcher run loop (`quit` and `event` channels).

mod bus;
mod message;

pub use bus::{MessageBus, Subscription};
pub use message::{EmitPayload, Message, OnPayload, Payload};
