//! # Event listeners.
//!
//! This module provides the [`Handler`] callback type and the
//! [`ListenerRegistry`] that maps event names to ordered listener records.
//!
//! ## Architecture
//! ```text
//! Dispatcher ── on(name, cb) ───► ListenerRegistry::register
//!            ── emit(name, args) ► ListenerRegistry::notify
//!                                        │ (lock: snapshot, count down, clean up)
//!                                ┌───────┼────────┬─────────┐
//!                                ▼       ▼        ▼         ▼
//!                              task 1  task 2   task 3 ... task N     (detached)
//!                                │       │        │         │
//!                              cb1()   cb2()    cb3()     cbN()
//! ```
//!
//! ## Listener lifetimes
//! - **Unlimited** (default, [`ListenerRegistry::register`]) - never expires.
//! - **Limited** ([`ListenerRegistry::register_with_limit`]) - removed by the
//!   notification cycle in which its counter reaches zero.
//!
//! ## Implementing a listener
//! ```no_run
//! use eventvisor::{ListenerRegistry, handler};
//!
//! # #[tokio::main] async fn main() {
//! let registry = ListenerRegistry::new();
//! registry.register("clicked", handler(|args| {
//!     println!("clicked with {args:?}");
//! }));
//! registry.notify("clicked", vec![serde_json::json!(1)]);
//! # }
//! ```

mod handler;
mod record;
mod registry;

pub use handler::{Handler, handler};
pub use registry::{ListenerRegistry, Notified};
