//! Runtime core: dispatch loop and lifecycle.
//!
//! The public API from this module is [`Dispatcher`] (with its builder and
//! state) and [`Config`].
//!
//! Internal modules:
//! - [`dispatcher`]: run loop decoding bus messages into register/notify calls;
//! - [`builder`]: wires bus, subscriptions and registry together;
//! - [`config`]: runtime settings;
//! - [`shutdown`]: cross-platform OS signal handling forwarded as quit messages.

mod builder;
mod config;
mod dispatcher;
mod shutdown;

pub use builder::DispatcherBuilder;
pub use config::Config;
pub use dispatcher::{Dispatcher, DispatcherState};
pub use shutdown::wait_for_shutdown_signal;
