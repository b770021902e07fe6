//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for the dispatcher runtime.
//!
//! Config is used in two ways:
//! 1. **Dispatcher creation**: `Dispatcher::new(&bus, config)` / `Dispatcher::builder(config)`
//! 2. **Bus creation**: the builder sizes a fresh [`MessageBus`](crate::MessageBus)
//!    from [`Config::bus_capacity`] when none is supplied.

/// Configuration for the dispatcher runtime.
///
/// ## Field semantics
/// - `bus_capacity`: per-channel ring buffer size of a bus created by the builder (min 1)
/// - `quit_channel`: channel whose messages stop the dispatcher
/// - `event_channel`: channel carrying `on`/`emit` messages
/// - `os_signals`: forward SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows) as a quit message
///
/// ## Notes
/// All fields are public for flexibility.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of each bus channel's ring buffer.
    ///
    /// A dispatcher that lags behind more than `bus_capacity` event messages
    /// skips the oldest ones (logged). Minimum value is 1 (enforced by the bus).
    pub bus_capacity: usize,

    /// Name of the shutdown channel.
    pub quit_channel: String,

    /// Name of the event channel.
    pub event_channel: String,

    /// Whether termination signals of the process publish a quit message.
    ///
    /// The bridge task lives until the dispatcher stops.
    pub os_signals: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `quit_channel = "quit"`
    /// - `event_channel = "event"`
    /// - `os_signals = false` (embedding code owns process signals)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            quit_channel: "quit".to_string(),
            event_channel: "event".to_string(),
            os_signals: false,
        }
    }
}
