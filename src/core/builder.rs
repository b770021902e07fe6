use std::sync::Arc;

use super::{
    config::Config,
    dispatcher::{Dispatcher, Inbox},
};
use crate::{
    error::RuntimeError,
    listeners::ListenerRegistry,
    messages::MessageBus,
};

/// Builder for constructing a [`Dispatcher`] with optional shared components.
pub struct DispatcherBuilder {
    cfg: Config,
    bus: Option<MessageBus>,
    registry: Option<Arc<ListenerRegistry>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            bus: None,
            registry: None,
        }
    }

    /// Uses an existing bus instead of creating one from [`Config::bus_capacity`].
    pub fn with_bus(mut self, bus: MessageBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Uses an existing registry, e.g. one already populated by embedding code.
    pub fn with_registry(mut self, registry: Arc<ListenerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the dispatcher.
    ///
    /// This consumes the builder and:
    /// - creates the bus (if none was given)
    /// - subscribes to the quit and event channels
    /// - creates the registry (if none was given)
    ///
    /// Fails with [`RuntimeError::Subscribe`] if either subscription fails.
    pub fn build(self) -> Result<Dispatcher, RuntimeError> {
        let bus = self
            .bus
            .unwrap_or_else(|| MessageBus::new(self.cfg.bus_capacity_clamped()));

        let subscribe = |channel: &str| {
            bus.subscribe(channel).map_err(|source| RuntimeError::Subscribe {
                channel: channel.to_string(),
                source,
            })
        };
        let quit = subscribe(&self.cfg.quit_channel)?;
        let events = subscribe(&self.cfg.event_channel)?;

        let registry = self.registry.unwrap_or_default();

        Ok(Dispatcher::new_internal(
            self.cfg,
            bus,
            registry,
            Inbox { quit, events },
        ))
    }
}
