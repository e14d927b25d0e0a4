use std::collections::BTreeMap;

use rsz_types::Environment;
use tracing::debug;

use crate::config::HandlerConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::ResourceHandler;
use crate::handlers::{ArrayFileHandler, MsgFileHandler, UserSingletonHandler};

/// Builds a handler from its configuration.
pub type HandlerFactory = fn(&HandlerConfig, &Environment) -> HandlerResult<Box<dyn ResourceHandler>>;

/// Static lookup table from discriminator to handler factory.
///
/// Built once at startup; a configuration naming an unregistered
/// discriminator fails with [`HandlerError::UnknownHandler`].
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    factories: BTreeMap<&'static str, HandlerFactory>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in handlers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ArrayFileHandler::DISCRIMINATOR, |config, env| {
            Ok(Box::new(ArrayFileHandler::from_config(config, env)?))
        });
        registry.register(MsgFileHandler::DISCRIMINATOR, |config, env| {
            Ok(Box::new(MsgFileHandler::from_config(config, env)?))
        });
        registry.register(UserSingletonHandler::DISCRIMINATOR, |config, env| {
            Ok(Box::new(UserSingletonHandler::from_config(config, env)?))
        });
        registry
    }

    /// Register a factory, replacing any previous one for `discriminator`.
    pub fn register(&mut self, discriminator: &'static str, factory: HandlerFactory) {
        self.factories.insert(discriminator, factory);
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.factories.contains_key(discriminator)
    }

    /// Registered discriminators in sorted order.
    pub fn discriminators(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Build the handler `config` names.
    pub fn build(&self, config: &HandlerConfig, env: &Environment) -> HandlerResult<Box<dyn ResourceHandler>> {
        let factory = self
            .factories
            .get(config.handler.as_str())
            .ok_or_else(|| HandlerError::UnknownHandler(config.handler.clone()))?;
        let handler = factory(config, env)?;
        debug!(handler = %config.handler, "resource handler built");
        Ok(handler)
    }
}
