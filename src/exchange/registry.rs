//! Name-keyed connector factory registry.
//!
//! The router looks an exchange type up by name and gets a fresh connector
//! instance; new exchange adapters plug in by registering a factory, without
//! touching the router. Registration happens once per exchange type during
//! process startup, before any `create` call; the registry imposes no order
//! between different exchanges' registrations.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::RegistryError;

use super::connector::ExchangeConnector;

/// Constructor for connector instances; the argument is the instance name.
pub type ConnectorFactory = Arc<dyn Fn(&str) -> Box<dyn ExchangeConnector> + Send + Sync>;

/// Registry mapping exchange-type names to connector factories.
///
/// Built explicitly at startup and owned by the router. One factory may be
/// invoked many times to produce independent instances of the same exchange
/// type (one per I/O worker, say), each with its own lifecycle and control
/// state.
#[derive(Default)]
pub struct ConnectorRegistry {
    factories: Mutex<HashMap<String, ConnectorFactory>>,
}

impl ConnectorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a unique exchange-type name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRegistration`] if the name is
    /// taken; the existing factory is left in place.
    pub fn register<F>(
        &self,
        exchange_type: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&str) -> Box<dyn ExchangeConnector> + Send + Sync + 'static,
    {
        let exchange_type = exchange_type.into();
        let mut factories = self.factories.lock();
        match factories.entry(exchange_type) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateRegistration {
                exchange_type: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                info!(exchange_type = %entry.key(), "exchange factory registered");
                entry.insert(Arc::new(factory));
                Ok(())
            }
        }
    }

    /// Create a new connector instance of the given exchange type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownExchangeType`] if no factory was
    /// registered under that name.
    pub fn create(
        &self,
        exchange_type: &str,
        instance_name: &str,
    ) -> Result<Box<dyn ExchangeConnector>, RegistryError> {
        let factory = self
            .factories
            .lock()
            .get(exchange_type)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownExchangeType {
                exchange_type: exchange_type.to_string(),
            })?;

        debug!(exchange_type, instance_name, "creating connector");
        Ok(factory(instance_name))
    }

    /// Whether a factory is registered under this name.
    #[must_use]
    pub fn contains(&self, exchange_type: &str) -> bool {
        self.factories.lock().contains_key(exchange_type)
    }

    /// Registered exchange-type names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered exchange types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.lock().len()
    }

    /// Whether no exchange types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.lock().is_empty()
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("exchange_types", &self.names())
            .finish()
    }
}
