//! Registry of the connection factories available for sign-in.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConnectError;
use crate::factory::ConnectionFactory;

/// Connection factories keyed by provider id.
///
/// Populated once at startup; at most one factory per provider.
#[derive(Default, Clone)]
pub struct ConnectionFactoryRegistry {
    factories: HashMap<String, Arc<dyn ConnectionFactory>>,
}

impl ConnectionFactoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under its provider id.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::DuplicateProvider` if the provider id is taken.
    pub fn add_connection_factory(
        &mut self,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<(), ConnectError> {
        let provider = factory.provider_id().to_string();
        if self.factories.contains_key(&provider) {
            return Err(ConnectError::DuplicateProvider { provider });
        }
        tracing::debug!(provider = %provider, "registered connection factory");
        self.factories.insert(provider, factory);
        Ok(())
    }

    /// Looks up the factory for a provider.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::UnknownProvider` if nothing is registered for it.
    pub fn connection_factory(
        &self,
        provider_id: &str,
    ) -> Result<Arc<dyn ConnectionFactory>, ConnectError> {
        self.factories
            .get(provider_id)
            .cloned()
            .ok_or_else(|| ConnectError::UnknownProvider {
                provider: provider_id.to_string(),
            })
    }

    /// Returns the registered provider ids, sorted.
    #[must_use]
    pub fn registered_provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for ConnectionFactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFactoryRegistry")
            .field("providers", &self.registered_provider_ids())
            .finish()
    }
}
