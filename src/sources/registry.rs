//! Registry for marketplace source instances.

use super::ebay::EbaySource;
use super::{MarketplaceSource, SourceError, Result};
use crate::config::{Config, MarketplaceConfig};
use crate::domain::Marketplace;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Registry holds the configured marketplace sources.
pub struct Registry {
    /// Map of marketplace to source instance.
    sources: Arc<RwLock<HashMap<Marketplace, Arc<dyn MarketplaceSource>>>>,
}

impl Registry {
    /// Creates a new empty Registry.
    pub fn new() -> Self {
        Self {
            sources: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a Registry from configuration.
    /// Only enabled marketplaces will be instantiated.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let registry = Self::new();

        for (name, marketplace_config) in &config.marketplaces {
            if !marketplace_config.enabled {
                info!(marketplace = %name, "Skipping disabled marketplace");
                continue;
            }

            info!(marketplace = %name, "Loading marketplace source from config");

            let source = Self::create_source(name, marketplace_config)?;
            registry.register(source).await;
        }

        Ok(registry)
    }

    /// Factory method to create a source instance based on name and config.
    fn create_source(
        name: &str,
        config: &MarketplaceConfig,
    ) -> Result<Arc<dyn MarketplaceSource>> {
        let marketplace = Marketplace::from_str(name)
            .map_err(|e| SourceError::Internal(e))?;

        match marketplace {
            Marketplace::Ebay => Ok(Arc::new(EbaySource::from_config(config))),
            _ => Err(SourceError::Internal(format!(
                "marketplace {} is not yet implemented",
                name
            ))),
        }
    }

    /// Registers a source with the registry, replacing any existing source
    /// for the same marketplace.
    pub async fn register(&self, source: Arc<dyn MarketplaceSource>) {
        let marketplace = source.marketplace();
        let mut sources = self.sources.write().await;
        info!(marketplace = %marketplace, "Registering marketplace source");
        sources.insert(marketplace, source);
    }

    /// Unregisters a source by marketplace.
    pub async fn unregister(&self, marketplace: Marketplace) -> Result<()> {
        let mut sources = self.sources.write().await;
        if sources.remove(&marketplace).is_some() {
            info!(marketplace = %marketplace, "Unregistered marketplace source");
            Ok(())
        } else {
            warn!(marketplace = %marketplace, "Attempted to unregister unknown marketplace");
            Err(SourceError::Internal(format!(
                "marketplace {} not found",
                marketplace
            )))
        }
    }

    /// Returns the source for a marketplace, if registered.
    pub async fn get(&self, marketplace: Marketplace) -> Option<Arc<dyn MarketplaceSource>> {
        let sources = self.sources.read().await;
        sources.get(&marketplace).cloned()
    }

    /// Returns all registered marketplaces.
    pub async fn list(&self) -> Vec<Marketplace> {
        let sources = self.sources.read().await;
        sources.keys().copied().collect()
    }

    /// Returns all registered sources.
    pub async fn all(&self) -> Vec<Arc<dyn MarketplaceSource>> {
        let sources = self.sources.read().await;
        sources.values().cloned().collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
