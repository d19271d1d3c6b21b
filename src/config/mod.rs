//! Configuration loading and validation for the deal discovery engine.
//!
//! Uses serde_yaml to load YAML configuration files with support for
//! environment variable overrides for sensitive credentials.

mod app;
mod discovery;
mod duration;
mod error;
mod gateway;
mod marketplace;
mod storage;

pub use app::AppConfig;
pub use discovery::DiscoveryConfig;
pub use error::ConfigError;
pub use gateway::GatewayConfig;
pub use marketplace::MarketplaceConfig;
pub use storage::StorageConfig;

use serde::Deserialize;
use std::{collections::HashMap, env, fs};

/// Root configuration structure for the deal discovery engine.
///
/// Required sections: app, marketplaces.
/// Optional sections: gateway, discovery, storage, search_terms.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Maps marketplace names to their source configurations.
    pub marketplaces: HashMap<String, MarketplaceConfig>,
    /// Fan-out concurrency and deadline settings (optional).
    pub gateway: Option<GatewayConfig>,
    /// Discovery engine defaults (optional).
    pub discovery: Option<DiscoveryConfig>,
    /// Deal materialization (optional).
    pub storage: Option<StorageConfig>,
    /// Default search terms for discovery runs (optional).
    #[serde(default)]
    pub search_terms: Vec<String>,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` file (if exists),
    /// then loads YAML config and credentials from environment variables:
    /// `{MARKETPLACE}_API_KEY`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore error if not found)
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_credentials_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load credentials from environment variables.
    fn load_credentials_from_env(&mut self) {
        for (name, marketplace) in self.marketplaces.iter_mut() {
            if !marketplace.enabled {
                continue;
            }

            let env_prefix = name.to_uppercase();
            marketplace.api_key = env::var(format!("{}_API_KEY", env_prefix)).unwrap_or_default();
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        let is_production = self.app.env != "development";

        let mut enabled_marketplaces = 0;
        for (name, marketplace) in &self.marketplaces {
            if marketplace.enabled {
                enabled_marketplaces += 1;

                if let Some(rate_limit) = marketplace.rate_limit {
                    if rate_limit <= 0 {
                        return Err(ConfigError::Validation(format!(
                            "marketplace {}: rate_limit must be positive",
                            name
                        )));
                    }
                }

                // Only require credentials in production/staging
                if is_production && marketplace.api_key.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "marketplace {}: API key not found (set {}_API_KEY env var)",
                        name,
                        name.to_uppercase()
                    )));
                }
            }
        }

        if enabled_marketplaces == 0 {
            return Err(ConfigError::Validation(
                "at least one marketplace must be enabled".into(),
            ));
        }

        if let Some(ref gateway) = self.gateway {
            if let Some(max_concurrent) = gateway.max_concurrent_calls {
                if max_concurrent == 0 {
                    return Err(ConfigError::Validation(
                        "gateway.max_concurrent_calls must be positive".into(),
                    ));
                }
            }
        }

        if let Some(ref discovery) = self.discovery {
            if let Some(listings) = discovery.listings_per_product {
                if listings == 0 {
                    return Err(ConfigError::Validation(
                        "discovery.listings_per_product must be positive".into(),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
