//! Per-marketplace source configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Settings for a single marketplace source.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Whether this marketplace should be searched.
    #[serde(default)]
    pub enabled: bool,
    /// Use the marketplace's sandbox environment.
    #[serde(default)]
    pub sandbox: bool,
    /// API key (loaded from environment variable).
    #[serde(skip)]
    pub api_key: String,
    /// Maximum API requests per minute.
    pub rate_limit: Option<i32>,
    /// Per-request HTTP timeout.
    #[serde(default, with = "duration")]
    pub request_timeout: Duration,
}
