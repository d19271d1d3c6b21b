//! Discovery engine configuration.

use serde::Deserialize;

/// Discovery engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Minimum profit margin percentage as a decimal string (e.g., "20").
    pub min_profit_margin: Option<String>,
    /// Listings requested per source for each search term.
    pub listings_per_product: Option<usize>,
    /// Maximum number of search terms examined in one run.
    pub max_search_terms: Option<usize>,
    /// Seed terms used when a run provides no search terms.
    pub seed_terms: Option<Vec<String>>,
}
