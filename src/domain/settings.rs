//! Discovery run settings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Marketplace;

/// Settings for one discovery run.
///
/// `exact_result_count` switches the run into exact mode: a feasibility
/// probe precedes the search and the final deal list is truncated to the
/// requested count. Without it the run targets `product_count` deals on a
/// best-effort basis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Exact number of deals the run must attempt to return.
    pub exact_result_count: Option<usize>,
    /// Number of distinct products to find in best-effort mode.
    pub product_count: usize,
    /// Listings requested per source for each search term.
    pub listings_per_product: usize,
    /// Minimum profit margin percentage for a deal to be accepted.
    pub min_profit_margin: Decimal,
    /// Skip buy-side candidates priced above this, when set.
    pub target_buy_price: Option<Decimal>,
    /// Restrict searches to these marketplaces; empty means all.
    pub preferred_marketplaces: Vec<Marketplace>,
    /// Free-text search terms; empty falls back to the trending seed list.
    pub search_terms: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            exact_result_count: None,
            product_count: 5,
            listings_per_product: 10,
            min_profit_margin: Decimal::from(20),
            target_buy_price: None,
            preferred_marketplaces: Vec::new(),
            search_terms: Vec::new(),
        }
    }
}

impl DiscoverySettings {
    /// Validates the settings before any external work begins.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(count) = self.exact_result_count {
            if count == 0 {
                return Err("exact_result_count must be positive".to_string());
            }
        }
        if self.exact_result_count.is_none() && self.product_count == 0 {
            return Err("product_count must be positive".to_string());
        }
        if self.listings_per_product == 0 {
            return Err("listings_per_product must be positive".to_string());
        }
        if self.min_profit_margin < Decimal::ZERO {
            return Err("min_profit_margin must not be negative".to_string());
        }
        if let Some(price) = self.target_buy_price {
            if price <= Decimal::ZERO {
                return Err("target_buy_price must be positive".to_string());
            }
        }
        Ok(())
    }

    /// Number of deals this run is aiming for.
    pub fn target_count(&self) -> usize {
        self.exact_result_count.unwrap_or(self.product_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(DiscoverySettings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_exact_count_rejected() {
        let settings = DiscoverySettings {
            exact_result_count: Some(0),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.contains("exact_result_count"));
    }

    #[test]
    fn test_negative_margin_rejected() {
        let settings = DiscoverySettings {
            min_profit_margin: Decimal::from(-5),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_target_count_prefers_exact() {
        let settings = DiscoverySettings {
            exact_result_count: Some(3),
            product_count: 7,
            ..Default::default()
        };
        assert_eq!(settings.target_count(), 3);
    }

    #[test]
    fn test_zero_product_count_rejected_without_exact() {
        let settings = DiscoverySettings {
            product_count: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
