//! Deal and product domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Marketplace;

/// DiscoveryMethod indicates how a deal was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// Buy and sell side observed on two different marketplaces.
    CrossMarketplace,
    /// Single observed listing scored against an estimated sell price.
    SingleMarketplace,
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryMethod::CrossMarketplace => write!(f, "cross_marketplace"),
            DiscoveryMethod::SingleMarketplace => write!(f, "single_marketplace"),
        }
    }
}

impl std::str::FromStr for DiscoveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cross_marketplace" => Ok(DiscoveryMethod::CrossMarketplace),
            "single_marketplace" => Ok(DiscoveryMethod::SingleMarketplace),
            _ => Err(format!("Unknown discovery method: {}", s)),
        }
    }
}

/// Product is the buy-side item a deal recommends acquiring.
///
/// Products synthesized during discovery carry ids from the reserved
/// ephemeral range; persisted rows carry storage-issued ids below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Identifier; ephemeral products draw from the reserved range.
    pub id: i64,
    /// Title from the underlying buy-side listing.
    pub title: String,
    /// Normalized fingerprint used for grouping and deduplication.
    pub fingerprint: String,
    /// Marketplace the buy-side listing was observed on.
    pub marketplace: Marketplace,
    /// Asking price of the buy-side listing.
    pub price: Decimal,
    /// Shipping cost of the buy-side listing.
    pub shipping_cost: Decimal,
    /// Condition as reported by the marketplace.
    pub condition: String,
    /// Link back to the buy-side listing.
    pub url: String,
}

/// Deal is a synthesized buy/resell recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    /// Identifier; ephemeral deals draw from the reserved range.
    pub id: i64,
    /// Buy-side product.
    pub product: Product,
    /// Price the item is expected to resell for.
    pub estimated_sell_price: Decimal,
    /// Estimated sell price minus buy price and shipping.
    pub potential_profit: Decimal,
    /// Potential profit as a percentage of the acquisition cost.
    pub profit_margin: Decimal,
    /// Attractiveness ranking, 0-100.
    pub score: u8,
    /// How much comparable data backed the score, 0-100.
    pub confidence: u8,
    /// Human-readable explanation of the recommendation.
    pub reasoning: String,
    /// Number of listings examined to produce this deal.
    pub listings_analyzed: usize,
    /// How the deal was derived.
    pub method: DiscoveryMethod,
    /// When the deal was synthesized.
    pub discovered_at: DateTime<Utc>,
}

impl Deal {
    /// Returns true if the potential profit is positive.
    pub fn is_profitable(&self) -> bool {
        self.potential_profit > Decimal::ZERO
    }
}
