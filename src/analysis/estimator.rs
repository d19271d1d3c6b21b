//! Sell-price estimation for listings without a cross-marketplace comparable.

use super::normalizer;
use crate::domain::Listing;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

/// Fallback markup applied when no comparable listings exist (1.2x buy price).
fn fallback_markup() -> Decimal {
    Decimal::new(12, 1)
}

/// PriceEstimator produces an estimated resale price for a candidate
/// listing, given the other listings observed in the same discovery pass.
#[async_trait]
pub trait PriceEstimator: Send + Sync {
    async fn estimate_sell_price(&self, candidate: &Listing, pool: &[Listing]) -> Decimal;
}

/// Estimates resale price from similarity-matched listings on other
/// marketplaces within the same result set.
///
/// This compares against concurrently observed asking prices, not verified
/// sales, so it is a speculative proxy; the scorer reflects that with a
/// fixed lower confidence.
pub struct ComparableSalesEstimator;

impl ComparableSalesEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComparableSalesEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceEstimator for ComparableSalesEstimator {
    async fn estimate_sell_price(&self, candidate: &Listing, pool: &[Listing]) -> Decimal {
        let mut comparable_prices: Vec<Decimal> = pool
            .iter()
            .filter(|other| other.marketplace != candidate.marketplace)
            .filter(|other| normalizer::is_similar(&candidate.title, &other.title))
            .map(|other| other.price)
            .collect();

        if comparable_prices.is_empty() {
            let estimate = candidate.price * fallback_markup();
            debug!(
                title = %candidate.title,
                estimate = %estimate,
                "no comparables found, using markup fallback"
            );
            return estimate;
        }

        comparable_prices.sort();
        let base = percentile_75(&comparable_prices);
        let estimate = base * candidate.marketplace.sell_price_multiplier();

        debug!(
            title = %candidate.title,
            comparables = comparable_prices.len(),
            base = %base,
            estimate = %estimate,
            "estimated sell price from comparables"
        );

        estimate
    }
}

/// 75th percentile of a sorted, non-empty price slice (nearest rank).
fn percentile_75(sorted: &[Decimal]) -> Decimal {
    let rank = ((sorted.len() - 1) as f64 * 0.75).round() as usize;
    sorted[rank]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Marketplace;
    use chrono::Utc;

    fn listing(marketplace: Marketplace, title: &str, price: i64) -> Listing {
        Listing {
            marketplace,
            title: title.to_string(),
            price: Decimal::from(price),
            shipping_cost: Decimal::ZERO,
            condition: "Used".to_string(),
            location: None,
            url: String::new(),
            listed_at: Utc::now(),
            external_id: format!("{}-{}", marketplace, price),
        }
    }

    #[tokio::test]
    async fn test_fallback_markup_without_comparables() {
        let estimator = ComparableSalesEstimator::new();
        let candidate = listing(Marketplace::Craigslist, "rare widget", 100);

        let estimate = estimator.estimate_sell_price(&candidate, &[]).await;
        assert_eq!(estimate, Decimal::from(120));
    }

    #[tokio::test]
    async fn test_same_marketplace_listings_are_not_comparables() {
        let estimator = ComparableSalesEstimator::new();
        let candidate = listing(Marketplace::Ebay, "iphone 15 pro", 100);
        let pool = vec![listing(Marketplace::Ebay, "iphone 15 pro", 500)];

        // Only same-marketplace matches exist, so the fallback applies.
        let estimate = estimator.estimate_sell_price(&candidate, &pool).await;
        assert_eq!(estimate, Decimal::from(120));
    }

    #[tokio::test]
    async fn test_percentile_with_marketplace_multiplier() {
        let estimator = ComparableSalesEstimator::new();
        // Craigslist candidate: multiplier 0.9
        let candidate = listing(Marketplace::Craigslist, "iphone 15 pro", 100);
        let pool = vec![
            listing(Marketplace::Ebay, "iphone 15 pro", 200),
            listing(Marketplace::Facebook, "iphone 15 pro", 300),
            listing(Marketplace::Mercari, "iphone 15 pro", 400),
            listing(Marketplace::Ebay, "iphone 15 pro max", 500),
        ];

        // Sorted comparables: [200, 300, 400, 500]; 75th percentile rank
        // round(3 * 0.75) = 2 -> 400; adjusted by 0.9 -> 360.
        let estimate = estimator.estimate_sell_price(&candidate, &pool).await;
        assert_eq!(estimate, Decimal::from(360));
    }

    #[tokio::test]
    async fn test_dissimilar_titles_excluded() {
        let estimator = ComparableSalesEstimator::new();
        let candidate = listing(Marketplace::Mercari, "iphone 15 pro", 100);
        let pool = vec![listing(Marketplace::Ebay, "lawn mower blade", 900)];

        let estimate = estimator.estimate_sell_price(&candidate, &pool).await;
        assert_eq!(estimate, Decimal::from(120));
    }

    #[test]
    fn test_percentile_single_element() {
        assert_eq!(percentile_75(&[Decimal::from(42)]), Decimal::from(42));
    }
}
