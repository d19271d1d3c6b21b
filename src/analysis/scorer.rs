//! Deal scoring for grouped and single listings.

use crate::domain::{DiscoveryMethod, Listing};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

/// Minimum profit in dollars for a single-listing deal to be worth surfacing.
const SYNTHETIC_PROFIT_FLOOR: i64 = 10;

/// Score ceiling for single-listing deals; the estimated sell side is
/// speculative, so they never outrank a fully observed spread.
const SYNTHETIC_SCORE_CAP: u8 = 95;

/// Fixed confidence for single-listing deals.
const SYNTHETIC_CONFIDENCE: u8 = 75;

/// Confidence baseline and per-corroborating-listing increment for
/// cross-marketplace deals.
const CROSS_CONFIDENCE_BASE: u8 = 50;
const CROSS_CONFIDENCE_STEP: u8 = 15;
const CROSS_CONFIDENCE_CAP: u8 = 95;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("no listings provided for scoring")]
    NoListings,
}

/// DealQuote is a scored buy/resell opportunity before id assignment.
#[derive(Debug, Clone)]
pub struct DealQuote {
    /// Buy-side listing.
    pub buy: Listing,
    pub estimated_sell_price: Decimal,
    pub potential_profit: Decimal,
    /// Profit as a percentage of the acquisition cost.
    pub profit_margin: Decimal,
    pub score: u8,
    pub confidence: u8,
    pub reasoning: String,
    pub listings_analyzed: usize,
    pub method: DiscoveryMethod,
}

/// Scores a group of comparable listings from the observed price spread.
///
/// The cheapest listing (by total cost) is the buy side and the most
/// expensive the sell side. Returns `Ok(None)` when the spread is not
/// profitable or falls below the margin threshold; errors only on an
/// empty group, which indicates a grouping bug upstream.
pub fn score_cross(
    listings: &[Listing],
    min_profit_margin: Decimal,
) -> Result<Option<DealQuote>, ScoreError> {
    let buy = listings
        .iter()
        .min_by_key(|l| l.total_cost())
        .ok_or(ScoreError::NoListings)?;
    let sell = listings
        .iter()
        .max_by_key(|l| l.total_cost())
        .ok_or(ScoreError::NoListings)?;

    let buy_total = buy.total_cost();
    let sell_total = sell.total_cost();
    let profit = sell_total - buy_total;

    if profit <= Decimal::ZERO || buy_total <= Decimal::ZERO {
        return Ok(None);
    }

    let margin = profit / buy_total * Decimal::from(100);
    if margin < min_profit_margin {
        debug!(
            buy = %buy.marketplace,
            margin = %margin.round_dp(2),
            "spread below margin threshold"
        );
        return Ok(None);
    }

    let confidence = CROSS_CONFIDENCE_BASE
        .saturating_add(CROSS_CONFIDENCE_STEP.saturating_mul((listings.len() - 1).min(255) as u8))
        .min(CROSS_CONFIDENCE_CAP);

    let reasoning = format!(
        "Listed at ${} on {} while a comparable listing asks ${} on {} ({}% margin across {} listings)",
        buy_total.round_dp(2),
        buy.marketplace,
        sell_total.round_dp(2),
        sell.marketplace,
        margin.round_dp(1),
        listings.len(),
    );

    Ok(Some(DealQuote {
        buy: buy.clone(),
        estimated_sell_price: sell_total,
        potential_profit: profit,
        profit_margin: margin,
        score: clamp_score(margin * Decimal::from(2)),
        confidence,
        reasoning,
        listings_analyzed: listings.len(),
        method: DiscoveryMethod::CrossMarketplace,
    }))
}

/// Scores a single listing against an externally estimated sell price.
///
/// Returns `None` when the estimate does not clear the profit floor or the
/// margin threshold.
pub fn score_synthetic(
    listing: &Listing,
    estimated_sell_price: Decimal,
    min_profit_margin: Decimal,
) -> Option<DealQuote> {
    let buy_total = listing.total_cost();
    if buy_total <= Decimal::ZERO {
        return None;
    }

    let profit = estimated_sell_price - buy_total;
    if profit <= Decimal::from(SYNTHETIC_PROFIT_FLOOR) {
        return None;
    }

    let margin = profit / buy_total * Decimal::from(100);
    if margin < min_profit_margin {
        return None;
    }

    let reasoning = format!(
        "Listed at ${} on {}, estimated to resell around ${} ({}% margin)",
        buy_total.round_dp(2),
        listing.marketplace,
        estimated_sell_price.round_dp(2),
        margin.round_dp(1),
    );

    Some(DealQuote {
        buy: listing.clone(),
        estimated_sell_price,
        potential_profit: profit,
        profit_margin: margin,
        score: clamp_score(margin * Decimal::from(2)).min(SYNTHETIC_SCORE_CAP),
        confidence: SYNTHETIC_CONFIDENCE,
        reasoning,
        listings_analyzed: 1,
        method: DiscoveryMethod::SingleMarketplace,
    })
}

/// Clamps a raw score into the 0-100 range.
fn clamp_score(raw: Decimal) -> u8 {
    raw.to_u8().map(|s| s.min(100)).unwrap_or(if raw > Decimal::ZERO { 100 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Marketplace;
    use chrono::Utc;

    fn listing(marketplace: Marketplace, price: i64, shipping: i64) -> Listing {
        Listing {
            marketplace,
            title: "iPhone 15 Pro".to_string(),
            price: Decimal::from(price),
            shipping_cost: Decimal::from(shipping),
            condition: "Used".to_string(),
            location: None,
            url: String::new(),
            listed_at: Utc::now(),
            external_id: format!("{}-{}", marketplace, price),
        }
    }

    #[test]
    fn test_cross_spread_scored() {
        let group = vec![
            listing(Marketplace::Craigslist, 100, 5),
            listing(Marketplace::Ebay, 180, 0),
        ];

        let quote = score_cross(&group, Decimal::from(20)).unwrap().unwrap();
        assert_eq!(quote.buy.marketplace, Marketplace::Craigslist);
        assert_eq!(quote.estimated_sell_price, Decimal::from(180));
        assert_eq!(quote.potential_profit, Decimal::from(75));
        // 75 / 105 * 100 = 71.43%
        assert_eq!(quote.profit_margin.round_dp(2), Decimal::new(7143, 2));
        assert_eq!(quote.score, 100);
        assert_eq!(quote.confidence, 65);
        assert_eq!(quote.method, DiscoveryMethod::CrossMarketplace);
        assert!(quote.reasoning.contains("craigslist"));
        assert!(quote.reasoning.contains("ebay"));
    }

    #[test]
    fn test_cross_empty_group_is_error() {
        assert!(matches!(
            score_cross(&[], Decimal::from(20)),
            Err(ScoreError::NoListings)
        ));
    }

    #[test]
    fn test_cross_unprofitable_spread() {
        let group = vec![
            listing(Marketplace::Ebay, 100, 0),
            listing(Marketplace::Facebook, 100, 0),
        ];
        assert!(score_cross(&group, Decimal::from(20)).unwrap().is_none());
    }

    #[test]
    fn test_cross_below_margin_threshold() {
        // 10% margin against a 20% floor.
        let group = vec![
            listing(Marketplace::Ebay, 100, 0),
            listing(Marketplace::Facebook, 110, 0),
        ];
        assert!(score_cross(&group, Decimal::from(20)).unwrap().is_none());
    }

    #[test]
    fn test_cross_confidence_grows_with_group_size() {
        let mut group = vec![
            listing(Marketplace::Ebay, 100, 0),
            listing(Marketplace::Facebook, 180, 0),
        ];
        for price in [150, 160, 170, 175] {
            group.push(listing(Marketplace::Mercari, price, 0));
        }

        // 6 listings: 50 + 15*5 = 125 capped at 95.
        let quote = score_cross(&group, Decimal::ZERO).unwrap().unwrap();
        assert_eq!(quote.confidence, 95);
        assert_eq!(quote.listings_analyzed, 6);
    }

    #[test]
    fn test_cross_score_clamped_to_100() {
        let group = vec![
            listing(Marketplace::Craigslist, 10, 0),
            listing(Marketplace::Ebay, 500, 0),
        ];
        let quote = score_cross(&group, Decimal::ZERO).unwrap().unwrap();
        assert_eq!(quote.score, 100);
    }

    #[test]
    fn test_synthetic_scored() {
        let candidate = listing(Marketplace::Craigslist, 100, 0);
        let quote = score_synthetic(&candidate, Decimal::from(150), Decimal::from(20)).unwrap();

        assert_eq!(quote.potential_profit, Decimal::from(50));
        assert_eq!(quote.profit_margin, Decimal::from(50));
        assert_eq!(quote.score, 95);
        assert_eq!(quote.confidence, SYNTHETIC_CONFIDENCE);
        assert_eq!(quote.listings_analyzed, 1);
        assert_eq!(quote.method, DiscoveryMethod::SingleMarketplace);
    }

    #[test]
    fn test_synthetic_profit_floor() {
        let candidate = listing(Marketplace::Ebay, 100, 0);
        // $10 profit is at the floor, not above it.
        assert!(score_synthetic(&candidate, Decimal::from(110), Decimal::ZERO).is_none());
        assert!(score_synthetic(&candidate, Decimal::new(11001, 2), Decimal::ZERO).is_some());
    }

    #[test]
    fn test_synthetic_below_margin_threshold() {
        let candidate = listing(Marketplace::Ebay, 100, 0);
        assert!(score_synthetic(&candidate, Decimal::from(115), Decimal::from(20)).is_none());
    }

    #[test]
    fn test_synthetic_score_capped() {
        let candidate = listing(Marketplace::Ebay, 10, 0);
        let quote = score_synthetic(&candidate, Decimal::from(500), Decimal::ZERO).unwrap();
        assert_eq!(quote.score, SYNTHETIC_SCORE_CAP);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(Decimal::from(-5)), 0);
        assert_eq!(clamp_score(Decimal::from(40)), 40);
        assert_eq!(clamp_score(Decimal::from(250)), 100);
        assert_eq!(clamp_score(Decimal::from(100000)), 100);
    }
}
