//! Marketplace listing domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marketplace identifies the venue a listing was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marketplace {
    Ebay,
    Facebook,
    Craigslist,
    OfferUp,
    Mercari,
}

impl Marketplace {
    /// Fixed resale-price multiplier applied to comparable-sales estimates.
    ///
    /// Items resell above the comparable median on eBay and below it on the
    /// local-pickup venues.
    pub fn sell_price_multiplier(&self) -> Decimal {
        match self {
            Marketplace::Ebay => Decimal::new(11, 1),        // 1.1
            Marketplace::Facebook => Decimal::new(95, 2),    // 0.95
            Marketplace::Craigslist => Decimal::new(9, 1),   // 0.9
            Marketplace::OfferUp | Marketplace::Mercari => Decimal::ONE,
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marketplace::Ebay => write!(f, "ebay"),
            Marketplace::Facebook => write!(f, "facebook"),
            Marketplace::Craigslist => write!(f, "craigslist"),
            Marketplace::OfferUp => write!(f, "offerup"),
            Marketplace::Mercari => write!(f, "mercari"),
        }
    }
}

impl std::str::FromStr for Marketplace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ebay" => Ok(Marketplace::Ebay),
            "facebook" | "facebook_marketplace" => Ok(Marketplace::Facebook),
            "craigslist" => Ok(Marketplace::Craigslist),
            "offerup" | "offer_up" => Ok(Marketplace::OfferUp),
            "mercari" => Ok(Marketplace::Mercari),
            _ => Err(format!("Unknown marketplace: {}", s)),
        }
    }
}

/// Listing is one observed offer for an item on a single marketplace.
///
/// Immutable once fetched; owned transiently by the discovery run that
/// fetched it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Marketplace the listing was observed on.
    pub marketplace: Marketplace,
    /// Raw listing title as shown on the marketplace.
    pub title: String,
    /// Asking price, excluding shipping.
    pub price: Decimal,
    /// Shipping cost; zero when the marketplace reports none (local pickup).
    pub shipping_cost: Decimal,
    /// Item condition as reported by the marketplace (e.g., "Used").
    pub condition: String,
    /// Seller location, when the marketplace exposes one.
    pub location: Option<String>,
    /// Link back to the listing.
    pub url: String,
    /// When the listing was published.
    pub listed_at: DateTime<Utc>,
    /// Identifier assigned by the source marketplace.
    pub external_id: String,
}

impl Listing {
    /// Total acquisition cost: price plus shipping.
    pub fn total_cost(&self) -> Decimal {
        self.price + self.shipping_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_marketplace_roundtrip() {
        for name in ["ebay", "facebook", "craigslist", "offerup", "mercari"] {
            let marketplace = Marketplace::from_str(name).unwrap();
            assert_eq!(marketplace.to_string(), name);
        }
    }

    #[test]
    fn test_marketplace_from_str_unknown() {
        assert!(Marketplace::from_str("etsy").is_err());
    }

    #[test]
    fn test_sell_price_multipliers() {
        assert_eq!(
            Marketplace::Ebay.sell_price_multiplier(),
            Decimal::new(11, 1)
        );
        assert_eq!(
            Marketplace::Facebook.sell_price_multiplier(),
            Decimal::new(95, 2)
        );
        assert_eq!(
            Marketplace::Craigslist.sell_price_multiplier(),
            Decimal::new(9, 1)
        );
        assert_eq!(Marketplace::Mercari.sell_price_multiplier(), Decimal::ONE);
    }

    #[test]
    fn test_total_cost() {
        let listing = Listing {
            marketplace: Marketplace::Ebay,
            title: "iPhone 15 Pro".to_string(),
            price: Decimal::new(10000, 2),
            shipping_cost: Decimal::new(500, 2),
            condition: "Used".to_string(),
            location: None,
            url: "https://example.com/1".to_string(),
            listed_at: Utc::now(),
            external_id: "1".to_string(),
        };
        assert_eq!(listing.total_cost(), Decimal::new(10500, 2));
    }
}
