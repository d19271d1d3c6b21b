//! eBay marketplace source implementation.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::config::MarketplaceConfig;
use crate::domain::{Listing, Marketplace};
use crate::sources::ebay::Client;
use crate::sources::{MarketplaceSource, Result};

/// Browse API search endpoint.
const SEARCH_ENDPOINT: &str = "/buy/browse/v1/item_summary/search";

/// Item summaries as returned by the Browse API search call.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "itemSummaries", default)]
    pub item_summaries: Vec<ItemSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemSummary {
    #[serde(rename = "itemId")]
    pub item_id: String,
    pub title: String,
    pub price: Option<MoneyAmount>,
    #[serde(rename = "shippingOptions", default)]
    pub shipping_options: Vec<ShippingOption>,
    pub condition: Option<String>,
    #[serde(rename = "itemWebUrl")]
    pub item_web_url: Option<String>,
    #[serde(rename = "itemLocation")]
    pub item_location: Option<ItemLocation>,
    #[serde(rename = "itemCreationDate")]
    pub item_creation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoneyAmount {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShippingOption {
    #[serde(rename = "shippingCost")]
    pub shipping_cost: Option<MoneyAmount>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemLocation {
    pub city: Option<String>,
    #[serde(rename = "stateOrProvince")]
    pub state_or_province: Option<String>,
}

/// eBay marketplace source backed by the Browse API.
pub struct EbaySource {
    client: Client,
}

impl EbaySource {
    /// Creates a new EbaySource from marketplace config.
    pub fn from_config(config: &MarketplaceConfig) -> Self {
        Self {
            client: Client::from_config(config),
        }
    }
}

#[async_trait]
impl MarketplaceSource for EbaySource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Listing>> {
        let params = HashMap::from([
            ("q".to_string(), query.to_string()),
            ("limit".to_string(), limit.to_string()),
        ]);

        let body = self.client.get(SEARCH_ENDPOINT, &params).await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;

        let listings: Vec<Listing> = response
            .item_summaries
            .into_iter()
            .filter_map(map_item)
            .take(limit)
            .collect();

        debug!(query = %query, count = listings.len(), "ebay search completed");
        Ok(listings)
    }

    fn marketplace(&self) -> Marketplace {
        Marketplace::Ebay
    }
}

/// Maps one Browse API item summary into a Listing.
///
/// Items without a parseable price are dropped; a missing shipping cost
/// defaults to zero rather than failing the item.
pub(crate) fn map_item(item: ItemSummary) -> Option<Listing> {
    let price = item
        .price
        .as_ref()
        .and_then(|p| Decimal::from_str(&p.value).ok())?;

    let shipping_cost = item
        .shipping_options
        .first()
        .and_then(|o| o.shipping_cost.as_ref())
        .and_then(|c| Decimal::from_str(&c.value).ok())
        .unwrap_or(Decimal::ZERO);

    let location = item.item_location.and_then(|l| match (l.city, l.state_or_province) {
        (Some(city), Some(state)) => Some(format!("{}, {}", city, state)),
        (Some(city), None) => Some(city),
        (None, Some(state)) => Some(state),
        (None, None) => None,
    });

    let listed_at = item
        .item_creation_date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(Listing {
        marketplace: Marketplace::Ebay,
        title: item.title,
        price,
        shipping_cost,
        condition: item.condition.unwrap_or_else(|| "Unknown".to_string()),
        location,
        url: item.item_web_url.unwrap_or_default(),
        listed_at,
        external_id: item.item_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_summary(json: &str) -> ItemSummary {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_map_full_item() {
        let item = parse_summary(
            r#"{
                "itemId": "v1|123|0",
                "title": "iPhone 15 Pro 256GB",
                "price": {"value": "649.99", "currency": "USD"},
                "shippingOptions": [{"shippingCost": {"value": "12.50", "currency": "USD"}}],
                "condition": "Used",
                "itemWebUrl": "https://ebay.com/itm/123",
                "itemLocation": {"city": "Austin", "stateOrProvince": "TX"},
                "itemCreationDate": "2025-06-01T12:00:00.000Z"
            }"#,
        );

        let listing = map_item(item).unwrap();
        assert_eq!(listing.marketplace, Marketplace::Ebay);
        assert_eq!(listing.title, "iPhone 15 Pro 256GB");
        assert_eq!(listing.price, Decimal::new(64999, 2));
        assert_eq!(listing.shipping_cost, Decimal::new(1250, 2));
        assert_eq!(listing.condition, "Used");
        assert_eq!(listing.location.as_deref(), Some("Austin, TX"));
        assert_eq!(listing.external_id, "v1|123|0");
    }

    #[test]
    fn test_map_item_defaults_missing_shipping_to_zero() {
        let item = parse_summary(
            r#"{
                "itemId": "v1|124|0",
                "title": "Nintendo Switch OLED",
                "price": {"value": "200.00", "currency": "USD"}
            }"#,
        );

        let listing = map_item(item).unwrap();
        assert_eq!(listing.shipping_cost, Decimal::ZERO);
        assert_eq!(listing.condition, "Unknown");
    }

    #[test]
    fn test_map_item_without_price_is_dropped() {
        let item = parse_summary(
            r#"{
                "itemId": "v1|125|0",
                "title": "No price here"
            }"#,
        );

        assert!(map_item(item).is_none());
    }

    #[test]
    fn test_search_response_without_items() {
        let response: SearchResponse = serde_json::from_str(r#"{"total": 0}"#).unwrap();
        assert!(response.item_summaries.is_empty());
    }
}
