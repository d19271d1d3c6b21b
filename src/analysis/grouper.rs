//! Partitioning of listings into comparable groups.

use super::normalizer;
use crate::domain::Listing;
use std::collections::HashMap;

/// Result of partitioning one discovery pass's listings.
///
/// `groups` hold two or more listings sharing a fingerprint and are
/// candidates for cross-marketplace comparison; `singles` carry every
/// listing without a comparable peer (including listings whose titles
/// normalize to an empty, ungroupable fingerprint) and feed the synthetic
/// scoring path.
#[derive(Debug, Default)]
pub struct GroupedListings {
    pub groups: Vec<(String, Vec<Listing>)>,
    pub singles: Vec<Listing>,
}

/// Partitions listings by normalized fingerprint.
pub fn partition(listings: Vec<Listing>) -> GroupedListings {
    let mut by_fingerprint: HashMap<String, Vec<Listing>> = HashMap::new();
    let mut result = GroupedListings::default();

    for listing in listings {
        let fingerprint = normalizer::fingerprint(&listing.title);
        if fingerprint.is_empty() {
            // Empty fingerprints must not be grouped with each other.
            result.singles.push(listing);
            continue;
        }
        by_fingerprint.entry(fingerprint).or_default().push(listing);
    }

    for (fingerprint, members) in by_fingerprint {
        if members.len() >= 2 {
            result.groups.push((fingerprint, members));
        } else {
            result.singles.extend(members);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Marketplace;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn listing(title: &str, external_id: &str) -> Listing {
        Listing {
            marketplace: Marketplace::Ebay,
            title: title.to_string(),
            price: Decimal::from(100),
            shipping_cost: Decimal::ZERO,
            condition: "Used".to_string(),
            location: None,
            url: String::new(),
            listed_at: Utc::now(),
            external_id: external_id.to_string(),
        }
    }

    #[test]
    fn test_groups_matching_fingerprints() {
        let grouped = partition(vec![
            listing("iPhone 15 Pro New", "1"),
            listing("iPhone 15 Pro Used", "2"),
            listing("Nintendo Switch OLED", "3"),
        ]);

        assert_eq!(grouped.groups.len(), 1);
        let (fingerprint, members) = &grouped.groups[0];
        assert_eq!(fingerprint, "iphone 15 pro");
        assert_eq!(members.len(), 2);

        assert_eq!(grouped.singles.len(), 1);
        assert_eq!(grouped.singles[0].title, "Nintendo Switch OLED");
    }

    #[test]
    fn test_empty_fingerprints_never_grouped_together() {
        let grouped = partition(vec![listing("New Used", "1"), listing("Excellent", "2")]);

        assert!(grouped.groups.is_empty());
        assert_eq!(grouped.singles.len(), 2);
    }

    #[test]
    fn test_case_and_whitespace_variants_group() {
        let grouped = partition(vec![
            listing("MacBook  Air M2", "1"),
            listing("macbook air m2 excellent", "2"),
        ]);

        assert_eq!(grouped.groups.len(), 1);
        assert!(grouped.singles.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let grouped = partition(Vec::new());
        assert!(grouped.groups.is_empty());
        assert!(grouped.singles.is_empty());
    }
}
