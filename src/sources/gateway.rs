//! Fan-out gateway over the configured marketplace sources.
//!
//! Searches every registered source concurrently under a permit cap, with a
//! per-source deadline and an overall deadline. Source failures are soft:
//! the gateway logs and substitutes an empty result, so the caller cannot
//! distinguish a failed source from one with no matching listings.

use super::MarketplaceSource;
use crate::config::GatewayConfig;
use crate::domain::{Listing, Marketplace};
use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Default cap on simultaneous in-flight source calls.
const DEFAULT_MAX_CONCURRENT_CALLS: usize = 2;

/// Default deadline for a single source call.
const DEFAULT_PER_SOURCE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default deadline for one whole fan-out.
const DEFAULT_OVERALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Concurrency and deadline limits for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayLimits {
    /// Maximum simultaneous in-flight source calls.
    pub max_concurrent_calls: usize,
    /// Deadline for each individual source call.
    pub per_source_timeout: Duration,
    /// Deadline for one whole fan-out.
    pub overall_timeout: Duration,
}

impl Default for GatewayLimits {
    fn default() -> Self {
        Self {
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
            per_source_timeout: DEFAULT_PER_SOURCE_TIMEOUT,
            overall_timeout: DEFAULT_OVERALL_TIMEOUT,
        }
    }
}

impl GatewayLimits {
    /// Builds limits from the optional gateway config section.
    pub fn from_config(config: Option<&GatewayConfig>) -> Self {
        let defaults = Self::default();
        match config {
            Some(config) => Self {
                max_concurrent_calls: config
                    .max_concurrent_calls
                    .filter(|&n| n > 0)
                    .unwrap_or(defaults.max_concurrent_calls),
                per_source_timeout: some_duration(config.per_source_timeout)
                    .unwrap_or(defaults.per_source_timeout),
                overall_timeout: some_duration(config.overall_timeout)
                    .unwrap_or(defaults.overall_timeout),
            },
            None => defaults,
        }
    }
}

fn some_duration(d: Duration) -> Option<Duration> {
    if d.is_zero() { None } else { Some(d) }
}

/// SourceGateway fans a query out to the configured marketplace sources.
pub struct SourceGateway {
    sources: Vec<Arc<dyn MarketplaceSource>>,
    permits: Arc<Semaphore>,
    per_source_timeout: Duration,
    overall_timeout: Duration,
}

impl SourceGateway {
    /// Creates a gateway over the given sources.
    pub fn new(sources: Vec<Arc<dyn MarketplaceSource>>, limits: GatewayLimits) -> Self {
        Self {
            sources,
            permits: Arc::new(Semaphore::new(limits.max_concurrent_calls.max(1))),
            per_source_timeout: limits.per_source_timeout,
            overall_timeout: limits.overall_timeout,
        }
    }

    /// Marketplaces this gateway can search.
    pub fn marketplaces(&self) -> Vec<Marketplace> {
        self.sources.iter().map(|s| s.marketplace()).collect()
    }

    /// Searches every source matching `filter` (all sources when empty) and
    /// merges the results, deduplicated by (marketplace, external id).
    ///
    /// Best-effort: individual timeouts, transport errors, and API errors
    /// become empty per-source results; expiry of the overall deadline
    /// returns whatever has been merged so far. This method never fails.
    pub async fn search(
        &self,
        query: &str,
        filter: &[Marketplace],
        limit_per_source: usize,
    ) -> Vec<Listing> {
        let selected: Vec<Arc<dyn MarketplaceSource>> = self
            .sources
            .iter()
            .filter(|s| filter.is_empty() || filter.contains(&s.marketplace()))
            .cloned()
            .collect();

        if selected.is_empty() {
            return Vec::new();
        }

        let fanout_width = selected.len();
        let per_source_timeout = self.per_source_timeout;

        let mut batches = stream::iter(selected)
            .map(|source| {
                let permits = Arc::clone(&self.permits);
                let query = query.to_string();
                async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return Vec::new(),
                    };

                    let marketplace = source.marketplace();
                    match tokio::time::timeout(
                        per_source_timeout,
                        source.search(&query, limit_per_source),
                    )
                    .await
                    {
                        Ok(Ok(listings)) => {
                            debug!(
                                marketplace = %marketplace,
                                query = %query,
                                count = listings.len(),
                                "source search completed"
                            );
                            listings
                        }
                        Ok(Err(e)) => {
                            warn!(
                                marketplace = %marketplace,
                                query = %query,
                                error = %e,
                                "source search failed, treating as empty"
                            );
                            Vec::new()
                        }
                        Err(_) => {
                            warn!(
                                marketplace = %marketplace,
                                query = %query,
                                timeout = ?per_source_timeout,
                                "source search timed out, treating as empty"
                            );
                            Vec::new()
                        }
                    }
                }
            })
            .buffer_unordered(fanout_width);

        let deadline = tokio::time::sleep(self.overall_timeout);
        tokio::pin!(deadline);

        let mut merged: Vec<Listing> = Vec::new();
        loop {
            tokio::select! {
                batch = batches.next() => match batch {
                    Some(listings) => merged.extend(listings),
                    None => break,
                },
                _ = &mut deadline => {
                    warn!(
                        query = %query,
                        timeout = ?self.overall_timeout,
                        "overall search deadline reached, returning partial results"
                    );
                    break;
                }
            }
        }

        dedup_listings(merged)
    }
}

/// Drops listings sharing (marketplace, external id), keeping the first.
fn dedup_listings(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen: HashSet<(Marketplace, String)> = HashSet::new();
    listings
        .into_iter()
        .filter(|l| seen.insert((l.marketplace, l.external_id.clone())))
        .collect()
}
