//! Discovery engine: drives one deal discovery run through its phases.
//!
//! A run validates its settings, fans searches out through the source
//! gateway, groups comparable listings, scores cross-marketplace spreads and
//! single listings, then ranks and truncates the result. Progress snapshots
//! are pushed to the caller's reporter after every phase transition and
//! every merged search term; cancellation is checked between awaits.

mod cancel;
mod error;
mod ids;

pub use cancel::CancelToken;
pub use error::{DiscoveryError, Result};

use ids::IdAllocator;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analysis::{self, normalizer, DealQuote, PriceEstimator};
use crate::domain::{
    Deal, DiscoveryPhase, DiscoveryProgress, DiscoverySettings, Listing, Product,
    MAX_RECENT_FINDINGS,
};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::sources::SourceGateway;

/// Fallback search terms when the caller supplies none.
const TRENDING_TERMS: [&str; 8] = [
    "iphone 15",
    "macbook air",
    "nintendo switch",
    "airpods pro",
    "ps5 console",
    "ipad pro",
    "samsung galaxy",
    "dyson vacuum",
];

/// Query and per-source limit for the exact-mode feasibility probe.
const PROBE_QUERY: &str = "iphone";
const PROBE_LIMIT: usize = 3;

/// Default cap on search terms per run.
const DEFAULT_MAX_SEARCH_TERMS: usize = 8;

/// Searching stops early once this many raw listings per targeted deal
/// have been collected.
const COLLECTION_FACTOR: usize = 2;

/// Terminal result of a progress-reporting discovery run.
#[derive(Debug)]
pub enum DiscoveryOutcome {
    Completed(Vec<Deal>),
    Cancelled,
    Failed(String),
}

/// DiscoveryEngine owns the pipeline from search terms to ranked deals.
pub struct DiscoveryEngine {
    gateway: Arc<SourceGateway>,
    estimator: Arc<dyn PriceEstimator>,
    max_search_terms: usize,
    seed_terms: Vec<String>,
}

impl DiscoveryEngine {
    pub fn new(gateway: Arc<SourceGateway>, estimator: Arc<dyn PriceEstimator>) -> Self {
        Self {
            gateway,
            estimator,
            max_search_terms: DEFAULT_MAX_SEARCH_TERMS,
            seed_terms: TRENDING_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Replaces the fallback seed terms.
    pub fn with_seed_terms(mut self, terms: Vec<String>) -> Self {
        if !terms.is_empty() {
            self.seed_terms = terms;
        }
        self
    }

    /// Caps how many search terms one run may fan out.
    pub fn with_max_search_terms(mut self, max: usize) -> Self {
        if max > 0 {
            self.max_search_terms = max;
        }
        self
    }

    /// Runs discovery without progress reporting or cancellation.
    pub async fn discover(&self, settings: &DiscoverySettings) -> Result<Vec<Deal>> {
        let mut tracker = ProgressTracker::new(Arc::new(NoopReporter));
        self.run(settings, &mut tracker, &CancelToken::new()).await
    }

    /// Runs discovery, pushing snapshots to `reporter` and honoring `cancel`.
    ///
    /// Always resolves to an outcome; errors are folded into
    /// `DiscoveryOutcome::Failed` after an aborted snapshot is emitted.
    pub async fn discover_with_progress(
        &self,
        settings: &DiscoverySettings,
        reporter: Arc<dyn ProgressReporter>,
        cancel: CancelToken,
    ) -> DiscoveryOutcome {
        let mut tracker = ProgressTracker::new(reporter);
        match self.run(settings, &mut tracker, &cancel).await {
            Ok(deals) => DiscoveryOutcome::Completed(deals),
            Err(DiscoveryError::Cancelled) => {
                tracker
                    .emit(DiscoveryPhase::Aborted, "Discovery cancelled", 0)
                    .await;
                DiscoveryOutcome::Cancelled
            }
            Err(e) => {
                tracker
                    .emit(DiscoveryPhase::Aborted, format!("Discovery failed: {}", e), 0)
                    .await;
                DiscoveryOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        settings: &DiscoverySettings,
        tracker: &mut ProgressTracker,
        cancel: &CancelToken,
    ) -> Result<Vec<Deal>> {
        settings
            .validate()
            .map_err(DiscoveryError::InvalidSettings)?;
        tracker
            .emit(DiscoveryPhase::Validating, "Validating request", 5)
            .await;

        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        // Exact mode promises a result count, so prove at least one source
        // answers before committing to the full fan-out.
        if settings.exact_result_count.is_some() {
            let probe = self
                .gateway
                .search(PROBE_QUERY, &settings.preferred_marketplaces, PROBE_LIMIT)
                .await;
            if probe.is_empty() {
                return Err(DiscoveryError::CannotFulfill(
                    "no marketplace sources returned results".to_string(),
                ));
            }
        }

        let terms = self.search_terms(settings);
        let target = settings.target_count();
        // Grouping and the margin threshold both shed listings, so collect
        // roughly twice the target before moving on.
        let enough = target * COLLECTION_FACTOR;

        tracker
            .emit(
                DiscoveryPhase::Searching,
                format!("Searching {} terms across marketplaces", terms.len()),
                10,
            )
            .await;

        let mut collected: Vec<Listing> = Vec::new();
        for (index, term) in terms.iter().enumerate() {
            let batch = tokio::select! {
                batch = self.gateway.search(
                    term,
                    &settings.preferred_marketplaces,
                    settings.listings_per_product,
                ) => batch,
                _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            };

            tracker.listings_analyzed += batch.len();
            if !batch.is_empty() {
                tracker.note(format!("Found {} listings for \"{}\"", batch.len(), term));
            }
            collected.extend(batch);

            let percent = 10 + ((index + 1) * 50 / terms.len()) as u8;
            tracker
                .emit(
                    DiscoveryPhase::Searching,
                    format!("Searched \"{}\"", term),
                    percent,
                )
                .await;

            if collected.len() >= enough {
                debug!(
                    collected = collected.len(),
                    "collected enough listings, stopping search early"
                );
                break;
            }
        }

        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        tracker
            .emit(DiscoveryPhase::Grouping, "Grouping comparable listings", 70)
            .await;

        // The full pool stays around as comparable data for the estimator.
        let pool = collected.clone();
        let grouped = analysis::partition(collected);

        // Ids are scoped to this run; every accepted deal/product pair draws
        // from the reserved ephemeral ranges.
        let ids = IdAllocator::new();

        tracker
            .emit(DiscoveryPhase::Scoring, "Scoring opportunities", 85)
            .await;

        let mut deals: Vec<Deal> = Vec::new();
        for (fingerprint, members) in grouped.groups {
            tracker.products_found += 1;
            match analysis::score_cross(&members, settings.min_profit_margin) {
                Ok(Some(quote)) => {
                    if self.accepts_buy_price(settings, &quote) {
                        deals.push(build_deal(&ids, quote, fingerprint, tracker));
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(fingerprint = %fingerprint, error = %e, "group scoring failed"),
            }
        }

        for single in grouped.singles {
            if cancel.is_cancelled() {
                return Err(DiscoveryError::Cancelled);
            }
            tracker.products_found += 1;

            let estimate = self.estimator.estimate_sell_price(&single, &pool).await;
            if let Some(quote) =
                analysis::score_synthetic(&single, estimate, settings.min_profit_margin)
            {
                if self.accepts_buy_price(settings, &quote) {
                    let fingerprint = normalizer::fingerprint(&single.title);
                    deals.push(build_deal(&ids, quote, fingerprint, tracker));
                }
            }
        }

        tracker
            .emit(DiscoveryPhase::Finalizing, "Ranking deals", 95)
            .await;

        let mut deals = dedup_by_product(deals);
        deals.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.potential_profit.cmp(&a.potential_profit))
        });
        deals.truncate(target);

        tracker.deals_created = deals.len();
        tracker
            .emit(
                DiscoveryPhase::Done,
                format!("Discovery complete: {} deals", deals.len()),
                100,
            )
            .await;

        info!(
            deals = deals.len(),
            listings = tracker.listings_analyzed,
            products = tracker.products_found,
            "discovery run finished"
        );
        Ok(deals)
    }

    fn search_terms(&self, settings: &DiscoverySettings) -> Vec<String> {
        let terms = if settings.search_terms.is_empty() {
            &self.seed_terms
        } else {
            &settings.search_terms
        };
        terms.iter().take(self.max_search_terms).cloned().collect()
    }

    fn accepts_buy_price(&self, settings: &DiscoverySettings, quote: &DealQuote) -> bool {
        match settings.target_buy_price {
            Some(max) => quote.buy.total_cost() <= max,
            None => true,
        }
    }
}

fn build_deal(
    ids: &IdAllocator,
    quote: DealQuote,
    fingerprint: String,
    tracker: &mut ProgressTracker,
) -> Deal {
    let product = Product {
        id: ids.next_product_id(),
        title: quote.buy.title.clone(),
        fingerprint,
        marketplace: quote.buy.marketplace,
        price: quote.buy.price,
        shipping_cost: quote.buy.shipping_cost,
        condition: quote.buy.condition.clone(),
        url: quote.buy.url.clone(),
    };

    tracker.deals_created += 1;
    tracker.note(format!(
        "Deal: {} at ${} on {} (score {})",
        product.title,
        quote.buy.total_cost().round_dp(2),
        product.marketplace,
        quote.score,
    ));

    Deal {
        id: ids.next_deal_id(),
        product,
        estimated_sell_price: quote.estimated_sell_price,
        potential_profit: quote.potential_profit,
        profit_margin: quote.profit_margin,
        score: quote.score,
        confidence: quote.confidence,
        reasoning: quote.reasoning,
        listings_analyzed: quote.listings_analyzed,
        method: quote.method,
        discovered_at: Utc::now(),
    }
}

/// Keeps the highest-scoring deal per product fingerprint. Deals whose
/// fingerprint is empty are keyed by buy-side identity instead, since an
/// empty fingerprint carries no product information.
fn dedup_by_product(deals: Vec<Deal>) -> Vec<Deal> {
    let mut best: HashMap<String, Deal> = HashMap::new();
    for deal in deals {
        let key = if deal.product.fingerprint.is_empty() {
            format!("{}:{}", deal.product.marketplace, deal.product.url)
        } else {
            deal.product.fingerprint.clone()
        };
        match best.get(&key) {
            Some(existing) if existing.score >= deal.score => {}
            _ => {
                best.insert(key, deal);
            }
        }
    }
    best.into_values().collect()
}

/// Accumulates run counters and emits monotonic progress snapshots.
struct ProgressTracker {
    reporter: Arc<dyn ProgressReporter>,
    percent: u8,
    products_found: usize,
    listings_analyzed: usize,
    deals_created: usize,
    findings: VecDeque<String>,
}

impl ProgressTracker {
    fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            percent: 0,
            products_found: 0,
            listings_analyzed: 0,
            deals_created: 0,
            findings: VecDeque::new(),
        }
    }

    fn note(&mut self, finding: String) {
        self.findings.push_back(finding);
        while self.findings.len() > MAX_RECENT_FINDINGS {
            self.findings.pop_front();
        }
    }

    async fn emit(&mut self, phase: DiscoveryPhase, action: impl Into<String>, percent: u8) {
        // Percent never goes backwards, even when a late phase reports a
        // smaller milestone than an early term loop reached.
        self.percent = self.percent.max(percent);
        self.reporter
            .report(DiscoveryProgress {
                phase,
                current_action: action.into(),
                products_found: self.products_found,
                listings_analyzed: self.listings_analyzed,
                deals_created: self.deals_created,
                percent_complete: self.percent,
                recent_findings: self.findings.iter().cloned().collect(),
            })
            .await;
    }
}
