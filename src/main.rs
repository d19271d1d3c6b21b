mod analysis;
mod config;
mod discovery;
mod domain;
mod progress;
mod sources;
mod storage;

use analysis::ComparableSalesEstimator;
use config::Config;
use discovery::{CancelToken, DiscoveryEngine, DiscoveryOutcome};
use domain::{Deal, DiscoverySettings};
use progress::{pump_frames, ChannelReporter, ProgressReporter, StreamMessage};
use rust_decimal::Decimal;
use sources::{GatewayLimits, Registry, SourceGateway};
use std::env;
use storage::DealStore;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn parse_exact_count() -> Option<usize> {
    for arg in env::args().skip(1) {
        if let Some(count) = arg.strip_prefix("--count=") {
            return count.parse().ok();
        }
    }
    None
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Builds run settings from config defaults plus command-line overrides.
fn build_settings(config: &Config) -> DiscoverySettings {
    let mut settings = DiscoverySettings {
        exact_result_count: parse_exact_count(),
        search_terms: config.search_terms.clone(),
        ..Default::default()
    };

    if let Some(ref discovery) = config.discovery {
        if let Some(ref margin) = discovery.min_profit_margin {
            match Decimal::from_str(margin) {
                Ok(margin) => settings.min_profit_margin = margin,
                Err(e) => warn!(error = %e, "Invalid min_profit_margin in config, using default"),
            }
        }
        if let Some(listings) = discovery.listings_per_product {
            settings.listings_per_product = listings;
        }
    }

    settings
}

async fn build_engine(config: &Config) -> Result<DiscoveryEngine, sources::SourceError> {
    let registry = Registry::from_config(config).await?;
    let gateway = Arc::new(SourceGateway::new(
        registry.all().await,
        GatewayLimits::from_config(config.gateway.as_ref()),
    ));

    let mut engine = DiscoveryEngine::new(gateway, Arc::new(ComparableSalesEstimator::new()));
    if let Some(ref discovery) = config.discovery {
        if let Some(ref seeds) = discovery.seed_terms {
            engine = engine.with_seed_terms(seeds.clone());
        }
        if let Some(max) = discovery.max_search_terms {
            engine = engine.with_max_search_terms(max);
        }
    }
    Ok(engine)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config_path = parse_config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return;
        }
    };

    let streaming = env::args().any(|arg| arg == "--stream");

    // Streaming mode owns stdout for frames, so logs must not share it.
    if !streaming {
        init_tracing(config.app.log_level.as_deref());
    }

    let engine = match build_engine(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to build discovery engine: {}", e);
            return;
        }
    };

    let settings = build_settings(&config);

    if streaming {
        run_streaming(&engine, &settings).await;
    } else {
        run_batch(&config, &engine, &settings).await;
    }
}

/// Runs discovery once and logs the accepted deals, materializing them when
/// storage is enabled.
async fn run_batch(config: &Config, engine: &DiscoveryEngine, settings: &DiscoverySettings) {
    info!(
        target = settings.target_count(),
        min_margin = %settings.min_profit_margin,
        "Starting discovery run"
    );

    let deals = match engine.discover(settings).await {
        Ok(deals) => deals,
        Err(e) => {
            error!(error = %e, "Discovery failed");
            return;
        }
    };

    for deal in &deals {
        info!(
            title = %deal.product.title,
            marketplace = %deal.product.marketplace,
            buy = %deal.product.price,
            sell = %deal.estimated_sell_price,
            profit = %deal.potential_profit,
            score = deal.score,
            method = %deal.method,
            "Deal found"
        );
    }
    info!(deals = deals.len(), "Discovery run complete");

    if let Some(ref storage_config) = config.storage {
        if storage_config.enabled {
            materialize_deals(storage_config, &deals).await;
        }
    }
}

async fn materialize_deals(config: &config::StorageConfig, deals: &[Deal]) {
    let store_config = storage::SqliteStoreConfig {
        path: config
            .path
            .clone()
            .unwrap_or_else(|| storage::SqliteStoreConfig::default().path),
        ..Default::default()
    };

    let store = match storage::SqliteDealStore::new(store_config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to open deal store");
            return;
        }
    };

    if let Err(e) = storage::materialize(&store, deals).await {
        error!(error = %e, "Failed to materialize deals");
    }
    if let Err(e) = store.close().await {
        error!(error = %e, "Failed to close deal store");
    }
}

/// Runs discovery with newline-delimited JSON frames on stdout. Ctrl+C
/// cancels the run; the stream still ends with a terminal frame.
async fn run_streaming(engine: &DiscoveryEngine, settings: &DiscoverySettings) {
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<StreamMessage>();

    let pump = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        if let Err(e) = pump_frames(&mut stdout, &mut frame_rx).await {
            eprintln!("Failed to write stream frame: {}", e);
        }
    });

    let (reporter, mut progress_rx) = ChannelReporter::new();
    let forwarder = {
        let frame_tx = frame_tx.clone();
        tokio::spawn(async move {
            while let Some(progress) = progress_rx.recv().await {
                if frame_tx.send(StreamMessage::Progress(progress)).is_err() {
                    break;
                }
            }
        })
    };

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let reporter: Arc<dyn ProgressReporter> = Arc::new(reporter);
    let outcome: DiscoveryOutcome = engine
        .discover_with_progress(settings, Arc::clone(&reporter), cancel)
        .await;
    // Drain the remaining progress frames before the terminal frame so the
    // stream stays ordered.
    drop(reporter);
    let _ = forwarder.await;

    let _ = frame_tx.send(StreamMessage::from_outcome(outcome));
    drop(frame_tx);
    let _ = pump.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{DiscoveryMethod, Marketplace, Product};
    use tempfile::TempDir;

    fn sample_deal() -> Deal {
        Deal {
            id: 1_000_000,
            product: Product {
                id: 2_000_000,
                title: "iPhone 15 Pro".to_string(),
                fingerprint: "iphone 15 pro".to_string(),
                marketplace: Marketplace::Craigslist,
                price: Decimal::from(100),
                shipping_cost: Decimal::from(5),
                condition: "Used".to_string(),
                url: "https://example.com/c1".to_string(),
            },
            estimated_sell_price: Decimal::from(180),
            potential_profit: Decimal::from(75),
            profit_margin: Decimal::new(7143, 2),
            score: 100,
            confidence: 65,
            reasoning: "cheaper on craigslist than ebay".to_string(),
            listings_analyzed: 2,
            method: DiscoveryMethod::CrossMarketplace,
            discovered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_materialize_deals_writes_and_closes_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deals.db").to_string_lossy().to_string();
        let config = config::StorageConfig {
            enabled: true,
            path: Some(path.clone()),
        };

        materialize_deals(&config, &[sample_deal()]).await;

        // Reopen the database to confirm the run was written and the store
        // was cleanly closed.
        let store = storage::SqliteDealStore::new(storage::SqliteStoreConfig {
            path,
            max_connections: 1,
        })
        .await
        .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        store.close().await.unwrap();
    }
}
