//! SQLite implementation of DealStore.

use crate::domain::{Deal, DiscoveryMethod, Marketplace, Product};
use crate::storage::{DealStore, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

/// SqliteDealStore implements DealStore using SQLite.
pub struct SqliteDealStore {
    pool: Pool<Sqlite>,
}

/// SqliteStoreConfig holds SQLite store configuration.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            path: "deals.db".to_string(),
            max_connections: 5,
        }
    }
}

impl SqliteDealStore {
    /// Creates a new SQLite deal store.
    pub async fn new(config: SqliteStoreConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };

        store.migrate().await?;

        info!(path = %config.path, "SQLite deal store initialized");
        Ok(store)
    }

    /// Runs database migrations to create the schema.
    ///
    /// Storage issues its own row ids; they stay well below the ephemeral
    /// id ranges used during discovery runs.
    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS deals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                unique_hash TEXT NOT NULL UNIQUE,
                fingerprint TEXT NOT NULL,
                title TEXT NOT NULL,
                marketplace TEXT NOT NULL,
                buy_price TEXT NOT NULL,
                shipping_cost TEXT NOT NULL,
                condition TEXT NOT NULL,
                url TEXT NOT NULL,
                estimated_sell_price TEXT NOT NULL,
                potential_profit TEXT NOT NULL,
                profit_margin TEXT NOT NULL,
                score INTEGER NOT NULL,
                confidence INTEGER NOT NULL,
                reasoning TEXT NOT NULL,
                listings_analyzed INTEGER NOT NULL,
                method TEXT NOT NULL,
                discovered_at TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_deals_fingerprint ON deals(fingerprint)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_deals_score ON deals(score)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_deals_discovered_at ON deals(discovered_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Generates a unique hash for detecting duplicate deals.
///
/// A deal is unique based on: product fingerprint, buy marketplace, profit
/// margin (rounded to 2 decimals), and the calendar day it was discovered.
/// Re-running discovery on the same day does not duplicate its deals.
fn generate_unique_hash(deal: &Deal) -> String {
    let margin_rounded = deal.profit_margin.round_dp(2).to_string();
    let day = deal.discovered_at.format("%Y-%m-%d").to_string();

    let data = format!(
        "{}|{}|{}|{}",
        deal.product.fingerprint, deal.product.marketplace, margin_rounded, day
    );

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let hash = hasher.finalize();

    // Use first 16 bytes for shorter hash
    hex::encode(&hash[..16])
}

#[async_trait]
impl DealStore for SqliteDealStore {
    async fn save(&self, deal: &Deal) -> Result<bool, StorageError> {
        let unique_hash = generate_unique_hash(deal);

        let result = sqlx::query(
            r#"
            INSERT INTO deals (
                unique_hash, fingerprint, title, marketplace, buy_price,
                shipping_cost, condition, url, estimated_sell_price,
                potential_profit, profit_margin, score, confidence,
                reasoning, listings_analyzed, method, discovered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(unique_hash) DO NOTHING
            "#,
        )
        .bind(&unique_hash)
        .bind(&deal.product.fingerprint)
        .bind(&deal.product.title)
        .bind(deal.product.marketplace.to_string())
        .bind(deal.product.price.to_string())
        .bind(deal.product.shipping_cost.to_string())
        .bind(&deal.product.condition)
        .bind(&deal.product.url)
        .bind(deal.estimated_sell_price.to_string())
        .bind(deal.potential_profit.to_string())
        .bind(deal.profit_margin.to_string())
        .bind(deal.score as i64)
        .bind(deal.confidence as i64)
        .bind(&deal.reasoning)
        .bind(deal.listings_analyzed as i64)
        .bind(deal.method.to_string())
        .bind(deal.discovered_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let rows_affected = result.rows_affected();

        if rows_affected > 0 {
            debug!(
                fingerprint = %deal.product.fingerprint,
                marketplace = %deal.product.marketplace,
                hash = %unique_hash,
                "Deal saved"
            );
        }

        Ok(rows_affected > 0)
    }

    async fn get_all(&self) -> Result<Vec<Deal>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, fingerprint, title, marketplace, buy_price, shipping_cost,
                condition, url, estimated_sell_price, potential_profit,
                profit_margin, score, confidence, reasoning, listings_analyzed,
                method, discovered_at
            FROM deals ORDER BY score DESC, potential_profit DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_deal_row).collect()
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM deals")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Parses a deal from a database row.
fn parse_deal_row(row: &sqlx::sqlite::SqliteRow) -> Result<Deal, StorageError> {
    let id: i64 = row.try_get("id")?;

    let marketplace_str: String = row.try_get("marketplace")?;
    let marketplace = Marketplace::from_str(&marketplace_str)
        .map_err(StorageError::InvalidData)?;

    let method_str: String = row.try_get("method")?;
    let method = DiscoveryMethod::from_str(&method_str).map_err(StorageError::InvalidData)?;

    let price = parse_decimal(row, "buy_price")?;
    let shipping_cost = parse_decimal(row, "shipping_cost")?;
    let estimated_sell_price = parse_decimal(row, "estimated_sell_price")?;
    let potential_profit = parse_decimal(row, "potential_profit")?;
    let profit_margin = parse_decimal(row, "profit_margin")?;

    let discovered_at_str: String = row.try_get("discovered_at")?;
    let discovered_at = DateTime::parse_from_rfc3339(&discovered_at_str)
        .map_err(|e| StorageError::InvalidData(format!("Invalid discovered_at: {}", e)))?
        .with_timezone(&Utc);

    let score: i64 = row.try_get("score")?;
    let confidence: i64 = row.try_get("confidence")?;
    let listings_analyzed: i64 = row.try_get("listings_analyzed")?;

    Ok(Deal {
        id,
        product: Product {
            id,
            title: row.try_get("title")?,
            fingerprint: row.try_get("fingerprint")?,
            marketplace,
            price,
            shipping_cost,
            condition: row.try_get("condition")?,
            url: row.try_get("url")?,
        },
        estimated_sell_price,
        potential_profit,
        profit_margin,
        score: score as u8,
        confidence: confidence as u8,
        reasoning: row.try_get("reasoning")?,
        listings_analyzed: listings_analyzed as usize,
        method,
        discovered_at,
    })
}

fn parse_decimal(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, StorageError> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value)
        .map_err(|e| StorageError::InvalidData(format!("Invalid {}: {}", column, e)))
}
