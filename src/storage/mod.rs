//! Deal materialization.
//!
//! Discovery runs are in-memory by default; when storage is enabled,
//! accepted deals are written through a `DealStore` after the run so they
//! survive the process. Persisted rows get storage-issued ids, distinct
//! from the ephemeral ids deals carry during a run.

mod sqlite;

pub use sqlite::{SqliteDealStore, SqliteStoreConfig};

use crate::domain::Deal;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// DealStore persists accepted deals.
#[async_trait]
pub trait DealStore: Send + Sync {
    /// Saves one deal. Returns false when an equivalent deal was already
    /// stored and the write was suppressed.
    async fn save(&self, deal: &Deal) -> Result<bool>;

    /// Returns all stored deals, best score first.
    async fn get_all(&self) -> Result<Vec<Deal>>;

    /// Number of stored deals.
    async fn count(&self) -> Result<i64>;

    /// Flushes and closes the underlying store.
    async fn close(&self) -> Result<()>;
}

/// Writes a run's deals through the store, returning how many were new.
pub async fn materialize(store: &dyn DealStore, deals: &[Deal]) -> Result<usize> {
    let mut inserted = 0;
    for deal in deals {
        if store.save(deal).await? {
            inserted += 1;
        }
    }
    info!(
        inserted,
        skipped = deals.len() - inserted,
        "materialized discovery run"
    );
    Ok(inserted)
}
