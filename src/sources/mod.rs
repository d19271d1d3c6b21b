//! Marketplace source abstractions and implementations.

pub mod ebay;
mod gateway;
mod registry;

use crate::domain::{Listing, Marketplace};
use async_trait::async_trait;
use thiserror::Error;

pub use gateway::{GatewayLimits, SourceGateway};
pub use registry::Registry;

/// Source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Local rate-limit window exhausted.
    #[error("rate limit exceeded: {current}/{limit} per minute")]
    RateLimitExceeded { current: i64, limit: i64 },

    /// Transport-level failure.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Response decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the marketplace API.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// MarketplaceSource is one marketplace's search capability.
///
/// Implementations carry their own request timeout and rate limiting. The
/// gateway treats any error from `search` as an empty result; errors exist so
/// implementations can report the cause for logging.
#[async_trait]
pub trait MarketplaceSource: Send + Sync {
    /// Search returns up to `limit` listings matching the query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Listing>>;

    /// Marketplace this source serves.
    fn marketplace(&self) -> Marketplace;
}
