//! Discovery error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid discovery settings: {0}")]
    InvalidSettings(String),

    #[error("cannot fulfill request: {0}")]
    CannotFulfill(String),

    #[error("discovery cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
