//! Storage configuration.

use serde::Deserialize;

/// Deal materialization settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Whether accepted deals are written to storage after a run.
    #[serde(default)]
    pub enabled: bool,
    /// Path to the SQLite database file.
    pub path: Option<String>,
}
