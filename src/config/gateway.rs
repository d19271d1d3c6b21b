//! Source gateway configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Fan-out limits for the source gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Maximum simultaneous in-flight source calls (default: 2).
    pub max_concurrent_calls: Option<usize>,
    /// Deadline for each individual source call (default: 2s).
    #[serde(default, with = "duration")]
    pub per_source_timeout: Duration,
    /// Deadline for one whole fan-out (default: 3s).
    #[serde(default, with = "duration")]
    pub overall_timeout: Duration,
}
