//! Discovery progress snapshots.

use serde::{Deserialize, Serialize};

/// Maximum number of trailing findings carried in a progress snapshot.
pub const MAX_RECENT_FINDINGS: usize = 10;

/// DiscoveryPhase names a state of the discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPhase {
    Validating,
    Searching,
    Grouping,
    Scoring,
    Finalizing,
    Done,
    Aborted,
}

impl std::fmt::Display for DiscoveryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiscoveryPhase::Validating => "validating",
            DiscoveryPhase::Searching => "searching",
            DiscoveryPhase::Grouping => "grouping",
            DiscoveryPhase::Scoring => "scoring",
            DiscoveryPhase::Finalizing => "finalizing",
            DiscoveryPhase::Done => "done",
            DiscoveryPhase::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// One snapshot of a running discovery, pushed to the progress sink after
/// every state transition and after each search term is merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryProgress {
    /// Current state of the run.
    pub phase: DiscoveryPhase,
    /// Human-readable description of the current action.
    pub current_action: String,
    /// Distinct products found so far.
    pub products_found: usize,
    /// Listings fetched and examined so far.
    pub listings_analyzed: usize,
    /// Deals accepted so far.
    pub deals_created: usize,
    /// Percent complete, 0-100, monotonically non-decreasing within a run.
    pub percent_complete: u8,
    /// Bounded trailing list of recent human-readable findings.
    pub recent_findings: Vec<String>,
}

impl DiscoveryProgress {
    /// Creates a snapshot for the given phase with zeroed counters.
    pub fn new(phase: DiscoveryPhase, current_action: impl Into<String>) -> Self {
        Self {
            phase,
            current_action: current_action.into(),
            products_found: 0,
            listings_analyzed: 0,
            deals_created: 0,
            percent_complete: 0,
            recent_findings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(DiscoveryPhase::Validating.to_string(), "validating");
        assert_eq!(DiscoveryPhase::Done.to_string(), "done");
    }

    #[test]
    fn test_progress_serializes_phase_snake_case() {
        let progress = DiscoveryProgress::new(DiscoveryPhase::Searching, "Searching marketplaces");
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["phase"], "searching");
        assert_eq!(json["percent_complete"], 0);
    }
}
