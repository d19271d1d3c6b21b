//! Domain models for deal discovery.

mod deal;
mod listing;
mod progress;
mod settings;

pub use deal::{Deal, DiscoveryMethod, Product};
pub use listing::{Listing, Marketplace};
pub use progress::{DiscoveryPhase, DiscoveryProgress, MAX_RECENT_FINDINGS};
pub use settings::DiscoverySettings;
