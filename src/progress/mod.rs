//! Progress reporting sinks for discovery runs.

mod stream;

pub use stream::{pump_frames, StreamMessage};

use crate::domain::DiscoveryProgress;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// ProgressReporter receives one snapshot per discovery state transition
/// and per merged search term. Reporting is fire-and-forget; a slow or
/// closed sink must never stall the run.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, progress: DiscoveryProgress);
}

/// Forwards snapshots into an unbounded channel, typically drained by a
/// frame pump. Dropped receivers are tolerated silently.
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<DiscoveryProgress>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DiscoveryProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ProgressReporter for ChannelReporter {
    async fn report(&self, progress: DiscoveryProgress) {
        if self.tx.send(progress).is_err() {
            debug!("progress receiver dropped, discarding snapshot");
        }
    }
}

/// Discards every snapshot. Used by batch runs that only want the result.
pub struct NoopReporter;

#[async_trait]
impl ProgressReporter for NoopReporter {
    async fn report(&self, _progress: DiscoveryProgress) {}
}
