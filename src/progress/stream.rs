//! Newline-delimited JSON framing for progress streams.
//!
//! Each frame is one JSON object on one line with a `type` tag, so a
//! consumer can parse frames without buffering the whole stream.

use crate::discovery::DiscoveryOutcome;
use crate::domain::{Deal, DiscoveryProgress};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// One frame on a discovery progress stream.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Intermediate progress snapshot.
    Progress(DiscoveryProgress),
    /// Terminal frame: the run finished with these deals.
    Complete { deals: Vec<Deal> },
    /// Terminal frame: the run was cancelled.
    Cancelled,
    /// Terminal frame: the run failed.
    Error { message: String },
}

impl StreamMessage {
    /// Converts a discovery outcome into its terminal frame.
    pub fn from_outcome(outcome: DiscoveryOutcome) -> Self {
        match outcome {
            DiscoveryOutcome::Completed(deals) => StreamMessage::Complete { deals },
            DiscoveryOutcome::Cancelled => StreamMessage::Cancelled,
            DiscoveryOutcome::Failed(message) => StreamMessage::Error { message },
        }
    }

    /// Terminal frames end the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamMessage::Progress(_))
    }
}

/// Serializes one frame as a single JSON line.
pub fn encode_frame(message: &StreamMessage) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

/// Drains frames from `rx` into `writer`, flushing after each one, until a
/// terminal frame is written or the sender side closes.
pub async fn pump_frames<W: AsyncWrite + Unpin>(
    writer: &mut W,
    rx: &mut mpsc::UnboundedReceiver<StreamMessage>,
) -> std::io::Result<()> {
    while let Some(message) = rx.recv().await {
        let frame = encode_frame(&message).map_err(std::io::Error::other)?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        if message.is_terminal() {
            break;
        }
    }
    Ok(())
}
