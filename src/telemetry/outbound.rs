//! Outbound Telemetry Queue
//!
//! Gameplay pushes every emitted event into a bounded queue with blocking
//! enqueue semantics: when the queue is full, the gameplay tick stalls
//! until the drain task frees a slot. Telemetry is never dropped, the
//! game slows down instead. The drain task sits on the
//! other end, wire-encodes each event and writes it to the link; it makes
//! no gameplay decisions of its own.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::game::events::TelemetryEvent;
use crate::telemetry::wire;

/// Capacity of the outbound queue, in messages.
pub const QUEUE_DEPTH: usize = 10;

/// Create the outbound queue.
pub fn channel() -> (mpsc::Sender<TelemetryEvent>, mpsc::Receiver<TelemetryEvent>) {
    mpsc::channel(QUEUE_DEPTH)
}

/// Drain the outbound queue onto the link until the queue closes or a
/// write fails.
pub async fn run_drain<W>(
    mut queue: mpsc::Receiver<TelemetryEvent>,
    mut link: W,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = queue.recv().await {
        let frame = wire::encode(&event);
        link.write_all(&frame).await?;
        link.flush().await?;
        debug!(kind = event.kind(), bytes = frame.len(), "telemetry frame sent");
    }
    Ok(())
}
