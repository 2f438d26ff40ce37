//! Telemetry Receive Loop
//!
//! The stream has no delimiters, so framing is pure timeout policy: wait
//! up to one second of silence for a tag byte (silence is normal between
//! messages), then read the tag's fixed payload under a strict 1 ms
//! per-byte deadline. A payload byte arriving late means the stream has
//! desynchronized: the partial message is discarded and the loop
//! terminates with a protocol error, since there is no way to find the
//! next message boundary again. The loop also watches a shutdown signal and
//! exits cleanly when it fires.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::game::events::TelemetryEvent;
use crate::telemetry::stats::{SessionReport, StatsAggregator};
use crate::telemetry::wire::{self, WireError, MAX_PAYLOAD_LEN};

/// How long to wait for the tag byte of the next message. Running out is
/// not an error, the link is just quiet.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// How long to wait for each payload byte once a message has started.
/// Running out is fatal for the stream.
pub const BYTE_TIMEOUT: Duration = Duration::from_millis(1);

/// Failures that terminate the receive loop.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The stream carried a malformed message.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A mid-message byte missed its deadline; the stream is
    /// desynchronized beyond recovery.
    #[error("timed out waiting for payload byte {index} of message 0x{tag:02x}")]
    ByteTimeout {
        /// Tag of the message that was being read.
        tag: u8,
        /// Zero-based index of the payload byte that never arrived.
        index: usize,
    },

    /// The underlying link failed or closed.
    #[error("telemetry link failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the receive loop until shutdown fires or an error ends the stream.
///
/// Decoded events are folded into `stats`; every finalized session report
/// goes to `report_sink`. All errors are terminal: the caller surfaces the
/// diagnostic and the process has to be restarted to recover the stream.
pub async fn run_receive_loop<R>(
    mut link: R,
    stats: &mut StatsAggregator,
    mut shutdown: broadcast::Receiver<()>,
    mut report_sink: impl FnMut(&SessionReport),
) -> Result<(), ReceiveError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let tag = tokio::select! {
            _ = shutdown.recv() => {
                debug!("receive loop stopping");
                return Ok(());
            }
            read = read_byte(&mut link, IDLE_TIMEOUT) => match read? {
                Some(tag) => tag,
                // Total silence between messages is not an error
                None => continue,
            },
        };

        let len = wire::payload_len(tag).ok_or(WireError::UnknownTag(tag))?;
        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        for (index, slot) in payload[..len].iter_mut().enumerate() {
            *slot = read_byte(&mut link, BYTE_TIMEOUT)
                .await?
                .ok_or(ReceiveError::ByteTimeout { tag, index })?;
        }

        let event = wire::decode(tag, &payload[..len])?;
        log_event(&event);

        if let Some(report) = stats.observe(&event) {
            report_sink(&report);
        }
    }
}

/// Read one byte with a deadline. `None` means the deadline passed; zero
/// bytes read means the link closed, which is an I/O failure here.
async fn read_byte<R>(link: &mut R, limit: Duration) -> Result<Option<u8>, std::io::Error>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    match timeout(limit, link.read(&mut buf)).await {
        Err(_) => Ok(None),
        Ok(Ok(0)) => Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "telemetry link closed",
        )),
        Ok(Ok(_)) => Ok(Some(buf[0])),
        Ok(Err(error)) => Err(error),
    }
}

fn log_event(event: &TelemetryEvent) {
    match *event {
        TelemetryEvent::SessionStarted {
            start_tick,
            tick_period_ms,
            map_index,
        } => info!(map_index, start_tick, tick_period_ms, "session started"),
        TelemetryEvent::SessionFinished {
            stop_tick,
            shots_total,
        } => info!(stop_tick, shots_total, "session finished"),
        TelemetryEvent::CellSelected { tick, cell } => debug!(tick, cell, "cell selected"),
        TelemetryEvent::CellFired { tick, cell } => info!(tick, cell, "cell fired"),
        TelemetryEvent::CellHit { tick, cell } => info!(tick, cell, "cell hit"),
        TelemetryEvent::CellMissed { tick, cell } => info!(tick, cell, "cell missed"),
    }
}
