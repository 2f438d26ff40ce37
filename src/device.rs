//! Device Runtime
//!
//! Three tasks per link, mirroring the roles on the original hardware: an
//! input listener (the interrupt producer) writes decoded control bytes
//! into the single-slot input queue; the gameplay task drains the slot
//! once per 10 ms tick and awaits every emitted event into the bounded
//! telemetry queue (stalling the tick when the queue is full); the drain
//! task moves queued events onto the link as wire frames. The gameplay
//! task is the only writer of the session; the queues are the only shared
//! state.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::rng::DeterministicRng;
use crate::game::events::TelemetryEvent;
use crate::game::input::{InputEvent, InputSlot};
use crate::game::state::GameSession;
use crate::game::tick::tick;
use crate::telemetry::outbound;
use crate::TICK_PERIOD_MS;

/// Failures that tear down one link.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The link failed or closed.
    #[error("link I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The telemetry queue lost its consumer.
    #[error("telemetry drain task is gone")]
    TelemetryClosed,
}

/// Seed for a new session's RNG, taken from the wall clock the way the
/// original seeded `srand` at startup.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(1)
}

/// Read control bytes off the link and post them into the input slot.
///
/// This is the asynchronous producer: it always overwrites, never waits
/// for the consumer, and an unmapped byte overwrites the slot with
/// nothing at all.
pub async fn run_input_listener<R>(mut link: R, slot: Arc<InputSlot>) -> Result<(), DeviceError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    loop {
        let read = link.read(&mut buf).await?;
        if read == 0 {
            debug!("control link closed");
            return Ok(());
        }
        match InputEvent::from_control_byte(buf[0]) {
            Some(event) => slot.post(event),
            None => slot.clear(),
        }
    }
}

/// Run the gameplay loop: one state-machine tick per period, forever.
///
/// Each tick drains at most one input event from the slot (non-blocking)
/// and awaits every emitted telemetry event into the outbound queue. A
/// full queue therefore suspends the tick until the drain task catches
/// up, trading tick timing for telemetry fidelity.
pub async fn run_gameplay(
    mut session: GameSession,
    mut rng: DeterministicRng,
    slot: Arc<InputSlot>,
    telemetry: mpsc::Sender<TelemetryEvent>,
) -> Result<(), DeviceError> {
    let mut ticker = interval(Duration::from_millis(TICK_PERIOD_MS as u64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let result = tick(&mut session, slot.take(), &mut rng);
        for event in result.events {
            telemetry
                .send(event)
                .await
                .map_err(|_| DeviceError::TelemetryClosed)?;
        }
        if result.session_over {
            info!(shots_total = session.shots_total, "session finished, restarting");
        }
    }
}

/// Serve gameplay over one established link until any task ends.
pub async fn run_link(stream: TcpStream) -> Result<(), DeviceError> {
    let peer = stream.peer_addr()?;
    info!(%peer, "link established");

    let (read_half, write_half) = stream.into_split();
    let slot = Arc::new(InputSlot::new());
    let (telemetry_tx, telemetry_rx) = outbound::channel();

    let session = GameSession::new();
    let rng = DeterministicRng::new(clock_seed());

    let result = tokio::select! {
        listener = run_input_listener(read_half, slot.clone()) => listener,
        gameplay = run_gameplay(session, rng, slot.clone(), telemetry_tx) => gameplay,
        drain = outbound::run_drain(telemetry_rx, write_half) => drain.map_err(DeviceError::from),
    };

    info!(%peer, "link closed");
    result
}

/// Accept links one at a time and serve each until it drops.
pub async fn serve(listener: TcpListener) -> Result<(), DeviceError> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "incoming connection");
        if let Err(error) = run_link(stream).await {
            warn!(%error, "link ended with an error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_input_listener_posts_latest_event() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let slot = Arc::new(InputSlot::new());

        tx.write_all(b"aw ").await.unwrap();
        drop(tx);
        run_input_listener(rx, slot.clone()).await.unwrap();

        // Three bytes arrived before any tick consumed the slot: only the
        // newest survives
        assert_eq!(slot.take(), Some(InputEvent::Fire));
        assert_eq!(slot.take(), None);
    }

    #[tokio::test]
    async fn test_input_listener_unknown_byte_clears_slot() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let slot = Arc::new(InputSlot::new());

        tx.write_all(b"dx").await.unwrap();
        drop(tx);
        run_input_listener(rx, slot.clone()).await.unwrap();

        assert_eq!(slot.take(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gameplay_streams_session_events() {
        let slot = Arc::new(InputSlot::new());
        let (telemetry_tx, mut telemetry_rx) = outbound::channel();

        let session = GameSession::new();
        let rng = DeterministicRng::new(7);
        let gameplay = tokio::spawn(run_gameplay(session, rng, slot.clone(), telemetry_tx));

        // The first tick announces the session
        let started = telemetry_rx.recv().await.unwrap();
        assert!(matches!(started, TelemetryEvent::SessionStarted { .. }));

        // A posted movement is consumed by a later tick and reported
        slot.post(InputEvent::MoveRight);
        match telemetry_rx.recv().await.unwrap() {
            TelemetryEvent::CellSelected { cell, .. } => assert_eq!(cell, 13),
            other => panic!("expected a selection event, got {other:?}"),
        }

        gameplay.abort();
    }
}
