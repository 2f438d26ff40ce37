//! Host Runtime
//!
//! Two tasks, synchronized only at startup and shutdown. The control path
//! owns the link: it connects, hands the read half to the statistics task
//! through a oneshot (the statistics task must not touch the transport
//! before it is configured), then forwards raw keystrokes as single
//! control bytes. When the control path ends it broadcasts the stop
//! signal; the receive loop observes it promptly via `select!`, one idle
//! timeout in the worst case. Errors stay local to the task that hit
//! them.

use std::net::SocketAddr;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::telemetry::receiver::{run_receive_loop, ReceiveError};
use crate::telemetry::stats::{SessionReport, StatsAggregator};

/// Failures on the host side.
#[derive(Debug, Error)]
pub enum HostError {
    /// The link or terminal failed.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The receive loop hit a fatal protocol error.
    #[error(transparent)]
    Receive(#[from] ReceiveError),

    /// The keystroke reader stopped abruptly.
    #[error("keystroke reader stopped abruptly")]
    KeyReaderStopped,

    /// The statistics task stopped abruptly.
    #[error("statistics task stopped abruptly")]
    StatisticsStopped,
}

/// Control byte for a pressed key, if the key maps to a game action.
pub fn control_byte(key: KeyCode) -> Option<u8> {
    match key {
        KeyCode::Char('a') | KeyCode::Left => Some(b'a'),
        KeyCode::Char('d') | KeyCode::Right => Some(b'd'),
        KeyCode::Char('w') | KeyCode::Up => Some(b'w'),
        KeyCode::Char('s') | KeyCode::Down => Some(b's'),
        KeyCode::Char(' ') => Some(b' '),
        _ => None,
    }
}

/// Whether a key press asks the host to quit.
pub fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Read keystrokes in raw mode until a quit key, pushing mapped control
/// bytes into the channel. Runs on a blocking thread.
fn read_keys_blocking(keys: mpsc::Sender<u8>) -> std::io::Result<()> {
    terminal::enable_raw_mode()?;
    let result = forward_keys(&keys);
    let restored = terminal::disable_raw_mode();
    result.and(restored)
}

fn forward_keys(keys: &mpsc::Sender<u8>) -> std::io::Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if is_quit(&key) {
                return Ok(());
            }
            if let Some(byte) = control_byte(key.code) {
                if keys.blocking_send(byte).is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// Forward keystrokes onto the link until the player quits.
pub async fn run_control_task<W>(mut link: W) -> Result<(), HostError>
where
    W: AsyncWrite + Unpin,
{
    let (key_tx, mut key_rx) = mpsc::channel::<u8>(8);
    let reader = tokio::task::spawn_blocking(move || read_keys_blocking(key_tx));

    while let Some(byte) = key_rx.recv().await {
        link.write_all(&[byte]).await?;
        link.flush().await?;
    }

    match reader.await {
        Ok(result) => result.map_err(HostError::from),
        Err(_) => Err(HostError::KeyReaderStopped),
    }
}

/// Receive telemetry and report statistics until the stop signal.
///
/// Waits for the control task to hand over the configured transport
/// before reading a single byte from it.
pub async fn run_statistics_task<R>(
    link: oneshot::Receiver<R>,
    shutdown: broadcast::Receiver<()>,
    json: bool,
) -> Result<(), HostError>
where
    R: AsyncRead + Unpin,
{
    let Ok(link) = link.await else {
        debug!("transport was never handed over; nothing to receive");
        return Ok(());
    };

    let mut stats = StatsAggregator::new();
    if let Err(failure) = run_receive_loop(link, &mut stats, shutdown, |report| {
        print_report(report, json)
    })
    .await
    {
        error!(%failure, "telemetry stream is unrecoverable; reset the device and restart");
        return Err(failure.into());
    }

    Ok(())
}

/// Write one finalized report to stdout, as a plain-text block or as one
/// JSON line.
pub fn print_report(report: &SessionReport, json: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(failure) => warn!(%failure, "cannot render the report as JSON"),
        }
    } else {
        println!("{report}");
    }
}

/// Run the host: connect, play, report, until the player quits.
pub async fn run(device: SocketAddr, json: bool) -> Result<(), HostError> {
    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, _) = broadcast::channel(1);

    let statistics = tokio::spawn(run_statistics_task(
        ready_rx,
        shutdown_tx.subscribe(),
        json,
    ));

    let stream = TcpStream::connect(device).await?;
    info!(%device, "connected to device");

    let (read_half, write_half) = stream.into_split();
    if ready_tx.send(read_half).is_err() {
        return Err(HostError::StatisticsStopped);
    }

    info!("controls: w/a/s/d or arrows move, space fires, q quits");
    let control_result = run_control_task(write_half).await;

    // Stop flag for the statistics task
    let _ = shutdown_tx.send(());
    let statistics_result = match statistics.await {
        Ok(result) => result,
        Err(_) => Err(HostError::StatisticsStopped),
    };

    control_result.and(statistics_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::TelemetryEvent;
    use crate::telemetry::wire;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_control_bytes_match_device_bindings() {
        use crate::game::input::InputEvent;

        let keys = [
            (KeyCode::Char('a'), InputEvent::MoveLeft),
            (KeyCode::Left, InputEvent::MoveLeft),
            (KeyCode::Char('d'), InputEvent::MoveRight),
            (KeyCode::Right, InputEvent::MoveRight),
            (KeyCode::Char('w'), InputEvent::MoveUp),
            (KeyCode::Up, InputEvent::MoveUp),
            (KeyCode::Char('s'), InputEvent::MoveDown),
            (KeyCode::Down, InputEvent::MoveDown),
            (KeyCode::Char(' '), InputEvent::Fire),
        ];

        for (key, expected) in keys {
            let byte = control_byte(key).unwrap();
            assert_eq!(InputEvent::from_control_byte(byte), Some(expected));
        }
    }

    #[test]
    fn test_unmapped_keys_send_nothing() {
        assert_eq!(control_byte(KeyCode::Char('x')), None);
        assert_eq!(control_byte(KeyCode::Enter), None);
        assert_eq!(control_byte(KeyCode::Tab), None);
    }

    #[test]
    fn test_quit_keys() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(is_quit(&press(KeyCode::Char('q'))));
        assert!(is_quit(&press(KeyCode::Esc)));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&press(KeyCode::Char('c'))));
        assert!(!is_quit(&press(KeyCode::Char('w'))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_statistics_task_waits_for_handoff_then_reports() {
        let (mut tx, rx) = tokio::io::duplex(256);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(run_statistics_task(ready_rx, shutdown_rx, false));

        // Transport handed over only after it is set up
        ready_tx.send(rx).map_err(|_| ()).unwrap();

        for event in [
            TelemetryEvent::session_started(0, 10, 2),
            TelemetryEvent::cell_hit(160, 13),
            TelemetryEvent::session_finished(400, 1),
        ] {
            tx.write_all(&wire::encode(&event)).await.unwrap();
        }

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_statistics_task_tolerates_dropped_handoff() {
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (ready_tx, ready_rx) = oneshot::channel::<tokio::io::DuplexStream>();

        drop(ready_tx);
        run_statistics_task(ready_rx, shutdown_rx, false)
            .await
            .unwrap();
    }
}
