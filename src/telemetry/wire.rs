//! Telemetry Wire Codec
//!
//! One frame per event: `[tag:1][payload: fixed per tag]`. Multi-byte
//! integers travel little-endian, least significant byte first. There is
//! deliberately no length field and no checksum: the payload size is a
//! function of the tag alone, and the receiver frames the stream purely by
//! timeout. A single dropped or corrupted byte therefore desynchronizes
//! the stream for good; the receiver's job is to detect that and stop, not
//! to recover.

use thiserror::Error;

use crate::game::events::TelemetryEvent;

/// Tag byte for [`TelemetryEvent::SessionStarted`].
pub const TAG_SESSION_STARTED: u8 = 0;
/// Tag byte for [`TelemetryEvent::SessionFinished`].
pub const TAG_SESSION_FINISHED: u8 = 1;
/// Tag byte for [`TelemetryEvent::CellSelected`].
pub const TAG_CELL_SELECTED: u8 = 2;
/// Tag byte for [`TelemetryEvent::CellFired`].
pub const TAG_CELL_FIRED: u8 = 3;
/// Tag byte for [`TelemetryEvent::CellHit`].
pub const TAG_CELL_HIT: u8 = 4;
/// Tag byte for [`TelemetryEvent::CellMissed`].
pub const TAG_CELL_MISSED: u8 = 5;

/// Largest payload any tag carries (session-started: u32 + u8 + u8).
pub const MAX_PAYLOAD_LEN: usize = 6;

/// Codec failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The tag byte does not name any message type.
    #[error("unknown message tag 0x{0:02x}")]
    UnknownTag(u8),

    /// The payload slice does not match the tag's fixed size.
    #[error("tag 0x{tag:02x} expects a {expected}-byte payload, got {actual}")]
    PayloadLength {
        /// The tag whose payload was malformed.
        tag: u8,
        /// Fixed payload size for the tag.
        expected: usize,
        /// Size actually supplied.
        actual: usize,
    },
}

/// Tag byte for an event.
pub const fn tag(event: &TelemetryEvent) -> u8 {
    match event {
        TelemetryEvent::SessionStarted { .. } => TAG_SESSION_STARTED,
        TelemetryEvent::SessionFinished { .. } => TAG_SESSION_FINISHED,
        TelemetryEvent::CellSelected { .. } => TAG_CELL_SELECTED,
        TelemetryEvent::CellFired { .. } => TAG_CELL_FIRED,
        TelemetryEvent::CellHit { .. } => TAG_CELL_HIT,
        TelemetryEvent::CellMissed { .. } => TAG_CELL_MISSED,
    }
}

/// Fixed payload size for a tag, or `None` for an unknown tag.
pub const fn payload_len(tag: u8) -> Option<usize> {
    match tag {
        TAG_SESSION_STARTED => Some(6),
        TAG_SESSION_FINISHED => Some(5),
        TAG_CELL_SELECTED | TAG_CELL_FIRED | TAG_CELL_HIT | TAG_CELL_MISSED => Some(5),
        _ => None,
    }
}

/// Encode one event into its complete wire frame.
pub fn encode(event: &TelemetryEvent) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + MAX_PAYLOAD_LEN);
    frame.push(tag(event));

    match *event {
        TelemetryEvent::SessionStarted {
            start_tick,
            tick_period_ms,
            map_index,
        } => {
            frame.extend_from_slice(&start_tick.to_le_bytes());
            frame.push(tick_period_ms);
            frame.push(map_index);
        }
        TelemetryEvent::SessionFinished {
            stop_tick,
            shots_total,
        } => {
            frame.extend_from_slice(&stop_tick.to_le_bytes());
            frame.push(shots_total);
        }
        TelemetryEvent::CellSelected { tick, cell }
        | TelemetryEvent::CellFired { tick, cell }
        | TelemetryEvent::CellHit { tick, cell }
        | TelemetryEvent::CellMissed { tick, cell } => {
            frame.extend_from_slice(&tick.to_le_bytes());
            frame.push(cell);
        }
    }

    frame
}

/// Decode one event from its tag and payload bytes.
///
/// The payload must be exactly [`payload_len`] bytes for the tag.
pub fn decode(tag: u8, payload: &[u8]) -> Result<TelemetryEvent, WireError> {
    let expected = payload_len(tag).ok_or(WireError::UnknownTag(tag))?;
    if payload.len() != expected {
        return Err(WireError::PayloadLength {
            tag,
            expected,
            actual: payload.len(),
        });
    }

    let tick = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);

    let event = match tag {
        TAG_SESSION_STARTED => TelemetryEvent::session_started(tick, payload[4], payload[5]),
        TAG_SESSION_FINISHED => TelemetryEvent::session_finished(tick, payload[4]),
        TAG_CELL_SELECTED => TelemetryEvent::cell_selected(tick, payload[4]),
        TAG_CELL_FIRED => TelemetryEvent::cell_fired(tick, payload[4]),
        TAG_CELL_HIT => TelemetryEvent::cell_hit(tick, payload[4]),
        TAG_CELL_MISSED => TelemetryEvent::cell_missed(tick, payload[4]),
        _ => return Err(WireError::UnknownTag(tag)),
    };

    Ok(event)
}
