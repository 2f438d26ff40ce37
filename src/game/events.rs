//! Telemetry Events
//!
//! Typed events emitted by the state machine and consumed by the host's
//! statistics aggregator. Each event is constructed, serialized onto the
//! wire and discarded; nothing here is persisted. Cell indices are carried
//! as raw bytes so the host side can represent whatever arrived on the
//! wire without re-validating payload values.

use serde::{Deserialize, Serialize};

/// One telemetry event, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    /// A new session began.
    SessionStarted {
        /// Tick counter value at session start (always 0 on the device).
        start_tick: u32,
        /// Gameplay tick period in milliseconds.
        tick_period_ms: u8,
        /// Index of the predefined map in play.
        map_index: u8,
    },

    /// The session ended (all targets revealed).
    SessionFinished {
        /// Tick counter value at session end.
        stop_tick: u32,
        /// Total counted shots over the session.
        shots_total: u8,
    },

    /// The cursor moved to a new cell.
    CellSelected {
        /// Tick the movement was processed on.
        tick: u32,
        /// The newly selected cell.
        cell: u8,
    },

    /// The player fired at the selected cell.
    CellFired {
        /// Tick the fire input was processed on.
        tick: u32,
        /// The cell fired at.
        cell: u8,
    },

    /// A fired shot resolved as a hit.
    CellHit {
        /// Tick the shot resolved on.
        tick: u32,
        /// The cell that was hit.
        cell: u8,
    },

    /// A fired shot resolved as a miss.
    CellMissed {
        /// Tick the shot resolved on.
        tick: u32,
        /// The cell that was missed.
        cell: u8,
    },
}

impl TelemetryEvent {
    /// Create a session-started event.
    pub const fn session_started(start_tick: u32, tick_period_ms: u8, map_index: u8) -> Self {
        Self::SessionStarted {
            start_tick,
            tick_period_ms,
            map_index,
        }
    }

    /// Create a session-finished event.
    pub const fn session_finished(stop_tick: u32, shots_total: u8) -> Self {
        Self::SessionFinished {
            stop_tick,
            shots_total,
        }
    }

    /// Create a cell-selected event.
    pub const fn cell_selected(tick: u32, cell: u8) -> Self {
        Self::CellSelected { tick, cell }
    }

    /// Create a cell-fired event.
    pub const fn cell_fired(tick: u32, cell: u8) -> Self {
        Self::CellFired { tick, cell }
    }

    /// Create a cell-hit event.
    pub const fn cell_hit(tick: u32, cell: u8) -> Self {
        Self::CellHit { tick, cell }
    }

    /// Create a cell-missed event.
    pub const fn cell_missed(tick: u32, cell: u8) -> Self {
        Self::CellMissed { tick, cell }
    }

    /// Short name used in log lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::SessionFinished { .. } => "session_finished",
            Self::CellSelected { .. } => "cell_selected",
            Self::CellFired { .. } => "cell_fired",
            Self::CellHit { .. } => "cell_hit",
            Self::CellMissed { .. } => "cell_missed",
        }
    }
}
