//! Session State Definitions
//!
//! The session is owned exclusively by the gameplay task; no other task
//! mutates it. Animation counters live inside the phase variants so they
//! are reset by construction whenever a phase is entered, never carried
//! over as hidden state.

use serde::{Deserialize, Serialize};

use crate::core::grid::{CellIndex, SEGMENT_COUNT};
use crate::game::map::{TargetMap, TARGETS_PER_MAP};

/// Ticks between animation steps: blink toggles, spinner steps and hit
/// flashes all advance on every 16th tick of their phase.
pub const ANIMATION_PERIOD_TICKS: u8 = 16;

/// Number of completed blink cycles that finish the hit animation.
pub const HIT_BLINK_CYCLES: u8 = 3;

/// The gameplay phase, carrying the per-phase animation counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Session reset: pick a map, announce the session, hand off to
    /// selection.
    Start,

    /// Cursor movement and firing; the cursor cell blinks.
    SegmentSelect {
        /// Ticks since the cursor blink last toggled.
        blink_timer: u8,
    },

    /// Fire animation: one bit walks across the 8-segment ring.
    SegmentFire {
        /// Ring bitmask of the current spinner step; starts at `0x01` and
        /// shifts left once per animation period until it shifts out.
        spinner: u8,
        /// Ticks since the spinner last stepped.
        timer: u8,
    },

    /// Hit animation: the full ring flashes three times.
    SegmentHit {
        /// Ring bitmask to show on the next flash step; alternates between
        /// `0xff` and `0x00`.
        mask: u8,
        /// Ticks since the flash last toggled.
        timer: u8,
        /// Completed blink cycles so far.
        blinks: u8,
    },

    /// Terminal bookkeeping; loops straight back to [`GamePhase::Start`].
    GameOver,
}

impl GamePhase {
    /// Fresh selection phase.
    pub const fn select() -> Self {
        Self::SegmentSelect { blink_timer: 0 }
    }

    /// Fresh fire animation.
    pub const fn fire() -> Self {
        Self::SegmentFire {
            spinner: 0x01,
            timer: 0,
        }
    }

    /// Fresh hit animation.
    pub const fn hit() -> Self {
        Self::SegmentHit {
            mask: 0xff,
            timer: 0,
            blinks: 0,
        }
    }
}

/// What the state machine wants shown on the display.
///
/// Rendering cells to physical segments is the display driver's problem;
/// this is the contract the driver reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayFrame {
    /// One flag per grid cell: lit or dark. Carries the revealed targets
    /// plus the blinking cursor overlay.
    pub cells: [bool; SEGMENT_COUNT as usize],
    /// Bitmask for the 8-segment ring indicator.
    pub ring: u8,
}

impl Default for DisplayFrame {
    fn default() -> Self {
        Self {
            cells: [false; SEGMENT_COUNT as usize],
            ring: 0,
        }
    }
}

/// The complete state of one gameplay session.
#[derive(Clone, Debug)]
pub struct GameSession {
    /// Current phase, including its animation counters.
    pub phase: GamePhase,

    /// Ticks elapsed since session start; wraps at the counter width.
    pub tick: u32,

    /// The cursor cell.
    pub selected: CellIndex,

    /// Hidden targets not yet revealed. Starts at 8, only decreases.
    pub remaining_targets: u8,

    /// Counted shots this session. Only increases.
    pub shots_total: u8,

    /// The hidden-target assignment in play.
    pub map: TargetMap,

    /// Index of the active layout, reported in telemetry.
    pub map_index: u8,

    /// Cells permanently confirmed as targets. Grows monotonically within
    /// a session.
    pub revealed: [bool; SEGMENT_COUNT as usize],

    /// Output toward the display driver.
    pub display: DisplayFrame,
}

impl GameSession {
    /// Create a session that will initialize itself on its first tick.
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Start,
            tick: 0,
            selected: CellIndex::ZERO,
            remaining_targets: TARGETS_PER_MAP,
            shots_total: 0,
            map: TargetMap::empty(),
            map_index: 0,
            revealed: [false; SEGMENT_COUNT as usize],
            display: DisplayFrame::default(),
        }
    }

    /// Whether the cell has been confirmed as a target.
    #[inline]
    pub fn is_revealed(&self, cell: CellIndex) -> bool {
        self.revealed[cell.as_usize()]
    }

    /// Permanently mark a cell as a confirmed target.
    #[inline]
    pub fn reveal(&mut self, cell: CellIndex) {
        self.revealed[cell.as_usize()] = true;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
