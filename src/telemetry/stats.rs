//! Session Statistics
//!
//! Running counters over the decoded telemetry stream, reset on every
//! session start and folded into a [`SessionReport`] when the session
//! finishes. Tick arithmetic wraps, matching the device's wrapping tick
//! counter. The first hit interval is measured against tick 0 rather than
//! the session's start tick; that is the historical behavior of this
//! statistic and is kept as-is.

use serde::{Deserialize, Serialize};

use crate::game::events::TelemetryEvent;

/// Running counters for the session currently being observed.
#[derive(Clone, Debug, Default)]
pub struct StatsAggregator {
    /// Tick value from the session-started message.
    start_tick: u32,
    /// Tick value from the session-finished message.
    stop_tick: u32,
    /// Tick period reported by the device, in milliseconds.
    tick_period_ms: u8,
    /// Map layout in play.
    map_index: u8,
    /// Total counted shots, from the session-finished message.
    shots_total: u8,
    /// Number of missed shots observed.
    miss_total: u32,
    /// Sum of tick intervals between consecutive hits.
    sum_hit_intervals: u32,
    /// Tick of the most recent hit.
    last_hit_tick: u32,
}

impl StatsAggregator {
    /// Create an aggregator with all counters zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map layout reported by the current session, if any.
    pub fn map_index(&self) -> u8 {
        self.map_index
    }

    /// Missed shots observed so far this session.
    pub fn miss_total(&self) -> u32 {
        self.miss_total
    }

    /// Sum of tick intervals between consecutive hits so far.
    pub fn sum_hit_intervals(&self) -> u32 {
        self.sum_hit_intervals
    }

    /// Fold one decoded event into the counters.
    ///
    /// Selection and fire events are logging-only and leave the counters
    /// untouched. Returns the finalized report when the event closes a
    /// session.
    pub fn observe(&mut self, event: &TelemetryEvent) -> Option<SessionReport> {
        match *event {
            TelemetryEvent::SessionStarted {
                start_tick,
                tick_period_ms,
                map_index,
            } => {
                *self = Self {
                    start_tick,
                    tick_period_ms,
                    map_index,
                    ..Self::default()
                };
                None
            }
            TelemetryEvent::SessionFinished {
                stop_tick,
                shots_total,
            } => {
                self.stop_tick = stop_tick;
                self.shots_total = shots_total;
                Some(self.finalize())
            }
            TelemetryEvent::CellHit { tick, .. } => {
                self.sum_hit_intervals = self
                    .sum_hit_intervals
                    .wrapping_add(tick.wrapping_sub(self.last_hit_tick));
                self.last_hit_tick = tick;
                None
            }
            TelemetryEvent::CellMissed { .. } => {
                self.miss_total += 1;
                None
            }
            TelemetryEvent::CellSelected { .. } | TelemetryEvent::CellFired { .. } => None,
        }
    }

    /// Compute the derived statistics from the current counters.
    fn finalize(&self) -> SessionReport {
        let shots_total = self.shots_total as u32;
        let hits_total = shots_total.wrapping_sub(self.miss_total);
        let game_ticks = self.stop_tick.wrapping_sub(self.start_tick);
        let period_s = self.tick_period_ms as f64 / 1000.0;

        SessionReport {
            map_index: self.map_index,
            shots_total: self.shots_total,
            hits_total,
            miss_total: self.miss_total,
            hit_rate_percent: 100.0 * hits_total as f64 / shots_total as f64,
            average_hit_time_seconds: (self.sum_hit_intervals as f64 / hits_total as f64)
                * period_s,
            game_time_seconds: game_ticks as f64 * period_s,
        }
    }
}

/// The finalized statistics of one session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Map layout the session was played on.
    pub map_index: u8,
    /// Total counted shots.
    pub shots_total: u8,
    /// Shots that hit a target.
    pub hits_total: u32,
    /// Shots that missed.
    pub miss_total: u32,
    /// Hits as a percentage of all shots.
    pub hit_rate_percent: f64,
    /// Mean time between hits, in seconds.
    pub average_hit_time_seconds: f64,
    /// Session length, in seconds.
    pub game_time_seconds: f64,
}

impl std::fmt::Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "STATISTICS:")?;
        writeln!(f, "-------------------------------")?;
        writeln!(f, "Shots total:     {}", self.shots_total)?;
        writeln!(f, "Hits total:      {}", self.hits_total)?;
        writeln!(f, "Misses total:    {}", self.miss_total)?;
        writeln!(f, "Hitrate:         {:.2}%", self.hit_rate_percent)?;
        writeln!(f, "Average hittime: {:.2} seconds", self.average_hit_time_seconds)?;
        writeln!(f, "Game time:       {:.2} seconds", self.game_time_seconds)
    }
}
