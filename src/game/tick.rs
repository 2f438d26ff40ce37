//! The Gameplay State Machine
//!
//! One [`tick`] call per 10 ms period drives the whole game. Every phase
//! handler is deterministic: the only inputs are the session state, the
//! (at most one) input event drained from the slot this tick, and the
//! session RNG. Events produced by a tick are returned to the caller, which
//! owns delivering them to the telemetry queue.

use crate::core::grid::{CellIndex, SEGMENT_COUNT};
use crate::core::rng::DeterministicRng;
use crate::game::events::TelemetryEvent;
use crate::game::input::InputEvent;
use crate::game::map::{TargetMap, TARGETS_PER_MAP};
use crate::game::state::{
    DisplayFrame, GamePhase, GameSession, ANIMATION_PERIOD_TICKS, HIT_BLINK_CYCLES,
};
use crate::TICK_PERIOD_MS;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Telemetry events generated this tick, in emission order.
    pub events: Vec<TelemetryEvent>,
    /// Whether the session finished this tick.
    pub session_over: bool,
}

/// Run one gameplay tick.
///
/// Advances the tick counter, then dispatches on the current phase. The
/// caller feeds in at most one input event (the latest unread value from
/// the input slot, or `None`); only the selection phase looks at it.
pub fn tick(
    session: &mut GameSession,
    input: Option<InputEvent>,
    rng: &mut DeterministicRng,
) -> TickResult {
    let mut result = TickResult::default();

    session.tick = session.tick.wrapping_add(1);

    match session.phase {
        GamePhase::Start => start(session, rng, &mut result),
        GamePhase::SegmentSelect { blink_timer } => {
            segment_select(session, blink_timer, input, &mut result)
        }
        GamePhase::SegmentFire { spinner, timer } => {
            segment_fire(session, spinner, timer, &mut result)
        }
        GamePhase::SegmentHit { mask, timer, blinks } => segment_hit(session, mask, timer, blinks),
        GamePhase::GameOver => game_over(session, &mut result),
    }

    result
}

/// Reset the session, pick a map and announce the new session.
fn start(session: &mut GameSession, rng: &mut DeterministicRng, result: &mut TickResult) {
    session.selected = CellIndex::ZERO;
    session.remaining_targets = TARGETS_PER_MAP;
    session.shots_total = 0;
    session.tick = 0;
    session.revealed = [false; SEGMENT_COUNT as usize];
    session.display = DisplayFrame::default();

    let (map_index, map) = TargetMap::pick(rng);
    session.map_index = map_index;
    session.map = map;

    result.events.push(TelemetryEvent::session_started(
        session.tick,
        TICK_PERIOD_MS,
        map_index,
    ));

    session.phase = GamePhase::select();
}

/// Blink the cursor, consume at most one input, keep revealed targets lit.
fn segment_select(
    session: &mut GameSession,
    blink_timer: u8,
    input: Option<InputEvent>,
    result: &mut TickResult,
) {
    let mut blink_timer = blink_timer;
    let cursor = session.selected.as_usize();

    if blink_timer == ANIMATION_PERIOD_TICKS - 1 {
        session.display.cells[cursor] = !session.display.cells[cursor];
        blink_timer = 0;
    } else {
        blink_timer += 1;
    }

    session.phase = GamePhase::SegmentSelect { blink_timer };

    match input {
        None => {}
        Some(InputEvent::MoveLeft) => move_cursor(session, session.selected.moved_left(), result),
        Some(InputEvent::MoveRight) => move_cursor(session, session.selected.moved_right(), result),
        Some(InputEvent::MoveUp) => move_cursor(session, session.selected.moved_up(), result),
        Some(InputEvent::MoveDown) => move_cursor(session, session.selected.moved_down(), result),
        Some(InputEvent::Fire) => fire(session, result),
    }

    // Keep the blink overlay from hiding already revealed targets
    let cursor = session.selected.as_usize();
    for (index, cell) in session.display.cells.iter_mut().enumerate() {
        if index != cursor {
            *cell = session.revealed[index];
        }
    }
}

/// Park the cursor on a new cell and report the selection.
fn move_cursor(session: &mut GameSession, next: CellIndex, result: &mut TickResult) {
    session.display.cells[session.selected.as_usize()] = false;
    session.selected = next;
    result.events.push(TelemetryEvent::cell_selected(
        session.tick,
        session.selected.get(),
    ));
}

/// Count the shot and start the fire animation.
fn fire(session: &mut GameSession, result: &mut TickResult) {
    session.display.cells[session.selected.as_usize()] = false;
    // A shot at an already revealed cell is not counted
    if !session.is_revealed(session.selected) {
        session.shots_total = session.shots_total.wrapping_add(1);
    }
    result.events.push(TelemetryEvent::cell_fired(
        session.tick,
        session.selected.get(),
    ));
    session.phase = GamePhase::fire();
}

/// Walk one bit across the ring; resolve the shot when it walks off.
fn segment_fire(session: &mut GameSession, spinner: u8, timer: u8, result: &mut TickResult) {
    let mut spinner = spinner;
    let mut timer = timer;

    if timer == ANIMATION_PERIOD_TICKS - 1 {
        session.display.ring = spinner;
        spinner <<= 1;
        timer = 0;
    } else {
        timer += 1;
    }

    // The mask shifting out means all 8 steps have played; resolve now
    if spinner == 0 {
        session.display.ring = 0;
        if session.map.is_target(session.selected) {
            result.events.push(TelemetryEvent::cell_hit(
                session.tick,
                session.selected.get(),
            ));
            session.phase = GamePhase::hit();
        } else {
            result.events.push(TelemetryEvent::cell_missed(
                session.tick,
                session.selected.get(),
            ));
            session.phase = GamePhase::select();
        }
    } else {
        session.phase = GamePhase::SegmentFire { spinner, timer };
    }
}

/// Flash the ring three times, then reveal the hit cell.
fn segment_hit(session: &mut GameSession, mask: u8, timer: u8, blinks: u8) {
    let mut mask = mask;
    let mut timer = timer;
    let mut blinks = blinks;

    if timer == ANIMATION_PERIOD_TICKS - 1 {
        session.display.ring = mask;
        if mask != 0 {
            mask = 0;
        } else {
            mask = 0xff;
            blinks += 1;
        }
        timer = 0;
    } else {
        timer += 1;
    }

    if blinks == HIT_BLINK_CYCLES {
        session.display.ring = 0;

        // Re-hitting a revealed cell must not double-count the target
        if !session.is_revealed(session.selected) {
            session.remaining_targets = session.remaining_targets.saturating_sub(1);
        }
        session.reveal(session.selected);

        session.phase = if session.remaining_targets != 0 {
            GamePhase::select()
        } else {
            GamePhase::GameOver
        };
    } else {
        session.phase = GamePhase::SegmentHit { mask, timer, blinks };
    }
}

/// Announce the finished session and loop back to a fresh start.
fn game_over(session: &mut GameSession, result: &mut TickResult) {
    result.events.push(TelemetryEvent::session_finished(
        session.tick,
        session.shots_total,
    ));
    result.session_over = true;
    session.phase = GamePhase::Start;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::MAP_COUNT;

    /// Duration of the fire animation: 8 spinner steps, one per period.
    const FIRE_TICKS: u32 = 8 * ANIMATION_PERIOD_TICKS as u32;

    /// Duration of the hit animation: 3 blink cycles of two toggles each.
    const HIT_TICKS: u32 = 6 * ANIMATION_PERIOD_TICKS as u32;

    fn rng() -> DeterministicRng {
        DeterministicRng::new(42)
    }

    /// A session already in the selection phase on a chosen layout.
    fn select_session(layout: u8) -> GameSession {
        let mut session = GameSession::new();
        session.map = TargetMap::from_layout(layout).unwrap();
        session.map_index = layout;
        session.phase = GamePhase::select();
        session
    }

    fn run_quiet_ticks(session: &mut GameSession, rng: &mut DeterministicRng, count: u32) -> Vec<TelemetryEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            events.extend(tick(session, None, rng).events);
        }
        events
    }

    #[test]
    fn test_first_tick_starts_session() {
        let mut session = GameSession::new();
        let mut rng = rng();

        let result = tick(&mut session, None, &mut rng);

        assert_eq!(session.tick, 0);
        assert_eq!(session.phase, GamePhase::select());
        assert_eq!(session.map.target_count(), TARGETS_PER_MAP);
        assert!(session.map_index < MAP_COUNT);
        assert_eq!(
            result.events,
            vec![TelemetryEvent::session_started(0, TICK_PERIOD_MS, session.map_index)]
        );
    }

    #[test]
    fn test_moves_emit_selected_with_new_index() {
        let mut session = select_session(0);
        let mut rng = rng();

        let result = tick(&mut session, Some(InputEvent::MoveUp), &mut rng);
        assert_eq!(session.selected.get(), 1);
        assert_eq!(result.events, vec![TelemetryEvent::cell_selected(1, 1)]);

        let result = tick(&mut session, Some(InputEvent::MoveRight), &mut rng);
        assert_eq!(session.selected.get(), 14);
        assert_eq!(result.events, vec![TelemetryEvent::cell_selected(2, 14)]);
    }

    #[test]
    fn test_cursor_blink_cadence() {
        let mut session = select_session(0);
        let mut rng = rng();
        let cursor = session.selected.as_usize();

        // No toggle for the first 15 ticks of the phase
        for _ in 0..15 {
            tick(&mut session, None, &mut rng);
            assert!(!session.display.cells[cursor]);
        }

        // The 16th tick toggles the cursor on, the 32nd back off
        tick(&mut session, None, &mut rng);
        assert!(session.display.cells[cursor]);

        for _ in 0..15 {
            tick(&mut session, None, &mut rng);
        }
        tick(&mut session, None, &mut rng);
        assert!(!session.display.cells[cursor]);
    }

    #[test]
    fn test_fire_counts_shot_and_enters_fire_phase() {
        let mut session = select_session(0);
        let mut rng = rng();

        let result = tick(&mut session, Some(InputEvent::Fire), &mut rng);

        assert_eq!(session.shots_total, 1);
        assert_eq!(session.phase, GamePhase::fire());
        assert_eq!(result.events, vec![TelemetryEvent::cell_fired(1, 0)]);
    }

    #[test]
    fn test_fire_animation_resolves_after_128_ticks() {
        let mut session = select_session(0);
        let mut rng = rng();

        // Cell 0 is not a target on layout 0: expect a miss
        tick(&mut session, Some(InputEvent::Fire), &mut rng);
        let fired_at = session.tick;

        let events = run_quiet_ticks(&mut session, &mut rng, FIRE_TICKS - 1);
        assert!(events.is_empty());
        assert!(matches!(session.phase, GamePhase::SegmentFire { .. }));

        let result = tick(&mut session, None, &mut rng);
        assert_eq!(
            result.events,
            vec![TelemetryEvent::cell_missed(fired_at + FIRE_TICKS, 0)]
        );
        assert_eq!(session.phase, GamePhase::select());
        assert_eq!(session.display.ring, 0);
    }

    #[test]
    fn test_spinner_walks_the_ring() {
        let mut session = select_session(0);
        let mut rng = rng();
        tick(&mut session, Some(InputEvent::Fire), &mut rng);

        let mut prev = session.display.ring;
        let mut shown = Vec::new();
        for _ in 0..FIRE_TICKS {
            tick(&mut session, None, &mut rng);
            if session.display.ring != prev {
                shown.push(session.display.ring);
                prev = session.display.ring;
            }
        }

        // The eighth step shifts the mask out and resolves on the same
        // tick, so 0x80 is never left visible after a tick returns
        assert_eq!(shown, vec![0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x00]);
    }

    #[test]
    fn test_hit_reveals_target_after_blinks() {
        let mut session = select_session(0);
        let mut rng = rng();
        let target = CellIndex::new(9).unwrap();
        session.selected = target;

        tick(&mut session, Some(InputEvent::Fire), &mut rng);
        let events = run_quiet_ticks(&mut session, &mut rng, FIRE_TICKS);
        let hit_tick = session.tick;
        assert_eq!(events, vec![TelemetryEvent::cell_hit(hit_tick, 9)]);
        assert_eq!(session.phase, GamePhase::hit());

        // The blink sequence runs for 96 ticks before the reveal
        run_quiet_ticks(&mut session, &mut rng, HIT_TICKS - 1);
        assert!(!session.is_revealed(target));
        assert!(matches!(session.phase, GamePhase::SegmentHit { .. }));

        tick(&mut session, None, &mut rng);
        assert!(session.is_revealed(target));
        assert_eq!(session.remaining_targets, TARGETS_PER_MAP - 1);
        assert_eq!(session.phase, GamePhase::select());
        assert_eq!(session.tick, hit_tick + HIT_TICKS);
    }

    #[test]
    fn test_refire_on_revealed_cell_changes_no_score() {
        let mut session = select_session(0);
        let mut rng = rng();
        session.selected = CellIndex::new(9).unwrap();

        // First full fire-hit-reveal cycle
        tick(&mut session, Some(InputEvent::Fire), &mut rng);
        run_quiet_ticks(&mut session, &mut rng, FIRE_TICKS + HIT_TICKS);
        assert_eq!(session.shots_total, 1);
        assert_eq!(session.remaining_targets, TARGETS_PER_MAP - 1);

        // Second shot at the same, now revealed, cell still plays the full
        // animation and re-resolves as a hit but leaves the score alone
        let result = tick(&mut session, Some(InputEvent::Fire), &mut rng);
        assert_eq!(session.shots_total, 1);
        assert!(matches!(session.phase, GamePhase::SegmentFire { .. }));
        assert!(matches!(
            result.events.as_slice(),
            [TelemetryEvent::CellFired { .. }]
        ));

        let events = run_quiet_ticks(&mut session, &mut rng, FIRE_TICKS + HIT_TICKS);
        assert!(events
            .iter()
            .any(|event| matches!(event, TelemetryEvent::CellHit { .. })));
        assert_eq!(session.shots_total, 1);
        assert_eq!(session.remaining_targets, TARGETS_PER_MAP - 1);
        assert_eq!(session.phase, GamePhase::select());
    }

    #[test]
    fn test_last_target_finishes_session() {
        let mut session = select_session(0);
        let mut rng = rng();

        // Layout 0 targets; reveal all but cell 9 by hand
        for &cell in &[12u8, 48, 51, 53, 54, 65, 78] {
            session.reveal(CellIndex::new(cell).unwrap());
        }
        session.remaining_targets = 1;
        session.shots_total = 11;
        session.selected = CellIndex::new(9).unwrap();

        tick(&mut session, Some(InputEvent::Fire), &mut rng);
        run_quiet_ticks(&mut session, &mut rng, FIRE_TICKS + HIT_TICKS - 1);
        assert!(matches!(session.phase, GamePhase::SegmentHit { .. }));

        // The tick that completes the third blink transitions to GameOver
        let result = tick(&mut session, None, &mut rng);
        assert!(result.events.is_empty());
        assert_eq!(session.remaining_targets, 0);
        assert_eq!(session.phase, GamePhase::GameOver);
        let finished_at = session.tick;

        // The next tick reports the finished session and loops to Start
        let result = tick(&mut session, None, &mut rng);
        assert!(result.session_over);
        assert_eq!(
            result.events,
            vec![TelemetryEvent::session_finished(finished_at + 1, 12)]
        );
        assert_eq!(session.phase, GamePhase::Start);

        // And the tick after that begins a brand-new session
        let result = tick(&mut session, None, &mut rng);
        assert_eq!(session.tick, 0);
        assert_eq!(session.shots_total, 0);
        assert_eq!(session.remaining_targets, TARGETS_PER_MAP);
        assert!(session.revealed.iter().all(|&r| !r));
        assert!(matches!(
            result.events.as_slice(),
            [TelemetryEvent::SessionStarted { .. }]
        ));
    }

    #[test]
    fn test_revealed_targets_stay_lit_in_select() {
        let mut session = select_session(0);
        let mut rng = rng();
        let revealed = CellIndex::new(48).unwrap();
        session.reveal(revealed);
        session.remaining_targets = TARGETS_PER_MAP - 1;

        run_quiet_ticks(&mut session, &mut rng, 40);
        assert!(session.display.cells[revealed.as_usize()]);

        // Moving the cursor over a revealed cell and away again leaves it lit
        session.selected = revealed;
        run_quiet_ticks(&mut session, &mut rng, 3);
        session.selected = CellIndex::new(0).unwrap();
        run_quiet_ticks(&mut session, &mut rng, 3);
        assert!(session.display.cells[revealed.as_usize()]);
    }

    #[test]
    fn test_random_soak_preserves_invariants() {
        use rand::prelude::*;

        let mut std_rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut session = GameSession::new();
        let mut rng = DeterministicRng::new(999);
        let mut revealed_count = 0;

        for _ in 0..20_000 {
            let input = match std_rng.gen_range(0..8) {
                0 => Some(InputEvent::MoveLeft),
                1 => Some(InputEvent::MoveRight),
                2 => Some(InputEvent::MoveUp),
                3 => Some(InputEvent::MoveDown),
                4 => Some(InputEvent::Fire),
                _ => None,
            };

            let before_shots = session.shots_total;
            let session_over = tick(&mut session, input, &mut rng).session_over;

            assert!(session.selected.get() < SEGMENT_COUNT);
            assert!(session.remaining_targets <= TARGETS_PER_MAP);

            let now_revealed = session.revealed.iter().filter(|&&r| r).count();
            if session_over || session.phase == GamePhase::Start || session.tick == 0 {
                revealed_count = 0;
            } else {
                assert!(now_revealed >= revealed_count, "revealed set shrank");
                assert!(session.shots_total >= before_shots || session.tick == 0);
            }
            revealed_count = now_revealed;
        }
    }
}
