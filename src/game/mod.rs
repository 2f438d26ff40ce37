//! Gameplay logic: maps, input, session state and the tick-driven state
//! machine. Everything here is deterministic; the async runtime lives in
//! [`crate::device`].

pub mod events;
pub mod input;
pub mod map;
pub mod state;
pub mod tick;
