//! # Torpedo
//!
//! A two-node battleship game played on a 7-digit segmented display.
//! The device node runs a deterministic, tick-driven gameplay state machine
//! and streams telemetry over a point-to-point serial byte link; the host
//! node forwards keystrokes to the device and reconstructs game events from
//! the telemetry stream to compute per-session statistics.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          TORPEDO                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── grid.rs      - 91-cell segment grid and cursor moves    │
//! │  └── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │                                                              │
//! │  game/            - Gameplay logic (deterministic)           │
//! │  ├── map.rs       - 16 predefined target layouts             │
//! │  ├── input.rs     - Input events and the single-slot queue   │
//! │  ├── state.rs     - Phases, session state, display frame     │
//! │  ├── tick.rs      - The per-tick state machine               │
//! │  └── events.rs    - Telemetry event types                    │
//! │                                                              │
//! │  telemetry/       - Wire protocol and host-side processing   │
//! │  ├── wire.rs      - Byte-level codec (tag + fixed payload)   │
//! │  ├── outbound.rs  - Bounded blocking queue + drain task      │
//! │  ├── receiver.rs  - Timeout-framed receive loop              │
//! │  └── stats.rs     - Statistics aggregation and reporting     │
//! │                                                              │
//! │  device.rs        - Device runtime (tick task, input, link)  │
//! │  host.rs          - Host runtime (key forwarding, stats)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules are fully deterministic: one `tick()`
//! call per 10 ms period, all randomness from a seeded Xorshift128+, no
//! system time or I/O. Given the same seed and input sequence, a session
//! replays identically; the async runtimes in `device.rs` and `host.rs`
//! only schedule the deterministic core and move bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod device;
pub mod game;
pub mod host;
pub mod telemetry;

// Re-export commonly used types
pub use crate::core::grid::CellIndex;
pub use crate::core::rng::DeterministicRng;
pub use crate::game::events::TelemetryEvent;
pub use crate::game::input::{InputEvent, InputSlot};
pub use crate::game::state::{GamePhase, GameSession};
pub use crate::telemetry::stats::{SessionReport, StatsAggregator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gameplay tick period in milliseconds (100 Hz)
pub const TICK_PERIOD_MS: u8 = 10;
