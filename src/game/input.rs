//! Input Events and the Single-Slot Input Queue
//!
//! The control link delivers one raw byte per keystroke. The link listener
//! decodes each byte into an [`InputEvent`] and posts it into the
//! [`InputSlot`]; the gameplay tick drains the slot with a non-blocking
//! read. The slot holds at most one pending event: a newer event overwrites
//! an unread older one, so bursts of keystrokes coalesce to the latest
//! value and no history is kept.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Control bytes accepted on the link, one per action.
mod control {
    pub const LEFT: u8 = b'a';
    pub const RIGHT: u8 = b'd';
    pub const UP: u8 = b'w';
    pub const DOWN: u8 = b's';
    pub const FIRE: u8 = b' ';
}

/// A discrete player action.
///
/// "No input" is represented as `Option::None` at the slot-read seam rather
/// than as a variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Move the cursor one digit group to the left.
    MoveLeft,
    /// Move the cursor one digit group to the right.
    MoveRight,
    /// Advance the cursor within the current digit group.
    MoveUp,
    /// Retreat the cursor within the current digit group.
    MoveDown,
    /// Fire at the selected cell.
    Fire,
}

impl InputEvent {
    /// Decode a raw control byte. Unmapped bytes decode to `None`; the link
    /// listener clears the slot for those, matching the overwrite-with-
    /// nothing behavior of the interrupt producer this models.
    pub const fn from_control_byte(byte: u8) -> Option<Self> {
        match byte {
            control::LEFT => Some(Self::MoveLeft),
            control::RIGHT => Some(Self::MoveRight),
            control::UP => Some(Self::MoveUp),
            control::DOWN => Some(Self::MoveDown),
            control::FIRE => Some(Self::Fire),
            _ => None,
        }
    }

    /// The control byte that encodes this action.
    pub const fn control_byte(self) -> u8 {
        match self {
            Self::MoveLeft => control::LEFT,
            Self::MoveRight => control::RIGHT,
            Self::MoveUp => control::UP,
            Self::MoveDown => control::DOWN,
            Self::Fire => control::FIRE,
        }
    }
}

/// Single-slot, latest-value input channel.
///
/// The producer side ([`post`](Self::post) / [`clear`](Self::clear)) always
/// overwrites; the consumer side ([`take`](Self::take)) never blocks. There
/// is no backpressure toward the producer and no history: at most one event
/// is ever in flight.
#[derive(Debug, Default)]
pub struct InputSlot {
    slot: Mutex<Option<InputEvent>>,
}

impl InputSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an event, overwriting any unread previous value.
    pub fn post(&self, event: InputEvent) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(event);
        }
    }

    /// Empty the slot, discarding any unread event.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }

    /// Take the most recent unread event, if any. Never blocks the caller
    /// beyond the uncontended lock.
    pub fn take(&self) -> Option<InputEvent> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}
