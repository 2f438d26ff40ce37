//! Segment Grid Geometry
//!
//! The display is an ordered sequence of 91 addressable cells, partitioned
//! into 7 digit groups of 13 cells each. Cell `i` belongs to digit `i / 13`
//! at position `i % 13` within that digit. Left/right movement jumps between
//! digits while keeping the position; up/down cycles the position within the
//! current digit.

use serde::{Deserialize, Serialize};

/// Total number of addressable cells on the display.
pub const SEGMENT_COUNT: u8 = 91;

/// Number of digit groups on the display.
pub const DIGIT_COUNT: u8 = 7;

/// Number of cells in one digit group.
pub const SEGMENTS_PER_DIGIT: u8 = 13;

/// Index of one cell on the segment grid.
///
/// Invariant: the wrapped value is always in `[0, SEGMENT_COUNT)`. All
/// movement operations preserve the invariant, so a `CellIndex` can be used
/// to index 91-element tables without bounds checks failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellIndex(u8);

impl CellIndex {
    /// The top-left cell, where the cursor starts.
    pub const ZERO: CellIndex = CellIndex(0);

    /// Create a cell index, rejecting out-of-range values.
    pub const fn new(index: u8) -> Option<Self> {
        if index < SEGMENT_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Create a cell index from a digit group and a position within it.
    pub const fn from_parts(digit: u8, position: u8) -> Option<Self> {
        if digit < DIGIT_COUNT && position < SEGMENTS_PER_DIGIT {
            Some(Self(digit * SEGMENTS_PER_DIGIT + position))
        } else {
            None
        }
    }

    /// Raw index in `[0, 91)`.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Raw index widened for table indexing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Digit group this cell belongs to, in `[0, 7)`.
    #[inline]
    pub const fn digit(self) -> u8 {
        self.0 / SEGMENTS_PER_DIGIT
    }

    /// Position within the digit group, in `[0, 13)`.
    #[inline]
    pub const fn position(self) -> u8 {
        self.0 % SEGMENTS_PER_DIGIT
    }

    /// One digit group to the left, same position, wrapping to the
    /// rightmost digit from the leftmost.
    #[inline]
    pub const fn moved_left(self) -> Self {
        Self((self.0 + SEGMENT_COUNT - SEGMENTS_PER_DIGIT) % SEGMENT_COUNT)
    }

    /// One digit group to the right, same position, wrapping to the
    /// leftmost digit from the rightmost.
    #[inline]
    pub const fn moved_right(self) -> Self {
        Self((self.0 + SEGMENTS_PER_DIGIT) % SEGMENT_COUNT)
    }

    /// Next position within the current digit, cycling 12 back to 0.
    #[inline]
    pub const fn moved_up(self) -> Self {
        Self(self.digit() * SEGMENTS_PER_DIGIT + (self.position() + 1) % SEGMENTS_PER_DIGIT)
    }

    /// Previous position within the current digit, cycling 0 back to 12.
    #[inline]
    pub const fn moved_down(self) -> Self {
        Self(
            self.digit() * SEGMENTS_PER_DIGIT
                + (self.position() + SEGMENTS_PER_DIGIT - 1) % SEGMENTS_PER_DIGIT,
        )
    }

    /// Iterate over every cell of the grid in index order.
    pub fn all() -> impl Iterator<Item = CellIndex> {
        (0..SEGMENT_COUNT).map(CellIndex)
    }
}

impl std::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(CellIndex::new(0).is_some());
        assert!(CellIndex::new(90).is_some());
        assert!(CellIndex::new(91).is_none());
        assert!(CellIndex::new(255).is_none());
    }

    #[test]
    fn test_digit_and_position() {
        let cell = CellIndex::new(40).unwrap();
        assert_eq!(cell.digit(), 3);
        assert_eq!(cell.position(), 1);

        let cell = CellIndex::from_parts(6, 12).unwrap();
        assert_eq!(cell.get(), 90);
    }

    #[test]
    fn test_left_right_are_inverse_everywhere() {
        for cell in CellIndex::all() {
            assert_eq!(cell.moved_left().moved_right(), cell);
            assert_eq!(cell.moved_right().moved_left(), cell);
        }
    }

    #[test]
    fn test_horizontal_moves_keep_position() {
        for cell in CellIndex::all() {
            assert_eq!(cell.moved_left().position(), cell.position());
            assert_eq!(cell.moved_right().position(), cell.position());
        }
    }

    #[test]
    fn test_up_cycles_with_order_thirteen() {
        for cell in CellIndex::all() {
            let mut cursor = cell;
            for _ in 0..SEGMENTS_PER_DIGIT {
                cursor = cursor.moved_up();
                assert_eq!(cursor.digit(), cell.digit());
            }
            assert_eq!(cursor, cell);
        }
    }

    #[test]
    fn test_down_is_inverse_of_up() {
        for cell in CellIndex::all() {
            assert_eq!(cell.moved_up().moved_down(), cell);
            assert_eq!(cell.moved_down().moved_up(), cell);
        }
    }

    #[test]
    fn test_right_cycles_through_all_digits() {
        let mut cursor = CellIndex::ZERO;
        for _ in 0..DIGIT_COUNT {
            cursor = cursor.moved_right();
        }
        assert_eq!(cursor, CellIndex::ZERO);
    }

    #[test]
    fn test_moves_stay_in_range() {
        for cell in CellIndex::all() {
            for moved in [
                cell.moved_left(),
                cell.moved_right(),
                cell.moved_up(),
                cell.moved_down(),
            ] {
                assert!(moved.get() < SEGMENT_COUNT);
            }
        }
    }
}
