//! Target Maps
//!
//! A map hides exactly 8 target cells somewhere on the 91-cell grid. The
//! 16 layouts below are fixed; a session picks one uniformly at random and
//! the choice is immutable for the session's lifetime.

use crate::core::grid::{CellIndex, SEGMENT_COUNT};
use crate::core::rng::DeterministicRng;

/// Number of predefined map layouts.
pub const MAP_COUNT: u8 = 16;

/// Number of hidden targets on every map.
pub const TARGETS_PER_MAP: u8 = 8;

/// The predefined layouts, one row of 8 target cell indices per map.
const LAYOUTS: [[u8; TARGETS_PER_MAP as usize]; MAP_COUNT as usize] = [
    [9, 12, 48, 51, 53, 54, 78, 65],
    [0, 13, 52, 65, 79, 80, 35, 38],
    [7, 10, 30, 31, 87, 90, 47, 50],
    [4, 5, 14, 15, 30, 31, 79, 80],
    [6, 19, 26, 39, 29, 42, 74, 77],
    [0, 3, 13, 16, 32, 45, 71, 84],
    [9, 12, 22, 25, 35, 38, 59, 62],
    [6, 19, 34, 37, 73, 76, 85, 88],
    [21, 24, 34, 37, 45, 58, 68, 81],
    [0, 3, 6, 13, 19, 16, 45, 58],
    [65, 78, 68, 81, 71, 84, 32, 45],
    [9, 12, 20, 23, 32, 45, 73, 76],
    [34, 37, 21, 24, 60, 63, 71, 84],
    [3, 16, 27, 28, 30, 31, 53, 54],
    [4, 5, 16, 29, 43, 44, 71, 84],
    [6, 19, 34, 37, 59, 62, 87, 90],
];

/// One session's fixed assignment of hidden targets to grid cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetMap {
    cells: [bool; SEGMENT_COUNT as usize],
}

impl TargetMap {
    /// A map with no targets, used before a session has started.
    pub const fn empty() -> Self {
        Self {
            cells: [false; SEGMENT_COUNT as usize],
        }
    }

    /// Build the map for one of the predefined layouts.
    pub fn from_layout(index: u8) -> Option<Self> {
        let layout = LAYOUTS.get(index as usize)?;
        let mut cells = [false; SEGMENT_COUNT as usize];
        for &target in layout {
            cells[target as usize] = true;
        }
        Some(Self { cells })
    }

    /// Pick a layout uniformly at random; returns the layout index and the
    /// built map.
    pub fn pick(rng: &mut DeterministicRng) -> (u8, Self) {
        let index = rng.next_int(MAP_COUNT as u32) as u8;
        let map = Self::from_layout(index).unwrap_or_else(Self::empty);
        (index, map)
    }

    /// Whether the given cell hides a target.
    #[inline]
    pub fn is_target(&self, cell: CellIndex) -> bool {
        self.cells[cell.as_usize()]
    }

    /// Number of target cells on the map.
    pub fn target_count(&self) -> u8 {
        self.cells.iter().filter(|&&hit| hit).count() as u8
    }
}
