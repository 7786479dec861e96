//! Board coordinates and the tile record.

use serde::{Deserialize, Serialize};

use crate::Direction;

/// A cell coordinate. `x` is the column, `y` the row, both in `[0, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// The neighbouring coordinate one step along `direction`.
    ///
    /// Returns `None` when the step would leave the board on the low side
    /// (negative coordinates). Stepping past the high side still yields a
    /// position; callers check it against the board size.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.vector();
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Position { x, y })
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Position { x, y }
    }
}

/// A single board entry.
///
/// Tiles carry no animation state. What happened to a tile during a swipe is
/// reported in the swipe's [`SwipeOutcome`](crate::SwipeOutcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub position: Position,
    pub value: u32,
}

impl Tile {
    pub fn new(position: Position, value: u32) -> Self {
        Tile { position, value }
    }

    pub fn x(&self) -> usize {
        self.position.x
    }

    pub fn y(&self) -> usize {
        self.position.y
    }
}

/// Largest tile value. Two of these never merge, since the sum would not
/// fit in a `u32`.
pub const MAX_TILE_VALUE: u32 = 1 << 31;

/// Whether `value` may appear on a board: a power of two, at least 2.
pub fn is_valid_value(value: u32) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// Whether tiles holding `a` and `b` combine when swiped together.
pub fn can_merge(a: u32, b: u32) -> bool {
    a == b && a < MAX_TILE_VALUE
}
