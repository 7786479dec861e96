//! # Snake 2048 Core
//!
//! A deterministic sliding-tile ("2048") engine plus a corner-anchored
//! heuristic solver that plays it. All randomness is injected, so games are
//! reproducible from a seed.
//!
//! ## Example
//!
//! ```rust
//! use snake_2048_core::{Board, Direction, Solver};
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let mut board = Board::new(4).unwrap();
//! board.spawn_random_tile(&mut rng);
//! board.spawn_random_tile(&mut rng);
//!
//! let solver = Solver::default();
//! let direction = solver.choose_direction(&board);
//! let outcome = board.swipe(direction);
//! if outcome.moved {
//!     board.spawn_random_tile(&mut rng);
//! }
//! println!("+{} points", outcome.score_delta);
//! ```

pub mod actuator;
pub mod board;
pub mod error;
pub mod session;
pub mod solver;
pub mod storage;
pub mod tile;

pub use actuator::{Actuator, Metadata, NullActuator};
pub use board::{Board, BoardSnapshot, SwipeOutcome, TileMerge, TileMove, MAX_SIZE, WINNING_VALUE};
pub use error::{Error, Result};
pub use session::{Command, GameState, InputHandler, RateChange, Session, SessionConfig};
pub use solver::{Corner, Solver, SolverConfig};
pub use storage::{GameSnapshot, MemoryStorage, Storage};
pub use tile::{Position, Tile, MAX_TILE_VALUE};

use serde::{Deserialize, Serialize};

/// The four swipe directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

/// The two board axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    /// Convert a u8 to a Direction (0=Up, 1=Right, 2=Down, 3=Left).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }

    /// Validate a raw `(dx, dy)` vector from an input source.
    pub fn from_vector(dx: i32, dy: i32) -> Result<Direction> {
        match (dx, dy) {
            (0, -1) => Ok(Direction::Up),
            (1, 0) => Ok(Direction::Right),
            (0, 1) => Ok(Direction::Down),
            (-1, 0) => Ok(Direction::Left),
            _ => Err(Error::InvalidDirection { dx, dy }),
        }
    }

    /// Get all four directions.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    }

    /// Unit vector `(dx, dy)`; `y` grows downwards.
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_u8() {
        assert_eq!(Direction::from_u8(0), Some(Direction::Up));
        assert_eq!(Direction::from_u8(1), Some(Direction::Right));
        assert_eq!(Direction::from_u8(2), Some(Direction::Down));
        assert_eq!(Direction::from_u8(3), Some(Direction::Left));
        assert_eq!(Direction::from_u8(4), None);
        assert_eq!(Direction::from_u8(255), None);
    }

    #[test]
    fn test_direction_vector_round_trip() {
        for direction in Direction::all() {
            let (dx, dy) = direction.vector();
            assert_eq!(Direction::from_vector(dx, dy), Ok(direction));
        }
    }

    #[test]
    fn test_direction_rejects_non_unit_vectors() {
        for (dx, dy) in [(0, 0), (1, 1), (2, 0), (-1, -1), (0, -2)] {
            assert_eq!(
                Direction::from_vector(dx, dy),
                Err(Error::InvalidDirection { dx, dy })
            );
        }
    }

    #[test]
    fn test_reverse_and_axis() {
        for direction in Direction::all() {
            assert_eq!(direction.reverse().reverse(), direction);
            assert_eq!(direction.reverse().axis(), direction.axis());
        }
        assert_eq!(Direction::Up.axis(), Axis::Vertical);
        assert_eq!(Direction::Left.axis(), Axis::Horizontal);
    }
}
