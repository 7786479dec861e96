//! Error type shared by the engine, solver and session.

/// Failures raised at the crate boundary.
///
/// Only caller misuse ends up here. Expected steady-state outcomes, such as a
/// swipe into a wall or a spawn on a full board, are reported through return
/// values instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid direction vector ({dx}, {dy}); expected a unit axis vector")]
    InvalidDirection { dx: i32, dy: i32 },
    #[error("invalid board size {0}; expected 1..={}", crate::board::MAX_SIZE)]
    InvalidSize(usize),
    #[error("invalid tile value {value} at ({x}, {y}); expected a power of two >= 2")]
    InvalidTile { x: usize, y: usize, value: u32 },
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("grow vector {grow:?} does not run along an edge from corner {corner:?}")]
    InvalidFrame {
        corner: crate::solver::Corner,
        grow: crate::Direction,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no legal move on this board")]
    NoLegalMove,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
