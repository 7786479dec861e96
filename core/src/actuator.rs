//! Rendering collaborator contract.

use serde::Serialize;

use crate::board::{Board, SwipeOutcome};

/// Session state handed to the renderer alongside the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metadata {
    pub score: u32,
    pub best_score: u32,
    pub won: bool,
    pub over: bool,
    /// Lost, or won without choosing to keep playing.
    pub terminated: bool,
    pub solver_enabled: bool,
    /// Auto-play rate in moves per second.
    pub solver_rate: f64,
}

/// Receives every renderable update from the session.
///
/// `last` is the swipe that produced this state, if any; its moves and merges
/// are animation hints only.
pub trait Actuator {
    fn actuate(&mut self, board: &Board, last: Option<&SwipeOutcome>, metadata: &Metadata);

    /// Clear any won/lost message.
    fn continue_game(&mut self) {}
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullActuator;

impl Actuator for NullActuator {
    fn actuate(&mut self, _board: &Board, _last: Option<&SwipeOutcome>, _metadata: &Metadata) {}
}
