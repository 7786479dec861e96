//! Persistence collaborator contract.
//!
//! The session hands a [`GameSnapshot`] to a [`Storage`] after every
//! actuation and reads it back on setup. How and where it is kept is up to
//! the implementation.

use serde::{Deserialize, Serialize};

use crate::board::BoardSnapshot;

/// The persisted form of a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub grid: BoardSnapshot,
    pub score: u32,
    pub over: bool,
    pub won: bool,
    pub keep_playing: bool,
}

/// Best score and saved game storage.
pub trait Storage {
    fn best_score(&self) -> u32;
    fn set_best_score(&mut self, score: u32);
    fn game_state(&self) -> Option<GameSnapshot>;
    fn set_game_state(&mut self, state: &GameSnapshot);
    fn clear_game_state(&mut self);
}

/// Keeps everything in memory; nothing survives the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    best_score: u32,
    game_state: Option<GameSnapshot>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage preloaded with a saved game.
    pub fn with_game_state(state: GameSnapshot) -> Self {
        MemoryStorage {
            best_score: state.score,
            game_state: Some(state),
        }
    }
}

impl Storage for MemoryStorage {
    fn best_score(&self) -> u32 {
        self.best_score
    }

    fn set_best_score(&mut self, score: u32) {
        self.best_score = score;
    }

    fn game_state(&self) -> Option<GameSnapshot> {
        self.game_state.clone()
    }

    fn set_game_state(&mut self, state: &GameSnapshot) {
        self.game_state = Some(state.clone());
    }

    fn clear_game_state(&mut self) {
        self.game_state = None;
    }
}
