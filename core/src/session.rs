//! Session controller.
//!
//! Owns the board, the score and the won/lost flags, drives the engine from
//! input commands or the solver, and forwards every change to the storage and
//! rendering collaborators.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actuator::{Actuator, Metadata};
use crate::board::{Board, SwipeOutcome};
use crate::error::Result;
use crate::solver::Solver;
use crate::storage::{GameSnapshot, Storage};
use crate::Direction;

/// Session settings. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side length of a fresh board.
    pub size: usize,
    /// Random tiles placed on a fresh board.
    pub start_tiles: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            size: 4,
            start_tiles: 2,
        }
    }
}

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Playing, 2048 not reached yet.
    EarlyGame,
    /// 2048 reached; waiting for the player to keep playing or restart.
    JustWon,
    /// No move left.
    JustLost,
    /// Playing on after 2048.
    LateGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateChange {
    Increase,
    Decrease,
}

/// A queued input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Move(Direction),
    Restart,
    KeepPlaying,
    ToggleSolver,
    Rate(RateChange),
}

/// Typed input slots an input source drives.
pub trait InputHandler {
    fn on_move(&mut self, direction: Direction);
    fn on_restart(&mut self);
    fn on_keep_playing(&mut self);
    fn on_toggle_solver(&mut self);
    fn on_rate_change(&mut self, change: RateChange);
}

pub struct Session<S, A, R> {
    config: SessionConfig,
    blank: Board,
    board: Board,
    score: u32,
    over: bool,
    won: bool,
    keep_playing: bool,
    solver: Solver,
    solver_enabled: bool,
    storage: S,
    actuator: A,
    rng: R,
}

impl<S: Storage, A: Actuator, R: Rng> Session<S, A, R> {
    /// Start a session, resuming the game saved in `storage` if there is one.
    pub fn new(config: SessionConfig, solver: Solver, storage: S, actuator: A, rng: R) -> Result<Self> {
        let blank = Board::new(config.size)?;
        let mut session = Session {
            config,
            board: blank.clone(),
            blank,
            score: 0,
            over: false,
            won: false,
            keep_playing: false,
            solver,
            solver_enabled: false,
            storage,
            actuator,
            rng,
        };
        session.setup();
        Ok(session)
    }

    fn setup(&mut self) {
        let restored = self.storage.game_state().and_then(|saved| {
            match Board::deserialize(saved.grid) {
                Ok(board) => Some((board, saved.score, saved.over, saved.won, saved.keep_playing)),
                Err(err) => {
                    warn!(%err, "discarding unreadable saved game");
                    None
                }
            }
        });

        match restored {
            Some((board, score, over, won, keep_playing)) => {
                info!(score, size = board.size(), "resumed saved game");
                self.board = board;
                self.score = score;
                self.over = over;
                self.won = won;
                self.keep_playing = keep_playing;
            }
            None => {
                self.board = self.blank.clone();
                self.score = 0;
                self.over = false;
                self.won = false;
                self.keep_playing = false;
                for _ in 0..self.config.start_tiles {
                    self.board.spawn_random_tile(&mut self.rng);
                }
                debug!(size = self.board.size(), "started fresh game");
            }
        }

        self.actuate(None);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.storage.best_score()
    }

    pub fn state(&self) -> GameState {
        if self.over {
            GameState::JustLost
        } else if self.won && !self.keep_playing {
            GameState::JustWon
        } else if self.won {
            GameState::LateGame
        } else {
            GameState::EarlyGame
        }
    }

    /// Lost, or won without choosing to keep playing.
    pub fn is_terminated(&self) -> bool {
        self.over || (self.won && !self.keep_playing)
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn solver_enabled(&self) -> bool {
        self.solver_enabled
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.board.serialize(),
            score: self.score,
            over: self.over,
            won: self.won,
            keep_playing: self.keep_playing,
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            score: self.score,
            best_score: self.storage.best_score(),
            won: self.won,
            over: self.over,
            terminated: self.is_terminated(),
            solver_enabled: self.solver_enabled,
            solver_rate: self.solver.rate(),
        }
    }

    // -------------------------------------------------------------------------
    // Game flow
    // -------------------------------------------------------------------------

    /// Swipe the board. Ignored once the game is terminated.
    ///
    /// A tile is spawned, and the state persisted and rendered, only when
    /// something moved.
    pub fn move_tiles(&mut self, direction: Direction) -> Option<SwipeOutcome> {
        if self.is_terminated() {
            return None;
        }

        let outcome = self.board.swipe(direction);
        self.score = self.score.saturating_add(outcome.score_delta);
        if outcome.reached_2048 && !self.won {
            info!(score = self.score, "reached 2048");
            self.won = true;
        }

        if outcome.moved {
            self.board.spawn_random_tile(&mut self.rng);
            if !self.board.has_available_moves() {
                info!(score = self.score, max_tile = self.board.max_tile(), "game over");
                self.over = true;
            }
            self.actuate(Some(&outcome));
        }

        Some(outcome)
    }

    /// One auto-play step. Returns `None` while the solver is off or the game
    /// is terminated.
    pub fn tick(&mut self) -> Option<SwipeOutcome> {
        if !self.solver_enabled || self.is_terminated() {
            return None;
        }
        let direction = self.solver.choose_direction(&self.board);
        self.move_tiles(direction)
    }

    pub fn restart(&mut self) {
        self.storage.clear_game_state();
        self.actuator.continue_game();
        self.setup();
    }

    /// Continue past 2048.
    pub fn keep_playing(&mut self) {
        self.keep_playing = true;
        self.actuator.continue_game();
        self.actuate(None);
    }

    pub fn toggle_solver(&mut self) {
        self.solver_enabled = !self.solver_enabled;
        debug!(enabled = self.solver_enabled, "solver toggled");
        self.actuate(None);
    }

    pub fn change_rate(&mut self, change: RateChange) {
        match change {
            RateChange::Increase => self.solver.increase_rate(),
            RateChange::Decrease => self.solver.decrease_rate(),
        }
        debug!(rate = self.solver.rate(), "solver rate changed");
        self.actuate(None);
    }

    /// Apply a queued command.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Move(direction) => self.on_move(direction),
            Command::Restart => self.on_restart(),
            Command::KeepPlaying => self.on_keep_playing(),
            Command::ToggleSolver => self.on_toggle_solver(),
            Command::Rate(change) => self.on_rate_change(change),
        }
    }

    fn actuate(&mut self, last: Option<&SwipeOutcome>) {
        if self.storage.best_score() < self.score {
            self.storage.set_best_score(self.score);
        }

        // A lost game is not worth resuming.
        if self.over {
            self.storage.clear_game_state();
        } else {
            let snapshot = self.snapshot();
            self.storage.set_game_state(&snapshot);
        }

        let metadata = self.metadata();
        self.actuator.actuate(&self.board, last, &metadata);
    }
}

impl<S: Storage, A: Actuator, R: Rng> InputHandler for Session<S, A, R> {
    fn on_move(&mut self, direction: Direction) {
        self.move_tiles(direction);
    }

    fn on_restart(&mut self) {
        self.restart();
    }

    fn on_keep_playing(&mut self) {
        self.keep_playing();
    }

    fn on_toggle_solver(&mut self) {
        self.toggle_solver();
    }

    fn on_rate_change(&mut self, change: RateChange) {
        self.change_rate(change);
    }
}

// =============================================================================
// Tests
// =============================================================================
