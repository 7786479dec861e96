//! Corner-anchored snake solver
//!
//! A search-free heuristic that keeps the largest tiles packed into one
//! corner and merges along a serpentine path away from it:
//! - A fixed corner frame: the corner cell, a grow vector running along one
//!   edge and a normal vector running along the other
//! - A recursive walk from the corner that returns the first merge it finds
//! - A fallback policy that prefers the axis with the smaller immediate merge
//!   gain, so large merges are not forced early

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::tile::{can_merge, Position, Tile};
use crate::{Axis, Board, Direction};

// =============================================================================
// Types and Constants
// =============================================================================

/// Default auto-play rate, in moves per second.
pub const DEFAULT_RATE: f64 = 1.0;
/// Multiplier applied by one rate step.
pub const RATE_FACTOR: f64 = 1.5;
pub const MIN_RATE: f64 = 0.1;
pub const MAX_RATE: f64 = 60.0;

/// The board corner the solver anchors its largest tile in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// The corner's cell on a board of side `size`.
    pub fn cell(self, size: usize) -> Position {
        let last = size - 1;
        match self {
            Corner::TopLeft => Position::new(0, 0),
            Corner::TopRight => Position::new(last, 0),
            Corner::BottomRight => Position::new(last, last),
            Corner::BottomLeft => Position::new(0, last),
        }
    }

    /// The direction leading from this corner into the board along `axis`.
    fn inward(self, axis: Axis) -> Direction {
        match (self, axis) {
            (Corner::TopLeft, Axis::Horizontal) => Direction::Right,
            (Corner::TopLeft, Axis::Vertical) => Direction::Down,
            (Corner::TopRight, Axis::Horizontal) => Direction::Left,
            (Corner::TopRight, Axis::Vertical) => Direction::Down,
            (Corner::BottomRight, Axis::Horizontal) => Direction::Left,
            (Corner::BottomRight, Axis::Vertical) => Direction::Up,
            (Corner::BottomLeft, Axis::Horizontal) => Direction::Right,
            (Corner::BottomLeft, Axis::Vertical) => Direction::Up,
        }
    }
}

/// The normal vector completing the frame at `corner` for a grow vector.
///
/// `grow` must lead from the corner into the board; the normal then runs
/// inward along the other edge.
pub fn normal_vector(corner: Corner, grow: Direction) -> Result<Direction> {
    if corner.inward(grow.axis()) != grow {
        return Err(Error::InvalidFrame { corner, grow });
    }
    let other = match grow.axis() {
        Axis::Horizontal => Axis::Vertical,
        Axis::Vertical => Axis::Horizontal,
    };
    Ok(corner.inward(other))
}

/// Solver settings. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub corner: Corner,
    pub grow: Direction,
    /// Initial auto-play rate in moves per second.
    pub rate: f64,
    pub rate_factor: f64,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            corner: Corner::BottomLeft,
            grow: Direction::Up,
            rate: DEFAULT_RATE,
            rate_factor: RATE_FACTOR,
            min_rate: MIN_RATE,
            max_rate: MAX_RATE,
        }
    }
}

// =============================================================================
// Solver
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Solver {
    corner: Corner,
    grow: Direction,
    normal: Direction,
    rate: f64,
    rate_factor: f64,
    min_rate: f64,
    max_rate: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            corner: Corner::BottomLeft,
            grow: Direction::Up,
            normal: Direction::Right,
            rate: DEFAULT_RATE,
            rate_factor: RATE_FACTOR,
            min_rate: MIN_RATE,
            max_rate: MAX_RATE,
        }
    }
}

impl Solver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        let normal = normal_vector(config.corner, config.grow)?;
        let rates = [config.rate, config.rate_factor, config.min_rate, config.max_rate];
        if rates.iter().any(|r| !r.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "rate settings {:?} must be finite",
                rates
            )));
        }
        if config.min_rate <= 0.0 || config.min_rate > config.max_rate {
            return Err(Error::InvalidConfig(format!(
                "rate bounds [{}, {}] must be positive and ordered",
                config.min_rate, config.max_rate
            )));
        }
        if config.rate_factor <= 1.0 {
            return Err(Error::InvalidConfig(format!(
                "rate factor {} must be greater than 1",
                config.rate_factor
            )));
        }
        Ok(Solver {
            corner: config.corner,
            grow: config.grow,
            normal,
            rate: config.rate.clamp(config.min_rate, config.max_rate),
            rate_factor: config.rate_factor,
            min_rate: config.min_rate,
            max_rate: config.max_rate,
        })
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn grow(&self) -> Direction {
        self.grow
    }

    pub fn normal(&self) -> Direction {
        self.normal
    }

    // -------------------------------------------------------------------------
    // Rate
    // -------------------------------------------------------------------------

    /// Auto-play rate in moves per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn increase_rate(&mut self) {
        self.rate = (self.rate * self.rate_factor).min(self.max_rate);
    }

    pub fn decrease_rate(&mut self) {
        self.rate = (self.rate / self.rate_factor).max(self.min_rate);
    }

    /// Delay between two auto-play moves at the current rate.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate)
    }

    // -------------------------------------------------------------------------
    // Decision
    // -------------------------------------------------------------------------

    /// Pick a swipe direction for `board`.
    ///
    /// Always returns a direction. On a board with no legal move the result
    /// is the default policy's first preference, which will not move anything.
    pub fn choose_direction(&self, board: &Board) -> Direction {
        let corner = self.corner.cell(board.size());
        let direction = self.best_direction(board, corner, self.grow, None, 0);
        debug!(?direction, "solver decision");
        direction
    }

    /// Like [`choose_direction`](Self::choose_direction), but rejects a board
    /// on which no move is possible.
    pub fn try_choose_direction(&self, board: &Board) -> Result<Direction> {
        if !board.has_available_moves() {
            return Err(Error::NoLegalMove);
        }
        Ok(self.choose_direction(board))
    }

    /// Walk the snake path from `position`.
    ///
    /// `grow` flips each time the walk wraps around an edge. `merge` is the
    /// first gap-separated merge seen on the way, offered to the default
    /// policy when the walk dead-ends.
    fn best_direction(
        &self,
        board: &Board,
        position: Position,
        grow: Direction,
        merge: Option<Direction>,
        depth: usize,
    ) -> Direction {
        // Every step enters a cell not visited before.
        if depth >= board.size() * board.size() {
            return self.default_direction(board, merge);
        }

        let tile = match board.tile_at(position) {
            Some(tile) => *tile,
            None => {
                if position == self.corner.cell(board.size()) {
                    let pull = self.grow.reverse();
                    if board.can_swipe(pull) {
                        return pull;
                    }
                }
                return self.default_direction(board, merge);
            }
        };

        let normal_cell = neighbour(board, position, self.normal);
        let grow_cell = neighbour(board, position, grow);

        if value_at(board, normal_cell).map_or(false, |v| can_merge(v, tile.value)) {
            return self.normal.reverse();
        }
        if value_at(board, grow_cell).map_or(false, |v| can_merge(v, tile.value)) {
            return grow.reverse();
        }

        let merge = merge
            .or_else(|| gap_merge(board, &tile, self.normal))
            .or_else(|| gap_merge(board, &tile, grow));

        match (grow_cell, normal_cell) {
            (Some(g), Some(n)) => {
                let grow_value = value_at(board, Some(g)).unwrap_or(0);
                let normal_value = value_at(board, Some(n)).unwrap_or(0);
                if grow_value <= normal_value {
                    self.best_direction(board, g, grow, merge, depth + 1)
                } else {
                    self.best_direction(board, n, grow, merge, depth + 1)
                }
            }
            (Some(g), None) => self.best_direction(board, g, grow, merge, depth + 1),
            (None, Some(n)) => self.best_direction(board, n, grow.reverse(), merge, depth + 1),
            (None, None) => self.default_direction(board, merge),
        }
    }

    /// Fallback when the walk yields no decision.
    ///
    /// Prefers the axis whose immediate merges gain the least, then the frame
    /// order reverse-normal, reverse-grow, grow, normal among legal moves. A
    /// pending merge wins over a choice on the other axis, which would shift
    /// it out of line.
    fn default_direction(&self, board: &Board, merge: Option<Direction>) -> Direction {
        let priority = [
            self.normal.reverse(),
            self.grow.reverse(),
            self.grow,
            self.normal,
        ];
        let legal = board.legal_directions();
        if legal.is_empty() {
            warn!("no legal move; returning default preference");
            return priority[0];
        }

        let vertical = merge_gain(board, Axis::Vertical);
        let horizontal = merge_gain(board, Axis::Horizontal);
        let least = vertical.min(horizontal);
        let gain = |axis: Axis| match axis {
            Axis::Vertical => vertical,
            Axis::Horizontal => horizontal,
        };

        let chosen = priority
            .iter()
            .copied()
            .find(|d| gain(d.axis()) == least && legal.contains(d))
            .or_else(|| priority.iter().copied().find(|d| legal.contains(d)))
            .unwrap_or(legal[0]);

        match merge {
            Some(m) if m.axis() != chosen.axis() && legal.contains(&m) => m,
            _ => chosen,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn neighbour(board: &Board, position: Position, direction: Direction) -> Option<Position> {
    position
        .step(direction)
        .filter(|&p| board.within_bounds(p))
}

fn value_at(board: &Board, position: Option<Position>) -> Option<u32> {
    position.and_then(|p| board.tile_at(p)).map(|t| t.value)
}

/// A merge with the nearest tile along `direction` across at least one gap.
fn gap_merge(board: &Board, tile: &Tile, direction: Direction) -> Option<Direction> {
    let first = neighbour(board, tile.position, direction)?;
    if board.tile_at(first).is_some() {
        return None;
    }
    let mut cell = first;
    while let Some(next) = neighbour(board, cell, direction) {
        if let Some(other) = board.tile_at(next) {
            return can_merge(other.value, tile.value).then(|| direction.reverse());
        }
        cell = next;
    }
    None
}

/// Score an immediate swipe along `axis` would earn. Both directions of an
/// axis merge the same pairs' worth of value.
fn merge_gain(board: &Board, axis: Axis) -> u32 {
    let direction = match axis {
        Axis::Vertical => Direction::Up,
        Axis::Horizontal => Direction::Left,
    };
    let mut trial = board.clone();
    trial.swipe(direction).score_delta
}

// =============================================================================
// Tests
// =============================================================================
