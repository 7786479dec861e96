//! The grid engine.
//!
//! A [`Board`] is a square matrix of optional [`Tile`]s stored in a flat,
//! row-major vector. Swipes mutate the board in place and return a
//! [`SwipeOutcome`] describing what moved and what merged, so renderers and
//! the solver never need per-tile bookkeeping fields.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::tile::{can_merge, is_valid_value, Position, Tile};
use crate::Direction;

/// Largest supported side length.
pub const MAX_SIZE: usize = 16;

/// The tile value that wins the game.
pub const WINNING_VALUE: u32 = 2048;

/// Probability that a spawned tile is a 2 rather than a 4.
const SPAWN_TWO_PROBABILITY: f32 = 0.9;

// =============================================================================
// Swipe diff
// =============================================================================

/// A tile that changed cells during a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileMove {
    pub from: Position,
    pub to: Position,
    /// Value of the tile before any merge.
    pub value: u32,
}

/// A tile created by merging two equal tiles during a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileMerge {
    pub position: Position,
    pub value: u32,
    /// Pre-swipe cells of the moving tile and the stationary tile, in that order.
    pub sources: [Position; 2],
}

/// Result of one swipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwipeOutcome {
    /// Whether any tile changed cells.
    pub moved: bool,
    /// Sum of the values of all tiles created by merges.
    pub score_delta: u32,
    /// Whether a merge produced the winning tile.
    pub reached_2048: bool,
    pub moves: Vec<TileMove>,
    pub merges: Vec<TileMerge>,
}

// =============================================================================
// Board
// =============================================================================

/// The game grid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardSnapshot", into = "BoardSnapshot")]
pub struct Board {
    size: usize,
    cells: Vec<Option<Tile>>,
}

impl Board {
    /// Create an empty board of `size` x `size` cells.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(Error::InvalidSize(size));
        }
        Ok(Board {
            size,
            cells: vec![None; size * size],
        })
    }

    /// Build a board from tile values given row by row (`rows[y][x]`).
    /// Zero marks an empty cell.
    ///
    /// ```
    /// use snake_2048_core::Board;
    ///
    /// let board = Board::from_rows(&[[2, 0], [0, 4]]).unwrap();
    /// assert_eq!(board.size(), 2);
    /// assert_eq!(board.tile_sum(), 6);
    /// ```
    pub fn from_rows<const N: usize>(rows: &[[u32; N]]) -> Result<Self> {
        if rows.len() != N {
            return Err(Error::InvalidSnapshot(format!(
                "{} rows of {} cells is not square",
                rows.len(),
                N
            )));
        }
        let mut board = Board::new(N)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    board.insert_tile(Tile::new(Position::new(x, y), value))?;
                }
            }
        }
        Ok(board)
    }

    /// Tile values row by row, with 0 for empty cells.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        (0..self.size)
            .map(|y| {
                (0..self.size)
                    .map(|x| self.cells[self.index(Position::new(x, y))].map_or(0, |t| t.value))
                    .collect()
            })
            .collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, position: Position) -> usize {
        position.y * self.size + position.x
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn within_bounds(&self, position: Position) -> bool {
        position.x < self.size && position.y < self.size
    }

    /// The tile at `position`, or `None` for an empty or off-board cell.
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        if self.within_bounds(position) {
            self.cells[self.index(position)].as_ref()
        } else {
            None
        }
    }

    /// Whether `position` is on the board and empty.
    pub fn is_cell_available(&self, position: Position) -> bool {
        self.within_bounds(position) && self.cells[self.index(position)].is_none()
    }

    /// All empty cells in row-major order.
    pub fn available_cells(&self) -> Vec<Position> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| Position::new(i % size, i / size))
            .collect()
    }

    /// Occupied cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().flatten()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.tiles().map(|t| t.value).max().unwrap_or(0)
    }

    pub fn tile_sum(&self) -> u64 {
        self.tiles().map(|t| u64::from(t.value)).sum()
    }

    /// Whether any cell is empty or any two orthogonal neighbours share a value.
    pub fn has_available_moves(&self) -> bool {
        if self.cells.iter().any(Option::is_none) {
            return true;
        }
        // Each horizontal and vertical pair is visited once: right and down neighbours only.
        for y in 0..self.size {
            for x in 0..self.size {
                let value = self.value_at(Position::new(x, y));
                if x + 1 < self.size && can_merge(value, self.value_at(Position::new(x + 1, y))) {
                    return true;
                }
                if y + 1 < self.size && can_merge(value, self.value_at(Position::new(x, y + 1))) {
                    return true;
                }
            }
        }
        false
    }

    fn value_at(&self, position: Position) -> u32 {
        self.cells[self.index(position)].map_or(0, |t| t.value)
    }

    /// Whether a swipe in `direction` would move at least one tile.
    pub fn can_swipe(&self, direction: Direction) -> bool {
        self.tiles().any(|tile| {
            match tile.position.step(direction).filter(|&p| self.within_bounds(p)) {
                Some(next) => match self.tile_at(next) {
                    None => true,
                    Some(other) => can_merge(other.value, tile.value),
                },
                None => false,
            }
        })
    }

    /// Directions in which a swipe would move something.
    pub fn legal_directions(&self) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|&d| self.can_swipe(d))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Place `tile` at its own position, replacing whatever was there.
    pub fn insert_tile(&mut self, tile: Tile) -> Result<()> {
        if !self.within_bounds(tile.position) {
            return Err(Error::InvalidSnapshot(format!(
                "tile position ({}, {}) is outside a {}x{} board",
                tile.x(),
                tile.y(),
                self.size,
                self.size
            )));
        }
        if !is_valid_value(tile.value) {
            return Err(Error::InvalidTile {
                x: tile.x(),
                y: tile.y(),
                value: tile.value,
            });
        }
        let idx = self.index(tile.position);
        self.cells[idx] = Some(tile);
        Ok(())
    }

    pub fn remove_tile(&mut self, position: Position) -> Option<Tile> {
        if !self.within_bounds(position) {
            return None;
        }
        let idx = self.index(position);
        self.cells[idx].take()
    }

    /// Place a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell.
    ///
    /// Returns `None` without touching the board when no cell is free.
    pub fn spawn_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Tile> {
        let available = self.available_cells();
        if available.is_empty() {
            return None;
        }

        let position = available[rng.gen_range(0..available.len())];
        let value = if rng.gen::<f32>() < SPAWN_TWO_PROBABILITY { 2 } else { 4 };
        let tile = Tile::new(position, value);
        let idx = self.index(position);
        self.cells[idx] = Some(tile);
        debug!(x = position.x, y = position.y, value, "spawned tile");
        Some(tile)
    }

    /// Slide every tile as far as possible in `direction`, merging equal
    /// neighbours once per destination cell.
    ///
    /// Does not spawn a new tile.
    pub fn swipe(&mut self, direction: Direction) -> SwipeOutcome {
        let mut outcome = SwipeOutcome::default();
        // Cells holding a tile produced by a merge during this swipe.
        let mut merged = vec![false; self.cells.len()];
        // Pre-swipe cell of the tile currently occupying each cell.
        let mut origins: Vec<Position> = (0..self.cells.len())
            .map(|i| Position::new(i % self.size, i / self.size))
            .collect();
        let (xs, ys) = self.traversals(direction);

        for &x in &xs {
            for &y in &ys {
                let from = Position::new(x, y);
                let tile = match self.cells[self.index(from)] {
                    Some(tile) => tile,
                    None => continue,
                };

                let (farthest, next) = self.farthest_position(from, direction);
                let target = next.filter(|&n| {
                    !merged[self.index(n)]
                        && self.tile_at(n).map_or(false, |other| can_merge(other.value, tile.value))
                });

                if let Some(target) = target {
                    let value = tile.value * 2;
                    let from_idx = self.index(from);
                    let target_idx = self.index(target);
                    self.cells[from_idx] = None;
                    self.cells[target_idx] = Some(Tile::new(target, value));
                    merged[target_idx] = true;

                    outcome.score_delta = outcome.score_delta.saturating_add(value);
                    if value == WINNING_VALUE {
                        outcome.reached_2048 = true;
                    }
                    outcome.moves.push(TileMove {
                        from,
                        to: target,
                        value: tile.value,
                    });
                    outcome.merges.push(TileMerge {
                        position: target,
                        value,
                        sources: [from, origins[target_idx]],
                    });
                    outcome.moved = true;
                } else if farthest != from {
                    let from_idx = self.index(from);
                    let to_idx = self.index(farthest);
                    self.cells[from_idx] = None;
                    self.cells[to_idx] = Some(Tile::new(farthest, tile.value));
                    origins[to_idx] = from;

                    outcome.moves.push(TileMove {
                        from,
                        to: farthest,
                        value: tile.value,
                    });
                    outcome.moved = true;
                }
            }
        }

        trace!(
            ?direction,
            moved = outcome.moved,
            score_delta = outcome.score_delta,
            merges = outcome.merges.len(),
            "swipe"
        );
        outcome
    }

    /// Column and row visiting order: cells farthest along `direction` first.
    fn traversals(&self, direction: Direction) -> (Vec<usize>, Vec<usize>) {
        let (dx, dy) = direction.vector();
        let mut xs: Vec<usize> = (0..self.size).collect();
        let mut ys: Vec<usize> = (0..self.size).collect();
        if dx == 1 {
            xs.reverse();
        }
        if dy == 1 {
            ys.reverse();
        }
        (xs, ys)
    }

    /// Walk from `from` along `direction` over empty cells.
    ///
    /// Returns the last empty cell reached (or `from` itself) and the first
    /// obstacle cell beyond it, which is `None` when the walk hit the edge.
    fn farthest_position(&self, from: Position, direction: Direction) -> (Position, Option<Position>) {
        let mut farthest = from;
        loop {
            match farthest.step(direction).filter(|&p| self.within_bounds(p)) {
                Some(next) if self.is_cell_available(next) => farthest = next,
                next => return (farthest, next),
            }
        }
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// The persistence form of the board. Per-swipe diffs are not part of it.
    pub fn serialize(&self) -> BoardSnapshot {
        BoardSnapshot::from(self.clone())
    }

    /// Rebuild a board from its persistence form.
    pub fn deserialize(snapshot: BoardSnapshot) -> Result<Self> {
        Board::try_from(snapshot)
    }
}

/// Serialized board: `cells[x][y]` is `null` or `{position: {x, y}, value}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: usize,
    pub cells: Vec<Vec<Option<Tile>>>,
}

impl From<Board> for BoardSnapshot {
    fn from(board: Board) -> Self {
        let cells = (0..board.size)
            .map(|x| {
                (0..board.size)
                    .map(|y| board.cells[board.index(Position::new(x, y))])
                    .collect()
            })
            .collect();
        BoardSnapshot {
            size: board.size,
            cells,
        }
    }
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = Error;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self> {
        let mut board = Board::new(snapshot.size)?;
        if snapshot.cells.len() != board.size {
            return Err(Error::InvalidSnapshot(format!(
                "expected {} columns, found {}",
                board.size,
                snapshot.cells.len()
            )));
        }
        for (x, column) in snapshot.cells.into_iter().enumerate() {
            if column.len() != board.size {
                return Err(Error::InvalidSnapshot(format!(
                    "column {} has {} cells, expected {}",
                    x,
                    column.len(),
                    board.size
                )));
            }
            for (y, cell) in column.into_iter().enumerate() {
                let Some(tile) = cell else { continue };
                if tile.position != Position::new(x, y) {
                    return Err(Error::InvalidSnapshot(format!(
                        "tile at cell ({}, {}) claims position ({}, {})",
                        x,
                        y,
                        tile.x(),
                        tile.y()
                    )));
                }
                board.insert_tile(tile)?;
            }
        }
        Ok(board)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ size: {} }}", self.size)?;
        for row in self.to_rows() {
            for val in row {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "------+".repeat(self.size));
        writeln!(f, "{}", border)?;
        for row in self.to_rows() {
            write!(f, "|")?;
            for val in row {
                if val == 0 {
                    write!(f, "      |")?;
                } else {
                    write!(f, "{:^6}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::MAX_TILE_VALUE as MAX;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn random_board(rng: &mut SmallRng, size: usize) -> Board {
        let mut board = Board::new(size).unwrap();
        for y in 0..size {
            for x in 0..size {
                if rng.gen_bool(0.6) {
                    let value = 1u32 << rng.gen_range(1..=6);
                    board.insert_tile(Tile::new(Position::new(x, y), value)).unwrap();
                }
            }
        }
        board
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_rejects_bad_size() {
        assert_eq!(Board::new(0).unwrap_err(), Error::InvalidSize(0));
        assert_eq!(
            Board::new(MAX_SIZE + 1).unwrap_err(),
            Error::InvalidSize(MAX_SIZE + 1)
        );
        assert!(Board::new(1).is_ok());
    }

    #[test]
    fn test_from_rows_rejects_bad_values() {
        assert!(matches!(
            Board::from_rows(&[[3, 0], [0, 0]]),
            Err(Error::InvalidTile { x: 0, y: 0, value: 3 })
        ));
        assert!(matches!(
            Board::from_rows(&[[2, 0, 0], [0, 0, 0]]),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_available_cells_row_major() {
        let board = Board::from_rows(&[[2, 0], [0, 4]]).unwrap();
        assert_eq!(
            board.available_cells(),
            vec![Position::new(1, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_queries() {
        let board = Board::from_rows(&[[2, 0], [0, 4]]).unwrap();
        assert_eq!(board.tile_at(Position::new(1, 1)).map(|t| t.value), Some(4));
        assert!(board.tile_at(Position::new(2, 0)).is_none());
        assert!(board.is_cell_available(Position::new(1, 0)));
        assert!(!board.is_cell_available(Position::new(0, 0)));
        assert!(!board.is_cell_available(Position::new(5, 5)));
        assert!(board.within_bounds(Position::new(1, 1)));
        assert!(!board.within_bounds(Position::new(2, 1)));
        assert_eq!(board.max_tile(), 4);
        assert_eq!(board.empty_count(), 2);
    }

    // -------------------------------------------------------------------------
    // Swipe
    // -------------------------------------------------------------------------

    #[test]
    fn test_swipe_right_merges_pair() {
        let mut board =
            Board::from_rows(&[[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]).unwrap();
        let outcome = board.swipe(Direction::Right);
        assert!(outcome.moved);
        assert_eq!(outcome.score_delta, 4);
        assert!(!outcome.reached_2048);
        assert_eq!(board.to_rows()[0], vec![0, 0, 0, 4]);
        assert_eq!(
            outcome.merges,
            vec![TileMerge {
                position: Position::new(3, 0),
                value: 4,
                sources: [Position::new(0, 0), Position::new(1, 0)],
            }]
        );
    }

    #[test]
    fn test_swipe_left_reaches_2048() {
        let mut board = Board::new(4).unwrap();
        board.insert_tile(Tile::new(Position::new(0, 0), 1024)).unwrap();
        board.insert_tile(Tile::new(Position::new(3, 0), 1024)).unwrap();
        let outcome = board.swipe(Direction::Left);
        assert!(outcome.moved);
        assert!(outcome.reached_2048);
        assert_eq!(outcome.score_delta, 2048);
        assert_eq!(board.tile_at(Position::new(0, 0)).map(|t| t.value), Some(2048));
        assert_eq!(board.tiles().count(), 1);
    }

    #[test]
    fn test_swipe_no_double_merge() {
        let mut board = Board::from_rows(&[[4, 2, 2, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let outcome = board.swipe(Direction::Left);
        assert_eq!(board.to_rows()[0], vec![4, 4, 0, 0]);
        assert_eq!(outcome.score_delta, 4);
    }

    #[test]
    fn test_swipe_four_equal_makes_two_merges() {
        let mut board = Board::from_rows(&[[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]).unwrap();
        let outcome = board.swipe(Direction::Right);
        assert_eq!(board.to_rows()[0], vec![0, 0, 4, 4]);
        assert_eq!(outcome.score_delta, 8);
        assert_eq!(outcome.merges.len(), 2);
    }

    #[test]
    fn test_swipe_all_directions() {
        let rows = [[2, 0, 2, 8], [2, 4, 0, 8], [0, 4, 2, 8], [0, 0, 0, 8]];

        let mut up = Board::from_rows(&rows).unwrap();
        assert_eq!(up.swipe(Direction::Up).score_delta, 4 + 8 + 4 + 32);
        assert_eq!(
            up.to_rows(),
            vec![vec![4, 8, 4, 16], vec![0, 0, 0, 16], vec![0; 4], vec![0; 4]]
        );

        let mut down = Board::from_rows(&rows).unwrap();
        assert_eq!(down.swipe(Direction::Down).score_delta, 4 + 8 + 4 + 32);
        assert_eq!(
            down.to_rows(),
            vec![vec![0; 4], vec![0; 4], vec![0, 0, 0, 16], vec![4, 8, 4, 16]]
        );

        let mut left = Board::from_rows(&rows).unwrap();
        assert_eq!(left.swipe(Direction::Left).score_delta, 4);
        assert_eq!(
            left.to_rows(),
            vec![vec![4, 8, 0, 0], vec![2, 4, 8, 0], vec![4, 2, 8, 0], vec![8, 0, 0, 0]]
        );
    }

    #[test]
    fn test_swipe_into_wall_is_noop() {
        let mut board = Board::from_rows(&[[2, 0], [4, 0]]).unwrap();
        let before = board.clone();
        let outcome = board.swipe(Direction::Left);
        assert!(!outcome.moved);
        assert_eq!(outcome.score_delta, 0);
        assert!(outcome.moves.is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_swipe_records_moves() {
        let mut board = Board::from_rows(&[[0, 0, 8], [0, 0, 0], [0, 0, 0]]).unwrap();
        let outcome = board.swipe(Direction::Down);
        assert_eq!(
            outcome.moves,
            vec![TileMove {
                from: Position::new(2, 0),
                to: Position::new(2, 2),
                value: 8,
            }]
        );
        assert!(outcome.merges.is_empty());
    }

    #[test]
    fn test_swipe_keeps_positions_in_sync() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut board = random_board(&mut rng, 5);
            board.swipe(Direction::all()[rng.gen_range(0..4)]);
            for y in 0..5 {
                for x in 0..5 {
                    if let Some(tile) = board.tile_at(Position::new(x, y)) {
                        assert_eq!(tile.position, Position::new(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn test_swipe_merge_conservation() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..500 {
            let mut board = random_board(&mut rng, 4);
            let sum_before = board.tile_sum();
            let outcome = board.swipe(Direction::all()[rng.gen_range(0..4)]);
            let merged_total: u32 = outcome.merges.iter().map(|m| m.value).sum();
            assert_eq!(outcome.score_delta, merged_total);
            // Merging A + A into 2A leaves the board sum unchanged.
            assert_eq!(board.tile_sum(), sum_before);
        }
    }

    #[test]
    fn test_swipe_at_most_one_merge_per_destination() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let mut board = random_board(&mut rng, 4);
            let outcome = board.swipe(Direction::all()[rng.gen_range(0..4)]);
            let destinations: Vec<Position> = outcome.merges.iter().map(|m| m.position).collect();
            for (i, merge) in outcome.merges.iter().enumerate() {
                assert_eq!(
                    destinations.iter().filter(|&&p| p == merge.position).count(),
                    1
                );
                // A merged tile never feeds a second merge: the moving source
                // cannot be another merge's destination.
                assert!(!destinations[..i].contains(&merge.sources[0]));
            }
        }
    }

    /// Whether some tile could merge with its neighbour one step in `direction`.
    fn has_adjacent_pair(board: &Board, direction: Direction) -> bool {
        board.tiles().any(|tile| {
            tile.position
                .step(direction)
                .filter(|&p| board.within_bounds(p))
                .and_then(|p| board.tile_at(p))
                .map_or(false, |other| can_merge(other.value, tile.value))
        })
    }

    #[test]
    fn test_swipe_twice_only_moves_on_new_pairs() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..300 {
            let mut board = random_board(&mut rng, 4);
            let direction = Direction::all()[rng.gen_range(0..4)];
            board.swipe(direction);
            let pair = has_adjacent_pair(&board, direction);
            let second = board.swipe(direction);
            // After one swipe every line is packed, so only a fresh pair can move anything.
            assert_eq!(second.moved, pair);
            assert_eq!(second.moves.is_empty(), second.merges.is_empty());
        }
    }

    #[test]
    fn test_swipe_twice_merges_pair_created_by_first() {
        let mut board = Board::from_rows(&[[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]).unwrap();

        let first = board.swipe(Direction::Left);
        assert!(first.moved);
        assert_eq!(board.to_rows()[0], vec![4, 4, 0, 0]);

        let second = board.swipe(Direction::Left);
        assert!(second.moved);
        assert_eq!(second.score_delta, 8);
        assert_eq!(board.to_rows()[0], vec![8, 0, 0, 0]);

        let third = board.swipe(Direction::Left);
        assert!(!third.moved);
    }

    #[test]
    fn test_largest_tiles_do_not_merge() {
        let mut board = Board::from_rows(&[[MAX, MAX], [0, 0]]).unwrap();
        assert!(!board.can_swipe(Direction::Left));
        assert!(!board.can_swipe(Direction::Right));

        let outcome = board.swipe(Direction::Left);
        assert!(!outcome.moved);
        assert_eq!(outcome.score_delta, 0);
        assert_eq!(board.to_rows(), vec![vec![MAX, MAX], vec![0, 0]]);

        let full = Board::from_rows(&[[MAX, MAX], [MAX, MAX]]).unwrap();
        assert!(!full.has_available_moves());
    }

    #[test]
    fn test_merge_up_to_largest_value() {
        let half = MAX / 2;
        let mut board = Board::from_rows(&[[half, half], [0, 0]]).unwrap();
        let outcome = board.swipe(Direction::Left);
        assert_eq!(outcome.score_delta, MAX);
        assert_eq!(board.to_rows()[0], vec![MAX, 0]);
    }

    #[test]
    fn test_can_swipe_matches_swipe() {
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..300 {
            let board = random_board(&mut rng, 4);
            for direction in Direction::all() {
                let mut copy = board.clone();
                assert_eq!(board.can_swipe(direction), copy.swipe(direction).moved);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Available moves
    // -------------------------------------------------------------------------

    #[test]
    fn test_full_board_without_pairs_is_stuck() {
        let board = Board::from_rows(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]])
            .unwrap();
        assert!(!board.has_available_moves());
        assert!(board.legal_directions().is_empty());
    }

    #[test]
    fn test_full_board_with_horizontal_pair() {
        let board =
            Board::from_rows(&[[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]])
                .unwrap();
        assert!(board.has_available_moves());
    }

    #[test]
    fn test_full_board_with_vertical_pair_in_last_column() {
        let board = Board::from_rows(&[[2, 4, 8, 16], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 64]])
            .unwrap();
        assert!(board.has_available_moves());
        let board = Board::from_rows(&[[2, 4, 8, 16], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 2, 64]])
            .unwrap();
        assert!(board.has_available_moves());
    }

    #[test]
    fn test_empty_cell_means_moves_available() {
        let board = Board::from_rows(&[[2, 4], [4, 0]]).unwrap();
        assert!(board.has_available_moves());
    }

    // -------------------------------------------------------------------------
    // Spawn
    // -------------------------------------------------------------------------

    #[test]
    fn test_spawn_on_full_board_is_noop() {
        let mut board = Board::from_rows(&[[2, 4], [4, 2]]).unwrap();
        let before = board.clone();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(board.spawn_random_tile(&mut rng).is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn test_spawn_determinism() {
        let mut a = Board::new(4).unwrap();
        let mut b = Board::new(4).unwrap();
        let mut rng_a = SmallRng::seed_from_u64(12345);
        let mut rng_b = SmallRng::seed_from_u64(12345);
        for _ in 0..10 {
            assert_eq!(a.spawn_random_tile(&mut rng_a), b.spawn_random_tile(&mut rng_b));
        }
        assert_eq!(a, b);
        assert_eq!(a.empty_count(), 6);
    }

    #[test]
    fn test_spawn_values_are_two_or_four() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut fours = 0;
        for _ in 0..1000 {
            let mut board = Board::new(3).unwrap();
            let tile = board.spawn_random_tile(&mut rng).unwrap();
            assert!(tile.value == 2 || tile.value == 4);
            assert_eq!(board.tile_at(tile.position), Some(&tile));
            if tile.value == 4 {
                fours += 1;
            }
        }
        assert!(fours > 50 && fours < 150, "fours = {}", fours);
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    #[test]
    fn test_snapshot_round_trip_sizes() {
        let mut rng = SmallRng::seed_from_u64(2024);
        for size in 2..=8 {
            for _ in 0..20 {
                let board = random_board(&mut rng, size);
                let restored = Board::deserialize(board.serialize()).unwrap();
                assert_eq!(restored, board);
            }
        }
    }

    #[test]
    fn test_snapshot_json_shape() {
        let board = Board::from_rows(&[[2, 0], [0, 0]]).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "size": 2,
                "cells": [
                    [{"position": {"x": 0, "y": 0}, "value": 2}, null],
                    [null, null]
                ]
            })
        );
        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_snapshot_rejects_position_mismatch() {
        let snapshot = BoardSnapshot {
            size: 2,
            cells: vec![
                vec![Some(Tile::new(Position::new(1, 1), 2)), None],
                vec![None, None],
            ],
        };
        assert!(matches!(
            Board::deserialize(snapshot),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_wrong_shape() {
        let snapshot = BoardSnapshot {
            size: 3,
            cells: vec![vec![None; 3], vec![None; 3]],
        };
        assert!(Board::deserialize(snapshot).is_err());
        let json = serde_json::json!({"size": 0, "cells": []});
        assert!(serde_json::from_value::<Board>(json).is_err());
    }

    #[test]
    fn test_display_format() {
        let board = Board::from_rows(&[[2, 0], [0, 2048]]).unwrap();
        let display = format!("{}", board);
        assert!(display.contains("+------+------+"));
        assert!(display.contains("2048"));
    }
}
