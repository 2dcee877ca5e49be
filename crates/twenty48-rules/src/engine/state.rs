use std::fmt;

use super::ops;
use super::source::SpawnSource;
use crate::error::EngineError;

/// Tile level stored in a cell: 0 for empty, `n` for a tile displayed as `2^n`.
pub type Tile = u32;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in wire-code order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector `(d_row, d_col)`; rows grow downward.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = EngineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(EngineError::InvalidDirection(other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// A `(row, col)` coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Contents of one board cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub value: Tile,
    /// Set by the merge step of the current move; cleared when the next move starts.
    pub merged_this_move: bool,
}

impl Cell {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value == 0
    }
}

/// One tile's displacement within a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub from: Position,
    pub to: Position,
    /// Level at `to` once this movement has been applied.
    pub value: Tile,
    pub merged: bool,
}

/// The movements of one move plus the board they produce.
///
/// Movements are listed in application order: each one's legality assumes the
/// earlier ones have already vacated their sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub movements: Vec<Movement>,
    pub board: Board,
}

impl MoveOutcome {
    /// Number of movements that merged into another tile.
    pub fn merges(&self) -> usize {
        self.movements.iter().filter(|m| m.merged).count()
    }

    /// True when no tile moved; such a move is not accepted and spawns nothing.
    pub fn is_noop(&self) -> bool {
        self.movements.is_empty()
    }
}

/// Result of trying to place a new tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SpawnResult {
    Spawned(Position),
    /// The board had no empty cell.
    NoSpawn,
}

impl SpawnResult {
    pub fn position(self) -> Option<Position> {
        match self {
            SpawnResult::Spawned(pos) => Some(pos),
            SpawnResult::NoSpawn => None,
        }
    }
}

/// A `rows x columns` grid of cells, stored row-major.
///
/// Dimensions never change after construction; every `(row, col)` inside them
/// has a cell.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board.
    ///
    /// ```
    /// use twenty48_rules::engine::Board;
    /// let b = Board::new(4, 4).unwrap();
    /// assert_eq!(b.empty_cells().count(), 16);
    /// assert!(Board::new(0, 4).is_err());
    /// ```
    pub fn new(rows: usize, columns: usize) -> Result<Self, EngineError> {
        if rows == 0 || columns == 0 {
            return Err(EngineError::EmptyDimensions { rows, columns });
        }
        Ok(Self {
            rows,
            columns,
            cells: vec![Cell::default(); rows * columns],
        })
    }

    /// Build a board from tile levels given row by row.
    ///
    /// ```
    /// use twenty48_rules::engine::Board;
    /// let b = Board::from_rows(vec![vec![1, 0], vec![0, 2]]).unwrap();
    /// assert_eq!(b.get(1, 1).unwrap().value, 2);
    /// ```
    pub fn from_rows(levels: Vec<Vec<Tile>>) -> Result<Self, EngineError> {
        let rows = levels.len();
        let columns = levels.first().map_or(0, Vec::len);
        let mut board = Self::new(rows, columns)?;
        for (row, line) in levels.into_iter().enumerate() {
            if line.len() != columns {
                return Err(EngineError::RaggedRows {
                    row,
                    expected: columns,
                    found: line.len(),
                });
            }
            for (col, value) in line.into_iter().enumerate() {
                board.cells[row * columns + col].value = value;
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, EngineError> {
        if row >= self.rows || col >= self.columns {
            return Err(EngineError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(row * self.columns + col)
    }

    /// Read a cell; fails with `OutOfBounds` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, EngineError> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Overwrite a cell. Only the coordinates are validated.
    pub fn set(
        &mut self,
        row: usize,
        col: usize,
        value: Tile,
        merged: bool,
    ) -> Result<(), EngineError> {
        let i = self.index(row, col)?;
        self.cells[i] = Cell {
            value,
            merged_this_move: merged,
        };
        Ok(())
    }

    // Internal accessors for positions already known to be on the board.
    #[inline]
    pub(crate) fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.row * self.columns + pos.col]
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        &mut self.cells[pos.row * self.columns + pos.col]
    }

    /// The adjacent position one step in `direction`, if it is on the board.
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<Position> {
        let (d_row, d_col) = direction.delta();
        let row = pos.row.checked_add_signed(d_row)?;
        let col = pos.col.checked_add_signed(d_col)?;
        (row < self.rows && col < self.columns).then_some(Position::new(row, col))
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |col| Position::new(row, col)))
    }

    /// Lazily enumerate the empty cells in row-major order.
    ///
    /// Recomputed on every call, so it always reflects the current contents.
    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |&pos| self.cell(pos).is_empty())
    }

    /// Clear every cell's merge flag.
    pub fn reset_merge_flags(&mut self) {
        for cell in &mut self.cells {
            cell.merged_this_move = false;
        }
    }

    /// Empty every cell, keeping the dimensions.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Iterate over tile levels in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().map(|c| c.value)
    }

    /// Tile levels as a row-major grid.
    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().map(|c| c.value).collect())
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Highest tile level on the board (0 when empty).
    pub fn highest_tile(&self) -> Tile {
        self.tiles().max().unwrap_or(0)
    }

    /// Slide/merge tiles in `direction` in place and return the movements.
    ///
    /// ```
    /// use twenty48_rules::engine::{Board, Direction};
    /// let mut b = Board::from_rows(vec![vec![1, 1, 0, 0]]).unwrap();
    /// let moves = b.apply_move(Direction::Left);
    /// assert_eq!(moves.len(), 1);
    /// assert_eq!(b.to_rows(), vec![vec![2, 0, 0, 0]]);
    /// ```
    pub fn apply_move(&mut self, direction: Direction) -> Vec<Movement> {
        ops::apply_move(self, direction)
    }

    /// Place a level-1 tile in a random empty cell chosen by `source`.
    pub fn spawn_tile<S: SpawnSource + ?Sized>(&mut self, source: &mut S) -> SpawnResult {
        ops::spawn_tile(self, source)
    }

    /// True if an empty cell or an axis-adjacent equal pair exists.
    pub fn has_legal_move(&self) -> bool {
        ops::has_legal_move(self)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("tiles", &self.to_rows())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(self.columns * 8 - 1);
        for (i, row) in self.cells.chunks(self.columns).enumerate() {
            if i > 0 {
                writeln!(f, "{separator}")?;
            }
            let line: Vec<String> = row.iter().map(|c| format_val(c.value)).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

/// Render a level as its displayed number, centred in a 7-wide field.
pub(crate) fn format_val(level: Tile) -> String {
    match level {
        0 => " ".repeat(7),
        n if n < 64 => format!("{:^7}", 1u64 << n),
        n => format!("{:^7}", format!("2^{n}")),
    }
}
