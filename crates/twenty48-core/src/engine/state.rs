use rand::Rng;
use std::fmt;
use std::str::FromStr;

use super::ops;
use crate::error::{GridError, ParseMoveError};
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

// Internal type aliases for packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u64;
pub(crate) type Tile = u64;
pub type Score = u64;

/// Largest exponent a nibble can hold (tile 32768).
pub const MAX_EXPONENT: Tile = 15;

/// Probability of a spawned tile being a 4 unless a policy says otherwise.
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All directions, in the order used by legal-move masks.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses direction names and browser key names.
///
/// ```
/// use twenty48_core::engine::Move;
/// assert_eq!("ArrowLeft".parse::<Move>().unwrap(), Move::Left);
/// assert_eq!("UP".parse::<Move>().unwrap(), Move::Up);
/// assert!("q".parse::<Move>().is_err());
/// ```
impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let name = key.strip_prefix("arrow").unwrap_or(&key);
        match name {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// A tile placed by the spawner: row-major cell index and tile value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Spawn {
    pub index: usize,
    pub value: u32,
}

impl Spawn {
    pub fn row(&self) -> usize {
        self.index / 4
    }

    pub fn col(&self) -> usize {
        self.index % 4
    }
}

/// Packed 4x4 2048 board as 16 4-bit nibbles in a `u64`.
///
/// Each nibble holds a tile exponent (0 empty, 1 for 2, 2 for 4, ...),
/// row-major with the top-left cell in the most significant nibble.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(pub(crate) BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Pack a grid of tile values.
    ///
    /// Every value must be 0 or a power of two between 2 and 32768.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::from_grid(&[[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(b.raw(), 0x1000_0000_0000_0002);
    /// assert!(Board::from_grid(&[[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_grid(grid: &Grid) -> Result<Self, GridError> {
        let mut raw: BoardRaw = 0;
        for (row, cells) in grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let exponent = value_to_exponent(value)
                    .ok_or(GridError::UnrepresentableTile { row, col, value })?;
                raw |= exponent << (60 - 4 * (row * 4 + col));
            }
        }
        Ok(Board(raw))
    }

    /// Unpack into a grid of tile values.
    pub fn to_grid(self) -> Grid {
        std::array::from_fn(|row| std::array::from_fn(|col| self.tile_value(row * 4 + col)))
    }

    /// Tile values in row-major order.
    pub fn row_major(self) -> [u32; 16] {
        std::array::from_fn(|idx| self.tile_value(idx))
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Move};
    /// let b = Board::from_raw(0x1100_0000_0000_0000);
    /// assert_eq!(b.shift(Move::Right), Board::from_raw(0x0002_0000_0000_0000));
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        ops::shift(self, dir)
    }

    /// Like [`Board::shift`], also returning the merge score earned.
    #[inline]
    pub fn shift_scored(self, dir: Move) -> (Self, Score) {
        ops::shift_scored(self, dir)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.with_spawn(rng, DEFAULT_FOUR_PROBABILITY).0
    }

    /// Place one tile into a uniformly chosen empty cell.
    ///
    /// The tile is a 4 with probability `four_probability`, otherwise a 2.
    /// A full board is returned unchanged with no spawn and no RNG draws.
    pub fn with_spawn<R: Rng + ?Sized>(self, rng: &mut R, four_probability: f64) -> (Self, Option<Spawn>) {
        let empty = self.count_empty();
        if empty == 0 {
            return (self, None);
        }
        let mut index = rng.gen_range(0..empty);
        let exponent = ops::generate_random_tile(rng, four_probability);
        // Walk empty nibbles from the least significant end until the chosen one.
        let mut tmp = self.0;
        let mut nibble = 0;
        loop {
            while (tmp & 0xf) != 0 {
                tmp >>= 4;
                nibble += 1;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp >>= 4;
            nibble += 1;
        }
        let spawn = Spawn {
            index: 15 - nibble,
            value: 1 << exponent,
        };
        (Board(self.0 | (exponent << (4 * nibble))), Some(spawn))
    }

    /// Return true if no legal moves remain.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// // Nothing slides on an empty board, so it reads as game over here even
    /// // though a session would not call it terminal.
    /// assert!(Board::EMPTY.is_game_over());
    /// assert!(!Board::EMPTY.is_terminal());
    /// ```
    #[inline]
    pub fn is_game_over(self) -> bool {
        ops::is_game_over(self)
    }

    /// Full board with no equal neighbours in any row or column.
    #[inline]
    pub fn is_terminal(self) -> bool {
        ops::is_terminal(self)
    }

    /// Which moves would change the board, in [`Move::ALL`] order.
    #[inline]
    pub fn legal_moves(self) -> [bool; 4] {
        ops::legal_moves(self)
    }

    /// Return the highest tile value (e.g., 2048) present on the board.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::get_highest_tile_val(self)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        ops::count_empty(self)
    }

    /// Get the actual value at index (2^exponent stored at nibble).
    ///
    /// Index runs 0..16 row-major.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        ops::get_tile_val(self, idx)
    }

    /// Iterate over tile exponents (nibbles) in row-major order.
    /// Returns 0 for empty, 1 for 2, 2 for 4, etc.
    #[inline]
    pub fn tiles(self) -> TilesIter {
        TilesIter {
            raw: self.0,
            idx: 0,
        }
    }
}

fn value_to_exponent(value: u32) -> Option<Tile> {
    match value {
        0 => Some(0),
        v if v >= 2 && v.is_power_of_two() && u64::from(v.trailing_zeros()) <= MAX_EXPONENT => {
            Some(u64::from(v.trailing_zeros()))
        }
        _ => None,
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<_> = self.tiles().map(ops::format_val).collect();
        for (row, chunk) in cells.chunks(4).enumerate() {
            if row > 0 {
                writeln!(f, "{}", "-".repeat(31))?;
            }
            writeln!(f, "{}", chunk.join("|"))?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board {
    fn from(v: BoardRaw) -> Self {
        Board::from_raw(v)
    }
}

impl TryFrom<Grid> for Board {
    type Error = GridError;

    fn try_from(grid: Grid) -> Result<Self, Self::Error> {
        Board::from_grid(&grid)
    }
}

/// Iterator over board tiles (exponents) in row-major order.
pub struct TilesIter {
    raw: BoardRaw,
    idx: usize,
}

impl Iterator for TilesIter {
    type Item = u8;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= 16 {
            return None;
        }
        let n = ((self.raw >> (60 - (4 * self.idx))) & 0xf) as u8;
        self.idx += 1;
        Some(n)
    }
}

impl IntoIterator for Board {
    type Item = u8;
    type IntoIter = TilesIter;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn grid_round_trips_through_packing() {
        let grid = [[2, 4, 8, 16], [0, 0, 0, 0], [32768, 0, 2048, 0], [0, 0, 0, 2]];
        let board = Board::from_grid(&grid).unwrap();
        assert_eq!(board.to_grid(), grid);
        assert_eq!(board.row_major()[8], 32768);
        assert_eq!(board.highest_tile(), 32768);
    }

    #[test]
    fn from_grid_rejects_unrepresentable_values() {
        let mut grid = [[0; 4]; 4];
        grid[1][2] = 1;
        assert_eq!(
            Board::from_grid(&grid),
            Err(GridError::UnrepresentableTile {
                row: 1,
                col: 2,
                value: 1
            })
        );
        grid[1][2] = 65536;
        assert!(Board::from_grid(&grid).is_err());
        grid[1][2] = 6;
        assert!(Board::from_grid(&grid).is_err());
    }

    #[test]
    fn spawn_lands_on_an_empty_cell() {
        let start = Board::from_raw(0x1111_1111_1111_1110);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (board, spawn) = start.with_spawn(&mut rng, 0.0);
            assert_eq!(spawn, Some(Spawn { index: 15, value: 2 }));
            assert_eq!(board.count_empty(), 0);
        }
    }

    #[test]
    fn spawn_reports_its_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = Board::EMPTY;
        for _ in 0..16 {
            let (next, spawn) = board.with_spawn(&mut rng, 0.5);
            let spawn = spawn.unwrap();
            assert_eq!(board.tile_value(spawn.index), 0);
            assert_eq!(next.tile_value(spawn.index), spawn.value);
            assert!(spawn.value == 2 || spawn.value == 4);
            board = next;
        }
        assert_eq!(board.with_spawn(&mut rng, 0.5), (board, None));
    }

    #[test]
    fn four_probability_one_always_spawns_fours() {
        let mut rng = StdRng::seed_from_u64(3);
        let (_, spawn) = Board::EMPTY.with_spawn(&mut rng, 1.0);
        assert_eq!(spawn.map(|s| s.value), Some(4));
    }

    #[test]
    fn spawns_are_uniform_over_empty_cells() {
        let grid = [[2, 0, 4, 0], [0, 8, 0, 0], [0, 0, 0, 16], [0, 0, 32, 0]];
        let board = Board::from_grid(&grid).unwrap();
        let empty = board.count_empty() as usize;
        assert_eq!(empty, 11);

        let draws = 110_000;
        let mut rng = StdRng::seed_from_u64(2048);
        let mut hits = [0usize; 16];
        let mut fours = 0;
        for _ in 0..draws {
            let (next, spawn) = board.with_spawn(&mut rng, DEFAULT_FOUR_PROBABILITY);
            let spawn = spawn.unwrap();
            assert_eq!(next.tile_value(spawn.index), spawn.value);
            hits[spawn.index] += 1;
            if spawn.value == 4 {
                fours += 1;
            }
        }

        let expected = draws / empty;
        for (idx, &count) in hits.iter().enumerate() {
            if board.tile_value(idx) != 0 {
                assert_eq!(count, 0, "occupied cell {idx} was picked");
            } else {
                assert!(count.abs_diff(expected) < expected / 20, "cell {idx}: {count} hits");
            }
        }
        let share = fours as f64 / draws as f64;
        assert!((share - DEFAULT_FOUR_PROBABILITY).abs() < 0.01, "four share {share}");
    }

    #[test]
    fn parses_moves_and_keys() {
        assert_eq!("left".parse::<Move>(), Ok(Move::Left));
        assert_eq!(" ArrowDown ".parse::<Move>(), Ok(Move::Down));
        assert_eq!("arrowright".parse::<Move>(), Ok(Move::Right));
        assert_eq!("q".parse::<Move>(), Err(ParseMoveError("q".to_string())));
        assert!("arrow".parse::<Move>().is_err());
    }

    #[test]
    fn display_has_four_rows() {
        let text = Board::from_raw(0x1000_0000_0000_000b).to_string();
        assert_eq!(text.lines().count(), 7);
        assert!(text.contains("2048"));
    }
}
