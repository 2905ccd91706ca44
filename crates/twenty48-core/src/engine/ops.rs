use rand::Rng;

use super::state::{Board, BoardRaw, Line, Move, Score, Tile, MAX_EXPONENT};
use super::tables::{line_entry, merge_score_entry, stores};

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: Board, direction: Move) -> Board {
    shift_scored(board, direction).0
}

/// Slide/merge tiles and report the sum of the tiles produced by merges.
pub fn shift_scored(board: Board, direction: Move) -> (Board, Score) {
    match direction {
        Move::Left | Move::Right => shift_rows(board, direction),
        Move::Up | Move::Down => shift_cols(board, direction),
    }
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

/// Return the cell's actual value (0 if empty), e.g., 2, 4, 8, ...
pub fn get_tile_val(board: Board, idx: usize) -> u32 {
    match get_tile(board, idx) {
        0 => 0,
        exp => 1 << exp,
    }
}

/// True if no move in any direction changes the board.
///
/// An empty board counts as game over here; session terminal checks
/// additionally require a full board, see [`is_terminal`].
pub fn is_game_over(board: Board) -> bool {
    Move::ALL
        .into_iter()
        .all(|direction| shift(board, direction) == board)
}

/// True if the board is full and no two neighbours in any row or column are equal.
pub fn is_terminal(board: Board) -> bool {
    count_empty(board) == 0 && is_game_over(board)
}

/// Which moves would change the board, in [`Move::ALL`] order.
pub fn legal_moves(board: Board) -> [bool; 4] {
    Move::ALL.map(|direction| shift(board, direction) != board)
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
/// Count the number of zero tiles.
pub fn count_empty(board: Board) -> u64 {
    16 - count_non_empty(board)
}

/// Draw a tile exponent: 2 (a "4") with `four_probability`, else 1 (a "2").
pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R, four_probability: f64) -> Tile {
    if rng.gen_bool(four_probability) {
        2
    } else {
        1
    }
}

fn shift_rows(board: Board, move_dir: Move) -> (Board, Score) {
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Right => &s.shift_right,
        _ => &s.shift_left,
    };
    let (res, score) = (0..4).fold((0, 0), |(new_board, score), row_idx| {
        let row_val = extract_line(board.0, row_idx) as u16;
        let new_row_val = line_entry(table, row_val);
        (
            new_board | (new_row_val << (48 - (16 * row_idx))),
            score + merge_score_entry(row_val),
        )
    });
    (Board(res), score)
}

fn shift_cols(board: Board, move_dir: Move) -> (Board, Score) {
    let transpose_board = transpose(board.0);
    let s = stores();
    let table: &[u64] = match move_dir {
        Move::Down => &s.shift_down,
        _ => &s.shift_up,
    };
    let (res, score) = (0..4).fold((0, 0), |(new_board, score), col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as u16;
        let new_col_val = line_entry(table, col_val);
        (
            new_board | (new_col_val << (12 - (4 * col_idx))),
            score + merge_score_entry(col_val),
        )
    });
    (Board(res), score)
}

pub(crate) fn line_to_tiles(line: Line) -> [Tile; 4] {
    std::array::from_fn(|tile_idx| (line >> ((3 - tile_idx) * 4)) & 0xf)
}

/// Shifted form of a single packed line, laid out for its table.
pub(crate) fn shift_line(line: Line, direction: Move) -> Line {
    let tiles = line_to_tiles(line);
    let shifted = match direction {
        Move::Left | Move::Up => merge_toward_front(tiles).0,
        Move::Right | Move::Down => merge_toward_back(tiles).0,
    };
    match direction {
        Move::Left | Move::Right => tiles_to_row(shifted),
        Move::Up | Move::Down => tiles_to_col(shifted),
    }
}

pub(crate) fn line_merge_score(line: Line) -> Score {
    merge_toward_front(line_to_tiles(line)).1
}

fn tiles_to_row(tiles: [Tile; 4]) -> Line {
    tiles[0] << 12 | tiles[1] << 8 | tiles[2] << 4 | tiles[3]
}

fn tiles_to_col(tiles: [Tile; 4]) -> Line {
    tiles[0] << 48 | tiles[1] << 32 | tiles[2] << 16 | tiles[3]
}

fn merge_toward_back(mut tiles: [Tile; 4]) -> ([Tile; 4], Score) {
    tiles.reverse();
    let (mut merged, score) = merge_toward_front(tiles);
    merged.reverse();
    (merged, score)
}

/// Compact toward index 0, merge equal neighbours once, and re-compact.
///
/// A tile produced by a merge is never merged again in the same pass,
/// and two tiles at `MAX_EXPONENT` stay apart.
fn merge_toward_front(tiles: [Tile; 4]) -> ([Tile; 4], Score) {
    let mut out = [0; 4];
    let mut len = 0;
    let mut score = 0;
    let mut mergeable: Option<Tile> = None;
    for tile in tiles.into_iter().filter(|&t| t != 0) {
        match mergeable {
            Some(prev) if prev == tile && prev < MAX_EXPONENT => {
                out[len - 1] = prev + 1;
                score += 1 << (prev + 1);
                mergeable = None;
            }
            _ => {
                out[len] = tile;
                len += 1;
                mergeable = Some(tile);
            }
        }
    }
    (out, score)
}

fn count_non_empty(board: Board) -> u64 {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}

pub(crate) fn format_val(val: u8) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{:^7}", 1u32 << x),
    }
}

/// Highest tile value on the board, 0 for an empty board.
pub fn get_highest_tile_val(board: Board) -> u32 {
    let max_tile = (0..16).map(|idx| get_tile(board, idx)).max().unwrap_or(0);
    match max_tile {
        0 => 0,
        exp => 1 << exp,
    }
}

pub(crate) fn get_tile(board: Board, idx: usize) -> Tile {
    (board.0 >> (60 - (4 * idx))) & 0xf
}
