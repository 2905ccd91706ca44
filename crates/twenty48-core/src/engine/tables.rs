use std::sync::OnceLock;

use super::ops;
use super::state::{Line, Move, Score};

/// Precomputed lookup tables for all possible 4-tile lines (16-bit packed).
///
/// Sliding a row or column depends only on its four nibbles, so every one of
/// the 2^16 lines is resolved once and moves become four table reads.
///
/// Layout:
/// - `shift_left/right[i]`: replacement row (low 16 bits) after the move.
/// - `shift_up/down[i]`: replacement column, spread into nibble slots 0, 4, 8, 12
///   of the low 52 bits so it can be OR-ed back into the untransposed board.
/// - `merge_score[i]`: sum of the tile values produced by merges in the line.
///   A line's merge total does not depend on which end it is pushed toward,
///   so one table serves all four directions.
pub(crate) struct Stores {
    pub(crate) shift_left: Box<[u64]>,
    pub(crate) shift_right: Box<[u64]>,
    pub(crate) shift_up: Box<[u64]>,
    pub(crate) shift_down: Box<[u64]>,
    pub(crate) merge_score: Box<[Score]>,
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    log::debug!("building {LINE_TABLE_SIZE} line tables");
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut merge_score = vec![0u64; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as Line;
        shift_left[val] = ops::shift_line(line, Move::Left);
        shift_right[val] = ops::shift_line(line, Move::Right);
        shift_up[val] = ops::shift_line(line, Move::Up);
        shift_down[val] = ops::shift_line(line, Move::Down);
        merge_score[val] = ops::line_merge_score(line);
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        merge_score: merge_score.into_boxed_slice(),
    }
}

#[inline(always)]
pub(crate) fn line_entry(table: &[u64], idx: u16) -> u64 {
    table[idx as usize]
}

#[inline(always)]
pub(crate) fn merge_score_entry(idx: u16) -> Score {
    stores().merge_score[idx as usize]
}
