//! Engine module: compact 2048 board, fast shift/merge ops, and
//! precomputed lookup tables.
//!
//! - `Board` is the packed 4x4 state with useful methods.
//! - Free functions mirror the methods when convenient (e.g., `shift`).
//! - Internals (tables and hot ops) live in submodules.

mod ops;
pub mod state;
mod tables;

pub use state::{Board, Move, Score, Spawn, DEFAULT_FOUR_PROBABILITY, MAX_EXPONENT};

pub use ops::{
    count_empty, get_highest_tile_val, get_tile_val, is_game_over, is_terminal, legal_moves,
    shift, shift_scored,
};

/// Build the line tables now instead of on the first move.
/// Safe to call multiple times.
pub fn new() {
    tables::init();
}
