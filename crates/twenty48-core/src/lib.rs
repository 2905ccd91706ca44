//! twenty48-core: a 2048 board engine
//!
//! This crate provides:
//! - A compact `Board` type with ergonomic methods (`shift`, `with_spawn`, `is_terminal`, ...)
//! - A `GameSession` state machine that owns one board, its score and an injected RNG
//! - Value grids for snapshots and test-only board injection (`grid` module)
//!
//! Quick start:
//! ```
//! use twenty48_core::engine::Move;
//! use twenty48_core::session::{GameSession, SpawnPolicy};
//!
//! // Deterministic game with a seeded RNG
//! let mut game = GameSession::seeded(42, SpawnPolicy::default()).unwrap();
//! game.set_board(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let result = game.apply_move(Move::Right);
//! assert!(result.changed);
//! assert_eq!(game.score(), 4);
//! assert_eq!(game.grid()[0][3], 4);
//! ```
//!
//! Full loop
//! ```
//! use twenty48_core::engine::Move;
//! use twenty48_core::session::new_session;
//!
//! let mut game = new_session();
//! let mut turn = 0;
//! while !game.is_terminal() && turn < 64 {
//!     game.apply_move(Move::ALL[turn % 4]);
//!     turn += 1;
//! }
//! let _final_score = game.score();
//! ```
//!
//! Note: free functions in `session` (`apply_move`, `get_board`, ...) mirror the
//! `GameSession` methods for callers that prefer that style.

pub mod engine;
pub mod error;
pub mod grid;
pub mod session;

pub use engine::{Board, Move};
pub use error::{GridError, ParseMoveError, PolicyError};
pub use grid::Grid;
pub use session::{GameSession, MoveResult, SessionState, SpawnPolicy};
