//! Game sessions: one owned board, its score and its lifecycle.
//!
//! A [`GameSession`] applies moves atomically: a move either commits the
//! shift, the score, exactly one spawn and the terminal recheck, or it leaves
//! the session untouched (including the RNG stream).

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Move, Score, Spawn, DEFAULT_FOUR_PROBABILITY};
use crate::error::{GridError, PolicyError};
use crate::grid::Grid;

/// How new tiles are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPolicy {
    /// Chance that a spawned tile is a 4 rather than a 2.
    pub four_probability: f64,
    /// Tiles placed on a fresh board.
    pub start_tiles: usize,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            four_probability: DEFAULT_FOUR_PROBABILITY,
            start_tiles: 2,
        }
    }
}

impl SpawnPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(PolicyError::FourProbability(self.four_probability));
        }
        if self.start_tiles > 16 {
            return Err(PolicyError::StartTiles(self.start_tiles));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    /// Full board, nothing can merge. Absorbing until restart or injection.
    Terminal,
}

/// Outcome of [`GameSession::apply_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    /// False for a no-op move; nothing about the session changed then.
    pub changed: bool,
    pub score_delta: Score,
    pub spawned: Option<Spawn>,
    pub state: SessionState,
    /// This move took the session from active to terminal.
    pub game_over_reached: bool,
}

impl MoveResult {
    fn unchanged(state: SessionState) -> Self {
        Self {
            changed: false,
            score_delta: 0,
            spawned: None,
            state,
            game_over_reached: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSession<R = StdRng> {
    board: Board,
    score: Score,
    state: SessionState,
    moves: u64,
    policy: SpawnPolicy,
    rng: R,
}

impl GameSession<StdRng> {
    /// Deterministic session driven by a seeded [`StdRng`].
    pub fn seeded(seed: u64, policy: SpawnPolicy) -> Result<Self, PolicyError> {
        Self::new(StdRng::seed_from_u64(seed), policy)
    }
}

impl<R: Rng> GameSession<R> {
    /// Start a game drawing every spawn from `rng`.
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use twenty48_core::session::{GameSession, SpawnPolicy};
    /// let session = GameSession::new(StdRng::seed_from_u64(1), SpawnPolicy::default()).unwrap();
    /// assert_eq!(session.board().count_empty(), 14);
    /// assert_eq!(session.score(), 0);
    /// ```
    pub fn new(rng: R, policy: SpawnPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self::start(rng, policy))
    }

    fn start(rng: R, policy: SpawnPolicy) -> Self {
        let mut session = Self {
            board: Board::EMPTY,
            score: 0,
            state: SessionState::Active,
            moves: 0,
            policy,
            rng,
        };
        session.deal();
        session
    }

    fn deal(&mut self) {
        let mut board = Board::EMPTY;
        for _ in 0..self.policy.start_tiles {
            board = board.with_spawn(&mut self.rng, self.policy.four_probability).0;
        }
        self.board = board;
        self.score = 0;
        self.moves = 0;
        self.state = state_of(board);
    }

    /// Slide in `direction`; on change, score merges and spawn one tile.
    pub fn apply_move(&mut self, direction: Move) -> MoveResult {
        if self.state == SessionState::Terminal {
            return MoveResult::unchanged(self.state);
        }
        let (shifted, gained) = self.board.shift_scored(direction);
        if shifted == self.board {
            debug!("move {direction} left the board unchanged");
            return MoveResult::unchanged(self.state);
        }
        let (board, spawned) = shifted.with_spawn(&mut self.rng, self.policy.four_probability);

        self.board = board;
        self.score += gained;
        self.moves += 1;
        let previous = self.state;
        self.state = state_of(board);
        let game_over_reached =
            previous == SessionState::Active && self.state == SessionState::Terminal;
        if game_over_reached {
            info!(
                "game over after {} moves, score {}, highest tile {}",
                self.moves,
                self.score,
                board.highest_tile()
            );
        }
        MoveResult {
            changed: true,
            score_delta: gained,
            spawned,
            state: self.state,
            game_over_reached,
        }
    }

    /// Throw the board away and deal a fresh one from the same RNG stream.
    pub fn restart(&mut self) {
        self.deal();
        debug!("session restarted");
    }

    /// Force an arbitrary board. Test and debug hook only.
    ///
    /// Only the shape and the packed tile range are checked, so boards that
    /// normal play could never reach (already terminal, empty, lopsided) are
    /// accepted. The score is left as is.
    pub fn set_board(&mut self, grid: &Grid) -> Result<(), GridError> {
        let board = Board::from_grid(grid)?;
        self.board = board;
        self.state = state_of(board);
        info!("board injected, state now {:?}", self.state);
        Ok(())
    }
}

impl<R> GameSession<R> {
    pub fn board(&self) -> Board {
        self.board
    }

    pub fn grid(&self) -> Grid {
        self.board.to_grid()
    }

    /// 16 tile values in row-major order.
    pub fn row_major(&self) -> [u32; 16] {
        self.board.row_major()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == SessionState::Terminal
    }

    /// Number of board-changing moves since the last deal.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Directions that would change the board, empty once terminal.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        let mask = self.board.legal_moves();
        Move::ALL
            .into_iter()
            .zip(mask)
            .filter_map(|(m, legal)| legal.then_some(m))
            .collect()
    }
}

fn state_of(board: Board) -> SessionState {
    if board.is_terminal() {
        SessionState::Terminal
    } else {
        SessionState::Active
    }
}

/// Start a default game seeded from OS entropy.
pub fn new_session() -> GameSession<StdRng> {
    GameSession::start(StdRng::from_entropy(), SpawnPolicy::default())
}

pub fn apply_move<R: Rng>(session: &mut GameSession<R>, direction: Move) -> MoveResult {
    session.apply_move(direction)
}

pub fn is_terminal<R>(session: &GameSession<R>) -> bool {
    session.is_terminal()
}

pub fn get_board<R>(session: &GameSession<R>) -> Grid {
    session.grid()
}

pub fn get_score<R>(session: &GameSession<R>) -> Score {
    session.score()
}

/// Test and debug hook, see [`GameSession::set_board`].
pub fn set_board<R: Rng>(session: &mut GameSession<R>, grid: &Grid) -> Result<(), GridError> {
    session.set_board(grid)
}
