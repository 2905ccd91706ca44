use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use twenty48_core::engine::{Move, Spawn};
use twenty48_core::grid::grid_from_rows;
use twenty48_core::{GameSession, Grid, SessionState};

use crate::app::{AppState, SessionId, StoreError};

type ApiError = (StatusCode, String);

#[derive(Serialize)]
pub(crate) struct GameResponse {
    id: SessionId,
    /// 16 tile values, row-major.
    board: [u32; 16],
    rows: Grid,
    score: u64,
    state: SessionState,
    game_over: bool,
    moves: u64,
    highest_tile: u32,
    legal_moves: Vec<Move>,
}

impl GameResponse {
    fn new(id: SessionId, session: &GameSession) -> Self {
        Self {
            id,
            board: session.row_major(),
            rows: session.grid(),
            score: session.score(),
            state: session.state(),
            game_over: session.is_terminal(),
            moves: session.moves(),
            highest_tile: session.board().highest_tile(),
            legal_moves: session.legal_moves(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct MoveResponse {
    direction: Move,
    changed: bool,
    score_delta: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    spawned: Option<Spawn>,
    game_over_reached: bool,
    game: GameResponse,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: String,
    sessions: usize,
    debug_hooks: bool,
}

#[derive(Deserialize, Default)]
pub struct CreateGame {
    seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    direction: String,
}

#[derive(Deserialize)]
pub struct BoardRequest {
    rows: Vec<Vec<u32>>,
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(get_health))
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game).delete(delete_game))
        .route("/games/:id/move", post(apply_move))
        .route("/games/:id/restart", post(restart_game));
    if state.settings.debug_hooks {
        warn!("debug hooks enabled: PUT /games/:id/board can overwrite boards");
        router = router.route("/games/:id/board", put(inject_board));
    }
    router.with_state(state)
}

fn not_found(id: SessionId) -> ApiError {
    (StatusCode::NOT_FOUND, format!("game {id} not found"))
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let sessions = state.sessions.lock().await.len();
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions,
        debug_hooks: state.settings.debug_hooks,
    })
}

pub async fn create_game(
    State(state): State<AppState>,
    body: Option<Json<CreateGame>>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let request = body.map(|Json(req)| req).unwrap_or_default();
    let mut sessions = state.sessions.lock().await;
    let id = sessions
        .create(&state.settings, request.seed)
        .map_err(|err| match err {
            StoreError::Full(_) => (StatusCode::CONFLICT, err.to_string()),
            StoreError::Policy(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        })?;
    let session = sessions.get(id).ok_or_else(|| not_found(id))?;
    Ok((StatusCode::CREATED, Json(GameResponse::new(id, session))))
}

pub async fn get_game(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<Json<GameResponse>, ApiError> {
    let sessions = state.sessions.lock().await;
    let session = sessions.get(id).ok_or_else(|| not_found(id))?;
    Ok(Json(GameResponse::new(id, session)))
}

pub async fn apply_move(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    // Unknown keys are rejected here and never reach the session.
    let direction: Move = request
        .direction
        .parse()
        .map_err(|err: twenty48_core::ParseMoveError| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
    let result = session.apply_move(direction);
    debug!("game" = id, "direction" = %direction, "changed" = result.changed, "score" = session.score());
    if result.game_over_reached {
        info!("game over" = id, "score" = session.score(), "moves" = session.moves());
    }
    Ok(Json(MoveResponse {
        direction,
        changed: result.changed,
        score_delta: result.score_delta,
        spawned: result.spawned,
        game_over_reached: result.game_over_reached,
        game: GameResponse::new(id, session),
    }))
}

pub async fn restart_game(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
    session.restart();
    info!("session restarted" = id);
    Ok(Json(GameResponse::new(id, session)))
}

pub async fn delete_game(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions.lock().await;
    sessions.remove(id).ok_or_else(|| not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Test-only board injection, mounted when `debug_hooks` is on.
pub async fn inject_board(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<SessionId>,
    Json(request): Json<BoardRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let grid = grid_from_rows(&request.rows).map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
    session
        .set_board(&grid)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    info!("board injected" = id, "state" = ?session.state());
    Ok(Json(GameResponse::new(id, session)))
}
