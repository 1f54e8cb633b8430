//! Tic-tac-toe Web API
//!
//! Solves the whole game once at startup and serves a single interactive
//! playthrough plus memo-table lookups. The solved table is read-only after
//! startup and shared by every handler without locking; only the session
//! history sits behind a mutex.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tictactoe_core::{Error, Outcome, Player, Pos, State as Position, Symbol};
use tictactoe_solver::{Solver, Strategy};

// =============================================================================
// Session State
// =============================================================================

/// The single game being played through the API
struct GameSession {
    /// History of positions (index 0 = empty board)
    states: Vec<Position>,
    /// moves[i] = position played to reach states[i+1]
    moves: Vec<Pos>,
    /// Current position in history
    current_index: usize,
}

impl GameSession {
    fn new() -> Self {
        Self {
            states: vec![Position::new()],
            moves: vec![],
            current_index: 0,
        }
    }

    fn current(&self) -> Position {
        self.states[self.current_index]
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    fn can_redo(&self) -> bool {
        self.current_index < self.states.len() - 1
    }

    /// Play a move from the current position, dropping any undone future.
    fn push(&mut self, pos: Pos) -> Result<Position, Error> {
        let next = self.current().place(pos)?;
        let idx = self.current_index;
        self.states.truncate(idx + 1);
        self.moves.truncate(idx);
        self.states.push(next);
        self.moves.push(pos);
        self.current_index += 1;
        Ok(next)
    }
}

/// Shared application state
struct AppStateInner {
    solver: Solver,
    session: Mutex<GameSession>,
    rng: Mutex<StdRng>,
}

impl AppStateInner {
    fn new(solver: Solver, rng: StdRng) -> Self {
        Self {
            solver,
            session: Mutex::new(GameSession::new()),
            rng: Mutex::new(rng),
        }
    }

    fn session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

type AppState = Arc<AppStateInner>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct GameStateModel {
    board: Vec<Vec<Symbol>>,
    notation: String,
    current_player: Player,
    result: Outcome,
    move_index: usize,
    can_undo: bool,
    can_redo: bool,
    encoding: u32,
    /// Solver value for the player to move
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    winning_line: Option<Vec<(u8, u8)>>,
}

#[derive(Serialize)]
struct LegalMoveModel {
    pos: u8,
    row: u8,
    col: u8,
    /// Value of playing here for the player to move: 1 win, 0 draw, -1 loss
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluation: Option<i8>,
}

#[derive(Deserialize)]
struct MoveRequest {
    pos: u8,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AiMoveRequest {
    strategy: Option<Strategy>,
}

#[derive(Serialize)]
struct LookupModel {
    encoding: u32,
    notation: String,
    to_move: Player,
    outcome: Outcome,
    value: i8,
    best_move: Option<u8>,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
    solved_states: usize,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn api_error(err: Error) -> ApiError {
    let status = match err {
        Error::Unsolved(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorModel { detail: err.to_string() }))
}

fn bad_request(detail: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorModel {
            detail: detail.to_string(),
        }),
    )
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn game_to_model(session: &GameSession, solver: &Solver) -> GameStateModel {
    let position = session.current();
    let board: Vec<Vec<Symbol>> = (0..3)
        .map(|row| {
            (0..3)
                .map(|col| position.cell(Pos::from_row_col(row, col)))
                .collect::<Vec<_>>()
        })
        .collect();

    let winning_line: Option<Vec<(u8, u8)>> = position
        .winning_line()
        .map(|line| line.iter().map(|pos| (pos.row(), pos.col())).collect());

    GameStateModel {
        board,
        notation: position.notation(),
        current_player: position.whose_turn(),
        result: position.evaluate(),
        move_index: session.current_index,
        can_undo: session.can_undo(),
        can_redo: session.can_redo(),
        encoding: position.to_bits(),
        value: solver.value(position).ok(),
        winning_line,
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    Json(game_to_model(&session, &state.solver))
}

async fn get_moves(State(state): State<AppState>) -> Json<Vec<LegalMoveModel>> {
    let position = state.session().current();
    if position.evaluate().is_terminal() {
        return Json(vec![]);
    }

    let moves = position
        .empty_cells()
        .map(|pos| {
            // The child's value is from the opponent's side
            let evaluation = position
                .place(pos)
                .ok()
                .and_then(|child| state.solver.value(child).ok())
                .map(|value| -value);
            LegalMoveModel {
                pos: pos.0,
                row: pos.row(),
                col: pos.col(),
                evaluation,
            }
        })
        .collect();

    Json(moves)
}

async fn make_move(
    State(state): State<AppState>,
    req: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameStateModel>, ApiError> {
    let Json(req) = req.map_err(|e| bad_request(&e.body_text()))?;
    let pos = Pos::new(req.pos).map_err(api_error)?;
    let mut session = state.session();
    let next = session.push(pos).map_err(api_error)?;
    debug!(pos = pos.0, board = %next.notation(), "move");
    Ok(Json(game_to_model(&session, &state.solver)))
}

async fn ai_move(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GameStateModel>, ApiError> {
    // An empty body means the default strategy
    let req: AiMoveRequest = if body.is_empty() {
        AiMoveRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| bad_request(&e.to_string()))?
    };
    let strategy = req.strategy.unwrap_or(Strategy::Optimal);

    let mut session = state.session();
    let position = session.current();
    if position.evaluate().is_terminal() {
        return Err(api_error(Error::GameOver));
    }

    let pos = {
        let mut rng = state.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        strategy
            .choose(position, &state.solver, &mut *rng)
            .map_err(api_error)?
    };
    let next = session.push(pos).map_err(api_error)?;
    debug!(%strategy, pos = pos.0, board = %next.notation(), "ai move");
    Ok(Json(game_to_model(&session, &state.solver)))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.reset();
    Json(game_to_model(&session, &state.solver))
}

async fn undo(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    if !session.can_undo() {
        return Err(bad_request("Nothing to undo"));
    }
    session.current_index -= 1;
    Ok(Json(game_to_model(&session, &state.solver)))
}

async fn redo(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    if !session.can_redo() {
        return Err(bad_request("Nothing to redo"));
    }
    session.current_index += 1;
    Ok(Json(game_to_model(&session, &state.solver)))
}

async fn lookup(
    State(state): State<AppState>,
    encoding: Result<Path<u32>, PathRejection>,
) -> Result<Json<LookupModel>, ApiError> {
    let Path(encoding) = encoding.map_err(|e| bad_request(&e.body_text()))?;
    let position = Position::from_bits(encoding).map_err(api_error)?;
    let entry = state
        .solver
        .entry(position)
        .ok_or(Error::Unsolved(position))
        .map_err(api_error)?;

    Ok(Json(LookupModel {
        encoding,
        notation: position.notation(),
        to_move: position.whose_turn(),
        outcome: position.evaluate(),
        value: entry.value,
        best_move: entry.best_move.map(|pos| pos.0),
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
        solved_states: state.solver.len(),
    })
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/move", post(make_move))
        .route("/ai-move", post(ai_move))
        .route("/reset", post(reset_game))
        .route("/undo", post(undo))
        .route("/redo", post(redo))
        .route("/lookup/{encoding}", get(lookup))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "tictactoe-api", version, about = "Serve the solved tic-tac-toe game over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: SocketAddr,

    /// Seed for the random strategy
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut solver = Solver::new();
    solver.solve(Position::new());
    solver.stats.log_summary();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let state: AppState = Arc::new(AppStateInner::new(solver, rng));

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;
    info!(addr = %args.addr, "tic-tac-toe API listening");
    axum::serve(listener, app(state)).await.context("serving API")?;
    Ok(())
}
