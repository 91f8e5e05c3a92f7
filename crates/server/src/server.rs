//! HTTP + WebSocket surface
//!
//! Handles incoming connections and routes intents into the shared driver.
//! Every WebSocket client receives the latest snapshot on connect and then
//! every published snapshot.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch, Mutex};

use net_tetris_adapter::{
    decode_intent, encode_snapshot, intent_from_direction, recv_snapshot, DriverConfig,
    DriverHandle, ModeMessage, MoveRequest, OkResponse, SnapshotMessage,
};
use net_tetris_core::GameSnapshot;
use net_tetris_highscore::{Entry, Ledger, Submission};
use net_tetris_types::{GameMode, Intent, Randomizer};

use crate::config::ServerConfig;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub driver: DriverHandle,
    pub ledger: Arc<Mutex<Ledger>>,
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(driver: DriverHandle, ledger: Ledger, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            driver,
            ledger: Arc::new(Mutex::new(ledger)),
            shutdown,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ModeQuery {
    mode: Option<String>,
}

/// Build the router over an existing state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/board", get(board))
        .route("/move", axum::routing::post(move_piece))
        .route("/highscores", get(list_highscores).post(submit_highscore))
        .route("/getGameMode", get(game_mode))
        .with_state(state)
}

/// Start the server and run until the process ends
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    run_server_until(config, ready_tx, shutdown_rx).await
}

/// Start the server and run until `shutdown` turns true. Open WebSocket
/// sessions are closed from the server side on shutdown.
pub async fn run_server_until(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let ledger = match &config.highscores_path {
        Some(path) => Ledger::open(path)?,
        None => Ledger::in_memory(),
    };
    let driver = DriverHandle::spawn(DriverConfig {
        seed: config.resolve_seed(),
        mode: GameMode::from_preset(&config.mode),
        randomizer: Randomizer::SevenBag,
        base_tick: config.base_tick,
    });
    let state = AppState::new(driver, ledger, shutdown.clone());

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!("listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut stop = shutdown;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            stopped(&mut stop).await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

/// Resolves once shutdown is requested or its sender is gone
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|v| *v).await;
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ModeQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.mode))
}

async fn send_snapshot(socket: &mut WebSocket, snap: &GameSnapshot) -> Result<(), axum::Error> {
    match encode_snapshot(snap) {
        Ok(text) => socket.send(Message::Text(text)).await,
        Err(e) => {
            warn!("failed to encode snapshot: {}", e);
            Ok(())
        }
    }
}

/// Handle a single WebSocket client
async fn handle_socket(mut socket: WebSocket, state: AppState, default_mode: Option<String>) {
    let mut updates = state.driver.subscribe();
    let mut shutdown = state.shutdown.clone();
    info!("client connected (mode {:?})", default_mode);

    if let Some(mode) = &default_mode {
        let latest = state.driver.latest();
        if restartable(&latest) && latest.mode.name != GameMode::from_preset(mode).name {
            debug!("starting {} for new client", mode);
            state.driver.apply(Intent::Restart {
                mode: default_mode.clone(),
            });
        }
    }

    if send_snapshot(&mut socket, &state.driver.latest()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = recv_snapshot(&mut updates) => {
                let Some(snap) = update else { break };
                if send_snapshot(&mut socket, &snap).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => match decode_intent(&text) {
                    Ok(intent) => {
                        debug!("intent {}", intent.kind_str());
                        let intent = match intent {
                            Intent::Restart { mode: None } => Intent::Restart {
                                mode: default_mode.clone(),
                            },
                            other => other,
                        };
                        state.driver.apply(intent);
                    }
                    Err(e) => warn!("ignoring malformed intent: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("socket error: {}", e);
                    break;
                }
            },
            _ = stopped(&mut shutdown) => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }
    info!("client disconnected");
}

/// Over, or fresh with nothing placed yet
fn restartable(snap: &GameSnapshot) -> bool {
    snap.game_over
        || (snap.score == 0 && !snap.paused && snap.board.filled_count() == 0)
}

async fn board(State(state): State<AppState>) -> Json<SnapshotMessage> {
    Json(SnapshotMessage::from(&*state.driver.latest()))
}

async fn move_piece(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> (StatusCode, Json<OkResponse>) {
    match intent_from_direction(&req.direction) {
        Some(intent) => {
            state.driver.apply(intent);
            (StatusCode::OK, Json(OkResponse::ok()))
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(OkResponse::error(format!("unknown direction {:?}", req.direction))),
        ),
    }
}

async fn list_highscores(State(state): State<AppState>) -> Json<Vec<Entry>> {
    Json(state.ledger.lock().await.entries().to_vec())
}

async fn submit_highscore(
    State(state): State<AppState>,
    body: Result<Json<Submission>, JsonRejection>,
) -> Response {
    let Json(submission) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!("rejecting highscore body: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(OkResponse::error("invalid body")),
            )
                .into_response();
        }
    };

    let mut ledger = state.ledger.lock().await;
    match ledger.record(&submission.name, submission.score) {
        Ok(entry) => {
            info!("highscore {} by {}", entry.score, entry.name);
            Json(OkResponse::ok()).into_response()
        }
        Err(e) => {
            warn!("highscore not recorded: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(OkResponse::error("highscores unavailable")),
            )
                .into_response()
        }
    }
}

async fn game_mode(
    Query(query): Query<ModeQuery>,
    State(state): State<AppState>,
) -> Json<ModeMessage> {
    let mode = match query.mode {
        Some(name) => GameMode::from_preset(&name),
        None => state.driver.latest().mode.clone(),
    };
    Json(ModeMessage::from(&mode))
}
