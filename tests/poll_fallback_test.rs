//! REST fallback: a server without `/ws` is followed by polling `/board`,
//! and movement intents go out as `POST /move`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use net_tetris::adapter::{
    encode_snapshot, Client, ClientConfig, Dispatch, MoveRequest, OkResponse, SessionState,
};
use net_tetris::core::GameState;
use net_tetris::types::{GameMode, Intent, MoveDir};

async fn rest_only_server(
    piece_id: Arc<AtomicU64>,
    moves: mpsc::UnboundedSender<String>,
) -> std::net::SocketAddr {
    let app = Router::new()
        .route(
            "/board",
            get(move || {
                let piece_id = Arc::clone(&piece_id);
                async move {
                    let mut snap = GameState::new(8, GameMode::beginner()).snapshot();
                    snap.piece_id = piece_id.load(Ordering::SeqCst);
                    encode_snapshot(&snap).unwrap()
                }
            }),
        )
        .route(
            "/move",
            post(move |Json(req): Json<MoveRequest>| {
                let moves = moves.clone();
                async move {
                    let _ = moves.send(req.direction);
                    Json(OkResponse::ok())
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

#[tokio::test]
async fn polling_follows_board_while_live_channel_is_down() {
    let piece_id = Arc::new(AtomicU64::new(1));
    let (move_tx, mut move_rx) = mpsc::unbounded_channel();
    let addr = rest_only_server(Arc::clone(&piece_id), move_tx).await;

    let mut config = ClientConfig::new(&format!("http://{}", addr)).unwrap();
    config.poll_interval = Duration::from_millis(30);
    let mut client = Client::connect(&config).unwrap();

    let first = timeout(Duration::from_secs(2), client.next_snapshot())
        .await
        .expect("no polled snapshot")
        .unwrap();
    assert_eq!(first.piece_id, 1);
    assert_ne!(client.state(), SessionState::Open);

    // Identical polls are not re-delivered.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(client.pump(), 0);

    piece_id.store(2, Ordering::SeqCst);
    let second = timeout(Duration::from_secs(2), client.next_snapshot())
        .await
        .expect("poller stopped")
        .unwrap();
    assert_eq!(second.piece_id, 2);

    assert_eq!(client.dispatch(Intent::Move(MoveDir::Left)), Dispatch::Posted);
    assert_eq!(client.dispatch(Intent::Drop), Dispatch::Posted);
    assert_eq!(client.dispatch(Intent::PauseResume), Dispatch::Dropped);

    let mut posted = Vec::new();
    for _ in 0..2 {
        let direction = timeout(Duration::from_secs(2), move_rx.recv())
            .await
            .expect("no move posted")
            .unwrap();
        posted.push(direction);
    }
    posted.sort();
    assert_eq!(posted, vec!["drop".to_string(), "left".to_string()]);

    client.close();
}
