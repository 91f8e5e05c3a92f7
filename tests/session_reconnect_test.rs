//! Live session against a hand-rolled WebSocket peer that drops the first
//! connection.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use net_tetris::adapter::{
    decode_intent, encode_snapshot, BackoffPolicy, Client, ClientConfig, Dispatch, SessionState,
};
use net_tetris::core::GameState;
use net_tetris::types::{GameMode, Intent};

fn snapshot_text(piece_id: u64) -> String {
    let mut snap = GameState::new(3, GameMode::beginner()).snapshot();
    snap.piece_id = piece_id;
    encode_snapshot(&snap).unwrap()
}

/// Accepts WebSocket peers in a loop. The first gets one snapshot and is
/// closed after sending one intent; later ones stay open.
async fn flaky_peer(listener: TcpListener, intents: mpsc::UnboundedSender<String>) {
    let mut connections = 0u64;
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        // Fallback polls land here too; they fail the handshake.
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            continue;
        };
        connections += 1;
        if ws.send(Message::Text(snapshot_text(connections))).await.is_err() {
            continue;
        }

        if connections == 1 {
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    let _ = intents.send(text);
                    break;
                }
            }
            let _ = ws.close(None).await;
        } else {
            tokio::spawn(async move { while let Some(Ok(_)) = ws.next().await {} });
        }
    }
}

fn fast_config(addr: std::net::SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::new(&format!("http://{}", addr)).unwrap();
    config.backoff = BackoffPolicy {
        floor: Duration::from_millis(50),
        step: Duration::from_millis(50),
        ceiling: Duration::from_millis(200),
    };
    config.poll_interval = Duration::from_secs(30);
    config
}

#[tokio::test]
async fn session_reconnects_after_peer_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (intent_tx, mut intent_rx) = mpsc::unbounded_channel();
    tokio::spawn(flaky_peer(listener, intent_tx));

    let mut client = Client::connect(&fast_config(addr)).unwrap();

    let first = timeout(Duration::from_secs(2), client.next_snapshot())
        .await
        .expect("no first snapshot")
        .unwrap();
    assert_eq!(first.piece_id, 1);
    assert_eq!(client.state(), SessionState::Open);

    assert_eq!(client.dispatch(Intent::Rotate), Dispatch::Sent);
    let sent = timeout(Duration::from_secs(2), intent_rx.recv())
        .await
        .expect("peer saw no intent")
        .unwrap();
    assert_eq!(decode_intent(&sent).unwrap(), Intent::Rotate);

    let second = timeout(Duration::from_secs(3), client.next_snapshot())
        .await
        .expect("session did not reconnect")
        .unwrap();
    assert_eq!(second.piece_id, 2);
    assert_eq!(client.latest().unwrap().piece_id, 2);

    let session = client.session().unwrap();
    let mut states = session.watch_state();
    client.close();
    let closed = timeout(
        Duration::from_secs(2),
        states.wait_for(|s| *s == SessionState::Closed),
    )
    .await
    .expect("session did not close");
    assert!(closed.is_ok());
}

#[tokio::test]
async fn session_without_peer_keeps_retrying() {
    // Grab a free port, then release it so nothing is listening.
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let mut client = Client::connect(&fast_config(addr)).unwrap();
    let mut states = client.session().unwrap().watch_state();
    timeout(
        Duration::from_secs(2),
        states.wait_for(|s| *s == SessionState::ClosedRetrying),
    )
    .await
    .expect("session never backed off")
    .unwrap();

    assert_eq!(client.dispatch(Intent::PauseResume), Dispatch::Dropped);
    assert!(client.latest().is_none());
    client.close();
}
