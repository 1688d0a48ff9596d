use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    routing::get,
    Json, Router,
};
use colored::*;
use futures::{SinkExt, StreamExt};

use crate::list::Snapshot;
use crate::storage::{ListStore, LEADLIST_DIR};
use crate::sync::{ClientRequest, ServerMessage, SnapshotHub};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ListStore>,
    pub hub: SnapshotHub,
    // Serializes mutation + publish so subscribers never see an older
    // snapshot after a newer one.
    write_order: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<ListStore>) -> Self {
        Self {
            store,
            hub: SnapshotHub::new(),
            write_order: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Apply a mutation and broadcast the snapshot it produced. The store
    /// computes the snapshot under the same lock as the mutation, and the
    /// write-order lock is held until the publish, so snapshots reach the
    /// hub in the order the mutations were applied.
    async fn apply_and_publish(&self, req: ClientRequest) -> Result<Snapshot> {
        let _order = self.write_order.lock().await;

        let store = self.store.clone();
        let snapshot = tokio::task::spawn_blocking(move || match req {
            ClientRequest::Append { value } => store.append(&value),
            ClientRequest::ClearAll => store.clear_all(),
        })
        .await
        .map_err(|err| anyhow!("failed to join storage task: {err}"))??;

        self.hub.publish(Arc::new(snapshot.clone()));
        Ok(snapshot)
    }
}

pub async fn serve(port: u16, path: PathBuf) -> Result<()> {
    let store_path = path.join(LEADLIST_DIR);
    tokio::fs::create_dir_all(&store_path).await?;

    let store = Arc::new(ListStore::new(&store_path)?);
    store.initialize()?;

    let state = AppState::new(store);

    let app = Router::new()
        .route("/", get(|| async { "Leadlist Store Server" }))
        .route("/health", get(|| async { Json("OK") }))
        .route("/leads", get(get_leads))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    println!(
        "{} Store running at {}",
        "✓".green(),
        format!("http://{}", addr).bright_blue()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(state, socket))
}

async fn handle_ws(state: AppState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    tracing::debug!("subscriber connected");

    // Subscribe before reading the initial snapshot: a change landing in
    // between is then delivered as a regular message instead of lost.
    let mut rx = state.hub.subscribe();

    // Send the current snapshot immediately, then forward every published
    // snapshot to this subscriber in order.
    let initial = match state.store.snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(%err, "failed to read snapshot for new subscriber");
            return;
        }
    };
    if let Ok(text) = serde_json::to_string(&ServerMessage::snapshot(initial)) {
        let _ = sender.send(Message::Text(text.into())).await;
    }

    let send_task = tokio::spawn(async move {
        while let Ok(snapshot) = rx.recv().await {
            let msg = ServerMessage::snapshot((*snapshot).clone());
            if let Ok(text) = serde_json::to_string(&msg) {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Receive mutation requests and publish the resulting snapshots.
    // Frames that do not parse as a request are ignored.
    let state_recv = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let text: String = text.to_string();
                    if let Ok(req) = serde_json::from_str::<ClientRequest>(&text) {
                        match state_recv.apply_and_publish(req).await {
                            Ok(snapshot) => {
                                tracing::info!(entries = snapshot.len(), "collection changed");
                            }
                            Err(err) => {
                                tracing::warn!(%err, "failed to apply request");
                            }
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    let _ = tokio::join!(send_task, recv_task);
    tracing::debug!("subscriber disconnected");
}

async fn get_leads(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, axum::http::StatusCode> {
    let store = state.store.clone();
    let snapshot = tokio::task::spawn_blocking(move || store.snapshot())
        .await
        .map_err(|_| axum::http::StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|_| axum::http::StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_publish_in_apply_order() {
        let store = Arc::new(ListStore::open_in_memory().unwrap());
        store.initialize().unwrap();
        let state = AppState::new(store);

        let mut rx = state.hub.subscribe();

        let mut handles = Vec::new();
        for i in 0..10 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                state
                    .apply_and_publish(ClientRequest::Append {
                        value: format!("https://{i}.com"),
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Each append grows the collection, so snapshots must arrive with
        // strictly increasing sizes; a stale publish would break this.
        let mut last = 0;
        for _ in 0..10 {
            let snap = rx.recv().await.unwrap();
            assert!(snap.len() > last, "snapshot published out of apply order");
            last = snap.len();
        }
        assert_eq!(last, 10);
    }
}
