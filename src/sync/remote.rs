use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::list_sync::RemoteList;
use super::protocol::{ClientRequest, ServerMessage, SnapshotHub};
use crate::list::Snapshot;

/// Client handle to a remote collection served over WebSocket.
///
/// Mutations go through an unbounded queue drained by a background task,
/// so `append`/`clear_all` return immediately. Inbound snapshots are
/// re-published on a local [`SnapshotHub`], one subscription per consumer.
/// The hub's sender lives in the receive task: when the connection dies,
/// the channel closes and every subscriber sees `RecvError::Closed`
/// instead of waiting on a dead connection forever.
pub struct StoreClient {
    requests: mpsc::UnboundedSender<ClientRequest>,
    // Subscribed before the connection task starts, so the first caller of
    // `subscribe` sees every message including the initial snapshot.
    first_rx: parking_lot::Mutex<Option<broadcast::Receiver<Arc<Snapshot>>>>,
    // Template for further subscriptions; holding a receiver keeps the
    // channel usable without keeping it open once the sender is gone.
    resub: broadcast::Receiver<Arc<Snapshot>>,
    task: JoinHandle<()>,
}

impl StoreClient {
    /// Connect to a store endpoint, e.g. `ws://localhost:3000/ws`. The
    /// server sends the current snapshot as soon as the connection is up,
    /// so the first subscription message is the initial state.
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| anyhow!("invalid store url: {e}"))?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let (requests, mut request_rx) = mpsc::unbounded_channel::<ClientRequest>();
        let hub = SnapshotHub::new();
        let first_rx = parking_lot::Mutex::new(Some(hub.subscribe()));
        let resub = hub.subscribe();

        // Forward queued requests to the server
        let forward = tokio::spawn(async move {
            while let Some(req) = request_rx.recv().await {
                match serde_json::to_string(&req) {
                    Ok(json) => {
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%err, "failed to encode request");
                    }
                }
            }
        });

        // Publish inbound snapshots to local subscribers. The task owns the
        // hub, the only sender: when the connection ends the hub drops with
        // it and subscribers observe the closed channel.
        let recv = tokio::spawn(async move {
            while let Some(msg) = ws_rx.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let text: String = text.to_string();
                        if let Ok(msg) = serde_json::from_str::<ServerMessage>(&text) {
                            hub.publish(Arc::new(msg.into_snapshot()));
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            drop(hub);
        });

        // Join both halves under a single handle
        let task = tokio::spawn(async move {
            let _ = tokio::join!(forward, recv);
        });

        Ok(Self {
            requests,
            first_rx,
            resub,
            task,
        })
    }

    /// Subscribe to snapshot notifications from this connection. The first
    /// subscription starts at the initial snapshot the server sent on
    /// connect; later ones only see messages from the point they are made.
    /// Receivers report the channel as closed once the connection is gone.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.first_rx
            .lock()
            .take()
            .unwrap_or_else(|| self.resub.resubscribe())
    }

    fn send(&self, req: ClientRequest) -> Result<()> {
        self.requests
            .send(req)
            .map_err(|_| anyhow!("store connection closed"))
    }
}

impl RemoteList for StoreClient {
    fn append(&self, value: &str) -> Result<()> {
        self.send(ClientRequest::Append {
            value: value.to_string(),
        })
    }

    fn clear_all(&self) -> Result<()> {
        self.send(ClientRequest::ClearAll)
    }
}

impl Drop for StoreClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}
