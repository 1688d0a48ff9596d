use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::list::{Entry, Snapshot};

/// A mutation request sent by a client over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Insert `value` at the end of the collection.
    Append { value: String },
    /// Delete the entire collection.
    ClearAll,
}

/// A message sent by the server to a subscriber. Today this is only the
/// full snapshot, emitted once on subscribe and again after every change;
/// `entries: null` means the collection does not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Snapshot { entries: Option<Vec<Entry>> },
}

impl ServerMessage {
    pub fn snapshot(snapshot: Snapshot) -> Self {
        Self::Snapshot {
            entries: snapshot.into_entries(),
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        match self {
            Self::Snapshot { entries } => Snapshot::from_entries(entries),
        }
    }
}

/// In-process publish/subscribe channel for snapshots. Each WebSocket
/// handler subscribes once and forwards everything it receives; because
/// every message is a complete snapshot, a lagged subscriber loses nothing
/// it cannot recover from the next message.
#[derive(Clone)]
pub struct SnapshotHub {
    tx: broadcast::Sender<Arc<Snapshot>>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all current subscribers. Returns how many
    /// subscribers received it; zero subscribers is not an error.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> usize {
        self.tx.send(snapshot).unwrap_or(0)
    }
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_round_trip() {
        let req = ClientRequest::Append {
            value: "https://a.com".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"type":"append","value":"https://a.com"}"#);

        let msg = ServerMessage::snapshot(Snapshot::absent());
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"snapshot","entries":null}"#);

        let parsed: ServerMessage = serde_json::from_str(&json).unwrap();
        assert!(!parsed.into_snapshot().exists());
    }

    #[tokio::test]
    async fn test_hub_delivers_in_publish_order() {
        let hub = SnapshotHub::new();
        let mut rx = hub.subscribe();

        hub.publish(Arc::new(Snapshot::of(["https://a.com"])));
        hub.publish(Arc::new(Snapshot::of(["https://a.com", "https://b.com"])));

        assert_eq!(rx.recv().await.unwrap().len(), 1);
        assert_eq!(rx.recv().await.unwrap().len(), 2);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let hub = SnapshotHub::new();
        assert_eq!(hub.publish(Arc::new(Snapshot::absent())), 0);
    }
}
